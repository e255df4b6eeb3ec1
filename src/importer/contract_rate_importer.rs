// ==========================================
// 合同定价引擎 - 合同价导入
// ==========================================
// 流程: 文件解析 → 字段映射 → 条目校验 → 按往来单位分组
// 红线: 单行错误只拒绝该行,不影响其他行
// 红线: 文件级错误（不存在/格式不支持/无法解析）整体失败
// ==========================================

use crate::domain::contract::{ContractRateEntry, RawContractRateRecord};
use crate::engine::catalog::ContractRateCatalog;
use crate::engine::collaborators::ContractRateSource;
use crate::i18n::t_with_args;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::ContractFieldMapper;
use crate::importer::file_parser::{FileParser, SourceRow, UniversalFileParser};
use async_trait::async_trait;
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::path::Path;
use tracing::instrument;

/// 被拒绝的行
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowRejection {
    pub row_number: usize,
    pub field: Option<String>,
    pub message: String,
}

/// 导入汇总
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ImportReport {
    pub total_rows: usize,
    pub accepted: usize,
    pub rejections: Vec<RowRejection>,
}

impl ImportReport {
    pub fn rejected(&self) -> usize {
        self.rejections.len()
    }

    /// 汇总文案
    pub fn summary(&self) -> String {
        t_with_args(
            "import.summary",
            &[
                ("total", &self.total_rows.to_string()),
                ("accepted", &self.accepted.to_string()),
                ("rejected", &self.rejected().to_string()),
            ],
        )
    }
}

// ==========================================
// ImportedContractRates - 导入结果
// ==========================================
// 只保留通过校验的记录;可直接作为 ContractRateSource 使用
#[derive(Debug, Clone, Default)]
pub struct ImportedContractRates {
    by_counterparty: HashMap<String, Vec<RawContractRateRecord>>,
    report: ImportReport,
}

impl ImportedContractRates {
    pub fn report(&self) -> &ImportReport {
        &self.report
    }

    pub fn counterparties(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.by_counterparty.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn records_for(&self, counterparty_id: &str) -> &[RawContractRateRecord] {
        self.by_counterparty
            .get(counterparty_id)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// 生成某往来单位的合同目录
    pub fn catalog_for(&self, counterparty_id: &str) -> ContractRateCatalog {
        ContractRateCatalog::from_entries(
            self.records_for(counterparty_id)
                .iter()
                .cloned()
                .filter_map(|raw| ContractRateEntry::try_from(raw).ok()),
        )
    }
}

#[async_trait]
impl ContractRateSource for ImportedContractRates {
    async fn contract_rates_for(
        &self,
        counterparty_id: &str,
    ) -> Result<Vec<RawContractRateRecord>, Box<dyn Error + Send + Sync>> {
        Ok(self.records_for(counterparty_id).to_vec())
    }
}

// ==========================================
// ContractRateImporter - 合同价导入器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ContractRateImporter {
    default_counterparty: Option<String>,
}

impl ContractRateImporter {
    pub fn new() -> Self {
        Self::default()
    }

    /// 文件未提供往来单位列时使用的默认往来单位
    pub fn with_default_counterparty(mut self, counterparty_id: &str) -> Self {
        self.default_counterparty = Some(counterparty_id.to_string());
        self
    }

    /// 从文件导入（.csv / .xlsx / .xls）
    #[instrument(skip(self, file_path), fields(path = %file_path.as_ref().display()))]
    pub fn import_file<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<ImportedContractRates> {
        let rows = match UniversalFileParser.parse_rows(file_path.as_ref()) {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(error = %e, "合同价文件解析失败");
                return Err(e);
            }
        };
        Ok(self.import_rows(rows))
    }

    /// 导入已解析的行
    pub fn import_rows(&self, rows: Vec<SourceRow>) -> ImportedContractRates {
        let mapper = ContractFieldMapper;
        let mut result = ImportedContractRates::default();
        result.report.total_rows = rows.len();

        for row in &rows {
            match self.accept_row(&mapper, row) {
                Ok((counterparty_id, record)) => {
                    result
                        .by_counterparty
                        .entry(counterparty_id)
                        .or_default()
                        .push(record);
                    result.report.accepted += 1;
                }
                Err(rejection) => {
                    tracing::warn!(
                        row = rejection.row_number,
                        field = rejection.field.as_deref().unwrap_or("-"),
                        message = %rejection.message,
                        "合同价行被拒绝"
                    );
                    result.report.rejections.push(rejection);
                }
            }
        }

        tracing::info!(
            total = result.report.total_rows,
            accepted = result.report.accepted,
            rejected = result.report.rejected(),
            "{}",
            result.report.summary()
        );
        result
    }

    fn accept_row(
        &self,
        mapper: &ContractFieldMapper,
        row: &SourceRow,
    ) -> Result<(String, RawContractRateRecord), RowRejection> {
        let mapped = mapper.map_row(row).map_err(|e| RowRejection {
            row_number: row.row_number,
            field: e.field().map(str::to_string),
            message: e.to_string(),
        })?;

        let counterparty_id = mapped
            .counterparty_id
            .or_else(|| self.default_counterparty.clone())
            .ok_or_else(|| RowRejection {
                row_number: row.row_number,
                field: Some("counterparty_id".to_string()),
                message: "往来单位编号为空".to_string(),
            })?;

        // 只校验,保留原始记录供协作接口返回
        ContractRateEntry::try_from(mapped.record.clone()).map_err(|e| RowRejection {
            row_number: row.row_number,
            field: e.field().map(str::to_string),
            message: e.to_string(),
        })?;

        Ok((counterparty_id, mapped.record))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(n: usize, pairs: &[(&str, &str)]) -> SourceRow {
        SourceRow {
            row_number: n,
            fields: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        }
    }

    #[test]
    fn test_import_rows_groups_and_rejects() {
        let rows = vec![
            row(
                2,
                &[
                    ("counterparty_id", "C-1"),
                    ("material_id", "M1"),
                    ("variant", "FixedRate"),
                    ("contract_rate", "8"),
                    ("start_date", "2026-01-01"),
                ],
            ),
            row(
                3,
                &[
                    ("counterparty_id", "C-1"),
                    ("material_id", "M2"),
                    ("variant", "DiscountPercentage"),
                    ("discount_percentage", "150"),
                    ("start_date", "2026-01-01"),
                ],
            ),
            row(
                4,
                &[
                    ("material_id", "M3"),
                    ("variant", "FixedRate"),
                    ("contract_rate", "5"),
                    ("start_date", "2026-01-01"),
                ],
            ),
        ];

        let imported = ContractRateImporter::new().import_rows(rows);
        let report = imported.report();
        assert_eq!(report.total_rows, 3);
        assert_eq!(report.accepted, 1);
        assert_eq!(report.rejected(), 2);
        assert_eq!(report.rejections[0].row_number, 3);
        assert_eq!(report.rejections[0].field.as_deref(), Some("discount_percentage"));
        assert_eq!(report.rejections[1].field.as_deref(), Some("counterparty_id"));

        assert_eq!(imported.counterparties(), vec!["C-1"]);
        assert!(imported.catalog_for("C-1").contains("M1"));
    }

    #[test]
    fn test_default_counterparty() {
        let rows = vec![row(
            2,
            &[
                ("material_id", "M3"),
                ("variant", "MINIMUM_PRICE_GUARANTEE"),
                ("contract_rate", "5"),
                ("start_date", "2026-01-01"),
            ],
        )];

        let imported = ContractRateImporter::new()
            .with_default_counterparty("S-9")
            .import_rows(rows);
        assert_eq!(imported.records_for("S-9").len(), 1);
        assert!(imported.records_for("C-1").is_empty());
    }
}
