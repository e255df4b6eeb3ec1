// ==========================================
// 合同定价引擎 - 合同价字段映射
// ==========================================
// 职责: 源列名 → RawContractRateRecord + 类型转换
// 说明: 列名支持中英文别名;数值/日期格式错误按行报告
// ==========================================

use crate::domain::contract::RawContractRateRecord;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::SourceRow;
use chrono::{Days, NaiveDate};
use std::collections::HashMap;

/// 映射后的合同价行
#[derive(Debug, Clone, PartialEq)]
pub struct MappedContractRow {
    pub row_number: usize,
    pub counterparty_id: Option<String>,
    pub record: RawContractRateRecord,
}

pub struct ContractFieldMapper;

impl ContractFieldMapper {
    pub fn map_row(&self, row: &SourceRow) -> ImportResult<MappedContractRow> {
        let fields = &row.fields;
        let n = row.row_number;

        Ok(MappedContractRow {
            row_number: n,
            counterparty_id: self.get_string(fields, "counterparty_id"),
            record: RawContractRateRecord {
                material_id: self.get_string(fields, "material_id"),
                variant: self.get_string(fields, "variant"),
                contract_rate: self.parse_f64(fields, "contract_rate", n)?,
                discount_percentage: self.parse_f64(fields, "discount_percentage", n)?,
                start_date: self.parse_date(fields, "start_date", n)?,
                end_date: self.parse_date(fields, "end_date", n)?,
                status: self.get_string(fields, "status"),
                description: self.get_string(fields, "description"),
            },
        })
    }

    /// 提取字符串字段,支持多个可能的列名（别名）
    fn get_string(&self, row: &HashMap<String, String>, key: &str) -> Option<String> {
        let aliases: &[&str] = match key {
            "counterparty_id" => &["counterparty_id", "客户/供应商编号", "往来单位编号", "party_id"],
            "material_id" => &["material_id", "材料编号", "item_code"],
            "variant" => &["variant", "价格类型", "rate_type"],
            "contract_rate" => &["contract_rate", "合同价", "rate"],
            "discount_percentage" => &["discount_percentage", "折扣比例", "discount"],
            "start_date" => &["start_date", "开始日期"],
            "end_date" => &["end_date", "结束日期"],
            "status" => &["status", "状态"],
            "description" => &["description", "说明", "remarks"],
            _ => &[],
        };

        aliases
            .iter()
            .chain(std::iter::once(&key))
            .filter_map(|alias| row.get(*alias))
            .map(|v| v.trim())
            .find(|v| !v.is_empty())
            .map(str::to_string)
    }

    /// 解析浮点数（允许千分位逗号）
    fn parse_f64(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<f64>> {
        match self.get_string(row, key) {
            None => Ok(None),
            Some(value) => value
                .replace(',', "")
                .parse::<f64>()
                .map(Some)
                .map_err(|_| ImportError::TypeConversionError {
                    row: row_number,
                    field: key.to_string(),
                    message: format!("无法解析为浮点数: {}", value),
                }),
        }
    }

    /// 解析日期
    ///
    /// 支持 YYYY-MM-DD / YYYYMMDD / YYYY/MM/DD 及 Excel 日期序列号
    fn parse_date(
        &self,
        row: &HashMap<String, String>,
        key: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        let Some(value) = self.get_string(row, key) else {
            return Ok(None);
        };

        ["%Y-%m-%d", "%Y%m%d", "%Y/%m/%d"]
            .iter()
            .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
            .or_else(|| excel_serial_date(&value))
            .map(Some)
            .ok_or_else(|| ImportError::DateFormatError {
                row: row_number,
                field: key.to_string(),
                value: value.clone(),
            })
    }
}

/// Excel 日期序列号 → 日期（1900 日期系统）
fn excel_serial_date(value: &str) -> Option<NaiveDate> {
    let serial = value.parse::<f64>().ok()?;
    if !(1.0..=2_958_465.0).contains(&serial) {
        return None;
    }
    NaiveDate::from_ymd_opt(1899, 12, 30)?.checked_add_days(Days::new(serial.trunc() as u64))
}
