// ==========================================
// 合同定价引擎 - 合同价格条目领域模型
// ==========================================
// 用途: 合同服务提供,引擎只读
// 红线: 价格类型为带参数的枚举,缺参数的条目无法构造
// ==========================================

use crate::domain::types::ContractStatus;
use crate::error::{PricingError, PricingResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// ContractTerms - 合同价格类型
// ==========================================
// 新增类型时 RateResolver 的 match 会编译报错,不会静默落入默认分支
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractTerms {
    /// 固定价: 直接使用合同价（即使高于市场价）
    FixedRate { contract_rate: f64 },
    /// 折扣比例: 市场价按比例下浮（0-100）
    DiscountPercentage { discount_percentage: f64 },
    /// 保底价: 取市场价与合同价中更优者
    MinimumPriceGuarantee { contract_rate: f64 },
}

impl ContractTerms {
    /// 类型代码（用于存储与展示）
    pub fn variant_code(&self) -> &'static str {
        match self {
            ContractTerms::FixedRate { .. } => "FIXED_RATE",
            ContractTerms::DiscountPercentage { .. } => "DISCOUNT_PERCENTAGE",
            ContractTerms::MinimumPriceGuarantee { .. } => "MINIMUM_PRICE_GUARANTEE",
        }
    }
}

impl fmt::Display for ContractTerms {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractTerms::FixedRate { contract_rate } => {
                write!(f, "FIXED_RATE({:.3})", contract_rate)
            }
            ContractTerms::DiscountPercentage { discount_percentage } => {
                write!(f, "DISCOUNT_PERCENTAGE({}%)", discount_percentage)
            }
            ContractTerms::MinimumPriceGuarantee { contract_rate } => {
                write!(f, "MINIMUM_PRICE_GUARANTEE({:.3})", contract_rate)
            }
        }
    }
}

// ==========================================
// ContractRateEntry - 合同价格条目
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractRateEntry {
    pub material_id: String,
    pub terms: ContractTerms,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>, // 为空表示长期有效
    pub status: ContractStatus,
    pub description: String,
}

// ==========================================
// RawContractRateRecord - 合同条目原始记录
// ==========================================
// 用途: 合同服务/导入文件的扁平结构,校验后转换为 ContractRateEntry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawContractRateRecord {
    pub material_id: Option<String>,
    pub variant: Option<String>,
    pub contract_rate: Option<f64>,
    pub discount_percentage: Option<f64>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<String>,
    pub description: Option<String>,
}

/// 解析价格类型代码
///
/// 兼容 FIXED_RATE / FixedRate / fixed-rate 等写法
fn normalize_variant(raw: &str) -> String {
    raw.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase()
}

fn require_rate(field: &str, value: Option<f64>) -> PricingResult<f64> {
    let rate = value.ok_or_else(|| PricingError::validation(field, "合同价缺失"))?;
    crate::error::ensure_non_negative(field, rate)?;
    Ok(rate)
}

impl TryFrom<RawContractRateRecord> for ContractRateEntry {
    type Error = PricingError;

    fn try_from(raw: RawContractRateRecord) -> Result<Self, Self::Error> {
        let material_id = raw
            .material_id
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PricingError::validation("material_id", "材料编号为空"))?;

        let variant = raw
            .variant
            .as_deref()
            .ok_or_else(|| PricingError::validation("variant", "价格类型缺失"))?;

        let terms = match normalize_variant(variant).as_str() {
            "fixedrate" => ContractTerms::FixedRate {
                contract_rate: require_rate("contract_rate", raw.contract_rate)?,
            },
            "discountpercentage" => {
                let pct = raw
                    .discount_percentage
                    .ok_or_else(|| PricingError::validation("discount_percentage", "折扣比例缺失"))?;
                if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
                    return Err(PricingError::validation(
                        "discount_percentage",
                        format!("折扣比例超出范围 [0, 100]: {}", pct),
                    ));
                }
                ContractTerms::DiscountPercentage {
                    discount_percentage: pct,
                }
            }
            "minimumpriceguarantee" => ContractTerms::MinimumPriceGuarantee {
                contract_rate: require_rate("contract_rate", raw.contract_rate)?,
            },
            _ => {
                return Err(PricingError::validation(
                    "variant",
                    format!("未知价格类型: {}", variant),
                ))
            }
        };

        let start_date = raw
            .start_date
            .ok_or_else(|| PricingError::validation("start_date", "开始日期缺失"))?;

        if let Some(end_date) = raw.end_date {
            if end_date < start_date {
                return Err(PricingError::validation(
                    "end_date",
                    format!("结束日期 {} 早于开始日期 {}", end_date, start_date),
                ));
            }
        }

        // 状态缺省视为生效
        let status = match raw.status.as_deref() {
            None => ContractStatus::Active,
            Some(s) if s.trim().is_empty() => ContractStatus::Active,
            Some(s) => ContractStatus::from_str(s)
                .ok_or_else(|| PricingError::validation("status", format!("未知状态: {}", s)))?,
        };

        Ok(ContractRateEntry {
            material_id,
            terms,
            start_date,
            end_date: raw.end_date,
            status,
            description: raw.description.unwrap_or_default(),
        })
    }
}
