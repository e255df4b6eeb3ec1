// ==========================================
// 合同定价引擎 - 价格解析结果
// ==========================================
// 红线: 说明文字只用于展示,不影响数值
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// ContractActivity - 合同条目生效判定
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractActivity {
    Active,                          // 可执行
    Inactive,                        // 状态为停用
    Expired { end_date: NaiveDate }, // 已过结束日期
}

impl ContractActivity {
    pub fn is_active(&self) -> bool {
        matches!(self, ContractActivity::Active)
    }
}

// ==========================================
// RateRationale - 价格来源说明
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateRationale {
    /// 无合同,按市场价
    NoContract,
    /// 合同价低于市场价
    ContractSavings { market_rate: f64, saving: f64 },
    /// 合同价高于市场价
    ContractPremium { market_rate: f64, premium: f64 },
    /// 合同价等于市场价
    ContractAtMarket,
    /// 合同已过期,按市场价
    Expired { end_date: NaiveDate },
    /// 合同停用,按市场价
    Inactive,
}

impl RateRationale {
    /// 展示文案的 i18n 键
    pub fn message_key(&self) -> &'static str {
        match self {
            RateRationale::NoContract => "rationale.no_contract",
            RateRationale::ContractSavings { .. } => "rationale.savings",
            RateRationale::ContractPremium { .. } => "rationale.premium",
            RateRationale::ContractAtMarket => "rationale.at_market",
            RateRationale::Expired { .. } => "rationale.expired",
            RateRationale::Inactive => "rationale.inactive",
        }
    }
}

// ==========================================
// RateResolution - 价格解析结果
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateResolution {
    pub effective_rate: f64,
    pub contract_active: bool, // 合同生效 → 订单行锁定
    pub rationale: RateRationale,
}
