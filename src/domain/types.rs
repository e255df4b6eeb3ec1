// ==========================================
// 合同定价引擎 - 领域类型定义
// ==========================================
// 职责: 合同状态、订单类型、库存等级、提示类型
// 红线: 类型只描述事实,不含定价规则
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 合同条目状态 (Contract Status)
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ContractStatus {
    Active,   // 生效
    Inactive, // 停用
}

impl fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractStatus::Active => write!(f, "ACTIVE"),
            ContractStatus::Inactive => write!(f, "INACTIVE"),
        }
    }
}

impl ContractStatus {
    /// 从字符串解析（大小写不敏感）
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "ACTIVE" => Some(ContractStatus::Active),
            "INACTIVE" => Some(ContractStatus::Inactive),
            _ => None,
        }
    }
}

// ==========================================
// 订单类型 (Order Kind)
// ==========================================
// 销售单与采购单共用同一套定价规则,仅影响提示用语
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderKind {
    Sales,    // 销售订单（对方为客户）
    Purchase, // 采购订单（对方为供应商）
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderKind::Sales => write!(f, "SALES"),
            OrderKind::Purchase => write!(f, "PURCHASE"),
        }
    }
}

impl OrderKind {
    /// 对方角色的 i18n 键
    pub fn counterparty_key(&self) -> &'static str {
        match self {
            OrderKind::Sales => "party.customer",
            OrderKind::Purchase => "party.supplier",
        }
    }
}

// ==========================================
// 库存充足度 (Stock Level)
// ==========================================
// 顺序: Insufficient < Low < Sufficient
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockLevel {
    Insufficient, // 需求量超过现有库存
    Low,          // 现有库存不高于再订货点
    Sufficient,   // 充足
}

impl fmt::Display for StockLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StockLevel::Insufficient => write!(f, "INSUFFICIENT"),
            StockLevel::Low => write!(f, "LOW"),
            StockLevel::Sufficient => write!(f, "SUFFICIENT"),
        }
    }
}

// ==========================================
// 提示类型 (Warning Kind)
// ==========================================
// 提示只做告知,不阻断录入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    ContractExpired,   // 合同已过期,按市场价
    RateOverridden,    // 合同价已被审批改价
    StockInsufficient, // 库存不足
    StockLow,          // 库存偏低
}

impl WarningKind {
    /// 是否为库存类提示（每行最多保留一条）
    pub fn is_stock(&self) -> bool {
        matches!(self, WarningKind::StockInsufficient | WarningKind::StockLow)
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WarningKind::ContractExpired => write!(f, "CONTRACT_EXPIRED"),
            WarningKind::RateOverridden => write!(f, "RATE_OVERRIDDEN"),
            WarningKind::StockInsufficient => write!(f, "STOCK_INSUFFICIENT"),
            WarningKind::StockLow => write!(f, "STOCK_LOW"),
        }
    }
}
