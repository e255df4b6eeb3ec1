// ==========================================
// 合同定价引擎 - 订单行与汇总领域模型
// ==========================================
// 红线: amount == quantity * rate 恒成立
// 红线: 汇总只由订单行整体重算,不单独修改
// ==========================================

use crate::domain::rate::RateRationale;
use crate::domain::types::{StockLevel, WarningKind};
use serde::{Deserialize, Serialize};

// ==========================================
// OrderLine - 订单行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    // ===== 材料 =====
    pub material_id: Option<String>, // 未选材料时为空
    pub material_name: Option<String>,
    pub unit: Option<String>,

    // ===== 数量与价格 =====
    pub quantity: f64,
    pub rate: f64,
    pub amount: f64, // 派生: quantity * rate

    // ===== 定价派生状态 =====
    pub effective_rate: f64,   // 最近一次解析的合同/市场价
    pub contract_active: bool, // 存在生效合同
    pub is_locked: bool,       // 派生: contract_active && !is_overridden
    pub is_overridden: bool,   // 派生: 该材料存在审计记录
    pub rationale: Option<RateRationale>,

    // ===== 提示 =====
    pub stock_level: Option<StockLevel>,
}

impl OrderLine {
    /// 创建空订单行
    pub fn empty() -> Self {
        Self {
            material_id: None,
            material_name: None,
            unit: None,
            quantity: 0.0,
            rate: 0.0,
            amount: 0.0,
            effective_rate: 0.0,
            contract_active: false,
            is_locked: false,
            is_overridden: false,
            rationale: None,
            stock_level: None,
        }
    }

    /// 重算行金额
    pub(crate) fn recompute_amount(&mut self) {
        self.amount = self.quantity * self.rate;
    }

    pub fn has_material(&self, material_id: &str) -> bool {
        self.material_id.as_deref() == Some(material_id)
    }
}

impl Default for OrderLine {
    fn default() -> Self {
        Self::empty()
    }
}

// ==========================================
// OrderTotals - 订单汇总
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderTotals {
    pub subtotal: f64,
    pub discount_percent: f64,
    pub discount_amount: f64,
    pub vat_rate: f64,
    pub vat_amount: f64,
    pub net_amount: f64,
}

// ==========================================
// SessionWarning - 会话提示
// ==========================================
// 只做告知,不阻断计算
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionWarning {
    pub kind: WarningKind,
    pub material_id: Option<String>,
    pub line_index: Option<usize>,
    pub message: String,
}
