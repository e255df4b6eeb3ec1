// ==========================================
// 合同定价引擎 - 库存充足度判定
// ==========================================
// 输入: 需求数量 + 库存快照（由 StockAdvisor 提供）
// 输出: INSUFFICIENT / LOW / SUFFICIENT
// 红线: 仅提示,不阻断行计算和改价流程
// ==========================================

use crate::domain::material::StockSnapshot;
use crate::domain::types::StockLevel;

pub struct StockAdequacyClassifier;

impl StockAdequacyClassifier {
    /// 判定库存充足度
    ///
    /// # 规则（顺序执行，命中即返回）
    /// 1) quantity > current_stock → INSUFFICIENT
    /// 2) current_stock ≤ reorder_level → LOW
    /// 3) 其他 → SUFFICIENT
    pub fn classify(quantity: f64, snapshot: &StockSnapshot) -> StockLevel {
        if quantity > snapshot.current_stock {
            StockLevel::Insufficient
        } else if snapshot.current_stock <= snapshot.reorder_level {
            StockLevel::Low
        } else {
            StockLevel::Sufficient
        }
    }
}
