// ==========================================
// 合同定价引擎 - 材料与库存领域模型
// ==========================================
// 用途: 外部服务提供,引擎只读
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// Material - 材料主数据
// ==========================================
// 红线: 会话内不可变
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub id: String,          // 材料编号
    pub name: String,        // 材料名称
    pub unit: String,        // 计量单位
    pub standard_price: f64, // 当前市场价（≥0）
}

impl Material {
    pub fn new(id: &str, name: &str, unit: &str, standard_price: f64) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            unit: unit.to_string(),
            standard_price,
        }
    }
}

// ==========================================
// StockSnapshot - 库存快照
// ==========================================
// 用途: 库存充足度判定（仅提示）
// 生命周期: 单次行编辑,不缓存
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockSnapshot {
    pub material_id: String,
    pub current_stock: f64, // 现有库存
    pub reorder_level: f64, // 再订货点
    pub unit: String,
}
