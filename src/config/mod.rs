// ==========================================
// 合同定价引擎 - 配置层
// ==========================================
// 职责: 定价参数与审批人授权管理
// 存储: config_kv 表
// ==========================================

pub mod config_manager;
pub mod pricing_config;
pub mod pricing_config_trait;

// 重导出核心配置管理器
pub use config_manager::{config_keys, ConfigManager};
pub use pricing_config::{ApproverGrant, PricingConfig};
pub use pricing_config_trait::PricingConfigReader;
