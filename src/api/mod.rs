// ==========================================
// 合同定价引擎 - API 层
// ==========================================
// 职责: 销售/采购订单录入门面,组合协作接口、定价引擎与审计仓储
// ==========================================

pub mod error;
pub mod order_entry_api;

pub use error::{ApiError, ApiResult};
pub use order_entry_api::{CommittedOrder, OrderEntryApi};
