// ==========================================
// 合同定价引擎 - 引擎层
// ==========================================
// 职责: 合同价解析、订单行计算、改价审批、汇总重算
// 红线: Engine 不拼 SQL, 每个价格都要给出来源说明
// ==========================================

pub mod authorization;
pub mod catalog;
pub mod collaborators;
pub mod contract_activity;
pub mod order_line_calculator;
pub mod override_authorizer;
pub mod rate_resolver;
pub mod session;
pub mod stock_adequacy;
pub mod totals;
pub mod warnings;

// 重导出核心引擎
pub use authorization::{ApprovalAuthority, ApproverDirectory};
pub use catalog::ContractRateCatalog;
pub use collaborators::{ContractRateSource, MaterialSource, StaticReferenceData, StockAdvisor};
pub use contract_activity::ContractActivityEvaluator;
pub use order_line_calculator::{OrderLineCalculator, RateEdit};
pub use override_authorizer::{OverrideApproval, OverrideAuthorizer};
pub use rate_resolver::RateResolver;
pub use session::OrderEditingSession;
pub use stock_adequacy::StockAdequacyClassifier;
pub use totals::recompute_totals;
