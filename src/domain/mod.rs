// ==========================================
// 合同定价引擎 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含数据访问逻辑,不含定价规则
// ==========================================

pub mod contract;
pub mod material;
pub mod order;
pub mod override_audit;
pub mod rate;
pub mod types;

// 重导出核心类型
pub use contract::{ContractRateEntry, ContractTerms, RawContractRateRecord};
pub use material::{Material, StockSnapshot};
pub use order::{OrderLine, OrderTotals, SessionWarning};
pub use override_audit::{Approver, ApproverCredentialProof, OverrideAuditRecord, OverrideRequest};
pub use rate::{ContractActivity, RateRationale, RateResolution};
pub use types::{ContractStatus, OrderKind, StockLevel, WarningKind};
