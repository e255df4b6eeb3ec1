// ==========================================
// 合同定价引擎 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================
// 职责: 改价审计记录落库与查询
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod error;
pub mod override_audit_repo;

// 重导出核心仓储
pub use error::{RepositoryError, RepositoryResult};
pub use override_audit_repo::{OverrideAuditRepository, StoredOverrideAudit};
