// ==========================================
// 合同定价引擎 - 改价审计数据仓储
// ==========================================
// 依据: override_audit 表（db::ensure_schema）
// 红线: 只追加,不修改不删除
// 红线: 一次提交的审计记录在同一事务内写入
// ==========================================

mod core;
mod queries;


pub use self::core::{OverrideAuditRepository, StoredOverrideAudit};
