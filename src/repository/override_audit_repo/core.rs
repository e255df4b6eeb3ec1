use crate::domain::override_audit::OverrideAuditRecord;
use crate::domain::types::OrderKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex};

/// 审批时间存储格式（小数秒为 0 时省略）
pub(super) const APPROVED_AT_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 已落库的审计记录（附订单上下文）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredOverrideAudit {
    pub order_ref: String,
    pub order_kind: OrderKind,
    pub record: OverrideAuditRecord,
}

// ==========================================
// OverrideAuditRepository - 改价审计仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
pub struct OverrideAuditRepository {
    conn: Arc<Mutex<Connection>>,
}

impl OverrideAuditRepository {
    /// 创建改价审计仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    /// 获取数据库连接
    pub(super) fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 批量写入一次订单提交的审计记录
    ///
    /// # 返回
    /// - `Ok(count)`: 全部写入
    /// - `Err(...)`: 任一失败则整体回滚
    pub fn append_all(
        &self,
        order_ref: &str,
        order_kind: OrderKind,
        records: &[OverrideAuditRecord],
    ) -> RepositoryResult<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn()?;
        let tx = conn
            .transaction()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        let mut count = 0;
        for record in records {
            tx.execute(
                r#"
                INSERT INTO override_audit (
                    audit_id, order_ref, order_kind, material_id,
                    original_rate, override_rate, reason,
                    approved_by, approver_name, approved_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                "#,
                params![
                    record.audit_id,
                    order_ref,
                    order_kind.to_string(),
                    record.material_id,
                    record.original_rate,
                    record.override_rate,
                    record.reason,
                    record.approved_by,
                    record.approver_name,
                    record.approved_at.format(APPROVED_AT_FORMAT).to_string(),
                ],
            )?;
            count += 1;
        }

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        tracing::info!(order_ref, count, "改价审计记录已落库");
        Ok(count)
    }
}
