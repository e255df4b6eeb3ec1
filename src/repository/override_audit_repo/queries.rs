use super::core::{OverrideAuditRepository, StoredOverrideAudit, APPROVED_AT_FORMAT};
use crate::domain::override_audit::OverrideAuditRecord;
use crate::domain::types::OrderKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Result as SqliteResult, Row};

const SELECT_COLUMNS: &str = r#"
    SELECT order_ref, order_kind, audit_id, material_id,
           original_rate, override_rate, reason,
           approved_by, approver_name, approved_at
    FROM override_audit
"#;

impl OverrideAuditRepository {
    // ==========================================
    // 查询操作
    // ==========================================

    /// 按 audit_id 查询
    pub fn find_by_id(&self, audit_id: &str) -> RepositoryResult<Option<StoredOverrideAudit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!("{} WHERE audit_id = ?", SELECT_COLUMNS))?;

        let row = match stmt.query_row(params![audit_id], RawAuditRow::from_row) {
            Ok(row) => row,
            Err(rusqlite::Error::QueryReturnedNoRows) => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        row.into_stored().map(Some)
    }

    /// 查询订单的全部审计记录（按审批时间）
    pub fn list_by_order(&self, order_ref: &str) -> RepositoryResult<Vec<StoredOverrideAudit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE order_ref = ? ORDER BY approved_at ASC, rowid ASC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![order_ref], RawAuditRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(RawAuditRow::into_stored).collect()
    }

    /// 查询材料的全部审计记录（最新在前）
    pub fn list_by_material(&self, material_id: &str) -> RepositoryResult<Vec<StoredOverrideAudit>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(&format!(
            "{} WHERE material_id = ? ORDER BY approved_at DESC, rowid DESC",
            SELECT_COLUMNS
        ))?;

        let rows = stmt
            .query_map(params![material_id], RawAuditRow::from_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        rows.into_iter().map(RawAuditRow::into_stored).collect()
    }

    /// 统计订单审计记录数
    pub fn count_by_order(&self, order_ref: &str) -> RepositoryResult<usize> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM override_audit WHERE order_ref = ?",
            params![order_ref],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// 行映射中间结构: 文本字段在仓储层解析
struct RawAuditRow {
    order_ref: String,
    order_kind: String,
    audit_id: String,
    material_id: String,
    original_rate: f64,
    override_rate: f64,
    reason: String,
    approved_by: String,
    approver_name: String,
    approved_at: String,
}

impl RawAuditRow {
    fn from_row(row: &Row) -> SqliteResult<Self> {
        Ok(Self {
            order_ref: row.get(0)?,
            order_kind: row.get(1)?,
            audit_id: row.get(2)?,
            material_id: row.get(3)?,
            original_rate: row.get(4)?,
            override_rate: row.get(5)?,
            reason: row.get(6)?,
            approved_by: row.get(7)?,
            approver_name: row.get(8)?,
            approved_at: row.get(9)?,
        })
    }

    fn into_stored(self) -> RepositoryResult<StoredOverrideAudit> {
        let order_kind = match self.order_kind.as_str() {
            "SALES" => OrderKind::Sales,
            "PURCHASE" => OrderKind::Purchase,
            other => {
                return Err(RepositoryError::FieldValueError {
                    field: "order_kind".to_string(),
                    message: format!("未知订单类型: {}", other),
                })
            }
        };
        let approved_at = NaiveDateTime::parse_from_str(&self.approved_at, APPROVED_AT_FORMAT)
            .map_err(|e| RepositoryError::FieldValueError {
                field: "approved_at".to_string(),
                message: format!("{}: {}", self.approved_at, e),
            })?;

        Ok(StoredOverrideAudit {
            order_ref: self.order_ref,
            order_kind,
            record: OverrideAuditRecord {
                audit_id: self.audit_id,
                material_id: self.material_id,
                original_rate: self.original_rate,
                override_rate: self.override_rate,
                reason: self.reason,
                approved_by: self.approved_by,
                approver_name: self.approver_name,
                approved_at,
            },
        })
    }
}
