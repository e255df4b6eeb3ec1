// ==========================================
// 合同定价引擎 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: rusqlite 错误在此归类,上层只看到仓储语义
// ==========================================

use rusqlite::ErrorCode;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RepositoryError {
    #[error("记录未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    /// 主键/唯一/非空约束冲突（如重复提交同一审计记录）
    #[error("数据约束冲突: {0}")]
    ConstraintViolation(String),

    /// 已落库数据无法还原为领域对象
    #[error("存储字段无法解析 ({field}): {message}")]
    FieldValueError { field: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(ref failure, ref msg)
                if failure.code == ErrorCode::ConstraintViolation =>
            {
                RepositoryError::ConstraintViolation(
                    msg.clone().unwrap_or_else(|| failure.to_string()),
                )
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "OverrideAudit".to_string(),
                id: "-".to_string(),
            },
            other => RepositoryError::DatabaseQueryError(other.to_string()),
        }
    }
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;
