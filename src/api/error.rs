// ==========================================
// 合同定价引擎 - API层错误类型
// ==========================================
// 职责: 将引擎/仓储/导入错误转换为用户可理解的错误消息
// 红线: 每个错误必须包含显式原因
// ==========================================

use crate::error::PricingError;
use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ==========================================
    // 业务规则错误
    // ==========================================
    #[error("数据校验失败: {field} - {message}")]
    ValidationError { field: String, message: String },

    #[error("无效输入: {0}")]
    InvalidInput(String),

    #[error("审批未通过: {0}")]
    AuthorizationDenied(String),

    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("业务规则违反: {0}")]
    BusinessRuleViolation(String),

    // ==========================================
    // 外部协作错误
    // ==========================================
    #[error("上游服务调用失败 ({source_name}): {message}")]
    UpstreamError { source_name: String, message: String },

    #[error("配置读取失败: {0}")]
    ConfigError(String),

    // ==========================================
    // 数据访问错误
    // ==========================================
    #[error("数据库错误: {0}")]
    DatabaseError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    // ==========================================
    // 导入错误
    // ==========================================
    #[error("文件导入失败: {0}")]
    ImportError(String),

    // ==========================================
    // 通用错误
    // ==========================================
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    pub fn upstream(source_name: &str, err: impl std::fmt::Display) -> Self {
        ApiError::UpstreamError {
            source_name: source_name.to_string(),
            message: err.to_string(),
        }
    }
}

// ==========================================
// 从 PricingError 转换
// ==========================================
impl From<PricingError> for ApiError {
    fn from(err: PricingError) -> Self {
        match err {
            PricingError::Validation { field, message } => {
                ApiError::ValidationError { field, message }
            }
            PricingError::Authorization(msg) => ApiError::AuthorizationDenied(msg),
            PricingError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            PricingError::LineOutOfRange(index) => {
                ApiError::InvalidInput(format!("订单行不存在: index={}", index))
            }
        }
    }
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{}(id={})不存在", entity, id))
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseError(format!("数据库锁获取失败: {}", msg))
            }
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::ConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("审计记录重复提交: {}", msg))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::DatabaseError(format!("字段{}错误: {}", field, message))
            }
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::Other(err) => ApiError::Other(err),
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
