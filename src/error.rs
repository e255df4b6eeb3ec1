// ==========================================
// 合同定价引擎 - 引擎错误类型
// ==========================================
// 工具: thiserror 派生宏
// 红线: 引擎内任何错误都不致命,重新录入正确数据即可恢复
// ==========================================

use thiserror::Error;

/// 定价引擎错误类型
///
/// 所有错误都在本地恢复:
/// - Validation: 字段级提示,不修改会话状态
/// - Authorization: 改价审批被拒,行价格保持不变
/// - NotFound: 材料不存在（合同缺失不走此错误,按市场价处理）
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PricingError {
    #[error("数据校验失败: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("审批未通过: {0}")]
    Authorization(String),

    #[error("记录未找到: {entity}(id={id})")]
    NotFound { entity: String, id: String },

    #[error("订单行不存在: index={0}")]
    LineOutOfRange(usize),
}

impl PricingError {
    /// 构造字段校验错误
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        PricingError::Validation {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// 构造未找到错误
    pub fn not_found(entity: &str, id: &str) -> Self {
        PricingError::NotFound {
            entity: entity.to_string(),
            id: id.to_string(),
        }
    }

    /// 校验错误对应的字段名
    pub fn field(&self) -> Option<&str> {
        match self {
            PricingError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }

    /// 是否为审批类错误（界面以对话框形式提示）
    pub fn is_authorization(&self) -> bool {
        matches!(self, PricingError::Authorization(_))
    }
}

/// Result 类型别名
pub type PricingResult<T> = Result<T, PricingError>;

/// 校验数值为有限且非负
pub(crate) fn ensure_non_negative(field: &str, value: f64) -> PricingResult<()> {
    if !value.is_finite() {
        return Err(PricingError::validation(field, format!("数值无效: {}", value)));
    }
    if value < 0.0 {
        return Err(PricingError::validation(field, format!("不能为负数: {}", value)));
    }
    Ok(())
}
