use serde::{Deserialize, Serialize};

/// 改价原因最少字符数下限（配置只能调高）
pub const MIN_OVERRIDE_REASON_CHARS: usize = 10;

/// 改价判定容差上限（配置只能调低,须大于 0）
pub const MAX_RATE_TOLERANCE: f64 = 0.001;

/// 定价引擎参数
///
/// 存储位置：config_kv（scope_id='global'，key 见 `config_keys`）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingConfig {
    /// 改价判定容差：|新价 - 合同价| ≤ 容差时不触发改价审批
    pub rate_tolerance: f64,

    /// 改价原因最少字符数（去除首尾空白后）
    pub min_override_reason_chars: usize,

    /// 新建订单默认增值税率（%）
    pub default_vat_rate: f64,

    /// 新建订单默认是否计税
    pub default_taxable: bool,

    /// 是否生成库存提示
    pub stock_warnings_enabled: bool,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            rate_tolerance: 0.001,
            min_override_reason_chars: 10,
            default_vat_rate: 5.0,
            default_taxable: true,
            stock_warnings_enabled: true,
        }
    }
}

impl PricingConfig {
    /// 生效的改价原因最少字符数（不低于 10）
    pub fn effective_min_reason_chars(&self) -> usize {
        self.min_override_reason_chars.max(MIN_OVERRIDE_REASON_CHARS)
    }

    /// 生效的改价判定容差,取值 (0, 0.001],越界时按 0.001
    pub fn effective_rate_tolerance(&self) -> f64 {
        if is_valid_tolerance(self.rate_tolerance) {
            self.rate_tolerance
        } else {
            MAX_RATE_TOLERANCE
        }
    }
}

pub(crate) fn is_valid_tolerance(value: f64) -> bool {
    value.is_finite() && value > 0.0 && value <= MAX_RATE_TOLERANCE
}

/// 审批人授权（持久化对象）
///
/// 存储位置：config_kv（scope_id='global'，key='approver/{approver_id}'）
/// 每个审批人持有独立凭证，审计记录据此写入真实审批人
#[derive(Clone, Serialize, Deserialize)]
pub struct ApproverGrant {
    /// 审批人 ID（写入审计记录 approved_by）
    pub approver_id: String,

    /// 显示名称
    pub display_name: String,

    /// 审批凭证
    pub credential: String,

    /// 允许的最大偏离比例（%），为空表示不限
    #[serde(default)]
    pub max_deviation_percent: Option<f64>,

    /// 是否启用
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl std::fmt::Debug for ApproverGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApproverGrant")
            .field("approver_id", &self.approver_id)
            .field("display_name", &self.display_name)
            .field("credential", &"***")
            .field("max_deviation_percent", &self.max_deviation_percent)
            .field("enabled", &self.enabled)
            .finish()
    }
}
