// ==========================================
// 合同定价引擎 - 定价配置读取 Trait
// ==========================================
// 职责: 定义定价与审批所需的配置读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use crate::config::pricing_config::{ApproverGrant, PricingConfig};
use async_trait::async_trait;
use std::error::Error;

// ==========================================
// PricingConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PricingConfigReader: Send + Sync {
    /// 获取改价判定容差
    ///
    /// # 默认值
    /// - 0.001
    async fn get_rate_tolerance(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取改价原因最少字符数
    ///
    /// # 默认值
    /// - 10
    async fn get_min_override_reason_chars(&self) -> Result<usize, Box<dyn Error + Send + Sync>>;

    /// 获取默认增值税率（%）
    ///
    /// # 默认值
    /// - 5.0
    async fn get_default_vat_rate(&self) -> Result<f64, Box<dyn Error + Send + Sync>>;

    /// 获取默认是否计税
    ///
    /// # 默认值
    /// - true
    async fn get_default_taxable(&self) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// 获取是否生成库存提示
    ///
    /// # 默认值
    /// - true
    async fn get_stock_warnings_enabled(&self) -> Result<bool, Box<dyn Error + Send + Sync>>;

    /// 获取全部审批人授权（含停用的）
    async fn list_approver_grants(&self) -> Result<Vec<ApproverGrant>, Box<dyn Error + Send + Sync>>;

    /// 汇总为 PricingConfig
    async fn load_pricing_config(&self) -> Result<PricingConfig, Box<dyn Error + Send + Sync>> {
        Ok(PricingConfig {
            rate_tolerance: self.get_rate_tolerance().await?,
            min_override_reason_chars: self.get_min_override_reason_chars().await?,
            default_vat_rate: self.get_default_vat_rate().await?,
            default_taxable: self.get_default_taxable().await?,
            stock_warnings_enabled: self.get_stock_warnings_enabled().await?,
        })
    }
}
