// ==========================================
// 合同定价引擎 - 合同价解析
// ==========================================
// 职责: 材料 + 合同条目 + 今天 → 实际单价
// 输出: 单价 + 是否锁定 + 价格来源说明
// 红线: 纯函数,相同输入恒定相同输出
// 红线: 说明文字不影响数值
// ==========================================

use crate::domain::contract::{ContractRateEntry, ContractTerms};
use crate::domain::material::Material;
use crate::domain::rate::{ContractActivity, RateRationale, RateResolution};
use crate::engine::catalog::ContractRateCatalog;
use crate::engine::contract_activity::ContractActivityEvaluator;
use crate::i18n::{format_rate, t, t_with_args};
use chrono::NaiveDate;

/// 判定合同价与市场价相等的精度
const MARKET_EQ_EPSILON: f64 = 1e-9;

// ==========================================
// RateResolver - 纯函数工具类
// ==========================================
pub struct RateResolver;

impl RateResolver {
    /// 计算实际单价
    ///
    /// # 规则
    /// - 无合同或合同未生效 → 市场价
    /// - FIXED_RATE → 合同价（高于市场价也照用）
    /// - DISCOUNT_PERCENTAGE → max(0, 市场价 - 市场价 × 折扣 / 100)
    /// - MINIMUM_PRICE_GUARANTEE → min(市场价, 合同价)
    pub fn effective_rate(
        material: &Material,
        entry: Option<&ContractRateEntry>,
        today: NaiveDate,
    ) -> f64 {
        match entry {
            Some(e) if ContractActivityEvaluator::is_active(e, today) => {
                Self::apply_terms(material.standard_price, &e.terms)
            }
            _ => material.standard_price,
        }
    }

    /// 按价格类型计算合同价（合同已判定生效）
    pub fn apply_terms(standard_price: f64, terms: &ContractTerms) -> f64 {
        match *terms {
            ContractTerms::FixedRate { contract_rate } => contract_rate,
            ContractTerms::DiscountPercentage {
                discount_percentage,
            } => (standard_price - standard_price * discount_percentage / 100.0).max(0.0),
            ContractTerms::MinimumPriceGuarantee { contract_rate } => {
                standard_price.min(contract_rate)
            }
        }
    }

    /// 解析单价并给出来源说明
    pub fn resolve(
        material: &Material,
        entry: Option<&ContractRateEntry>,
        today: NaiveDate,
    ) -> RateResolution {
        let market = material.standard_price;
        let effective_rate = Self::effective_rate(material, entry, today);

        let (contract_active, rationale) = match entry {
            None => (false, RateRationale::NoContract),
            Some(e) => match ContractActivityEvaluator::activity(e, today) {
                ContractActivity::Expired { end_date } => {
                    (false, RateRationale::Expired { end_date })
                }
                ContractActivity::Inactive => (false, RateRationale::Inactive),
                ContractActivity::Active => {
                    let diff = effective_rate - market;
                    let rationale = if diff.abs() < MARKET_EQ_EPSILON {
                        RateRationale::ContractAtMarket
                    } else if diff < 0.0 {
                        RateRationale::ContractSavings {
                            market_rate: market,
                            saving: -diff,
                        }
                    } else {
                        RateRationale::ContractPremium {
                            market_rate: market,
                            premium: diff,
                        }
                    };
                    (true, rationale)
                }
            },
        };

        tracing::debug!(
            material_id = %material.id,
            effective_rate,
            contract_active,
            rationale = rationale.message_key(),
            "合同价解析完成"
        );

        RateResolution {
            effective_rate,
            contract_active,
            rationale,
        }
    }

    /// 从目录解析单价
    ///
    /// 目录中无该材料时按无合同处理（市场价），只记录告警日志,不报错
    pub fn resolve_from_catalog(
        material: &Material,
        catalog: &ContractRateCatalog,
        today: NaiveDate,
    ) -> RateResolution {
        let entry = catalog.select(&material.id, today);
        if entry.is_none() {
            tracing::warn!(
                material_id = %material.id,
                "合同目录中未找到该材料，按市场价处理"
            );
        }
        Self::resolve(material, entry, today)
    }

    /// 价格来源说明文案
    pub fn rationale_message(rationale: &RateRationale) -> String {
        match rationale {
            RateRationale::ContractSavings {
                market_rate,
                saving,
            } => t_with_args(
                rationale.message_key(),
                &[
                    ("amount", &format_rate(*saving)),
                    ("market", &format_rate(*market_rate)),
                ],
            ),
            RateRationale::ContractPremium {
                market_rate,
                premium,
            } => t_with_args(
                rationale.message_key(),
                &[
                    ("amount", &format_rate(*premium)),
                    ("market", &format_rate(*market_rate)),
                ],
            ),
            RateRationale::Expired { end_date } => t_with_args(
                rationale.message_key(),
                &[("end_date", &end_date.format("%Y-%m-%d").to_string())],
            ),
            RateRationale::NoContract
            | RateRationale::ContractAtMarket
            | RateRationale::Inactive => t(rationale.message_key()),
        }
    }
}
