// ==========================================
// 合同定价引擎 - 订单行计算
// ==========================================
// 职责: 选材料定价 / 改数量 / 改价格 / 改价审批
// 输入: OrderEditingSession（调用方独占）+ 单次编辑
// 红线: amount == quantity * rate 恒成立
// 红线: 锁定行改价必须经审批,被拒绝时价格与金额不变
// 红线: 库存判定只产生提示,不阻断计算
// ==========================================

use crate::config::pricing_config::PricingConfig;
use crate::domain::material::{Material, StockSnapshot};
use crate::domain::order::OrderLine;
use crate::domain::override_audit::{OverrideAuditRecord, OverrideRequest};
use crate::domain::rate::{RateRationale, RateResolution};
use crate::domain::types::StockLevel;
use crate::engine::authorization::ApprovalAuthority;
use crate::engine::override_authorizer::OverrideAuthorizer;
use crate::engine::rate_resolver::RateResolver;
use crate::engine::session::OrderEditingSession;
use crate::engine::stock_adequacy::StockAdequacyClassifier;
use crate::engine::warnings;
use crate::error::{ensure_non_negative, PricingError, PricingResult};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// RateEdit - 改价结果
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RateEdit {
    /// 已生效（未锁定或已审批改价）
    Applied { rate: f64 },
    /// 与合同价差异在容差内,保持合同价,不触发审批
    WithinTolerance { rate: f64 },
    /// 需要审批: 界面据此收集原因和凭证后调用 apply_override
    OverrideRequired {
        material_id: String,
        original_rate: f64,
        requested_rate: f64,
    },
}

// ==========================================
// OrderLineCalculator - 订单行计算器
// ==========================================
pub struct OrderLineCalculator {
    config: PricingConfig,
    authorizer: OverrideAuthorizer,
}

impl OrderLineCalculator {
    /// 创建订单行计算器
    pub fn new(config: PricingConfig, authority: Arc<dyn ApprovalAuthority>) -> Self {
        let authorizer = OverrideAuthorizer::new(authority, &config);
        Self { config, authorizer }
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    // ==========================================
    // 选择材料
    // ==========================================

    /// 为订单行选择材料
    ///
    /// # 规则
    /// 1) 按合同目录解析实际单价,rate = 实际单价
    /// 2) quantity 不变,重算 amount
    /// 3) 合同生效且该材料未审批改价 → 锁定
    /// 4) 合同过期 → 生成过期提示
    ///
    /// 已改价的材料重新选择时按解析价填入,保持解锁
    #[instrument(skip(self, session, material), fields(material_id = %material.id))]
    pub fn set_material(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        material: &Material,
    ) -> PricingResult<RateResolution> {
        ensure_non_negative("standard_price", material.standard_price)?;
        session.line(index)?;

        let resolution =
            RateResolver::resolve_from_catalog(material, session.catalog(), session.today());

        {
            let line = session.line_mut(index)?;
            line.material_id = Some(material.id.clone());
            line.material_name = Some(material.name.clone());
            line.unit = Some(material.unit.clone());
            line.effective_rate = resolution.effective_rate;
            line.contract_active = resolution.contract_active;
            line.rationale = Some(resolution.rationale);
            line.rate = resolution.effective_rate;
            line.stock_level = None;
            line.recompute_amount();
        }
        session.refresh_line_flags();

        if let RateRationale::Expired { end_date } = resolution.rationale {
            let warning = warnings::contract_expired(
                session.kind(),
                &material.id,
                end_date,
                resolution.effective_rate,
                index,
            );
            session.push_warning(warning);
        }

        Ok(resolution)
    }

    // ==========================================
    // 修改数量
    // ==========================================

    /// 修改订单行数量
    ///
    /// amount = quantity × rate;有库存快照时判定库存充足度（仅提示）
    ///
    /// # 返回
    /// - 库存充足度（无快照或快照不属于该行材料时为 None）
    #[instrument(skip(self, session, snapshot))]
    pub fn set_quantity(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        quantity: f64,
        snapshot: Option<&StockSnapshot>,
    ) -> PricingResult<Option<StockLevel>> {
        ensure_non_negative("quantity", quantity)?;

        let line = session.line_mut(index)?;
        line.quantity = quantity;
        line.recompute_amount();

        match snapshot {
            Some(snapshot) => self.classify_stock(session, index, snapshot),
            None => Ok(None),
        }
    }

    /// 按库存快照判定订单行库存充足度
    ///
    /// 快照材料与订单行材料不一致时视为过期数据,忽略
    pub fn classify_stock(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        snapshot: &StockSnapshot,
    ) -> PricingResult<Option<StockLevel>> {
        let line = session.line_mut(index)?;
        if !line.has_material(&snapshot.material_id) {
            tracing::debug!(
                line_index = index,
                snapshot_material = %snapshot.material_id,
                "库存快照与订单行材料不一致，忽略"
            );
            return Ok(None);
        }

        let quantity = line.quantity;
        let level = StockAdequacyClassifier::classify(quantity, snapshot);
        line.stock_level = Some(level);

        if self.config.stock_warnings_enabled {
            let warning = warnings::stock(level, quantity, snapshot, index);
            session.replace_stock_warning(index, warning);
        }

        Ok(Some(level))
    }

    // ==========================================
    // 修改价格
    // ==========================================

    /// 修改订单行价格
    ///
    /// # 规则
    /// 1) 未锁定或已审批改价 → 直接生效
    /// 2) 锁定且 |新价 - 合同价| ≤ 容差 → 保持合同价,不触发审批
    /// 3) 锁定且超出容差 → 返回 OverrideRequired,订单行不变
    #[instrument(skip(self, session))]
    pub fn set_rate(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        new_rate: f64,
    ) -> PricingResult<RateEdit> {
        ensure_non_negative("rate", new_rate)?;

        let tolerance = self.config.effective_rate_tolerance();
        let line = session.line_mut(index)?;

        if !line.is_locked {
            line.rate = new_rate;
            line.recompute_amount();
            return Ok(RateEdit::Applied { rate: new_rate });
        }

        if (new_rate - line.effective_rate).abs() <= tolerance {
            line.rate = line.effective_rate;
            line.recompute_amount();
            return Ok(RateEdit::WithinTolerance { rate: line.rate });
        }

        let material_id = line.material_id.clone().unwrap_or_default();
        tracing::info!(
            material_id = %material_id,
            original_rate = line.effective_rate,
            requested_rate = new_rate,
            "锁定行改价，需要审批"
        );
        Ok(RateEdit::OverrideRequired {
            material_id,
            original_rate: line.effective_rate,
            requested_rate: new_rate,
        })
    }

    /// 提交改价审批
    ///
    /// # 前置校验（ValidationError）
    /// - 订单行材料与申请一致
    /// - 订单行处于锁定状态
    /// - 申请原价与当前合同价一致（容差内）
    /// - 申请价超出容差（否则无需审批）
    ///
    /// # 成功
    /// - 追加唯一一条审计记录,该材料本会话内永久解锁
    /// - 订单行价格 = 申请价,重算金额
    /// - 生成改价提示
    ///
    /// # 失败
    /// - 订单行与审计日志均不变
    #[instrument(skip(self, session, request), fields(material_id = %request.material_id))]
    pub fn apply_override(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        request: &OverrideRequest,
        approved_at: NaiveDateTime,
    ) -> PricingResult<OverrideAuditRecord> {
        self.check_override_target(session.line(index)?, request)?;

        let approval = self.authorizer.authorize(request, approved_at)?;

        session.append_audit(approval.record.clone());
        {
            let line = session.line_mut(index)?;
            line.rate = request.requested_rate;
            line.recompute_amount();
        }
        session.refresh_line_flags();
        session.push_warning(warnings::rate_overridden(
            &approval.record,
            approval.warning,
            index,
        ));

        Ok(approval.record)
    }

    fn check_override_target(&self, line: &OrderLine, request: &OverrideRequest) -> PricingResult<()> {
        let tolerance = self.config.effective_rate_tolerance();

        if !line.has_material(&request.material_id) {
            return Err(PricingError::validation(
                "material_id",
                format!(
                    "改价申请材料 {} 与订单行材料不一致",
                    request.material_id
                ),
            ));
        }
        if !line.is_locked {
            return Err(PricingError::validation(
                "rate",
                "订单行未锁定，无需改价审批",
            ));
        }
        if (request.original_rate - line.effective_rate).abs() > tolerance {
            return Err(PricingError::validation(
                "original_rate",
                format!(
                    "改价申请已过期：申请原价 {:.3}，当前合同价 {:.3}",
                    request.original_rate, line.effective_rate
                ),
            ));
        }
        if (request.requested_rate - line.effective_rate).abs() <= tolerance {
            return Err(PricingError::validation(
                "requested_rate",
                "申请价与合同价差异在容差内，无需审批",
            ));
        }
        Ok(())
    }
}
