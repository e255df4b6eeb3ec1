// ==========================================
// 合同定价引擎 - 订单录入 API
// ==========================================
// 职责: 销售/采购订单录入流程的统一入口
// 流程: 协作接口取数（异步）→ 定价引擎计算（同步）→ 提交时审计落库
// 红线: 库存查询失败只记录日志,不阻断录入
// 红线: 审计记录整单一次事务写入
// ==========================================

use std::sync::Arc;

use chrono::NaiveDate;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::api::error::{ApiError, ApiResult};
use crate::config::pricing_config_trait::PricingConfigReader;
use crate::domain::contract::ContractRateEntry;
use crate::domain::material::{Material, StockSnapshot};
use crate::domain::order::{OrderLine, OrderTotals, SessionWarning};
use crate::domain::override_audit::{OverrideAuditRecord, OverrideRequest};
use crate::domain::rate::RateResolution;
use crate::domain::types::{OrderKind, StockLevel};
use crate::engine::authorization::ApproverDirectory;
use crate::engine::catalog::ContractRateCatalog;
use crate::engine::collaborators::{ContractRateSource, MaterialSource, StockAdvisor};
use crate::engine::order_line_calculator::{OrderLineCalculator, RateEdit};
use crate::engine::session::OrderEditingSession;
use crate::error::PricingError;
use crate::repository::override_audit_repo::OverrideAuditRepository;

/// 提交结果
#[derive(Debug, Clone, Serialize)]
pub struct CommittedOrder {
    pub order_ref: String,
    pub order_kind: OrderKind,
    pub counterparty_id: String,
    pub lines: Vec<OrderLine>,
    pub totals: OrderTotals,
    pub audit_records_written: usize,
    pub warnings: Vec<SessionWarning>,
}

// ==========================================
// OrderEntryApi - 订单录入 API
// ==========================================
pub struct OrderEntryApi {
    materials: Arc<dyn MaterialSource>,
    contracts: Arc<dyn ContractRateSource>,
    stock: Arc<dyn StockAdvisor>,
    calculator: OrderLineCalculator,
    audit_repo: Arc<OverrideAuditRepository>,
}

impl OrderEntryApi {
    /// 创建订单录入 API
    pub fn new(
        materials: Arc<dyn MaterialSource>,
        contracts: Arc<dyn ContractRateSource>,
        stock: Arc<dyn StockAdvisor>,
        calculator: OrderLineCalculator,
        audit_repo: Arc<OverrideAuditRepository>,
    ) -> Self {
        Self {
            materials,
            contracts,
            stock,
            calculator,
            audit_repo,
        }
    }

    /// 从配置创建（定价参数 + 审批人授权）
    pub async fn from_config(
        config: &dyn PricingConfigReader,
        materials: Arc<dyn MaterialSource>,
        contracts: Arc<dyn ContractRateSource>,
        stock: Arc<dyn StockAdvisor>,
        audit_repo: Arc<OverrideAuditRepository>,
    ) -> ApiResult<Self> {
        let pricing = config
            .load_pricing_config()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let grants = config
            .list_approver_grants()
            .await
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let directory = ApproverDirectory::from_grants(grants);
        if directory.is_empty() {
            warn!("未配置可用的审批人，所有改价申请都将被拒绝");
        }

        let calculator = OrderLineCalculator::new(pricing, Arc::new(directory));
        Ok(Self::new(materials, contracts, stock, calculator, audit_repo))
    }

    pub fn calculator(&self) -> &OrderLineCalculator {
        &self.calculator
    }

    // ==========================================
    // 会话
    // ==========================================

    /// 打开订单编辑会话
    ///
    /// 加载往来单位的合同价;格式错误的合同条目跳过并记录日志
    #[instrument(skip(self))]
    pub async fn open_session(
        &self,
        order_ref: &str,
        kind: OrderKind,
        counterparty_id: &str,
        today: NaiveDate,
    ) -> ApiResult<OrderEditingSession> {
        let raw_records = self
            .contracts
            .contract_rates_for(counterparty_id)
            .await
            .map_err(|e| ApiError::upstream("contract_rates", e))?;

        let mut entries = Vec::with_capacity(raw_records.len());
        for raw in raw_records {
            let material_id = raw.material_id.clone().unwrap_or_default();
            match ContractRateEntry::try_from(raw) {
                Ok(entry) => entries.push(entry),
                Err(e) => warn!(
                    counterparty_id,
                    material_id = %material_id,
                    error = %e,
                    "合同条目格式错误，已跳过"
                ),
            }
        }

        let catalog = ContractRateCatalog::from_entries(entries);
        Ok(OrderEditingSession::new(
            order_ref,
            kind,
            counterparty_id,
            today,
            catalog,
            self.calculator.config(),
        ))
    }

    // ==========================================
    // 行编辑
    // ==========================================

    /// 选择材料（按编号查询主数据后定价）
    ///
    /// 行已有数量时同时刷新库存提示
    #[instrument(skip(self, session))]
    pub async fn select_material(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        material_id: &str,
    ) -> ApiResult<RateResolution> {
        session.line(index)?;
        let material = self.fetch_material(material_id).await?;
        let resolution = self.calculator.set_material(session, index, &material)?;

        if session.line(index)?.quantity > 0.0 {
            if let Some(snapshot) = self.fetch_stock(material_id).await {
                self.calculator.classify_stock(session, index, &snapshot)?;
            }
        }

        Ok(resolution)
    }

    /// 修改数量（有材料时查询库存并判定充足度）
    #[instrument(skip(self, session))]
    pub async fn change_quantity(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        quantity: f64,
    ) -> ApiResult<Option<StockLevel>> {
        let material_id = session.line(index)?.material_id.clone();

        let snapshot = match material_id {
            Some(id) => self.fetch_stock(&id).await,
            None => None,
        };

        let level = self
            .calculator
            .set_quantity(session, index, quantity, snapshot.as_ref())?;
        Ok(level)
    }

    /// 修改价格
    pub fn edit_rate(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        rate: f64,
    ) -> ApiResult<RateEdit> {
        Ok(self.calculator.set_rate(session, index, rate)?)
    }

    /// 提交改价审批（审批时间取当前本地时间）
    pub fn submit_override(
        &self,
        session: &mut OrderEditingSession,
        index: usize,
        request: &OverrideRequest,
    ) -> ApiResult<OverrideAuditRecord> {
        let approved_at = chrono::Local::now().naive_local();
        Ok(self
            .calculator
            .apply_override(session, index, request, approved_at)?)
    }

    /// 并发刷新全部订单行的库存提示
    ///
    /// # 返回
    /// - 每行的库存充足度（无材料/无库存数据时为 None）
    #[instrument(skip(self, session), fields(order_ref = %session.order_ref()))]
    pub async fn refresh_stock(
        &self,
        session: &mut OrderEditingSession,
    ) -> ApiResult<Vec<Option<StockLevel>>> {
        let targets: Vec<(usize, String)> = session
            .lines()
            .iter()
            .enumerate()
            .filter_map(|(idx, line)| line.material_id.clone().map(|id| (idx, id)))
            .collect();

        let snapshots = join_all(
            targets
                .iter()
                .map(|(_, material_id)| self.fetch_stock(material_id)),
        )
        .await;

        let mut levels = vec![None; session.lines().len()];
        for ((index, _), snapshot) in targets.iter().zip(snapshots) {
            if let Some(snapshot) = snapshot {
                levels[*index] = self.calculator.classify_stock(session, *index, &snapshot)?;
            }
        }
        Ok(levels)
    }

    // ==========================================
    // 提交
    // ==========================================

    /// 提交订单: 未落库的审计记录一次事务写入,返回订单快照
    ///
    /// 会话提交后可继续编辑再次提交,只写入新增的审计记录;
    /// 失败时不写入任何审计记录,会话保持不变可重试
    #[instrument(skip(self, session), fields(order_ref = %session.order_ref()))]
    pub fn commit(&self, session: &mut OrderEditingSession) -> ApiResult<CommittedOrder> {
        let written = self.audit_repo.append_all(
            session.order_ref(),
            session.kind(),
            session.pending_audit(),
        )?;
        session.mark_audit_committed();

        let totals = session.totals();
        info!(
            lines = session.lines().len(),
            audit_records = written,
            net_amount = totals.net_amount,
            "订单已提交"
        );

        Ok(CommittedOrder {
            order_ref: session.order_ref().to_string(),
            order_kind: session.kind(),
            counterparty_id: session.counterparty_id().to_string(),
            lines: session.lines().to_vec(),
            totals,
            audit_records_written: written,
            warnings: session.warnings().to_vec(),
        })
    }

    // ==========================================
    // 协作接口调用
    // ==========================================

    async fn fetch_material(&self, material_id: &str) -> ApiResult<Material> {
        self.materials
            .find_material(material_id)
            .await
            .map_err(|e| ApiError::upstream("materials", e))?
            .ok_or_else(|| PricingError::not_found("Material", material_id).into())
    }

    /// 库存只用于提示: 查询失败记录日志后按无数据处理
    async fn fetch_stock(&self, material_id: &str) -> Option<StockSnapshot> {
        match self.stock.stock_snapshot(material_id).await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(material_id, error = %e, "库存查询失败，跳过库存提示");
                None
            }
        }
    }
}
