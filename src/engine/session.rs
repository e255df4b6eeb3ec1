// ==========================================
// 合同定价引擎 - 订单编辑会话
// ==========================================
// 职责: 持有订单行、合同目录、改价审计日志、折扣/税率、提示
// 归属: 调用方独占,一次只处理一个编辑
// 红线: 审计日志只追加;汇总每次整体重算,不单独保存
// ==========================================

use crate::config::pricing_config::PricingConfig;
use crate::domain::order::{OrderLine, OrderTotals, SessionWarning};
use crate::domain::override_audit::OverrideAuditRecord;
use crate::domain::types::OrderKind;
use crate::engine::catalog::ContractRateCatalog;
use crate::engine::totals::recompute_totals;
use crate::error::{ensure_non_negative, PricingError, PricingResult};
use chrono::NaiveDate;
use std::collections::HashSet;

// ==========================================
// OrderEditingSession - 订单编辑会话
// ==========================================
#[derive(Debug, Clone)]
pub struct OrderEditingSession {
    // ===== 会话上下文 =====
    order_ref: String,
    kind: OrderKind,
    counterparty_id: String,
    today: NaiveDate,
    catalog: ContractRateCatalog,

    // ===== 可变状态 =====
    lines: Vec<OrderLine>,
    override_log: Vec<OverrideAuditRecord>,
    committed_audit_len: usize, // 已落库的审计记录数
    overridden_materials: HashSet<String>,
    warnings: Vec<SessionWarning>,

    // ===== 汇总参数 =====
    discount_percent: f64,
    taxable: bool,
    vat_rate: f64,
}

impl OrderEditingSession {
    /// 创建订单编辑会话
    ///
    /// # 参数
    /// - order_ref: 订单引用（草稿号/单号）
    /// - kind: 销售/采购
    /// - counterparty_id: 客户/供应商
    /// - today: 会话业务日期（合同生效判定基准）
    /// - catalog: 该客户/供应商的合同目录
    /// - config: 默认税率等参数
    pub fn new(
        order_ref: &str,
        kind: OrderKind,
        counterparty_id: &str,
        today: NaiveDate,
        catalog: ContractRateCatalog,
        config: &PricingConfig,
    ) -> Self {
        tracing::info!(
            order_ref,
            order_kind = %kind,
            counterparty_id,
            contract_entries = catalog.entry_count(),
            "订单编辑会话已创建"
        );

        Self {
            order_ref: order_ref.to_string(),
            kind,
            counterparty_id: counterparty_id.to_string(),
            today,
            catalog,
            lines: Vec::new(),
            override_log: Vec::new(),
            committed_audit_len: 0,
            overridden_materials: HashSet::new(),
            warnings: Vec::new(),
            discount_percent: 0.0,
            taxable: config.default_taxable,
            vat_rate: config.default_vat_rate,
        }
    }

    // ==========================================
    // 只读访问
    // ==========================================

    pub fn order_ref(&self) -> &str {
        &self.order_ref
    }

    pub fn kind(&self) -> OrderKind {
        self.kind
    }

    pub fn counterparty_id(&self) -> &str {
        &self.counterparty_id
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn catalog(&self) -> &ContractRateCatalog {
        &self.catalog
    }

    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    pub fn line(&self, index: usize) -> PricingResult<&OrderLine> {
        self.lines
            .get(index)
            .ok_or(PricingError::LineOutOfRange(index))
    }

    /// 改价审计日志（按审批顺序）
    pub fn audit_log(&self) -> &[OverrideAuditRecord] {
        &self.override_log
    }

    /// 尚未落库的审计记录
    pub fn pending_audit(&self) -> &[OverrideAuditRecord] {
        &self.override_log[self.committed_audit_len..]
    }

    /// 该材料在本会话内是否已审批改价
    pub fn is_overridden(&self, material_id: &str) -> bool {
        self.overridden_materials.contains(material_id)
    }

    pub fn warnings(&self) -> &[SessionWarning] {
        &self.warnings
    }

    /// 取出并清空提示（界面展示后调用）
    pub fn drain_warnings(&mut self) -> Vec<SessionWarning> {
        std::mem::take(&mut self.warnings)
    }

    pub fn discount_percent(&self) -> f64 {
        self.discount_percent
    }

    pub fn taxable(&self) -> bool {
        self.taxable
    }

    pub fn vat_rate(&self) -> f64 {
        self.vat_rate
    }

    /// 订单汇总（每次由订单行整体重算）
    pub fn totals(&self) -> OrderTotals {
        recompute_totals(&self.lines, self.discount_percent, self.taxable, self.vat_rate)
    }

    // ==========================================
    // 订单行增删
    // ==========================================

    /// 新增空订单行,返回行号
    pub fn add_line(&mut self) -> usize {
        self.lines.push(OrderLine::empty());
        self.lines.len() - 1
    }

    /// 删除订单行（审计记录保留）
    pub fn remove_line(&mut self, index: usize) -> PricingResult<OrderLine> {
        if index >= self.lines.len() {
            return Err(PricingError::LineOutOfRange(index));
        }
        Ok(self.lines.remove(index))
    }

    // ==========================================
    // 折扣与税率
    // ==========================================

    /// 设置整单折扣（0-100）
    pub fn set_discount(&mut self, discount_percent: f64) -> PricingResult<OrderTotals> {
        ensure_non_negative("discount_percent", discount_percent)?;
        if discount_percent > 100.0 {
            return Err(PricingError::validation(
                "discount_percent",
                format!("折扣比例超出范围 [0, 100]: {}", discount_percent),
            ));
        }
        self.discount_percent = discount_percent;
        Ok(self.totals())
    }

    /// 设置是否计税与税率
    pub fn set_tax(&mut self, taxable: bool, vat_rate: f64) -> PricingResult<OrderTotals> {
        ensure_non_negative("vat_rate", vat_rate)?;
        self.taxable = taxable;
        self.vat_rate = vat_rate;
        Ok(self.totals())
    }

    // ==========================================
    // 引擎内部写入
    // ==========================================

    pub(crate) fn line_mut(&mut self, index: usize) -> PricingResult<&mut OrderLine> {
        self.lines
            .get_mut(index)
            .ok_or(PricingError::LineOutOfRange(index))
    }

    pub(crate) fn push_warning(&mut self, warning: SessionWarning) {
        self.warnings.push(warning);
    }

    /// 替换订单行的库存提示（None 表示清除）
    pub(crate) fn replace_stock_warning(&mut self, line_index: usize, warning: Option<SessionWarning>) {
        self.warnings
            .retain(|w| !(w.line_index == Some(line_index) && w.kind.is_stock()));
        if let Some(warning) = warning {
            self.warnings.push(warning);
        }
    }

    /// 追加审计记录并标记材料已改价
    pub(crate) fn append_audit(&mut self, record: OverrideAuditRecord) {
        self.overridden_materials.insert(record.material_id.clone());
        self.override_log.push(record);
    }

    /// 提交成功后标记审计日志已全部落库
    pub(crate) fn mark_audit_committed(&mut self) {
        self.committed_audit_len = self.override_log.len();
    }

    /// 按审计日志刷新订单行的锁定/改价标记
    pub(crate) fn refresh_line_flags(&mut self) {
        let overridden = &self.overridden_materials;
        for line in self.lines.iter_mut() {
            line.is_overridden = line
                .material_id
                .as_deref()
                .map(|id| overridden.contains(id))
                .unwrap_or(false);
            line.is_locked = line.contract_active && !line.is_overridden;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> OrderEditingSession {
        OrderEditingSession::new(
            "SO-0001",
            OrderKind::Sales,
            "C-001",
            NaiveDate::from_ymd_opt(2026, 5, 15).unwrap(),
            ContractRateCatalog::empty(),
            &PricingConfig::default(),
        )
    }

    #[test]
    fn test_add_remove_lines() {
        let mut s = session();
        assert_eq!(s.add_line(), 0);
        assert_eq!(s.add_line(), 1);
        assert!(s.remove_line(5).is_err());
        s.remove_line(0).unwrap();
        assert_eq!(s.lines().len(), 1);
        assert!(matches!(s.line(1), Err(PricingError::LineOutOfRange(1))));
    }

    #[test]
    fn test_discount_validation_keeps_state() {
        let mut s = session();
        s.set_discount(10.0).unwrap();
        assert!(s.set_discount(150.0).is_err());
        assert!(s.set_discount(-1.0).is_err());
        assert_eq!(s.discount_percent(), 10.0);
    }

    #[test]
    fn test_tax_defaults_from_config() {
        let mut s = session();
        assert!(s.taxable());
        assert_eq!(s.vat_rate(), 5.0);

        let totals = s.set_tax(false, 15.0).unwrap();
        assert_eq!(totals.vat_amount, 0.0);
        assert!(s.set_tax(true, -5.0).is_err());
        assert!(!s.taxable());
    }

    #[test]
    fn test_pending_audit_advances_on_commit() {
        use crate::domain::override_audit::{
            Approver, ApproverCredentialProof, OverrideAuditRecord, OverrideRequest,
        };

        let mut s = session();
        let approver = Approver {
            approver_id: "u-1".to_string(),
            display_name: "Finance Lead".to_string(),
        };
        let at = NaiveDate::from_ymd_opt(2026, 5, 15)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        let record = |material: &str| {
            let request = OverrideRequest::new(
                material,
                8.0,
                9.0,
                "customer requested adjustment",
                ApproverCredentialProof::new("tok-1"),
            );
            OverrideAuditRecord::from_approved(&request, &approver, at)
        };

        s.append_audit(record("M1"));
        assert_eq!(s.pending_audit().len(), 1);

        s.mark_audit_committed();
        assert!(s.pending_audit().is_empty());
        assert_eq!(s.audit_log().len(), 1);

        s.append_audit(record("M2"));
        assert_eq!(s.pending_audit().len(), 1);
        assert_eq!(s.pending_audit()[0].material_id, "M2");
    }

    #[test]
    fn test_drain_warnings() {
        let mut s = session();
        s.push_warning(SessionWarning {
            kind: crate::domain::types::WarningKind::StockLow,
            material_id: None,
            line_index: None,
            message: "x".to_string(),
        });
        assert_eq!(s.drain_warnings().len(), 1);
        assert!(s.warnings().is_empty());
    }
}
