// ==========================================
// 合同定价引擎 - 会话提示生成
// ==========================================
// 职责: 合同过期 / 改价 / 库存提示文案
// 红线: 提示只做告知,不影响计算
// ==========================================

use crate::domain::material::StockSnapshot;
use crate::domain::order::SessionWarning;
use crate::domain::override_audit::OverrideAuditRecord;
use crate::domain::types::{OrderKind, StockLevel, WarningKind};
use crate::i18n::{format_rate, t, t_with_args};
use chrono::NaiveDate;

/// 合同过期提示
pub fn contract_expired(
    kind: OrderKind,
    material_id: &str,
    end_date: NaiveDate,
    standard_rate: f64,
    line_index: usize,
) -> SessionWarning {
    let party = t(kind.counterparty_key());
    let message = t_with_args(
        "warning.contract_expired",
        &[
            ("material", material_id),
            ("party", &party),
            ("end_date", &end_date.format("%Y-%m-%d").to_string()),
            ("rate", &format_rate(standard_rate)),
        ],
    );
    SessionWarning {
        kind: WarningKind::ContractExpired,
        material_id: Some(material_id.to_string()),
        line_index: Some(line_index),
        message,
    }
}

/// 改价提示
pub fn rate_overridden(record: &OverrideAuditRecord, message: String, line_index: usize) -> SessionWarning {
    SessionWarning {
        kind: WarningKind::RateOverridden,
        material_id: Some(record.material_id.clone()),
        line_index: Some(line_index),
        message,
    }
}

/// 库存提示（库存充足时返回 None）
pub fn stock(
    level: StockLevel,
    quantity: f64,
    snapshot: &StockSnapshot,
    line_index: usize,
) -> Option<SessionWarning> {
    let (kind, message) = match level {
        StockLevel::Sufficient => return None,
        StockLevel::Insufficient => (
            WarningKind::StockInsufficient,
            t_with_args(
                "warning.stock_insufficient",
                &[
                    ("material", &snapshot.material_id),
                    ("quantity", &quantity.to_string()),
                    ("stock", &snapshot.current_stock.to_string()),
                    ("unit", &snapshot.unit),
                ],
            ),
        ),
        StockLevel::Low => (
            WarningKind::StockLow,
            t_with_args(
                "warning.stock_low",
                &[
                    ("material", &snapshot.material_id),
                    ("stock", &snapshot.current_stock.to_string()),
                    ("unit", &snapshot.unit),
                    ("reorder", &snapshot.reorder_level.to_string()),
                ],
            ),
        ),
    };

    Some(SessionWarning {
        kind,
        material_id: Some(snapshot.material_id.clone()),
        line_index: Some(line_index),
        message,
    })
}
