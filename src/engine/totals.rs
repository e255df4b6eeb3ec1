// ==========================================
// 合同定价引擎 - 订单汇总计算
// ==========================================
// 公式:
//   subtotal        = Σ line.amount
//   discount_amount = subtotal * discount_percent / 100
//   taxable_base    = subtotal - discount_amount
//   vat_amount      = taxable ? taxable_base * vat_rate / 100 : 0
//   net_amount      = taxable_base + vat_amount
// 红线: 每次由订单行整体重算,不做增量修补
// ==========================================

use crate::domain::order::{OrderLine, OrderTotals};

/// 由订单行整体重算订单汇总
///
/// 对同一输入重复调用,结果逐位相同（求和顺序固定为订单行顺序）
pub fn recompute_totals(
    lines: &[OrderLine],
    discount_percent: f64,
    taxable: bool,
    vat_rate: f64,
) -> OrderTotals {
    let subtotal: f64 = lines.iter().map(|l| l.amount).sum();
    let discount_amount = subtotal * discount_percent / 100.0;
    let taxable_base = subtotal - discount_amount;
    let vat_amount = if taxable {
        taxable_base * vat_rate / 100.0
    } else {
        0.0
    };

    OrderTotals {
        subtotal,
        discount_percent,
        discount_amount,
        vat_rate,
        vat_amount,
        net_amount: taxable_base + vat_amount,
    }
}
