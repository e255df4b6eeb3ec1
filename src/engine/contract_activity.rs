// ==========================================
// 合同定价引擎 - 合同生效判定
// ==========================================
// 规则: status=ACTIVE 且 (无结束日期 或 结束日期 ≥ 今天)
// 红线: 无状态、无副作用、无 I/O 操作
// ==========================================

use crate::domain::contract::ContractRateEntry;
use crate::domain::rate::ContractActivity;
use crate::domain::types::ContractStatus;
use chrono::NaiveDate;

// ==========================================
// ContractActivityEvaluator - 纯函数工具类
// ==========================================
pub struct ContractActivityEvaluator;

impl ContractActivityEvaluator {
    /// 判定合同条目当前是否可执行
    pub fn is_active(entry: &ContractRateEntry, today: NaiveDate) -> bool {
        Self::activity(entry, today).is_active()
    }

    /// 判定合同条目生效状态（带原因）
    ///
    /// # 规则
    /// 1. end_date < today → EXPIRED（无论状态标记）
    /// 2. status=INACTIVE → INACTIVE
    /// 3. 否则 → ACTIVE
    ///
    /// 结束日期按整日计算: end_date 当天仍有效
    pub fn activity(entry: &ContractRateEntry, today: NaiveDate) -> ContractActivity {
        if let Some(end_date) = entry.end_date {
            if end_date < today {
                return ContractActivity::Expired { end_date };
            }
        }

        match entry.status {
            ContractStatus::Active => ContractActivity::Active,
            ContractStatus::Inactive => ContractActivity::Inactive,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::contract::ContractTerms;

    fn entry(status: ContractStatus, end_date: Option<NaiveDate>) -> ContractRateEntry {
        ContractRateEntry {
            material_id: "M1".to_string(),
            terms: ContractTerms::FixedRate { contract_rate: 8.0 },
            start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            end_date,
            status,
            description: String::new(),
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, d).unwrap()
    }

    #[test]
    fn test_open_ended_active() {
        assert!(ContractActivityEvaluator::is_active(&entry(ContractStatus::Active, None), day(10)));
    }

    #[test]
    fn test_end_date_inclusive() {
        let e = entry(ContractStatus::Active, Some(day(10)));
        assert!(ContractActivityEvaluator::is_active(&e, day(10)));
        assert!(!ContractActivityEvaluator::is_active(&e, day(11)));
    }

    #[test]
    fn test_expired_wins_over_status() {
        let e = entry(ContractStatus::Active, Some(day(9)));
        assert_eq!(
            ContractActivityEvaluator::activity(&e, day(10)),
            ContractActivity::Expired { end_date: day(9) }
        );

        let e = entry(ContractStatus::Inactive, Some(day(9)));
        assert_eq!(
            ContractActivityEvaluator::activity(&e, day(10)),
            ContractActivity::Expired { end_date: day(9) }
        );
    }

    #[test]
    fn test_inactive_status() {
        let e = entry(ContractStatus::Inactive, None);
        assert_eq!(
            ContractActivityEvaluator::activity(&e, day(10)),
            ContractActivity::Inactive
        );
        assert!(!ContractActivityEvaluator::is_active(&e, day(10)));
    }
}
