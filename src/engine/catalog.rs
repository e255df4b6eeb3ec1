// ==========================================
// 合同定价引擎 - 合同价格目录
// ==========================================
// 职责: 按材料编号索引合同价格条目
// 生命周期: 会话开始时加载,会话内不可变
// ==========================================

use crate::domain::contract::ContractRateEntry;
use crate::engine::contract_activity::ContractActivityEvaluator;
use chrono::NaiveDate;
use std::collections::HashMap;

// ==========================================
// ContractRateCatalog - 合同价格目录
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ContractRateCatalog {
    entries: HashMap<String, Vec<ContractRateEntry>>,
}

impl ContractRateCatalog {
    /// 创建空目录
    pub fn empty() -> Self {
        Self::default()
    }

    /// 由合同条目构建目录
    pub fn from_entries(entries: impl IntoIterator<Item = ContractRateEntry>) -> Self {
        let mut map: HashMap<String, Vec<ContractRateEntry>> = HashMap::new();
        for entry in entries {
            map.entry(entry.material_id.clone()).or_default().push(entry);
        }
        Self { entries: map }
    }

    /// 材料的全部合同条目
    pub fn entries_for(&self, material_id: &str) -> &[ContractRateEntry] {
        self.entries
            .get(material_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// 是否包含该材料的合同条目
    pub fn contains(&self, material_id: &str) -> bool {
        self.entries.contains_key(material_id)
    }

    /// 选取用于定价的合同条目
    ///
    /// # 规则
    /// 1. 存在生效条目 → 取 start_date 最晚的生效条目
    /// 2. 否则 → 取结束日期最晚的条目（无结束日期视为最晚），用于提示过期/停用
    /// 3. 无条目 → None
    ///
    /// 同一输入恒定返回同一条目（平局按原始顺序取第一个）
    pub fn select(&self, material_id: &str, today: NaiveDate) -> Option<&ContractRateEntry> {
        let candidates = self.entries_for(material_id);
        if candidates.is_empty() {
            return None;
        }

        let mut best_active: Option<&ContractRateEntry> = None;
        for entry in candidates
            .iter()
            .filter(|e| ContractActivityEvaluator::is_active(e, today))
        {
            match best_active {
                Some(current) if current.start_date >= entry.start_date => {}
                _ => best_active = Some(entry),
            }
        }
        if best_active.is_some() {
            return best_active;
        }

        let mut latest: Option<&ContractRateEntry> = None;
        for entry in candidates {
            let later = match latest {
                None => true,
                Some(current) => match (current.end_date, entry.end_date) {
                    (None, _) => false,
                    (Some(_), None) => true,
                    (Some(a), Some(b)) => b > a,
                },
            };
            if later {
                latest = Some(entry);
            }
        }
        latest
    }

    /// 目录中的材料数量
    pub fn material_count(&self) -> usize {
        self.entries.len()
    }

    /// 目录中的条目总数
    pub fn entry_count(&self) -> usize {
        self.entries.values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
