// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use order_pricing::config::ApproverGrant;
use order_pricing::domain::contract::{ContractRateEntry, ContractTerms, RawContractRateRecord};
use order_pricing::domain::material::StockSnapshot;
use order_pricing::domain::types::ContractStatus;
use order_pricing::engine::ApproverDirectory;

/// 测试基准日期
pub fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 5, 15).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ==========================================
// ContractRateEntry 构建器
// ==========================================

pub struct ContractEntryBuilder {
    material_id: String,
    terms: ContractTerms,
    start_date: NaiveDate,
    end_date: Option<NaiveDate>,
    status: ContractStatus,
}

impl ContractEntryBuilder {
    /// 默认: 固定价 8.0,年初生效,下月到期,生效状态
    pub fn new(material_id: &str) -> Self {
        Self {
            material_id: material_id.to_string(),
            terms: ContractTerms::FixedRate { contract_rate: 8.0 },
            start_date: date(2026, 1, 1),
            end_date: Some(date(2026, 6, 15)),
            status: ContractStatus::Active,
        }
    }

    pub fn fixed_rate(mut self, rate: f64) -> Self {
        self.terms = ContractTerms::FixedRate { contract_rate: rate };
        self
    }

    pub fn discount(mut self, pct: f64) -> Self {
        self.terms = ContractTerms::DiscountPercentage {
            discount_percentage: pct,
        };
        self
    }

    pub fn minimum_guarantee(mut self, rate: f64) -> Self {
        self.terms = ContractTerms::MinimumPriceGuarantee { contract_rate: rate };
        self
    }

    pub fn start(mut self, d: NaiveDate) -> Self {
        self.start_date = d;
        self
    }

    pub fn ends(mut self, d: NaiveDate) -> Self {
        self.end_date = Some(d);
        self
    }

    pub fn open_ended(mut self) -> Self {
        self.end_date = None;
        self
    }

    pub fn inactive(mut self) -> Self {
        self.status = ContractStatus::Inactive;
        self
    }

    pub fn build(self) -> ContractRateEntry {
        ContractRateEntry {
            material_id: self.material_id,
            terms: self.terms,
            start_date: self.start_date,
            end_date: self.end_date,
            status: self.status,
            description: String::new(),
        }
    }

    /// 生成等价的原始记录（协作接口返回形态）
    pub fn build_raw(self) -> RawContractRateRecord {
        let (variant, contract_rate, discount_percentage) = match self.terms {
            ContractTerms::FixedRate { contract_rate } => ("FIXED_RATE", Some(contract_rate), None),
            ContractTerms::DiscountPercentage {
                discount_percentage,
            } => ("DISCOUNT_PERCENTAGE", None, Some(discount_percentage)),
            ContractTerms::MinimumPriceGuarantee { contract_rate } => {
                ("MINIMUM_PRICE_GUARANTEE", Some(contract_rate), None)
            }
        };
        RawContractRateRecord {
            material_id: Some(self.material_id),
            variant: Some(variant.to_string()),
            contract_rate,
            discount_percentage,
            start_date: Some(self.start_date),
            end_date: self.end_date,
            status: Some(self.status.to_string()),
            description: None,
        }
    }
}

// ==========================================
// 库存与审批人
// ==========================================

pub fn stock(material_id: &str, current_stock: f64, reorder_level: f64) -> StockSnapshot {
    StockSnapshot {
        material_id: material_id.to_string(),
        current_stock,
        reorder_level,
        unit: "bag".to_string(),
    }
}

pub const VALID_TOKEN: &str = "tok-finance-lead";

pub fn approver_grant(approver_id: &str, credential: &str) -> ApproverGrant {
    ApproverGrant {
        approver_id: approver_id.to_string(),
        display_name: format!("Approver {}", approver_id),
        credential: credential.to_string(),
        max_deviation_percent: None,
        enabled: true,
    }
}

/// 单个审批人（u-finance / VALID_TOKEN）
pub fn approver_directory() -> ApproverDirectory {
    ApproverDirectory::from_grants(vec![approver_grant("u-finance", VALID_TOKEN)])
}
