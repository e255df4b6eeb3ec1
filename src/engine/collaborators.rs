// ==========================================
// 合同定价引擎 - 外部协作接口
// ==========================================
// 职责: 定义材料主数据 / 合同价 / 库存查询 trait,实现依赖倒置
// 说明: 引擎层定义 trait,由上游服务或测试实现
// 红线: 引擎不直接访问外部服务
// ==========================================

use crate::domain::contract::RawContractRateRecord;
use crate::domain::material::{Material, StockSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use std::error::Error;

/// 材料主数据查询
#[async_trait]
pub trait MaterialSource: Send + Sync {
    /// 按编号查询材料（不存在时返回 None）
    async fn find_material(
        &self,
        material_id: &str,
    ) -> Result<Option<Material>, Box<dyn Error + Send + Sync>>;
}

/// 合同价记录查询
///
/// 返回未校验的原始记录,由调用方逐条转换为 ContractRateEntry
#[async_trait]
pub trait ContractRateSource: Send + Sync {
    async fn contract_rates_for(
        &self,
        counterparty_id: &str,
    ) -> Result<Vec<RawContractRateRecord>, Box<dyn Error + Send + Sync>>;
}

/// 库存查询（仅用于提示）
#[async_trait]
pub trait StockAdvisor: Send + Sync {
    /// 查询库存快照（无库存记录时返回 None）
    async fn stock_snapshot(
        &self,
        material_id: &str,
    ) -> Result<Option<StockSnapshot>, Box<dyn Error + Send + Sync>>;
}

// ==========================================
// StaticReferenceData - 内存参考数据
// ==========================================
// 用途: 命令行场景回放、测试
#[derive(Debug, Clone, Default)]
pub struct StaticReferenceData {
    materials: HashMap<String, Material>,
    contracts: HashMap<String, Vec<RawContractRateRecord>>,
    stock: HashMap<String, StockSnapshot>,
}

impl StaticReferenceData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_material(mut self, material: Material) -> Self {
        self.materials.insert(material.id.clone(), material);
        self
    }

    pub fn with_contract_rates(
        mut self,
        counterparty_id: &str,
        records: Vec<RawContractRateRecord>,
    ) -> Self {
        self.contracts
            .entry(counterparty_id.to_string())
            .or_default()
            .extend(records);
        self
    }

    pub fn with_stock(mut self, snapshot: StockSnapshot) -> Self {
        self.stock.insert(snapshot.material_id.clone(), snapshot);
        self
    }
}

#[async_trait]
impl MaterialSource for StaticReferenceData {
    async fn find_material(
        &self,
        material_id: &str,
    ) -> Result<Option<Material>, Box<dyn Error + Send + Sync>> {
        Ok(self.materials.get(material_id).cloned())
    }
}

#[async_trait]
impl ContractRateSource for StaticReferenceData {
    async fn contract_rates_for(
        &self,
        counterparty_id: &str,
    ) -> Result<Vec<RawContractRateRecord>, Box<dyn Error + Send + Sync>> {
        Ok(self
            .contracts
            .get(counterparty_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl StockAdvisor for StaticReferenceData {
    async fn stock_snapshot(
        &self,
        material_id: &str,
    ) -> Result<Option<StockSnapshot>, Box<dyn Error + Send + Sync>> {
        Ok(self.stock.get(material_id).cloned())
    }
}
