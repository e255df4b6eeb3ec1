// ==========================================
// 合同定价引擎 - 核心库
// ==========================================
// 场景: 销售订单 / 采购订单录入
// 职责: 合同价解析、合同有效期判定、改价审批与审计、订单汇总、库存提示
// 技术栈: Rust + SQLite
// ==========================================

// 初始化国际化系统
rust_i18n::i18n!("locales", fallback = "zh-CN");

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 引擎错误类型
pub mod error;

// 引擎层 - 定价规则
pub mod engine;

// 数据仓储层 - 审计落库
pub mod repository;

// 导入层 - 合同价文件
pub mod importer;

// 配置层 - 定价参数与审批人
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// 国际化
pub mod i18n;

// API 层 - 订单录入
pub mod api;

// 场景回放
pub mod scenario;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{ContractStatus, OrderKind, StockLevel, WarningKind};

// 领域实体
pub use domain::{
    ApproverCredentialProof, ContractRateEntry, ContractTerms, Material, OrderLine, OrderTotals,
    OverrideAuditRecord, OverrideRequest, RateRationale, RateResolution, RawContractRateRecord,
    SessionWarning, StockSnapshot,
};

// 引擎
pub use engine::{
    ApprovalAuthority, ApproverDirectory, ContractActivityEvaluator, ContractRateCatalog,
    OrderEditingSession, OrderLineCalculator, RateEdit, RateResolver, StockAdequacyClassifier,
};

// 错误
pub use error::{PricingError, PricingResult};

// API
pub use api::{ApiError, ApiResult, OrderEntryApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "合同定价引擎";
