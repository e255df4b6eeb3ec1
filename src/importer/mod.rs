// ==========================================
// 合同定价引擎 - 导入层
// ==========================================
// 职责: 合同价导出文件（CSV/Excel）→ 合同目录
// ==========================================

pub mod contract_rate_importer;
pub mod error;
pub mod field_mapper;
pub mod file_parser;

// 重导出核心类型
pub use contract_rate_importer::{
    ContractRateImporter, ImportReport, ImportedContractRates, RowRejection,
};
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ContractFieldMapper, MappedContractRow};
pub use file_parser::{CsvParser, ExcelParser, FileParser, SourceRow, UniversalFileParser};
