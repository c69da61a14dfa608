// ==========================================
// 产线运行速率对账 - 导入层
// ==========================================
// 职责: 外部报表解析与规范化
// 支持: Excel, CSV
// ==========================================

// 模块声明
pub mod data_cleaner;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod normalizer;
pub mod report_importer_trait;
pub mod schema_validator;

// 重导出核心类型
pub use data_cleaner::DataCleaner as DataCleanerImpl;
pub use error::{ImportError, ImportResult};
pub use field_mapper::{ItemFieldMapper, OrderFieldMapper};
pub use file_parser::{CsvParser, ExcelParser, UniversalFileParser};
pub use normalizer::{
    NormalizationReport, NormalizedItemReport, NormalizedOrderReport, ReportNormalizer,
    DEFAULT_BUYER_PREFIX,
};
pub use schema_validator::{ColumnMap, ColumnSpec, SchemaValidator};

// 重导出 Trait 接口
pub use report_importer_trait::{DataCleaner, FieldMapper, FileParser, MappedRow};
