// ==========================================
// 产线运行速率对账 - 领域模型层
// ==========================================
// 职责: 定义领域实体、类型
// 红线: 不含文件读取逻辑,不含引擎逻辑
// ==========================================

pub mod aggregate;
pub mod item;
pub mod order;
pub mod rate;
pub mod report;
pub mod types;

// 重导出核心类型
pub use aggregate::{AggregateRow, AggregateTable};
pub use item::{ItemRecord, RawItemRecord};
pub use order::{Aggregatable, OrderRecord, ReconciledOrderRecord};
pub use rate::{BulkUpsertOutcome, RateEntry, RateInputError, RateTable, DEFAULT_CELL_RUN_RATES};
pub use report::{IssueLevel, RawReport, RowIssue};
pub use types::{AlertFlag, GroupField, ReportKind, ValueField};
