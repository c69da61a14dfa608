// ==========================================
// 产线运行速率对账 - 报表拉取层
// ==========================================
// 职责: 获取两份原始报表（下载目录 + 有界重试）
// 红线: 任一报表重试耗尽 → 整次运行中止，不产出
// ==========================================

pub mod error;
pub mod retry;
pub mod source;

pub use error::{FetchError, FetchResult};
pub use retry::{fetch_with_retry, RetryPolicy};
pub use source::{DirectoryReportSource, ReportSource};
