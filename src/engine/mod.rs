// ==========================================
// 产线运行速率对账 - 引擎层
// ==========================================
// 职责: 对账与汇总规则，不做文件读写
// 红线: 速率表由调用方显式传入，不读取全局状态
// ==========================================

pub mod aggregator;
pub mod orchestrator;
pub mod reconciliation;

// 重导出核心引擎
pub use aggregator::{Aggregator, Rollups, DEFAULT_ALERT_THRESHOLD};
pub use orchestrator::{PipelineSettings, ReconciliationPipeline, RunOutput};
pub use reconciliation::{ReconciliationEngine, DEFAULT_HALF_DAY_FRACTION};
