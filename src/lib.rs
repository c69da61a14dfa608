// ==========================================
// 产线运行速率对账 - 核心库
// ==========================================
// 流程: 报表拉取 → 规范化 → 速率对账 → 分组汇总 → 工作簿导出
// 系统定位: 决策支持（关键订单与超负荷告警，不自动排产）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 导入层 - 报表解析与规范化
pub mod importer;

// 引擎层 - 对账与汇总
pub mod engine;

// 拉取层 - 下载目录 + 重试
pub mod fetch;

// 导出层 - xlsx 工作簿
pub mod export;

// 配置层 - 运行参数与速率表编辑
pub mod config;

// 应用层 - 运行编排
pub mod app;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域类型
pub use domain::types::{AlertFlag, GroupField, ReportKind, ValueField};

// 领域实体
pub use domain::{
    AggregateRow, AggregateTable, ItemRecord, OrderRecord, RateTable, RawReport,
    ReconciledOrderRecord,
};

// 引擎
pub use engine::{Aggregator, ReconciliationEngine, ReconciliationPipeline, RunOutput};

// 应用
pub use app::{RunError, RunSummary, Runner};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "产线运行速率对账";
