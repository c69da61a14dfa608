// ==========================================
// 产线运行速率对账 - 应用层
// ==========================================
// 职责: 串联 拉取 / 速率定稿 / 核心计算 / 导出，统一运行级错误
// ==========================================

pub mod error;
pub mod runner;

// 重导出
pub use error::RunError;
pub use runner::{RunSummary, Runner};
