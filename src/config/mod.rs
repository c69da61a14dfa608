// ==========================================
// 产线运行速率对账 - 配置层
// ==========================================
// 职责: 运行参数配置 + 速率表定稿
// 存储: JSON key-value 文件
// ==========================================

pub mod config_manager;
pub mod rate_editor;

// 重导出核心配置管理器
pub use config_manager::{config_keys, defaults, ConfigError, ConfigManager};
pub use rate_editor::{
    CliRateEditor, PasteFileRateEditor, RateEditError, RateEditor, RateEditorChain,
};
