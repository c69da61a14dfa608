// ==========================================
// 产线运行速率对账 - 配置管理器
// ==========================================
// 职责: 配置加载、查询、覆写管理
// 存储: JSON key-value 文件（等价于单一 global scope）
// 红线: 配置缺失或格式错误回退默认值，不使运行失败
// ==========================================

use crate::engine::orchestrator::PipelineSettings;
use crate::fetch::retry::RetryPolicy;
use serde_json::json;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// 配置目录名（位于系统配置目录下）
pub const CONFIG_DIR_NAME: &str = "cell-run-rates";
/// 配置文件名
pub const CONFIG_FILE_NAME: &str = "config.json";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读写失败: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("配置文件格式错误: {path}: {source}")]
    Format {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("无法定位系统配置目录")]
    NoConfigDir,
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
#[derive(Debug, Clone, Default)]
pub struct ConfigManager {
    values: BTreeMap<String, String>,
}

impl ConfigManager {
    /// 空配置（全部使用默认值）
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// 从指定文件加载配置
    ///
    /// # 说明
    /// 文件不存在时返回空配置（首次运行），格式错误返回 Err
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "配置文件不存在，使用默认配置");
            return Ok(Self::default());
        }

        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let values: BTreeMap<String, String> =
            serde_json::from_str(&text).map_err(|source| ConfigError::Format {
                path: path.display().to_string(),
                source,
            })?;

        debug!(path = %path.display(), keys = values.len(), "配置已加载");
        Ok(Self { values })
    }

    /// 从默认位置加载: {config_dir}/cell-run-rates/config.json
    pub fn load_default() -> Result<Self, ConfigError> {
        Self::load(Self::default_path()?)
    }

    pub fn default_path() -> Result<PathBuf, ConfigError> {
        dirs::config_dir()
            .map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// 读取配置值
    pub fn get_config_value(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// 覆写配置值（仅内存，命令行覆写使用）
    pub fn set_config_value(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> String {
        self.get_config_value(key).unwrap_or(default).to_string()
    }

    fn get_parsed_or_default<T: std::str::FromStr + Copy>(&self, key: &str, default: T) -> T {
        match self.get_config_value(key) {
            None => default,
            Some(raw) => raw.trim().parse::<T>().unwrap_or_else(|_| {
                warn!(config_key = key, value = raw, "配置值格式错误，使用默认值");
                default
            }),
        }
    }

    /// 获取所有配置的快照（JSON格式，用于运行日志）
    pub fn get_config_snapshot(&self) -> String {
        json!(self.values).to_string()
    }

    // ===== 路径配置 =====

    /// 下载目录（默认: 系统下载目录，缺失时为当前目录下 downloads）
    pub fn downloads_dir(&self) -> PathBuf {
        match self.get_config_value(config_keys::DOWNLOADS_DIR) {
            Some(dir) => PathBuf::from(dir),
            None => dirs::download_dir().unwrap_or_else(|| PathBuf::from("downloads")),
        }
    }

    pub fn output_path(&self) -> PathBuf {
        PathBuf::from(self.get_config_or_default(config_keys::OUTPUT_PATH, defaults::OUTPUT_PATH))
    }

    pub fn log_file(&self) -> Option<PathBuf> {
        self.get_config_value(config_keys::LOG_FILE)
            .filter(|v| !v.trim().is_empty())
            .map(PathBuf::from)
    }

    pub fn order_report_marker(&self) -> String {
        self.get_config_or_default(config_keys::ORDER_REPORT_MARKER, defaults::ORDER_REPORT_MARKER)
    }

    pub fn item_report_marker(&self) -> String {
        self.get_config_or_default(config_keys::ITEM_REPORT_MARKER, defaults::ITEM_REPORT_MARKER)
    }

    // ===== 计算参数 =====

    pub fn buyer_prefix(&self) -> String {
        self.get_config_or_default(config_keys::BUYER_PREFIX, defaults::BUYER_PREFIX)
    }

    pub fn alert_threshold(&self) -> f64 {
        self.get_parsed_or_default(config_keys::ALERT_THRESHOLD, defaults::ALERT_THRESHOLD)
    }

    pub fn half_day_fraction(&self) -> f64 {
        self.get_parsed_or_default(config_keys::HALF_DAY_FRACTION, defaults::HALF_DAY_FRACTION)
    }

    /// 编排参数
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            buyer_prefix: self.buyer_prefix(),
            alert_threshold: self.alert_threshold(),
            half_day_fraction: self.half_day_fraction(),
        }
    }

    // ===== 拉取重试 =====

    pub fn fetch_max_attempts(&self) -> u32 {
        let attempts =
            self.get_parsed_or_default(config_keys::FETCH_MAX_ATTEMPTS, defaults::FETCH_MAX_ATTEMPTS);
        attempts.max(1)
    }

    pub fn fetch_backoff(&self) -> Duration {
        Duration::from_secs(
            self.get_parsed_or_default(config_keys::FETCH_BACKOFF_SECS, defaults::FETCH_BACKOFF_SECS),
        )
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.fetch_max_attempts(), self.fetch_backoff())
    }
}

// ==========================================
// 配置键常量
// ==========================================
pub mod config_keys {
    // 路径
    pub const DOWNLOADS_DIR: &str = "downloads_dir";
    pub const OUTPUT_PATH: &str = "output_path";
    pub const LOG_FILE: &str = "log_file";

    // 报表识别（文件名包含）
    pub const ORDER_REPORT_MARKER: &str = "order_report_marker";
    pub const ITEM_REPORT_MARKER: &str = "item_report_marker";

    // 计算参数
    pub const BUYER_PREFIX: &str = "buyer_prefix";
    pub const ALERT_THRESHOLD: &str = "alert_threshold";
    pub const HALF_DAY_FRACTION: &str = "half_day_fraction";

    // 拉取重试
    pub const FETCH_MAX_ATTEMPTS: &str = "fetch_max_attempts";
    pub const FETCH_BACKOFF_SECS: &str = "fetch_backoff_secs";
}

// ==========================================
// 默认值
// ==========================================
pub mod defaults {
    pub const OUTPUT_PATH: &str = "Item Breakdown.xlsx";
    pub const ORDER_REPORT_MARKER: &str = "CoDate";
    pub const ITEM_REPORT_MARKER: &str = "Item";
    pub const BUYER_PREFIX: &str = "8";
    pub const ALERT_THRESHOLD: f64 = 4000.0;
    pub const HALF_DAY_FRACTION: f64 = 0.5;
    pub const FETCH_MAX_ATTEMPTS: u32 = 3;
    pub const FETCH_BACKOFF_SECS: u64 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_empty() {
        let config = ConfigManager::in_memory();
        assert_eq!(config.buyer_prefix(), "8");
        assert_eq!(config.alert_threshold(), 4000.0);
        assert_eq!(config.half_day_fraction(), 0.5);
        assert_eq!(config.fetch_max_attempts(), 3);
        assert_eq!(config.fetch_backoff(), Duration::from_secs(5));
        assert_eq!(config.output_path(), PathBuf::from("Item Breakdown.xlsx"));
        assert_eq!(config.order_report_marker(), "CoDate");
        assert!(config.log_file().is_none());
    }

    #[test]
    fn test_invalid_value_falls_back_to_default() {
        let mut config = ConfigManager::in_memory();
        config.set_config_value(config_keys::ALERT_THRESHOLD, "lots");
        config.set_config_value(config_keys::FETCH_MAX_ATTEMPTS, "0");
        assert_eq!(config.alert_threshold(), 4000.0);
        assert_eq!(config.fetch_max_attempts(), 1);
    }

    #[test]
    fn test_load_file_values() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"buyer_prefix": "83", "half_day_fraction": "0.25"}"#).unwrap();

        let settings = ConfigManager::load(&path).unwrap().pipeline_settings();
        assert_eq!(settings.buyer_prefix, "83");
        assert_eq!(settings.half_day_fraction, 0.25);
        assert_eq!(settings.alert_threshold, 4000.0);
    }

    #[test]
    fn test_missing_file_is_empty_config() {
        let dir = TempDir::new().unwrap();
        let config = ConfigManager::load(dir.path().join("absent.json")).unwrap();
        assert_eq!(config.buyer_prefix(), "8");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            ConfigManager::load(&path),
            Err(ConfigError::Format { .. })
        ));
    }
}
