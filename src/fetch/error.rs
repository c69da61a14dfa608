// ==========================================
// 产线运行速率对账 - 报表拉取错误类型
// ==========================================

use crate::domain::types::ReportKind;
use crate::importer::error::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    // ===== 单次尝试失败（可重试） =====
    #[error("{kind} 报表未就绪: 目录 {dir} 中没有文件名包含 \"{marker}\" 的报表")]
    NotFound {
        kind: ReportKind,
        dir: String,
        marker: String,
    },

    #[error("下载目录访问失败: {dir}: {source}")]
    Io {
        dir: String,
        #[source]
        source: std::io::Error,
    },

    // ===== 文件已到但无法解析（不重试） =====
    #[error("{kind} 报表读取失败: {source}")]
    Read {
        kind: ReportKind,
        #[source]
        source: ImportError,
    },

    // ===== 重试耗尽（致命） =====
    #[error("{kind} 报表不可用: 已尝试 {attempts} 次，最后错误: {last_error}")]
    Unavailable {
        kind: ReportKind,
        attempts: u32,
        last_error: String,
    },
}

impl FetchError {
    /// 报表尚未就绪，等待后可能成功
    pub fn is_retryable(&self) -> bool {
        matches!(self, FetchError::NotFound { .. } | FetchError::Io { .. })
    }
}

pub type FetchResult<T> = Result<T, FetchError>;
