// ==========================================
// 产线运行速率对账 - 报表来源
// ==========================================
// 职责: 按报表类型定位并解析下载目录中的最新报表文件
// 识别: 文件名包含标记（报表 A: "CoDate"，报表 B: "Item"）
// ==========================================

use crate::domain::report::RawReport;
use crate::domain::types::ReportKind;
use crate::fetch::error::{FetchError, FetchResult};
use crate::importer::error::ImportError;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::report_importer_trait::FileParser;
use async_trait::async_trait;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{debug, info, warn};

/// 可识别的报表扩展名
const REPORT_EXTENSIONS: &[&str] = &["xlsx", "xls", "csv"];

// ==========================================
// ReportSource Trait
// ==========================================
#[async_trait]
pub trait ReportSource: Send + Sync {
    /// 拉取一份原始报表（单次尝试，不含重试）
    async fn fetch(&self, kind: ReportKind) -> FetchResult<RawReport>;

    /// 清理过期报表，每类报表保留最新一份；不落地文件的来源无需实现
    fn clean_stale(&self) -> FetchResult<usize> {
        Ok(0)
    }
}

// ==========================================
// DirectoryReportSource - 下载目录来源
// ==========================================
pub struct DirectoryReportSource {
    dir: PathBuf,
    order_marker: String,
    item_marker: String,
}

impl DirectoryReportSource {
    pub fn new(
        dir: impl AsRef<Path>,
        order_marker: impl Into<String>,
        item_marker: impl Into<String>,
    ) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            order_marker: order_marker.into(),
            item_marker: item_marker.into(),
        }
    }

    pub fn marker(&self, kind: ReportKind) -> &str {
        match kind {
            ReportKind::OrderReport => &self.order_marker,
            ReportKind::ItemReport => &self.item_marker,
        }
    }

    /// 定位最新的匹配文件
    ///
    /// # 说明
    /// 报表 A 的文件名不得同时包含报表 B 的标记
    pub fn locate(&self, kind: ReportKind) -> FetchResult<PathBuf> {
        let marker = self.marker(kind);
        let exclude = match kind {
            ReportKind::OrderReport => Some(self.item_marker.as_str()),
            ReportKind::ItemReport => None,
        };

        let entries = fs::read_dir(&self.dir).map_err(|source| FetchError::Io {
            dir: self.dir.display().to_string(),
            source,
        })?;

        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_report_file(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.contains(marker) {
                continue;
            }
            if exclude.is_some_and(|x| x != marker && name.contains(x)) {
                continue;
            }
            let modified = entry
                .metadata()
                .and_then(|m| m.modified())
                .unwrap_or(SystemTime::UNIX_EPOCH);
            if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                newest = Some((modified, path));
            }
        }

        newest.map(|(_, path)| path).ok_or_else(|| FetchError::NotFound {
            kind,
            dir: self.dir.display().to_string(),
            marker: marker.to_string(),
        })
    }
}

#[async_trait]
impl ReportSource for DirectoryReportSource {
    async fn fetch(&self, kind: ReportKind) -> FetchResult<RawReport> {
        let path = self.locate(kind)?;
        debug!(kind = %kind, path = %path.display(), "解析报表文件");

        let parse_path = path.clone();
        let report = tokio::task::spawn_blocking(move || {
            UniversalFileParser.parse_to_raw_report(&parse_path)
        })
        .await
        .map_err(|e| FetchError::Read {
            kind,
            source: ImportError::InternalError(e.to_string()),
        })?
        .map_err(|source| FetchError::Read { kind, source })?;

        info!(kind = %kind, path = %path.display(), rows = report.len(), "报表已读取");
        Ok(report)
    }

    /// 删除文件名带报表标记、但不是该类最新文件的报表
    ///
    /// # 返回
    /// 删除的文件数；单个文件删除失败只记录日志
    fn clean_stale(&self) -> FetchResult<usize> {
        if !self.dir.exists() {
            return Ok(0);
        }

        let current: Vec<PathBuf> = [ReportKind::OrderReport, ReportKind::ItemReport]
            .into_iter()
            .filter_map(|kind| self.locate(kind).ok())
            .collect();

        let entries = fs::read_dir(&self.dir).map_err(|source| FetchError::Io {
            dir: self.dir.display().to_string(),
            source,
        })?;

        let mut removed = 0;
        for entry in entries.flatten() {
            let path = entry.path();
            if !is_report_file(&path) || current.contains(&path) {
                continue;
            }
            let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            if !name.contains(&self.order_marker) && !name.contains(&self.item_marker) {
                continue;
            }
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                Err(e) => warn!(path = %path.display(), error = %e, "旧报表删除失败"),
            }
        }

        info!(dir = %self.dir.display(), removed, kept = current.len(), "过期报表已清理");
        Ok(removed)
    }
}

fn is_report_file(path: &Path) -> bool {
    path.is_file()
        && path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| REPORT_EXTENSIONS.iter().any(|x| e.eq_ignore_ascii_case(x)))
            .unwrap_or(false)
}
