// ==========================================
// 产线运行速率对账 - 运行级错误类型
// ==========================================
// 职责: 汇总各层错误，转换为面向用户的一行摘要
// 红线: 任一变体出现即整次运行中止，不产出工作簿
// ==========================================

use crate::config::{ConfigError, RateEditError};
use crate::export::ExportError;
use crate::fetch::FetchError;
use crate::importer::ImportError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RunError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    RateEdit(#[from] RateEditError),

    #[error(transparent)]
    Fetch(FetchError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Export(#[from] ExportError),
}

// 报表已到但解析失败归入导入错误
impl From<FetchError> for RunError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Read { source, .. } => RunError::Import(source),
            other => RunError::Fetch(other),
        }
    }
}

impl RunError {
    /// 面向用户的单行摘要
    pub fn user_summary(&self) -> String {
        match self {
            RunError::Config(e) => format!("配置无效，运行未开始: {}", e),
            RunError::RateEdit(e) => format!("速率表编辑失败，运行未开始: {}", e),
            RunError::Fetch(FetchError::Unavailable { kind, attempts, .. }) => format!(
                "{} 报表在 {} 次尝试后仍不可用，未生成工作簿",
                kind, attempts
            ),
            RunError::Fetch(e) => format!("报表拉取失败，未生成工作簿: {}", e),
            RunError::Import(ImportError::SchemaError { report, column }) => format!(
                "{} 报表缺少必需列 \"{}\"，未生成工作簿",
                report, column
            ),
            RunError::Import(e) => format!("报表解析失败，未生成工作簿: {}", e),
            RunError::Export(e) => format!("工作簿写入失败: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::ReportKind;

    #[test]
    fn test_user_summary_for_unavailable() {
        let err: RunError = FetchError::Unavailable {
            kind: ReportKind::OrderReport,
            attempts: 3,
            last_error: "timeout".to_string(),
        }
        .into();
        let summary = err.user_summary();
        assert!(summary.contains("ORDER_REPORT"));
        assert!(summary.contains('3'));
    }

    #[test]
    fn test_fetch_read_error_becomes_import_error() {
        let err: RunError = FetchError::Read {
            kind: ReportKind::OrderReport,
            source: ImportError::ExcelParseError("zip".to_string()),
        }
        .into();
        assert!(matches!(err, RunError::Import(ImportError::ExcelParseError(_))));
        assert!(err.user_summary().contains("报表解析失败"));
    }

    #[test]
    fn test_user_summary_for_schema_error() {
        let err: RunError = ImportError::SchemaError {
            report: ReportKind::ItemReport,
            column: "Quantity".to_string(),
        }
        .into();
        assert!(err.user_summary().contains("Quantity"));
    }
}
