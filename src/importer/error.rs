// ==========================================
// 产线运行速率对账 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 报表级（SchemaError，致命）/ 行级（DateParseError 等，仅影响该行）
// ==========================================

use crate::domain::types::ReportKind;
use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xls/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    // ===== 报表结构错误（致命） =====
    #[error("报表结构错误 ({report}): 缺少必需列 {column}")]
    SchemaError { report: ReportKind, column: String },

    // ===== 行级错误 =====
    #[error("日期格式错误 (行 {row}, 字段 {field}): 期望 dd-Mon-yy，实际 {value}")]
    DateParseError {
        row: usize,
        field: String,
        value: String,
    },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 是否为报表级致命错误
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ImportError::DateParseError { .. })
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for ImportError {
    fn from(err: calamine::Error) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_error_is_fatal() {
        let err = ImportError::SchemaError {
            report: ReportKind::ItemReport,
            column: "Quantity".to_string(),
        };
        assert!(err.is_fatal());
        assert!(err.to_string().contains("Quantity"));
    }

    #[test]
    fn test_date_parse_error_is_row_scoped() {
        let err = ImportError::DateParseError {
            row: 3,
            field: "PromShip".to_string(),
            value: "2024/03/05".to_string(),
        };
        assert!(!err.is_fatal());
    }
}
