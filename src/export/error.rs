// ==========================================
// 产线运行速率对账 - 导出错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("工作簿写入失败: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),

    #[error("输出文件写入失败: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub type ExportResult<T> = Result<T, ExportError>;
