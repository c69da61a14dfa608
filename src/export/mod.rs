// ==========================================
// 产线运行速率对账 - 导出层
// ==========================================
// 职责: 运行产物 → xlsx 工作簿（八张工作表）
// ==========================================

pub mod error;
pub mod sheets;
pub mod workbook;

pub use error::{ExportError, ExportResult};
pub use sheets::{build_sheets, sheet_names, CellValue, SheetData, MISSING_VALUE};
pub use workbook::{WorkbookExporter, XlsxWorkbookExporter};
