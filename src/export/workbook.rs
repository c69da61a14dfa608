// ==========================================
// 产线运行速率对账 - 工作簿导出
// ==========================================
// 职责: 将单次运行产物写为多工作表 xlsx
// 红线: 只在全部阶段成功后调用；写入失败不留半成品文件
// ==========================================

use crate::engine::orchestrator::RunOutput;
use crate::export::error::{ExportError, ExportResult};
use crate::export::sheets::{build_sheets, CellValue, SheetData, MISSING_VALUE};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::fs;
use std::path::Path;
use tracing::{info, instrument};

// ==========================================
// WorkbookExporter Trait
// ==========================================
pub trait WorkbookExporter {
    fn export(&self, output: &RunOutput, path: &Path) -> ExportResult<()>;
}

// ==========================================
// XlsxWorkbookExporter
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct XlsxWorkbookExporter;

impl WorkbookExporter for XlsxWorkbookExporter {
    #[instrument(skip(self, output), fields(run_id = %output.run_id, path = %path.display()))]
    fn export(&self, output: &RunOutput, path: &Path) -> ExportResult<()> {
        let sheets = build_sheets(output);
        let mut workbook = Workbook::new();
        let header_format = Format::new().set_bold();

        for sheet in &sheets {
            let worksheet = workbook.add_worksheet();
            write_sheet(worksheet, sheet, &header_format)?;
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| ExportError::Io {
                path: parent.display().to_string(),
                source,
            })?;
        }

        // 写临时文件后改名，失败时不留半成品
        let tmp_path = path.with_extension("xlsx.tmp");
        if let Err(e) = workbook.save(&tmp_path) {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        fs::rename(&tmp_path, path).map_err(|source| {
            let _ = fs::remove_file(&tmp_path);
            ExportError::Io {
                path: path.display().to_string(),
                source,
            }
        })?;

        info!(
            sheets = sheets.len(),
            critical = output.critical_count(),
            "工作簿已导出"
        );
        Ok(())
    }
}

fn write_sheet(
    worksheet: &mut Worksheet,
    sheet: &SheetData,
    header_format: &Format,
) -> ExportResult<()> {
    worksheet.set_name(sheet.name)?;

    for (col, header) in sheet.headers.iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, header, header_format)?;
    }

    for (row_idx, cells) in sheet.rows.iter().enumerate() {
        let row = (row_idx + 1) as u32;
        for (col, cell) in cells.iter().enumerate() {
            let col = col as u16;
            match cell {
                CellValue::Text(text) => {
                    worksheet.write_string(row, col, text)?;
                }
                CellValue::Number(value) => {
                    worksheet.write_number(row, col, *value)?;
                }
                CellValue::Bool(value) => {
                    worksheet.write_boolean(row, col, *value)?;
                }
                CellValue::Missing => {
                    worksheet.write_string(row, col, MISSING_VALUE)?;
                }
            }
        }
    }

    Ok(())
}
