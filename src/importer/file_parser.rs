// ==========================================
// 产线运行速率对账 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: Excel (.xlsx/.xls) / CSV (.csv)
// ==========================================

use crate::domain::report::RawReport;
use crate::importer::data_cleaner::SHIP_DATE_FORMAT;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report_importer_trait::FileParser;
use calamine::{open_workbook_auto, Data, DataType, Reader};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_report(&self, file_path: &Path) -> ImportResult<RawReport> {
        let path = file_path;

        // 检查文件存在
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        // 检查扩展名
        if let Some(ext) = path.extension() {
            if !ext.eq_ignore_ascii_case("csv") {
                return Err(ImportError::UnsupportedFormat(
                    ext.to_string_lossy().to_string(),
                ));
            }
        }

        let file = File::open(path)?;
        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .flexible(true) // 允许行长度不一致
            .from_reader(file);

        // 读取表头
        let headers: Vec<String> = reader
            .headers()?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for result in reader.records() {
            let record = result?;
            let values: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();
            if let Some(row) = build_row(&headers, values) {
                rows.push(row);
            }
        }

        Ok(RawReport::new(headers, rows))
    }
}

// ==========================================
// Excel Parser 实现
// ==========================================
pub struct ExcelParser;

impl FileParser for ExcelParser {
    fn parse_to_raw_report(&self, file_path: &Path) -> ImportResult<RawReport> {
        let path = file_path;

        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();
        if ext != "xlsx" && ext != "xls" {
            return Err(ImportError::UnsupportedFormat(ext));
        }

        let mut workbook = open_workbook_auto(path)?;

        // 报表门户导出只有一个 sheet，取第一个
        let sheet_names = workbook.sheet_names();
        let sheet_name = sheet_names
            .first()
            .cloned()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无工作表".to_string()))?;

        let range = workbook.worksheet_range(&sheet_name)?;

        // 提取表头（第一行）
        let mut rows_iter = range.rows();
        let header_row = rows_iter
            .next()
            .ok_or_else(|| ImportError::ExcelParseError("Excel 文件无数据行".to_string()))?;

        let headers: Vec<String> = header_row
            .iter()
            .map(|cell| cell_to_text(cell).trim().to_string())
            .collect();

        let mut rows = Vec::new();
        for data_row in rows_iter {
            let values: Vec<String> = data_row
                .iter()
                .map(|cell| cell_to_text(cell).trim().to_string())
                .collect();
            if let Some(row) = build_row(&headers, values) {
                rows.push(row);
            }
        }

        Ok(RawReport::new(headers, rows))
    }
}

/// 单元格 → 文本；日期单元格按承诺发货日期格式输出
fn cell_to_text(cell: &Data) -> String {
    match cell {
        Data::Empty | Data::Error(_) => String::new(),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(|d| d.format(SHIP_DATE_FORMAT).to_string())
            .unwrap_or_else(|| cell.to_string()),
        _ => cell.to_string(),
    }
}

/// 组装行记录；完全空白的行返回 None
fn build_row(headers: &[String], values: Vec<String>) -> Option<HashMap<String, String>> {
    let mut row_map = HashMap::new();
    for (col_idx, value) in values.into_iter().enumerate() {
        if let Some(header) = headers.get(col_idx) {
            if header.is_empty() {
                continue;
            }
            row_map.insert(header.clone(), value);
        }
    }

    if row_map.values().all(|v| v.is_empty()) {
        None
    } else {
        Some(row_map)
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl UniversalFileParser {
    pub fn parse<P: AsRef<Path>>(&self, file_path: P) -> ImportResult<RawReport> {
        let path = file_path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "csv" => CsvParser.parse_to_raw_report(path),
            "xlsx" | "xls" => ExcelParser.parse_to_raw_report(path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}

impl FileParser for UniversalFileParser {
    fn parse_to_raw_report(&self, file_path: &Path) -> ImportResult<RawReport> {
        self.parse(file_path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::Builder;

    fn csv_file(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut temp_file = Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(temp_file, "{}", line).unwrap();
        }
        temp_file
    }

    #[test]
    fn test_csv_parser_valid_file() {
        let temp_file = csv_file(&["Item Number,Buyer,OrderQty", "P-100,801,5", "P-200,802,7"]);

        let report = CsvParser.parse_to_raw_report(temp_file.path()).unwrap();

        assert_eq!(report.headers, vec!["Item Number", "Buyer", "OrderQty"]);
        assert_eq!(report.len(), 2);
        assert_eq!(report.rows[0].get("Item Number"), Some(&"P-100".to_string()));
        assert_eq!(report.rows[1].get("OrderQty"), Some(&"7".to_string()));
    }

    #[test]
    fn test_csv_parser_file_not_found() {
        let result = CsvParser.parse_to_raw_report(Path::new("non_existent.csv"));
        assert!(matches!(result, Err(ImportError::FileNotFound(_))));
    }

    #[test]
    fn test_csv_parser_skip_empty_rows() {
        let temp_file = csv_file(&["Parent,Quantity", "P1,2.5", ",", "P2,3.0"]);

        let report = CsvParser.parse_to_raw_report(temp_file.path()).unwrap();

        // 应跳过空行
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn test_excel_parser_date_and_numeric_cells() {
        use rust_xlsxwriter::{ExcelDateTime, Format, Workbook};

        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("CoDate Report.xlsx");

        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        for (col, header) in ["Item Number", "Buyer", "OrderQty", "PromShip"].iter().enumerate() {
            sheet.write_string(0, col as u16, *header).unwrap();
        }
        let date_format = Format::new().set_num_format("dd-mmm-yy");
        let ship = ExcelDateTime::from_ymd(2024, 3, 5).unwrap();
        sheet.write_number(1, 0, 12345.0).unwrap();
        sheet.write_number(1, 1, 801.0).unwrap();
        sheet.write_number(1, 2, 2.5).unwrap();
        sheet
            .write_datetime_with_format(1, 3, &ship, &date_format)
            .unwrap();
        workbook.save(&path).unwrap();

        let report = ExcelParser.parse_to_raw_report(&path).unwrap();

        assert_eq!(report.len(), 1);
        let row = &report.rows[0];
        assert_eq!(row.get("PromShip"), Some(&"05-Mar-24".to_string()));
        assert_eq!(row.get("Buyer"), Some(&"801".to_string()));
        assert_eq!(row.get("Item Number"), Some(&"12345".to_string()));
        assert_eq!(row.get("OrderQty"), Some(&"2.5".to_string()));
    }

    #[test]
    fn test_universal_parser_rejects_unknown_extension() {
        let result = UniversalFileParser.parse("report.txt");
        assert!(matches!(result, Err(ImportError::UnsupportedFormat(_))));
    }
}
