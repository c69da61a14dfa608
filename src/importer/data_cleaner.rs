// ==========================================
// 产线运行速率对账 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化 / 数值解析 / 日期解析
// ==========================================

use crate::importer::report_importer_trait::DataCleaner as DataCleanerTrait;
use chrono::NaiveDate;

/// 承诺发货日期格式（日-英文月份缩写-两位年）
pub const SHIP_DATE_FORMAT: &str = "%d-%b-%y";

/// 视为缺失值的占位文本（导出回读时出现）
const NULL_MARKERS: &[&str] = &["NA", "N/A", "NAN", "NULL", "NONE"];

pub struct DataCleaner;

impl DataCleanerTrait for DataCleaner {
    fn normalize_null(&self, value: Option<String>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = v.trim();
            if trimmed.is_empty() || NULL_MARKERS.contains(&trimmed.to_uppercase().as_str()) {
                None
            } else {
                Some(trimmed.to_string())
            }
        })
    }

    fn parse_number(&self, value: &str) -> Result<f64, std::num::ParseFloatError> {
        value.trim().replace(',', "").parse::<f64>()
    }

    fn parse_ship_date(&self, value: &str) -> Result<NaiveDate, chrono::ParseError> {
        NaiveDate::parse_from_str(value.trim(), SHIP_DATE_FORMAT)
    }
}

impl DataCleaner {
    /// 清洗编号类字段（Buyer / Item Number / Parent）
    ///
    /// Excel 数值单元格可能以 "801.0" 形式出现，整数值去掉小数部分
    pub fn clean_code(&self, value: Option<String>) -> Option<String> {
        self.normalize_null(value).map(|v| match v.strip_suffix(".0") {
            Some(head) if !head.is_empty() && head.chars().all(|c| c.is_ascii_digit()) => {
                head.to_string()
            }
            _ => v,
        })
    }
}
