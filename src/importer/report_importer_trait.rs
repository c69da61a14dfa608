// ==========================================
// 产线运行速率对账 - 报表导入 Trait
// ==========================================
// 职责: 定义报表导入各阶段接口（不包含实现）
// ==========================================

use crate::domain::report::{RawReport, RowIssue};
use crate::importer::error::ImportResult;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: CsvParser, ExcelParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始报表（表头 + 行记录）
    ///
    /// # 参数
    /// - file_path: 文件路径
    ///
    /// # 返回
    /// - Ok(RawReport): 表头顺序与源文件一致，空白行已剔除
    /// - Err: 文件读取错误、格式错误
    fn parse_to_raw_report(&self, file_path: &Path) -> ImportResult<RawReport>;
}

// ==========================================
// FieldMapper Trait
// ==========================================
// 用途: 字段映射接口（阶段 1）
// 实现者: OrderFieldMapper, ItemFieldMapper

/// 单行映射结果（记录 + 行级警告）
#[derive(Debug, Clone)]
pub struct MappedRow<T> {
    pub record: T,
    pub warnings: Vec<RowIssue>,
}

pub trait FieldMapper: Send + Sync {
    type Record;

    /// 将原始行记录映射为领域记录
    ///
    /// # 参数
    /// - row: 原始行记录（HashMap<列名, 值>）
    /// - row_number: 行号（用于规范化报告）
    ///
    /// # 返回
    /// - Ok(MappedRow): 数值列无法解析时置空并附带警告
    /// - Err(DateParseError): 日期不符合固定格式，该行不可用
    fn map_row(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<MappedRow<Self::Record>>;
}

// ==========================================
// DataCleaner Trait
// ==========================================
// 用途: 单元格清洗接口（阶段 2）
// 实现者: DataCleaner
pub trait DataCleaner: Send + Sync {
    /// 标准化 NULL 值（空字符串/空白/NA 占位 → None）
    fn normalize_null(&self, value: Option<String>) -> Option<String>;

    /// 解析数值（去除千分位逗号）
    ///
    /// # 返回
    /// - Ok(f64): 解析成功
    /// - Err: 非数值文本
    fn parse_number(&self, value: &str) -> Result<f64, std::num::ParseFloatError>;

    /// 解析承诺发货日期（固定格式 dd-Mon-yy，如 05-Mar-24）
    ///
    /// # 返回
    /// - Ok(NaiveDate): 解析成功
    /// - Err: 不符合该格式
    fn parse_ship_date(&self, value: &str) -> Result<NaiveDate, chrono::ParseError>;
}
