// ==========================================
// 产线运行速率对账 - 字段映射器实现
// ==========================================
// 职责: 源字段 → 领域字段映射 + 类型转换
// 说明: 列名已由 SchemaValidator 解析为实际表头
// ==========================================

use crate::domain::item::RawItemRecord;
use crate::domain::order::OrderRecord;
use crate::domain::report::{IssueLevel, RowIssue};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::report_importer_trait::{
    DataCleaner as DataCleanerTrait, FieldMapper as FieldMapperTrait, MappedRow,
};
use crate::importer::schema_validator::{item_columns, order_columns, ColumnMap};
use chrono::NaiveDate;
use std::collections::{BTreeMap, HashMap};

// ==========================================
// 公共取值工具
// ==========================================
struct CellReader<'a> {
    columns: &'a ColumnMap,
    cleaner: &'a DataCleaner,
}

impl<'a> CellReader<'a> {
    /// 提取字符串字段（空值 → None）
    fn get_string(&self, row: &HashMap<String, String>, canonical: &str) -> Option<String> {
        let header = self.columns.header(canonical)?;
        self.cleaner.normalize_null(row.get(header).cloned())
    }

    /// 提取编号字段（Buyer / Item Number / Parent）
    fn get_code(&self, row: &HashMap<String, String>, canonical: &str) -> Option<String> {
        let header = self.columns.header(canonical)?;
        self.cleaner.clean_code(row.get(header).cloned())
    }

    /// 解析浮点数；无法解析时置空并记录警告
    fn get_f64(
        &self,
        row: &HashMap<String, String>,
        canonical: &str,
        row_number: usize,
        warnings: &mut Vec<RowIssue>,
    ) -> Option<f64> {
        let value = self.get_string(row, canonical)?;
        match self.cleaner.parse_number(&value) {
            Ok(v) if v.is_finite() => Some(v),
            _ => {
                warnings.push(RowIssue {
                    row_number,
                    field: canonical.to_string(),
                    level: IssueLevel::Warning,
                    message: format!("无法解析为数值: {}", value),
                });
                None
            }
        }
    }

    /// 解析日期（dd-Mon-yy）；空值 → None，格式错误 → DateParseError
    fn get_ship_date(
        &self,
        row: &HashMap<String, String>,
        canonical: &str,
        row_number: usize,
    ) -> ImportResult<Option<NaiveDate>> {
        match self.get_string(row, canonical) {
            None => Ok(None),
            Some(value) => self
                .cleaner
                .parse_ship_date(&value)
                .map(Some)
                .map_err(|_| ImportError::DateParseError {
                    row: row_number,
                    field: canonical.to_string(),
                    value,
                }),
        }
    }

    /// 透传列（未被类型化的源列）
    fn extra_columns(&self, row: &HashMap<String, String>) -> BTreeMap<String, String> {
        row.iter()
            .filter(|(header, _)| !self.columns.is_mapped_header(header))
            .map(|(header, value)| (header.clone(), value.clone()))
            .collect()
    }
}

// ==========================================
// OrderFieldMapper - 报表 A
// ==========================================
pub struct OrderFieldMapper {
    columns: ColumnMap,
    cleaner: DataCleaner,
}

impl OrderFieldMapper {
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            cleaner: DataCleaner,
        }
    }

    fn reader(&self) -> CellReader<'_> {
        CellReader {
            columns: &self.columns,
            cleaner: &self.cleaner,
        }
    }
}

impl FieldMapperTrait for OrderFieldMapper {
    type Record = OrderRecord;

    fn map_row(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<MappedRow<OrderRecord>> {
        let reader = self.reader();
        let mut warnings = Vec::new();

        let record = OrderRecord {
            item_number: reader.get_code(row, order_columns::ITEM_NUMBER),
            buyer_code: reader.get_code(row, order_columns::BUYER),
            order_quantity: reader.get_f64(row, order_columns::ORDER_QTY, row_number, &mut warnings),
            work_center_minutes_per_unit: reader.get_f64(
                row,
                order_columns::WCR_MINS,
                row_number,
                &mut warnings,
            ),
            promised_ship_date: reader.get_ship_date(row, order_columns::PROM_SHIP, row_number)?,
            customer_id: reader.get_string(row, order_columns::CUST_ID),
            extra: reader.extra_columns(row),
            row_number,
        };

        Ok(MappedRow { record, warnings })
    }
}

// ==========================================
// ItemFieldMapper - 报表 B
// ==========================================
pub struct ItemFieldMapper {
    columns: ColumnMap,
    cleaner: DataCleaner,
}

impl ItemFieldMapper {
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            columns,
            cleaner: DataCleaner,
        }
    }
}

impl FieldMapperTrait for ItemFieldMapper {
    type Record = RawItemRecord;

    fn map_row(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ImportResult<MappedRow<RawItemRecord>> {
        let reader = CellReader {
            columns: &self.columns,
            cleaner: &self.cleaner,
        };
        let mut warnings = Vec::new();

        let record = RawItemRecord {
            parent_part: reader.get_code(row, item_columns::PARENT),
            buyer_code: reader.get_code(row, item_columns::BUYER),
            quantity: reader.get_f64(row, item_columns::QUANTITY, row_number, &mut warnings),
            extra: reader.extra_columns(row),
            row_number,
        };

        Ok(MappedRow { record, warnings })
    }
}
