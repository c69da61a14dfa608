// ==========================================
// 产线运行速率对账 - 工作表数据模型
// ==========================================
// 职责: RunOutput → 八张工作表的表头与单元格（与具体写入库无关）
// 红线: 行顺序与 RunOutput 一致，不重新排序
// ==========================================

use crate::domain::aggregate::AggregateTable;
use crate::domain::order::ReconciledOrderRecord;
use crate::engine::orchestrator::RunOutput;
use crate::importer::data_cleaner::SHIP_DATE_FORMAT;
use crate::importer::schema_validator::{item_columns, order_columns};
use std::collections::BTreeMap;

/// 工作表名（按导出顺序）
pub mod sheet_names {
    pub const CODATE_DATA: &str = "CoDate Data";
    pub const ITEM_LIST_DATA: &str = "Item List Data";
    pub const CELL_RUN_RATES: &str = "Cell Run Rates";
    pub const CRITICAL_ENTRIES: &str = "Critical Entries";
    pub const QTY_PER_BUYER: &str = "Total Quantity per Buyer";
    pub const QTY_PER_PART: &str = "Total Quantity per Part";
    pub const QTY_PER_BUYER_CODATE: &str = "Total Quantity per Buyer CoDate";
    pub const QTY_PER_PART_CODATE: &str = "Total Quantity per Part CoDate";

    pub const ALL: [&str; 8] = [
        CODATE_DATA,
        ITEM_LIST_DATA,
        CELL_RUN_RATES,
        CRITICAL_ENTRIES,
        QTY_PER_BUYER,
        QTY_PER_PART,
        QTY_PER_BUYER_CODATE,
        QTY_PER_PART_CODATE,
    ];
}

/// 派生列名
pub mod derived_columns {
    pub const RUN_RATE: &str = "Run Rate";
    pub const DAILY_CELL_RUN_RATE: &str = "Daily Cell Run Rate";
    pub const MINUTES_OF_JOB: &str = "MinutesOfJob";
    pub const TOTAL_MINUTES_OF_JOB: &str = "TotalMinutesOfJob";
    pub const EXCEEDS_HALF_DAY: &str = "ExceedsHalfaDaysWork";
    pub const ALERT: &str = "Alert";
}

/// 缺失值显示文本
pub const MISSING_VALUE: &str = "NA";

#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    Missing,
}

impl CellValue {
    fn text(value: Option<&str>) -> Self {
        match value {
            Some(v) if !v.is_empty() => CellValue::Text(v.to_string()),
            _ => CellValue::Missing,
        }
    }

    fn number(value: Option<f64>) -> Self {
        value.map_or(CellValue::Missing, CellValue::Number)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SheetData {
    pub name: &'static str,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

/// 生成全部工作表（顺序固定）
pub fn build_sheets(output: &RunOutput) -> Vec<SheetData> {
    let rollups = &output.rollups;
    vec![
        order_sheet(
            sheet_names::CODATE_DATA,
            &output.order_passthrough_headers,
            &output.reconciled_orders,
        ),
        item_sheet(output),
        rate_sheet(output),
        order_sheet(
            sheet_names::CRITICAL_ENTRIES,
            &output.order_passthrough_headers,
            &output.critical_orders,
        ),
        aggregate_sheet(sheet_names::QTY_PER_BUYER, &rollups.item_by_buyer),
        aggregate_sheet(sheet_names::QTY_PER_PART, &rollups.item_by_part),
        aggregate_sheet(sheet_names::QTY_PER_BUYER_CODATE, &rollups.order_by_buyer),
        aggregate_sheet(sheet_names::QTY_PER_PART_CODATE, &rollups.order_by_part),
    ]
}

const ORDER_TYPED: [&str; 6] = [
    order_columns::ITEM_NUMBER,
    order_columns::BUYER,
    order_columns::ORDER_QTY,
    order_columns::WCR_MINS,
    order_columns::PROM_SHIP,
    order_columns::CUST_ID,
];

const ORDER_DERIVED: [&str; 4] = [
    derived_columns::RUN_RATE,
    derived_columns::MINUTES_OF_JOB,
    derived_columns::DAILY_CELL_RUN_RATE,
    derived_columns::EXCEEDS_HALF_DAY,
];

const ITEM_TYPED: [&str; 3] = [item_columns::PARENT, item_columns::BUYER, item_columns::QUANTITY];

const ITEM_DERIVED: [&str; 2] = [
    derived_columns::MINUTES_OF_JOB,
    derived_columns::TOTAL_MINUTES_OF_JOB,
];

/// 与类型化列或派生列同名的源列不输出，表头保持唯一
fn passthrough_columns(passthrough: &[String], typed: &[&str], derived: &[&str]) -> Vec<String> {
    passthrough
        .iter()
        .filter(|h| !typed.contains(&h.as_str()) && !derived.contains(&h.as_str()))
        .cloned()
        .collect()
}

fn headers(typed: &[&str], passthrough: &[String], derived: &[&str]) -> Vec<String> {
    typed
        .iter()
        .map(|h| h.to_string())
        .chain(passthrough.iter().cloned())
        .chain(derived.iter().map(|h| h.to_string()))
        .collect()
}

fn extra_cells<'a>(
    passthrough: &'a [String],
    extra: &'a BTreeMap<String, String>,
) -> impl Iterator<Item = CellValue> + 'a {
    passthrough
        .iter()
        .map(move |h| CellValue::text(extra.get(h).map(String::as_str)))
}

// 订单表: 类型化列 + 透传列 + 派生列
fn order_sheet(
    name: &'static str,
    passthrough: &[String],
    records: &[ReconciledOrderRecord],
) -> SheetData {
    let passthrough = passthrough_columns(passthrough, &ORDER_TYPED, &ORDER_DERIVED);
    let headers = headers(&ORDER_TYPED, &passthrough, &ORDER_DERIVED);

    let rows = records
        .iter()
        .map(|r| {
            let o = &r.order;
            let mut row = vec![
                CellValue::text(o.item_number.as_deref()),
                CellValue::text(o.buyer_code.as_deref()),
                CellValue::number(o.order_quantity),
                CellValue::number(o.work_center_minutes_per_unit),
                o.promised_ship_date
                    .map_or(CellValue::Missing, |d| {
                        CellValue::Text(d.format(SHIP_DATE_FORMAT).to_string())
                    }),
                CellValue::text(o.customer_id.as_deref()),
            ];
            row.extend(extra_cells(&passthrough, &o.extra));
            row.extend([
                CellValue::number(r.item_run_rate),
                CellValue::number(r.minutes_of_job),
                CellValue::number(r.daily_cell_run_rate),
                CellValue::Bool(r.exceeds_half_day),
            ]);
            row
        })
        .collect();

    SheetData {
        name,
        headers,
        rows,
    }
}

fn item_sheet(output: &RunOutput) -> SheetData {
    let passthrough = passthrough_columns(
        &output.item_passthrough_headers,
        &ITEM_TYPED,
        &ITEM_DERIVED,
    );
    let headers = headers(&ITEM_TYPED, &passthrough, &ITEM_DERIVED);

    let rows = output
        .items
        .iter()
        .map(|item| {
            let mut row = vec![
                CellValue::text(item.parent_part.as_deref()),
                CellValue::text(item.buyer_code.as_deref()),
                CellValue::Number(item.quantity),
            ];
            row.extend(extra_cells(&passthrough, &item.extra));
            row.push(CellValue::Number(item.minutes_of_job));
            row.push(CellValue::number(item.total_minutes_of_job));
            row
        })
        .collect();

    SheetData {
        name: sheet_names::ITEM_LIST_DATA,
        headers,
        rows,
    }
}

fn rate_sheet(output: &RunOutput) -> SheetData {
    SheetData {
        name: sheet_names::CELL_RUN_RATES,
        headers: vec![
            order_columns::ITEM_NUMBER.to_string(),
            derived_columns::RUN_RATE.to_string(),
        ],
        rows: output
            .rate_entries
            .iter()
            .map(|e| {
                vec![
                    CellValue::Text(e.work_center_id.clone()),
                    CellValue::Number(e.daily_rate_minutes),
                ]
            })
            .collect(),
    }
}

fn aggregate_sheet(name: &'static str, table: &AggregateTable) -> SheetData {
    SheetData {
        name,
        headers: vec![
            table.group_column.clone(),
            table.value_column.clone(),
            derived_columns::ALERT.to_string(),
        ],
        rows: table
            .rows
            .iter()
            .map(|row| {
                vec![
                    CellValue::Text(row.group_key.clone()),
                    CellValue::Number(row.summed_quantity),
                    CellValue::Text(row.alert.label().to_string()),
                ]
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::rate::RateTable;
    use crate::domain::report::RawReport;
    use crate::engine::orchestrator::ReconciliationPipeline;
    use std::collections::HashSet;

    fn raw(headers: &[&str], rows: &[&[&str]]) -> RawReport {
        let headers: Vec<String> = headers.iter().map(|h| h.to_string()).collect();
        let rows = rows
            .iter()
            .map(|values| {
                headers
                    .iter()
                    .cloned()
                    .zip(values.iter().map(|v| v.to_string()))
                    .collect()
            })
            .collect();
        RawReport::new(headers, rows)
    }

    #[test]
    fn test_source_column_named_like_derived_is_not_duplicated() {
        // 重新导入的工作簿会带回 Run Rate / MinutesOfJob 列
        let orders = raw(
            &["Item Number", "Buyer", "OrderQty", "WCRMins", "PromShip", "Run Rate", "Note"],
            &[&["P1", "801", "2", "10", "05-Mar-24", "999", "rush"]],
        );
        let items = raw(
            &["Parent", "Buyer", "Quantity", "MinutesOfJob"],
            &[&["A1", "801", "3", "1"]],
        );
        let output = ReconciliationPipeline::default()
            .run(&orders, &items, &RateTable::with_defaults())
            .unwrap();

        let sheets = build_sheets(&output);
        for sheet in &sheets[..2] {
            let unique: HashSet<&String> = sheet.headers.iter().collect();
            assert_eq!(unique.len(), sheet.headers.len(), "{} 表头重复", sheet.name);
            assert!(sheet.rows.iter().all(|row| row.len() == sheet.headers.len()));
        }

        let codate = &sheets[0];
        assert!(codate.headers.contains(&"Note".to_string()));
        let run_rate = codate
            .headers
            .iter()
            .position(|h| h == derived_columns::RUN_RATE)
            .unwrap();
        // 派生值来自速率表，而非源列的 999
        assert_eq!(codate.rows[0][run_rate], CellValue::Missing);
    }
}
