// ==========================================
// 产线运行速率对账 - 报表规范化器
// ==========================================
// 流程: 结构校验 → 字段映射 → 空值剔除 → 日期排序 → 采购员前缀过滤
// 红线: SchemaError 致命，不返回部分结果
// 红线: 日期格式错误只剔除该行（行级），记入规范化报告
// ==========================================

use crate::domain::item::{ItemRecord, RawItemRecord};
use crate::domain::order::OrderRecord;
use crate::domain::report::{IssueLevel, RawReport, RowIssue};
use crate::domain::types::ReportKind;
use crate::importer::error::ImportResult;
use crate::importer::field_mapper::{ItemFieldMapper, OrderFieldMapper};
use crate::importer::report_importer_trait::FieldMapper;
use crate::importer::schema_validator::{
    order_columns, ColumnMap, SchemaValidator, ITEM_REPORT_COLUMNS, ORDER_REPORT_COLUMNS,
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};

/// 进入对账的采购员编号前缀
pub const DEFAULT_BUYER_PREFIX: &str = "8";

// ==========================================
// NormalizationReport - 规范化报告
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationReport {
    pub report: ReportKind,
    pub total_rows: usize,          // 解析出的非空行
    pub dropped_null_key: usize,    // CustID / Quantity 为空剔除
    pub dropped_date_error: usize,  // PromShip 格式错误剔除
    pub excluded_by_prefix: usize,  // 采购员前缀不符（仅报表 A 对账视图）
    pub issues: Vec<RowIssue>,
}

impl NormalizationReport {
    fn new(report: ReportKind, total_rows: usize) -> Self {
        Self {
            report,
            total_rows,
            dropped_null_key: 0,
            dropped_date_error: 0,
            excluded_by_prefix: 0,
            issues: Vec::new(),
        }
    }
}

// ==========================================
// 规范化输出
// ==========================================

/// 报表 A 规范化结果
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedOrderReport {
    /// 透传列（源文件顺序）
    pub passthrough_headers: Vec<String>,
    /// 清洗 + 排序后、前缀过滤前（报表 A 汇总输入）
    pub all_orders: Vec<OrderRecord>,
    /// 前缀过滤后（对账输入）
    pub eligible_orders: Vec<OrderRecord>,
    pub summary: NormalizationReport,
}

/// 报表 B 规范化结果
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedItemReport {
    pub passthrough_headers: Vec<String>,
    pub items: Vec<ItemRecord>,
    pub summary: NormalizationReport,
}

// ==========================================
// ReportNormalizer
// ==========================================
pub struct ReportNormalizer {
    buyer_prefix: String,
    schema_validator: SchemaValidator,
}

impl Default for ReportNormalizer {
    fn default() -> Self {
        Self::new(DEFAULT_BUYER_PREFIX)
    }
}

impl ReportNormalizer {
    pub fn new(buyer_prefix: impl Into<String>) -> Self {
        Self {
            buyer_prefix: buyer_prefix.into(),
            schema_validator: SchemaValidator,
        }
    }

    pub fn buyer_prefix(&self) -> &str {
        &self.buyer_prefix
    }

    /// 规范化报表 A（订单/承诺发货日期）
    ///
    /// # 返回
    /// - Ok(NormalizedOrderReport)
    /// - Err(SchemaError): 缺少必需列
    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    pub fn normalize_order_report(&self, raw: &RawReport) -> ImportResult<NormalizedOrderReport> {
        let kind = ReportKind::OrderReport;
        let columns = self
            .schema_validator
            .resolve_columns(raw, kind, ORDER_REPORT_COLUMNS)?;
        let has_customer_column = columns.contains(order_columns::CUST_ID);
        let passthrough_headers = passthrough_headers(raw, &columns);
        let mapper = OrderFieldMapper::new(columns);
        let mut summary = NormalizationReport::new(kind, raw.len());

        // === 步骤 1: 字段映射 + 空值/日期剔除 ===
        let mut orders = Vec::with_capacity(raw.len());
        for (idx, row) in raw.rows.iter().enumerate() {
            let row_number = idx + 1;
            let mapped = match mapper.map_row(row, row_number) {
                Ok(mapped) => mapped,
                Err(e) if !e.is_fatal() => {
                    warn!(row_number, error = %e, "日期格式错误，剔除该行");
                    summary.dropped_date_error += 1;
                    summary.issues.push(RowIssue {
                        row_number,
                        field: order_columns::PROM_SHIP.to_string(),
                        level: IssueLevel::Dropped,
                        message: e.to_string(),
                    });
                    continue;
                }
                Err(e) => return Err(e),
            };
            summary.issues.extend(mapped.warnings);

            if has_customer_column && mapped.record.customer_id.is_none() {
                summary.dropped_null_key += 1;
                continue;
            }
            orders.push(mapped.record);
        }

        // === 步骤 2: 按承诺发货日期升序（稳定排序，空日期排最后） ===
        orders.sort_by(|a, b| compare_ship_dates(a, b));

        // === 步骤 3: 采购员前缀过滤（仅对账视图） ===
        let eligible_orders: Vec<OrderRecord> = orders
            .iter()
            .filter(|o| o.buyer_has_prefix(&self.buyer_prefix))
            .cloned()
            .collect();
        summary.excluded_by_prefix = orders.len() - eligible_orders.len();

        info!(
            total = summary.total_rows,
            kept = orders.len(),
            eligible = eligible_orders.len(),
            dropped_null_key = summary.dropped_null_key,
            dropped_date_error = summary.dropped_date_error,
            "报表 A 规范化完成"
        );

        Ok(NormalizedOrderReport {
            passthrough_headers,
            all_orders: orders,
            eligible_orders,
            summary,
        })
    }

    /// 规范化报表 B（物料/部门）
    ///
    /// # 返回
    /// - Ok(NormalizedItemReport): Quantity 为空的行已剔除
    /// - Err(SchemaError): 缺少必需列（如 Quantity）
    #[instrument(skip(self, raw), fields(rows = raw.len()))]
    pub fn normalize_item_report(&self, raw: &RawReport) -> ImportResult<NormalizedItemReport> {
        let kind = ReportKind::ItemReport;
        let columns = self
            .schema_validator
            .resolve_columns(raw, kind, ITEM_REPORT_COLUMNS)?;
        let passthrough_headers = passthrough_headers(raw, &columns);
        let mapper = ItemFieldMapper::new(columns);
        let mut summary = NormalizationReport::new(kind, raw.len());

        let mut kept: Vec<(RawItemRecord, f64)> = Vec::with_capacity(raw.len());
        for (idx, row) in raw.rows.iter().enumerate() {
            let mapped = mapper.map_row(row, idx + 1)?;
            summary.issues.extend(mapped.warnings);

            match mapped.record.quantity {
                Some(quantity) => kept.push((mapped.record, quantity)),
                None => summary.dropped_null_key += 1,
            }
        }

        // TotalMinutesOfJob: 同采购员 Quantity 合计
        let mut buyer_totals: HashMap<String, f64> = HashMap::new();
        for (record, quantity) in &kept {
            if let Some(buyer) = &record.buyer_code {
                *buyer_totals.entry(buyer.clone()).or_insert(0.0) += quantity;
            }
        }

        let items: Vec<ItemRecord> = kept
            .into_iter()
            .map(|(record, quantity)| ItemRecord {
                total_minutes_of_job: record
                    .buyer_code
                    .as_ref()
                    .and_then(|b| buyer_totals.get(b).copied()),
                parent_part: record.parent_part,
                buyer_code: record.buyer_code,
                quantity,
                minutes_of_job: quantity,
                extra: record.extra,
                row_number: record.row_number,
            })
            .collect();

        debug!(buyers = buyer_totals.len(), "采购员合计完成");
        info!(
            total = summary.total_rows,
            kept = items.len(),
            dropped_null_quantity = summary.dropped_null_key,
            "报表 B 规范化完成"
        );

        Ok(NormalizedItemReport {
            passthrough_headers,
            items,
            summary,
        })
    }
}

/// 空日期排在所有有日期的行之后
fn compare_ship_dates(a: &OrderRecord, b: &OrderRecord) -> Ordering {
    match (a.promised_ship_date, b.promised_ship_date) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn passthrough_headers(raw: &RawReport, columns: &ColumnMap) -> Vec<String> {
    raw.headers
        .iter()
        .filter(|h| !h.is_empty() && !columns.is_mapped_header(h))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::ImportError;
    use chrono::NaiveDate;

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

    const ORDER_HEADERS: &[&str] =
        &["Item Number", "Buyer", "OrderQty", "WCRMins", "PromShip", "CustID"];

    #[test]
    fn test_order_report_sorted_and_filtered() {
        let report = raw(
            ORDER_HEADERS,
            &[
                &["P3", "801", "1", "1", "10-Mar-24", "C1"],
                &["P1", "799", "1", "1", "01-Mar-24", "C1"],
                &["P2", "800", "1", "1", "05-Mar-24", "C1"],
            ],
        );

        let normalized = ReportNormalizer::default().normalize_order_report(&report).unwrap();

        let all: Vec<_> = normalized
            .all_orders
            .iter()
            .map(|o| o.item_number.clone().unwrap())
            .collect();
        assert_eq!(all, vec!["P1", "P2", "P3"]);

        let eligible: Vec<_> = normalized
            .eligible_orders
            .iter()
            .map(|o| o.buyer_code.clone().unwrap())
            .collect();
        assert_eq!(eligible, vec!["800", "801"]);
        assert_eq!(normalized.summary.excluded_by_prefix, 1);
    }

    #[test]
    fn test_order_report_stable_ties_and_empty_dates_last() {
        let report = raw(
            ORDER_HEADERS,
            &[
                &["A", "801", "1", "1", "", "C1"],
                &["B", "801", "1", "1", "05-Mar-24", "C1"],
                &["C", "801", "1", "1", "05-Mar-24", "C1"],
            ],
        );

        let normalized = ReportNormalizer::default().normalize_order_report(&report).unwrap();
        let order: Vec<_> = normalized
            .eligible_orders
            .iter()
            .map(|o| o.item_number.clone().unwrap())
            .collect();
        assert_eq!(order, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_order_report_drops_null_customer() {
        let report = raw(
            ORDER_HEADERS,
            &[
                &["P1", "801", "1", "1", "05-Mar-24", ""],
                &["P2", "801", "1", "1", "05-Mar-24", "C2"],
            ],
        );

        let normalized = ReportNormalizer::default().normalize_order_report(&report).unwrap();
        assert_eq!(normalized.all_orders.len(), 1);
        assert_eq!(normalized.summary.dropped_null_key, 1);
    }

    #[test]
    fn test_order_report_without_customer_column_keeps_rows() {
        let report = raw(
            &["Item Number", "Buyer", "OrderQty", "WCRMins", "PromShip"],
            &[&["P1", "801", "1", "1", "05-Mar-24"]],
        );

        let normalized = ReportNormalizer::default().normalize_order_report(&report).unwrap();
        assert_eq!(normalized.all_orders.len(), 1);
    }

    #[test]
    fn test_order_report_unparsable_date_drops_row() {
        let report = raw(
            ORDER_HEADERS,
            &[
                &["P1", "801", "1", "1", "2024-03-05", "C1"],
                &["P2", "801", "1", "1", "06-Mar-24", "C1"],
            ],
        );

        let normalized = ReportNormalizer::default().normalize_order_report(&report).unwrap();
        assert_eq!(normalized.all_orders.len(), 1);
        assert_eq!(normalized.all_orders[0].item_number.as_deref(), Some("P2"));
        assert_eq!(
            normalized.all_orders[0].promised_ship_date,
            NaiveDate::from_ymd_opt(2024, 3, 6)
        );
        assert_eq!(normalized.summary.dropped_date_error, 1);
        assert_eq!(normalized.summary.issues[0].level, IssueLevel::Dropped);
    }

    #[test]
    fn test_item_report_missing_quantity_column() {
        let report = raw(&["Parent", "Buyer"], &[&["A1", "801"]]);
        let result = ReportNormalizer::default().normalize_item_report(&report);
        assert!(matches!(result, Err(ImportError::SchemaError { .. })));
    }

    #[test]
    fn test_item_report_drops_null_quantity_and_totals_by_buyer() {
        let report = raw(
            &["Parent", "Buyer", "Quantity"],
            &[&["A1", "801", "10"], &["A2", "801", ""], &["A3", "801", "5"], &["A4", "700", "2"]],
        );

        let normalized = ReportNormalizer::default().normalize_item_report(&report).unwrap();
        assert_eq!(normalized.items.len(), 3);
        assert_eq!(normalized.summary.dropped_null_key, 1);
        assert_eq!(normalized.items[0].total_minutes_of_job, Some(15.0));
        assert_eq!(normalized.items[0].minutes_of_job, 10.0);
        // 报表 B 不做前缀过滤
        assert_eq!(normalized.items[2].buyer_code.as_deref(), Some("700"));
    }
}
