// ==========================================
// 产线运行速率对账 - 引擎编排器
// ==========================================
// 用途: 协调 规范化 → 对账 → 汇总 的执行顺序
// 红线: 纯同步计算，不做文件读写，不做重试
// 红线: 任一报表 SchemaError → 整次运行失败，不产出部分结果
// ==========================================

use crate::domain::item::ItemRecord;
use crate::domain::order::ReconciledOrderRecord;
use crate::domain::rate::{RateEntry, RateTable};
use crate::domain::report::RawReport;
use crate::engine::aggregator::{Aggregator, Rollups, DEFAULT_ALERT_THRESHOLD};
use crate::engine::reconciliation::{ReconciliationEngine, DEFAULT_HALF_DAY_FRACTION};
use crate::importer::error::ImportResult;
use crate::importer::normalizer::{NormalizationReport, ReportNormalizer, DEFAULT_BUYER_PREFIX};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};
use uuid::Uuid;

// ==========================================
// PipelineSettings - 编排参数
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineSettings {
    pub buyer_prefix: String,
    pub alert_threshold: f64,
    pub half_day_fraction: f64,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            buyer_prefix: DEFAULT_BUYER_PREFIX.to_string(),
            alert_threshold: DEFAULT_ALERT_THRESHOLD,
            half_day_fraction: DEFAULT_HALF_DAY_FRACTION,
        }
    }
}

// ==========================================
// RunOutput - 单次运行产物（导出器输入）
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub run_id: String,

    // 报表 A
    pub order_passthrough_headers: Vec<String>,
    pub reconciled_orders: Vec<ReconciledOrderRecord>,
    pub critical_orders: Vec<ReconciledOrderRecord>,
    pub order_summary: NormalizationReport,

    // 报表 B
    pub item_passthrough_headers: Vec<String>,
    pub items: Vec<ItemRecord>,
    pub item_summary: NormalizationReport,

    // 速率表快照（按编号排序）
    pub rate_entries: Vec<RateEntry>,

    pub rollups: Rollups,
}

impl RunOutput {
    pub fn critical_count(&self) -> usize {
        self.critical_orders.len()
    }

    /// 四张汇总表中 ALERT 行总数
    pub fn alert_count(&self) -> usize {
        self.rollups.item_by_buyer.alert_count()
            + self.rollups.item_by_part.alert_count()
            + self.rollups.order_by_buyer.alert_count()
            + self.rollups.order_by_part.alert_count()
    }
}

// ==========================================
// ReconciliationPipeline - 引擎编排器
// ==========================================
pub struct ReconciliationPipeline {
    normalizer: ReportNormalizer,
    reconciliation: ReconciliationEngine,
    aggregator: Aggregator,
}

impl Default for ReconciliationPipeline {
    fn default() -> Self {
        Self::new(&PipelineSettings::default())
    }
}

impl ReconciliationPipeline {
    pub fn new(settings: &PipelineSettings) -> Self {
        Self {
            normalizer: ReportNormalizer::new(settings.buyer_prefix.clone()),
            reconciliation: ReconciliationEngine::new(settings.half_day_fraction),
            aggregator: Aggregator::new(settings.alert_threshold),
        }
    }

    /// 执行完整对账流程
    ///
    /// # 参数
    /// - order_report: 报表 A 原始表
    /// - item_report: 报表 B 原始表
    /// - rates: 已定稿的速率表（只读）
    ///
    /// # 返回
    /// - Ok(RunOutput)
    /// - Err(ImportError::SchemaError): 任一报表缺少必需列
    pub fn run(
        &self,
        order_report: &RawReport,
        item_report: &RawReport,
        rates: &RateTable,
    ) -> ImportResult<RunOutput> {
        let run_id = Uuid::new_v4().to_string();
        self.run_with_id(run_id, order_report, item_report, rates)
    }

    /// 指定 run_id 执行（调用方已在外层 span 中生成 run_id）
    pub fn run_with_id(
        &self,
        run_id: String,
        order_report: &RawReport,
        item_report: &RawReport,
        rates: &RateTable,
    ) -> ImportResult<RunOutput> {
        let span = info_span!("pipeline", run_id = %run_id);
        let _enter = span.enter();

        info!(
            order_rows = order_report.len(),
            item_rows = item_report.len(),
            rates = rates.len(),
            "开始执行对账流程"
        );

        // ==========================================
        // 步骤1: 规范化两张报表
        // ==========================================
        debug!("步骤1: 规范化报表");
        let orders = self.normalizer.normalize_order_report(order_report)?;
        let items = self.normalizer.normalize_item_report(item_report)?;

        // ==========================================
        // 步骤2: 订单 × 速率表对账
        // ==========================================
        debug!("步骤2: 执行对账");
        let reconciled_orders = self.reconciliation.reconcile(&orders.eligible_orders, rates);
        let critical_orders = self.reconciliation.critical_subset(&reconciled_orders);

        // ==========================================
        // 步骤3: 四张汇总表
        // ==========================================
        debug!("步骤3: 执行汇总");
        let rollups = self.aggregator.rollups(&orders.all_orders, &items.items);

        let output = RunOutput {
            run_id,
            order_passthrough_headers: orders.passthrough_headers,
            reconciled_orders,
            critical_orders,
            order_summary: orders.summary,
            item_passthrough_headers: items.passthrough_headers,
            items: items.items,
            item_summary: items.summary,
            rate_entries: rates.entries(),
            rollups,
        };

        info!(
            reconciled = output.reconciled_orders.len(),
            critical = output.critical_count(),
            alerts = output.alert_count(),
            "对账流程完成"
        );

        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::types::AlertFlag;
    use crate::importer::error::ImportError;

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

    fn order_report() -> RawReport {
        raw(
            &["Item Number", "Buyer", "OrderQty", "WCRMins", "PromShip", "CustID"],
            &[
                &["P1", "801", "500", "10", "05-Mar-24", "C1"],
                &["P2", "799", "1", "4500", "01-Mar-24", "C2"],
                &["P3", "877", "1", "1", "02-Mar-24", "C3"],
            ],
        )
    }

    fn item_report() -> RawReport {
        raw(
            &["Parent", "Buyer", "Quantity"],
            &[&["A1", "801", "3000"], &["A2", "801", "1500"]],
        )
    }

    #[test]
    fn test_run_end_to_end() {
        let mut rates = RateTable::new();
        rates.upsert("801", 9000.0);

        let output = ReconciliationPipeline::default()
            .run(&order_report(), &item_report(), &rates)
            .unwrap();

        // 799 不进入对账，但进入报表 A 汇总
        assert_eq!(output.reconciled_orders.len(), 2);
        assert_eq!(output.critical_count(), 1);
        assert_eq!(output.critical_orders[0].order.item_number.as_deref(), Some("P1"));
        // 877 无速率：保留但不关键（日期更早，排在前面）
        assert_eq!(output.reconciled_orders[0].order.buyer_code.as_deref(), Some("877"));
        assert_eq!(output.reconciled_orders[0].daily_cell_run_rate, None);
        assert!(!output.reconciled_orders[0].exceeds_half_day);

        assert_eq!(output.rollups.order_by_buyer.rows.len(), 3);
        assert_eq!(output.rollups.order_by_buyer.rows[0].group_key, "799");
        assert_eq!(output.rollups.order_by_buyer.rows[0].alert, AlertFlag::Alert);

        assert_eq!(output.rollups.item_by_buyer.rows[0].summed_quantity, 4500.0);
        assert_eq!(output.rollups.item_by_buyer.rows[0].alert, AlertFlag::Alert);
        assert_eq!(output.rate_entries.len(), 1);
    }

    #[test]
    fn test_run_fails_on_schema_error() {
        let result = ReconciliationPipeline::default().run(
            &order_report(),
            &raw(&["Parent", "Buyer"], &[&["A1", "801"]]),
            &RateTable::with_defaults(),
        );
        assert!(matches!(result, Err(ImportError::SchemaError { .. })));
    }
}
