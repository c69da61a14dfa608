// ==========================================
// 产线运行速率对账 - 运行编排
// ==========================================
// 流程: 清理过期报表 → 拉取 A → 拉取 B → 对账汇总 → 导出
// 红线: 速率表在运行开始前定稿，运行中只读
// 红线: 导出只在所有阶段成功后执行
// ==========================================

use crate::app::error::RunError;
use crate::domain::rate::RateTable;
use crate::domain::report::RawReport;
use crate::domain::types::ReportKind;
use crate::engine::orchestrator::{PipelineSettings, ReconciliationPipeline, RunOutput};
use crate::export::WorkbookExporter;
use crate::fetch::{fetch_with_retry, ReportSource, RetryPolicy};
use crate::importer::{FileParser, UniversalFileParser};
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

/// 单次运行摘要
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub run_id: String,
    pub output_path: PathBuf,
    pub reconciled: usize,
    pub critical: usize,
    pub alerts: usize,
    pub dropped_rows: usize,
}

impl RunSummary {
    fn from_output(output: &RunOutput, output_path: &Path) -> Self {
        Self {
            run_id: output.run_id.clone(),
            output_path: output_path.to_path_buf(),
            reconciled: output.reconciled_orders.len(),
            critical: output.critical_count(),
            alerts: output.alert_count(),
            dropped_rows: output.order_summary.dropped_null_key
                + output.order_summary.dropped_date_error
                + output.item_summary.dropped_null_key,
        }
    }
}

// ==========================================
// Runner
// ==========================================
pub struct Runner<E: WorkbookExporter> {
    pipeline: ReconciliationPipeline,
    exporter: E,
}

impl<E: WorkbookExporter> Runner<E> {
    pub fn new(settings: &PipelineSettings, exporter: E) -> Self {
        Self {
            pipeline: ReconciliationPipeline::new(settings),
            exporter,
        }
    }

    /// 完整运行：拉取两份报表后执行
    ///
    /// # 参数
    /// - source: 报表来源
    /// - policy: 拉取重试策略
    /// - clean_stale: 拉取前清理过期报表（每类保留最新一份）
    /// - rates: 已定稿速率表
    /// - output_path: 工作簿输出路径
    pub async fn run<S>(
        &self,
        source: &S,
        policy: &RetryPolicy,
        clean_stale: bool,
        rates: &RateTable,
        output_path: &Path,
    ) -> Result<RunSummary, RunError>
    where
        S: ReportSource + ?Sized,
    {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("run", run_id = %run_id);

        async {
            if clean_stale {
                if let Err(e) = source.clean_stale() {
                    warn!(error = %e, "过期报表清理失败，继续运行");
                }
            }

            // 两份报表顺序拉取
            let order_report = fetch_with_retry(source, ReportKind::OrderReport, policy).await?;
            let item_report = fetch_with_retry(source, ReportKind::ItemReport, policy).await?;

            self.execute_with_id(run_id.clone(), &order_report, &item_report, rates, output_path)
        }
        .instrument(span)
        .await
    }

    /// 从两份本地文件执行（不拉取、不重试）
    pub fn run_from_files(
        &self,
        order_path: &Path,
        item_path: &Path,
        rates: &RateTable,
        output_path: &Path,
    ) -> Result<RunSummary, RunError> {
        let order_report = UniversalFileParser.parse_to_raw_report(order_path)?;
        let item_report = UniversalFileParser.parse_to_raw_report(item_path)?;
        self.execute(&order_report, &item_report, rates, output_path)
    }

    /// 对账 + 汇总 + 导出
    pub fn execute(
        &self,
        order_report: &RawReport,
        item_report: &RawReport,
        rates: &RateTable,
        output_path: &Path,
    ) -> Result<RunSummary, RunError> {
        self.execute_with_id(
            Uuid::new_v4().to_string(),
            order_report,
            item_report,
            rates,
            output_path,
        )
    }

    fn execute_with_id(
        &self,
        run_id: String,
        order_report: &RawReport,
        item_report: &RawReport,
        rates: &RateTable,
        output_path: &Path,
    ) -> Result<RunSummary, RunError> {
        let output = self
            .pipeline
            .run_with_id(run_id, order_report, item_report, rates)?;
        self.exporter.export(&output, output_path)?;

        let summary = RunSummary::from_output(&output, output_path);
        info!(
            run_id = %summary.run_id,
            output = %summary.output_path.display(),
            critical = summary.critical,
            alerts = summary.alerts,
            "运行完成"
        );
        Ok(summary)
    }
}
