// ==========================================
// 产线运行速率对账 - 命令行主入口
// ==========================================

mod cli;

use anyhow::Context;
use cell_run_rates::app::{RunError, RunSummary, Runner};
use cell_run_rates::config::{
    config_keys, CliRateEditor, ConfigManager, PasteFileRateEditor, RateEditor, RateEditorChain,
};
use cell_run_rates::domain::RateTable;
use cell_run_rates::export::XlsxWorkbookExporter;
use cell_run_rates::fetch::DirectoryReportSource;
use cell_run_rates::logging;
use clap::Parser;
use cli::{Cli, Commands, RateArgs};
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match execute(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<RunError>() {
                Some(run_error) => {
                    tracing::error!(error = %run_error, "运行失败");
                    eprintln!("错误: {}", run_error.user_summary());
                }
                None => eprintln!("错误: {:#}", e),
            }
            ExitCode::FAILURE
        }
    }
}

async fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(&cli)?;

    match config.log_file() {
        Some(path) => logging::init_with_file(&path)
            .with_context(|| format!("无法打开日志文件 {}", path.display()))?,
        None => logging::init(),
    }

    tracing::info!("==================================================");
    tracing::info!("{} v{}", cell_run_rates::APP_NAME, cell_run_rates::VERSION);
    tracing::info!(config = %config.get_config_snapshot(), "配置已加载");
    tracing::info!("==================================================");

    let settings = config.pipeline_settings();

    match cli.command {
        Commands::Run {
            downloads_dir,
            output,
            clean,
            rate_args,
        } => {
            let rates = finalize_rates(&rate_args)?;
            let downloads_dir = downloads_dir.unwrap_or_else(|| config.downloads_dir());
            let output = output.unwrap_or_else(|| config.output_path());
            let source = DirectoryReportSource::new(
                &downloads_dir,
                config.order_report_marker(),
                config.item_report_marker(),
            );

            let runner = Runner::new(&settings, XlsxWorkbookExporter);
            let summary = runner
                .run(
                    &source,
                    &config.retry_policy(),
                    clean,
                    &rates,
                    &output,
                )
                .await?;
            print_summary(&summary);
        }

        Commands::Rates { rate_args, json } => {
            let rates = finalize_rates(&rate_args)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rates.entries())?);
            } else {
                for entry in rates.entries() {
                    println!("{:<8} {:>12.2}", entry.work_center_id, entry.daily_rate_minutes);
                }
            }
        }

        Commands::Reconcile {
            order_report,
            item_report,
            output,
            rate_args,
        } => {
            let rates = finalize_rates(&rate_args)?;
            let output = output.unwrap_or_else(|| config.output_path());
            let runner = Runner::new(&settings, XlsxWorkbookExporter);
            let summary = runner.run_from_files(&order_report, &item_report, &rates, &output)?;
            print_summary(&summary);
        }
    }

    Ok(())
}

/// 加载配置文件并应用命令行覆写
fn load_config(cli: &Cli) -> Result<ConfigManager, RunError> {
    let mut config = match &cli.config {
        Some(path) => ConfigManager::load(path)?,
        None => ConfigManager::load_default().unwrap_or_else(|_| ConfigManager::in_memory()),
    };

    if let Some(path) = &cli.log_file {
        config.set_config_value(config_keys::LOG_FILE, path.display().to_string());
    }
    if let Some(prefix) = &cli.buyer_prefix {
        config.set_config_value(config_keys::BUYER_PREFIX, prefix.clone());
    }
    if let Some(threshold) = cli.alert_threshold {
        config.set_config_value(config_keys::ALERT_THRESHOLD, threshold.to_string());
    }
    if let Some(fraction) = cli.half_day_fraction {
        config.set_config_value(config_keys::HALF_DAY_FRACTION, fraction.to_string());
    }
    Ok(config)
}

/// 默认速率 → 粘贴文件 → 命令行覆写
fn finalize_rates(args: &RateArgs) -> Result<RateTable, RunError> {
    let mut chain = RateEditorChain::new();
    if let Some(path) = &args.rates_file {
        chain = chain.with(PasteFileRateEditor::new(path));
    }
    chain = chain.with(CliRateEditor::new(args.rates.clone()));
    Ok(chain.finalize(RateTable::with_defaults())?)
}

fn print_summary(summary: &RunSummary) {
    println!("工作簿: {}", summary.output_path.display());
    println!(
        "对账订单 {} 条，关键订单 {} 条，汇总告警 {} 条，剔除行 {} 条",
        summary.reconciled, summary.critical, summary.alerts, summary.dropped_rows
    );
}
