// ==========================================
// 产线运行速率对账 - 命令行定义
// ==========================================

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cell-run-rates")]
#[command(version)]
#[command(about = "Reconcile order and item reports against cell run rates")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (default: <config dir>/cell-run-rates/config.json)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also append logs to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Buyer code prefix admitted to reconciliation
    #[arg(long, global = true)]
    pub buyer_prefix: Option<String>,

    /// Rollup alert threshold (exclusive)
    #[arg(long, global = true)]
    pub alert_threshold: Option<f64>,

    /// Fraction of the daily cell rate that counts as half a day
    #[arg(long, global = true)]
    pub half_day_fraction: Option<f64>,
}

/// 速率表编辑参数（run / rates / reconcile 共用）
#[derive(Args, Debug, Default, Clone)]
pub struct RateArgs {
    /// Override a cell rate, e.g. --rate 801=1806.2 (repeatable)
    #[arg(long = "rate", value_name = "ID=VALUE")]
    pub rates: Vec<String>,

    /// Bulk paste file: one "ID ... RATE" per line
    #[arg(long, value_name = "FILE")]
    pub rates_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch both reports from the downloads directory and export the workbook
    Run {
        /// Downloads directory (overrides config)
        #[arg(long)]
        downloads_dir: Option<PathBuf>,

        /// Output workbook path (overrides config)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Remove older copies of each report from the downloads directory before fetching
        #[arg(long)]
        clean: bool,

        #[command(flatten)]
        rate_args: RateArgs,
    },

    /// Print the finalized rate table
    Rates {
        #[command(flatten)]
        rate_args: RateArgs,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reconcile two local report files without fetching
    Reconcile {
        /// Order report (CoDate) file
        order_report: PathBuf,

        /// Item report (Item List) file
        item_report: PathBuf,

        /// Output workbook path (overrides config)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        #[command(flatten)]
        rate_args: RateArgs,
    },
}
