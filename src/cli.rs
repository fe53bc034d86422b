//! CLI definition and dispatch.

use chrono::{Local, Months, NaiveDate};
use clap::{Parser, Subcommand};
use log::{info, warn};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_report_adapter::{CsvReportAdapter, NullReport};
use crate::adapters::fallback_source::{FallbackDataSource, RetryPolicy};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_notifier::LogNotifier;
use crate::adapters::telegram_adapter::TelegramSettings;
use crate::domain::backtest::BacktestConfig;
use crate::domain::config_validation::{
    parse_optional_date, validate_backtest_section, validate_config, validate_data_section,
    validate_ml_section, validate_strategy_section,
};
use crate::domain::error::TraderError;
use crate::domain::signal::SignalParams;
use crate::pipeline::{self, RunConfig, RunOutcome};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::model_port::ModelPort;
use crate::ports::notify_port::NotifyPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "rsi-trend", about = "RSI + moving-average crossover backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch data, generate signals and backtest every configured symbol
    Run {
        #[arg(short, long)]
        config: PathBuf,
        /// Comma-separated symbols, replacing [run] symbols
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,
        /// First date (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,
        /// Directory for the Signals/Trades/Summary CSV sheets
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunOverrides {
    pub symbols: Vec<String>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub output_dir: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Run {
            config,
            symbols,
            start,
            end,
            output_dir,
            dry_run,
        } => {
            let overrides = RunOverrides {
                symbols: symbols
                    .into_iter()
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect(),
                start,
                end,
                output_dir,
            };
            if dry_run {
                run_dry_run(&config, &overrides)
            } else {
                run_backtest(&config, &overrides)
            }
        }
        Command::Validate { config } => run_validate(&config),
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

fn fail(err: TraderError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(&err)
}

/// Validation for a run. `[run] symbols` may be absent when symbols come
/// from the command line.
pub fn validate_for_run(
    config: &dyn ConfigPort,
    overrides: &RunOverrides,
) -> Result<(), TraderError> {
    if overrides.symbols.is_empty() {
        return validate_config(config);
    }
    validate_strategy_section(config)?;
    validate_backtest_section(config)?;
    validate_data_section(config)?;
    validate_ml_section(config)
}

pub fn build_signal_params(config: &dyn ConfigPort) -> SignalParams {
    let d = SignalParams::default();
    SignalParams {
        rsi_period: config.get_usize("strategy", "rsi_period", d.rsi_period),
        short_window: config.get_usize("strategy", "short_window", d.short_window),
        long_window: config.get_usize("strategy", "long_window", d.long_window),
        macd_fast: config.get_usize("strategy", "macd_fast", d.macd_fast),
        macd_slow: config.get_usize("strategy", "macd_slow", d.macd_slow),
        macd_signal: config.get_usize("strategy", "macd_signal", d.macd_signal),
    }
}

pub fn build_backtest_config(config: &dyn ConfigPort) -> BacktestConfig {
    let d = BacktestConfig::default();
    BacktestConfig {
        initial_capital: config.get_double("backtest", "initial_capital", d.initial_capital),
        rsi_exit: config.get_double("backtest", "rsi_exit", d.rsi_exit),
    }
}

/// Resolve the run settings. The end date defaults to `today`, the start
/// date to `lookback_months` before the end date.
pub fn build_run_config(
    config: &dyn ConfigPort,
    overrides: &RunOverrides,
    today: NaiveDate,
) -> Result<RunConfig, TraderError> {
    let symbols = if overrides.symbols.is_empty() {
        config.get_list("run", "symbols")
    } else {
        overrides.symbols.clone()
    };
    if symbols.is_empty() {
        return Err(TraderError::ConfigMissing {
            section: "run".into(),
            key: "symbols".into(),
        });
    }

    let end_date = match overrides.end {
        Some(d) => d,
        None => parse_optional_date(config, "end_date")?.unwrap_or(today),
    };
    let start_date = match overrides.start {
        Some(d) => d,
        None => match parse_optional_date(config, "start_date")? {
            Some(d) => d,
            None => {
                let months = config.get_int("run", "lookback_months", 6);
                let months = u32::try_from(months).ok().filter(|m| *m > 0).ok_or_else(|| {
                    TraderError::ConfigInvalid {
                        section: "run".into(),
                        key: "lookback_months".into(),
                        reason: "lookback_months must be at least 1".into(),
                    }
                })?;
                end_date
                    .checked_sub_months(Months::new(months))
                    .ok_or_else(|| TraderError::ConfigInvalid {
                        section: "run".into(),
                        key: "lookback_months".into(),
                        reason: "lookback reaches before the supported date range".into(),
                    })?
            }
        },
    };

    if start_date >= end_date {
        return Err(TraderError::ConfigInvalid {
            section: "run".into(),
            key: "start_date".into(),
            reason: format!("start {} must be before end {}", start_date, end_date),
        });
    }

    Ok(RunConfig {
        symbols,
        start_date,
        end_date,
        signal_params: build_signal_params(config),
        backtest: build_backtest_config(config),
    })
}

pub fn build_retry_policy(config: &dyn ConfigPort) -> RetryPolicy {
    let d = RetryPolicy::default();
    let attempts = config.get_int("data", "max_attempts", i64::from(d.max_attempts));
    let delay = config.get_double("data", "retry_delay_secs", d.delay.as_secs_f64());
    RetryPolicy {
        max_attempts: u32::try_from(attempts).unwrap_or(1).max(1),
        delay: Duration::try_from_secs_f64(delay).unwrap_or(d.delay),
    }
}

/// One data source by kind, or `None` when it is not available in this
/// build.
fn make_source(kind: &str, config: &dyn ConfigPort) -> Result<Option<Box<dyn DataPort>>, TraderError> {
    match kind {
        "csv" => {
            let dir = config
                .get_string("data", "csv_dir")
                .unwrap_or_else(|| "data".to_string());
            Ok(Some(Box::new(CsvAdapter::new(PathBuf::from(dir)))))
        }
        "yahoo" => yahoo_source(),
        "none" => Ok(None),
        other => Err(TraderError::ConfigInvalid {
            section: "data".into(),
            key: "source".into(),
            reason: format!("unknown data source {:?}", other),
        }),
    }
}

#[cfg(feature = "yahoo")]
fn yahoo_source() -> Result<Option<Box<dyn DataPort>>, TraderError> {
    let adapter = crate::adapters::yahoo_adapter::YahooAdapter::new()?;
    Ok(Some(Box::new(adapter)))
}

#[cfg(not(feature = "yahoo"))]
fn yahoo_source() -> Result<Option<Box<dyn DataPort>>, TraderError> {
    warn!("yahoo data source requested but this build lacks the yahoo feature");
    Ok(None)
}

/// Primary source plus optional fallback. An unavailable primary is
/// replaced by the fallback.
pub fn build_data_source(config: &dyn ConfigPort) -> Result<FallbackDataSource, TraderError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string())
        .trim()
        .to_lowercase();
    let default_fallback = if source == "yahoo" { "csv" } else { "none" };
    let fallback = config
        .get_string("data", "fallback")
        .map(|s| s.trim().to_lowercase())
        .unwrap_or_else(|| default_fallback.to_string());

    let primary = make_source(&source, config)?;
    let fallback = if fallback == source {
        None
    } else {
        make_source(&fallback, config)?
    };

    let (primary, fallback) = match (primary, fallback) {
        (Some(p), f) => (p, f),
        (None, Some(f)) => {
            warn!("{} source unavailable, using {} only", source, f.name());
            (f, None)
        }
        (None, None) => {
            return Err(TraderError::ConfigInvalid {
                section: "data".into(),
                key: "source".into(),
                reason: format!("no usable data source ({} unavailable)", source),
            })
        }
    };

    Ok(FallbackDataSource::new(
        primary,
        fallback,
        build_retry_policy(config),
    ))
}

pub fn build_report(
    config: &dyn ConfigPort,
    output_override: Option<&Path>,
) -> Result<Box<dyn ReportPort>, TraderError> {
    let output_dir = output_override
        .map(Path::to_path_buf)
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from));
    match output_dir {
        Some(dir) => {
            info!("Writing report sheets to {}", dir.display());
            Ok(Box::new(CsvReportAdapter::new(dir)?))
        }
        None => Ok(Box::new(NullReport)),
    }
}

/// The direction classifiers, or `None` when `[ml] enabled` is off or the
/// build lacks the `ml` feature.
pub fn build_model(config: &dyn ConfigPort) -> Option<Box<dyn ModelPort>> {
    if !config.get_bool("ml", "enabled", true) {
        info!("Classifier training disabled in [ml]");
        return None;
    }
    ml_model(config)
}

#[cfg(feature = "ml")]
fn ml_model(config: &dyn ConfigPort) -> Option<Box<dyn ModelPort>> {
    use crate::adapters::linfa_model_adapter::LinfaModelAdapter;

    let d = LinfaModelAdapter::default();
    let max_iterations = config.get_int("ml", "max_iterations", d.max_iterations as i64);
    Some(Box::new(LinfaModelAdapter {
        folds: config.get_usize("ml", "folds", d.folds),
        max_iterations: u64::try_from(max_iterations).unwrap_or(d.max_iterations),
        tree_max_depth: config.get_usize("ml", "tree_max_depth", d.tree_max_depth),
    }))
}

#[cfg(not(feature = "ml"))]
fn ml_model(_config: &dyn ConfigPort) -> Option<Box<dyn ModelPort>> {
    info!("Classifier training skipped: this build lacks the ml feature");
    None
}

#[cfg(feature = "telegram")]
pub fn build_notifier(settings: TelegramSettings) -> Result<Box<dyn NotifyPort>, TraderError> {
    if settings.is_configured() {
        let notifier = crate::adapters::telegram_adapter::TelegramNotifier::new(settings)?;
        return Ok(Box::new(notifier));
    }
    warn!("Telegram bot token or chat ID not set. Notifications go to the log.");
    Ok(Box::new(LogNotifier))
}

#[cfg(not(feature = "telegram"))]
pub fn build_notifier(settings: TelegramSettings) -> Result<Box<dyn NotifyPort>, TraderError> {
    if settings.is_configured() {
        warn!("Telegram credentials set but this build lacks the telegram feature");
    }
    Ok(Box::new(LogNotifier))
}

fn env_var(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn run_backtest(config_path: &Path, overrides: &RunOverrides) -> ExitCode {
    // Stage 1: Load config and credentials
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    let telegram = TelegramSettings::resolve(&adapter, env_var);

    // Stage 2: Validate and resolve run settings
    if let Err(e) = validate_for_run(&adapter, overrides) {
        return fail(e);
    }
    let run_config = match build_run_config(&adapter, overrides, Local::now().date_naive()) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };

    // Stage 3: Wire collaborators
    let data_source = match build_data_source(&adapter) {
        Ok(s) => s,
        Err(e) => return fail(e),
    };
    info!(
        "Data source {} with up to {} attempts per source",
        data_source.name(),
        data_source.policy().max_attempts
    );
    let model = build_model(&adapter);
    let report = match build_report(&adapter, overrides.output_dir.as_deref()) {
        Ok(r) => r,
        Err(e) => return fail(e),
    };
    let notifier = match build_notifier(telegram) {
        Ok(n) => n,
        Err(e) => return fail(e),
    };

    // Stage 4: Run
    eprintln!(
        "Running backtest: {} symbols, {} to {}",
        run_config.symbols.len(),
        run_config.start_date,
        run_config.end_date
    );
    let outcome = pipeline::run_pipeline(
        &data_source,
        report.as_ref(),
        notifier.as_ref(),
        model.as_deref(),
        &run_config,
    );

    // Stage 5: Console summary
    print_summary(&outcome, &run_config);
    ExitCode::SUCCESS
}

fn print_summary(outcome: &RunOutcome, run_config: &RunConfig) {
    eprintln!("\n=== Per-Symbol Summary ===");
    for row in &outcome.rows {
        let s = &row.summary;
        let sign = if s.cumulative_return_pct >= 0.0 { "+" } else { "" };
        eprintln!(
            "  {}:  {} trades, {:.1}% win rate, {}{:.2}%",
            row.symbol,
            s.total_trades,
            s.win_rate * 100.0,
            sign,
            s.cumulative_return_pct,
        );
        if let Some(ml) = &row.ml {
            eprintln!(
                "      logistic accuracy {:.3}, tree accuracy {:.3}",
                ml.logistic.accuracy, ml.tree.accuracy
            );
        }
    }
    eprintln!("\nTotal Trades:     {}", outcome.total_trades());
    eprintln!("Win Rate:         {:.1}%", outcome.win_rate_pct());
    eprintln!(
        "Initial Capital:  {:.2} per symbol",
        run_config.backtest.initial_capital
    );
    if !outcome.failed_symbols.is_empty() {
        eprintln!("No data for:      {}", outcome.failed_symbols.join(", "));
    }
}

pub fn run_dry_run(config_path: &Path, overrides: &RunOverrides) -> ExitCode {
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_for_run(&adapter, overrides) {
        return fail(e);
    }
    let run_config = match build_run_config(&adapter, overrides, Local::now().date_naive()) {
        Ok(c) => c,
        Err(e) => return fail(e),
    };
    eprintln!("Config validated successfully");

    eprintln!("\nSymbols:");
    eprintln!("  {}", run_config.symbols.join(", "));
    eprintln!(
        "\nPeriod:\n  {} to {}",
        run_config.start_date, run_config.end_date
    );
    eprintln!("\nIndicators to compute:");
    for ind in run_config.signal_params.indicators() {
        eprintln!("  {}", ind);
    }
    eprintln!("\nBacktest:");
    eprintln!("  initial_capital: {:.2}", run_config.backtest.initial_capital);
    eprintln!("  rsi_exit:        {}", run_config.backtest.rsi_exit);

    let policy = build_retry_policy(&adapter);
    eprintln!("\nData:");
    eprintln!(
        "  source: {}",
        adapter
            .get_string("data", "source")
            .unwrap_or_else(|| "csv".to_string())
    );
    eprintln!(
        "  retries: {} attempts, {:.1}s apart",
        policy.max_attempts,
        policy.delay.as_secs_f64()
    );

    eprintln!("\nClassifiers:");
    eprintln!(
        "  {}",
        if adapter.get_bool("ml", "enabled", true) {
            if cfg!(feature = "ml") {
                "enabled"
            } else {
                "enabled, but this build lacks the ml feature"
            }
        } else {
            "disabled"
        }
    );

    eprintln!("\nDry run complete: configuration is valid");
    ExitCode::SUCCESS
}

fn run_validate(config_path: &Path) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };
    if let Err(e) = validate_config(&adapter) {
        return fail(e);
    }

    let params = build_signal_params(&adapter);
    eprintln!("\nSymbols: {}", adapter.get_list("run", "symbols").join(", "));
    eprintln!(
        "Strategy: buy when RSI({}) < 30 and SMA({}) > SMA({})",
        params.rsi_period, params.short_window, params.long_window
    );
    let telegram = TelegramSettings::resolve(&adapter, env_var);
    eprintln!(
        "Telegram: {}",
        if telegram.is_configured() {
            "configured"
        } else {
            "not configured"
        }
    );
    eprintln!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}
