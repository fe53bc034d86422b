//! Configuration validation.
//!
//! Validates all config fields before a run starts.

use crate::domain::error::TraderError;
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), TraderError> {
    validate_run_section(config)?;
    validate_strategy_section(config)?;
    validate_backtest_section(config)?;
    validate_data_section(config)?;
    validate_ml_section(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> TraderError {
    TraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_run_section(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if config.get_list("run", "symbols").is_empty() {
        return Err(TraderError::ConfigMissing {
            section: "run".to_string(),
            key: "symbols".to_string(),
        });
    }

    let start = parse_optional_date(config, "start_date")?;
    let end = parse_optional_date(config, "end_date")?;
    if let (Some(start), Some(end)) = (start, end) {
        if start >= end {
            return Err(invalid("run", "start_date", "start_date must be before end_date"));
        }
    }

    if config.get_int("run", "lookback_months", 6) < 1 {
        return Err(invalid("run", "lookback_months", "lookback_months must be at least 1"));
    }
    Ok(())
}

pub fn parse_optional_date(
    config: &dyn ConfigPort,
    key: &str,
) -> Result<Option<NaiveDate>, TraderError> {
    match config.get_string("run", key) {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map(Some)
            .map_err(|_| {
                invalid(
                    "run",
                    key,
                    &format!("invalid {} format, expected YYYY-MM-DD", key),
                )
            }),
    }
}

pub fn validate_strategy_section(config: &dyn ConfigPort) -> Result<(), TraderError> {
    for (key, default) in [
        ("rsi_period", 14),
        ("short_window", 20),
        ("long_window", 50),
        ("macd_fast", 12),
        ("macd_slow", 26),
        ("macd_signal", 9),
    ] {
        if config.get_int("strategy", key, default) < 1 {
            return Err(invalid("strategy", key, &format!("{} must be positive", key)));
        }
    }

    let short = config.get_int("strategy", "short_window", 20);
    let long = config.get_int("strategy", "long_window", 50);
    if short >= long {
        return Err(invalid(
            "strategy",
            "short_window",
            "short_window must be less than long_window",
        ));
    }

    let fast = config.get_int("strategy", "macd_fast", 12);
    let slow = config.get_int("strategy", "macd_slow", 26);
    if fast >= slow {
        return Err(invalid(
            "strategy",
            "macd_fast",
            "macd_fast must be less than macd_slow",
        ));
    }
    Ok(())
}

pub fn validate_backtest_section(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let capital = config.get_double("backtest", "initial_capital", 100_000.0);
    if capital <= 0.0 || !capital.is_finite() {
        return Err(invalid(
            "backtest",
            "initial_capital",
            "initial_capital must be positive",
        ));
    }

    let rsi_exit = config.get_double("backtest", "rsi_exit", 70.0);
    if !(rsi_exit > 0.0 && rsi_exit <= 100.0) {
        return Err(invalid(
            "backtest",
            "rsi_exit",
            "rsi_exit must be in (0, 100]",
        ));
    }
    Ok(())
}

pub fn validate_data_section(config: &dyn ConfigPort) -> Result<(), TraderError> {
    let source = config
        .get_string("data", "source")
        .unwrap_or_else(|| "csv".to_string());
    if !matches!(source.trim().to_lowercase().as_str(), "csv" | "yahoo") {
        return Err(invalid("data", "source", "source must be csv or yahoo"));
    }

    if let Some(fallback) = config.get_string("data", "fallback") {
        if !matches!(fallback.trim().to_lowercase().as_str(), "csv" | "yahoo" | "none") {
            return Err(invalid("data", "fallback", "fallback must be csv, yahoo or none"));
        }
    }

    if config.get_int("data", "max_attempts", 3) < 1 {
        return Err(invalid("data", "max_attempts", "max_attempts must be at least 1"));
    }
    if config.get_double("data", "retry_delay_secs", 5.0) < 0.0 {
        return Err(invalid(
            "data",
            "retry_delay_secs",
            "retry_delay_secs must be non-negative",
        ));
    }
    Ok(())
}

pub fn validate_ml_section(config: &dyn ConfigPort) -> Result<(), TraderError> {
    if config.get_int("ml", "folds", 5) < 1 {
        return Err(invalid("ml", "folds", "folds must be at least 1"));
    }
    if config.get_int("ml", "max_iterations", 1000) < 1 {
        return Err(invalid("ml", "max_iterations", "max_iterations must be at least 1"));
    }
    if config.get_int("ml", "tree_max_depth", 5) < 1 {
        return Err(invalid("ml", "tree_max_depth", "tree_max_depth must be at least 1"));
    }
    Ok(())
}
