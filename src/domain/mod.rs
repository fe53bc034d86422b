//! Core domain types and logic: indicators, signals, the backtest simulator.

pub mod ohlcv;
pub mod indicator;
pub mod signal;
pub mod position;
pub mod backtest;
pub mod metrics;
pub mod features;
pub mod classification;
pub mod config_validation;
pub mod error;
