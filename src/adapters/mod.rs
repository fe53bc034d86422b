//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod csv_report_adapter;
pub mod fallback_source;
pub mod file_config_adapter;
#[cfg(feature = "ml")]
pub mod linfa_model_adapter;
pub mod log_notifier;
pub mod telegram_adapter;
#[cfg(feature = "yahoo")]
pub mod yahoo_adapter;

pub use csv_report_adapter::NullReport;
