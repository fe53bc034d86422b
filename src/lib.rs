//! rsi-trend: RSI + moving-average signal generator and single-position
//! backtester.
//!
//! Hexagonal architecture: indicators, signals and the simulator live in
//! [`domain`], port traits in [`ports`], concrete implementations in
//! [`adapters`]. [`pipeline`] runs the per-symbol flow and [`cli`] wires it
//! to a config file.

pub mod domain;
pub mod ports;
pub mod adapters;
pub mod pipeline;
pub mod cli;
