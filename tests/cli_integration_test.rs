//! CLI integration tests for the run and validate commands.
//!
//! Tests cover:
//! - Config parsing into a RunConfig from real INI files on disk
//! - Dry-run and validate exit codes
//! - Full run over CSV files on disk, writing the CSV report sheets

mod common;

use common::*;
use rsi_trend::adapters::csv_adapter::CsvAdapter;
use rsi_trend::adapters::csv_report_adapter::CsvReportAdapter;
use rsi_trend::adapters::file_config_adapter::FileConfigAdapter;
use rsi_trend::cli::{self, Cli, Command, RunOverrides};
use rsi_trend::domain::error::TraderError;
use rsi_trend::pipeline::run_pipeline;
use std::fmt::Write as _;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tempfile::TempDir;

fn write_temp_ini(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn code_str(code: ExitCode) -> String {
    format!("{code:?}")
}

fn assert_exit(code: ExitCode, expected: u8) {
    assert_eq!(code_str(code), code_str(ExitCode::from(expected)));
}

const VALID_INI: &str = r#"
[run]
symbols = RELIANCE.NS, TCS.NS
start_date = 2024-01-01
end_date = 2024-06-30

[strategy]
rsi_period = 14
short_window = 20
long_window = 50

[backtest]
initial_capital = 100000
rsi_exit = 70

[data]
source = csv
csv_dir = data
max_attempts = 2
retry_delay_secs = 0
"#;

/// Writes `<dir>/<symbol>.csv` in the Yahoo download layout.
fn write_symbol_csv(dir: &Path, symbol: &str, closes: &[f64]) {
    let mut content = String::from("Date,Open,High,Low,Close,Adj Close,Volume\n");
    for (i, c) in closes.iter().enumerate() {
        writeln!(content, "{},{c},{c},{c},{c},{c},1000", day(i)).unwrap();
    }
    fs::write(dir.join(format!("{symbol}.csv")), content).unwrap();
}

mod config_building {
    use super::*;

    #[test]
    fn run_config_from_file() {
        let file = write_temp_ini(VALID_INI);
        let adapter = FileConfigAdapter::from_file(file.path()).unwrap();
        let rc = cli::build_run_config(&adapter, &RunOverrides::default(), date(2025, 1, 1))
            .unwrap();
        assert_eq!(rc.symbols, vec!["RELIANCE.NS", "TCS.NS"]);
        assert_eq!(rc.start_date, date(2024, 1, 1));
        assert_eq!(rc.end_date, date(2024, 6, 30));
        assert_eq!(rc.signal_params.long_window, 50);
        assert_eq!(rc.signal_params.macd_slow, 26);
        assert_eq!(rc.backtest.initial_capital, 100_000.0);
    }

    #[test]
    fn missing_symbols_is_config_missing() {
        let adapter = FileConfigAdapter::from_string("[run]\nlookback_months = 3\n").unwrap();
        let result = cli::build_run_config(&adapter, &RunOverrides::default(), date(2025, 1, 1));
        assert!(matches!(result, Err(TraderError::ConfigMissing { .. })));
    }

    #[test]
    fn bad_config_date_is_invalid() {
        let adapter =
            FileConfigAdapter::from_string("[run]\nsymbols = A\nend_date = 30/06/2024\n").unwrap();
        let result = cli::build_run_config(&adapter, &RunOverrides::default(), date(2025, 1, 1));
        assert!(matches!(result, Err(TraderError::ConfigInvalid { .. })));
    }
}

mod commands {
    use super::*;

    #[test]
    fn dry_run_valid_config_succeeds() {
        let file = write_temp_ini(VALID_INI);
        let code = cli::run_dry_run(file.path(), &RunOverrides::default());
        assert_exit(code, 0);
    }

    #[test]
    fn dry_run_missing_file_is_config_error() {
        let code = cli::run_dry_run(
            Path::new("/nonexistent/path/config.ini"),
            &RunOverrides::default(),
        );
        assert_exit(code, 2);
    }

    #[test]
    fn dry_run_invalid_windows_fails() {
        let file = write_temp_ini("[run]\nsymbols = A\n[strategy]\nshort_window = 60\n");
        let code = cli::run_dry_run(file.path(), &RunOverrides::default());
        assert_exit(code, 2);
    }

    #[test]
    fn validate_command() {
        let good = write_temp_ini(VALID_INI);
        let code = cli::run(Cli {
            command: Command::Validate {
                config: good.path().to_path_buf(),
            },
        });
        assert_exit(code, 0);

        let bad = write_temp_ini("[backtest]\ninitial_capital = -5\n");
        let code = cli::run(Cli {
            command: Command::Validate {
                config: bad.path().to_path_buf(),
            },
        });
        assert_exit(code, 2);
    }
}

mod csv_end_to_end {
    use super::*;

    #[test]
    fn pipeline_over_csv_files_writes_sheets() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_symbol_csv(data.path(), "DIP", &DIP_CLOSES);
        write_symbol_csv(data.path(), "UP", &[1.0, 2.0, 3.0, 4.0, 5.0]);

        let source = CsvAdapter::new(data.path().to_path_buf());
        let report = CsvReportAdapter::new(out.path().to_path_buf()).unwrap();
        let mut config = cli::build_run_config(
            &FileConfigAdapter::from_string("[run]\nsymbols = DIP, UP, NOFILE\nstart_date = 2024-01-01\n").unwrap(),
            &RunOverrides::default(),
            date(2024, 12, 31),
        )
        .unwrap();
        config.signal_params = fast_params();

        let outcome = run_pipeline(&source, &report, &RecordingNotifier::default(), None, &config);
        assert_eq!(outcome.total_trades(), 1);
        assert_eq!(outcome.failed_symbols, vec!["NOFILE"]);

        let signals = fs::read_to_string(out.path().join("Signals.csv")).unwrap();
        assert_eq!(signals.lines().count(), 1 + DIP_CLOSES.len() + 5);
        let trades = fs::read_to_string(out.path().join("Trades.csv")).unwrap();
        assert_eq!(trades.lines().count(), 2);
        assert!(trades.lines().nth(1).unwrap().starts_with("DIP,2024-01-07,2024-01-08,"));
        let summary = fs::read_to_string(out.path().join("Summary.csv")).unwrap();
        assert_eq!(summary.lines().count(), 4);
    }

    #[test]
    fn run_command_with_output_dir() {
        let data = TempDir::new().unwrap();
        let out = TempDir::new().unwrap();
        write_symbol_csv(data.path(), "DIP", &DIP_CLOSES);

        let ini = format!(
            "[run]\nsymbols = DIP\nstart_date = 2024-01-01\nend_date = 2024-03-01\n\
             [strategy]\nrsi_period = 2\nshort_window = 2\nlong_window = 4\n\
             [data]\nsource = csv\ncsv_dir = {}\nretry_delay_secs = 0\n",
            data.path().display()
        );
        let file = write_temp_ini(&ini);
        let sheets: PathBuf = out.path().join("sheets");

        let code = cli::run(Cli {
            command: Command::Run {
                config: file.path().to_path_buf(),
                symbols: vec![],
                start: None,
                end: None,
                output_dir: Some(sheets.clone()),
                dry_run: false,
            },
        });

        assert_exit(code, 0);
        let trades = fs::read_to_string(sheets.join("Trades.csv")).unwrap();
        assert_eq!(trades.lines().count(), 2);
        assert!(sheets.join("Summary.csv").is_file());
    }
}
