//! CLI definition and dispatch.

use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info, warn};

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::report::FileReportAdapter;
use crate::domain::backtest::{BacktestConfig, BacktestResult};
use crate::domain::batch::{run_batch, BatchReport};
use crate::domain::config_validation::{
    build_backtest_config, resolve_symbols, validate_backtest_config,
};
use crate::domain::error::BandRevertError;
use crate::domain::metrics::PerformanceStats;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(
    name = "bandrevert",
    about = "Bollinger band mean-reversion backtester"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the backtest for every configured symbol
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Run a single symbol instead of the configured list
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        data_dir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Skip writing charts and trade logs
        #[arg(long)]
        no_report: bool,
    },
    /// Validate a configuration file and print the resolved run settings
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// List symbols available in the data directory
    ListSymbols {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        data_dir: Option<PathBuf>,
    },
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            data_dir,
            output,
            no_report,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            data_dir.as_ref(),
            output.as_ref(),
            no_report,
        ),
        Command::Validate { config } => run_validate(&config),
        Command::ListSymbols { config, data_dir } => run_list_symbols(&config, data_dir.as_ref()),
    }
}

fn fail(err: &BandRevertError) -> ExitCode {
    error!("{err}");
    err.into()
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, BandRevertError> {
    info!(path = %path.display(), "loading config");
    FileConfigAdapter::from_file(path)
}

pub fn resolve_data_dir(override_dir: Option<&PathBuf>, config: &dyn ConfigPort) -> PathBuf {
    override_dir
        .cloned()
        .or_else(|| config.get_string("data", "dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("data"))
}

pub fn build_report_adapter(
    override_dir: Option<&PathBuf>,
    config: &dyn ConfigPort,
) -> FileReportAdapter {
    let output_dir = override_dir
        .cloned()
        .or_else(|| config.get_string("report", "output_dir").map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from("reports"));
    FileReportAdapter::new(
        output_dir,
        config.get_bool("report", "charts", true),
        config.get_bool("report", "trade_log", true),
    )
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    data_dir: Option<&PathBuf>,
    output_dir: Option<&PathBuf>,
    no_report: bool,
) -> ExitCode {
    // Stage 1: Load and validate config
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }

    // Stage 2: Run configuration and symbol list
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(symbol_override, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    // Stage 3: Adapters
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));
    let reporter = if no_report {
        None
    } else {
        Some(build_report_adapter(output_dir, &adapter))
    };

    let mut out = std::io::stdout().lock();
    run_backtest_pipeline(
        &data_port,
        reporter.as_ref().map(|r| r as &dyn ReportPort),
        &symbols,
        &bt_config,
        &mut out,
    )
}

/// Stages 4-6: simulate, print, report. Split out so tests can drive it with a
/// mock data port and capture stdout.
pub fn run_backtest_pipeline(
    data_port: &(dyn DataPort + Sync),
    reporter: Option<&dyn ReportPort>,
    symbols: &[String],
    bt_config: &BacktestConfig,
    out: &mut dyn Write,
) -> ExitCode {
    info!(
        symbols = symbols.len(),
        bands = %bt_config.band_params(),
        risk = bt_config.risk_fraction,
        overlap = %bt_config.overlap,
        "running backtest"
    );

    // Stage 4: Simulate every instrument
    let report = match run_batch(data_port, symbols, bt_config) {
        Ok(r) => r,
        Err(e) => return fail(&e),
    };

    // Stage 5: Console summary
    if let Err(e) = print_report(&report, bt_config, out) {
        return fail(&BandRevertError::Io(e));
    }

    // Stage 6: Charts and trade logs
    if let Some(reporter) = reporter {
        for (symbol, result) in report.succeeded() {
            if let Err(e) = reporter.write(symbol, result) {
                warn!(symbol, error = %e, "failed to write report");
            }
        }
    }

    if report.success_count() == 0 {
        error!("no instrument completed");
        return ExitCode::from(5);
    }
    ExitCode::SUCCESS
}

pub fn print_report(
    report: &BatchReport,
    bt_config: &BacktestConfig,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    for instrument in &report.instruments {
        writeln!(
            out,
            "\nRunning Bollinger Band mean-reversion backtest for {}",
            instrument.symbol
        )?;
        match &instrument.outcome {
            Ok(result) => print_result(result, bt_config, out)?,
            Err(e) => writeln!(out, "Error with {}: {}", instrument.symbol, e)?,
        }
    }

    writeln!(
        out,
        "\n{} of {} instruments completed",
        report.success_count(),
        report.instruments.len()
    )?;
    Ok(())
}

fn print_result(
    result: &BacktestResult,
    bt_config: &BacktestConfig,
    out: &mut dyn Write,
) -> std::io::Result<()> {
    let summary = &result.summary;
    let stats = PerformanceStats::compute(result);

    writeln!(out, "Final Balance: ${:.2}", summary.final_balance)?;
    writeln!(
        out,
        "Trades: {} | Wins: {} | Losses: {} | Win Rate: {:.2}%",
        summary.total_trades(),
        summary.wins,
        summary.losses,
        summary.win_rate * 100.0
    )?;
    writeln!(
        out,
        "Return: {:.2}% | Max Drawdown: {:.2}% | Unresolved: {}",
        stats.total_return * 100.0,
        stats.max_drawdown * 100.0,
        result.unresolved
    )?;
    if result.suppressed > 0 {
        writeln!(
            out,
            "Suppressed: {} ({} overlap)",
            result.suppressed, bt_config.overlap
        )?;
    }
    if result.bars < bt_config.period {
        writeln!(
            out,
            "Insufficient data: {} bars, band period {}",
            result.bars, bt_config.period
        )?;
    }
    Ok(())
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    if let Err(e) = validate_backtest_config(&adapter) {
        return fail(&e);
    }
    let bt_config = match build_backtest_config(&adapter) {
        Ok(c) => c,
        Err(e) => return fail(&e),
    };
    let symbols = match resolve_symbols(None, &adapter) {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    println!("Bands:           {} ({} stddev)", bt_config.band_params(), bt_config.stddev_mode);
    println!("Initial balance: {:.2}", bt_config.initial_balance);
    println!("Risk per trade:  {}", bt_config.risk_fraction);
    println!("Overlap:         {}", bt_config.overlap);
    if bt_config.bars == 0 {
        println!("Bars:            all");
    } else {
        println!("Bars:            {}", bt_config.bars);
    }
    println!("Data dir:        {}", resolve_data_dir(None, &adapter).display());
    println!("Symbols:         {}", symbols.join(", "));
    println!("\nConfiguration is valid.");
    ExitCode::SUCCESS
}

fn run_list_symbols(config_path: &PathBuf, data_dir: Option<&PathBuf>) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(e) => return fail(&e),
    };
    let data_port = CsvAdapter::new(resolve_data_dir(data_dir, &adapter));

    let symbols = match data_port.list_symbols() {
        Ok(s) => s,
        Err(e) => return fail(&e),
    };

    if symbols.is_empty() {
        warn!("no symbols found");
    } else {
        for symbol in &symbols {
            println!("{}", symbol);
        }
        info!(count = symbols.len(), "symbols found");
    }
    ExitCode::SUCCESS
}
