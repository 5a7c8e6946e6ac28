//! File report adapter implementing ReportPort.
//!
//! Writes an SVG equity chart and a CSV trade log per instrument.

pub mod chart_svg;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BandRevertError;
use crate::ports::report_port::ReportPort;
use std::fs;
use std::path::{Path, PathBuf};

pub struct FileReportAdapter {
    output_dir: PathBuf,
    charts: bool,
    trade_log: bool,
}

impl FileReportAdapter {
    pub fn new(output_dir: PathBuf, charts: bool, trade_log: bool) -> Self {
        Self {
            output_dir,
            charts,
            trade_log,
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn chart_path(&self, symbol: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_equity.svg", safe_file_stem(symbol)))
    }

    pub fn trade_log_path(&self, symbol: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_trades.csv", safe_file_stem(symbol)))
    }

    fn write_trade_log(&self, symbol: &str, result: &BacktestResult) -> Result<(), BandRevertError> {
        let path = self.trade_log_path(symbol);
        let csv_err = |e: csv::Error| BandRevertError::Data {
            reason: format!("failed to write {}: {}", path.display(), e),
        };

        let mut wtr = csv::Writer::from_path(&path).map_err(csv_err)?;
        wtr.write_record([
            "direction",
            "entry_index",
            "entry_time",
            "entry_price",
            "stop",
            "target",
            "exit_index",
            "exit_time",
            "exit_price",
            "outcome",
            "balance_after",
        ])
        .map_err(csv_err)?;

        for t in &result.trades {
            wtr.write_record([
                t.direction.to_string(),
                t.entry_index.to_string(),
                t.entry_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                t.entry_price.to_string(),
                t.stop.to_string(),
                t.target.to_string(),
                t.exit_index.to_string(),
                t.exit_time.format("%Y-%m-%d %H:%M:%S").to_string(),
                t.exit_price.to_string(),
                t.outcome.to_string(),
                format!("{:.2}", t.balance_after),
            ])
            .map_err(csv_err)?;
        }

        wtr.flush()?;
        Ok(())
    }
}

/// Broker symbols contain spaces and brackets; keep file names portable.
///
/// A symbol that needed rewriting gets a short hash of its original text, so
/// "Jump 25" and "Jump_25" land in different files.
pub fn safe_file_stem(symbol: &str) -> String {
    let stem: String = symbol
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if stem == symbol {
        return stem;
    }
    let hash = blake3::hash(symbol.as_bytes());
    format!("{}-{}", stem, &hash.to_hex().as_str()[..8])
}

impl ReportPort for FileReportAdapter {
    fn write(&self, symbol: &str, result: &BacktestResult) -> Result<(), BandRevertError> {
        if !self.charts && !self.trade_log {
            return Ok(());
        }
        fs::create_dir_all(&self.output_dir)?;

        if self.charts {
            let svg = chart_svg::render_equity_svg(symbol, &result.equity_curve);
            fs::write(self.chart_path(symbol), svg)?;
        }
        if self.trade_log {
            self.write_trade_log(symbol, result)?;
        }
        Ok(())
    }
}
