//! Multi-instrument batch runs.
//!
//! Parses the symbol list from configuration and backtests every instrument
//! independently. A failure for one symbol is recorded in the report and
//! never stops the others.

use crate::domain::backtest::{run_instrument, BacktestConfig, BacktestResult};
use crate::domain::error::BandRevertError;
use crate::domain::ohlcv::{check_series, take_recent};
use crate::ports::data_port::DataPort;
use rayon::prelude::*;
use std::collections::HashSet;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SymbolListError {
    #[error("empty token in symbol list")]
    EmptyToken,
}

/// Split a comma separated symbol list. Case is preserved since broker
/// symbols like "Volatility 75 Index" are not all upper case. Repeated
/// symbols keep their first position and are logged.
pub fn parse_symbols(input: &str) -> Result<Vec<String>, SymbolListError> {
    let mut symbols = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let symbol = token.trim();
        if symbol.is_empty() {
            return Err(SymbolListError::EmptyToken);
        }
        if !seen.insert(symbol.to_string()) {
            warn!(symbol, "duplicate symbol in list, running it once");
            continue;
        }
        symbols.push(symbol.to_string());
    }

    Ok(symbols)
}

#[derive(Debug)]
pub struct InstrumentReport {
    pub symbol: String,
    pub outcome: Result<BacktestResult, BandRevertError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub instruments: Vec<InstrumentReport>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = (&str, &BacktestResult)> {
        self.instruments
            .iter()
            .filter_map(|r| r.outcome.as_ref().ok().map(|res| (r.symbol.as_str(), res)))
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &BandRevertError)> {
        self.instruments
            .iter()
            .filter_map(|r| r.outcome.as_ref().err().map(|e| (r.symbol.as_str(), e)))
    }

    pub fn success_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn failure_count(&self) -> usize {
        self.failed().count()
    }
}

/// Fetch, check and simulate one symbol.
pub fn run_symbol(
    data_port: &dyn DataPort,
    symbol: &str,
    config: &BacktestConfig,
) -> Result<BacktestResult, BandRevertError> {
    let bars = data_port.fetch_bars(symbol)?;
    if bars.is_empty() {
        return Err(BandRevertError::NoData {
            symbol: symbol.to_string(),
        });
    }
    check_series(symbol, &bars)?;

    let bars = take_recent(bars, config.bars);
    if bars.len() < config.period {
        warn!(
            symbol,
            bars = bars.len(),
            period = config.period,
            "insufficient data for band warm-up, nothing to simulate"
        );
    }

    let result = run_instrument(&bars, config)?;
    info!(
        symbol,
        bars = result.bars,
        trades = result.summary.total_trades(),
        unresolved = result.unresolved,
        "backtest complete"
    );
    Ok(result)
}

/// Backtest every symbol in parallel. Report order follows `symbols`.
pub fn run_batch(
    data_port: &(dyn DataPort + Sync),
    symbols: &[String],
    config: &BacktestConfig,
) -> Result<BatchReport, BandRevertError> {
    config.validate()?;

    let instruments: Vec<InstrumentReport> = symbols
        .par_iter()
        .map(|symbol| {
            let outcome = run_symbol(data_port, symbol, config);
            if let Err(e) = &outcome {
                warn!(symbol = symbol.as_str(), error = %e, "skipping instrument");
            }
            InstrumentReport {
                symbol: symbol.clone(),
                outcome,
            }
        })
        .collect();

    Ok(BatchReport { instruments })
}
