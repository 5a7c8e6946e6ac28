//! Backtest driver and run configuration.
//!
//! Walks one instrument's banded series in index order, spawns a forward exit
//! scan for every signal and feeds resolved outcomes to the equity ledger.

use crate::domain::error::BandRevertError;
use crate::domain::exit::{resolve_exit, TradeOutcome};
use crate::domain::indicator::{compute_bands, BandParams, BandedBar, StdDevMode};
use crate::domain::ledger::EquityLedger;
use crate::domain::metrics::Summary;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{detect_signal, Direction};
use chrono::NaiveDateTime;
use std::fmt;
use tracing::debug;

/// How a new signal is treated while an earlier trade is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OverlapPolicy {
    /// Every signal gets its own scan; open trades stack.
    #[default]
    Independent,
    /// Signals are ignored until the bar after the open trade's exit.
    Exclusive,
}

impl OverlapPolicy {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "independent" => Some(OverlapPolicy::Independent),
            "exclusive" => Some(OverlapPolicy::Exclusive),
            _ => None,
        }
    }
}

impl fmt::Display for OverlapPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OverlapPolicy::Independent => write!(f, "independent"),
            OverlapPolicy::Exclusive => write!(f, "exclusive"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub period: usize,
    pub band_multiplier: f64,
    pub stddev_mode: StdDevMode,
    pub initial_balance: f64,
    pub risk_fraction: f64,
    pub overlap: OverlapPolicy,
    /// Most recent bars to simulate; 0 uses the whole series.
    pub bars: usize,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        BacktestConfig {
            period: 20,
            band_multiplier: 2.0,
            stddev_mode: StdDevMode::Sample,
            initial_balance: 10_000.0,
            risk_fraction: 0.01,
            overlap: OverlapPolicy::Independent,
            bars: 3000,
        }
    }
}

impl BacktestConfig {
    pub fn band_params(&self) -> BandParams {
        BandParams {
            period: self.period,
            multiplier: self.band_multiplier,
            stddev_mode: self.stddev_mode,
        }
    }

    pub fn validate(&self) -> Result<(), BandRevertError> {
        if self.period == 0 {
            return Err(BandRevertError::invalid(
                "backtest",
                "bb_period",
                "bb_period must be at least 1",
            ));
        }
        if !(self.band_multiplier > 0.0 && self.band_multiplier.is_finite()) {
            return Err(BandRevertError::invalid(
                "backtest",
                "bb_stddev",
                "bb_stddev must be positive",
            ));
        }
        if !(self.initial_balance > 0.0 && self.initial_balance.is_finite()) {
            return Err(BandRevertError::invalid(
                "backtest",
                "initial_balance",
                "initial_balance must be positive",
            ));
        }
        if !(self.risk_fraction > 0.0 && self.risk_fraction < 1.0) {
            return Err(BandRevertError::invalid(
                "backtest",
                "risk_per_trade",
                "risk_per_trade must be between 0 and 1 (exclusive)",
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub direction: Direction,
    pub entry_index: usize,
    pub entry_time: NaiveDateTime,
    pub entry_price: f64,
    pub stop: f64,
    pub target: f64,
    pub exit_index: usize,
    pub exit_time: NaiveDateTime,
    pub exit_price: f64,
    pub outcome: TradeOutcome,
    pub balance_after: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub summary: Summary,
    pub equity_curve: Vec<f64>,
    pub trades: Vec<TradeRecord>,
    pub signals: usize,
    /// Signals whose scan ran off the end of the series.
    pub unresolved: usize,
    /// Signals skipped under `OverlapPolicy::Exclusive`.
    pub suppressed: usize,
    pub bars: usize,
}

impl BacktestResult {
    /// Result of a run that had nothing to simulate.
    pub fn empty(initial_balance: f64, bars: usize) -> Self {
        BacktestResult {
            summary: Summary::new(initial_balance, 0, 0),
            equity_curve: vec![initial_balance],
            trades: Vec::new(),
            signals: 0,
            unresolved: 0,
            suppressed: 0,
            bars,
        }
    }
}

/// Simulate one instrument over an already banded series.
pub fn run_backtest(
    series: &[BandedBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, BandRevertError> {
    config.validate()?;

    let mut ledger = EquityLedger::new(config.initial_balance, config.risk_fraction);
    let mut trades = Vec::new();
    let mut wins = 0usize;
    let mut losses = 0usize;
    let mut signals = 0usize;
    let mut unresolved = 0usize;
    let mut suppressed = 0usize;
    // Last bar index covered by an open trade under the exclusive policy.
    let mut busy_until: Option<usize> = None;

    // The first `period` bars never act as the previous bar.
    for i in (config.period + 1)..series.len() {
        let prev = &series[i - 1];
        let Some(prev_band) = prev.band.as_ref() else {
            continue;
        };
        let current = &series[i];
        let Some(signal) = detect_signal(&prev.bar, prev_band, &current.bar) else {
            continue;
        };
        signals += 1;

        if config.overlap == OverlapPolicy::Exclusive && busy_until.is_some_and(|end| i <= end) {
            suppressed += 1;
            continue;
        }

        let Some(exit) = resolve_exit(&signal, series, i) else {
            debug!(index = i, direction = %signal.direction, "signal unresolved at end of series");
            unresolved += 1;
            busy_until = Some(usize::MAX);
            continue;
        };
        busy_until = Some(exit.index);

        match exit.outcome {
            TradeOutcome::Win => wins += 1,
            TradeOutcome::Loss => losses += 1,
        }
        let balance_after = ledger.apply(exit.outcome);

        debug!(
            entry = i,
            exit = exit.index,
            direction = %signal.direction,
            outcome = %exit.outcome,
            balance = balance_after,
            "trade resolved"
        );

        trades.push(TradeRecord {
            direction: signal.direction,
            entry_index: i,
            entry_time: current.bar.timestamp,
            entry_price: signal.entry,
            stop: signal.stop,
            target: signal.target,
            exit_index: exit.index,
            exit_time: series[exit.index].bar.timestamp,
            exit_price: exit.price,
            outcome: exit.outcome,
            balance_after,
        });
    }

    Ok(BacktestResult {
        summary: Summary::new(ledger.balance(), wins, losses),
        equity_curve: ledger.into_curve(),
        trades,
        signals,
        unresolved,
        suppressed,
        bars: series.len(),
    })
}

/// Build bands for raw bars and simulate them.
///
/// A series shorter than the band period has nothing to trade and yields an
/// empty result rather than an error.
pub fn run_instrument(
    bars: &[OhlcvBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, BandRevertError> {
    config.validate()?;
    if bars.len() < config.period {
        return Ok(BacktestResult::empty(config.initial_balance, bars.len()));
    }
    let series = compute_bands(bars, &config.band_params());
    run_backtest(&series, config)
}
