//! Forward scan for a signal's stop-loss or take-profit.

use crate::domain::indicator::BandedBar;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::signal::{Direction, Signal};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeOutcome {
    Win,
    Loss,
}

impl fmt::Display for TradeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeOutcome::Win => write!(f, "win"),
            TradeOutcome::Loss => write!(f, "loss"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Exit {
    pub index: usize,
    pub outcome: TradeOutcome,
    /// Stop price on a loss, the exit bar's close on a win.
    pub price: f64,
}

/// Stop is touched intrabar: low for longs, high for shorts.
pub fn stop_hit(signal: &Signal, bar: &OhlcvBar) -> bool {
    match signal.direction {
        Direction::Long => bar.low <= signal.stop,
        Direction::Short => bar.high >= signal.stop,
    }
}

/// Target only counts on the close.
pub fn target_hit(signal: &Signal, bar: &OhlcvBar) -> bool {
    match signal.direction {
        Direction::Long => bar.close >= signal.target,
        Direction::Short => bar.close <= signal.target,
    }
}

/// Scan bars after `entry_index` for the first one that settles the trade.
///
/// The stop is checked before the target on every bar, so a bar that touches
/// both is a loss. Returns `None` when the series ends first.
pub fn resolve_exit(signal: &Signal, series: &[BandedBar], entry_index: usize) -> Option<Exit> {
    series
        .iter()
        .enumerate()
        .skip(entry_index + 1)
        .find_map(|(index, banded)| {
            let bar = &banded.bar;
            if stop_hit(signal, bar) {
                Some(Exit {
                    index,
                    outcome: TradeOutcome::Loss,
                    price: signal.stop,
                })
            } else if target_hit(signal, bar) {
                Some(Exit {
                    index,
                    outcome: TradeOutcome::Win,
                    price: bar.close,
                })
            } else {
                None
            }
        })
}
