//! Band breach entry signals.
//!
//! A close outside the previous bar's band arms a trade that is entered at the
//! next bar's close, aiming back at the previous centerline.

use crate::domain::indicator::Band;
use crate::domain::ohlcv::OhlcvBar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Long,
    Short,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Long => write!(f, "long"),
            Direction::Short => write!(f, "short"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Signal {
    pub direction: Direction,
    pub entry: f64,
    pub stop: f64,
    pub target: f64,
}

/// Classify the previous bar against its band.
///
/// `prev_band` must belong to `prev`; the caller only invokes this once the
/// band is out of warm-up.
pub fn detect_signal(prev: &OhlcvBar, prev_band: &Band, current: &OhlcvBar) -> Option<Signal> {
    let entry = current.close;
    if prev.close < prev_band.lower {
        Some(Signal {
            direction: Direction::Long,
            entry,
            stop: entry - prev_band.lower_width(),
            target: prev_band.center,
        })
    } else if prev.close > prev_band.upper {
        Some(Signal {
            direction: Direction::Short,
            entry,
            stop: entry + prev_band.upper_width(),
            target: prev_band.center,
        })
    } else {
        None
    }
}
