//! OHLCV bar representation and series sanity checks.

use crate::domain::error::BandRevertError;
use chrono::NaiveDateTime;

#[derive(Debug, Clone, PartialEq)]
pub struct OhlcvBar {
    pub timestamp: NaiveDateTime,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
}

impl OhlcvBar {
    fn prices_finite(&self) -> bool {
        self.open.is_finite() && self.high.is_finite() && self.low.is_finite() && self.close.is_finite()
    }
}

/// Reject series the simulation cannot reason about: non-finite prices,
/// inverted ranges, or timestamps that do not strictly increase.
pub fn check_series(symbol: &str, bars: &[OhlcvBar]) -> Result<(), BandRevertError> {
    for (i, bar) in bars.iter().enumerate() {
        if !bar.prices_finite() {
            return Err(BandRevertError::malformed(
                symbol,
                format!("non-finite price at bar {} ({})", i, bar.timestamp),
            ));
        }
        if bar.high < bar.low {
            return Err(BandRevertError::malformed(
                symbol,
                format!("high below low at bar {} ({})", i, bar.timestamp),
            ));
        }
    }

    if let Some(w) = bars.windows(2).find(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(BandRevertError::malformed(
            symbol,
            format!("timestamps not increasing at {}", w[1].timestamp),
        ));
    }

    Ok(())
}

/// Keep the most recent `count` bars. Zero keeps everything.
pub fn take_recent(mut bars: Vec<OhlcvBar>, count: usize) -> Vec<OhlcvBar> {
    if count > 0 && bars.len() > count {
        bars.drain(..bars.len() - count);
    }
    bars
}
