//! Bollinger Bands.
//!
//! - Center: simple moving average of close over n bars
//! - Upper: center + (multiplier × stddev)
//! - Lower: center - (multiplier × stddev)
//!
//! Sample deviation (n - 1) is the default; population (n) is available.
//! Warmup: first (period - 1) bars carry no band.

use crate::domain::indicator::{Band, BandParams, BandedBar, StdDevMode};
use crate::domain::ohlcv::OhlcvBar;

pub fn compute_bands(bars: &[OhlcvBar], params: &BandParams) -> Vec<BandedBar> {
    let period = params.period;
    let warmup = period.saturating_sub(1);

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let band = if period > 0 && i >= warmup {
                Some(window_band(&bars[i + 1 - period..=i], params))
            } else {
                None
            };
            BandedBar {
                bar: bar.clone(),
                band,
            }
        })
        .collect()
}

fn window_band(window: &[OhlcvBar], params: &BandParams) -> Band {
    let n = window.len() as f64;
    let center: f64 = window.iter().map(|b| b.close).sum::<f64>() / n;

    let sum_sq: f64 = window
        .iter()
        .map(|b| {
            let diff = b.close - center;
            diff * diff
        })
        .sum();

    let denom = match params.stddev_mode {
        StdDevMode::Sample => n - 1.0,
        StdDevMode::Population => n,
    };
    let stddev = if denom > 0.0 { (sum_sq / denom).sqrt() } else { 0.0 };

    Band {
        center,
        upper: center + params.multiplier * stddev,
        lower: center - params.multiplier * stddev,
    }
}
