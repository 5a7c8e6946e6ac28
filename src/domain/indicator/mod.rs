//! Volatility band indicator types.
//!
//! - `Band`: centerline with upper/lower thresholds at one bar
//! - `BandedBar`: a price bar with its band, or `None` during warm-up
//! - `BandParams`: window length, multiplier and deviation flavour

pub mod bollinger;

pub use bollinger::compute_bands;

use crate::domain::ohlcv::OhlcvBar;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub center: f64,
    pub upper: f64,
    pub lower: f64,
}

impl Band {
    /// Distance from the centerline down to the lower band.
    pub fn lower_width(&self) -> f64 {
        self.center - self.lower
    }

    /// Distance from the centerline up to the upper band.
    pub fn upper_width(&self) -> f64 {
        self.upper - self.center
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BandedBar {
    pub bar: OhlcvBar,
    /// `None` until the rolling window has `period` closes.
    pub band: Option<Band>,
}

/// Which denominator the rolling standard deviation uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StdDevMode {
    /// Divide by n - 1.
    #[default]
    Sample,
    /// Divide by n.
    Population,
}

impl StdDevMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "sample" => Some(StdDevMode::Sample),
            "population" => Some(StdDevMode::Population),
            _ => None,
        }
    }
}

impl fmt::Display for StdDevMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StdDevMode::Sample => write!(f, "sample"),
            StdDevMode::Population => write!(f, "population"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandParams {
    pub period: usize,
    pub multiplier: f64,
    pub stddev_mode: StdDevMode,
}

impl fmt::Display for BandParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BB({},{})", self.period, self.multiplier)
    }
}
