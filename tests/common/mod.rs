#![allow(dead_code)]

use bandrevert::domain::backtest::BacktestConfig;
use bandrevert::domain::error::BandRevertError;
pub use bandrevert::domain::ohlcv::OhlcvBar;
use bandrevert::ports::data_port::DataPort;
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, symbol: &str, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert(symbol.to_string(), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BandRevertError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(BandRevertError::Data {
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| BandRevertError::NoData {
                symbol: symbol.to_string(),
            })
    }

    fn list_symbols(&self) -> Result<Vec<String>, BandRevertError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }
}

pub fn start_time() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// M15 bar `i` with an explicit range.
pub fn bar(i: usize, low: f64, high: f64, close: f64) -> OhlcvBar {
    OhlcvBar {
        timestamp: start_time() + chrono::Duration::minutes(15 * i as i64),
        open: close,
        high,
        low,
        close,
        volume: 100,
    }
}

/// M15 bars with a half-point range around each close.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| bar(i, c - 0.5, c + 0.5, c))
        .collect()
}

/// Twenty bars alternating 100 / 101, quiet enough that none breach.
pub fn quiet_warmup() -> Vec<f64> {
    (0..20)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect()
}

pub fn sample_config() -> BacktestConfig {
    BacktestConfig {
        period: 20,
        band_multiplier: 2.0,
        initial_balance: 10_000.0,
        risk_fraction: 0.01,
        ..BacktestConfig::default()
    }
}
