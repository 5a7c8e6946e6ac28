//! Configuration validation and loading.
//!
//! Every key is checked before any data is read.

use crate::domain::backtest::{BacktestConfig, OverlapPolicy};
use crate::domain::batch::parse_symbols;
use crate::domain::error::BandRevertError;
use crate::domain::indicator::StdDevMode;
use crate::ports::config_port::ConfigPort;

const SECTION: &str = "backtest";

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    validate_initial_balance(config)?;
    validate_risk(config)?;
    validate_period(config)?;
    validate_multiplier(config)?;
    validate_bars(config)?;
    validate_stddev_mode(config)?;
    validate_overlap(config)?;
    resolve_symbols(None, config)?;
    Ok(())
}

/// Build the run configuration from `[backtest]`, with the defaults of
/// `BacktestConfig::default()` for absent keys.
pub fn build_backtest_config(config: &dyn ConfigPort) -> Result<BacktestConfig, BandRevertError> {
    let defaults = BacktestConfig::default();

    let stddev_mode = match config.get_string(SECTION, "stddev_mode") {
        Some(s) => StdDevMode::parse(&s).ok_or_else(|| {
            BandRevertError::invalid(SECTION, "stddev_mode", "expected sample or population")
        })?,
        None => defaults.stddev_mode,
    };
    let overlap = match config.get_string(SECTION, "overlap") {
        Some(s) => OverlapPolicy::parse(&s).ok_or_else(|| {
            BandRevertError::invalid(SECTION, "overlap", "expected independent or exclusive")
        })?,
        None => defaults.overlap,
    };

    let period = read_int(config, "bb_period", defaults.period as i64)?;
    let bars = read_int(config, "bars", defaults.bars as i64)?;

    let built = BacktestConfig {
        period: usize::try_from(period)
            .map_err(|_| BandRevertError::invalid(SECTION, "bb_period", "bb_period must be at least 1"))?,
        band_multiplier: read_double(config, "bb_stddev", defaults.band_multiplier)?,
        stddev_mode,
        initial_balance: read_double(config, "initial_balance", defaults.initial_balance)?,
        risk_fraction: read_double(config, "risk_per_trade", defaults.risk_fraction)?,
        overlap,
        bars: usize::try_from(bars)
            .map_err(|_| BandRevertError::invalid(SECTION, "bars", "bars must be non-negative"))?,
    };
    built.validate()?;
    Ok(built)
}

/// Symbols from the override, `symbols`, or a single `symbol` key.
pub fn resolve_symbols(
    symbol_override: Option<&str>,
    config: &dyn ConfigPort,
) -> Result<Vec<String>, BandRevertError> {
    if let Some(s) = symbol_override {
        return Ok(parse_symbols(s)?);
    }

    let list = config
        .get_string(SECTION, "symbols")
        .filter(|s| !s.trim().is_empty())
        .or_else(|| config.get_string(SECTION, "symbol").filter(|s| !s.trim().is_empty()));

    match list {
        Some(s) => Ok(parse_symbols(&s)?),
        None => Err(BandRevertError::ConfigMissing {
            section: SECTION.to_string(),
            key: "symbols".to_string(),
        }),
    }
}

/// Raw value of a `[backtest]` key, with blank values treated as absent.
fn raw_value(config: &dyn ConfigPort, key: &str) -> Option<String> {
    config
        .get_string(SECTION, key)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn read_int(config: &dyn ConfigPort, key: &str, default: i64) -> Result<i64, BandRevertError> {
    match raw_value(config, key) {
        Some(raw) => raw.parse().map_err(|_| {
            BandRevertError::invalid(SECTION, key, format!("expected an integer, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

fn read_double(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, BandRevertError> {
    match raw_value(config, key) {
        Some(raw) => raw.parse().map_err(|_| {
            BandRevertError::invalid(SECTION, key, format!("expected a number, got '{raw}'"))
        }),
        None => Ok(default),
    }
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    let value = read_double(config, "initial_balance", 10_000.0)?;
    if !(value > 0.0 && value.is_finite()) {
        return Err(BandRevertError::invalid(
            SECTION,
            "initial_balance",
            "initial_balance must be positive",
        ));
    }
    Ok(())
}

fn validate_risk(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    let value = read_double(config, "risk_per_trade", 0.01)?;
    if !(value > 0.0 && value < 1.0) {
        return Err(BandRevertError::invalid(
            SECTION,
            "risk_per_trade",
            "risk_per_trade must be between 0 and 1 (exclusive)",
        ));
    }
    Ok(())
}

fn validate_period(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    let value = read_int(config, "bb_period", 20)?;
    if value < 1 {
        return Err(BandRevertError::invalid(
            SECTION,
            "bb_period",
            "bb_period must be at least 1",
        ));
    }
    Ok(())
}

fn validate_multiplier(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    let value = read_double(config, "bb_stddev", 2.0)?;
    if !(value > 0.0 && value.is_finite()) {
        return Err(BandRevertError::invalid(
            SECTION,
            "bb_stddev",
            "bb_stddev must be positive",
        ));
    }
    Ok(())
}

fn validate_bars(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    let value = read_int(config, "bars", 3000)?;
    if value < 0 {
        return Err(BandRevertError::invalid(
            SECTION,
            "bars",
            "bars must be non-negative",
        ));
    }
    Ok(())
}

fn validate_stddev_mode(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    match config.get_string(SECTION, "stddev_mode") {
        Some(s) if StdDevMode::parse(&s).is_none() => Err(BandRevertError::invalid(
            SECTION,
            "stddev_mode",
            "expected sample or population",
        )),
        _ => Ok(()),
    }
}

fn validate_overlap(config: &dyn ConfigPort) -> Result<(), BandRevertError> {
    match config.get_string(SECTION, "overlap") {
        Some(s) if OverlapPolicy::parse(&s).is_none() => Err(BandRevertError::invalid(
            SECTION,
            "overlap",
            "expected independent or exclusive",
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::file_config_adapter::FileConfigAdapter;

    fn make_config(content: &str) -> FileConfigAdapter {
        FileConfigAdapter::from_string(content).unwrap()
    }

    #[test]
    fn valid_backtest_config_passes() {
        let config = make_config(
            r#"
[backtest]
symbols = XAUUSD, BTCUSD, Volatility 75 Index
bars = 3000
initial_balance = 10000
risk_per_trade = 0.01
bb_period = 20
bb_stddev = 2
stddev_mode = sample
overlap = independent
"#,
        );
        assert!(validate_backtest_config(&config).is_ok());
    }

    #[test]
    fn initial_balance_must_be_positive() {
        let config = make_config("[backtest]\ninitial_balance = -100\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "initial_balance")
        );
    }

    #[test]
    fn risk_of_one_fails() {
        let config = make_config("[backtest]\nrisk_per_trade = 1.0\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "risk_per_trade")
        );
    }

    #[test]
    fn risk_of_zero_fails() {
        let config = make_config("[backtest]\nrisk_per_trade = 0\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "risk_per_trade")
        );
    }

    #[test]
    fn zero_period_fails() {
        let config = make_config("[backtest]\nbb_period = 0\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bb_period"));
    }

    #[test]
    fn negative_multiplier_fails() {
        let config = make_config("[backtest]\nbb_stddev = -2\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bb_stddev"));
    }

    #[test]
    fn negative_bars_fails() {
        let config = make_config("[backtest]\nbars = -1\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bars"));
    }

    #[test]
    fn unknown_stddev_mode_fails() {
        let config = make_config("[backtest]\nstddev_mode = ewm\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "stddev_mode"));
    }

    #[test]
    fn unknown_overlap_fails() {
        let config = make_config("[backtest]\noverlap = maybe\nsymbol = XAUUSD\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "overlap"));
    }

    #[test]
    fn unparseable_float_fails() {
        let config = make_config("[backtest]\nsymbols = XAUUSD\nrisk_per_trade = 5%\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(
            matches!(err, BandRevertError::ConfigInvalid { ref key, ref reason, .. }
                if key == "risk_per_trade" && reason.contains("5%"))
        );
        assert!(build_backtest_config(&config).is_err());
    }

    #[test]
    fn unparseable_int_fails() {
        let config = make_config("[backtest]\nsymbols = XAUUSD\nbb_period = twenty\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { ref key, .. } if key == "bb_period"));

        let err = build_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bb_period"));
    }

    #[test]
    fn fractional_bars_fails() {
        let config = make_config("[backtest]\nsymbols = XAUUSD\nbars = 1500.5\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bars"));
    }

    #[test]
    fn blank_numeric_value_uses_default() {
        let config = make_config("[backtest]\nsymbols = XAUUSD\nbb_stddev =\n");
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(build_backtest_config(&config).unwrap().band_multiplier, 2.0);
    }

    #[test]
    fn missing_symbols_fails() {
        let config = make_config("[backtest]\ninitial_balance = 100\n");
        let err = validate_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigMissing { key, .. } if key == "symbols"));
    }

    #[test]
    fn duplicate_symbols_run_once() {
        let config = make_config("[backtest]\nsymbols = BTCUSD, XAUUSD, BTCUSD\n");
        assert!(validate_backtest_config(&config).is_ok());
        assert_eq!(resolve_symbols(None, &config).unwrap(), vec!["BTCUSD", "XAUUSD"]);
    }

    #[test]
    fn build_uses_defaults() {
        let config = make_config("[backtest]\nsymbol = XAUUSD\n");
        let built = build_backtest_config(&config).unwrap();
        assert_eq!(built, BacktestConfig::default());
    }

    #[test]
    fn build_reads_all_keys() {
        let config = make_config(
            r#"
[backtest]
symbol = XAUUSD
bars = 500
initial_balance = 2500.5
risk_per_trade = 0.02
bb_period = 14
bb_stddev = 2.5
stddev_mode = population
overlap = exclusive
"#,
        );
        let built = build_backtest_config(&config).unwrap();
        assert_eq!(built.bars, 500);
        assert_eq!(built.initial_balance, 2500.5);
        assert_eq!(built.risk_fraction, 0.02);
        assert_eq!(built.period, 14);
        assert_eq!(built.band_multiplier, 2.5);
        assert_eq!(built.stddev_mode, StdDevMode::Population);
        assert_eq!(built.overlap, OverlapPolicy::Exclusive);
    }

    #[test]
    fn build_rejects_negative_period() {
        let config = make_config("[backtest]\nbb_period = -3\n");
        let err = build_backtest_config(&config).unwrap_err();
        assert!(matches!(err, BandRevertError::ConfigInvalid { key, .. } if key == "bb_period"));
    }

    #[test]
    fn resolve_symbols_prefers_override() {
        let config = make_config("[backtest]\nsymbols = XAUUSD,BTCUSD\n");
        let symbols = resolve_symbols(Some("Japan 225"), &config).unwrap();
        assert_eq!(symbols, vec!["Japan 225"]);
    }

    #[test]
    fn resolve_symbols_falls_back_to_single_key() {
        let config = make_config("[backtest]\nsymbol = ETHUSD\n");
        assert_eq!(resolve_symbols(None, &config).unwrap(), vec!["ETHUSD"]);
    }

    #[test]
    fn resolve_symbols_ignores_blank_list() {
        let config = make_config("[backtest]\nsymbols =\nsymbol = ETHUSD\n");
        assert_eq!(resolve_symbols(None, &config).unwrap(), vec!["ETHUSD"]);
    }
}
