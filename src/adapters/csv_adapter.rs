//! CSV price history adapter.
//!
//! One file per symbol, `<dir>/<symbol>.csv`, with a header row and columns
//! `time,open,high,low,close` followed by an optional volume. Further columns
//! (MetaTrader exports carry `spread` and `real_volume`) are ignored.

use crate::domain::error::BandRevertError;
use crate::domain::ohlcv::OhlcvBar;
use crate::ports::data_port::DataPort;
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str) -> PathBuf {
        self.base_path.join(format!("{}.csv", symbol))
    }
}

/// Unix seconds, `YYYY-MM-DD HH:MM:SS`, or a bare date at midnight.
fn parse_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<i64>() {
        return DateTime::from_timestamp(secs, 0).map(|dt| dt.naive_utc());
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

fn price_field(
    record: &csv::StringRecord,
    idx: usize,
    name: &str,
    symbol: &str,
    row: usize,
) -> Result<f64, BandRevertError> {
    let raw = record.get(idx).ok_or_else(|| {
        BandRevertError::malformed(symbol, format!("missing {} column at row {}", name, row))
    })?;
    raw.trim().parse().map_err(|e| {
        BandRevertError::malformed(symbol, format!("invalid {} value at row {}: {}", name, row, e))
    })
}

impl DataPort for CsvAdapter {
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BandRevertError> {
        let path = self.csv_path(symbol);
        let content = match fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(BandRevertError::NoData {
                    symbol: symbol.to_string(),
                });
            }
            Err(e) => {
                return Err(BandRevertError::Data {
                    reason: format!("failed to read {}: {}", path.display(), e),
                });
            }
        };

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            let row = i + 1;
            let record = result.map_err(|e| {
                BandRevertError::malformed(symbol, format!("CSV parse error: {}", e))
            })?;

            let time_str = record.get(0).ok_or_else(|| {
                BandRevertError::malformed(symbol, format!("missing time column at row {}", row))
            })?;
            let timestamp = parse_time(time_str).ok_or_else(|| {
                BandRevertError::malformed(
                    symbol,
                    format!("invalid time '{}' at row {}", time_str, row),
                )
            })?;

            let volume = record
                .get(5)
                .and_then(|v| v.trim().parse::<f64>().ok())
                .map(|v| v as i64)
                .unwrap_or(0);

            bars.push(OhlcvBar {
                timestamp,
                open: price_field(&record, 1, "open", symbol, row)?,
                high: price_field(&record, 2, "high", symbol, row)?,
                low: price_field(&record, 3, "low", symbol, row)?,
                close: price_field(&record, 4, "close", symbol, row)?,
                volume,
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, BandRevertError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| BandRevertError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();

        for entry in entries {
            let entry = entry.map_err(|e| BandRevertError::Data {
                reason: format!("directory entry error: {}", e),
            })?;

            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            if let Some(symbol) = name_str.strip_suffix(".csv") {
                if !symbol.is_empty() {
                    symbols.push(symbol.to_string());
                }
            }
        }

        symbols.sort();
        Ok(symbols)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn setup_test_data() -> (TempDir, PathBuf) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().to_path_buf();

        // MetaTrader rates export, deliberately out of order
        let mt5 = "time,open,high,low,close,tick_volume,spread,real_volume\n\
            1704068100,2063.5,2064.0,2062.9,2063.8,120,15,0\n\
            1704067200,2062.0,2064.1,2061.7,2063.5,140,15,0\n";
        fs::write(path.join("XAUUSD.csv"), mt5).unwrap();

        let dated = "time,open,high,low,close\n\
            2024-01-15 09:00:00,100.0,110.0,90.0,105.0\n\
            2024-01-15 09:15:00,105.0,115.0,100.0,110.0\n\
            2024-01-16,110.0,120.0,105.0,115.0\n";
        fs::write(path.join("Volatility 75 Index.csv"), dated).unwrap();

        fs::write(path.join("BAD.csv"), "time,open,high,low,close\nyesterday,1,2,0,1\n").unwrap();
        fs::write(path.join("notes.txt"), "ignored").unwrap();

        (dir, path)
    }

    #[test]
    fn fetch_bars_parses_unix_seconds_and_sorts() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("XAUUSD").unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(
            bars[0].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
        assert_eq!(bars[0].close, 2063.5);
        assert_eq!(bars[0].volume, 140);
        assert_eq!(bars[1].close, 2063.8);
    }

    #[test]
    fn fetch_bars_parses_datetime_strings() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let bars = adapter.fetch_bars("Volatility 75 Index").unwrap();
        assert_eq!(bars.len(), 3);
        assert_eq!(bars[0].open, 100.0);
        assert_eq!(bars[0].high, 110.0);
        assert_eq!(bars[0].low, 90.0);
        assert_eq!(bars[0].close, 105.0);
        assert_eq!(bars[0].volume, 0);
        assert_eq!(
            bars[2].timestamp,
            NaiveDate::from_ymd_opt(2024, 1, 16)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap()
        );
    }

    #[test]
    fn fetch_bars_missing_file_is_no_data() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_bars("ETHUSD").unwrap_err();
        assert!(matches!(err, BandRevertError::NoData { symbol } if symbol == "ETHUSD"));
    }

    #[test]
    fn fetch_bars_bad_time_is_malformed() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let err = adapter.fetch_bars("BAD").unwrap_err();
        assert!(matches!(err, BandRevertError::MalformedData { .. }));
        assert!(err.to_string().contains("row 1"));
    }

    #[test]
    fn list_symbols_returns_csv_stems() {
        let (_dir, path) = setup_test_data();
        let adapter = CsvAdapter::new(path);

        let symbols = adapter.list_symbols().unwrap();
        assert_eq!(symbols, vec!["BAD", "Volatility 75 Index", "XAUUSD"]);
    }

    #[test]
    fn list_symbols_missing_dir_errors() {
        let adapter = CsvAdapter::new(PathBuf::from("/nonexistent/bandrevert/data"));
        assert!(matches!(
            adapter.list_symbols(),
            Err(BandRevertError::Data { .. })
        ));
    }

    #[test]
    fn parse_time_formats() {
        assert!(parse_time("1704067200").is_some());
        assert!(parse_time("2024-01-01 00:15:00").is_some());
        assert!(parse_time("2024-01-01T00:15:00").is_some());
        assert!(parse_time("2024-01-01").is_some());
        assert!(parse_time("01/01/2024").is_none());
    }
}
