//! Price history source port.

use crate::domain::error::BandRevertError;
use crate::domain::ohlcv::OhlcvBar;

pub trait DataPort {
    /// Full available history for `symbol`, oldest first.
    fn fetch_bars(&self, symbol: &str) -> Result<Vec<OhlcvBar>, BandRevertError>;

    fn list_symbols(&self) -> Result<Vec<String>, BandRevertError>;
}
