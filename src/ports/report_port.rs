//! Report output port.

use crate::domain::backtest::BacktestResult;
use crate::domain::error::BandRevertError;

/// Port for persisting one instrument's backtest output.
pub trait ReportPort {
    fn write(&self, symbol: &str, result: &BacktestResult) -> Result<(), BandRevertError>;
}
