//! Run summary and performance statistics.

use super::backtest::{BacktestResult, TradeRecord};
use super::exit::TradeOutcome;
use super::signal::Direction;

#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub final_balance: f64,
    pub wins: usize,
    pub losses: usize,
    pub win_rate: f64,
}

impl Summary {
    pub fn new(final_balance: f64, wins: usize, losses: usize) -> Self {
        let total = wins + losses;
        let win_rate = if total > 0 {
            wins as f64 / total as f64
        } else {
            0.0
        };
        Summary {
            final_balance,
            wins,
            losses,
            win_rate,
        }
    }

    pub fn total_trades(&self) -> usize {
        self.wins + self.losses
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceStats {
    pub total_return: f64,
    pub max_drawdown: f64,
    pub max_consecutive_losses: usize,
    pub long_trades: usize,
    pub short_trades: usize,
}

impl PerformanceStats {
    pub fn compute(result: &BacktestResult) -> Self {
        let curve = &result.equity_curve;
        let initial = curve.first().copied().unwrap_or(0.0);
        let total_return = if initial > 0.0 {
            (result.summary.final_balance - initial) / initial
        } else {
            0.0
        };

        let long_trades = result
            .trades
            .iter()
            .filter(|t| t.direction == Direction::Long)
            .count();

        PerformanceStats {
            total_return,
            max_drawdown: compute_drawdown(curve),
            max_consecutive_losses: longest_losing_streak(&result.trades),
            long_trades,
            short_trades: result.trades.len() - long_trades,
        }
    }
}

/// Largest peak-to-trough decline as a fraction of the peak.
fn compute_drawdown(curve: &[f64]) -> f64 {
    let Some(&first) = curve.first() else {
        return 0.0;
    };

    let mut peak = first;
    let mut max_dd = 0.0_f64;

    for &equity in curve {
        if equity > peak {
            peak = equity;
        } else if peak > 0.0 {
            let dd = (peak - equity) / peak;
            if dd > max_dd {
                max_dd = dd;
            }
        }
    }

    max_dd
}

fn longest_losing_streak(trades: &[TradeRecord]) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for trade in trades {
        if trade.outcome == TradeOutcome::Loss {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}
