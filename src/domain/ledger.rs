//! Fixed-fraction equity ledger.

use crate::domain::exit::TradeOutcome;

#[derive(Debug, Clone, PartialEq)]
pub struct EquityLedger {
    balance: f64,
    risk_fraction: f64,
    curve: Vec<f64>,
}

impl EquityLedger {
    /// Starts a curve at `initial_balance`. `risk_fraction` is expected to be
    /// validated upstream to lie in (0, 1).
    pub fn new(initial_balance: f64, risk_fraction: f64) -> Self {
        EquityLedger {
            balance: initial_balance,
            risk_fraction,
            curve: vec![initial_balance],
        }
    }

    /// Scale the balance by `1 ± risk_fraction` and record it.
    pub fn apply(&mut self, outcome: TradeOutcome) -> f64 {
        let delta = self.balance * self.risk_fraction;
        match outcome {
            TradeOutcome::Win => self.balance += delta,
            TradeOutcome::Loss => self.balance -= delta,
        }
        self.curve.push(self.balance);
        self.balance
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn curve(&self) -> &[f64] {
        &self.curve
    }

    pub fn trade_count(&self) -> usize {
        self.curve.len() - 1
    }

    pub fn into_curve(self) -> Vec<f64> {
        self.curve
    }
}
