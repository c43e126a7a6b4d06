//! Momentum/volatility estimation over bar-over-bar percent changes

use serde::{Deserialize, Serialize};

use crate::window::RollingWindow;
use crate::TrendMetrics;

/// Rolling estimator of trend strength: mean percent change (momentum) over
/// its population standard deviation (volatility).
///
/// A constant price run produces zero volatility; strength is then `None`
/// and must never gate an entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MomentumEstimator {
    changes: RollingWindow<f64>,
}

impl MomentumEstimator {
    pub fn new(period: usize) -> Self {
        Self {
            changes: RollingWindow::new(period),
        }
    }

    /// Record the bar's percent change and return the window statistics.
    pub fn update(&mut self, percent_change: f64) -> TrendMetrics {
        self.changes.push(percent_change);

        let n = self.changes.len() as f64;
        let momentum = self.changes.sum() / n;
        let variance = self
            .changes
            .iter()
            .map(|&x| {
                let diff = x - momentum;
                diff * diff
            })
            .sum::<f64>()
            / n;
        let volatility = variance.sqrt();

        let strength = if volatility > 0.0 {
            Some(momentum / volatility)
        } else {
            None
        };

        TrendMetrics {
            momentum,
            volatility,
            strength,
        }
    }

    /// Drop accumulated changes (session boundary)
    pub fn reset(&mut self) {
        self.changes.clear();
    }

    pub fn observations(&self) -> usize {
        self.changes.len()
    }
}

/// Percent change from the previous close: `(close - prev) / prev * 100`
pub fn percent_change(prev_close: f64, close: f64) -> f64 {
    (close - prev_close) / prev_close * 100.0
}
