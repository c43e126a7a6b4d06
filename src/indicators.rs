//! Streaming technical indicators powered by the `ta` crate
//!
//! Thin stateful wrappers around `ta`'s streaming indicators. Each wrapper
//! gates its output to `None` until a full period of observations has
//! arrived, and serializes the small amount of state needed to resume the
//! recurrence from a snapshot.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use ta::indicators::ExponentialMovingAverage;
use ta::Next;

use crate::window::RollingWindow;

/// Exponential moving average line with multiplier `2 / (period + 1)`.
/// Reports `None` until `period` observations have been seen.
#[derive(Debug, Clone)]
pub struct Ema {
    period: usize,
    inner: ExponentialMovingAverage,
    observed: usize,
    last: Option<f64>,
}

impl Ema {
    pub fn new(period: usize) -> Self {
        Self {
            period,
            inner: ExponentialMovingAverage::new(period).unwrap(),
            observed: 0,
            last: None,
        }
    }

    /// Advance with the next observation and return the current EMA, if warm.
    pub fn update(&mut self, observation: f64) -> Option<f64> {
        let value = self.inner.next(observation);
        self.observed += 1;
        self.last = Some(value);
        self.value()
    }

    pub fn value(&self) -> Option<f64> {
        if self.observed >= self.period {
            self.last
        } else {
            None
        }
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Current value regardless of the warm-up gate
    fn raw(&self) -> Option<f64> {
        self.last
    }
}

/// Portable EMA state. The recurrence depends only on the previous output,
/// so restoring feeds the stored value back through `Next` to reseed the
/// indicator exactly.
#[derive(Serialize, Deserialize)]
struct EmaState {
    period: usize,
    observed: usize,
    last: Option<f64>,
}

impl Serialize for Ema {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EmaState {
            period: self.period,
            observed: self.observed,
            last: self.last,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Ema {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let state = EmaState::deserialize(deserializer)?;
        if state.period == 0 {
            return Err(D::Error::custom("EMA period must be positive"));
        }
        let mut ema = Ema::new(state.period);
        ema.observed = state.observed;
        if let Some(last) = state.last {
            ema.inner.next(last);
            ema.last = Some(last);
        }
        Ok(ema)
    }
}

/// Bounded momentum oscillator: RSI from the gain/loss EMA pair `ta` builds
/// its `RelativeStrengthIndex` on, with an SMA pass over the last `smooth`
/// values (the "Avg" line entries and exits are gated on).
///
/// The pair is composed here rather than behind `RelativeStrengthIndex`
/// because that type keeps its smoothing state private; holding the EMAs
/// directly lets snapshots capture and reseed the recurrence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoothedRsi {
    period: usize,
    prev_close: Option<f64>,
    gain_ema: Ema,
    loss_ema: Ema,
    changes_seen: usize,
    smoothing: RollingWindow<f64>,
}

impl SmoothedRsi {
    pub fn new(period: usize, smooth: usize) -> Self {
        Self {
            period,
            prev_close: None,
            gain_ema: Ema::new(period),
            loss_ema: Ema::new(period),
            changes_seen: 0,
            smoothing: RollingWindow::new(smooth),
        }
    }

    /// Advance with the next close and return the smoothed oscillator value,
    /// bounded to [0, 100], once at least `period` changes have been seen.
    pub fn update(&mut self, close: f64) -> Option<f64> {
        let prev = match self.prev_close.replace(close) {
            Some(p) => p,
            None => return None,
        };

        let change = close - prev;
        self.changes_seen += 1;
        self.gain_ema.update(change.max(0.0));
        self.loss_ema.update((-change).max(0.0));

        if self.changes_seen < self.period {
            return None;
        }

        self.smoothing.push(self.rsi());
        self.smoothing.mean()
    }

    fn rsi(&self) -> f64 {
        match (self.gain_ema.raw(), self.loss_ema.raw()) {
            (Some(gain), Some(loss)) if gain + loss > 0.0 => 100.0 * gain / (gain + loss),
            // Perfectly flat stream
            _ => 50.0,
        }
    }

    pub fn value(&self) -> Option<f64> {
        if self.changes_seen < self.period {
            None
        } else {
            self.smoothing.mean()
        }
    }
}

/// Snapshot of the moving-average stack after a close update
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaSnapshot {
    pub fast: Option<f64>,
    pub medium: Option<f64>,
    pub slow: Option<f64>,
    pub oscillator: Option<f64>,
}

impl MaSnapshot {
    /// Bullish alignment: fast > medium > slow and close above the fast EMA
    pub fn up_trend(&self, close: f64) -> bool {
        match (self.fast, self.medium, self.slow) {
            (Some(fast), Some(medium), Some(slow)) => {
                fast > medium && medium > slow && close > fast
            }
            _ => false,
        }
    }

    /// Bearish alignment: fast < medium < slow and close below the fast EMA
    pub fn down_trend(&self, close: f64) -> bool {
        match (self.fast, self.medium, self.slow) {
            (Some(fast), Some(medium), Some(slow)) => {
                fast < medium && medium < slow && close < fast
            }
            _ => false,
        }
    }
}

/// Three-timeframe EMA stack plus the bounded oscillator, advanced once per
/// closing price. Indicator state spans sessions; only the session-scoped
/// windows reset at session start.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MaStack {
    fast: Ema,
    medium: Ema,
    slow: Ema,
    oscillator: SmoothedRsi,
}

/// Fast EMA period (ultra-short term)
pub const EMA_FAST_PERIOD: usize = 5;
/// Medium EMA period (short term)
pub const EMA_MEDIUM_PERIOD: usize = 13;
/// Slow EMA period (medium term)
pub const EMA_SLOW_PERIOD: usize = 30;

impl MaStack {
    pub fn new(rsi_period: usize, rsi_smooth: usize) -> Self {
        Self {
            fast: Ema::new(EMA_FAST_PERIOD),
            medium: Ema::new(EMA_MEDIUM_PERIOD),
            slow: Ema::new(EMA_SLOW_PERIOD),
            oscillator: SmoothedRsi::new(rsi_period, rsi_smooth),
        }
    }

    pub fn update(&mut self, close: f64) -> MaSnapshot {
        MaSnapshot {
            fast: self.fast.update(close),
            medium: self.medium.update(close),
            slow: self.slow.update(close),
            oscillator: self.oscillator.update(close),
        }
    }

    pub fn snapshot(&self) -> MaSnapshot {
        MaSnapshot {
            fast: self.fast.value(),
            medium: self.medium.value(),
            slow: self.slow.value(),
            oscillator: self.oscillator.value(),
        }
    }
}
