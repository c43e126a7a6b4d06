//! Swing tracking: higher-high / lower-low breakout detection
//!
//! Keeps the last `TREND_BARS` highs and lows and flags when a new extreme
//! clears every value that stays in the window alongside it.

use serde::{Deserialize, Serialize};

use crate::window::RollingWindow;

/// Number of bars the swing windows span
pub const TREND_BARS: usize = 3;

/// Breakout flags for one bar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Breakout {
    pub higher_high: bool,
    pub lower_low: bool,
}

/// Rolling higher-high / lower-low detector.
///
/// The comparison runs against the window as it will stand once this bar is
/// recorded: the oldest entry, displaced when the window is full, is excluded,
/// and the new values themselves never take part. Flags only fire once at
/// least two entries remain to compare against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SwingTracker {
    highs: RollingWindow<f64>,
    lows: RollingWindow<f64>,
}

impl Default for SwingTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl SwingTracker {
    pub fn new() -> Self {
        Self {
            highs: RollingWindow::new(TREND_BARS),
            lows: RollingWindow::new(TREND_BARS),
        }
    }

    /// Compare the bar's extremes against the surviving history, then record
    /// them.
    pub fn update(&mut self, high: f64, low: f64) -> Breakout {
        let mut breakout = Breakout::default();

        // A full window is about to displace its oldest entry; that value
        // leaves with this bar and must not take part in the comparison.
        let displaced = usize::from(self.highs.is_full());

        if self.highs.len() - displaced >= 2 {
            let prior_max = self
                .highs
                .iter()
                .skip(displaced)
                .fold(f64::MIN, |a, &b| a.max(b));
            let prior_min = self
                .lows
                .iter()
                .skip(displaced)
                .fold(f64::MAX, |a, &b| a.min(b));
            breakout.higher_high = high > prior_max;
            breakout.lower_low = low < prior_min;
        }

        self.highs.push(high);
        self.lows.push(low);

        breakout
    }

    /// Drop all recorded swings (session boundary)
    pub fn reset(&mut self) {
        self.highs.clear();
        self.lows.clear();
    }
}
