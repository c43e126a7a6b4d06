//! Direction classifier state machine
//!
//! Accumulating, non-oscillating per-bar classifier: once a direction is
//! confirmed it persists until a fresh confirmed opposite signal or the
//! session ends.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::swing::Breakout;
use crate::Direction;

/// Consecutive breakouts required before EMA alignment confirms a direction
const CONFIRMATION_COUNT: u32 = 2;

/// Session-scoped direction state.
///
/// At most one of the two counters is nonzero: a higher high zeroes the
/// lower-low run and vice versa. Neither counter decays on quiet bars.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DirectionClassifier {
    direction: Direction,
    higher_highs: u32,
    lower_lows: u32,
}

impl DirectionClassifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one bar's breakout flags and EMA alignment, returning the
    /// direction in force after this bar.
    pub fn update(&mut self, breakout: Breakout, up_trend: bool, down_trend: bool) -> Direction {
        if breakout.higher_high {
            self.higher_highs += 1;
            self.lower_lows = 0;
        } else if breakout.lower_low {
            self.lower_lows += 1;
            self.higher_highs = 0;
        }

        let previous = self.direction;
        if up_trend && self.higher_highs >= CONFIRMATION_COUNT {
            self.direction = Direction::Up;
        } else if down_trend && self.lower_lows >= CONFIRMATION_COUNT {
            self.direction = Direction::Down;
        }

        if self.direction != previous {
            debug!(
                from = ?previous,
                to = ?self.direction,
                higher_highs = self.higher_highs,
                lower_lows = self.lower_lows,
                "direction changed"
            );
        }

        self.direction
    }

    /// Back to (Neutral, 0, 0) at the session boundary
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn higher_highs(&self) -> u32 {
        self.higher_highs
    }

    pub fn lower_lows(&self) -> u32 {
        self.lower_lows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HH: Breakout = Breakout {
        higher_high: true,
        lower_low: false,
    };
    const LL: Breakout = Breakout {
        higher_high: false,
        lower_low: true,
    };
    const NONE: Breakout = Breakout {
        higher_high: false,
        lower_low: false,
    };

    #[test]
    fn test_two_confirmed_higher_highs_flip_up() {
        let mut c = DirectionClassifier::new();
        assert_eq!(c.update(HH, true, false), Direction::Neutral);
        assert_eq!(c.update(HH, true, false), Direction::Up);
    }

    #[test]
    fn test_alignment_required_for_flip() {
        let mut c = DirectionClassifier::new();
        c.update(HH, false, false);
        c.update(HH, false, false);
        assert_eq!(c.direction(), Direction::Neutral);
        assert_eq!(c.higher_highs(), 2);
    }

    #[test]
    fn test_counters_mutually_exclusive() {
        let mut c = DirectionClassifier::new();
        c.update(HH, false, false);
        c.update(HH, false, false);
        c.update(LL, false, false);
        assert_eq!(c.higher_highs(), 0);
        assert_eq!(c.lower_lows(), 1);
    }

    #[test]
    fn test_quiet_bars_do_not_decay_counters() {
        let mut c = DirectionClassifier::new();
        c.update(HH, false, false);
        c.update(NONE, false, false);
        c.update(NONE, false, false);
        assert_eq!(c.higher_highs(), 1);
    }

    #[test]
    fn test_direction_is_sticky() {
        let mut c = DirectionClassifier::new();
        c.update(HH, true, false);
        c.update(HH, true, false);
        assert_eq!(c.direction(), Direction::Up);
        // Alignment lost, no contradicting confirmation: direction holds
        c.update(NONE, false, false);
        assert_eq!(c.direction(), Direction::Up);
        // One lower low alone is not a confirmed reversal
        c.update(LL, false, true);
        assert_eq!(c.direction(), Direction::Up);
        // Second confirmed lower low with bearish alignment flips it
        c.update(LL, false, true);
        assert_eq!(c.direction(), Direction::Down);
    }

    #[test]
    fn test_reset_clears_direction_and_counters() {
        let mut c = DirectionClassifier::new();
        c.update(HH, true, false);
        c.update(HH, true, false);
        c.reset();
        assert_eq!(c.direction(), Direction::Neutral);
        assert_eq!(c.higher_highs(), 0);
        assert_eq!(c.lower_lows(), 0);
    }
}
