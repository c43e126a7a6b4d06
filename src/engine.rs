//! Per-bar decision engine
//!
//! Owns the full pipeline state for one instrument: moving-average stack,
//! swing tracker, momentum estimator, direction classifier, and the single
//! position. Each bar flows strictly forward through those stages and may
//! emit at most one signal.
//!
//! The engine performs no I/O. Session boundaries and the bar stream come
//! from the caller; emitted signals go to an external execution collaborator.

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::classifier::DirectionClassifier;
use crate::config::Config;
use crate::indicators::{MaSnapshot, MaStack};
use crate::momentum::{percent_change, MomentumEstimator};
use crate::stats::HourlyStats;
use crate::swing::SwingTracker;
use crate::types::{Bar, BarValidationError, Direction, PositionState, Signal, SignalKind};
use crate::TrendMetrics;

/// Oscillator floor for long entries
const LONG_OSCILLATOR_MIN: f64 = 45.0;
/// Oscillator ceiling for short entries
const SHORT_OSCILLATOR_MAX: f64 = 55.0;

/// Errors raised at the ingestion boundary
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("bar validation failed: {0}")]
    InvalidBar(#[from] BarValidationError),

    #[error("non-monotonic timestamp: {next} does not advance past {prev}")]
    NonMonotonicTimestamp {
        prev: DateTime<Utc>,
        next: DateTime<Utc>,
    },
}

/// Stateful single-instrument decision engine.
///
/// The whole struct is serde-serializable so a host can snapshot it between
/// bars and resume later: replaying a bar from a restored snapshot yields the
/// same signal as processing it once.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionEngine {
    config: Config,
    ma_stack: MaStack,
    swing: SwingTracker,
    momentum: MomentumEstimator,
    classifier: DirectionClassifier,
    position: PositionState,
    bars_seen: usize,
    prev_close: Option<f64>,
    last_timestamp: Option<DateTime<Utc>>,
    last_metrics: Option<TrendMetrics>,
    hourly: HourlyStats,
}

impl DirectionEngine {
    /// Build an engine from validated configuration
    pub fn new(config: Config) -> Self {
        let ma_stack = MaStack::new(config.rsi_period, config.rsi_smooth);
        let momentum = MomentumEstimator::new(config.momentum_period);
        Self {
            config,
            ma_stack,
            swing: SwingTracker::new(),
            momentum,
            classifier: DirectionClassifier::new(),
            position: PositionState::Flat,
            bars_seen: 0,
            prev_close: None,
            last_timestamp: None,
            last_metrics: None,
            hourly: HourlyStats::new(),
        }
    }

    /// Process one bar, returning the signal to act on, if any.
    ///
    /// `first_bar_of_session` is supplied by the feed/session-calendar
    /// collaborator; session-scoped state resets exactly once when it is set.
    /// No signal is emitted until more than `warmup_bars` bars have been
    /// observed since stream start (session resets do not restart the count).
    pub fn process_bar(
        &mut self,
        bar: &Bar,
        first_bar_of_session: bool,
    ) -> Result<Option<Signal>, EngineError> {
        bar.validate()?;
        if let Some(prev) = self.last_timestamp {
            if bar.timestamp <= prev {
                return Err(EngineError::NonMonotonicTimestamp {
                    prev,
                    next: bar.timestamp,
                });
            }
        }
        self.last_timestamp = Some(bar.timestamp);
        self.bars_seen += 1;

        if first_bar_of_session {
            self.classifier.reset();
            self.swing.reset();
            self.momentum.reset();
            self.last_metrics = None;
        }

        // Stage 1: indicators and swing windows advance on every bar
        let snapshot = self.ma_stack.update(bar.close);
        let breakout = self.swing.update(bar.high, bar.low);

        // Stage 2: direction classification
        let up_trend = snapshot.up_trend(bar.close);
        let down_trend = snapshot.down_trend(bar.close);
        self.classifier.update(breakout, up_trend, down_trend);

        // Stage 3: trend strength; needs a previous close for the percent change
        if let Some(prev_close) = self.prev_close.replace(bar.close) {
            let change = percent_change(prev_close, bar.close);
            self.last_metrics = Some(self.momentum.update(change));
            // Hour-of-day diagnostics only accrue once the stream is actionable
            if self.bars_seen > self.config.warmup_bars {
                self.hourly.record(bar.timestamp.hour(), change);
            }
        }

        // Stage 4: signal decision, gated behind the warm-up count
        if self.bars_seen <= self.config.warmup_bars {
            return Ok(None);
        }

        let signal = match self.position {
            PositionState::Flat => self.try_enter(bar, &snapshot, up_trend, down_trend),
            PositionState::Long | PositionState::Short => self.try_exit(bar, &snapshot),
        };

        if let Some(ref s) = signal {
            debug!(kind = ?s.kind, tag = %s.tag, price = s.price, "signal emitted");
        }
        Ok(signal)
    }

    fn try_enter(
        &mut self,
        bar: &Bar,
        snapshot: &MaSnapshot,
        up_trend: bool,
        down_trend: bool,
    ) -> Option<Signal> {
        let oscillator = snapshot.oscillator?;

        // Long takes priority by evaluation order; the alignment conditions
        // make the two branches mutually exclusive anyway
        if self.classifier.direction() == Direction::Up
            && up_trend
            && self.classifier.higher_highs() >= 2
            && oscillator > LONG_OSCILLATOR_MIN
            && self.strength_gate_open()
        {
            self.position = PositionState::Long;
            return Some(Signal::new(SignalKind::EnterLong, bar, "Trend Entry"));
        }

        if self.classifier.direction() == Direction::Down
            && down_trend
            && self.classifier.lower_lows() >= 2
            && oscillator < SHORT_OSCILLATOR_MAX
            && self.strength_gate_open()
        {
            self.position = PositionState::Short;
            return Some(Signal::new(SignalKind::EnterShort, bar, "Trend Entry"));
        }

        None
    }

    fn try_exit(&mut self, bar: &Bar, snapshot: &MaSnapshot) -> Option<Signal> {
        let exit_kind = match self.position {
            PositionState::Long => SignalKind::ExitLong,
            PositionState::Short => SignalKind::ExitShort,
            PositionState::Flat => return None,
        };

        // Forced session-close exit wins over any reversal condition
        if self.minutes_to_close(bar.timestamp) <= self.config.force_exit_minutes {
            self.position = PositionState::Flat;
            return Some(Signal::new(exit_kind, bar, "Session Close"));
        }

        let reversal = match (self.position, snapshot.fast, snapshot.medium) {
            (PositionState::Long, Some(fast), Some(medium)) => {
                bar.close < fast || fast < medium
            }
            (PositionState::Short, Some(fast), Some(medium)) => {
                bar.close > fast || fast > medium
            }
            _ => false,
        };

        if reversal {
            self.position = PositionState::Flat;
            return Some(Signal::new(exit_kind, bar, "Reversal Exit"));
        }

        None
    }

    /// Opt-in strength gate. Disabled: always open. Enabled: requires an
    /// actionable strength at or above the configured minimum; zero-volatility
    /// bars (strength `None`) keep it closed.
    fn strength_gate_open(&self) -> bool {
        if !self.config.use_min_strength {
            return true;
        }
        self.last_metrics
            .and_then(|m| m.strength)
            .map_or(false, |s| s >= self.config.min_strength)
    }

    /// Minutes from the bar's timestamp to the configured close time on the
    /// same calendar day. Negative once the close has passed.
    fn minutes_to_close(&self, timestamp: DateTime<Utc>) -> i64 {
        let close = timestamp
            .date_naive()
            .and_time(self.config.session_close);
        (close - timestamp.naive_utc()).num_minutes()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn position(&self) -> PositionState {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.classifier.direction()
    }

    pub fn bars_seen(&self) -> usize {
        self.bars_seen
    }

    /// Trend metrics from the most recent bar with a computable percent change
    pub fn trend_metrics(&self) -> Option<TrendMetrics> {
        self.last_metrics
    }

    /// Diagnostic hour-of-day aggregate; no influence on signals
    pub fn hourly_stats(&self) -> &HourlyStats {
        &self.hourly
    }
}
