//! Integration tests for the intraday-direction engine
//!
//! These tests drive full bar streams through the engine and verify the
//! end-to-end signal behavior.

use chrono::{TimeZone, Utc};

use intraday_direction::{
    Bar, Config, Direction, DirectionEngine, PositionState, SignalKind,
};

// =============================================================================
// Test Utilities
// =============================================================================

fn bar_at(day: u32, hour: u32, minute: u32, open: f64, high: f64, low: f64, close: f64) -> Bar {
    Bar::new_unchecked(
        Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap(),
        open,
        high,
        low,
        close,
    )
}

/// Strictly rising bars, one per minute from 09:00: every bar makes a higher
/// high, close near the top of the range. Satisfies EMA alignment, breakout
/// counting, and a high oscillator once warmed up.
fn uptrend_bar(i: u32) -> Bar {
    let base = 100.0 + i as f64;
    bar_at(4, 9 + i / 60, i % 60, base, base + 1.0, base - 1.0, base + 0.8)
}

/// Strictly falling bars: every bar makes a lower low, close near the bottom.
fn downtrend_bar(i: u32) -> Bar {
    let base = 200.0 - i as f64;
    bar_at(4, 9 + i / 60, i % 60, base, base + 1.0, base - 1.0, base - 0.8)
}

/// Zigzag uptrend: highs and lows rise every bar, closes alternate between a
/// strong up step (+2.5) and a small give-back (-0.5). Keeps the breakout
/// counters and EMA alignment alive while holding trend strength well below
/// 1.0 (roughly 0.65 with the default momentum window).
fn zigzag_bar(i: u32) -> Bar {
    let drift = 100.0 + i as f64;
    let zig = if i % 2 == 0 { 0.75 } else { -0.75 };
    bar_at(4, 9 + i / 60, i % 60, drift, drift + 2.0, drift - 2.0, drift + zig)
}

fn feed(engine: &mut DirectionEngine, bars: impl IntoIterator<Item = Bar>) -> Vec<(usize, SignalKind, String)> {
    let mut emitted = Vec::new();
    let mut first = engine.bars_seen() == 0;
    for bar in bars {
        let signal = engine
            .process_bar(&bar, first)
            .expect("bar stream should be accepted");
        first = false;
        if let Some(s) = signal {
            emitted.push((engine.bars_seen(), s.kind, s.tag));
        }
    }
    emitted
}

// =============================================================================
// Warm-up and Entry Scenarios
// =============================================================================

#[test]
fn test_no_signal_inside_warmup_gate() {
    let mut engine = DirectionEngine::new(Config::default());
    let emitted = feed(&mut engine, (0..30).map(uptrend_bar));

    assert!(emitted.is_empty(), "no signal may be emitted in the first 30 bars");
    assert_eq!(engine.position(), PositionState::Flat);
}

#[test]
fn test_uptrend_enters_long_exactly_once_at_bar_31() {
    let mut engine = DirectionEngine::new(Config::default());
    let emitted = feed(&mut engine, (0..31).map(uptrend_bar));

    assert_eq!(engine.direction(), Direction::Up);
    assert_eq!(emitted.len(), 1, "exactly one entry expected, got {:?}", emitted);
    let (bar_no, kind, _) = &emitted[0];
    assert_eq!(*bar_no, 31);
    assert_eq!(*kind, SignalKind::EnterLong);
    assert_eq!(engine.position(), PositionState::Long);
}

#[test]
fn test_downtrend_enters_short() {
    let mut engine = DirectionEngine::new(Config::default());
    let emitted = feed(&mut engine, (0..31).map(downtrend_bar));

    assert_eq!(engine.direction(), Direction::Down);
    assert_eq!(emitted.len(), 1);
    assert_eq!(emitted[0].1, SignalKind::EnterShort);
    assert_eq!(engine.position(), PositionState::Short);
}

#[test]
fn test_never_more_than_one_signal_per_bar_and_states_stay_consistent() {
    let mut engine = DirectionEngine::new(Config::default());
    let mut position = PositionState::Flat;

    for i in 0..120 {
        // Mixed stream: a long uptrend leg, a reversal leg, another up leg
        let bar = match i {
            0..=45 => uptrend_bar(i),
            46..=75 => {
                let base = 146.0 - (i - 45) as f64;
                bar_at(4, 9 + i / 60, i % 60, base, base + 1.0, base - 1.0, base - 0.8)
            }
            _ => {
                let base = 116.0 + (i - 75) as f64;
                bar_at(4, 9 + i / 60, i % 60, base, base + 1.0, base - 1.0, base + 0.8)
            }
        };

        let signal = engine.process_bar(&bar, i == 0).unwrap();

        if let Some(s) = signal {
            match s.kind {
                SignalKind::EnterLong => {
                    assert_eq!(position, PositionState::Flat, "entry requires a flat book");
                    position = PositionState::Long;
                }
                SignalKind::EnterShort => {
                    assert_eq!(position, PositionState::Flat, "entry requires a flat book");
                    position = PositionState::Short;
                }
                SignalKind::ExitLong => {
                    assert_eq!(position, PositionState::Long);
                    position = PositionState::Flat;
                }
                SignalKind::ExitShort => {
                    assert_eq!(position, PositionState::Short);
                    position = PositionState::Flat;
                }
            }
        }
        assert_eq!(engine.position(), position, "engine and observed position diverged");
    }
}

// =============================================================================
// Exit Scenarios
// =============================================================================

#[test]
fn test_reversal_exit_when_close_breaks_fast_ema() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..31).map(uptrend_bar));
    assert_eq!(engine.position(), PositionState::Long);

    // Sharp drop well below the fast EMA; classifier state is irrelevant
    let drop = bar_at(4, 9, 31, 130.0, 130.0, 108.0, 109.0);
    let signal = engine.process_bar(&drop, false).unwrap().unwrap();
    assert_eq!(signal.kind, SignalKind::ExitLong);
    assert_eq!(signal.tag, "Reversal Exit");
    assert_eq!(engine.position(), PositionState::Flat);
}

#[test]
fn test_forced_exit_near_session_close_without_reversal() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..31).map(uptrend_bar));
    assert_eq!(engine.position(), PositionState::Long);

    // Still trending up at 15:50 - only the session clock forces this exit
    let late = bar_at(4, 15, 50, 131.0, 132.5, 130.5, 132.3);
    let signal = engine.process_bar(&late, false).unwrap().unwrap();
    assert_eq!(signal.kind, SignalKind::ExitLong);
    assert_eq!(signal.tag, "Session Close");
    assert_eq!(engine.position(), PositionState::Flat);
}

#[test]
fn test_forced_exit_wins_over_reversal_condition() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..31).map(uptrend_bar));

    // 15:55 bar that also breaks below the fast EMA: both exit rules apply,
    // the session-close exit must win
    let late_drop = bar_at(4, 15, 55, 130.0, 130.0, 108.0, 109.0);
    let signal = engine.process_bar(&late_drop, false).unwrap().unwrap();
    assert_eq!(signal.tag, "Session Close");
    assert_eq!(engine.position(), PositionState::Flat);
}

#[test]
fn test_configurable_session_close_time() {
    let config = Config {
        session_close: chrono::NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
        ..Default::default()
    };
    let mut engine = DirectionEngine::new(config);
    feed(&mut engine, (0..31).map(uptrend_bar));
    assert_eq!(engine.position(), PositionState::Long);

    // 10:50 with an 11:00 close is inside the force-exit band
    let late = bar_at(4, 10, 50, 131.0, 132.5, 130.5, 132.3);
    let signal = engine.process_bar(&late, false).unwrap().unwrap();
    assert_eq!(signal.tag, "Session Close");
}

// =============================================================================
// Session Reset
// =============================================================================

#[test]
fn test_classifier_resets_at_session_start_regardless_of_prior_state() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..31).map(uptrend_bar));
    assert_eq!(engine.direction(), Direction::Up);

    // Next trading day opens: direction state must be Neutral again
    let next_day = bar_at(5, 9, 0, 131.0, 132.0, 130.0, 131.8);
    engine.process_bar(&next_day, true).unwrap();
    assert_eq!(engine.direction(), Direction::Neutral);
}

#[test]
fn test_swing_windows_reset_at_session_start() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..31).map(uptrend_bar));
    // Exit the open position so re-entry is observable
    let drop = bar_at(4, 9, 31, 130.0, 130.0, 108.0, 109.0);
    engine.process_bar(&drop, false).unwrap();

    // New session: breakout counters start from scratch, so even with
    // immediately rising bars the classifier needs two fresh higher highs
    // (plus two prior window entries) before any new direction can confirm
    let mut reentered_at = None;
    for i in 0..6 {
        let base = 109.0 + i as f64;
        let bar = bar_at(5, 9, i, base, base + 1.0, base - 1.0, base + 0.8);
        if let Some(s) = engine.process_bar(&bar, i == 0).unwrap() {
            reentered_at = Some((i, s.kind));
            break;
        }
    }
    if let Some((i, _)) = reentered_at {
        // Two fresh higher highs on top of two seed entries: bar index 3 at
        // the earliest
        assert!(i >= 3, "re-entry fired with too little swing history: bar {}", i);
    }
}

// =============================================================================
// Strength Gate (opt-in)
// =============================================================================

#[test]
fn test_strength_gate_disabled_matches_source_behavior() {
    let mut engine = DirectionEngine::new(Config::default());
    let emitted = feed(&mut engine, (0..40).map(zigzag_bar));

    assert!(
        emitted.iter().any(|(_, k, _)| *k == SignalKind::EnterLong),
        "zigzag uptrend should enter long with the gate disabled"
    );
}

#[test]
fn test_strength_gate_enabled_blocks_weak_trend() {
    let config = Config {
        use_min_strength: true,
        min_strength: 1.0,
        ..Default::default()
    };
    let mut engine = DirectionEngine::new(config);
    let emitted = feed(&mut engine, (0..40).map(zigzag_bar));

    assert!(
        emitted.is_empty(),
        "strength ~0.65 must not clear a 1.0 minimum, got {:?}",
        emitted
    );
    assert_eq!(engine.position(), PositionState::Flat);
}

// =============================================================================
// Persistence / Idempotence
// =============================================================================

#[test]
fn test_snapshot_resume_replays_bar_identically() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..30).map(uptrend_bar));

    let snapshot = serde_json::to_string(&engine).unwrap();
    let decisive_bar = uptrend_bar(30);

    let live = engine.process_bar(&decisive_bar, false).unwrap();
    assert!(live.as_ref().is_some_and(|s| s.kind == SignalKind::EnterLong));

    let mut resumed: DirectionEngine = serde_json::from_str(&snapshot).unwrap();
    let replayed = resumed.process_bar(&decisive_bar, false).unwrap();

    assert_eq!(live, replayed, "resumed engine must emit the same single signal");
    assert_eq!(engine.position(), resumed.position());
    assert_eq!(engine.bars_seen(), resumed.bars_seen());
}

// =============================================================================
// Ingestion Boundary
// =============================================================================

#[test]
fn test_stale_timestamp_fails_fast() {
    let mut engine = DirectionEngine::new(Config::default());
    engine.process_bar(&uptrend_bar(3), true).unwrap();
    assert!(engine.process_bar(&uptrend_bar(3), false).is_err());
    assert!(engine.process_bar(&uptrend_bar(1), false).is_err());
    // A genuinely newer bar is accepted again
    assert!(engine.process_bar(&uptrend_bar(4), false).is_ok());
}

#[test]
fn test_malformed_bar_fails_fast() {
    let mut engine = DirectionEngine::new(Config::default());
    let bad = bar_at(4, 9, 0, 100.0, 99.0, 101.0, 100.0); // high < low
    assert!(engine.process_bar(&bad, true).is_err());
}

// =============================================================================
// Diagnostics
// =============================================================================

#[test]
fn test_hourly_stats_are_observational_only() {
    let mut engine = DirectionEngine::new(Config::default());
    feed(&mut engine, (0..90).map(uptrend_bar));

    let stats = engine.hourly_stats();
    // The warm-up span is excluded: bars 31-60 land in the 09:00 slot,
    // bars 61-90 in 10:00
    assert_eq!(stats.get(9).count, 30);
    assert_eq!(stats.get(10).count, 30);
    assert!(stats.get(9).mean_change > 0.0);
}
