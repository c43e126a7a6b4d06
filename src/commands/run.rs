//! Run command implementation
//!
//! Replays a bar stream from CSV through the decision engine and logs every
//! emitted signal. Session boundaries are derived from calendar-date changes,
//! standing in for the external session-calendar collaborator.

use anyhow::Result;
use intraday_direction::{data, Config, DirectionEngine, SignalKind};
use tracing::{debug, info};

pub fn run(data_path: String, config_path: Option<String>) -> Result<()> {
    info!("Starting replay");

    let config = match config_path {
        Some(path) => {
            let config = Config::from_file(&path)?;
            info!("Loaded configuration from: {}", path);
            config
        }
        None => {
            info!("Using default configuration");
            Config::default()
        }
    };
    debug!(?config, "Effective configuration");

    let bars = data::load_csv(&data_path)?;
    data::validate_bars(&bars)?;
    let sessions = data::session_starts(&bars);
    let session_count = sessions.iter().filter(|&&s| s).count();
    info!("Validated {} bars across {} sessions", bars.len(), session_count);

    let mut engine = DirectionEngine::new(config);
    let mut entries = 0usize;
    let mut exits = 0usize;

    for (bar, &first_of_session) in bars.iter().zip(sessions.iter()) {
        if let Some(signal) = engine.process_bar(bar, first_of_session)? {
            match signal.kind {
                SignalKind::EnterLong | SignalKind::EnterShort => entries += 1,
                SignalKind::ExitLong | SignalKind::ExitShort => exits += 1,
            }
            info!(
                "{} {:?} @ {:.2} ({})",
                signal.timestamp, signal.kind, signal.price, signal.tag
            );
        }
    }

    info!(
        "Replay complete: {} bars, {} sessions, {} entries, {} exits, final position {:?}, direction {:?}",
        engine.bars_seen(),
        session_count,
        entries,
        exits,
        engine.position(),
        engine.direction()
    );

    for (hour, stat) in engine.hourly_stats().observed_hours() {
        debug!(
            "hour {:02}: mean change {:+.4}% over {} bars",
            hour, stat.mean_change, stat.count
        );
    }

    Ok(())
}
