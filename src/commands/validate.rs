//! Validate command implementation
//!
//! Ingestion-boundary checks only: well-formed bars and strictly increasing
//! timestamps, without running the engine.

use anyhow::Result;
use intraday_direction::data;
use tracing::info;

pub fn run(data_path: String) -> Result<()> {
    let bars = data::load_csv(&data_path)?;
    data::validate_bars(&bars)?;

    let sessions = data::session_starts(&bars);
    info!(
        "OK: {} bars, {} sessions, {} .. {}",
        bars.len(),
        sessions.iter().filter(|&&s| s).count(),
        bars.first().map(|b| b.timestamp.to_string()).unwrap_or_default(),
        bars.last().map(|b| b.timestamp.to_string()).unwrap_or_default(),
    );
    Ok(())
}
