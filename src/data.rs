//! Bar loading and stream validation
//!
//! Loads OHLC bars from CSV files and enforces the ingestion-boundary
//! contract: well-formed prices and strictly increasing timestamps.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::Path;
use tracing::info;

use crate::types::Bar;

/// Load bars from a CSV file with `datetime,open,high,low,close` columns
pub fn load_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let mut reader = csv::Reader::from_path(path.as_ref()).context("Failed to open CSV file")?;

    let mut bars = Vec::new();

    for (row_idx, result) in reader.records().enumerate() {
        let record = result.context(format!("Failed to read row {}", row_idx + 1))?;

        let dt_str = record.get(0).context("Missing datetime column")?;
        let timestamp = dt_str
            .parse::<DateTime<Utc>>()
            .or_else(|_| {
                // Try parsing without timezone and assume UTC
                chrono::NaiveDateTime::parse_from_str(dt_str, "%Y-%m-%d %H:%M:%S")
                    .map(|ndt| DateTime::<Utc>::from_naive_utc_and_offset(ndt, Utc))
            })
            .context(format!("Failed to parse datetime: {}", dt_str))?;

        let open: f64 = record
            .get(1)
            .context("Missing open column")?
            .parse()
            .context("Failed to parse open")?;
        let high: f64 = record
            .get(2)
            .context("Missing high column")?
            .parse()
            .context("Failed to parse high")?;
        let low: f64 = record
            .get(3)
            .context("Missing low column")?
            .parse()
            .context("Failed to parse low")?;
        let close: f64 = record
            .get(4)
            .context("Missing close column")?
            .parse()
            .context("Failed to parse close")?;

        bars.push(Bar::new_unchecked(timestamp, open, high, low, close));
    }

    info!("Loaded {} bars from {}", bars.len(), path.as_ref().display());
    Ok(bars)
}

/// Validate a bar stream before it reaches the engine: every bar well-formed,
/// timestamps strictly increasing. Fails fast with the offending row.
pub fn validate_bars(bars: &[Bar]) -> Result<()> {
    for (i, bar) in bars.iter().enumerate() {
        bar.validate()
            .with_context(|| format!("Bar {} at {}", i + 1, bar.timestamp))?;

        if i > 0 && bar.timestamp <= bars[i - 1].timestamp {
            anyhow::bail!(
                "Bar {}: timestamp {} does not advance past {}",
                i + 1,
                bar.timestamp,
                bars[i - 1].timestamp
            );
        }
    }
    Ok(())
}

/// Session boundary flags for a replayed stream: a new session starts on
/// every calendar-date change. Stands in for the external session-calendar
/// collaborator when replaying files.
pub fn session_starts(bars: &[Bar]) -> Vec<bool> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| i == 0 || bar.timestamp.date_naive() != bars[i - 1].timestamp.date_naive())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn bar(day: u32, hour: u32, minute: u32) -> Bar {
        Bar::new_unchecked(
            Utc.with_ymd_and_hms(2024, 3, day, hour, minute, 0).unwrap(),
            100.0,
            101.0,
            99.0,
            100.5,
        )
    }

    #[test]
    fn test_validate_accepts_increasing_stream() {
        let bars = vec![bar(4, 9, 0), bar(4, 9, 1), bar(4, 9, 2)];
        assert!(validate_bars(&bars).is_ok());
    }

    #[test]
    fn test_validate_rejects_duplicate_timestamp() {
        let bars = vec![bar(4, 9, 0), bar(4, 9, 0)];
        assert!(validate_bars(&bars).is_err());
    }

    #[test]
    fn test_validate_rejects_nan_price() {
        let mut bad = bar(4, 9, 0);
        bad.close = f64::NAN;
        assert!(validate_bars(&[bad]).is_err());
    }

    #[test]
    fn test_session_starts_on_date_change() {
        let bars = vec![bar(4, 9, 0), bar(4, 9, 1), bar(5, 9, 0), bar(5, 9, 1)];
        assert_eq!(session_starts(&bars), vec![true, false, true, false]);
    }
}
