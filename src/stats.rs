//! Hour-of-day diagnostic aggregate
//!
//! Running mean of percent change per hour. Observability side-channel only;
//! nothing in the decision path reads it.

use serde::{Deserialize, Serialize};

/// Running mean and observation count for one hour-of-day slot
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct HourlyStat {
    pub mean_change: f64,
    pub count: u64,
}

/// Per-hour (0-23) percent-change averages across the whole stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HourlyStats {
    slots: [HourlyStat; 24],
}

impl Default for HourlyStats {
    fn default() -> Self {
        Self::new()
    }
}

impl HourlyStats {
    pub fn new() -> Self {
        Self {
            slots: [HourlyStat::default(); 24],
        }
    }

    /// Fold one percent change into the slot for `hour`.
    pub fn record(&mut self, hour: u32, percent_change: f64) {
        let slot = &mut self.slots[hour as usize % 24];
        let n = slot.count as f64;
        slot.mean_change = (slot.mean_change * n + percent_change) / (n + 1.0);
        slot.count += 1;
    }

    pub fn get(&self, hour: u32) -> HourlyStat {
        self.slots[hour as usize % 24]
    }

    /// Hours with at least one observation, busiest-first by count
    pub fn observed_hours(&self) -> Vec<(u32, HourlyStat)> {
        let mut hours: Vec<(u32, HourlyStat)> = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, s)| s.count > 0)
            .map(|(h, s)| (h as u32, *s))
            .collect();
        hours.sort_by(|a, b| b.1.count.cmp(&a.1.count));
        hours
    }
}
