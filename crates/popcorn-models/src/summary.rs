use serde::{Deserialize, Serialize};
use crate::watched::WatchedEntry;

/// Aggregate figures shown above the watched list
///
/// Every mean over zero values is 0, so an empty collection summarizes to all
/// zeros rather than NaN.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct WatchedSummary {
    pub count: usize,
    pub mean_imdb_rating: f64,
    pub mean_user_rating: f64,
    pub mean_runtime_minutes: f64,
}

impl WatchedSummary {
    pub fn from_entries(entries: &[WatchedEntry]) -> Self {
        Self {
            count: entries.len(),
            mean_imdb_rating: mean(entries.iter().filter_map(|e| e.imdb_rating)),
            mean_user_rating: mean(entries.iter().map(|e| f64::from(e.user_rating))),
            mean_runtime_minutes: mean(entries.iter().filter_map(|e| e.runtime_minutes.map(f64::from))),
        }
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, n) = values.fold((0.0, 0usize), |(sum, n), v| (sum + v, n + 1));
    if n == 0 {
        0.0
    } else {
        sum / n as f64
    }
}
