use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Summary statistics over a user's full session history. Recomputed fresh
/// on every aggregation call; never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProgressStats {
    pub total_time_minutes: f64,
    pub subject_totals: HashMap<String, f64>,
    pub daily_average_minutes: f64,
    pub streak_days: u32,
}

impl Default for ProgressStats {
    fn default() -> Self {
        Self {
            total_time_minutes: 0.0,
            subject_totals: HashMap::new(),
            daily_average_minutes: 0.0,
            streak_days: 0,
        }
    }
}
