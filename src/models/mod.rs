mod record;
mod stats;

pub use record::{SessionType, StudyRecord};
pub use stats::ProgressStats;
