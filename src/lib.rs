pub mod config;
pub mod error;
pub mod models;
pub mod progress;
pub mod store;
pub mod timer;

pub use config::TimerConfig;
pub use error::{StoreError, TimerError};
pub use models::{ProgressStats, SessionType, StudyRecord};
pub use progress::{compute_stats, ProgressService};
pub use store::{MemoryStore, SessionStore, SqliteStore};
pub use timer::{TimerController, TimerEvent, TimerPhase, TimerState};
