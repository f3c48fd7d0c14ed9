mod memory;
mod migrations;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use async_trait::async_trait;

use crate::{error::StoreError, models::StudyRecord};

/// Durable append-only record of completed sessions, keyed by user.
///
/// Appends are at-least-once; a duplicate record on retry is tolerated
/// because aggregation is sum-based with no dedup requirement. `query`
/// returns records in unspecified order; callers sort where order matters.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn append(&self, record: &StudyRecord) -> Result<(), StoreError>;
    async fn query(&self, user_id: &str) -> Result<Vec<StudyRecord>, StoreError>;
}
