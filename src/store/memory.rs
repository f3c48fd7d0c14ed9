use std::sync::{
    atomic::{AtomicBool, Ordering},
    RwLock,
};

use anyhow::anyhow;
use async_trait::async_trait;

use super::SessionStore;
use crate::{error::StoreError, models::StudyRecord};

/// In-process session store for tests and embedding without a database.
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<Vec<StudyRecord>>,
    fail_appends: AtomicBool,
    fail_queries: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent `append` fail, to exercise fire-and-forget
    /// persistence paths.
    pub fn set_fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Make every subsequent `query` fail, to exercise "stats unavailable"
    /// paths in consumers.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    pub fn records(&self) -> Vec<StudyRecord> {
        self.records.read().unwrap().clone()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn append(&self, record: &StudyRecord) -> Result<(), StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence(anyhow!(
                "append failure injected for record {}",
                record.id
            )));
        }
        if record.duration_minutes.is_nan() || record.duration_minutes < 0.0 {
            return Err(StoreError::Persistence(anyhow!(
                "record {} has invalid duration {}",
                record.id,
                record.duration_minutes
            )));
        }

        self.records.write().unwrap().push(record.clone());
        Ok(())
    }

    async fn query(&self, user_id: &str) -> Result<Vec<StudyRecord>, StoreError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(StoreError::Persistence(anyhow!(
                "query failure injected for user {user_id}"
            )));
        }

        let records = self
            .records
            .read()
            .unwrap()
            .iter()
            .filter(|record| record.user_id == user_id)
            .cloned()
            .collect();
        Ok(records)
    }
}
