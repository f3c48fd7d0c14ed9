use std::{
    path::{Path, PathBuf},
    sync::{mpsc, Arc, Mutex},
    thread::{self, JoinHandle},
};

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::{error, info};
use rusqlite::{params, Connection};
use tokio::sync::oneshot;

use super::{migrations::run_migrations, SessionStore};
use crate::{
    error::StoreError,
    models::{SessionType, StudyRecord},
};

type DbTask = Box<dyn FnOnce(&mut Connection) + Send + 'static>;

enum DbCommand {
    Execute(DbTask),
    Shutdown,
}

struct StoreInner {
    sender: mpsc::Sender<DbCommand>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for StoreInner {
    fn drop(&mut self) {
        let mut guard = match self.worker.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(handle) = guard.take() {
            if let Err(err) = self.sender.send(DbCommand::Shutdown) {
                error!("Failed to send shutdown to DB thread: {err}");
            }
            if let Err(join_err) = handle.join() {
                error!("Failed to join DB thread: {join_err:?}");
            }
        }
    }
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|err| anyhow!("invalid datetime '{value}': {err}"))
}

fn session_type_from_str(value: &str) -> Result<SessionType> {
    match value {
        "pomodoro" => Ok(SessionType::Pomodoro),
        "shortBreak" => Ok(SessionType::ShortBreak),
        "longBreak" => Ok(SessionType::LongBreak),
        _ => Err(anyhow!("unknown session type '{value}'")),
    }
}

/// SQLite-backed session store. A dedicated worker thread owns the
/// connection; async callers hand it closures over an mpsc channel and
/// await the reply on a oneshot.
#[derive(Clone)]
pub struct SqliteStore {
    inner: Arc<StoreInner>,
    db_path: Arc<PathBuf>,
}

impl SqliteStore {
    pub fn new(db_path: PathBuf) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create database directory {}", parent.display())
            })?;
        }

        let (command_tx, command_rx) = mpsc::channel::<DbCommand>();
        let (ready_tx, ready_rx) = mpsc::channel();
        let path_for_thread = db_path.clone();

        let worker = thread::Builder::new()
            .name("studycycle-db".into())
            .spawn(move || {
                let mut conn = match Connection::open(&path_for_thread) {
                    Ok(connection) => connection,
                    Err(err) => {
                        let _ = ready_tx.send(Err(anyhow::Error::new(err)
                            .context("failed to open SQLite database")));
                        return;
                    }
                };

                if let Err(err) = conn.pragma_update(None, "journal_mode", "WAL") {
                    error!("Failed to enable WAL mode: {err}");
                }
                if let Err(err) = conn.pragma_update(None, "foreign_keys", "ON") {
                    error!("Failed to enable foreign keys: {err}");
                }

                let init_result =
                    run_migrations(&mut conn).context("failed to run database migrations");
                if ready_tx.send(init_result).is_err() {
                    error!("DB initialization receiver dropped before ready signal");
                    return;
                }

                while let Ok(command) = command_rx.recv() {
                    match command {
                        DbCommand::Execute(task) => {
                            task(&mut conn);
                        }
                        DbCommand::Shutdown => break,
                    }
                }

                info!("Database thread shutting down");
            })
            .with_context(|| "failed to spawn database worker thread")?;

        ready_rx
            .recv()
            .context("database worker exited before signaling readiness")??;

        info!("Session store initialized at {}", db_path.display());

        Ok(Self {
            inner: Arc::new(StoreInner {
                sender: command_tx,
                worker: Mutex::new(Some(worker)),
            }),
            db_path: Arc::new(db_path),
        })
    }

    pub fn path(&self) -> &Path {
        self.db_path.as_path()
    }

    async fn execute<F, T>(&self, task: F) -> Result<T>
    where
        F: FnOnce(&mut Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let sender = self.inner.sender.clone();
        let (reply_tx, reply_rx) = oneshot::channel();

        let command = DbCommand::Execute(Box::new(move |conn| {
            let result = task(conn);
            if reply_tx.send(result).is_err() {
                error!("DB caller dropped before receiving result");
            }
        }));

        sender
            .send(command)
            .map_err(|err| anyhow!("failed to send command to DB thread: {err}"))?;

        reply_rx
            .await
            .map_err(|_| anyhow!("database thread terminated unexpectedly"))?
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn append(&self, record: &StudyRecord) -> Result<(), StoreError> {
        if record.duration_minutes.is_nan() || record.duration_minutes < 0.0 {
            return Err(StoreError::Persistence(anyhow!(
                "record {} has invalid duration {}",
                record.id,
                record.duration_minutes
            )));
        }

        let record = record.clone();
        self.execute(move |conn| {
            conn.execute(
                // Retries of an at-least-once append reuse the record id.
                "INSERT OR REPLACE INTO study_records (id, user_id, subject, duration_minutes, session_type, timestamp)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    record.id,
                    record.user_id,
                    record.subject,
                    record.duration_minutes,
                    record.session_type.as_str(),
                    record.timestamp.to_rfc3339(),
                ],
            )
            .with_context(|| "failed to insert study record")?;
            Ok(())
        })
        .await
        .map_err(StoreError::from)
    }

    async fn query(&self, user_id: &str) -> Result<Vec<StudyRecord>, StoreError> {
        let user_id = user_id.to_string();
        self.execute(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT id, user_id, subject, duration_minutes, session_type, timestamp
                 FROM study_records
                 WHERE user_id = ?1",
            )?;

            let mut rows = stmt.query(params![user_id])?;
            let mut records = Vec::new();
            while let Some(row) = rows.next()? {
                records.push(StudyRecord {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    subject: row.get(2)?,
                    duration_minutes: row.get(3)?,
                    session_type: session_type_from_str(&row.get::<_, String>(4)?)?,
                    timestamp: parse_datetime(&row.get::<_, String>(5)?)?,
                });
            }

            Ok(records)
        })
        .await
        .map_err(StoreError::from)
    }
}
