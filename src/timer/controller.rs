use std::{sync::Arc, time::Duration};

use chrono::Utc;
use log::{error, info};
use serde::Serialize;
use tokio::{
    sync::{broadcast, Mutex},
    task::JoinHandle,
    time,
};
use uuid::Uuid;

use crate::{
    config::TimerConfig,
    error::TimerError,
    models::StudyRecord,
    store::SessionStore,
    timer::state::{PhaseCompletion, TimerState},
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase", tag = "event")]
pub enum TimerEvent {
    StateChanged { state: TimerState },
    PhaseCompleted { record: StudyRecord },
}

/// Drives one user's timer cycle: owns the state machine, the 1 Hz ticker
/// task, and the hand-off of completed phases to the session store.
///
/// Mutating operations are serialized through the state mutex (single
/// writer); `snapshot()` gives observers a consistent copy. Persistence is
/// fire-and-forget: an append failure is logged and never holds up the
/// phase transition.
#[derive(Clone)]
pub struct TimerController {
    state: Arc<Mutex<TimerState>>,
    store: Arc<dyn SessionStore>,
    user_id: String,
    events: broadcast::Sender<TimerEvent>,
    ticker: Arc<Mutex<Option<JoinHandle<()>>>>,
    tick_interval: Duration,
}

impl TimerController {
    pub fn new(user_id: impl Into<String>, store: Arc<dyn SessionStore>) -> Self {
        Self::with_config(user_id, store, TimerConfig::default())
    }

    pub fn with_config(
        user_id: impl Into<String>,
        store: Arc<dyn SessionStore>,
        config: TimerConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            state: Arc::new(Mutex::new(TimerState::with_config(config))),
            store,
            user_id: user_id.into(),
            events,
            ticker: Arc::new(Mutex::new(None)),
            tick_interval: Duration::from_secs(1),
        }
    }

    /// Override the one-second tick cadence. Intended for tests that want a
    /// full cycle to finish quickly.
    pub fn set_tick_interval(&mut self, interval: Duration) {
        self.tick_interval = interval;
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TimerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> TimerState {
        self.state.lock().await.clone()
    }

    /// Start a focus phase for `subject` and spin up the ticker.
    pub async fn begin(&self, subject: &str) -> Result<TimerState, TimerError> {
        {
            let mut guard = self.state.lock().await;
            guard.begin(subject)?;
        }
        self.spawn_ticker().await;
        Ok(self.emit_state_changed().await)
    }

    /// Resume the countdown in any phase (the only way to start a break).
    pub async fn resume(&self) -> Result<TimerState, TimerError> {
        {
            let mut guard = self.state.lock().await;
            guard.resume()?;
        }
        self.spawn_ticker().await;
        Ok(self.emit_state_changed().await)
    }

    /// Stop the ticker, preserving the countdown. Equivalent to the driver
    /// going away.
    pub async fn pause(&self) -> TimerState {
        {
            let mut guard = self.state.lock().await;
            guard.pause();
        }
        self.cancel_ticker().await;
        self.emit_state_changed().await
    }

    /// Stop the ticker and refill the current phase's countdown.
    pub async fn reset(&self) -> TimerState {
        {
            let mut guard = self.state.lock().await;
            guard.reset();
        }
        self.cancel_ticker().await;
        self.emit_state_changed().await
    }

    async fn spawn_ticker(&self) {
        let mut ticker_guard = self.ticker.lock().await;
        if let Some(handle) = ticker_guard.take() {
            handle.abort();
        }

        let state = self.state.clone();
        let store = self.store.clone();
        let user_id = self.user_id.clone();
        let events = self.events.clone();
        let tick_interval = self.tick_interval;

        let handle = tokio::spawn(async move {
            let mut interval = time::interval(tick_interval);
            // The first interval tick completes immediately; skip it so a
            // full interval elapses before the first decrement.
            interval.tick().await;

            loop {
                interval.tick().await;

                let (completion, snapshot) = {
                    let mut guard = state.lock().await;
                    if !guard.running {
                        break;
                    }
                    match guard.tick() {
                        Ok(completion) => (completion, guard.clone()),
                        Err(err) => {
                            error!("Ticker lost a race with a state change: {err}");
                            break;
                        }
                    }
                };

                if let Some(completion) = completion {
                    let record = build_record(&user_id, completion);
                    info!(
                        "Completed {} phase for user {}: {:.1} min of {}",
                        record.session_type.as_str(),
                        record.user_id,
                        record.duration_minutes,
                        record.subject
                    );

                    // Phase advancement is not gated on persistence.
                    let store = store.clone();
                    let persisted = record.clone();
                    tokio::spawn(async move {
                        if let Err(err) = store.append(&persisted).await {
                            error!("Failed to persist study record {}: {err}", persisted.id);
                        }
                    });

                    let _ = events.send(TimerEvent::PhaseCompleted { record });
                    let _ = events.send(TimerEvent::StateChanged { state: snapshot });
                    break;
                }

                let _ = events.send(TimerEvent::StateChanged { state: snapshot });
            }
        });

        *ticker_guard = Some(handle);
    }

    async fn cancel_ticker(&self) {
        if let Some(handle) = self.ticker.lock().await.take() {
            handle.abort();
        }
    }

    async fn emit_state_changed(&self) -> TimerState {
        let snapshot = self.snapshot().await;
        let _ = self.events.send(TimerEvent::StateChanged {
            state: snapshot.clone(),
        });
        snapshot
    }
}

fn build_record(user_id: &str, completion: PhaseCompletion) -> StudyRecord {
    StudyRecord {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        subject: completion.subject,
        duration_minutes: completion.duration_minutes,
        session_type: completion.session_type,
        timestamp: Utc::now(),
    }
}
