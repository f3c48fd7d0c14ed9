use serde::{Deserialize, Serialize};

use crate::config::TimerConfig;
use crate::error::TimerError;
use crate::models::SessionType;

const DEFAULT_SUBJECT: &str = "General";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum TimerPhase {
    Focus,
    ShortBreak,
    LongBreak,
}

impl Default for TimerPhase {
    fn default() -> Self {
        TimerPhase::Focus
    }
}

impl TimerPhase {
    pub fn session_type(&self) -> SessionType {
        match self {
            TimerPhase::Focus => SessionType::Pomodoro,
            TimerPhase::ShortBreak => SessionType::ShortBreak,
            TimerPhase::LongBreak => SessionType::LongBreak,
        }
    }

    pub fn is_break(&self) -> bool {
        matches!(self, TimerPhase::ShortBreak | TimerPhase::LongBreak)
    }
}

/// Produced when a phase runs to zero. The controller turns this into a
/// persisted `StudyRecord`.
#[derive(Debug, Clone, PartialEq)]
pub struct PhaseCompletion {
    pub session_type: SessionType,
    pub duration_minutes: f64,
    pub subject: String,
}

/// The focus/break cycle, driven one `tick()` per second by a single
/// writer. Every automatic phase transition lands with `running = false`;
/// the next phase needs an explicit `resume()` (or `begin()` with a fresh
/// subject for Focus).
///
/// Serialize-only: the display surface reads snapshots, but a state is
/// never reconstructed from the wire, since the skipped `config` would
/// come back as the default and could leave `remaining_secs` outside the
/// current phase's duration.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimerState {
    pub phase: TimerPhase,
    pub remaining_secs: u32,
    pub running: bool,
    pub completed_focus_count: u32,
    pub subject: Option<String>,
    #[serde(skip)]
    config: TimerConfig,
}

impl Default for TimerState {
    fn default() -> Self {
        Self::with_config(TimerConfig::default())
    }
}

impl TimerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TimerConfig) -> Self {
        Self {
            phase: TimerPhase::Focus,
            remaining_secs: config.focus_secs,
            running: false,
            completed_focus_count: 0,
            subject: None,
            config,
        }
    }

    pub fn config(&self) -> &TimerConfig {
        &self.config
    }

    /// Start a Focus phase. Requires an untouched countdown and a non-empty
    /// subject; break phases are started with `resume`, not `begin`.
    pub fn begin(&mut self, subject: &str) -> Result<(), TimerError> {
        if self.running {
            return Err(TimerError::InvalidTransition {
                op: "begin",
                state: "running",
            });
        }
        if self.phase.is_break() {
            return Err(TimerError::InvalidTransition {
                op: "begin",
                state: "on a break",
            });
        }
        if self.remaining_secs != self.config.focus_secs {
            return Err(TimerError::InvalidTransition {
                op: "begin",
                state: "mid-countdown",
            });
        }

        let subject = subject.trim();
        if subject.is_empty() {
            return Err(TimerError::Validation(
                "a subject is required to start a focus phase".into(),
            ));
        }

        self.subject = Some(subject.to_string());
        self.running = true;
        Ok(())
    }

    /// Restart the countdown from wherever it stands. Valid from Idle in
    /// any phase.
    pub fn resume(&mut self) -> Result<(), TimerError> {
        if self.running {
            return Err(TimerError::InvalidTransition {
                op: "resume",
                state: "running",
            });
        }
        self.running = true;
        Ok(())
    }

    /// Stop counting down, preserving `remaining_secs`. Idempotent.
    pub fn pause(&mut self) {
        self.running = false;
    }

    /// One second of progress. When the countdown reaches zero (including
    /// the reentrant case where it is already zero), the phase completes in
    /// the same step and the completion is returned.
    pub fn tick(&mut self) -> Result<Option<PhaseCompletion>, TimerError> {
        if !self.running {
            return Err(TimerError::InvalidTransition {
                op: "tick",
                state: "paused",
            });
        }

        if self.remaining_secs > 0 {
            self.remaining_secs -= 1;
        }

        if self.remaining_secs == 0 {
            return Ok(Some(self.complete_phase()));
        }

        Ok(None)
    }

    /// Abandon progress in the current phase: stop the countdown and refill
    /// it to the phase's full duration. Phase and `completed_focus_count`
    /// are unchanged; the stored subject is cleared when the phase is Focus.
    pub fn reset(&mut self) {
        self.running = false;
        self.remaining_secs = self.config.phase_secs(self.phase);
        if self.phase == TimerPhase::Focus {
            self.subject = None;
        }
    }

    fn complete_phase(&mut self) -> PhaseCompletion {
        let finished = self.phase;
        let completion = PhaseCompletion {
            session_type: finished.session_type(),
            duration_minutes: f64::from(self.config.phase_secs(finished)) / 60.0,
            subject: self
                .subject
                .clone()
                .unwrap_or_else(|| DEFAULT_SUBJECT.to_string()),
        };

        self.running = false;
        match finished {
            TimerPhase::Focus => {
                self.completed_focus_count += 1;
                self.phase = if self.completed_focus_count % self.config.long_break_every == 0 {
                    TimerPhase::LongBreak
                } else {
                    TimerPhase::ShortBreak
                };
            }
            TimerPhase::ShortBreak | TimerPhase::LongBreak => {
                self.phase = TimerPhase::Focus;
                self.subject = None;
            }
        }
        self.remaining_secs = self.config.phase_secs(self.phase);

        completion
    }
}
