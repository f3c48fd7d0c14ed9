use thiserror::Error;

/// Errors from the timer state machine.
#[derive(Debug, Error)]
pub enum TimerError {
    /// Required input is missing or invalid. Surfaced to the caller
    /// synchronously; never retried automatically.
    #[error("validation failed: {0}")]
    Validation(String),

    /// Operation invoked in a state that forbids it. A correct scheduling
    /// driver never produces this call pattern.
    #[error("invalid transition: cannot {op} while {state}")]
    InvalidTransition {
        op: &'static str,
        state: &'static str,
    },
}

/// Append or query against the session store failed.
///
/// Never rolls back a timer phase transition; the controller logs append
/// failures and the cycle keeps advancing.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Persistence(#[from] anyhow::Error),
}
