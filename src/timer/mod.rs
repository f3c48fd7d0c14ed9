pub mod controller;
pub mod state;

pub use controller::{TimerController, TimerEvent};
pub use state::{PhaseCompletion, TimerPhase, TimerState};
