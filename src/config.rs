use crate::timer::TimerPhase;

/// Phase durations and break cadence for the focus cycle.
#[derive(Debug, Clone)]
pub struct TimerConfig {
    /// Focus phase length in seconds
    pub focus_secs: u32,

    /// Short break length in seconds
    pub short_break_secs: u32,

    /// Long break length in seconds
    pub long_break_secs: u32,

    /// Every Nth completed focus phase is followed by a long break
    pub long_break_every: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            focus_secs: 25 * 60,
            short_break_secs: 5 * 60,
            long_break_secs: 15 * 60,
            long_break_every: 3,
        }
    }
}

impl TimerConfig {
    pub fn phase_secs(&self, phase: TimerPhase) -> u32 {
        match phase {
            TimerPhase::Focus => self.focus_secs,
            TimerPhase::ShortBreak => self.short_break_secs,
            TimerPhase::LongBreak => self.long_break_secs,
        }
    }
}
