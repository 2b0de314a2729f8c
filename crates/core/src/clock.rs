//! Elapsed-time bookkeeping for a game session.

use serde::{Deserialize, Serialize};

/// Seconds counter that starts on the first click of a session.
///
/// The clock does not own a timer. Ticks are delivered from outside and are
/// only counted while the session is started and the lesson is unfinished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClock {
    started: bool,
    elapsed_seconds: u64,
}

impl SessionClock {
    /// Mark the session as started. Returns true on the first call only.
    pub fn start(&mut self) -> bool {
        let first = !self.started;
        self.started = true;
        first
    }

    /// Whether the first click has happened.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Seconds counted so far.
    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    /// Whether ticks should be counted given the lesson state.
    pub fn is_running(&self, lesson_complete: bool) -> bool {
        self.started && !lesson_complete
    }

    /// Count one second if running. Returns whether the tick was applied.
    pub fn tick(&mut self, lesson_complete: bool) -> bool {
        if !self.is_running(lesson_complete) {
            return false;
        }
        self.elapsed_seconds += 1;
        true
    }

    /// Formatted elapsed time.
    pub fn formatted(&self) -> String {
        format_elapsed(self.elapsed_seconds)
    }
}

/// Format seconds as `m:ss`.
pub fn format_elapsed(seconds: u64) -> String {
    format!("{}:{:02}", seconds / 60, seconds % 60)
}
