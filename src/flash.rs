use std::time::{Duration, Instant};

pub const FLASH_DURATION: Duration = Duration::from_millis(1000);

/// Transient validation cue. Active from `trigger` until its deadline passes
/// or `clear` is called. Re-triggering replaces the deadline.
#[derive(Clone, Copy, Debug)]
pub struct ErrorFlash {
    duration: Duration,
    deadline: Option<Instant>,
}

impl Default for ErrorFlash {
    fn default() -> Self {
        Self::new(FLASH_DURATION)
    }
}

impl ErrorFlash {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            deadline: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn trigger(&mut self, now: Instant) {
        self.deadline = Some(now + self.duration);
    }

    pub fn clear(&mut self) {
        self.deadline = None;
    }

    /// Returns true when this call turned the flash off.
    pub fn expire(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}
