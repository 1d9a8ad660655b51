use std::time::{Duration, Instant};

/// A single cancellable, delayed action.
///
/// Scheduling again supersedes the pending action, and every schedule gets a
/// fresh generation so a firing observed by the caller always belongs to the
/// most recent schedule.
#[derive(Debug, Default, Clone)]
pub struct Deferred {
    due: Option<Instant>,
    generation: u64,
}

impl Deferred {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm (or re-arm) the action to fire `delay` after `now`.
    pub fn schedule(&mut self, now: Instant, delay: Duration) -> u64 {
        self.generation += 1;
        self.due = Some(now + delay);
        self.generation
    }

    pub fn cancel(&mut self) {
        self.due = None;
    }

    pub fn is_pending(&self) -> bool {
        self.due.is_some()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the generation that fired, disarming the action, or `None`
    /// when nothing is due yet.
    pub fn fire_if_due(&mut self, now: Instant) -> Option<u64> {
        match self.due {
            Some(due) if now >= due => {
                self.due = None;
                Some(self.generation)
            }
            _ => None,
        }
    }
}
