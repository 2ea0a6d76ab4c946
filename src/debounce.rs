use std::time::{Duration, Instant};

/// Collapses a burst of triggers into one, fired `delay` after the last.
#[derive(Debug, Clone)]
pub struct Debouncer {
    delay: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            deadline: None,
        }
    }

    /// Cancels any pending deadline and arms a new one.
    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.delay);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// True exactly once per armed deadline, once `now` reaches it.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Time left before the pending deadline, for sizing the event poll.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn burst_collapses_into_single_fire() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(start);
        d.schedule(start + Duration::from_millis(100));
        d.schedule(start + Duration::from_millis(200));
        assert!(!d.fire_if_due(start + Duration::from_millis(450)));
        assert!(d.fire_if_due(start + Duration::from_millis(500)));
        assert!(!d.fire_if_due(start + Duration::from_millis(900)));
        assert!(!d.is_pending());
    }

    #[test]
    fn cancel_drops_pending_fire() {
        let start = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(300));
        d.schedule(start);
        d.cancel();
        assert!(!d.fire_if_due(start + Duration::from_secs(1)));
        assert_eq!(d.remaining(start), None);
    }
}
