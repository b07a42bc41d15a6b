use std::time::{Duration, Instant};

/// A pending regeneration that fires once input has been quiet for `delay`.
///
/// Every [`trigger`](Debouncer::trigger) replaces the pending token, so only
/// the most recent request survives the quiet period.
#[derive(Debug)]
pub struct Debouncer {
    delay: Duration,
    pending: Option<Pending>,
    next_token: u64,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    token: u64,
    due: Instant,
}

impl Debouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
            next_token: 0,
        }
    }

    /// Restarts the delay and returns the token that is now pending.
    pub fn trigger(&mut self, now: Instant) -> u64 {
        self.next_token += 1;
        self.pending = Some(Pending {
            token: self.next_token,
            due: now + self.delay,
        });
        self.next_token
    }

    /// Takes the pending token once its delay has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<u64> {
        match self.pending {
            Some(pending) if now >= pending.due => {
                self.pending = None;
                Some(pending.token)
            }
            _ => None,
        }
    }

    /// How long until the pending token is due, for sizing event-poll timeouts.
    pub fn remaining(&self, now: Instant) -> Option<Duration> {
        self.pending.map(|p| p.due.saturating_duration_since(now))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DELAY: Duration = Duration::from_millis(300);

    #[test]
    fn fires_once_after_quiet_period() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        let token = debouncer.trigger(start);

        assert_eq!(debouncer.poll(start + Duration::from_millis(299)), None);
        assert_eq!(debouncer.poll(start + DELAY), Some(token));
        assert_eq!(debouncer.poll(start + DELAY * 2), None);
    }

    #[test]
    fn retrigger_restarts_delay_and_supersedes_token() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        let first = debouncer.trigger(start);
        let second = debouncer.trigger(start + Duration::from_millis(200));

        assert_ne!(first, second);
        assert_eq!(debouncer.poll(start + DELAY), None);
        assert_eq!(
            debouncer.poll(start + Duration::from_millis(500)),
            Some(second)
        );
    }

    #[test]
    fn nothing_pending_until_triggered() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);

        assert_eq!(debouncer.remaining(start), None);
        assert_eq!(debouncer.poll(start + DELAY), None);
    }

    #[test]
    fn remaining_counts_down() {
        let start = Instant::now();
        let mut debouncer = Debouncer::new(DELAY);
        debouncer.trigger(start);

        assert_eq!(
            debouncer.remaining(start + Duration::from_millis(100)),
            Some(Duration::from_millis(200))
        );
        assert_eq!(
            debouncer.remaining(start + Duration::from_secs(1)),
            Some(Duration::ZERO)
        );
    }
}
