use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Monotonic step count owned by one engine instance.
///
/// The count is mirrored into a watch channel so consumers can observe the
/// latest value without registering a callback.
pub struct StepCounter {
    count: AtomicU64,
    sender: watch::Sender<u64>,
}

impl StepCounter {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(0);
        Self {
            count: AtomicU64::new(0),
            sender,
        }
    }

    /// Adds exactly one step and returns the new count.
    pub fn increment(&self) -> u64 {
        let count = self.count.fetch_add(1, Ordering::SeqCst) + 1;
        self.sender.send_replace(count);
        count
    }

    pub fn current(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }

    pub fn reset(&self) {
        self.count.store(0, Ordering::SeqCst);
        self.sender.send_replace(0);
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.sender.subscribe()
    }
}

impl Default for StepCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counter_starts_at_zero_and_increments_by_one() {
        let counter = StepCounter::new();
        assert_eq!(counter.current(), 0);
        assert_eq!(counter.increment(), 1);
        assert_eq!(counter.increment(), 2);
        assert_eq!(counter.current(), 2);
    }

    #[test]
    fn subscribers_see_latest_count_and_reset() {
        let counter = StepCounter::new();
        let mut receiver = counter.subscribe();
        counter.increment();
        counter.increment();
        assert!(receiver.has_changed().unwrap());
        assert_eq!(*receiver.borrow_and_update(), 2);

        counter.reset();
        assert_eq!(counter.current(), 0);
        assert_eq!(*receiver.borrow_and_update(), 0);
    }

    #[test]
    fn separate_counters_do_not_share_state() {
        let a = StepCounter::new();
        let b = StepCounter::new();
        a.increment();
        assert_eq!(b.current(), 0);
    }
}
