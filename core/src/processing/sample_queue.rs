use crate::prelude::{EngineError, EngineResult, Sample};
use std::collections::VecDeque;
use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Bounded FIFO of samples in arrival order.
///
/// A push against a full queue waits until a detection cycle slides the
/// window forward, or gives up after the caller's timeout.
pub struct SampleQueue {
    inner: Mutex<VecDeque<Sample>>,
    not_full: Condvar,
    capacity: usize,
}

impl SampleQueue {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(VecDeque::with_capacity(capacity)),
            not_full: Condvar::new(),
            capacity,
        }
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<Sample>> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Appends a sample at the tail and returns the queue length after the push.
    pub fn push(&self, sample: Sample, timeout: Duration) -> EngineResult<usize> {
        let guard = self.lock();
        let (mut guard, wait) = self
            .not_full
            .wait_timeout_while(guard, timeout, |queue| queue.len() >= self.capacity)
            .unwrap_or_else(PoisonError::into_inner);

        if wait.timed_out() && guard.len() >= self.capacity {
            return Err(EngineError::Interrupted(format!(
                "queue stayed full for {} ms",
                timeout.as_millis()
            )));
        }

        guard.push_back(sample);
        Ok(guard.len())
    }

    /// Ordered copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Sample> {
        self.lock().iter().copied().collect()
    }

    /// Removes up to `count` of the oldest samples and returns how many were removed.
    pub fn drop_oldest(&self, count: usize) -> usize {
        let removed = {
            let mut guard = self.lock();
            let removed = count.min(guard.len());
            guard.drain(..removed);
            removed
        };
        if removed > 0 {
            self.not_full.notify_all();
        }
        removed
    }

    /// Snapshots a full queue and slides it forward by `advance` under one lock.
    ///
    /// Returns `None` when the queue is not full.
    pub fn take_window(&self, advance: usize) -> Option<Vec<Sample>> {
        let window = {
            let mut guard = self.lock();
            if guard.len() < self.capacity {
                return None;
            }
            let window: Vec<Sample> = guard.iter().copied().collect();
            let removed = advance.min(guard.len());
            guard.drain(..removed);
            window
        };
        self.not_full.notify_all();
        Some(window)
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.lock().len() >= self.capacity
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    const WAIT: Duration = Duration::from_millis(20);

    fn sample(index: u64) -> Sample {
        Sample::new(index as f32, index * 1_000)
    }

    #[test]
    fn push_reports_length_until_full() {
        let queue = SampleQueue::with_capacity(3);
        assert_eq!(queue.push(sample(0), WAIT).unwrap(), 1);
        assert_eq!(queue.push(sample(1), WAIT).unwrap(), 2);
        assert_eq!(queue.push(sample(2), WAIT).unwrap(), 3);
        assert!(queue.is_full());
    }

    #[test]
    fn push_on_full_queue_times_out_without_mutation() {
        let queue = SampleQueue::with_capacity(2);
        queue.push(sample(0), WAIT).unwrap();
        queue.push(sample(1), WAIT).unwrap();

        let err = queue.push(sample(2), WAIT).unwrap_err();
        assert!(matches!(err, EngineError::Interrupted(_)));
        assert_eq!(queue.snapshot(), vec![sample(0), sample(1)]);
    }

    #[test]
    fn blocked_push_resumes_after_drop_oldest() {
        let queue = Arc::new(SampleQueue::with_capacity(2));
        queue.push(sample(0), WAIT).unwrap();
        queue.push(sample(1), WAIT).unwrap();

        let producer = {
            let queue = queue.clone();
            thread::spawn(move || queue.push(sample(2), Duration::from_secs(5)))
        };

        thread::sleep(Duration::from_millis(20));
        assert_eq!(queue.drop_oldest(1), 1);
        assert_eq!(producer.join().unwrap().unwrap(), 2);
        assert_eq!(queue.snapshot(), vec![sample(1), sample(2)]);
    }

    #[test]
    fn take_window_requires_full_queue_and_keeps_newest() {
        let queue = SampleQueue::with_capacity(6);
        for i in 0..5 {
            queue.push(sample(i), WAIT).unwrap();
        }
        assert!(queue.take_window(2).is_none());
        assert_eq!(queue.len(), 5);

        queue.push(sample(5), WAIT).unwrap();
        let window = queue.take_window(2).unwrap();
        assert_eq!(window.len(), 6);
        assert_eq!(window[0], sample(0));
        assert_eq!(queue.snapshot(), (2..6).map(sample).collect::<Vec<_>>());
    }

    #[test]
    fn drop_oldest_is_bounded_by_length() {
        let queue = SampleQueue::with_capacity(4);
        queue.push(sample(0), WAIT).unwrap();
        assert_eq!(queue.drop_oldest(20), 1);
        assert!(queue.is_empty());
    }
}
