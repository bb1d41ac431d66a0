use crate::prelude::{
    AccelReading, DetectorConfig, EngineError, EngineResult, Sample, SampleSource, StepCallback,
    StepEvent,
};
use crate::processing::counter::StepCounter;
use crate::processing::sample_queue::SampleQueue;
use crate::processing::validator::Validator;
use crate::processing::window::WindowExtractor;
use crate::telemetry::log::LogManager;
use crate::telemetry::metrics::{DetectionMetrics, MetricsRecorder};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};
use tokio::sync::watch;

/// Step-detection engine: sample queue, detection cycle and step counter.
///
/// `push` may be called from any number of producer threads. Only the push
/// that fills the queue runs a detection cycle, and cycles are serialized by
/// a single engine-scoped lock, so each cycle slides the queue and bumps the
/// counter at most once and in trigger order.
///
/// Step events are queued inside the cycle lock and handed to the callback
/// after it is released, by whichever thread holds the delivery lock. A
/// callback may push into the same engine: steps it triggers are delivered
/// after it returns, still in count order.
pub struct StepEngine {
    config: DetectorConfig,
    queue: SampleQueue,
    extractor: WindowExtractor,
    validator: Validator,
    counter: StepCounter,
    cycle_lock: Mutex<()>,
    callback: Option<Arc<dyn StepCallback>>,
    pending: Mutex<VecDeque<StepEvent>>,
    delivery_lock: Mutex<()>,
    metrics: MetricsRecorder,
    logger: LogManager,
}

impl StepEngine {
    pub fn new(config: DetectorConfig) -> EngineResult<Self> {
        config.validate()?;
        Ok(Self {
            queue: SampleQueue::with_capacity(config.capacity),
            extractor: WindowExtractor::new(&config),
            validator: Validator::new(&config),
            counter: StepCounter::new(),
            cycle_lock: Mutex::new(()),
            callback: None,
            pending: Mutex::new(VecDeque::new()),
            delivery_lock: Mutex::new(()),
            metrics: MetricsRecorder::new(),
            logger: LogManager::new(),
            config,
        })
    }

    pub fn with_callback<C>(config: DetectorConfig, callback: C) -> EngineResult<Self>
    where
        C: StepCallback + 'static,
    {
        let mut engine = Self::new(config)?;
        engine.callback = Some(Arc::new(callback));
        Ok(engine)
    }

    /// Converts a triaxial reading to its magnitude and pushes it.
    pub fn push_reading(&self, reading: AccelReading) -> EngineResult<Option<StepEvent>> {
        if !reading.is_finite() {
            self.metrics.record_invalid();
            return Err(EngineError::InvalidInput(format!(
                "non-finite reading at {} ns",
                reading.timestamp_ns
            )));
        }
        self.push(Sample::from_reading(&reading))
    }

    /// Enqueues one sample and runs a detection cycle if the queue is now full.
    ///
    /// An `Interrupted` error means the sample was not enqueued; the engine
    /// keeps running and the next push proceeds normally.
    pub fn push(&self, sample: Sample) -> EngineResult<Option<StepEvent>> {
        if !sample.magnitude.is_finite() || sample.magnitude < 0.0 {
            self.metrics.record_invalid();
            return Err(EngineError::InvalidInput(format!(
                "magnitude {} at {} ns",
                sample.magnitude, sample.timestamp_ns
            )));
        }

        let len = match self.queue.push(sample, self.config.push_timeout()) {
            Ok(len) => len,
            Err(err) => {
                self.metrics.record_interrupted();
                return Err(err);
            }
        };
        self.metrics.record_sample();

        if len < self.config.capacity {
            return Ok(None);
        }
        let event = self.run_cycle();
        self.deliver_pending();
        Ok(event)
    }

    fn run_cycle(&self) -> Option<StepEvent> {
        let _cycle = self
            .cycle_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let extraction = self.extractor.extract_from(&self.queue)?;
        let report = self.validator.validate(&extraction);
        self.logger
            .record_cycle(&extraction.peaks, extraction.mid_peak_index, &report);
        self.metrics.record_cycle(&report);

        if !report.is_step() {
            return None;
        }

        let event = StepEvent {
            count: self.counter.increment(),
            timestamp_ns: extraction.peaks.middle.timestamp_ns,
        };
        self.logger.record_step(&event);
        if self.callback.is_some() {
            self.pending
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push_back(event);
        }
        Some(event)
    }

    /// Hands queued events to the callback in count order.
    ///
    /// Returns without delivering when another frame, possibly a callback on
    /// this same thread, already holds the delivery lock; that holder drains
    /// the queue before letting go.
    fn deliver_pending(&self) {
        let Some(callback) = &self.callback else {
            return;
        };
        loop {
            let delivery = match self.delivery_lock.try_lock() {
                Ok(guard) => guard,
                Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
                Err(TryLockError::WouldBlock) => return,
            };
            while let Some(event) = self.next_pending() {
                callback.on_step(event.count);
            }
            drop(delivery);

            // an event queued while the lock was being released would
            // otherwise wait for the next step
            if !self.has_pending() {
                return;
            }
        }
    }

    fn next_pending(&self) -> Option<StepEvent> {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front()
    }

    fn has_pending(&self) -> bool {
        !self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_empty()
    }

    /// Feeds every reading from `source` until it ends and returns the step count.
    ///
    /// Rejected and interrupted samples are logged and skipped.
    pub fn run<S: SampleSource>(&self, mut source: S) -> u64 {
        while let Some(reading) = source.next_reading() {
            if let Err(err) = self.push_reading(reading) {
                self.logger.record_dropped(&err);
            }
        }
        self.step_count()
    }

    pub fn step_count(&self) -> u64 {
        self.counter.current()
    }

    /// Zeroes the step count; buffered samples are kept.
    pub fn reset(&self) {
        let _cycle = self
            .cycle_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        self.counter.reset();
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.counter.subscribe()
    }

    pub fn metrics(&self) -> DetectionMetrics {
        self.metrics.snapshot()
    }

    pub fn queued_samples(&self) -> Vec<Sample> {
        self.queue.snapshot()
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }
}
