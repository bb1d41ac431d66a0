use crate::workflow::config::WorkflowConfig;
use anyhow::Context;
use log::warn;
use pdrcore::telemetry::DetectionMetrics;
use pdrcore::{AccelReading, StepEngine, StepEvent};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tokio::runtime::Builder as TokioBuilder;
use tokio::sync::oneshot;

#[derive(Debug, Clone, Serialize)]
pub struct WorkflowResult {
    pub step_count: u64,
    pub step_events: Vec<StepEvent>,
    pub metrics: DetectionMetrics,
}

#[derive(Clone)]
pub struct Runner {
    config: WorkflowConfig,
}

impl Runner {
    pub fn new(config: WorkflowConfig) -> Self {
        Self { config }
    }

    fn build_engine(&self) -> anyhow::Result<StepEngine> {
        StepEngine::new(self.config.detector.clone()).context("building step engine")
    }

    /// Pushes every reading through a fresh engine as fast as possible.
    pub fn execute(&self, readings: &[AccelReading]) -> anyhow::Result<WorkflowResult> {
        let engine = self.build_engine()?;
        let stop = AtomicBool::new(false);
        let step_events = feed(&engine, readings.iter().copied(), &stop, |_| {});
        Ok(WorkflowResult {
            step_count: engine.step_count(),
            step_events,
            metrics: engine.metrics(),
        })
    }

    /// Replays readings paced by their timestamps on a producer thread while
    /// printing count changes, until the input ends or Ctrl+C.
    pub fn execute_live(&self, readings: Vec<AccelReading>) -> anyhow::Result<WorkflowResult> {
        let engine = Arc::new(self.build_engine()?);
        let mut counts = engine.subscribe();
        let (done_tx, mut done_rx) = oneshot::channel();
        let stop = Arc::new(AtomicBool::new(false));

        let producer = {
            let engine = engine.clone();
            let stop = stop.clone();
            thread::spawn(move || {
                let mut previous: Option<u64> = None;
                let events = feed(&engine, readings.into_iter(), &stop, |reading| {
                    if let Some(prev) = previous {
                        let gap = reading.timestamp_ns.saturating_sub(prev);
                        thread::sleep(Duration::from_nanos(gap));
                    }
                    previous = Some(reading.timestamp_ns);
                });
                let _ = done_tx.send(());
                events
            })
        };

        let runtime = TokioBuilder::new_current_thread()
            .enable_all()
            .build()
            .context("creating runtime for live replay")?;
        runtime.block_on(async {
            loop {
                tokio::select! {
                    changed = counts.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        println!("[live] steps: {}", *counts.borrow_and_update());
                    }
                    _ = &mut done_rx => break,
                    interrupted = tokio::signal::ctrl_c() => {
                        interrupted.context("awaiting Ctrl+C")?;
                        stop.store(true, Ordering::SeqCst);
                        println!("[live] interrupted, stopping replay");
                        break;
                    }
                }
            }
            Ok::<(), anyhow::Error>(())
        })?;

        let step_events = producer
            .join()
            .map_err(|_| anyhow::anyhow!("live producer thread panicked"))?;
        Ok(WorkflowResult {
            step_count: engine.step_count(),
            step_events,
            metrics: engine.metrics(),
        })
    }
}

/// Pushes readings one by one, logging and skipping rejected samples.
///
/// Returns early once `stop` is set; the reading in hand is not pushed.
fn feed<I, F>(
    engine: &StepEngine,
    readings: I,
    stop: &AtomicBool,
    mut before_push: F,
) -> Vec<StepEvent>
where
    I: Iterator<Item = AccelReading>,
    F: FnMut(&AccelReading),
{
    let mut events = Vec::new();
    for reading in readings {
        if stop.load(Ordering::SeqCst) {
            break;
        }
        before_push(&reading);
        if stop.load(Ordering::SeqCst) {
            break;
        }
        match engine.push_reading(reading) {
            Ok(Some(event)) => events.push(event),
            Ok(None) => {}
            Err(err) => warn!("skipping reading at {} ns: {}", reading.timestamp_ns, err),
        }
    }
    events
}
