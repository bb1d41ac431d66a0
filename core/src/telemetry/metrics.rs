use crate::processing::validator::ValidationReport;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

pub struct MetricsRecorder {
    inner: Mutex<DetectionMetrics>,
}

/// Running totals for one engine instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectionMetrics {
    pub samples: u64,
    pub cycles: u64,
    pub steps: u64,
    pub continuity_rejections: u64,
    pub periodicity_rejections: u64,
    pub similarity_rejections: u64,
    pub interrupted_pushes: u64,
    pub invalid_samples: u64,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(DetectionMetrics::default()),
        }
    }

    pub fn record_sample(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.samples += 1;
        }
    }

    pub fn record_cycle(&self, report: &ValidationReport) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.cycles += 1;
            if report.is_step() {
                metrics.steps += 1;
            }
            if !report.continuity {
                metrics.continuity_rejections += 1;
            }
            if !report.periodicity {
                metrics.periodicity_rejections += 1;
            }
            if !report.similarity {
                metrics.similarity_rejections += 1;
            }
        }
    }

    pub fn record_interrupted(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.interrupted_pushes += 1;
        }
    }

    pub fn record_invalid(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.invalid_samples += 1;
        }
    }

    pub fn snapshot(&self) -> DetectionMetrics {
        if let Ok(metrics) = self.inner.lock() {
            *metrics
        } else {
            DetectionMetrics::default()
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(continuity: bool, periodicity: bool, similarity: bool) -> ValidationReport {
        ValidationReport {
            continuity,
            periodicity,
            similarity,
            slice_variances: [0.0; 4],
            period_ns: 0,
            peak_difference: 0.0,
        }
    }

    #[test]
    fn cycles_count_steps_and_each_failed_check() {
        let recorder = MetricsRecorder::new();
        recorder.record_cycle(&report(true, true, true));
        recorder.record_cycle(&report(false, true, false));
        recorder.record_interrupted();

        let snapshot = recorder.snapshot();
        assert_eq!(snapshot.cycles, 2);
        assert_eq!(snapshot.steps, 1);
        assert_eq!(snapshot.continuity_rejections, 1);
        assert_eq!(snapshot.periodicity_rejections, 0);
        assert_eq!(snapshot.similarity_rejections, 1);
        assert_eq!(snapshot.interrupted_pushes, 1);
    }
}
