use crate::prelude::{EngineError, StepEvent};
use crate::processing::validator::ValidationReport;
use crate::processing::window::PeakTriple;
use log::{debug, info, warn};

/// Routes detection-cycle diagnostics through the `log` facade.
pub struct LogManager;

impl LogManager {
    pub fn new() -> Self {
        Self
    }

    pub fn record_cycle(
        &self,
        peaks: &PeakTriple,
        mid_peak_index: usize,
        report: &ValidationReport,
    ) {
        let [v0, v1, v2, v3] = report.slice_variances;
        debug!(
            "peaks {:.2}@{} {:.2}@{} {:.2}@{} (mid index {})",
            peaks.first.magnitude,
            peaks.first.timestamp_ns,
            peaks.middle.magnitude,
            peaks.middle.timestamp_ns,
            peaks.last.magnitude,
            peaks.last.timestamp_ns,
            mid_peak_index
        );
        debug!(
            "continuity {} variances {:.2} {:.2} {:.2} {:.2}; periodicity {} period {} ns; similarity {} diff {:.2}",
            report.continuity,
            v0,
            v1,
            v2,
            v3,
            report.periodicity,
            report.period_ns,
            report.similarity,
            report.peak_difference
        );
    }

    pub fn record_step(&self, event: &StepEvent) {
        info!("step {} at {} ns", event.count, event.timestamp_ns);
    }

    pub fn record_dropped(&self, err: &EngineError) {
        warn!("sample dropped: {}", err);
    }
}

impl Default for LogManager {
    fn default() -> Self {
        Self::new()
    }
}
