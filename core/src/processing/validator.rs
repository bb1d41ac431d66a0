use crate::math::stats::StatsHelper;
use crate::prelude::DetectorConfig;
use crate::processing::window::{Extraction, PeakTriple, SubWindow};
use serde::Serialize;
use std::ops::Range;

/// Outcome of the three checks for one detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ValidationReport {
    pub continuity: bool,
    pub periodicity: bool,
    pub similarity: bool,
    pub slice_variances: [f32; 4],
    /// Interval between the middle and last peaks.
    pub period_ns: u64,
    /// Absolute magnitude difference between the first and last peaks.
    pub peak_difference: f32,
}

impl ValidationReport {
    pub fn is_step(&self) -> bool {
        self.continuity && self.periodicity && self.similarity
    }
}

/// Continuity, periodicity and similarity checks over one extracted window.
pub struct Validator {
    variance_threshold: f32,
    min_period_ns: u64,
    max_period_ns: u64,
    min_similarity: f32,
    max_similarity: f32,
    middle: SubWindow,
    half: usize,
    window_len: usize,
}

impl Validator {
    pub fn new(config: &DetectorConfig) -> Self {
        Self {
            variance_threshold: config.variance_threshold,
            min_period_ns: config.min_period_ns,
            max_period_ns: config.max_period_ns,
            min_similarity: config.min_similarity,
            max_similarity: config.max_similarity,
            middle: SubWindow {
                start: config.subwindow,
                end: config.subwindow * 2,
            },
            half: config.subwindow / 2,
            window_len: config.capacity,
        }
    }

    /// Evaluates all three checks; the window is a step only if every one passes.
    pub fn validate(&self, extraction: &Extraction) -> ValidationReport {
        let magnitudes = extraction.window.magnitudes();
        let slice_variances = self.slice_variances(&magnitudes, extraction.mid_peak_index);
        let (period_ns, periodicity) = self.check_periodicity(&extraction.peaks);
        let (peak_difference, similarity) = self.check_similarity(&extraction.peaks);

        ValidationReport {
            continuity: self.check_continuity(&slice_variances),
            periodicity,
            similarity,
            slice_variances,
            period_ns,
            peak_difference,
        }
    }

    /// Two half-sub-window slices on each side of the middle peak, the peak
    /// itself excluded.
    pub fn continuity_slices(&self, mid_peak_index: usize) -> [Range<usize>; 4] {
        assert!(
            self.middle.contains(mid_peak_index),
            "mid peak index {} outside middle sub-window {:?}",
            mid_peak_index,
            self.middle.range()
        );
        let m = mid_peak_index;
        let h = self.half;
        [
            m - 2 * h..m - h,
            m - h..m,
            m + 1..m + 1 + h,
            m + 1 + h..m + 1 + 2 * h,
        ]
    }

    pub fn slice_variances(&self, magnitudes: &[f32], mid_peak_index: usize) -> [f32; 4] {
        assert_eq!(
            magnitudes.len(),
            self.window_len,
            "continuity check needs a full window"
        );
        self.continuity_slices(mid_peak_index)
            .map(|slice| StatsHelper::variance(&magnitudes[slice]))
    }

    /// Passes when at least two slices vary by the threshold or more.
    pub fn check_continuity(&self, variances: &[f32; 4]) -> bool {
        variances
            .iter()
            .filter(|&&v| v >= self.variance_threshold)
            .count()
            >= 2
    }

    /// Open-interval test on the middle-to-last peak interval.
    pub fn check_periodicity(&self, peaks: &PeakTriple) -> (u64, bool) {
        let period = peaks.middle.timestamp_ns.abs_diff(peaks.last.timestamp_ns);
        (
            period,
            period > self.min_period_ns && period < self.max_period_ns,
        )
    }

    /// Open-interval test on the first-to-last peak magnitude difference.
    pub fn check_similarity(&self, peaks: &PeakTriple) -> (f32, bool) {
        let difference = (peaks.last.magnitude - peaks.first.magnitude).abs();
        (
            difference,
            difference > self.min_similarity && difference < self.max_similarity,
        )
    }
}
