use crate::prelude::{DetectorConfig, Sample};
use crate::processing::sample_queue::SampleQueue;
use std::ops::Range;

/// Half-open index range of one sub-window inside a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubWindow {
    pub start: usize,
    pub end: usize,
}

impl SubWindow {
    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn contains(&self, index: usize) -> bool {
        self.range().contains(&index)
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Point-in-time copy of a full sample queue, oldest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Window {
    samples: Vec<Sample>,
}

impl Window {
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn magnitudes(&self) -> Vec<f32> {
        self.samples.iter().map(|s| s.magnitude).collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Maximum-magnitude sample of each of the three sub-windows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakTriple {
    pub first: Sample,
    pub middle: Sample,
    pub last: Sample,
}

/// Everything one detection cycle hands to the validator.
#[derive(Debug, Clone)]
pub struct Extraction {
    pub window: Window,
    pub peaks: PeakTriple,
    /// Absolute window index of the middle sub-window's peak.
    pub mid_peak_index: usize,
}

/// Splits a full window into three sub-windows and picks each one's peak.
pub struct WindowExtractor {
    capacity: usize,
    sub_windows: [SubWindow; 3],
}

impl WindowExtractor {
    pub fn new(config: &DetectorConfig) -> Self {
        let size = config.subwindow;
        let sub_windows = [0, 1, 2].map(|slot| SubWindow {
            start: slot * size,
            end: (slot + 1) * size,
        });
        Self {
            capacity: config.capacity,
            sub_windows,
        }
    }

    pub fn sub_windows(&self) -> &[SubWindow; 3] {
        &self.sub_windows
    }

    pub fn middle(&self) -> SubWindow {
        self.sub_windows[1]
    }

    /// Number of samples each cycle slides the queue forward.
    pub fn advance(&self) -> usize {
        self.sub_windows[0].len()
    }

    /// Takes the window from a full queue, slides the queue, and extracts peaks.
    pub fn extract_from(&self, queue: &SampleQueue) -> Option<Extraction> {
        queue
            .take_window(self.advance())
            .map(|samples| self.extract(samples))
    }

    pub fn extract(&self, samples: Vec<Sample>) -> Extraction {
        assert_eq!(
            samples.len(),
            self.capacity,
            "window must hold exactly {} samples",
            self.capacity
        );

        let [first, middle, last] = self.sub_windows.map(|sub| Self::peak_in(&samples, sub));

        Extraction {
            window: Window { samples },
            peaks: PeakTriple {
                first: first.1,
                middle: middle.1,
                last: last.1,
            },
            mid_peak_index: middle.0,
        }
    }

    /// Left-to-right running maximum; only a strictly greater magnitude
    /// replaces it, so the earliest sample wins ties.
    fn peak_in(samples: &[Sample], sub: SubWindow) -> (usize, Sample) {
        let mut best_index = sub.start;
        let mut best = samples[sub.start];
        for index in sub.range().skip(1) {
            if samples[index].magnitude > best.magnitude {
                best_index = index;
                best = samples[index];
            }
        }
        (best_index, best)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn flat_window(len: usize) -> Vec<Sample> {
        (0..len)
            .map(|i| Sample::new(9.8, i as u64 * 25_000_000))
            .collect()
    }

    #[test]
    fn sub_windows_partition_the_window() {
        let extractor = WindowExtractor::new(&DetectorConfig::default());
        let ranges: Vec<_> = extractor.sub_windows().iter().map(|s| s.range()).collect();
        assert_eq!(ranges, vec![0..20, 20..40, 40..60]);
        assert_eq!(extractor.advance(), 20);
    }

    #[test]
    fn extract_finds_peak_per_sub_window() {
        let extractor = WindowExtractor::new(&DetectorConfig::default());
        let mut samples = flat_window(60);
        samples[7].magnitude = 12.0;
        samples[33].magnitude = 13.0;
        samples[58].magnitude = 11.0;

        let extraction = extractor.extract(samples.clone());
        assert_eq!(extraction.peaks.first, samples[7]);
        assert_eq!(extraction.peaks.middle, samples[33]);
        assert_eq!(extraction.peaks.last, samples[58]);
        assert_eq!(extraction.mid_peak_index, 33);
        assert_eq!(extraction.window.len(), 60);
    }

    #[test]
    fn ties_keep_the_earliest_sample() {
        let extractor = WindowExtractor::new(&DetectorConfig::default());
        let mut samples = flat_window(60);
        samples[24].magnitude = 12.0;
        samples[31].magnitude = 12.0;

        let extraction = extractor.extract(samples.clone());
        assert_eq!(extraction.mid_peak_index, 24);
        assert_eq!(extraction.peaks.middle.timestamp_ns, samples[24].timestamp_ns);
        // a flat sub-window resolves to its first sample
        assert_eq!(extraction.peaks.first, samples[0]);
        assert_eq!(extraction.peaks.last, samples[40]);
    }

    #[test]
    fn flat_middle_sub_window_points_at_its_start() {
        let extractor = WindowExtractor::new(&DetectorConfig::default());
        let extraction = extractor.extract(flat_window(60));
        assert_eq!(extraction.mid_peak_index, 20);
        assert!(extractor.middle().contains(extraction.mid_peak_index));
    }

    #[test]
    fn extract_from_slides_queue_by_one_sub_window() {
        let config = DetectorConfig::default();
        let extractor = WindowExtractor::new(&config);
        let queue = SampleQueue::with_capacity(config.capacity);
        let samples = flat_window(60);
        for sample in &samples[..59] {
            queue.push(*sample, Duration::from_millis(10)).unwrap();
        }
        assert!(extractor.extract_from(&queue).is_none());

        queue.push(samples[59], Duration::from_millis(10)).unwrap();
        let extraction = extractor.extract_from(&queue).unwrap();
        assert_eq!(extraction.window.samples(), samples.as_slice());
        assert_eq!(queue.snapshot(), samples[20..].to_vec());
    }

    #[test]
    #[should_panic(expected = "window must hold exactly 60 samples")]
    fn short_window_fails_fast() {
        let extractor = WindowExtractor::new(&DetectorConfig::default());
        extractor.extract(flat_window(59));
    }
}
