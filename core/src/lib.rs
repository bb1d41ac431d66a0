//! Windowed step-detection core for pedestrian dead-reckoning.
//!
//! Accelerometer magnitudes are buffered in a bounded queue; every time the
//! queue fills, one detection cycle extracts per-sub-window peaks, runs the
//! continuity, periodicity and similarity checks, and emits a step event
//! when all three pass.

pub mod math;
pub mod prelude;
pub mod processing;
pub mod telemetry;

pub use prelude::{
    AccelReading, DetectorConfig, EngineError, EngineResult, Sample, SampleSource, StepCallback,
    StepEvent,
};
pub use processing::StepEngine;
