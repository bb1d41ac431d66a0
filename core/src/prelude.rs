use crate::math::stats::StatsHelper;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One magnitude/timestamp pair held by the sample queue.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub magnitude: f32,
    pub timestamp_ns: u64,
}

impl Sample {
    pub fn new(magnitude: f32, timestamp_ns: u64) -> Self {
        Self {
            magnitude,
            timestamp_ns,
        }
    }

    /// Collapses a triaxial reading into its Euclidean norm.
    pub fn from_reading(reading: &AccelReading) -> Self {
        Self {
            magnitude: StatsHelper::magnitude(reading.x, reading.y, reading.z),
            timestamp_ns: reading.timestamp_ns,
        }
    }
}

/// Raw triaxial acceleration as delivered by the sensor source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AccelReading {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub timestamp_ns: u64,
}

impl AccelReading {
    pub fn new(x: f32, y: f32, z: f32, timestamp_ns: u64) -> Self {
        Self {
            x,
            y,
            z,
            timestamp_ns,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

/// Emitted once per validated detection cycle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StepEvent {
    pub count: u64,
    /// Timestamp of the middle-sub-window peak of the detecting window.
    pub timestamp_ns: u64,
}

/// Construction-time detector parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub capacity: usize,
    pub subwindow: usize,
    pub variance_threshold: f32,
    pub min_period_ns: u64,
    pub max_period_ns: u64,
    pub min_similarity: f32,
    pub max_similarity: f32,
    /// How long a push may wait on a full queue before it is abandoned.
    pub push_timeout_ms: u64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            capacity: 60,
            subwindow: 20,
            variance_threshold: 0.82,
            min_period_ns: 300_000_000,
            max_period_ns: 1_000_000_000,
            min_similarity: 0.0,
            max_similarity: 5.0,
            push_timeout_ms: 1_000,
        }
    }
}

impl DetectorConfig {
    pub fn validate(&self) -> EngineResult<()> {
        if self.subwindow < 2 || self.subwindow % 2 != 0 {
            return Err(EngineError::InvalidConfig(format!(
                "subwindow must be an even size of at least 2, got {}",
                self.subwindow
            )));
        }
        if self.capacity % self.subwindow != 0 || self.capacity / self.subwindow != 3 {
            return Err(EngineError::InvalidConfig(format!(
                "capacity {} must hold exactly three sub-windows of {}",
                self.capacity, self.subwindow
            )));
        }
        if !self.variance_threshold.is_finite() || self.variance_threshold < 0.0 {
            return Err(EngineError::InvalidConfig(format!(
                "variance threshold {} must be finite and non-negative",
                self.variance_threshold
            )));
        }
        if self.min_period_ns >= self.max_period_ns {
            return Err(EngineError::InvalidConfig(format!(
                "period bounds ({}, {}) are empty",
                self.min_period_ns, self.max_period_ns
            )));
        }
        if self.min_similarity.is_nan()
            || self.max_similarity.is_nan()
            || self.min_similarity >= self.max_similarity
        {
            return Err(EngineError::InvalidConfig(format!(
                "similarity bounds ({}, {}) are empty",
                self.min_similarity, self.max_similarity
            )));
        }
        Ok(())
    }

    pub fn push_timeout(&self) -> Duration {
        Duration::from_millis(self.push_timeout_ms)
    }
}

/// Common error type for the detection engine.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    #[error("interrupted wait: {0}")]
    Interrupted(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type EngineResult<T> = Result<T, EngineError>;

/// Producer of triaxial readings at sensor-native rate.
pub trait SampleSource {
    fn next_reading(&mut self) -> Option<AccelReading>;
}

impl<I> SampleSource for I
where
    I: Iterator<Item = AccelReading>,
{
    fn next_reading(&mut self) -> Option<AccelReading> {
        self.next()
    }
}

/// Receives the new step count once per validated step.
pub trait StepCallback: Send + Sync {
    fn on_step(&self, count: u64);
}

impl<F> StepCallback for F
where
    F: Fn(u64) + Send + Sync,
{
    fn on_step(&self, count: u64) {
        self(count)
    }
}
