use anyhow::Context;
use pdrcore::AccelReading;
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;

/// Upper bound on generated readings; roughly a day at 100 Hz.
const MAX_READINGS: u64 = 10_000_000;

/// Configuration for generating a synthetic walk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GaitConfig {
    pub steps: usize,
    pub sample_rate_hz: f32,
    pub step_interval_ms: u64,
    pub gravity: f32,
    pub step_amplitude: f32,
    pub sway_amplitude: f32,
    pub noise: f32,
    /// Standing still before and after the walk.
    pub idle_ms: u64,
    pub seed: u64,
}

impl Default for GaitConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            sample_rate_hz: 40.0,
            step_interval_ms: 500,
            gravity: 9.81,
            step_amplitude: 4.0,
            sway_amplitude: 0.5,
            noise: 0.05,
            idle_ms: 1_000,
            seed: 0,
        }
    }
}

impl GaitConfig {
    fn sample_period_ns(&self) -> anyhow::Result<u64> {
        if self.sample_rate_hz.is_nan() || self.sample_rate_hz <= 0.0 {
            anyhow::bail!("sample rate must be positive, got {}", self.sample_rate_hz);
        }
        let period_ns = (1e9 / self.sample_rate_hz as f64).round() as u64;
        if period_ns == 0 {
            anyhow::bail!("sample rate {} Hz is above 1 GHz", self.sample_rate_hz);
        }
        Ok(period_ns)
    }
}

/// Builds triaxial readings for an idle / walk / idle sequence.
///
/// Vertical acceleration follows one sine period per step on top of
/// gravity; lateral sway runs at half the step frequency.
pub fn build_walk(config: &GaitConfig) -> anyhow::Result<Vec<AccelReading>> {
    let period_ns = config.sample_period_ns()?;
    let step_ns = config
        .step_interval_ms
        .checked_mul(1_000_000)
        .context("overflow computing step interval")?;
    let idle_ns = config
        .idle_ms
        .checked_mul(1_000_000)
        .context("overflow computing idle duration")?;
    let walk_ns = step_ns
        .checked_mul(config.steps as u64)
        .context("overflow computing walk duration")?;
    let total_ns = idle_ns
        .checked_mul(2)
        .and_then(|idle| idle.checked_add(walk_ns))
        .context("overflow computing total duration")?;

    let reading_count = total_ns.div_ceil(period_ns);
    if reading_count > MAX_READINGS {
        anyhow::bail!(
            "walk needs {} readings, limit is {}",
            reading_count,
            MAX_READINGS
        );
    }

    let mut rng = StdRng::seed_from_u64(config.seed);
    let mut readings = Vec::with_capacity(reading_count as usize);
    let jitter = |rng: &mut StdRng| {
        if config.noise > 0.0 {
            rng.gen_range(-config.noise..config.noise)
        } else {
            0.0
        }
    };

    let mut timestamp = 0;
    while timestamp < total_ns {
        let walking = timestamp >= idle_ns && timestamp < idle_ns + walk_ns;
        let (x, z) = if walking && step_ns > 0 {
            let phase = (timestamp - idle_ns) as f32 / step_ns as f32;
            (
                config.sway_amplitude * (PI * phase).sin(),
                config.gravity + config.step_amplitude * (2.0 * PI * phase).sin(),
            )
        } else {
            (0.0, config.gravity)
        };

        readings.push(AccelReading::new(
            x + jitter(&mut rng),
            jitter(&mut rng),
            z + jitter(&mut rng),
            timestamp,
        ));
        match timestamp.checked_add(period_ns) {
            Some(next) => timestamp = next,
            None => break,
        }
    }

    Ok(readings)
}
