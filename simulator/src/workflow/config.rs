use crate::generator::gait::GaitConfig;
use anyhow::Context;
use pdrcore::DetectorConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub detector: DetectorConfig,
    pub gait: GaitConfig,
}

impl WorkflowConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading workflow config {}", path_ref.display()))?;
        let config: WorkflowConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing workflow config {}", path_ref.display()))?;
        config
            .detector
            .validate()
            .with_context(|| format!("validating workflow config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(steps: usize, seed: u64) -> Self {
        Self {
            detector: DetectorConfig::default(),
            gait: GaitConfig {
                steps,
                seed,
                ..Default::default()
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_keeps_detector_defaults() {
        let cfg = WorkflowConfig::from_args(12, 5);
        assert_eq!(cfg.gait.steps, 12);
        assert_eq!(cfg.gait.seed, 5);
        assert_eq!(cfg.detector, DetectorConfig::default());
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"detector:\n  variance_threshold: 0.5\n  push_timeout_ms: 200\ngait:\n  steps: 8\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = WorkflowConfig::load(&path).unwrap();
        assert_eq!(cfg.detector.variance_threshold, 0.5);
        assert_eq!(cfg.detector.push_timeout_ms, 200);
        assert_eq!(cfg.detector.capacity, 60);
        assert_eq!(cfg.gait.steps, 8);
    }

    #[test]
    fn config_load_rejects_invalid_detector() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"detector:\n  capacity: 50\n").unwrap();
        let path = temp.into_temp_path();
        assert!(WorkflowConfig::load(&path).is_err());
    }
}
