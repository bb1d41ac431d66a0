use anyhow::Context;
use pdrcore::AccelReading;
use std::fs;
use std::path::Path;

/// Loads a recorded trace: a JSON array of `{x, y, z, timestamp_ns}` objects.
pub fn load_trace<P: AsRef<Path>>(path: P) -> anyhow::Result<Vec<AccelReading>> {
    let path_ref = path.as_ref();
    let contents = fs::read_to_string(path_ref)
        .with_context(|| format!("reading trace {}", path_ref.display()))?;
    let readings: Vec<AccelReading> = serde_json::from_str(&contents)
        .with_context(|| format!("parsing trace {}", path_ref.display()))?;
    Ok(readings)
}

pub fn save_trace<P: AsRef<Path>>(path: P, readings: &[AccelReading]) -> anyhow::Result<()> {
    let path_ref = path.as_ref();
    if let Some(parent) = path_ref.parent() {
        fs::create_dir_all(parent)?;
    }
    let contents = serde_json::to_string(readings).context("serializing trace")?;
    fs::write(path_ref, contents)
        .with_context(|| format!("writing trace {}", path_ref.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn trace_load_reads_json_array() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            br#"[{"x":0.1,"y":0.2,"z":9.8,"timestamp_ns":0},{"x":0.0,"y":0.0,"z":10.5,"timestamp_ns":25000000}]"#,
        )
        .unwrap();
        let path = temp.into_temp_path();
        let readings = load_trace(&path).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].timestamp_ns, 25_000_000);
        assert_eq!(readings[1].z, 10.5);
    }

    #[test]
    fn trace_load_reports_malformed_file() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(b"{not json").unwrap();
        let path = temp.into_temp_path();
        let err = load_trace(&path).unwrap_err();
        assert!(err.to_string().starts_with("parsing trace"));
    }

    #[test]
    fn saved_trace_loads_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces/walk.json");
        let readings = vec![AccelReading::new(0.0, 0.5, 9.75, 10)];
        save_trace(&path, &readings).unwrap();
        assert_eq!(load_trace(&path).unwrap(), readings);
    }
}
