pub struct StatsHelper;

impl StatsHelper {
    /// Euclidean norm of a triaxial vector.
    pub fn magnitude(x: f32, y: f32, z: f32) -> f32 {
        (x * x + y * y + z * z).sqrt()
    }

    pub fn mean(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        samples.iter().sum::<f32>() / samples.len() as f32
    }

    /// Population variance: squared deviations averaged over the slice length.
    pub fn variance(samples: &[f32]) -> f32 {
        if samples.is_empty() {
            return 0.0;
        }
        let mean = Self::mean(samples);
        let sum_sq: f32 = samples.iter().map(|&v| (v - mean) * (v - mean)).sum();
        sum_sq / samples.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn variance_of_constant_sequence_is_zero() {
        assert_eq!(StatsHelper::variance(&[]), 0.0);
        assert_eq!(StatsHelper::variance(&[9.8; 10]), 0.0);
    }

    #[test]
    fn variance_divides_by_slice_length() {
        assert_eq!(StatsHelper::variance(&[1.0, 3.0]), 1.0);
        let samples = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(StatsHelper::variance(&samples), 4.0);
    }

    #[test]
    fn magnitude_is_euclidean_norm() {
        assert_eq!(StatsHelper::magnitude(0.0, 0.0, 0.0), 0.0);
        assert_eq!(StatsHelper::magnitude(3.0, 4.0, 0.0), 5.0);
    }
}
