use serde::{Deserialize, Serialize};

/// Mean and standard deviation of one feature.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct FeatureStats {
    pub mean: f64,
    pub std: f64,
}

impl FeatureStats {
    pub fn from_samples(samples: &[f64]) -> Self {
        Self {
            mean: mean(samples),
            std: sample_std(samples),
        }
    }

    /// Standardized distance of `value` from the mean.
    /// Zero spread means no signal, so the score is 0.0 rather than infinite.
    pub fn z_score(&self, value: f64) -> f64 {
        if self.std == 0.0 {
            return 0.0;
        }
        (value - self.mean) / self.std
    }
}

/// Arithmetic mean; 0.0 for an empty slice.
pub fn mean(samples: &[f64]) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }
    samples.iter().sum::<f64>() / samples.len() as f64
}

/// Unbiased (n - 1) standard deviation; 0.0 with fewer than two samples.
pub fn sample_std(samples: &[f64]) -> f64 {
    let n = samples.len();
    if n < 2 {
        return 0.0;
    }
    let m = mean(samples);
    let sq_diff: f64 = samples.iter().map(|v| (v - m).powi(2)).sum();
    (sq_diff / (n - 1) as f64).sqrt()
}
