//! Nonparametric percentile bootstrap over yearly event counts.

use hail_trigger_models::ConfidenceInterval;
use rand::Rng;

use crate::AnalysisError;

pub const DEFAULT_ITERATIONS: usize = 1000;
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// Percentile interval of the sample mean.
///
/// Draws `iterations` resamples (with replacement, same length as `data`),
/// sorts their means, and reads the `floor(alpha/2 · iterations)` and
/// `floor((1 - alpha/2) · iterations)` entries, where
/// `alpha = 1 - confidence`. The upper index is capped at the last resample.
///
/// # Errors
///
/// Returns [`AnalysisError::Bootstrap`] if `data` is empty, `iterations` is
/// zero, or `confidence` is not strictly between 0 and 1.
pub fn confidence_interval<R: Rng + ?Sized>(
    data: &[u32],
    confidence: f64,
    iterations: usize,
    rng: &mut R,
) -> Result<ConfidenceInterval, AnalysisError> {
    if data.is_empty() {
        return Err(bootstrap_error("cannot resample an empty sample"));
    }
    if iterations == 0 {
        return Err(bootstrap_error("at least one resample is required"));
    }
    if !(confidence > 0.0 && confidence < 1.0) {
        return Err(bootstrap_error(format!(
            "confidence must be strictly between 0 and 1, got {confidence}"
        )));
    }

    let mut means: Vec<f64> = (0..iterations)
        .map(|_| resample_mean(data, rng))
        .collect();
    means.sort_by(f64::total_cmp);

    let alpha = 1.0 - confidence;
    let low = means[percentile_index(alpha / 2.0, iterations)];
    let high = means[percentile_index(1.0 - alpha / 2.0, iterations)];

    Ok(ConfidenceInterval { low, high })
}

#[allow(clippy::cast_precision_loss)]
fn resample_mean<R: Rng + ?Sized>(data: &[u32], rng: &mut R) -> f64 {
    let n = data.len();
    let sum: u64 = (0..n).map(|_| u64::from(data[rng.gen_range(0..n)])).sum();
    sum as f64 / n as f64
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
fn percentile_index(quantile: f64, iterations: usize) -> usize {
    let index = (quantile * iterations as f64).floor() as usize;
    index.min(iterations - 1)
}

fn bootstrap_error(message: impl Into<String>) -> AnalysisError {
    AnalysisError::Bootstrap {
        message: message.into(),
    }
}
