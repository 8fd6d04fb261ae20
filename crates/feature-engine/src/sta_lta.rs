//! STA/LTA trigger statistic
//!
//! Short-term over long-term average of signal power. Both averages are
//! centred moving means of the squared signal, computed as a same-length
//! convolution with a uniform kernel (zero padding outside the segment).

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FeatureError;
use crate::feature_set::FeatureSet;
use crate::statistics::mean_std;

/// Regularizer added to the LTA before division
const LTA_EPSILON: f64 = 1e-10;

/// Convert a window length in seconds to a kernel length in samples
pub fn window_samples(
    name: &'static str,
    seconds: f64,
    sampling_rate: u32,
) -> Result<usize, FeatureError> {
    let invalid = |reason| FeatureError::InvalidWindow {
        name,
        seconds,
        sampling_rate,
        reason,
    };

    if sampling_rate == 0 {
        return Err(FeatureError::InvalidSamplingRate(sampling_rate));
    }
    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(invalid("window must be positive and finite"));
    }
    let samples = (seconds * sampling_rate as f64) as usize;
    if samples == 0 {
        return Err(invalid("window is shorter than one sample"));
    }
    Ok(samples)
}

/// STA/LTA ratio series for `signal` (same length as the input)
pub fn sta_lta_ratio(
    signal: &[f64],
    sampling_rate: u32,
    sta_window_s: f64,
    lta_window_s: f64,
) -> Result<Vec<f64>, FeatureError> {
    let sta_len = window_samples("sta", sta_window_s, sampling_rate)?;
    let lta_len = window_samples("lta", lta_window_s, sampling_rate)?;

    let squared: Vec<f64> = signal.iter().map(|v| v * v).collect();
    let prefix = prefix_sums(&squared);

    let sta = centered_moving_average(&prefix, sta_len);
    let lta = centered_moving_average(&prefix, lta_len);

    Ok(sta
        .iter()
        .zip(lta.iter())
        .map(|(s, l)| s / (l + LTA_EPSILON))
        .collect())
}

/// Largest value of the STA/LTA series (0 for an empty signal)
pub fn max_ratio(
    signal: &[f64],
    sampling_rate: u32,
    sta_window_s: f64,
    lta_window_s: f64,
) -> Result<f64, FeatureError> {
    let ratio = sta_lta_ratio(signal, sampling_rate, sta_window_s, lta_window_s)?;
    Ok(ratio.iter().cloned().fold(0.0, f64::max))
}

/// `prefix[i]` = sum of `values[..i]`
fn prefix_sums(values: &[f64]) -> Vec<f64> {
    let mut prefix = Vec::with_capacity(values.len() + 1);
    let mut sum = 0.0;
    prefix.push(sum);
    for v in values {
        sum += v;
        prefix.push(sum);
    }
    prefix
}

/// Centred "same" convolution of `x` with a uniform length-`m` kernel, `len(x)` outputs.
///
/// Output `i` is full-convolution index `i + (m - 1) / 2`, i.e. the mean over
/// `x[i + (m-1)/2 - (m-1) ..= i + (m-1)/2]` with out-of-range samples as zero.
fn centered_moving_average(prefix: &[f64], m: usize) -> Vec<f64> {
    let n = prefix.len() - 1;
    let offset = (m - 1) / 2;
    let scale = 1.0 / m as f64;

    (0..n)
        .map(|i| {
            let end = (i + offset + 1).min(n);
            let start = (i + offset + 1).saturating_sub(m).min(end);
            (prefix[end] - prefix[start]) * scale
        })
        .collect()
}

/// Aggregates of the STA/LTA series
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaLtaFeatures {
    /// Peak ratio
    pub max: f64,
    /// Mean ratio
    pub mean: f64,
    /// Std dev of the ratio
    pub std: f64,
    /// Samples with ratio above the trigger constant
    pub trigger_count: usize,
}

impl StaLtaFeatures {
    /// Compute ratio aggregates with the given windows and trigger constant
    pub fn compute(
        signal: &[f64],
        sampling_rate: u32,
        sta_window_s: f64,
        lta_window_s: f64,
        trigger_ratio: f64,
    ) -> Result<Self, FeatureError> {
        let ratio = sta_lta_ratio(signal, sampling_rate, sta_window_s, lta_window_s)?;
        if ratio.is_empty() {
            return Ok(Self::default());
        }

        let (mean, std) = mean_std(&ratio);
        let max = ratio.iter().cloned().fold(f64::MIN, f64::max);
        let trigger_count = ratio.iter().filter(|&&r| r > trigger_ratio).count();

        debug!(
            "STA/LTA over {} samples: max={:.3}, triggers={}",
            ratio.len(),
            max,
            trigger_count
        );

        Ok(Self {
            max,
            mean,
            std,
            trigger_count,
        })
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("sta_lta_max", self.max);
        set.push("sta_lta_mean", self.mean);
        set.push("sta_lta_std", self.std);
        set.push("sta_lta_trigger_count", self.trigger_count as f64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, Normal, StandardNormal};

    /// Direct evaluation of the zero-padded "same" convolution
    fn naive_same(x: &[f64], m: usize) -> Vec<f64> {
        let n = x.len() as isize;
        let offset = ((m - 1) / 2) as isize;
        (0..n)
            .map(|i| {
                let k = i + offset;
                (0..m as isize)
                    .map(|j| k - j)
                    .filter(|&idx| idx >= 0 && idx < n)
                    .map(|idx| x[idx as usize])
                    .sum::<f64>()
                    / m as f64
            })
            .collect()
    }

    #[test]
    fn test_moving_average_matches_convolution() {
        let x: Vec<f64> = (0..37).map(|i| ((i * 7) % 11) as f64).collect();
        let prefix = prefix_sums(&x);
        for m in [1, 2, 3, 4, 10, 37, 50] {
            let fast = centered_moving_average(&prefix, m);
            let slow = naive_same(&x, m);
            assert_eq!(fast.len(), x.len());
            for (a, b) in fast.iter().zip(slow.iter()) {
                assert!((a - b).abs() < 1e-9, "m={m}");
            }
        }
    }

    #[test]
    fn test_same_mode_offsets() {
        // [1, 2, 3] convolved with [1, 1], centred: [1, 3, 5]
        let prefix = prefix_sums(&[1.0, 2.0, 3.0]);
        let out: Vec<f64> = centered_moving_average(&prefix, 2).iter().map(|v| v * 2.0).collect();
        assert_eq!(out, vec![1.0, 3.0, 5.0]);
    }

    #[test]
    fn test_event_onset_located() {
        let mut rng = StdRng::seed_from_u64(42);
        let background = Normal::new(0.0, 0.1).unwrap();

        let mut signal: Vec<f64> = (0..3000).map(|_| background.sample(&mut rng)).collect();
        // Impulsive event (std 2.0 at onset) decaying over a few seconds
        for k in 0..1000 {
            let noise: f64 = StandardNormal.sample(&mut rng);
            signal.push(2.0 * noise * (-(k as f64) / 300.0).exp());
        }
        signal.extend((0..2000).map(|_| background.sample(&mut rng)));

        let ratio = sta_lta_ratio(&signal, 100, 1.0, 30.0).unwrap();
        assert_eq!(ratio.len(), signal.len());

        let argmax = ratio
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert!((argmax as isize - 3000).abs() < 200, "argmax={argmax}");
    }

    #[test]
    fn test_features_on_noise() {
        let mut rng = StdRng::seed_from_u64(3);
        let signal: Vec<f64> = (0..6000).map(|_| StandardNormal.sample(&mut rng)).collect();
        let features = StaLtaFeatures::compute(&signal, 100, 1.0, 30.0, 5.0).unwrap();
        assert!(features.max.is_finite() && features.max > 0.0);
        assert!(features.mean > 0.0);
        assert!(features.std.is_finite());

        let mut set = FeatureSet::new();
        features.append_to(&mut set);
        assert!(set.get("sta_lta_max").is_some());
        assert!(set.get("sta_lta_mean").is_some());
        assert!(set.get("sta_lta_std").is_some());
        assert!(set.get("sta_lta_trigger_count").is_some());
    }

    #[test]
    fn test_kernel_longer_than_segment() {
        let signal = vec![1.0; 50];
        let ratio = sta_lta_ratio(&signal, 100, 0.1, 30.0).unwrap();
        assert_eq!(ratio.len(), 50);
        assert!(ratio.iter().all(|r| r.is_finite()));
    }

    #[test]
    fn test_silent_signal_ratio_is_zero() {
        let ratio = sta_lta_ratio(&[0.0; 500], 100, 1.0, 3.0).unwrap();
        assert!(ratio.iter().all(|&r| r == 0.0));
        assert_eq!(max_ratio(&[], 100, 1.0, 3.0).unwrap(), 0.0);
    }

    #[test]
    fn test_invalid_windows() {
        assert!(matches!(
            sta_lta_ratio(&[1.0; 10], 100, 0.0, 30.0),
            Err(FeatureError::InvalidWindow { name: "sta", .. })
        ));
        assert!(matches!(
            sta_lta_ratio(&[1.0; 10], 100, 1.0, f64::NAN),
            Err(FeatureError::InvalidWindow { name: "lta", .. })
        ));
        assert!(matches!(
            window_samples("sta", 0.001, 100),
            Err(FeatureError::InvalidWindow { .. })
        ));
        assert_eq!(window_samples("sta", 1.0, 0), Err(FeatureError::InvalidSamplingRate(0)));
        assert_eq!(window_samples("lta", 2.5, 100), Ok(250));
    }
}
