//! Statistical Features Computation

use serde::{Deserialize, Serialize};

use crate::feature_set::FeatureSet;

/// Percentiles reported for every segment
pub const PERCENTILES: [u32; 9] = [1, 5, 10, 25, 50, 75, 90, 95, 99];

/// Floor applied to the RMS before computing the crest factor
const CREST_EPSILON: f64 = 1e-10;

/// Block statistics for a waveform segment (population conventions)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticalFeatures {
    /// Mean value
    pub mean: f64,
    /// Standard deviation
    pub std_dev: f64,
    /// Variance
    pub variance: f64,
    /// Minimum value
    pub min: f64,
    /// Maximum value
    pub max: f64,
    /// max - min
    pub range: f64,
    /// Median
    pub median: f64,
    /// Mean absolute deviation from the mean
    pub mean_abs_deviation: f64,
    /// Skewness (asymmetry)
    pub skewness: f64,
    /// Excess kurtosis (tailedness)
    pub kurtosis: f64,
    /// Root mean square
    pub rms: f64,
    /// Peak absolute value over RMS
    pub crest_factor: f64,
    /// Values at [`PERCENTILES`]
    pub percentiles: [f64; 9],
    /// p75 - p25
    pub iqr: f64,
}

impl StatisticalFeatures {
    /// Compute statistical features from a slice of values
    pub fn compute(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let n = values.len() as f64;

        // Min/Max
        let min = values.iter().cloned().fold(f64::MAX, f64::min);
        let max = values.iter().cloned().fold(f64::MIN, f64::max);

        // Mean (exact for constant segments)
        let constant = min == max;
        let mean = if constant {
            min
        } else {
            values.iter().sum::<f64>() / n
        };

        // Variance and higher moments
        let mut m2 = 0.0;
        let mut m3 = 0.0;
        let mut m4 = 0.0;
        let mut abs_dev = 0.0;
        let mut sum_sq = 0.0;
        let mut peak = 0.0_f64;

        for &v in values {
            let d = v - mean;
            m2 += d * d;
            m3 += d * d * d;
            m4 += d * d * d * d;
            abs_dev += d.abs();
            sum_sq += v * v;
            peak = peak.max(v.abs());
        }

        let variance = if constant { 0.0 } else { m2 / n };
        let std_dev = variance.sqrt();

        // Skewness: E[(X-μ)³] / σ³
        let skewness = standardized_moment(m3 / n, std_dev * std_dev * std_dev);

        // Kurtosis: E[(X-μ)⁴] / σ⁴ - 3 (excess kurtosis)
        let kurtosis = match standardized_moment(m4 / n, variance * variance) {
            k if k > 0.0 => k - 3.0,
            _ => 0.0,
        };

        let rms = (sum_sq / n).sqrt();
        let crest_factor = peak / (rms + CREST_EPSILON);

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let mut percentiles = [0.0; 9];
        for (slot, &p) in percentiles.iter_mut().zip(PERCENTILES.iter()) {
            *slot = percentile_sorted(&sorted, p as f64);
        }

        Self {
            mean,
            std_dev,
            variance,
            min,
            max,
            range: max - min,
            median: percentile_sorted(&sorted, 50.0),
            mean_abs_deviation: abs_dev / n,
            skewness,
            kurtosis,
            rms,
            crest_factor,
            percentiles,
            iqr: percentiles[5] - percentiles[3],
        }
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("mean", self.mean);
        set.push("std", self.std_dev);
        set.push("var", self.variance);
        set.push("min", self.min);
        set.push("max", self.max);
        set.push("range", self.range);
        set.push("median", self.median);
        set.push("mad", self.mean_abs_deviation);
        set.push("skewness", self.skewness);
        set.push("kurtosis", self.kurtosis);
        set.push("rms", self.rms);
        set.push("crest_factor", self.crest_factor);
        for (p, value) in PERCENTILES.iter().zip(self.percentiles.iter()) {
            set.push(format!("percentile_{p}"), *value);
        }
        set.push("iqr", self.iqr);
    }
}

/// Percentile of an unsorted slice, linear interpolation between closest ranks.
///
/// Returns 0 for an empty slice.
pub fn percentile(values: &[f64], p: f64) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    percentile_sorted(&sorted, p)
}

fn percentile_sorted(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let pos = (p / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    let frac = pos - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// `moment / denominator`, or 0 when the denominator underflows or the ratio is not finite
fn standardized_moment(moment: f64, denominator: f64) -> f64 {
    if denominator > 0.0 {
        let ratio = moment / denominator;
        if ratio.is_finite() {
            return ratio;
        }
    }
    0.0
}

/// Population mean and standard deviation; (0, 0) for an empty slice
pub(crate) fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n;
    (mean, var.sqrt())
}
