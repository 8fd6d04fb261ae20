//! Time-domain features: crossings, peaks, energy and envelope

use serde::{Deserialize, Serialize};

use crate::feature_set::FeatureSet;
use crate::spectral::analytic_signal;
use crate::statistics::mean_std;

/// Regularizer inside the log-energy
const LOG_ENERGY_EPSILON: f64 = 1e-10;

/// Time-domain descriptors of a segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeDomainFeatures {
    /// Sign changes per sample
    pub zero_crossing_rate: f64,
    /// Sign changes of the mean-centred signal per sample
    pub mean_crossing_rate: f64,
    /// Number of detected peaks
    pub num_peaks: usize,
    /// Peaks per sample
    pub peak_density: f64,
    /// Mean distance between consecutive peaks (samples)
    pub peak_interval_mean: f64,
    /// Std dev of distance between consecutive peaks (samples)
    pub peak_interval_std: f64,
    /// Mean peak height
    pub peak_height_mean: f64,
    /// Highest peak
    pub peak_height_max: f64,
    /// Sum of squares
    pub energy: f64,
    /// ln(energy + 1e-10)
    pub log_energy: f64,
    /// Mean of the Hilbert envelope
    pub envelope_mean: f64,
    /// Std dev of the Hilbert envelope
    pub envelope_std: f64,
    /// Max of the Hilbert envelope
    pub envelope_max: f64,
}

impl TimeDomainFeatures {
    /// Compute time-domain features of `signal`
    pub fn compute(signal: &[f64], sampling_rate: u32) -> Self {
        if signal.is_empty() {
            return Self::default();
        }

        let n = signal.len() as f64;
        let (mean, std) = mean_std(signal);

        let zero_crossing_rate = sign_changes(signal.iter().copied()) as f64 / n;
        let mean_crossing_rate = sign_changes(signal.iter().map(|v| v - mean)) as f64 / n;

        let distance = ((sampling_rate / 10) as usize).max(1);
        let peaks = find_peaks(signal, std, distance);

        let (peak_interval_mean, peak_interval_std) = if peaks.len() > 1 {
            let intervals: Vec<f64> = peaks.windows(2).map(|w| (w[1] - w[0]) as f64).collect();
            mean_std(&intervals)
        } else {
            (0.0, 0.0)
        };

        let heights: Vec<f64> = peaks.iter().map(|&i| signal[i]).collect();
        let (peak_height_mean, peak_height_max) = if heights.is_empty() {
            (0.0, 0.0)
        } else {
            let max = heights.iter().cloned().fold(f64::MIN, f64::max);
            (heights.iter().sum::<f64>() / heights.len() as f64, max)
        };

        let energy: f64 = signal.iter().map(|v| v * v).sum();

        let envelope: Vec<f64> = analytic_signal(signal).iter().map(|c| c.norm()).collect();
        let (envelope_mean, envelope_std) = mean_std(&envelope);
        let envelope_max = envelope.iter().cloned().fold(0.0, f64::max);

        Self {
            zero_crossing_rate,
            mean_crossing_rate,
            num_peaks: peaks.len(),
            peak_density: peaks.len() as f64 / n,
            peak_interval_mean,
            peak_interval_std,
            peak_height_mean,
            peak_height_max,
            energy,
            log_energy: (energy + LOG_ENERGY_EPSILON).ln(),
            envelope_mean,
            envelope_std,
            envelope_max,
        }
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("zero_crossing_rate", self.zero_crossing_rate);
        set.push("mean_crossing_rate", self.mean_crossing_rate);
        set.push("num_peaks", self.num_peaks as f64);
        set.push("peak_density", self.peak_density);
        set.push("peak_interval_mean", self.peak_interval_mean);
        set.push("peak_interval_std", self.peak_interval_std);
        set.push("peak_height_mean", self.peak_height_mean);
        set.push("peak_height_max", self.peak_height_max);
        set.push("energy", self.energy);
        set.push("log_energy", self.log_energy);
        set.push("envelope_mean", self.envelope_mean);
        set.push("envelope_std", self.envelope_std);
        set.push("envelope_max", self.envelope_max);
    }
}

/// Sign of `v` with sign(0) = 0
fn sign(v: f64) -> i8 {
    if v > 0.0 {
        1
    } else if v < 0.0 {
        -1
    } else {
        0
    }
}

/// Count adjacent pairs whose signs differ (a step through zero counts)
fn sign_changes(values: impl Iterator<Item = f64>) -> usize {
    let mut changes = 0;
    let mut prev: Option<i8> = None;
    for v in values {
        let s = sign(v);
        if prev.is_some_and(|p| p != s) {
            changes += 1;
        }
        prev = Some(s);
    }
    changes
}

/// Indices of local maxima with height >= `height`, at least `distance` samples apart.
///
/// Flat-topped maxima resolve to the middle of the plateau (rounded down). Endpoints
/// are never peaks. Selection is greedy left to right: a candidate closer than
/// `distance` to the previously accepted peak is dropped.
pub fn find_peaks(signal: &[f64], height: f64, distance: usize) -> Vec<usize> {
    let n = signal.len();
    let mut peaks = Vec::new();
    if n < 3 {
        return peaks;
    }

    let mut i = 1;
    while i < n - 1 {
        if signal[i - 1] < signal[i] {
            // Walk across a plateau
            let mut ahead = i + 1;
            while ahead < n - 1 && signal[ahead] == signal[i] {
                ahead += 1;
            }
            if signal[ahead] < signal[i] {
                let peak = (i + ahead - 1) / 2;
                let far_enough = peaks.last().map_or(true, |&last: &usize| peak - last >= distance);
                if signal[peak] >= height && far_enough {
                    peaks.push(peak);
                }
                i = ahead;
                continue;
            }
        }
        i += 1;
    }

    peaks
}
