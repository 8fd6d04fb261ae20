//! FFT-based Frequency Analysis

use rustfft::{num_complex::Complex, FftPlanner};
use serde::{Deserialize, Serialize};

use crate::feature_set::FeatureSet;
use crate::statistics::mean_std;

/// Fraction of total spectral power that defines the rolloff frequency
const ROLLOFF_FRACTION: f64 = 0.85;

/// Regularizer for the spectral flatness ratio
const FLATNESS_EPSILON: f64 = 1e-10;

/// Fixed seismic frequency bands (Hz), half-open `[low, high)`
pub const FREQUENCY_BANDS: [(f64, f64); 5] = [
    (0.1, 1.0),
    (1.0, 5.0),
    (5.0, 10.0),
    (10.0, 20.0),
    (20.0, 50.0),
];

/// Feature names for [`FREQUENCY_BANDS`]
const BAND_NAMES: [&str; 5] = [
    "power_0.1_1hz",
    "power_1_5hz",
    "power_5_10hz",
    "power_10_20hz",
    "power_20_50hz",
];

/// One-sided magnitude spectrum
#[derive(Debug, Clone, Default)]
pub struct Spectrum {
    /// Bin frequencies (Hz)
    pub frequencies: Vec<f64>,
    /// Magnitude per bin, scaled by 2/N
    pub power: Vec<f64>,
}

impl Spectrum {
    /// Compute the first N/2 bins of the DFT magnitude of `signal`
    pub fn compute(signal: &[f64], sampling_rate: u32) -> Self {
        let n = signal.len();
        if n < 2 {
            return Self::default();
        }

        let mut buffer: Vec<Complex<f64>> =
            signal.iter().map(|&v| Complex::new(v, 0.0)).collect();

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(n);
        fft.process(&mut buffer);

        let scale = 2.0 / n as f64;
        let rate = sampling_rate as f64;

        let half = n / 2;
        let power = buffer.iter().take(half).map(|c| scale * c.norm()).collect();
        let frequencies = (0..half).map(|k| k as f64 * rate / n as f64).collect();

        Self { frequencies, power }
    }

    /// Number of bins
    pub fn len(&self) -> usize {
        self.power.len()
    }

    /// Whether the spectrum has no bins
    pub fn is_empty(&self) -> bool {
        self.power.is_empty()
    }
}

/// Frequency-domain descriptors of a segment
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SpectralFeatures {
    /// Mean bin power
    pub mean_power: f64,
    /// Std dev of bin power
    pub std_power: f64,
    /// Max bin power
    pub max_power: f64,
    /// Min bin power
    pub min_power: f64,
    /// Frequency of the strongest bin
    pub dominant_frequency: f64,
    /// Power-weighted mean frequency
    pub centroid: f64,
    /// Power-weighted std dev around the centroid
    pub spread: f64,
    /// Lowest frequency holding 85% of cumulative power
    pub rolloff: f64,
    /// Geometric over arithmetic mean of power
    pub flatness: f64,
    /// Summed power in each of [`FREQUENCY_BANDS`]
    pub band_power: [f64; 5],
}

impl SpectralFeatures {
    /// Compute spectral features of `signal`
    pub fn compute(signal: &[f64], sampling_rate: u32) -> Self {
        Self::from_spectrum(&Spectrum::compute(signal, sampling_rate))
    }

    /// Derive descriptors from a precomputed spectrum
    pub fn from_spectrum(spectrum: &Spectrum) -> Self {
        if spectrum.is_empty() {
            return Self::default();
        }

        let power = &spectrum.power;
        let freqs = &spectrum.frequencies;

        let (mean_power, std_power) = mean_std(power);
        let max_power = power.iter().cloned().fold(f64::MIN, f64::max);
        let min_power = power.iter().cloned().fold(f64::MAX, f64::min);

        // First bin holding the maximum
        let mut dominant_idx = 0;
        for (i, &p) in power.iter().enumerate() {
            if p > power[dominant_idx] {
                dominant_idx = i;
            }
        }
        let dominant_frequency = freqs[dominant_idx];

        let mut band_power = [0.0; 5];
        for (&f, &p) in freqs.iter().zip(power.iter()) {
            for (slot, &(low, high)) in band_power.iter_mut().zip(FREQUENCY_BANDS.iter()) {
                if f >= low && f < high {
                    *slot += p;
                }
            }
        }

        let total_power: f64 = power.iter().sum();
        if total_power <= 0.0 {
            return Self {
                mean_power,
                std_power,
                max_power,
                min_power,
                dominant_frequency,
                band_power,
                ..Default::default()
            };
        }

        let centroid = freqs
            .iter()
            .zip(power.iter())
            .map(|(f, p)| f * p)
            .sum::<f64>()
            / total_power;

        let spread = (freqs
            .iter()
            .zip(power.iter())
            .map(|(f, p)| (f - centroid) * (f - centroid) * p)
            .sum::<f64>()
            / total_power)
            .sqrt();

        let mut rolloff = freqs[freqs.len() - 1];
        let mut cumulative = 0.0;
        for (&f, &p) in freqs.iter().zip(power.iter()) {
            cumulative += p;
            if cumulative >= ROLLOFF_FRACTION * total_power {
                rolloff = f;
                break;
            }
        }

        let log_mean = power
            .iter()
            .map(|p| (p + FLATNESS_EPSILON).ln())
            .sum::<f64>()
            / power.len() as f64;
        let flatness = log_mean.exp() / (mean_power + FLATNESS_EPSILON);

        Self {
            mean_power,
            std_power,
            max_power,
            min_power,
            dominant_frequency,
            centroid,
            spread,
            rolloff,
            flatness,
            band_power,
        }
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("fft_mean", self.mean_power);
        set.push("fft_std", self.std_power);
        set.push("fft_max", self.max_power);
        set.push("fft_min", self.min_power);
        set.push("dominant_freq", self.dominant_frequency);
        set.push("spectral_centroid", self.centroid);
        set.push("spectral_spread", self.spread);
        set.push("spectral_rolloff", self.rolloff);
        set.push("spectral_flatness", self.flatness);
        for (name, value) in BAND_NAMES.iter().zip(self.band_power.iter()) {
            set.push(*name, *value);
        }
    }
}

/// Analytic signal of `signal` (real part = input, imaginary part = Hilbert transform)
pub fn analytic_signal(signal: &[f64]) -> Vec<Complex<f64>> {
    let n = signal.len();
    if n == 0 {
        return Vec::new();
    }

    let mut planner = FftPlanner::<f64>::new();
    let forward = planner.plan_fft_forward(n);
    let inverse = planner.plan_fft_inverse(n);

    let mut buffer: Vec<Complex<f64>> = signal.iter().map(|&x| Complex::new(x, 0.0)).collect();
    forward.process(&mut buffer);

    // Keep DC (and Nyquist for even n), double positive bins, zero negative bins
    let positive_end = if n % 2 == 0 { n / 2 } else { (n + 1) / 2 };
    for bin in buffer.iter_mut().take(positive_end).skip(1) {
        *bin *= 2.0;
    }
    let negative_start = if n % 2 == 0 { n / 2 + 1 } else { (n + 1) / 2 };
    for bin in buffer.iter_mut().skip(negative_start) {
        *bin = Complex::new(0.0, 0.0);
    }

    inverse.process(&mut buffer);

    let scale = 1.0 / n as f64;
    for c in buffer.iter_mut() {
        *c *= scale;
    }

    buffer
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, StandardNormal};
    use std::f64::consts::PI;

    fn sine(freq: f64, sampling_rate: u32, n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| (2.0 * PI * freq * i as f64 / sampling_rate as f64).sin())
            .collect()
    }

    #[test]
    fn test_dominant_frequency_detection() {
        let signal = sine(5.0, 100, 1000);
        let features = SpectralFeatures::compute(&signal, 100);
        assert!((features.dominant_frequency - 5.0).abs() < 1.0);
        // Power concentrated in the 5-10 Hz band
        assert!(features.band_power[2] > features.band_power[0]);
        assert!(features.band_power[2] > features.band_power[4]);
    }

    #[test]
    fn test_sine_amplitude_scaling() {
        // Exact bin: 2/N scaling recovers the amplitude
        let signal: Vec<f64> = sine(10.0, 100, 1000).iter().map(|v| 3.0 * v).collect();
        let features = SpectralFeatures::compute(&signal, 100);
        assert!((features.max_power - 3.0).abs() < 1e-6);
        assert!((features.dominant_frequency - 10.0).abs() < 1e-9);
        assert!((features.centroid - 10.0).abs() < 0.1);
    }

    #[test]
    fn test_spectrum_bins() {
        let spectrum = Spectrum::compute(&[0.0; 10], 100);
        assert_eq!(spectrum.len(), 5);
        assert_eq!(spectrum.frequencies, vec![0.0, 10.0, 20.0, 30.0, 40.0]);
    }

    #[test]
    fn test_zero_power_degenerate() {
        let features = SpectralFeatures::compute(&[0.0; 128], 100);
        assert_eq!(features.centroid, 0.0);
        assert_eq!(features.spread, 0.0);
        assert_eq!(features.rolloff, 0.0);
        assert_eq!(features.flatness, 0.0);
        assert_eq!(features.dominant_frequency, 0.0);
    }

    #[test]
    fn test_empty_signal() {
        let features = SpectralFeatures::compute(&[], 100);
        assert_eq!(features, SpectralFeatures::default());
        let single = SpectralFeatures::compute(&[1.0], 100);
        assert_eq!(single, SpectralFeatures::default());
    }

    #[test]
    fn test_noise_features_finite() {
        let mut rng = StdRng::seed_from_u64(11);
        let signal: Vec<f64> = (0..1000).map(|_| StandardNormal.sample(&mut rng)).collect();
        let features = SpectralFeatures::compute(&signal, 100);

        let mut set = FeatureSet::new();
        features.append_to(&mut set);
        assert_eq!(set.len(), 14);
        for name in ["fft_mean", "fft_std", "spectral_centroid", "spectral_rolloff", "spectral_flatness"] {
            assert!(set.get(name).is_some_and(f64::is_finite), "{name}");
        }
        for name in BAND_NAMES {
            assert!(set.get(name).is_some(), "{name}");
        }
        assert!(features.flatness > 0.0 && features.flatness <= 1.0 + 1e-9);
    }

    #[test]
    fn test_analytic_signal_of_cosine() {
        // Envelope of a whole-period cosine is flat
        let n = 256;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 8.0 * i as f64 / n as f64).cos())
            .collect();
        let analytic = analytic_signal(&signal);
        for (c, x) in analytic.iter().zip(signal.iter()) {
            assert!((c.re - x).abs() < 1e-9);
            assert!((c.norm() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_analytic_signal_odd_length() {
        let n = 255;
        let signal: Vec<f64> = (0..n)
            .map(|i| (2.0 * PI * 5.0 * i as f64 / n as f64).sin())
            .collect();
        let analytic = analytic_signal(&signal);
        assert_eq!(analytic.len(), n);
        for c in &analytic {
            assert!((c.norm() - 1.0).abs() < 1e-9);
        }
    }
}
