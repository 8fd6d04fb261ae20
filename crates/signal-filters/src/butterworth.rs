//! Streaming Butterworth Bandpass
//!
//! Order-N low-pass at the upper cutoff cascaded with an order-N high-pass at
//! the lower cutoff. Each edge is split into second-order sections (plus one
//! first-order section for odd N) designed by bilinear transform with the
//! cutoff pre-warped, so the magnitude response is exactly Butterworth.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::FilterError;

/// Highest supported order per band edge
pub const MAX_ORDER: usize = 8;

/// Bandpass design parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandpassConfig {
    /// Sampling frequency (Hz)
    pub sample_rate: f64,
    /// Lower passband edge (Hz)
    pub low_cutoff: f64,
    /// Upper passband edge (Hz)
    pub high_cutoff: f64,
    /// Butterworth order applied at each edge
    pub order: usize,
}

impl Default for BandpassConfig {
    fn default() -> Self {
        Self {
            sample_rate: 100.0,
            low_cutoff: 0.5,
            high_cutoff: 10.0,
            order: 2,
        }
    }
}

impl BandpassConfig {
    /// Check every parameter against the sampling rate
    pub fn validate(&self) -> Result<(), FilterError> {
        if !self.sample_rate.is_finite() || self.sample_rate <= 0.0 {
            return Err(FilterError::invalid(
                "sample_rate",
                self.sample_rate,
                "must be positive and finite",
            ));
        }
        let nyquist = self.sample_rate / 2.0;
        if !self.low_cutoff.is_finite() || self.low_cutoff <= 0.0 || self.low_cutoff >= nyquist {
            return Err(FilterError::invalid(
                "low_cutoff",
                self.low_cutoff,
                "must lie strictly between 0 and Nyquist",
            ));
        }
        if !self.high_cutoff.is_finite() || self.high_cutoff <= 0.0 || self.high_cutoff >= nyquist {
            return Err(FilterError::invalid(
                "high_cutoff",
                self.high_cutoff,
                "must lie strictly between 0 and Nyquist",
            ));
        }
        if self.low_cutoff >= self.high_cutoff {
            return Err(FilterError::invalid(
                "low_cutoff",
                self.low_cutoff,
                "must be below high_cutoff",
            ));
        }
        if self.order == 0 || self.order > MAX_ORDER {
            return Err(FilterError::invalid(
                "order",
                self.order as f64,
                "must be between 1 and 8",
            ));
        }
        Ok(())
    }
}

/// A single biquad (second-order section) filter.
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// Using Direct Form II Transposed for better numerical properties.
#[derive(Debug, Clone)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalized to 1)
    a: [f64; 2],
    /// Delay line
    state: [f64; 2],
}

impl Biquad {
    /// Create a section from normalized coefficients
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self {
            b,
            a,
            state: [0.0; 2],
        }
    }

    /// Process one sample
    pub fn process(&mut self, input: f64) -> f64 {
        let output = self.b[0] * input + self.state[0];
        self.state[0] = self.b[1] * input - self.a[0] * output + self.state[1];
        self.state[1] = self.b[2] * input - self.a[1] * output;
        output
    }

    /// Clear the delay line
    pub fn reset(&mut self) {
        self.state = [0.0; 2];
    }

    /// Numerator coefficients
    pub fn numerator(&self) -> &[f64; 3] {
        &self.b
    }

    /// Denominator coefficients [a1, a2]
    pub fn denominator(&self) -> &[f64; 2] {
        &self.a
    }

    /// Poles inside the unit circle
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Edge {
    Lowpass,
    Highpass,
}

/// Streaming Butterworth bandpass filter
#[derive(Debug, Clone)]
pub struct BandpassFilter {
    config: BandpassConfig,
    sections: Vec<Biquad>,
}

impl BandpassFilter {
    /// Design a filter; fails on invalid cutoffs, rate or order
    pub fn new(config: BandpassConfig) -> Result<Self, FilterError> {
        config.validate()?;

        let mut sections = design_edge(Edge::Lowpass, config.order, config.high_cutoff, config.sample_rate);
        sections.extend(design_edge(Edge::Highpass, config.order, config.low_cutoff, config.sample_rate));

        debug!(
            "Designed bandpass {:.2}-{:.2} Hz @ {} Hz, order {} ({} sections)",
            config.low_cutoff,
            config.high_cutoff,
            config.sample_rate,
            config.order,
            sections.len()
        );

        Ok(Self { config, sections })
    }

    /// Filter one sample, advancing the internal state
    pub fn process(&mut self, sample: f64) -> f64 {
        self.sections
            .iter_mut()
            .fold(sample, |acc, section| section.process(acc))
    }

    /// Filter a block of consecutive samples
    pub fn process_block(&mut self, samples: &[f64]) -> Vec<f64> {
        samples.iter().map(|&s| self.process(s)).collect()
    }

    /// Return to the freshly constructed state
    pub fn reset(&mut self) {
        for section in &mut self.sections {
            section.reset();
        }
    }

    /// Design parameters
    pub fn config(&self) -> &BandpassConfig {
        &self.config
    }

    /// Cascade of sections (low-pass edge first)
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// All sections stable
    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }
}

/// Sections of an order-`order` Butterworth edge at `cutoff_hz`
fn design_edge(edge: Edge, order: usize, cutoff_hz: f64, sample_rate: f64) -> Vec<Biquad> {
    let w0 = 2.0 * PI * cutoff_hz / sample_rate;
    let cos_w0 = w0.cos();
    let sin_w0 = w0.sin();

    let mut sections = Vec::with_capacity(order.div_ceil(2));

    // Conjugate pole pairs -> one biquad each, Q from the pole angle
    for k in 0..order / 2 {
        let theta = PI * (2 * k + 1) as f64 / (2 * order) as f64;
        let q = 1.0 / (2.0 * theta.cos());
        let alpha = sin_w0 / (2.0 * q);
        let a0 = 1.0 + alpha;

        let b = match edge {
            Edge::Lowpass => {
                let h = (1.0 - cos_w0) / 2.0;
                [h, 1.0 - cos_w0, h]
            }
            Edge::Highpass => {
                let h = (1.0 + cos_w0) / 2.0;
                [h, -(1.0 + cos_w0), h]
            }
        };

        sections.push(Biquad::new(
            [b[0] / a0, b[1] / a0, b[2] / a0],
            [-2.0 * cos_w0 / a0, (1.0 - alpha) / a0],
        ));
    }

    // Real pole for odd orders
    if order % 2 == 1 {
        let k = (w0 / 2.0).tan();
        let norm = 1.0 / (1.0 + k);
        let a1 = (k - 1.0) * norm;
        let b = match edge {
            Edge::Lowpass => [k * norm, k * norm, 0.0],
            Edge::Highpass => [norm, -norm, 0.0],
        };
        sections.push(Biquad::new(b, [a1, 0.0]));
    }

    sections
}
