//! Extractor configuration

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;

/// Default waveform sampling rate (Hz)
pub const DEFAULT_SAMPLING_RATE: u32 = 100;

/// Settings shared by every analyzer in one extraction run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExtractorConfig {
    /// Samples per second
    pub sampling_rate: u32,
    /// Short-term average window (seconds)
    pub sta_window_s: f64,
    /// Long-term average window (seconds)
    pub lta_window_s: f64,
    /// Ratio above which a sample counts toward `sta_lta_trigger_count`
    pub trigger_ratio: f64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            sampling_rate: DEFAULT_SAMPLING_RATE,
            sta_window_s: 1.0,
            lta_window_s: 30.0,
            trigger_ratio: 5.0,
        }
    }
}

impl ExtractorConfig {
    /// Default config at a given sampling rate
    pub fn with_sampling_rate(sampling_rate: u32) -> Self {
        Self {
            sampling_rate,
            ..Default::default()
        }
    }

    /// Sample interval in seconds
    pub fn dt(&self) -> f64 {
        1.0 / self.sampling_rate as f64
    }

    /// Check that the rate and both windows can be used
    pub fn validate(&self) -> Result<(), FeatureError> {
        if self.sampling_rate == 0 {
            return Err(FeatureError::InvalidSamplingRate(self.sampling_rate));
        }
        crate::sta_lta::window_samples("sta", self.sta_window_s, self.sampling_rate)?;
        crate::sta_lta::window_samples("lta", self.lta_window_s, self.sampling_rate)?;
        Ok(())
    }
}
