//! Detector parameters and calibration settings

use serde::{Deserialize, Serialize};

use crate::error::CalibrationError;

/// STA/LTA trigger operating point consumed by the online detector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    /// Short-term window (seconds)
    pub sta_window: f64,
    /// Long-term window (seconds)
    pub lta_window: f64,
    /// Ratio that declares a trigger
    pub trigger_threshold: f64,
    /// Ratio below which a trigger ends
    pub detrigger_threshold: f64,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            sta_window: 1.0,
            lta_window: 30.0,
            trigger_threshold: 5.0,
            detrigger_threshold: 2.0,
        }
    }
}

/// Best operating point of one calibration run with its scores
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub params: DetectorParams,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Closed interval sampled with evenly spaced points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// Reject non-finite, non-positive or inverted ranges
    pub fn validate(&self, name: &'static str) -> Result<(), CalibrationError> {
        let invalid = |reason| CalibrationError::InvalidRange {
            name,
            min: self.min,
            max: self.max,
            reason,
        };

        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid("bounds must be finite"));
        }
        if self.min <= 0.0 {
            return Err(invalid("bounds must be positive"));
        }
        if self.max < self.min {
            return Err(invalid("max is below min"));
        }
        Ok(())
    }

    /// `steps` evenly spaced values from `min` to `max` inclusive
    pub fn linspace(&self, steps: usize) -> Vec<f64> {
        match steps {
            0 => Vec::new(),
            1 => vec![self.min],
            _ => {
                let step = (self.max - self.min) / (steps - 1) as f64;
                (0..steps)
                    .map(|i| {
                        if i == steps - 1 {
                            self.max
                        } else {
                            self.min + step * i as f64
                        }
                    })
                    .collect()
            }
        }
    }
}

/// Calibration search configuration
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CalibrationConfig {
    /// Sampling rate of every supplied waveform (Hz)
    pub sampling_rate: u32,
    /// STA window range (seconds)
    pub sta_range: ParameterRange,
    /// LTA window range (seconds)
    pub lta_range: ParameterRange,
    /// Trigger threshold range
    pub threshold_range: ParameterRange,
    pub sta_steps: usize,
    pub lta_steps: usize,
    pub threshold_steps: usize,
    /// A cell is searched only if lta > min_lta_sta_ratio * sta
    pub min_lta_sta_ratio: f64,
    /// Detrigger threshold as a fraction of the trigger threshold
    pub detrigger_fraction: f64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            sampling_rate: 100,
            sta_range: ParameterRange::new(0.5, 2.0),
            lta_range: ParameterRange::new(10.0, 60.0),
            threshold_range: ParameterRange::new(2.0, 10.0),
            sta_steps: 5,
            lta_steps: 5,
            threshold_steps: 10,
            min_lta_sta_ratio: 5.0,
            detrigger_fraction: 0.4,
        }
    }
}

impl CalibrationConfig {
    /// Default search at a given sampling rate
    pub fn with_sampling_rate(sampling_rate: u32) -> Self {
        Self {
            sampling_rate,
            ..Default::default()
        }
    }

    /// Same settings with different search ranges
    pub fn with_ranges(
        self,
        sta_range: ParameterRange,
        lta_range: ParameterRange,
        threshold_range: ParameterRange,
    ) -> Self {
        Self {
            sta_range,
            lta_range,
            threshold_range,
            ..self
        }
    }

    pub fn validate(&self) -> Result<(), CalibrationError> {
        if self.sampling_rate == 0 {
            return Err(CalibrationError::InvalidSamplingRate(self.sampling_rate));
        }
        self.sta_range.validate("sta")?;
        self.lta_range.validate("lta")?;
        self.threshold_range.validate("threshold")?;

        for (name, steps) in [
            ("sta_steps", self.sta_steps),
            ("lta_steps", self.lta_steps),
            ("threshold_steps", self.threshold_steps),
        ] {
            if steps == 0 {
                return Err(CalibrationError::InvalidParameter {
                    name,
                    value: 0.0,
                    reason: "at least one grid point is required",
                });
            }
        }

        if !self.min_lta_sta_ratio.is_finite() || self.min_lta_sta_ratio < 1.0 {
            return Err(CalibrationError::InvalidParameter {
                name: "min_lta_sta_ratio",
                value: self.min_lta_sta_ratio,
                reason: "must be finite and at least 1",
            });
        }
        if !(self.detrigger_fraction > 0.0 && self.detrigger_fraction <= 1.0) {
            return Err(CalibrationError::InvalidParameter {
                name: "detrigger_fraction",
                value: self.detrigger_fraction,
                reason: "must lie in (0, 1]",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linspace_matches_endpoints() {
        let range = ParameterRange::new(2.0, 10.0);
        let values = range.linspace(10);
        assert_eq!(values.len(), 10);
        assert_eq!(values[0], 2.0);
        assert_eq!(values[9], 10.0);
        assert!((values[1] - (2.0 + 8.0 / 9.0)).abs() < 1e-12);

        assert_eq!(range.linspace(1), vec![2.0]);
        assert!(range.linspace(0).is_empty());
        assert_eq!(ParameterRange::new(0.5, 2.0).linspace(5), vec![0.5, 0.875, 1.25, 1.625, 2.0]);
    }

    #[test]
    fn test_range_validation() {
        assert!(ParameterRange::new(1.0, 1.0).validate("sta").is_ok());
        assert!(ParameterRange::new(0.0, 1.0).validate("sta").is_err());
        assert!(ParameterRange::new(2.0, 1.0).validate("sta").is_err());
        assert!(matches!(
            ParameterRange::new(1.0, f64::INFINITY).validate("lta"),
            Err(CalibrationError::InvalidRange { name: "lta", .. })
        ));
    }

    #[test]
    fn test_config_validation() {
        assert!(CalibrationConfig::default().validate().is_ok());
        assert_eq!(
            CalibrationConfig::with_sampling_rate(0).validate(),
            Err(CalibrationError::InvalidSamplingRate(0))
        );

        let config = CalibrationConfig {
            threshold_steps: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = CalibrationConfig {
            detrigger_fraction: 1.5,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_default_params() {
        let params = DetectorParams::default();
        assert_eq!(params.sta_window, 1.0);
        assert_eq!(params.lta_window, 30.0);
        assert_eq!(params.trigger_threshold, 5.0);
        assert_eq!(params.detrigger_threshold, 2.0);
    }
}
