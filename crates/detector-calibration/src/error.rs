//! Calibration Error Types

use feature_engine::FeatureError;
use thiserror::Error;

/// Errors raised while setting up or running a calibration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalibrationError {
    /// Search range that cannot be sampled
    #[error("Invalid {name} range [{min}, {max}]: {reason}")]
    InvalidRange {
        name: &'static str,
        min: f64,
        max: f64,
        reason: &'static str,
    },

    /// Scalar setting outside its allowed domain
    #[error("Invalid calibration parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: &'static str,
        value: f64,
        reason: &'static str,
    },

    #[error("Invalid sampling rate: {0} Hz (must be >= 1)")]
    InvalidSamplingRate(u32),

    #[error(transparent)]
    Feature(#[from] FeatureError),
}
