//! Feature Extraction Error Types

use thiserror::Error;

/// Errors raised by extractor configuration and batch feature assembly
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    /// Sampling rate must be at least 1 Hz
    #[error("Invalid sampling rate: {0} Hz (must be >= 1)")]
    InvalidSamplingRate(u32),

    /// STA/LTA window that cannot produce a kernel
    #[error("Invalid {name} window of {seconds}s at {sampling_rate} Hz: {reason}")]
    InvalidWindow {
        name: &'static str,
        seconds: f64,
        sampling_rate: u32,
        reason: &'static str,
    },

    /// Multi-axis sample with axes of different lengths
    #[error("Axis length mismatch: x={x}, y={y}, z={z}")]
    AxisLengthMismatch { x: usize, y: usize, z: usize },

    /// `fit` needs at least one representative sample
    #[error("Cannot fit on an empty batch")]
    EmptyBatch,

    /// A transformed row does not carry a fitted feature name
    #[error("Feature '{0}' missing from extracted row (was the builder fitted on a different input kind?)")]
    FeatureMismatch(String),
}
