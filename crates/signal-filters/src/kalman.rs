//! Scalar Kalman smoother
//!
//! Random-walk state model with direct observation. Each update predicts by
//! inflating the error covariance with the process noise, then blends the
//! measurement in with the resulting gain.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::FilterError;

const INITIAL_COVARIANCE: f64 = 1.0;
const INITIAL_ESTIMATE: f64 = 0.0;

/// Noise model of the smoother
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KalmanConfig {
    /// Process noise covariance (Q)
    pub process_noise: f64,
    /// Measurement noise covariance (R)
    pub measurement_noise: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise: 0.01,
            measurement_noise: 0.1,
        }
    }
}

impl KalmanConfig {
    pub fn validate(&self) -> Result<(), FilterError> {
        if !self.process_noise.is_finite() || self.process_noise < 0.0 {
            return Err(FilterError::invalid(
                "process_noise",
                self.process_noise,
                "must be non-negative and finite",
            ));
        }
        if !self.measurement_noise.is_finite() || self.measurement_noise <= 0.0 {
            return Err(FilterError::invalid(
                "measurement_noise",
                self.measurement_noise,
                "must be positive and finite",
            ));
        }
        Ok(())
    }
}

/// One-dimensional Kalman filter for smoothing a noisy scalar stream
#[derive(Debug, Clone)]
pub struct KalmanSmoother {
    config: KalmanConfig,
    /// Error covariance (P)
    covariance: f64,
    /// Last gain (K)
    gain: f64,
    /// State estimate (X)
    estimate: f64,
}

impl KalmanSmoother {
    pub fn new(config: KalmanConfig) -> Result<Self, FilterError> {
        config.validate()?;
        Ok(Self {
            config,
            covariance: INITIAL_COVARIANCE,
            gain: 0.0,
            estimate: INITIAL_ESTIMATE,
        })
    }

    /// Fold one measurement into the estimate and return the new estimate
    pub fn update(&mut self, measurement: f64) -> f64 {
        // Predict
        self.covariance += self.config.process_noise;

        // Correct
        self.gain = self.covariance / (self.covariance + self.config.measurement_noise);
        self.estimate += self.gain * (measurement - self.estimate);
        self.covariance *= 1.0 - self.gain;

        trace!(
            "Kalman update: z={:.4}, x={:.4}, k={:.4}",
            measurement,
            self.estimate,
            self.gain
        );

        self.estimate
    }

    /// Smooth a block of consecutive measurements
    pub fn update_block(&mut self, measurements: &[f64]) -> Vec<f64> {
        measurements.iter().map(|&m| self.update(m)).collect()
    }

    /// Back to P=1, X=0
    pub fn reset(&mut self) {
        self.covariance = INITIAL_COVARIANCE;
        self.gain = 0.0;
        self.estimate = INITIAL_ESTIMATE;
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn error_covariance(&self) -> f64 {
        self.covariance
    }

    pub fn gain(&self) -> f64 {
        self.gain
    }

    pub fn config(&self) -> &KalmanConfig {
        &self.config
    }
}
