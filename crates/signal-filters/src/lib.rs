//! Streaming Signal Filters
//!
//! Sample-at-a-time preprocessors for waveform streams: a Butterworth
//! bandpass and a scalar Kalman smoother. Each instance owns its own state;
//! use one instance per stream.

mod butterworth;
mod error;
mod kalman;

pub use butterworth::{BandpassConfig, BandpassFilter, Biquad, MAX_ORDER};
pub use error::FilterError;
pub use kalman::{KalmanConfig, KalmanSmoother};
