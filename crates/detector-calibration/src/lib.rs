//! STA/LTA Detector Calibration
//!
//! Grid-searches trigger windows and thresholds against labeled earthquake and
//! non-earthquake waveforms, keeping the operating point with the best F1.

mod calibrator;
mod error;
mod grid;
mod metrics;
mod params;

pub use calibrator::DetectorCalibrator;
pub use error::CalibrationError;
pub use grid::{CalibrationGrid, Candidate};
pub use metrics::ConfusionCounts;
pub use params::{CalibrationConfig, CalibrationResult, DetectorParams, ParameterRange};
