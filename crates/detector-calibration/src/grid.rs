//! Search grid over (sta, lta, threshold)

use crate::error::CalibrationError;
use crate::params::CalibrationConfig;

/// One point of the search
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub sta_window: f64,
    pub lta_window: f64,
    pub threshold: f64,
}

/// Evenly spaced axis values plus the lta/sta validity rule
#[derive(Debug, Clone, PartialEq)]
pub struct CalibrationGrid {
    sta_values: Vec<f64>,
    lta_values: Vec<f64>,
    thresholds: Vec<f64>,
    min_lta_sta_ratio: f64,
}

impl CalibrationGrid {
    pub fn new(config: &CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self {
            sta_values: config.sta_range.linspace(config.sta_steps),
            lta_values: config.lta_range.linspace(config.lta_steps),
            thresholds: config.threshold_range.linspace(config.threshold_steps),
            min_lta_sta_ratio: config.min_lta_sta_ratio,
        })
    }

    pub fn sta_values(&self) -> &[f64] {
        &self.sta_values
    }

    pub fn lta_values(&self) -> &[f64] {
        &self.lta_values
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    /// Whether a window pair is searched
    pub fn is_valid_cell(&self, sta_window: f64, lta_window: f64) -> bool {
        lta_window > self.min_lta_sta_ratio * sta_window
    }

    /// Valid (sta, lta) pairs, sta-major, both ascending
    pub fn cells(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.sta_values
            .iter()
            .flat_map(move |&sta| self.lta_values.iter().map(move |&lta| (sta, lta)))
            .filter(move |&(sta, lta)| self.is_valid_cell(sta, lta))
    }

    /// Valid (sta, lta, threshold) triples in search order
    pub fn candidates(&self) -> impl Iterator<Item = Candidate> + '_ {
        self.cells().flat_map(move |(sta_window, lta_window)| {
            self.thresholds.iter().map(move |&threshold| Candidate {
                sta_window,
                lta_window,
                threshold,
            })
        })
    }
}
