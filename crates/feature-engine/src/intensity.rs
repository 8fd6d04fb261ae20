//! Seismic intensity measures from an acceleration record

use serde::{Deserialize, Serialize};

use crate::feature_set::FeatureSet;

/// Standard gravity (m/s²)
pub const STANDARD_GRAVITY: f64 = 9.81;

/// Cumulative-energy fractions bounding the significant duration
const DURATION_START_FRACTION: f64 = 0.05;
const DURATION_END_FRACTION: f64 = 0.95;

/// Ground-motion intensity measures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IntensityFeatures {
    /// Peak ground velocity
    pub pgv: f64,
    /// Peak ground displacement
    pub pgd: f64,
    /// Peak ground acceleration (g)
    pub pga: f64,
    /// Cumulative absolute velocity (g·s)
    pub cav: f64,
    /// Arias intensity
    pub arias_intensity: f64,
    /// Seconds between 5% and 95% cumulative energy
    pub significant_duration: f64,
}

impl IntensityFeatures {
    /// Compute intensity measures for an acceleration segment (m/s²)
    pub fn compute(acceleration: &[f64], sampling_rate: u32) -> Self {
        if acceleration.is_empty() || sampling_rate == 0 {
            return Self::default();
        }

        let dt = 1.0 / sampling_rate as f64;
        let velocity = cumulative_integral(acceleration, dt);
        let displacement = cumulative_integral(&velocity, dt);

        let sum_abs: f64 = acceleration.iter().map(|a| a.abs()).sum();
        let sum_sq: f64 = acceleration.iter().map(|a| a * a).sum();

        Self {
            pgv: peak_abs(&velocity),
            pgd: peak_abs(&displacement),
            pga: peak_abs(acceleration) / STANDARD_GRAVITY,
            cav: sum_abs * dt / STANDARD_GRAVITY,
            arias_intensity: std::f64::consts::PI / (2.0 * STANDARD_GRAVITY) * sum_sq * dt,
            significant_duration: significant_duration(acceleration, sampling_rate),
        }
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("pgv", self.pgv);
        set.push("pgd", self.pgd);
        set.push("pga", self.pga);
        set.push("cav", self.cav);
        set.push("arias_intensity", self.arias_intensity);
        set.push("significant_duration", self.significant_duration);
    }
}

/// Time between 5% and 95% of cumulative squared acceleration, in seconds.
///
/// Returns 0 when the record carries no energy.
pub fn significant_duration(acceleration: &[f64], sampling_rate: u32) -> f64 {
    if acceleration.is_empty() || sampling_rate == 0 {
        return 0.0;
    }

    let dt = 1.0 / sampling_rate as f64;
    let cumulative = cumulative_integral(&acceleration.iter().map(|a| a * a).collect::<Vec<_>>(), dt);
    let total = cumulative[cumulative.len() - 1];
    if total <= 0.0 {
        return 0.0;
    }

    let first_reaching =
        |fraction: f64| cumulative.iter().position(|&e| e / total >= fraction);

    match (
        first_reaching(DURATION_START_FRACTION),
        first_reaching(DURATION_END_FRACTION),
    ) {
        (Some(start), Some(end)) => end.saturating_sub(start) as f64 / sampling_rate as f64,
        _ => 0.0,
    }
}

/// Rectangle-rule running integral
fn cumulative_integral(values: &[f64], dt: f64) -> Vec<f64> {
    let mut sum = 0.0;
    values
        .iter()
        .map(|v| {
            sum += v;
            sum * dt
        })
        .collect()
}

fn peak_abs(values: &[f64]) -> f64 {
    values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()))
}
