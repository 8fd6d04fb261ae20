//! Three-axis accelerometer samples and cross-axis features

use serde::{Deserialize, Serialize};

use crate::error::FeatureError;
use crate::feature_set::FeatureSet;

/// Regularizer for the vertical/horizontal ratio
const RATIO_EPSILON: f64 = 1e-10;

/// Co-indexed x/y/z waveform segments of equal length
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MultiAxisSample {
    x: Vec<f64>,
    y: Vec<f64>,
    z: Vec<f64>,
}

impl MultiAxisSample {
    /// Build a sample, rejecting axes of different lengths
    pub fn new(x: Vec<f64>, y: Vec<f64>, z: Vec<f64>) -> Result<Self, FeatureError> {
        if x.len() != y.len() || x.len() != z.len() {
            return Err(FeatureError::AxisLengthMismatch {
                x: x.len(),
                y: y.len(),
                z: z.len(),
            });
        }
        Ok(Self { x, y, z })
    }

    /// X axis
    pub fn x(&self) -> &[f64] {
        &self.x
    }

    /// Y axis
    pub fn y(&self) -> &[f64] {
        &self.y
    }

    /// Z (vertical) axis
    pub fn z(&self) -> &[f64] {
        &self.z
    }

    /// Samples per axis
    pub fn len(&self) -> usize {
        self.x.len()
    }

    /// Whether the axes are empty
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    /// sqrt(x² + y² + z²)
    pub fn magnitude(&self) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.y)
            .zip(&self.z)
            .map(|((x, y), z)| (x * x + y * y + z * z).sqrt())
            .collect()
    }

    /// sqrt(x² + y²)
    pub fn horizontal(&self) -> Vec<f64> {
        self.x
            .iter()
            .zip(&self.y)
            .map(|(x, y)| (x * x + y * y).sqrt())
            .collect()
    }
}

/// Features relating the three axes to each other
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CrossAxisFeatures {
    /// max|z| / max|horizontal|
    pub vertical_horizontal_ratio: f64,
    /// Pearson correlation of x and y
    pub corr_xy: f64,
    /// Pearson correlation of x and z
    pub corr_xz: f64,
    /// Pearson correlation of y and z
    pub corr_yz: f64,
}

impl CrossAxisFeatures {
    /// Compute cross-axis features; `horizontal` is the derived horizontal series
    pub fn compute(sample: &MultiAxisSample, horizontal: &[f64]) -> Self {
        let peak = |values: &[f64]| values.iter().fold(0.0, |acc: f64, v| acc.max(v.abs()));

        Self {
            vertical_horizontal_ratio: peak(sample.z()) / (peak(horizontal) + RATIO_EPSILON),
            corr_xy: pearson(sample.x(), sample.y()),
            corr_xz: pearson(sample.x(), sample.z()),
            corr_yz: pearson(sample.y(), sample.z()),
        }
    }

    /// Append features in canonical order
    pub fn append_to(&self, set: &mut FeatureSet) {
        set.push("vertical_horizontal_ratio", self.vertical_horizontal_ratio);
        set.push("corr_xy", self.corr_xy);
        set.push("corr_xz", self.corr_xz);
        set.push("corr_yz", self.corr_yz);
    }
}

/// Pearson correlation coefficient; 0 when either series has zero variance
pub fn pearson(a: &[f64], b: &[f64]) -> f64 {
    let n = a.len().min(b.len());
    if n < 2 {
        return 0.0;
    }

    let mean_a = a[..n].iter().sum::<f64>() / n as f64;
    let mean_b = b[..n].iter().sum::<f64>() / n as f64;

    let mut cov = 0.0;
    let mut var_a = 0.0;
    let mut var_b = 0.0;
    for (x, y) in a[..n].iter().zip(&b[..n]) {
        let da = x - mean_a;
        let db = y - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }

    if var_a <= 0.0 || var_b <= 0.0 {
        return 0.0;
    }
    (cov / (var_a.sqrt() * var_b.sqrt())).clamp(-1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_axis_length_mismatch() {
        let err = MultiAxisSample::new(vec![0.0; 3], vec![0.0; 3], vec![0.0; 2]).unwrap_err();
        assert_eq!(err, FeatureError::AxisLengthMismatch { x: 3, y: 3, z: 2 });
    }

    #[test]
    fn test_derived_axes() {
        let sample = MultiAxisSample::new(vec![3.0, 0.0], vec![4.0, 0.0], vec![12.0, 2.0]).unwrap();
        assert_eq!(sample.horizontal(), vec![5.0, 0.0]);
        assert_eq!(sample.magnitude(), vec![13.0, 2.0]);
    }

    #[test]
    fn test_pearson() {
        let a = [1.0, 2.0, 3.0, 4.0];
        let b = [2.0, 4.0, 6.0, 8.0];
        let c = [4.0, 3.0, 2.0, 1.0];
        assert!((pearson(&a, &b) - 1.0).abs() < 1e-12);
        assert!((pearson(&a, &c) + 1.0).abs() < 1e-12);
        assert_eq!(pearson(&a, &[1.0; 4]), 0.0);
    }

    #[test]
    fn test_cross_axis_features() {
        let sample = MultiAxisSample::new(
            vec![1.0, -1.0, 1.0, -1.0],
            vec![1.0, -1.0, 1.0, -1.0],
            vec![4.0, 0.0, -4.0, 0.0],
        )
        .unwrap();
        let features = CrossAxisFeatures::compute(&sample, &sample.horizontal());
        assert!((features.vertical_horizontal_ratio - 4.0 / 2.0_f64.sqrt()).abs() < 1e-9);
        assert!((features.corr_xy - 1.0).abs() < 1e-12);
    }
}
