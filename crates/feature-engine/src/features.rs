//! Feature Vector Assembly

use ndarray::{Array2, ArrayView1};
use tracing::{debug, info};

use crate::config::ExtractorConfig;
use crate::error::FeatureError;
use crate::feature_set::FeatureSet;
use crate::intensity::IntensityFeatures;
use crate::multi_axis::{CrossAxisFeatures, MultiAxisSample};
use crate::spectral::SpectralFeatures;
use crate::sta_lta::StaLtaFeatures;
use crate::statistics::StatisticalFeatures;
use crate::time_domain::TimeDomainFeatures;

/// Number of features produced for one axis
pub const SINGLE_AXIS_FEATURE_COUNT: usize = 59;

/// Number of features produced for a three-axis sample (5 axes + 4 cross-axis)
pub const MULTI_AXIS_FEATURE_COUNT: usize = 5 * SINGLE_AXIS_FEATURE_COUNT + 4;

/// Run every single-axis analyzer over `segment`
pub fn extract_all_features(
    segment: &[f64],
    config: &ExtractorConfig,
) -> Result<FeatureSet, FeatureError> {
    let rate = config.sampling_rate;
    let mut set = FeatureSet::with_capacity(SINGLE_AXIS_FEATURE_COUNT);

    StatisticalFeatures::compute(segment).append_to(&mut set);
    SpectralFeatures::compute(segment, rate).append_to(&mut set);
    TimeDomainFeatures::compute(segment, rate).append_to(&mut set);
    IntensityFeatures::compute(segment, rate).append_to(&mut set);
    StaLtaFeatures::compute(
        segment,
        rate,
        config.sta_window_s,
        config.lta_window_s,
        config.trigger_ratio,
    )?
    .append_to(&mut set);

    Ok(set)
}

/// Run the single-axis pipeline on x, y, z, magnitude and horizontal, then add
/// cross-axis features
pub fn extract_multi_axis_features(
    sample: &MultiAxisSample,
    config: &ExtractorConfig,
) -> Result<FeatureSet, FeatureError> {
    let magnitude = sample.magnitude();
    let horizontal = sample.horizontal();

    let mut set = FeatureSet::with_capacity(MULTI_AXIS_FEATURE_COUNT);
    let axes: [(&str, &[f64]); 5] = [
        ("x", sample.x()),
        ("y", sample.y()),
        ("z", sample.z()),
        ("mag", &magnitude),
        ("horiz", &horizontal),
    ];
    for (prefix, axis) in axes {
        set.extend_prefixed(prefix, extract_all_features(axis, config)?);
    }

    CrossAxisFeatures::compute(sample, &horizontal).append_to(&mut set);
    Ok(set)
}

/// Input that can be turned into one row of the feature matrix
pub trait Extractable: Sync {
    /// Extract the named features of this sample
    fn extract(&self, config: &ExtractorConfig) -> Result<FeatureSet, FeatureError>;
}

impl Extractable for [f64] {
    fn extract(&self, config: &ExtractorConfig) -> Result<FeatureSet, FeatureError> {
        extract_all_features(self, config)
    }
}

impl Extractable for Vec<f64> {
    fn extract(&self, config: &ExtractorConfig) -> Result<FeatureSet, FeatureError> {
        extract_all_features(self, config)
    }
}

impl Extractable for MultiAxisSample {
    fn extract(&self, config: &ExtractorConfig) -> Result<FeatureSet, FeatureError> {
        extract_multi_axis_features(self, config)
    }
}

impl<T: Extractable + ?Sized> Extractable for &T {
    fn extract(&self, config: &ExtractorConfig) -> Result<FeatureSet, FeatureError> {
        (**self).extract(config)
    }
}

/// Feature-name lifecycle of a builder
#[derive(Debug, Clone, PartialEq)]
enum FitState {
    Unfitted,
    Fitted(Vec<String>),
}

/// Turns batches of waveforms into a feature matrix with a fixed column order.
///
/// The column order is fixed by `fit` (from the first sample) and reused by
/// every later `transform`. Calling `transform` on an unfitted builder fixes the
/// order from the first transformed row instead.
#[derive(Debug, Clone)]
pub struct FeatureVectorBuilder {
    config: ExtractorConfig,
    state: FitState,
}

impl FeatureVectorBuilder {
    /// Create a builder; fails if the configuration is unusable
    pub fn new(config: ExtractorConfig) -> Result<Self, FeatureError> {
        config.validate()?;
        Ok(Self {
            config,
            state: FitState::Unfitted,
        })
    }

    /// Builder with default windows at the given sampling rate
    pub fn with_sampling_rate(sampling_rate: u32) -> Result<Self, FeatureError> {
        Self::new(ExtractorConfig::with_sampling_rate(sampling_rate))
    }

    /// Extraction settings
    pub fn config(&self) -> &ExtractorConfig {
        &self.config
    }

    /// Whether the feature names have been fixed
    pub fn is_fitted(&self) -> bool {
        matches!(self.state, FitState::Fitted(_))
    }

    /// Fix the feature names from the first sample of `samples`
    pub fn fit<S: Extractable>(&mut self, samples: &[S]) -> Result<&mut Self, FeatureError> {
        let first = samples.first().ok_or(FeatureError::EmptyBatch)?;
        let names: Vec<String> = first.extract(&self.config)?.names().map(String::from).collect();

        info!("Fitted feature builder: {} features", names.len());
        self.state = FitState::Fitted(names);
        Ok(self)
    }

    /// Extract every sample into a (samples × features) matrix
    pub fn transform<S: Extractable>(&mut self, samples: &[S]) -> Result<Array2<f64>, FeatureError> {
        let rows = self.extract_rows(samples)?;

        if self.state == FitState::Unfitted {
            match rows.first() {
                Some(first) => {
                    debug!("Inferring feature names from first transformed row");
                    self.state = FitState::Fitted(first.names().map(String::from).collect());
                }
                None => return Ok(Array2::zeros((0, 0))),
            }
        }
        let names = self.get_feature_names();

        let mut matrix = Array2::zeros((rows.len(), names.len()));
        for (i, row) in rows.iter().enumerate() {
            let values = row_values(names, row)?;
            matrix.row_mut(i).assign(&ArrayView1::from(values.as_slice()));
        }

        debug!("Transformed {} samples into {:?} matrix", rows.len(), matrix.dim());
        Ok(matrix)
    }

    /// `fit` followed by `transform` on the same batch
    pub fn fit_transform<S: Extractable>(&mut self, samples: &[S]) -> Result<Array2<f64>, FeatureError> {
        self.fit(samples)?;
        self.transform(samples)
    }

    /// Fixed feature names (empty until fitted)
    pub fn get_feature_names(&self) -> &[String] {
        match &self.state {
            FitState::Fitted(names) => names,
            FitState::Unfitted => &[],
        }
    }

    #[cfg(not(feature = "parallel"))]
    fn extract_rows<S: Extractable>(&self, samples: &[S]) -> Result<Vec<FeatureSet>, FeatureError> {
        samples.iter().map(|s| s.extract(&self.config)).collect()
    }

    #[cfg(feature = "parallel")]
    fn extract_rows<S: Extractable>(&self, samples: &[S]) -> Result<Vec<FeatureSet>, FeatureError> {
        use rayon::prelude::*;
        samples.par_iter().map(|s| s.extract(&self.config)).collect()
    }
}

/// Values of `row` in the order of `names`
fn row_values(names: &[String], row: &FeatureSet) -> Result<Vec<f64>, FeatureError> {
    if row.len() == names.len() && row.names().zip(names).all(|(a, b)| a == b.as_str()) {
        return Ok(row.values());
    }
    names
        .iter()
        .map(|name| row.get(name).ok_or_else(|| FeatureError::FeatureMismatch(name.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rand_distr::{Distribution, StandardNormal};

    fn noise_batch(rng: &mut StdRng, rows: usize, len: usize) -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| (0..len).map(|_| StandardNormal.sample(&mut *rng)).collect())
            .collect()
    }

    #[test]
    fn test_all_features_count_and_finite() {
        let mut rng = StdRng::seed_from_u64(42);
        let signal = noise_batch(&mut rng, 1, 6000).remove(0);
        let features = extract_all_features(&signal, &ExtractorConfig::default()).unwrap();

        assert_eq!(features.len(), SINGLE_AXIS_FEATURE_COUNT);
        assert!(features.len() > 50);
        for (name, value) in features.iter() {
            assert!(!value.is_nan(), "Feature {name} is NaN");
            assert!(!value.is_infinite(), "Feature {name} is Inf");
        }
    }

    #[test]
    fn test_degenerate_segments_are_finite() {
        let config = ExtractorConfig::default();
        for segment in [vec![0.0; 300], vec![1.5; 300], vec![0.0; 2], vec![]] {
            let features = extract_all_features(&segment, &config).unwrap();
            assert_eq!(features.len(), SINGLE_AXIS_FEATURE_COUNT);
            assert!(features.iter().all(|(_, v)| v.is_finite()));
        }
    }

    #[test]
    fn test_fit_transform() {
        let mut rng = StdRng::seed_from_u64(1);
        let batch = noise_batch(&mut rng, 10, 1000);
        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();

        let matrix = builder.fit_transform(&batch).unwrap();
        assert_eq!(matrix.nrows(), 10);
        assert!(matrix.ncols() > 50);
        assert!(matrix.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_transform_after_fit_on_different_batch() {
        let mut rng = StdRng::seed_from_u64(2);
        let train = noise_batch(&mut rng, 10, 1000);
        let test = noise_batch(&mut rng, 5, 1500);

        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();
        builder.fit(&train).unwrap();
        let fitted_names = builder.get_feature_names().to_vec();

        let train_features = builder.transform(&train).unwrap();
        let test_features = builder.transform(&test).unwrap();

        assert_eq!(train_features.ncols(), test_features.ncols());
        assert_eq!(test_features.nrows(), 5);
        assert_eq!(builder.get_feature_names(), fitted_names.as_slice());
    }

    #[test]
    fn test_transform_before_fit_infers_names() {
        let mut rng = StdRng::seed_from_u64(3);
        let batch = noise_batch(&mut rng, 3, 800);
        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();

        assert!(!builder.is_fitted());
        assert!(builder.get_feature_names().is_empty());

        let matrix = builder.transform(&batch).unwrap();
        assert!(builder.is_fitted());
        assert_eq!(matrix.ncols(), builder.get_feature_names().len());
        assert!(builder.get_feature_names().iter().all(|n| !n.is_empty()));
    }

    #[test]
    fn test_empty_batches() {
        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();
        let empty: Vec<Vec<f64>> = Vec::new();
        assert!(matches!(builder.fit(&empty), Err(FeatureError::EmptyBatch)));
        assert_eq!(builder.transform(&empty).unwrap().nrows(), 0);
        assert!(!builder.is_fitted());
    }

    #[test]
    fn test_multi_axis_features() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut axes = noise_batch(&mut rng, 3, 1200);
        let z = axes.pop().unwrap();
        let y = axes.pop().unwrap();
        let x = axes.pop().unwrap();
        let sample = MultiAxisSample::new(x, y, z).unwrap();

        let features = extract_multi_axis_features(&sample, &ExtractorConfig::default()).unwrap();
        assert_eq!(features.len(), MULTI_AXIS_FEATURE_COUNT);
        assert!(features.get("x_mean").is_some());
        assert!(features.get("horiz_sta_lta_max").is_some());
        assert!(features.get("mag_pga").is_some());

        let names: Vec<&str> = features.names().collect();
        assert_eq!(
            &names[names.len() - 4..],
            &["vertical_horizontal_ratio", "corr_xy", "corr_xz", "corr_yz"]
        );
        assert!(features.iter().all(|(_, v)| v.is_finite()));
    }

    #[test]
    fn test_multi_axis_builder() {
        let mut rng = StdRng::seed_from_u64(5);
        let samples: Vec<MultiAxisSample> = (0..3)
            .map(|_| {
                let mut axes = noise_batch(&mut rng, 3, 600);
                let z = axes.pop().unwrap();
                let y = axes.pop().unwrap();
                let x = axes.pop().unwrap();
                MultiAxisSample::new(x, y, z).unwrap()
            })
            .collect();

        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();
        let matrix = builder.fit_transform(&samples).unwrap();
        assert_eq!(matrix.dim(), (3, MULTI_AXIS_FEATURE_COUNT));
    }

    #[test]
    fn test_input_kind_mismatch() {
        let mut rng = StdRng::seed_from_u64(6);
        let mut axes = noise_batch(&mut rng, 3, 300);
        let sample = MultiAxisSample::new(axes.remove(0), axes.remove(0), axes.remove(0)).unwrap();

        let mut builder = FeatureVectorBuilder::with_sampling_rate(100).unwrap();
        builder.fit(&[sample]).unwrap();
        let single = vec![vec![0.5; 300]];
        assert!(matches!(builder.transform(&single), Err(FeatureError::FeatureMismatch(_))));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        assert!(FeatureVectorBuilder::with_sampling_rate(0).is_err());
        let config = ExtractorConfig {
            lta_window_s: -1.0,
            ..Default::default()
        };
        assert!(FeatureVectorBuilder::new(config).is_err());
    }
}
