//! Seismic Feature Engine
//!
//! Turns fixed-rate acceleration/velocity waveforms into named feature vectors
//! for classifier training, and computes the STA/LTA trigger statistic.

mod config;
mod error;
mod feature_set;
mod features;
mod intensity;
mod multi_axis;
mod spectral;
mod sta_lta;
mod statistics;
mod time_domain;

pub use config::{ExtractorConfig, DEFAULT_SAMPLING_RATE};
pub use error::FeatureError;
pub use feature_set::FeatureSet;
pub use features::{
    extract_all_features, extract_multi_axis_features, Extractable, FeatureVectorBuilder,
    MULTI_AXIS_FEATURE_COUNT, SINGLE_AXIS_FEATURE_COUNT,
};
pub use intensity::{significant_duration, IntensityFeatures, STANDARD_GRAVITY};
pub use multi_axis::{pearson, CrossAxisFeatures, MultiAxisSample};
pub use spectral::{analytic_signal, SpectralFeatures, Spectrum, FREQUENCY_BANDS};
pub use sta_lta::{max_ratio, sta_lta_ratio, window_samples, StaLtaFeatures};
pub use statistics::{percentile, StatisticalFeatures, PERCENTILES};
pub use time_domain::{find_peaks, TimeDomainFeatures};

/// Feature matrix type returned by [`FeatureVectorBuilder::transform`]
pub use ndarray::Array2;
