//! STA/LTA grid-search calibrator

use feature_engine::max_ratio;
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::error::CalibrationError;
use crate::grid::CalibrationGrid;
use crate::metrics::ConfusionCounts;
use crate::params::{CalibrationConfig, CalibrationResult, DetectorParams, ParameterRange};

/// Peak STA/LTA ratio of every segment for one window pair
struct CellRatios {
    sta_window: f64,
    lta_window: f64,
    earthquake: Vec<f64>,
    non_earthquake: Vec<f64>,
}

/// Searches STA/LTA windows and thresholds for the best F1 separation
#[derive(Debug, Clone)]
pub struct DetectorCalibrator {
    config: CalibrationConfig,
    result: Option<CalibrationResult>,
}

impl DetectorCalibrator {
    pub fn new(config: CalibrationConfig) -> Result<Self, CalibrationError> {
        config.validate()?;
        Ok(Self {
            config,
            result: None,
        })
    }

    /// Default search at a given sampling rate
    pub fn with_sampling_rate(sampling_rate: u32) -> Result<Self, CalibrationError> {
        Self::new(CalibrationConfig::with_sampling_rate(sampling_rate))
    }

    pub fn config(&self) -> &CalibrationConfig {
        &self.config
    }

    /// Run the grid search with the configured ranges.
    ///
    /// Returns the best operating point, or `None` if no candidate reaches
    /// F1 > 0; in that case [`get_optimal_params`](Self::get_optimal_params)
    /// falls back to the defaults.
    pub fn calibrate<S: AsRef<[f64]> + Sync>(
        &mut self,
        earthquake: &[S],
        non_earthquake: &[S],
    ) -> Result<Option<CalibrationResult>, CalibrationError> {
        let grid = CalibrationGrid::new(&self.config)?;

        info!(
            "Calibrating STA/LTA on {} earthquake / {} non-earthquake segments ({} candidates)",
            earthquake.len(),
            non_earthquake.len(),
            grid.candidates().count()
        );

        let cells = self.cell_ratios(&grid, earthquake, non_earthquake)?;

        let mut best: Option<CalibrationResult> = None;
        let mut best_f1 = 0.0;

        // Candidates come cell by cell, one per threshold, in `cells` order
        let per_cell = grid.thresholds().len();
        for (i, candidate) in grid.candidates().enumerate() {
            let cell = &cells[i / per_cell];
            let counts = ConfusionCounts::from_max_ratios(
                &cell.earthquake,
                &cell.non_earthquake,
                candidate.threshold,
            );
            let f1 = counts.f1_score();

            // Strictly greater: the first candidate wins ties
            if f1 > best_f1 {
                best_f1 = f1;
                best = Some(CalibrationResult {
                    params: DetectorParams {
                        sta_window: candidate.sta_window,
                        lta_window: candidate.lta_window,
                        trigger_threshold: candidate.threshold,
                        detrigger_threshold: candidate.threshold * self.config.detrigger_fraction,
                    },
                    precision: counts.precision(),
                    recall: counts.recall(),
                    f1_score: f1,
                });
            }
        }

        match &best {
            Some(result) => info!(
                "Calibration complete: sta={}s, lta={}s, threshold={:.3} (P={:.3}, R={:.3}, F1={:.3})",
                result.params.sta_window,
                result.params.lta_window,
                result.params.trigger_threshold,
                result.precision,
                result.recall,
                result.f1_score
            ),
            None => warn!("Calibration found no operating point with F1 > 0, using defaults"),
        }

        self.result = best;
        Ok(best)
    }

    /// Run the grid search over explicit ranges, keeping them for later runs
    /// only if the search succeeds
    pub fn calibrate_with_ranges<S: AsRef<[f64]> + Sync>(
        &mut self,
        earthquake: &[S],
        non_earthquake: &[S],
        sta_range: ParameterRange,
        lta_range: ParameterRange,
        threshold_range: ParameterRange,
    ) -> Result<Option<CalibrationResult>, CalibrationError> {
        let config = self.config.with_ranges(sta_range, lta_range, threshold_range);
        config.validate()?;

        let previous = std::mem::replace(&mut self.config, config);
        self.calibrate(earthquake, non_earthquake).map_err(|err| {
            self.config = previous;
            err
        })
    }

    /// Best parameters of the last calibration, or the fixed defaults
    pub fn get_optimal_params(&self) -> DetectorParams {
        self.result
            .map(|result| result.params)
            .unwrap_or_default()
    }

    /// Full result of the last calibration, if it found an operating point
    pub fn last_result(&self) -> Option<&CalibrationResult> {
        self.result.as_ref()
    }

    /// Peak ratios per valid cell, in grid order
    fn cell_ratios<S: AsRef<[f64]> + Sync>(
        &self,
        grid: &CalibrationGrid,
        earthquake: &[S],
        non_earthquake: &[S],
    ) -> Result<Vec<CellRatios>, CalibrationError> {
        let cells: Vec<(f64, f64)> = grid.cells().collect();
        let rate = self.config.sampling_rate;

        let evaluate = |&(sta_window, lta_window): &(f64, f64)| -> Result<CellRatios, CalibrationError> {
            let peaks = |segments: &[S]| -> Result<Vec<f64>, CalibrationError> {
                segments
                    .iter()
                    .map(|s| max_ratio(s.as_ref(), rate, sta_window, lta_window).map_err(Into::into))
                    .collect()
            };

            let cell = CellRatios {
                sta_window,
                lta_window,
                earthquake: peaks(earthquake)?,
                non_earthquake: peaks(non_earthquake)?,
            };
            debug!("Cell sta={}s lta={}s evaluated", sta_window, lta_window);
            Ok(cell)
        };

        #[cfg(feature = "parallel")]
        let evaluated = cells.par_iter().map(evaluate).collect();
        #[cfg(not(feature = "parallel"))]
        let evaluated = cells.iter().map(evaluate).collect();

        evaluated
    }
}
