//! Binary classification scores

use serde::{Deserialize, Serialize};

/// Confusion matrix of a trigger threshold over both labeled sets
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfusionCounts {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ConfusionCounts {
    /// Classify segments by whether their peak ratio exceeds `threshold`
    pub fn from_max_ratios(earthquake: &[f64], non_earthquake: &[f64], threshold: f64) -> Self {
        let true_positives = earthquake.iter().filter(|&&r| r > threshold).count();
        let false_positives = non_earthquake.iter().filter(|&&r| r > threshold).count();

        Self {
            true_positives,
            false_positives,
            true_negatives: non_earthquake.len() - false_positives,
            false_negatives: earthquake.len() - true_positives,
        }
    }

    /// TP / (TP + FP), 0 with no positives
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// TP / (TP + FN), 0 with no earthquakes
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Harmonic mean of precision and recall, 0 when both are 0
    pub fn f1_score(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r > 0.0 {
            2.0 * p * r / (p + r)
        } else {
            0.0
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}
