use serde::{Deserialize, Serialize};

use crate::features::NormalizedFeatureVector;
use crate::report::{ConfusionMatrix, MatrixLayout, RiskBand};

/// Label the backend reports for the positive class.
pub const LIKELY_LABEL: &str = "Depression Likely";

/// Body of `POST /predict`.
#[derive(Debug, Serialize)]
pub(crate) struct PredictionRequest<'a> {
    pub model_id: &'a str,
    pub features: &'a NormalizedFeatureVector,
}

/// Outcome of one prediction as reported by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Probability of the positive class.
    pub probability: f64,
    /// Backend label, e.g. `Depression Likely`.
    pub prediction: String,
}

impl PredictionResult {
    pub fn is_likely(&self) -> bool {
        self.prediction == LIKELY_LABEL
    }

    pub fn risk_band(&self) -> RiskBand {
        RiskBand::from_probability(self.probability)
    }
}

/// Entry of `GET /models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSummary {
    pub id: String,
    pub name: String,
    pub accuracy: f64,
}

/// Body of `GET /models/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDetails {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub confusion_matrix: [[u64; 2]; 2],
    /// Absent when the classifier exposes neither importances nor coefficients.
    #[serde(default)]
    pub feature_importance: Option<Vec<f64>>,
}

impl ModelDetails {
    pub fn confusion(&self, layout: MatrixLayout) -> ConfusionMatrix {
        ConfusionMatrix::from_rows(&self.confusion_matrix, layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn details_accept_null_importance() {
        let details: ModelDetails = serde_json::from_value(json!({
            "accuracy": 0.83,
            "precision": 0.84,
            "recall": 0.89,
            "f1": 0.86,
            "confusion_matrix": [[1753, 560], [359, 2909]],
            "feature_importance": null
        }))
        .unwrap();
        assert_eq!(details.feature_importance, None);
        assert_eq!(details.confusion(MatrixLayout::Sklearn).true_positive, 2909);
    }

    #[test]
    fn details_reject_non_square_matrix() {
        let result = serde_json::from_value::<ModelDetails>(json!({
            "accuracy": 0.83,
            "precision": 0.84,
            "recall": 0.89,
            "f1": 0.86,
            "confusion_matrix": [[1, 2, 3], [4, 5, 6]]
        }));
        assert!(result.is_err());
    }

    #[test]
    fn prediction_helpers_read_label_and_band() {
        let result = PredictionResult {
            probability: 0.82,
            prediction: "Depression Likely".to_string(),
        };
        assert!(result.is_likely());
        assert_eq!(result.risk_band(), RiskBand::High);
    }
}
