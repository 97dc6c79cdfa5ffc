//! Display-side derivations from backend results and model metrics.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Cell order of the 2x2 confusion matrix sent by the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixLayout {
    /// `[[tp, fp], [fn, tn]]`.
    #[default]
    TpFpFnTn,
    /// `[[tn, fp], [fn, tp]]`, rows are actual classes 0/1 and columns predicted 0/1.
    Sklearn,
}

impl FromStr for MatrixLayout {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "tpfpfntn" | "tp_fp_fn_tn" => Ok(Self::TpFpFnTn),
            "sklearn" => Ok(Self::Sklearn),
            other => Err(format!("Unknown confusion matrix layout: {other}")),
        }
    }
}

/// Confusion matrix with named cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionMatrix {
    pub true_positive: u64,
    pub false_positive: u64,
    pub false_negative: u64,
    pub true_negative: u64,
}

impl ConfusionMatrix {
    pub fn from_rows(rows: &[[u64; 2]; 2], layout: MatrixLayout) -> Self {
        let [[a, fp], [fn_, d]] = *rows;
        let (true_positive, true_negative) = match layout {
            MatrixLayout::TpFpFnTn => (a, d),
            MatrixLayout::Sklearn => (d, a),
        };
        Self {
            true_positive,
            false_positive: fp,
            false_negative: fn_,
            true_negative,
        }
    }

    /// Sum of all cells; widened so backend counts near `u64::MAX` cannot overflow.
    pub fn total(&self) -> u128 {
        self.cells().iter().map(|&(_, count)| u128::from(count)).sum()
    }

    /// Share of `count` in the total as a percentage; 0 for an empty matrix.
    pub fn share(&self, count: u64) -> f64 {
        match self.total() {
            0 => 0.0,
            total => count as f64 / total as f64 * 100.0,
        }
    }

    /// Cells in display order with their captions.
    pub fn cells(&self) -> [(&'static str, u64); 4] {
        [
            ("True Positive", self.true_positive),
            ("False Positive", self.false_positive),
            ("True Negative", self.true_negative),
            ("False Negative", self.false_negative),
        ]
    }
}

/// Colour band the dashboard uses for a predicted probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RiskBand {
    Low,
    Moderate,
    High,
}

impl RiskBand {
    pub fn from_probability(probability: f64) -> Self {
        if probability > 0.7 {
            Self::High
        } else if probability > 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }
}

impl fmt::Display for RiskBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::High => "high",
        })
    }
}

/// Render a ratio such as 0.8213 as `82.1%`.
pub fn format_percent(ratio: f64) -> String {
    format!("{:.1}%", ratio * 100.0)
}

/// One bar of the feature-importance chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ImportanceEntry {
    pub label: String,
    pub weight: f64,
}

/// Pair importances with feature names and sort by magnitude, largest first.
///
/// The backend reports importances after its own encoding step, so the count
/// may differ from the form fields; unmatched lists get `component N` labels.
pub fn ranked_importance(values: &[f64], names: &[&str]) -> Vec<ImportanceEntry> {
    let named = values.len() == names.len();
    let mut entries = values
        .iter()
        .enumerate()
        .map(|(idx, weight)| ImportanceEntry {
            label: if named {
                names[idx].to_string()
            } else {
                format!("component {}", idx + 1)
            },
            weight: *weight,
        })
        .collect::<Vec<_>>();
    entries.sort_by(|a, b| b.weight.abs().total_cmp(&a.weight.abs()));
    entries
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layouts_pick_the_right_cells() {
        let rows = [[10, 2], [3, 40]];
        let documented = ConfusionMatrix::from_rows(&rows, MatrixLayout::TpFpFnTn);
        assert_eq!(documented.true_positive, 10);
        assert_eq!(documented.true_negative, 40);
        let sklearn = ConfusionMatrix::from_rows(&rows, MatrixLayout::Sklearn);
        assert_eq!(sklearn.true_positive, 40);
        assert_eq!(sklearn.true_negative, 10);
        assert_eq!(sklearn.false_positive, 2);
        assert_eq!(sklearn.false_negative, 3);
    }

    #[test]
    fn shares_are_percentages_of_total() {
        let matrix = ConfusionMatrix::from_rows(&[[25, 25], [25, 25]], MatrixLayout::TpFpFnTn);
        assert_eq!(matrix.total(), 100);
        assert_eq!(matrix.share(matrix.true_positive), 25.0);
        assert_eq!(ConfusionMatrix::default().share(0), 0.0);
    }

    #[test]
    fn huge_counts_do_not_overflow() {
        let matrix = ConfusionMatrix::from_rows(&[[u64::MAX, 1], [0, 0]], MatrixLayout::TpFpFnTn);
        assert_eq!(matrix.total(), u128::from(u64::MAX) + 1);
        let share = matrix.share(1);
        assert!(share.is_finite());
        assert!(share > 0.0 && share < 1e-12);
        assert_eq!(matrix.share(u64::MAX), 100.0);
    }

    #[test]
    fn risk_bands_follow_thresholds() {
        assert_eq!(RiskBand::from_probability(0.82), RiskBand::High);
        assert_eq!(RiskBand::from_probability(0.7), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.41), RiskBand::Moderate);
        assert_eq!(RiskBand::from_probability(0.4), RiskBand::Low);
    }

    #[test]
    fn percent_has_one_decimal() {
        assert_eq!(format_percent(0.82), "82.0%");
        assert_eq!(format_percent(0.8328), "83.3%");
    }

    #[test]
    fn importance_uses_names_when_lengths_match() {
        let ranked = ranked_importance(&[0.1, -0.7, 0.3], &["a", "b", "c"]);
        let labels = ranked.iter().map(|e| e.label.as_str()).collect::<Vec<_>>();
        assert_eq!(labels, ["b", "c", "a"]);
        assert_eq!(ranked[0].weight, -0.7);
    }

    #[test]
    fn importance_falls_back_to_component_labels() {
        let ranked = ranked_importance(&[0.2, 0.5], &["only"]);
        assert_eq!(ranked[0].label, "component 2");
        assert_eq!(ranked[1].label, "component 1");
    }

    #[test]
    fn layout_parses_cli_spellings() {
        assert_eq!("sklearn".parse::<MatrixLayout>(), Ok(MatrixLayout::Sklearn));
        assert_eq!("TPFPFNTN".parse::<MatrixLayout>(), Ok(MatrixLayout::TpFpFnTn));
        assert!("diagonal".parse::<MatrixLayout>().is_err());
    }
}
