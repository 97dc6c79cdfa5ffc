use serde::{Deserialize, Serialize};

/// Description of one model input field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    /// Key sent to the backend; unique within a model's feature set.
    pub name: String,
    /// Human-facing label; falls back to `name` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub kind: FeatureKind,
}

/// Value domain of a feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FeatureKind {
    /// Continuous value entered through a number input or slider.
    NumericRange { min: f64, max: f64 },
    /// Fixed set of labels, each sent as its integer code.
    Categorical { options: Vec<CategoryOption> },
}

/// One selectable label of a categorical feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryOption {
    pub label: String,
    pub code: i64,
}

impl FeatureSpec {
    pub fn numeric(name: impl Into<String>, min: f64, max: f64) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: FeatureKind::NumericRange { min, max },
        }
    }

    /// Categorical feature with explicit `(label, code)` pairs in display order.
    pub fn categorical(name: impl Into<String>, options: &[(&str, i64)]) -> Self {
        Self {
            name: name.into(),
            label: None,
            kind: FeatureKind::Categorical {
                options: options
                    .iter()
                    .map(|(label, code)| CategoryOption {
                        label: (*label).to_string(),
                        code: *code,
                    })
                    .collect(),
            },
        }
    }

    /// Categorical feature whose codes follow declaration order, starting at 0.
    pub fn enumerated(name: impl Into<String>, labels: &[&str]) -> Self {
        let options = labels
            .iter()
            .zip(0i64..)
            .map(|(label, code)| (*label, code))
            .collect::<Vec<_>>();
        Self::categorical(name, &options)
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Value used when the form has nothing for this field.
    pub fn default_value(&self) -> f64 {
        match &self.kind {
            FeatureKind::NumericRange { min, .. } => *min,
            FeatureKind::Categorical { options } => {
                options.first().map(|option| option.code as f64).unwrap_or(0.0)
            }
        }
    }

    /// Code for a label, ignoring surrounding whitespace.
    pub fn code_for_label(&self, label: &str) -> Option<i64> {
        let FeatureKind::Categorical { options } = &self.kind else {
            return None;
        };
        let label = label.trim();
        options
            .iter()
            .find(|option| option.label == label)
            .map(|option| option.code)
    }

    /// True when `value` is exactly one of the declared category codes.
    pub fn accepts_code(&self, value: f64) -> bool {
        let FeatureKind::Categorical { options } = &self.kind else {
            return false;
        };
        options.iter().any(|option| option.code as f64 == value)
    }
}
