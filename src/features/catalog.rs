//! Per-model feature sets, built in or loaded from `features.toml`.

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app_dirs;

use super::spec::{FeatureKind, FeatureSpec};

/// Filename of the optional catalog override inside the app directory.
pub const CATALOG_FILE_NAME: &str = "features.toml";

/// Feature sets keyed by model identifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureCatalog {
    #[serde(default)]
    pub models: BTreeMap<String, Vec<FeatureSpec>>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error(transparent)]
    AppDir(#[from] app_dirs::AppDirError),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Invalid feature catalog at {path}: {source}")]
    ParseToml {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Model {model}: duplicate feature {field}")]
    DuplicateField { model: String, field: String },
    #[error("Model {model}: feature {field} has an invalid range [{min}, {max}]")]
    InvalidRange {
        model: String,
        field: String,
        min: f64,
        max: f64,
    },
    #[error("Model {model}: feature {field} repeats option {label}")]
    DuplicateOption {
        model: String,
        field: String,
        label: String,
    },
}

impl FeatureCatalog {
    /// Feature sets shipped with the dashboard.
    pub fn builtin() -> Self {
        let mut models = BTreeMap::new();
        models.insert("RandomForest".to_string(), student_survey_features());
        models.insert("LogisticRegression".to_string(), student_survey_features());
        for (id, extra) in [("1", 1usize), ("2", 0), ("3", 2), ("4", 4)] {
            models.insert(id.to_string(), clinical_features(extra));
        }
        Self { models }
    }

    /// Load `features.toml` from the app directory, or fall back to the built-in sets.
    pub fn load_or_builtin() -> Result<Self, CatalogError> {
        let path = app_dirs::root_file(CATALOG_FILE_NAME)?;
        if !path.exists() {
            return Ok(Self::builtin());
        }
        tracing::info!("Loading feature catalog from {}", path.display());
        Self::load_from(&path)
    }

    /// Parse and validate a catalog file.
    pub fn load_from(path: &Path) -> Result<Self, CatalogError> {
        let text = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let catalog: Self = toml::from_str(&text).map_err(|source| CatalogError::ParseToml {
            path: path.to_path_buf(),
            source,
        })?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn get(&self, model_id: &str) -> Option<&[FeatureSpec]> {
        self.models.get(model_id).map(Vec::as_slice)
    }

    pub fn model_ids(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Check the invariants normalization relies on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (model, specs) in &self.models {
            let mut seen = BTreeSet::new();
            for spec in specs {
                if !seen.insert(spec.name.as_str()) {
                    return Err(CatalogError::DuplicateField {
                        model: model.clone(),
                        field: spec.name.clone(),
                    });
                }
                match &spec.kind {
                    FeatureKind::NumericRange { min, max } => {
                        if !min.is_finite() || !max.is_finite() || min > max {
                            return Err(CatalogError::InvalidRange {
                                model: model.clone(),
                                field: spec.name.clone(),
                                min: *min,
                                max: *max,
                            });
                        }
                    }
                    FeatureKind::Categorical { options } => {
                        let mut labels = BTreeSet::new();
                        for option in options {
                            if !labels.insert(option.label.as_str()) {
                                return Err(CatalogError::DuplicateOption {
                                    model: model.clone(),
                                    field: spec.name.clone(),
                                    label: option.label.clone(),
                                });
                            }
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

fn student_survey_features() -> Vec<FeatureSpec> {
    let yes_no = [("No", 0), ("Yes", 1)];
    vec![
        FeatureSpec::numeric("Academic Pressure", 0.0, 5.0),
        FeatureSpec::numeric("Work/Study Hours", 0.0, 12.0),
        FeatureSpec::numeric("Financial Stress", 1.0, 5.0),
        FeatureSpec::enumerated("Dietary Habits", &["Healthy", "Moderate", "Unhealthy", "Others"]),
        FeatureSpec::numeric("Sleep Duration", 4.0, 9.0).with_label("Sleep Duration (hours)"),
        FeatureSpec::categorical("Family History of Mental Illness", &yes_no),
        FeatureSpec::categorical("Have you ever had suicidal thoughts ?", &yes_no)
            .with_label("Suicidal Thoughts"),
        FeatureSpec::numeric("CGPA", 0.0, 10.0),
        FeatureSpec::enumerated("Gender", &["Male", "Female", "Other"]),
    ]
}

/// Dashboard form: five core fields plus `extra` of the optional ones, in order.
fn clinical_features(extra: usize) -> Vec<FeatureSpec> {
    let mut specs = vec![
        FeatureSpec::numeric("age", 18.0, 90.0).with_label("Age"),
        FeatureSpec::enumerated("gender", &["Male", "Female", "Other"]).with_label("Gender"),
        FeatureSpec::numeric("phq9", 0.0, 27.0).with_label("PHQ-9 Score"),
        FeatureSpec::numeric("sleep", 0.0, 10.0).with_label("Sleep Quality"),
        FeatureSpec::numeric("activity", 0.0, 40.0).with_label("Physical Activity (hours/week)"),
    ];
    let optional = [
        FeatureSpec::numeric("social", 0.0, 10.0).with_label("Social Support"),
        FeatureSpec::numeric("stress", 0.0, 10.0).with_label("Stress Level"),
        FeatureSpec::numeric("diet", 0.0, 10.0).with_label("Diet Quality"),
        FeatureSpec::numeric("screen", 0.0, 24.0).with_label("Screen Time (hours/day)"),
    ];
    specs.extend(optional.into_iter().take(extra));
    specs
}
