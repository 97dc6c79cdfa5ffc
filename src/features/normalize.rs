//! Conversion of raw form input into the numeric vector the backend expects.
//!
//! Normalization never fails. Every field of the active feature set gets a
//! finite value; anything that cannot be read is replaced by 0 and reported
//! as a [`Diagnostic`]. Callers that would rather refuse such input use
//! [`Normalized::into_strict`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::raw::{RawForm, RawFormValue};
use super::spec::{FeatureKind, FeatureSpec};

/// Field name to finite numeric value, one entry per declared feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedFeatureVector(BTreeMap<String, f64>);

impl NormalizedFeatureVector {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.0.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(name, value)| (name.as_str(), *value))
    }

    /// Feed the vector back as form input, e.g. to pre-fill a form.
    pub fn to_raw(&self) -> RawForm {
        self.0
            .iter()
            .map(|(name, value)| (name.clone(), RawFormValue::Number(*value)))
            .collect()
    }
}

/// Why a field's value was replaced or flagged.
#[derive(Debug, Clone, PartialEq)]
pub enum DiagnosticReason {
    /// Categorical value matched neither a label nor a code.
    UnknownLabel,
    /// Numeric field received text that is not a number.
    NotANumber,
    /// Value resolved to NaN or infinity.
    NonFinite,
    /// Parsed value lies outside the declared range; the value is kept.
    OutOfRange { min: f64, max: f64 },
}

/// Non-fatal note about one field.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub field: String,
    /// Rendering of the offending raw value.
    pub raw: String,
    pub reason: DiagnosticReason,
}

impl Diagnostic {
    /// True when the sent value differs from what the user entered.
    pub fn is_substitution(&self) -> bool {
        !matches!(self.reason, DiagnosticReason::OutOfRange { .. })
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.reason {
            DiagnosticReason::UnknownLabel => {
                write!(f, "{}: unknown option {}, using 0", self.field, self.raw)
            }
            DiagnosticReason::NotANumber => {
                write!(f, "{}: {} is not a number, using 0", self.field, self.raw)
            }
            DiagnosticReason::NonFinite => {
                write!(f, "{}: {} is not finite, using 0", self.field, self.raw)
            }
            DiagnosticReason::OutOfRange { min, max } => {
                write!(f, "{}: {} is outside [{min}, {max}]", self.field, self.raw)
            }
        }
    }
}

/// Output of [`normalize`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Normalized {
    pub vector: NormalizedFeatureVector,
    pub diagnostics: Vec<Diagnostic>,
}

/// Raised by strict normalization when any value had to be substituted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{} field(s) could not be read: {}", .diagnostics.len(), join_diagnostics(.diagnostics))]
pub struct RejectedInput {
    pub diagnostics: Vec<Diagnostic>,
}

fn join_diagnostics(diagnostics: &[Diagnostic]) -> String {
    diagnostics
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Normalized {
    pub fn has_substitutions(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_substitution)
    }

    /// Accept the vector only if every field was read as entered.
    pub fn into_strict(self) -> Result<NormalizedFeatureVector, RejectedInput> {
        let rejected = self
            .diagnostics
            .into_iter()
            .filter(Diagnostic::is_substitution)
            .collect::<Vec<_>>();
        if rejected.is_empty() {
            Ok(self.vector)
        } else {
            Err(RejectedInput {
                diagnostics: rejected,
            })
        }
    }
}

/// Normalize `raw` against `specs`.
///
/// The output has exactly one entry per feature spec; raw keys without a spec are dropped.
pub fn normalize(specs: &[FeatureSpec], raw: &RawForm) -> Normalized {
    let mut normalized = Normalized::default();
    for spec in specs {
        let value = normalize_field(spec, raw.get(&spec.name), &mut normalized.diagnostics);
        normalized.vector.0.insert(spec.name.clone(), value);
    }
    for diagnostic in &normalized.diagnostics {
        if diagnostic.is_substitution() {
            tracing::warn!("{diagnostic}");
        } else {
            tracing::info!("{diagnostic}");
        }
    }
    normalized
}

fn normalize_field(
    spec: &FeatureSpec,
    raw: Option<&RawFormValue>,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    let resolved = match raw.filter(|value| !value.is_blank()) {
        None => spec.default_value(),
        Some(value) => match &spec.kind {
            FeatureKind::Categorical { .. } => categorical_code(spec, value, diagnostics),
            FeatureKind::NumericRange { min, max } => {
                numeric_value(spec, *min, *max, value, diagnostics)
            }
        },
    };
    if resolved.is_finite() {
        return resolved;
    }
    diagnostics.push(Diagnostic {
        field: spec.name.clone(),
        raw: raw.map(ToString::to_string).unwrap_or_else(|| "default".to_string()),
        reason: DiagnosticReason::NonFinite,
    });
    0.0
}

fn categorical_code(
    spec: &FeatureSpec,
    value: &RawFormValue,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    let by_label = match value {
        RawFormValue::Text(text) | RawFormValue::Label(text) => spec.code_for_label(text),
        RawFormValue::Number(_) | RawFormValue::Boolean(_) => None,
    };
    if let Some(code) = by_label {
        return code as f64;
    }
    if let Some(number) = value.as_number()
        && spec.accepts_code(number)
    {
        return number;
    }
    diagnostics.push(Diagnostic {
        field: spec.name.clone(),
        raw: value.to_string(),
        reason: DiagnosticReason::UnknownLabel,
    });
    0.0
}

fn numeric_value(
    spec: &FeatureSpec,
    min: f64,
    max: f64,
    value: &RawFormValue,
    diagnostics: &mut Vec<Diagnostic>,
) -> f64 {
    let Some(number) = value.as_number() else {
        diagnostics.push(Diagnostic {
            field: spec.name.clone(),
            raw: value.to_string(),
            reason: DiagnosticReason::NotANumber,
        });
        return 0.0;
    };
    if number.is_finite() && (number < min || number > max) {
        diagnostics.push(Diagnostic {
            field: spec.name.clone(),
            raw: value.to_string(),
            reason: DiagnosticReason::OutOfRange { min, max },
        });
    }
    number
}
