//! Model input fields and the normalization of raw form values.

pub mod catalog;
mod normalize;
mod raw;
mod spec;

pub use catalog::{CATALOG_FILE_NAME, CatalogError, FeatureCatalog};
pub use normalize::{
    Diagnostic, DiagnosticReason, Normalized, NormalizedFeatureVector, RejectedInput, normalize,
};
pub use raw::{RawForm, RawFormValue, form_from_json};
pub use spec::{CategoryOption, FeatureKind, FeatureSpec};
