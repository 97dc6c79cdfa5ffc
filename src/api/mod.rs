//! HTTP JSON contract of the prediction backend.

mod client;
mod error;
mod types;

pub use client::{PredictionClient, PredictionService};
pub use error::ApiError;
pub use types::{LIKELY_LABEL, ModelDetails, ModelSummary, PredictionResult};
