//! Blocking client for the prediction backend.

use serde::de::DeserializeOwned;
use url::Url;

use crate::config::{ApiSettings, ConfigError};
use crate::features::NormalizedFeatureVector;
use crate::http_client;

use super::error::{ApiError, map_status_error};
use super::types::{ModelDetails, ModelSummary, PredictionRequest, PredictionResult};

/// Longest response excerpt quoted in decode errors.
const ERROR_EXCERPT_CHARS: usize = 200;

/// Operations offered by the prediction backend.
pub trait PredictionService {
    fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError>;
    fn model_details(&self, model_id: &str) -> Result<ModelDetails, ApiError>;
    fn predict(
        &self,
        model_id: &str,
        features: &NormalizedFeatureVector,
    ) -> Result<PredictionResult, ApiError>;
}

/// HTTP implementation of [`PredictionService`].
///
/// Each call is one request/response round trip; nothing is retried or cached.
#[derive(Debug, Clone)]
pub struct PredictionClient {
    agent: ureq::Agent,
    base_url: Url,
    max_response_bytes: usize,
}

impl PredictionClient {
    pub fn new(settings: &ApiSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            agent: http_client::build_agent(settings.request_timeout()),
            base_url: settings.parsed_base_url()?,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::Transport(format!("Base URL cannot hold a path: {}", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn exchange<T: DeserializeOwned>(
        &self,
        result: Result<ureq::Response, ureq::Error>,
        resource: &str,
    ) -> Result<T, ApiError> {
        let response = match result {
            Ok(response) => response,
            Err(ureq::Error::Status(code, response)) => {
                let body = self.read_body(response).unwrap_or_else(|err| err);
                let error = map_status_error(code, &body, resource);
                tracing::warn!("Backend rejected request for {resource}: {error}");
                return Err(error);
            }
            Err(ureq::Error::Transport(err)) => {
                tracing::warn!("Request for {resource} failed: {err}");
                return Err(ApiError::Transport(err.to_string()));
            }
        };
        let body = self.read_body(response).map_err(ApiError::Transport)?;
        serde_json::from_str(&body).map_err(|err| {
            let excerpt = body.chars().take(ERROR_EXCERPT_CHARS).collect::<String>();
            ApiError::Decode(format!("{err}: {excerpt}"))
        })
    }

    fn read_body(&self, response: ureq::Response) -> Result<String, String> {
        http_client::read_response_text(response, self.max_response_bytes)
            .map_err(|err| err.to_string())
    }
}

impl PredictionService for PredictionClient {
    fn list_models(&self) -> Result<Vec<ModelSummary>, ApiError> {
        let url = self.endpoint(&["models"])?;
        tracing::debug!("GET {url}");
        let result = self
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call();
        self.exchange(result, "models")
    }

    fn model_details(&self, model_id: &str) -> Result<ModelDetails, ApiError> {
        if model_id.trim().is_empty() {
            return Err(ApiError::InvalidModelId);
        }
        let url = self.endpoint(&["models", model_id])?;
        tracing::debug!("GET {url}");
        let result = self
            .agent
            .get(url.as_str())
            .set("Accept", "application/json")
            .call();
        self.exchange(result, &format!("model {model_id}"))
    }

    fn predict(
        &self,
        model_id: &str,
        features: &NormalizedFeatureVector,
    ) -> Result<PredictionResult, ApiError> {
        if model_id.trim().is_empty() {
            return Err(ApiError::InvalidModelId);
        }
        let url = self.endpoint(&["predict"])?;
        tracing::info!(
            "Requesting prediction from {model_id} with {} features",
            features.len()
        );
        let result = self
            .agent
            .post(url.as_str())
            .set("Accept", "application/json")
            .send_json(PredictionRequest { model_id, features });
        self.exchange(result, &format!("model {model_id}"))
    }
}
