use thiserror::Error;

/// Failure of a backend exchange.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    #[error("Model id must not be empty")]
    InvalidModelId,
    #[error("Not found: {resource}")]
    NotFound { resource: String },
    #[error("Type error in model prediction; all inputs must be valid numbers ({detail})")]
    InvalidNumericInput { detail: String },
    #[error("HTTP {code}: {detail}")]
    Status { code: u16, detail: String },
    #[error("HTTP error: {0}")]
    Transport(String),
    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Network, status or decoding failure, i.e. anything the user can only retry.
    pub fn is_transport_failure(&self) -> bool {
        matches!(
            self,
            Self::InvalidNumericInput { .. }
                | Self::Status { .. }
                | Self::Transport(_)
                | Self::Decode(_)
        )
    }
}

/// Classify a non-2xx response.
///
/// `/predict` reports an unknown model as a 500 wrapping the inner 404
/// detail, so the detail text is checked as well as the status code.
pub(crate) fn map_status_error(code: u16, body: &str, resource: &str) -> ApiError {
    let detail = extract_detail(body);
    if code == 404 || detail.contains("Model not found") {
        return ApiError::NotFound {
            resource: resource.to_string(),
        };
    }
    if detail.contains("isnan") && detail.contains("not supported for the input types") {
        return ApiError::InvalidNumericInput { detail };
    }
    ApiError::Status { code, detail }
}

/// Pull `detail` out of a FastAPI error body, falling back to the trimmed text.
pub(crate) fn extract_detail(body: &str) -> String {
    let trimmed = body.trim();
    serde_json::from_str::<serde_json::Value>(trimmed)
        .ok()
        .and_then(|value| match value.get("detail")? {
            serde_json::Value::String(text) => Some(text.clone()),
            other => Some(other.to_string()),
        })
        .unwrap_or_else(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_is_extracted_from_fastapi_body() {
        assert_eq!(extract_detail(r#"{"detail":"Model not found"}"#), "Model not found");
        assert_eq!(extract_detail("  plain failure \n"), "plain failure");
        assert_eq!(
            extract_detail(r#"{"detail":[{"loc":["body"]}]}"#),
            r#"[{"loc":["body"]}]"#
        );
    }

    #[test]
    fn not_found_covers_status_and_wrapped_detail() {
        assert!(map_status_error(404, r#"{"detail":"Model not found"}"#, "model 999").is_not_found());
        let wrapped = map_status_error(500, r#"{"detail":"404: Model not found"}"#, "model X");
        assert_eq!(
            wrapped,
            ApiError::NotFound {
                resource: "model X".to_string()
            }
        );
    }

    #[test]
    fn isnan_failure_is_a_distinct_transport_failure() {
        let body = r#"{"detail":"ufunc 'isnan' not supported for the input types"}"#;
        let err = map_status_error(500, body, "prediction");
        assert!(matches!(err, ApiError::InvalidNumericInput { .. }));
        assert!(err.is_transport_failure());
        assert!(!err.is_not_found());
    }

    #[test]
    fn other_statuses_keep_code_and_detail() {
        let err = map_status_error(503, "busy", "models");
        assert_eq!(
            err,
            ApiError::Status {
                code: 503,
                detail: "busy".to_string()
            }
        );
        assert!(err.is_transport_failure());
        assert!(!ApiError::InvalidModelId.is_transport_failure());
    }
}
