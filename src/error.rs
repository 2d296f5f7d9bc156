use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Failures that stop a calculation before any engine runs.
#[derive(Debug, Error)]
pub enum EstimatorError {
    #[error("Invalid input: {field} {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Location could not be resolved: {0}")]
    LocationUnresolved(String),
}

impl EstimatorError {
    pub fn invalid(field: &str, reason: &str) -> Self {
        EstimatorError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            EstimatorError::InvalidInput { .. } => "INVALID_INPUT",
            EstimatorError::LocationUnresolved(_) => "LOCATION_UNRESOLVED",
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            EstimatorError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
            EstimatorError::LocationUnresolved(_) => StatusCode::UNPROCESSABLE_ENTITY,
        }
    }
}

impl IntoResponse for EstimatorError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({
            "error": self.to_string(),
            "kind": self.kind(),
        });
        (self.status(), Json(body)).into_response()
    }
}

/// Failures of the irradiance and air-quality lookups. These never abort a
/// calculation; the pipeline turns them into advisories.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("unusable payload: {0}")]
    InvalidPayload(String),

    #[error("offline mode is enabled")]
    Offline,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("cannot parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_maps_to_bad_request() {
        let err = EstimatorError::invalid("monthly_bill", "must be greater than zero");
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.kind(), "INVALID_INPUT");
        assert_eq!(
            err.to_string(),
            "Invalid input: monthly_bill must be greater than zero"
        );
    }

    #[tokio::test]
    async fn unresolved_location_maps_to_unprocessable_with_body() {
        let err = EstimatorError::LocationUnresolved("no match for 'Atlantis'".into());
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            body,
            serde_json::json!({
                "error": "Location could not be resolved: no match for 'Atlantis'",
                "kind": "LOCATION_UNRESOLVED"
            })
        );
    }
}
