use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use log::{error, warn};
use serde_json::json;
use thiserror::Error;

pub type ProxyResult<T> = Result<T, ProxyError>;

pub const MISSING_URL: &str = "Missing required query param: url";
const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Extraction error: {0}")]
    Extraction(String),

    #[error("Not found: {0}")]
    IdNotFound(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Upstream {service} returned status {status}")]
    UpstreamStatus {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    #[error("Upstream {service} request failed: {source}")]
    UpstreamRequest {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ProxyError {
    pub fn missing_url() -> Self {
        ProxyError::Validation(MISSING_URL.to_string())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        ProxyError::IdNotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ProxyError::Internal(msg.into())
    }

    /// Wraps a transport error. The request URL is dropped because resolved
    /// image URLs can carry an access token.
    pub fn upstream(service: &'static str, err: reqwest::Error) -> Self {
        ProxyError::UpstreamRequest {
            service,
            source: err.without_url(),
        }
    }

    /// The message rendered into `{"error": ...}`. Client-facing kinds carry
    /// their own text; everything server-side collapses to a generic message.
    pub fn client_message(&self) -> &str {
        match self {
            ProxyError::Validation(msg)
            | ProxyError::InvalidUrl(msg)
            | ProxyError::Extraction(msg)
            | ProxyError::IdNotFound(msg)
            | ProxyError::Configuration(msg) => msg,
            ProxyError::UpstreamStatus { .. }
            | ProxyError::UpstreamRequest { .. }
            | ProxyError::Internal(_) => INTERNAL_SERVER_ERROR,
        }
    }
}

impl ResponseError for ProxyError {
    fn status_code(&self) -> StatusCode {
        match self {
            ProxyError::Validation(_) | ProxyError::InvalidUrl(_) | ProxyError::Extraction(_) => {
                StatusCode::BAD_REQUEST
            }
            ProxyError::IdNotFound(_) => StatusCode::NOT_FOUND,
            ProxyError::Configuration(_)
            | ProxyError::UpstreamStatus { .. }
            | ProxyError::UpstreamRequest { .. }
            | ProxyError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!("API Error: {} - {}", status.as_u16(), self);
        } else {
            warn!("API Error: {} - {}", status.as_u16(), self);
        }

        HttpResponse::build(status).json(json!({ "error": self.client_message() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_4xx() {
        assert_eq!(ProxyError::missing_url().status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ProxyError::InvalidUrl("Invalid URL.".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ProxyError::Extraction("nothing".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(ProxyError::not_found("gone").status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn server_errors_map_to_500() {
        assert_eq!(
            ProxyError::Configuration("no token".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        let upstream = ProxyError::UpstreamStatus {
            service: "graph",
            status: reqwest::StatusCode::BAD_GATEWAY,
        };
        assert_eq!(upstream.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            ProxyError::internal("boom").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn server_side_details_stay_out_of_the_client_message() {
        let err = ProxyError::UpstreamStatus {
            service: "graph",
            status: reqwest::StatusCode::FORBIDDEN,
        };
        assert_eq!(err.client_message(), "Internal Server Error");
        assert!(err.to_string().contains("403"));

        assert_eq!(ProxyError::internal("secret detail").client_message(), "Internal Server Error");
    }

    #[test]
    fn missing_url_uses_the_exact_message() {
        assert_eq!(
            ProxyError::missing_url().client_message(),
            "Missing required query param: url"
        );
    }
}
