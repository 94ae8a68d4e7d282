//! HTTP error envelope and mapping from domain errors.
//!
//! Keeps the domain free of transport concerns: status codes and the JSON
//! envelope live here, and internal detail is redacted before it reaches
//! the caller.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};
use crate::middleware::trace::{TRACE_ID_HEADER, TraceId};

/// Standard error envelope returned by HTTP handlers.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    #[schema(example = "invalid_request")]
    code: ErrorCode,
    #[schema(example = "Something went wrong")]
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    fn status(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self {
            code: value.code(),
            message: value.message().to_owned(),
            trace_id: TraceId::current().map(|id| id.to_string()),
            details: value.details().cloned(),
        }
    }
}

impl From<actix_web::Error> for ApiError {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to API error");
        Self::from(Error::internal("internal server error"))
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ApiError {}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        self.status()
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = &self.trace_id {
            builder.insert_header((TRACE_ID_HEADER, id.clone()));
        }
        // Internal detail stays in the logs; callers see an opaque failure.
        if matches!(self.code, ErrorCode::InternalError) {
            error!(detail = %self.message, "internal error surfaced to caller");
            let mut redacted = self.clone();
            redacted.message = "Internal server error".to_owned();
            redacted.details = None;
            return builder.json(redacted);
        }
        builder.json(self)
    }
}

/// Convenience alias for HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::body::to_bytes;
    use rstest::rstest;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("nope"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("nope"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn domain_codes_map_to_status_codes(#[case] error: Error, #[case] status: StatusCode) {
        assert_eq!(ApiError::from(error).status_code(), status);
    }

    #[tokio::test]
    async fn internal_detail_is_redacted() {
        let api_error = ApiError::from(Error::internal("secret connection string"));
        let response = api_error.error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let envelope: ApiError = serde_json::from_slice(&body).expect("valid envelope");
        assert_eq!(envelope.message(), "Internal server error");
    }

    #[tokio::test]
    async fn validation_detail_is_preserved() {
        let api_error = ApiError::from(
            Error::invalid_request("missing required field: title")
                .with_details(serde_json::json!({ "field": "title" })),
        );
        let response = api_error.error_response();
        let body = to_bytes(response.into_body()).await.expect("body bytes");
        let envelope: ApiError = serde_json::from_slice(&body).expect("valid envelope");
        assert_eq!(envelope.message(), "missing required field: title");
        assert_eq!(envelope.details.expect("details")["field"], "title");
    }
}
