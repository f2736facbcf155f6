//! HTTP error envelope and mapping from domain errors.
//!
//! Keeps the domain free of transport concerns by translating
//! [`Error`](crate::domain::Error) into Actix responses here. Every failure
//! serialises as `{"error":true,"code":...,"message":...}` with optional
//! `details`, so clients can branch on the stable code or flag.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::error;
use utoipa::ToSchema;

use crate::domain::{Error, ErrorCode};

/// Standard error envelope returned by every endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Always `true`; lets untyped clients test one field.
    #[schema(example = true)]
    error: bool,
    /// Stable machine-readable code.
    #[schema(example = "forbidden")]
    code: ErrorCode,
    /// Stable human-readable message.
    #[schema(example = "Access Forbidden")]
    message: String,
    /// Supplementary structured context, e.g. settlement step reports.
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Stable machine-readable code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Supplementary error details.
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }

    fn to_status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthenticated => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::InvalidState | ErrorCode::Overbooked => StatusCode::CONFLICT,
            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<Error> for ApiError {
    fn from(value: Error) -> Self {
        Self {
            error: true,
            code: value.code(),
            message: value.message().to_owned(),
            details: value.details().cloned(),
        }
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
        self.to_status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if matches!(self.code, ErrorCode::InternalError) {
            error!(message = %self.message, "internal error redacted from response");
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
    //! Status mapping and envelope shape.

    use actix_web::body::to_bytes;
    use rstest::rstest;
    use serde_json::{Value, json};

    use super::*;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthenticated("Unauthorized Access"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("Access Forbidden"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::invalid_state("not pending"), StatusCode::CONFLICT)]
    #[case(Error::overbooked("no seats"), StatusCode::CONFLICT)]
    #[case(Error::service_unavailable("db down"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn domain_codes_map_to_http_statuses(#[case] error: Error, #[case] expected: StatusCode) {
        let api: ApiError = error.into();
        assert_eq!(api.status_code(), expected);
    }

    #[actix_rt::test]
    async fn envelopes_always_carry_the_error_flag() {
        let api: ApiError = Error::forbidden("Access Forbidden").into();
        let response = api.error_response();
        let body = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json envelope");
        assert_eq!(value.get("error"), Some(&json!(true)));
        assert_eq!(value.get("message"), Some(&json!("Access Forbidden")));
    }

    #[actix_rt::test]
    async fn internal_errors_are_redacted() {
        let api: ApiError = Error::internal("connection string leak").into();
        let response = api.error_response();
        let body = to_bytes(response.into_body()).await.expect("body");
        let value: Value = serde_json::from_slice(&body).expect("json envelope");
        assert_eq!(value.get("message"), Some(&json!("Internal server error")));
    }
}
