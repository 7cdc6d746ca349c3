//! Maps `PortalError` onto HTTP status codes and JSON error bodies.

use crate::error::PortalError;
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::error;

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, PortalError>;

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    code: &'a str,
    message: String,
}

fn status_for(kind: &str) -> StatusCode {
    match kind {
        "not_found" => StatusCode::NOT_FOUND,
        "conflict" => StatusCode::CONFLICT,
        "invalid_request" => StatusCode::BAD_REQUEST,
        "unauthorized" => StatusCode::UNAUTHORIZED,
        "forbidden" => StatusCode::FORBIDDEN,
        "upstream_failure" => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn client_message(error: &PortalError) -> String {
    match error {
        PortalError::NotFound(message)
        | PortalError::Conflict(message)
        | PortalError::ValidationError(message)
        | PortalError::Unauthorized(message)
        | PortalError::Forbidden(message)
        | PortalError::UpstreamFailure(message) => message.clone(),
        PortalError::CsvError(e) => e.to_string(),
        _ => "Internal server error".to_string(),
    }
}

impl ResponseError for PortalError {
    fn status_code(&self) -> StatusCode {
        status_for(self.kind())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!(error = %self, "request failed");
        }
        HttpResponse::build(status).json(ErrorBody {
            code: self.kind(),
            message: client_message(self),
        })
    }
}
