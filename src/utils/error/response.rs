//! HTTP response handling for request errors

use super::types::RequestError;
use actix_web::http::StatusCode;
use actix_web::http::header::{CONTENT_TYPE, WWW_AUTHENTICATE};
use actix_web::{HttpResponse, ResponseError};

/// Challenge sent with every 401
pub const BASIC_CHALLENGE: &str = "Basic realm=\"Auth Required\"";

impl ResponseError for RequestError {
    fn status_code(&self) -> StatusCode {
        match self {
            RequestError::Unauthorized => StatusCode::UNAUTHORIZED,
            RequestError::PathTraversal { .. } => StatusCode::FORBIDDEN,
            RequestError::NotFound { .. } | RequestError::NotAFile { .. } => StatusCode::NOT_FOUND,
            RequestError::InvalidHeader(_) | RequestError::Io { .. } => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            RequestError::Unauthorized => HttpResponse::Unauthorized()
                .insert_header((WWW_AUTHENTICATE, BASIC_CHALLENGE))
                .insert_header((CONTENT_TYPE, "text/plain; charset=utf-8"))
                .body("Unauthorized"),
            // Rejected body resolution never carries content
            _ => HttpResponse::build(self.status_code()).finish(),
        }
    }
}
