//! HTTP middleware implementations
//!
//! - Basic authentication gate
//! - Access logging with optional request dump

mod access_log;
mod auth;
mod helpers;


pub use access_log::{
    ACCESS_LOG_TARGET, AccessLogBody, AccessRecord, ObservableResponse, RequestLoggerMiddleware,
    RequestLoggerMiddlewareService,
};
pub use auth::{BasicAuthMiddleware, BasicAuthMiddlewareService};
pub use helpers::{capture_request, extract_basic_credentials, validate_basic_auth};
