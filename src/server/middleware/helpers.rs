//! Helper functions for middleware

use crate::config::{Credentials, DumpMode};
use actix_web::HttpMessage;
use actix_web::dev::ServiceRequest;
use actix_web::http::header::{AUTHORIZATION, HeaderMap, HeaderName};
use base64::{Engine as _, engine::general_purpose};
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use tracing::warn;

/// Decode the `user:password` carried by a `Basic` Authorization header
pub fn extract_basic_credentials(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let encoded = value.strip_prefix("Basic ")?;
    let decoded = general_purpose::STANDARD.decode(encoded.trim()).ok()?;
    String::from_utf8(decoded).ok()
}

/// True when the request carries exactly the configured credentials
pub fn validate_basic_auth(headers: &HeaderMap, credentials: &Credentials) -> bool {
    extract_basic_credentials(headers).is_some_and(|decoded| credentials.matches(&decoded))
}

/// Header value as text, if present and visible ASCII
pub fn header_str(headers: &HeaderMap, name: HeaderName) -> Option<&str> {
    headers.get(name).and_then(|value| value.to_str().ok())
}

/// Client address for logging
pub fn client_address(req: &ServiceRequest) -> String {
    req.peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|| "-".to_string())
}

/// Rebuild the raw request (request line, headers and optionally the body) for dumping.
///
/// Reading the body consumes the payload; handlers downstream see an empty body.
pub async fn capture_request(req: &mut ServiceRequest, mode: DumpMode) -> Bytes {
    let mut raw = BytesMut::new();
    let target = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    raw.extend_from_slice(format!("{} {} {:?}\r\n", req.method(), target, req.version()).as_bytes());

    for (name, value) in req.headers().iter() {
        raw.extend_from_slice(name.as_str().as_bytes());
        raw.extend_from_slice(b": ");
        raw.extend_from_slice(value.as_bytes());
        raw.extend_from_slice(b"\r\n");
    }
    raw.extend_from_slice(b"\r\n");

    if mode.includes_body() {
        let mut payload = req.take_payload();
        while let Some(chunk) = payload.next().await {
            match chunk {
                Ok(chunk) => raw.extend_from_slice(&chunk),
                Err(e) => {
                    warn!("unable to read client request body: {}", e);
                    break;
                }
            }
        }
    }

    raw.freeze()
}
