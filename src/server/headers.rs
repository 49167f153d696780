//! Response header assembly
//!
//! Configured headers are kept as raw strings and parsed per request, so a malformed entry
//! is reported on every request it would have applied to and never aborts the response.

use crate::utils::error::RequestError;
use actix_web::HttpResponseBuilder;
use actix_web::http::header::{CONTENT_LENGTH, HeaderName, HeaderValue, SERVER};
use tracing::warn;

/// Split a raw header string on its first colon.
///
/// The value is everything after the colon, untrimmed.
pub fn parse_raw_header(raw: &str) -> Result<(&str, &str), RequestError> {
    raw.split_once(':')
        .ok_or_else(|| RequestError::invalid_header(raw))
}

/// Applies configured headers, plus a default `Server` header
#[derive(Debug, Clone)]
pub struct HeaderApplier {
    raw: Vec<String>,
    identity: String,
    content_length: Option<u64>,
}

impl HeaderApplier {
    pub fn new(raw: Vec<String>, identity: impl Into<String>) -> Self {
        let content_length = explicit_content_length(&raw);
        Self {
            raw,
            identity: identity.into(),
            content_length,
        }
    }

    /// Content-Length configured by the operator, if one parses as a byte count
    pub fn content_length_override(&self) -> Option<u64> {
        self.content_length
    }

    /// Append every valid configured header in order, duplicates included.
    ///
    /// Returns the number of configured headers applied.
    pub fn apply(&self, builder: &mut HttpResponseBuilder) -> usize {
        let mut applied = 0;
        let mut has_server = false;

        for raw in &self.raw {
            match to_header_pair(raw) {
                Ok((name, value)) => {
                    has_server |= name == SERVER;
                    builder.append_header((name, value));
                    applied += 1;
                }
                Err(e) => warn!("unable to add response header: {}", e),
            }
        }

        if !has_server {
            if let Ok(value) = HeaderValue::from_str(&self.identity) {
                builder.insert_header((SERVER, value));
            }
        }

        applied
    }
}

fn to_header_pair(raw: &str) -> Result<(HeaderName, HeaderValue), RequestError> {
    let (name, value) = parse_raw_header(raw)?;
    let name = HeaderName::from_bytes(name.trim().as_bytes())
        .map_err(|_| RequestError::invalid_header(raw))?;
    let value =
        HeaderValue::from_str(value.trim()).map_err(|_| RequestError::invalid_header(raw))?;
    Ok((name, value))
}

fn explicit_content_length(raw: &[String]) -> Option<u64> {
    raw.iter()
        .filter_map(|raw| to_header_pair(raw).ok())
        .find(|(name, _)| *name == CONTENT_LENGTH)
        .and_then(|(_, value)| value.to_str().ok()?.parse().ok())
}
