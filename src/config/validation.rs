//! Configuration validation
//!
//! The address validator runs while flags are converted; everything else is checked through
//! [`Validate`] before the server leaves the `Starting` state.

use super::StubConfig;
use crate::utils::error::ConfigError;
use actix_web::http::StatusCode;
use std::fmt;
use tracing::debug;

/// Validation trait for configuration structures
pub trait Validate {
    fn validate(&self) -> Result<(), String>;
}

/// A validated `[host]:port` listen address.
///
/// The port is only known to be an integer; range checks are left to the bind call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenAddress {
    host: String,
    port: i64,
}

impl ListenAddress {
    /// Host part, empty when binding all interfaces
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> i64 {
        self.port
    }

    /// Address handed to the socket bind
    pub fn bind_target(&self) -> String {
        if self.host.is_empty() {
            format!("0.0.0.0:{}", self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl fmt::Display for ListenAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// Validate a `[host]:port` string, splitting on the first colon.
///
/// `":8080"` is accepted and binds every interface.
pub fn validate_address(addr: &str) -> Result<ListenAddress, ConfigError> {
    let (host, port) = addr
        .split_once(':')
        .ok_or_else(|| ConfigError::InvalidFormat {
            addr: addr.to_string(),
        })?;

    let port = port.parse::<i64>().map_err(|source| ConfigError::InvalidPort {
        addr: addr.to_string(),
        source,
    })?;

    Ok(ListenAddress {
        host: host.to_string(),
        port,
    })
}

/// Check that `code` can be written as a response status
pub fn validate_status(code: u16) -> Result<StatusCode, ConfigError> {
    if code > 599 {
        return Err(ConfigError::InvalidStatus(code));
    }
    StatusCode::from_u16(code).map_err(|_| ConfigError::InvalidStatus(code))
}

impl Validate for StubConfig {
    fn validate(&self) -> Result<(), String> {
        debug!("Validating stub configuration");

        validate_status(self.status).map_err(|e| e.to_string())?;

        if let Some(tls) = &self.tls {
            if tls.cert_file.as_os_str().is_empty() {
                return Err("TLS cert file path cannot be empty".to_string());
            }
            if tls.key_file.as_os_str().is_empty() {
                return Err("TLS key file path cannot be empty".to_string());
            }
        }

        Ok(())
    }
}
