//! Helper functions for creating specific error types

use super::types::{ConfigError, LifecycleError, RequestError};
use std::path::PathBuf;

impl ConfigError {
    pub fn invalid<S: Into<String>>(message: S) -> Self {
        Self::Invalid(message.into())
    }
}

impl RequestError {
    pub fn invalid_header<S: Into<String>>(raw: S) -> Self {
        Self::InvalidHeader(raw.into())
    }

    /// Map an I/O failure on `path`, turning `NotFound` into its own variant
    pub fn io(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Self::NotFound { path }
        } else {
            Self::Io {
                action,
                path,
                source,
            }
        }
    }
}

impl LifecycleError {
    pub fn bind<S: Into<String>>(addr: S, source: std::io::Error) -> Self {
        Self::Bind {
            addr: addr.into(),
            source,
        }
    }

    pub fn tls<S: Into<String>>(message: S) -> Self {
        Self::Tls(message.into())
    }
}
