//! Error types for the stub server

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for the stub server
pub type Result<T> = std::result::Result<T, StubError>;

/// Top-level error, returned from startup and from the serve loop
#[derive(Error, Debug)]
pub enum StubError {
    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Listener and shutdown errors
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),
}

/// Startup validation failures
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Address is not of the form `[host]:port`
    #[error("invalid addr: {addr} (invalid format ([host]:<port>))")]
    InvalidFormat { addr: String },

    /// Port segment is not an integer
    #[error("invalid addr: {addr} ({source})")]
    InvalidPort {
        addr: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Status code outside what can be written on the wire
    #[error("invalid status code: {0} (expected 100-599)")]
    InvalidStatus(u16),

    /// Credentials without a `user:password` separator
    #[error("invalid credentials: expected '<user>:<password>'")]
    InvalidCredentials,

    /// Body source path missing or unreadable
    #[error("unable to stat body source '{}': {source}", .path.display())]
    BodySource {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Body source path is neither a regular file nor a directory
    #[error("body source '{}' is neither a file nor a directory", .path.display())]
    UnsupportedBodySource { path: PathBuf },

    /// Anything else rejected by validation
    #[error("Configuration error: {0}")]
    Invalid(String),
}

/// Per-request failures. None of these stop the server.
#[derive(Error, Debug)]
pub enum RequestError {
    /// Missing or mismatching Basic credentials
    #[error("Unauthorized")]
    Unauthorized,

    /// Configured header string without a `:` separator, or with an unusable name/value
    #[error("invalid http header: '{0}'")]
    InvalidHeader(String),

    /// Resolved path escaped the served directory
    #[error("path '{requested}' resolves outside of '{}'", .root.display())]
    PathTraversal { requested: String, root: PathBuf },

    /// Requested file does not exist
    #[error("file not found: '{}'", .path.display())]
    NotFound { path: PathBuf },

    /// Requested path exists but is not a regular file
    #[error("not a regular file: '{}'", .path.display())]
    NotAFile { path: PathBuf },

    /// stat/open/read failure
    #[error("unable to {action} file '{}': {source}", .path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Listener lifecycle failures
#[derive(Error, Debug)]
pub enum LifecycleError {
    /// Socket could not be bound
    #[error("startup error: unable to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Certificate or key could not be loaded
    #[error("startup error: TLS credentials: {0}")]
    Tls(String),

    /// Listener stopped on its own with an error
    #[error("server error: {0}")]
    Listener(#[source] std::io::Error),

    /// Graceful shutdown did not finish within the grace period
    #[error("shutdown error: graceful shutdown exceeded {0:?}")]
    ShutdownTimeout(Duration),

    /// Server reported an error while stopping
    #[error("shutdown error: {0}")]
    Shutdown(#[source] std::io::Error),
}
