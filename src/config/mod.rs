//! Configuration for the stub server
//!
//! A [`StubConfig`] is built once at startup (usually from [`cli::Cli`]) and never changes
//! afterwards. Everything here is plain data; classification of the body source against the
//! filesystem happens when the server starts.

pub mod builder;
pub mod cli;
pub mod validation;

pub use validation::{ListenAddress, Validate, validate_address};

use crate::utils::error::ConfigError;
use std::fmt;
use std::path::PathBuf;

/// Default response status
pub const DEFAULT_STATUS: u16 = 200;

/// Immutable server configuration
#[derive(Debug, Clone)]
pub struct StubConfig {
    /// Listen address
    pub address: ListenAddress,
    /// Response status code
    pub status: u16,
    /// Raw `Name: Value` header strings, in configuration order
    pub headers: Vec<String>,
    /// Response body source
    pub body: BodySource,
    /// Stop after this many responses (0 keeps running)
    pub count: u64,
    /// TLS certificate/key pair
    pub tls: Option<TlsConfig>,
    /// Basic Auth credentials
    pub credentials: Option<Credentials>,
    /// Request dumping
    pub dump: DumpMode,
}

/// Where the response body comes from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BodySource {
    /// No body
    #[default]
    None,
    /// Literal string, written verbatim
    Literal(String),
    /// A file, or a directory served by request path
    Path(PathBuf),
}

impl BodySource {
    /// Interpret a `--data` value: empty means no body, `@path` names a file or directory
    pub fn from_flag(data: &str) -> Self {
        if data.is_empty() {
            Self::None
        } else if let Some(path) = data.strip_prefix('@') {
            Self::Path(PathBuf::from(path))
        } else {
            Self::Literal(data.to_string())
        }
    }
}

/// TLS certificate and private key files (PEM)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsConfig {
    /// Certificate chain file
    pub cert_file: PathBuf,
    /// Private key file
    pub key_file: PathBuf,
}

impl TlsConfig {
    /// Only a complete pair enables TLS
    pub fn from_pair(cert: Option<PathBuf>, key: Option<PathBuf>) -> Option<Self> {
        match (cert, key) {
            (Some(cert_file), Some(key_file)) => Some(Self {
                cert_file,
                key_file,
            }),
            (None, None) => None,
            (cert, _) => {
                tracing::warn!(
                    "both --cert and --key are required for TLS (missing --{}), serving plaintext",
                    if cert.is_some() { "key" } else { "cert" }
                );
                None
            }
        }
    }
}

/// A single Basic Auth credential pair
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    user: String,
    password: String,
}

impl Credentials {
    pub fn new(user: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            password: password.into(),
        }
    }

    /// Parse `user:password`, splitting on the first colon
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        raw.split_once(':')
            .map(|(user, password)| Self::new(user, password))
            .ok_or(ConfigError::InvalidCredentials)
    }

    pub fn user(&self) -> &str {
        &self.user
    }

    /// Exact comparison against a decoded `user:password` string.
    ///
    /// Not constant-time.
    pub fn matches(&self, decoded: &str) -> bool {
        decoded
            .split_once(':')
            .is_some_and(|(user, password)| user == self.user && password == self.password)
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user", &self.user)
            .field("password", &"***")
            .finish()
    }
}

/// Whether and how much of each request is hex-dumped into the access log
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DumpMode {
    #[default]
    Off,
    /// Request line and headers
    Headers,
    /// Request line, headers and body
    HeadersAndBody,
}

impl DumpMode {
    /// `--dump-body` implies `--dump`
    pub fn from_flags(dump: bool, dump_body: bool) -> Self {
        match (dump, dump_body) {
            (_, true) => Self::HeadersAndBody,
            (true, false) => Self::Headers,
            (false, false) => Self::Off,
        }
    }

    pub fn is_enabled(self) -> bool {
        self != Self::Off
    }

    pub fn includes_body(self) -> bool {
        self == Self::HeadersAndBody
    }
}
