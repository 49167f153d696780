//! Command line surface

use super::{BodySource, Credentials, DumpMode, StubConfig, TlsConfig, validate_address};
use crate::utils::error::ConfigError;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// Answer every HTTP request with the same configured response
#[derive(Debug, Parser)]
#[command(name = "stubhttp", version, long_version = LONG_VERSION)]
pub struct Cli {
    /// Return status code, 100-599 (codes below 100 are rejected at startup)
    #[arg(short = 's', long = "status", default_value_t = super::DEFAULT_STATUS)]
    pub status: u16,

    /// HTTP response header, repeatable
    #[arg(short = 'H', long = "header", value_name = "NAME:VALUE")]
    pub headers: Vec<String>,

    /// Response body, or @file / @directory to serve from disk
    #[arg(short = 'd', long = "data", value_name = "DATA|@PATH", default_value = "")]
    pub data: String,

    /// Exit after number of requests (0 keeps running)
    #[arg(short = 'c', long = "count", default_value_t = 0)]
    pub count: u64,

    /// TLS certificate file
    #[arg(long = "cert", value_name = "FILE")]
    pub cert: Option<PathBuf>,

    /// TLS private key file
    #[arg(long = "key", value_name = "FILE")]
    pub key: Option<PathBuf>,

    /// User credentials for Basic Auth
    #[arg(short = 'u', long = "user", value_name = "USER:PASSWORD")]
    pub user: Option<String>,

    /// Dump client request
    #[arg(long = "dump")]
    pub dump: bool,

    /// Dump client request including the body
    #[arg(long = "dump-body")]
    pub dump_body: bool,

    /// Log filter directive
    #[arg(long = "log-level", value_name = "FILTER", default_value = "info")]
    pub log_level: String,

    /// Log output format
    #[arg(long = "log-format", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    /// Listen address
    #[arg(value_name = "[HOST]:PORT")]
    pub addr: String,
}

/// Log line rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl TryFrom<Cli> for StubConfig {
    type Error = ConfigError;

    fn try_from(cli: Cli) -> Result<Self, Self::Error> {
        let address = validate_address(&cli.addr)?;
        let credentials = cli.user.as_deref().map(Credentials::parse).transpose()?;

        let mut config = StubConfig::new(address)
            .with_status(cli.status)
            .with_body(BodySource::from_flag(&cli.data))
            .with_count(cli.count)
            .with_dump(DumpMode::from_flags(cli.dump, cli.dump_body));
        config.headers = cli.headers;
        config.tls = TlsConfig::from_pair(cli.cert, cli.key);
        config.credentials = credentials;

        Ok(config)
    }
}
