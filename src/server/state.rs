//! Application state shared across HTTP handlers

use crate::config::{Credentials, DumpMode, StubConfig, validation::validate_status};
use crate::server::accounting::RequestAccountant;
use crate::server::body::BodyResolver;
use crate::server::headers::HeaderApplier;
use crate::server::shutdown::ShutdownSignal;
use crate::utils::error::ConfigError;
use actix_web::http::StatusCode;

/// Server state shared across workers.
///
/// Everything except the accountant is read-only after construction.
#[derive(Debug)]
pub struct StubState {
    /// Status every response carries
    pub status: StatusCode,
    /// Configured response headers
    pub headers: HeaderApplier,
    /// Body source, classified at startup
    pub body: BodyResolver,
    /// Response counter and shutdown trigger
    pub accountant: RequestAccountant,
    /// Basic Auth gate
    pub credentials: Option<Credentials>,
    /// Request dumping for the access log
    pub dump: DumpMode,
}

impl StubState {
    /// Build the shared state, touching the filesystem to classify the body source
    pub fn new(config: &StubConfig, signal: ShutdownSignal) -> Result<Self, ConfigError> {
        Ok(Self {
            status: validate_status(config.status)?,
            headers: HeaderApplier::new(config.headers.clone(), crate::server_identity()),
            body: BodyResolver::classify(&config.body)?,
            accountant: RequestAccountant::new(config.count, signal),
            credentials: config.credentials.clone(),
            dump: config.dump,
        })
    }
}
