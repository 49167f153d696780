//! Fluent construction of [`StubConfig`]

use super::{BodySource, Credentials, DEFAULT_STATUS, DumpMode, ListenAddress, StubConfig, TlsConfig};

impl StubConfig {
    /// Configuration answering `200` with no headers and no body
    pub fn new(address: ListenAddress) -> Self {
        Self {
            address,
            status: DEFAULT_STATUS,
            headers: Vec::new(),
            body: BodySource::None,
            count: 0,
            tls: None,
            credentials: None,
            dump: DumpMode::Off,
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// Append a raw `Name: Value` header string
    pub fn with_header(mut self, raw: impl Into<String>) -> Self {
        self.headers.push(raw.into());
        self
    }

    pub fn with_body(mut self, body: BodySource) -> Self {
        self.body = body;
        self
    }

    /// Stop after `count` responses, 0 disables the limit
    pub fn with_count(mut self, count: u64) -> Self {
        self.count = count;
        self
    }

    pub fn with_tls(mut self, tls: TlsConfig) -> Self {
        self.tls = Some(tls);
        self
    }

    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn with_dump(mut self, dump: DumpMode) -> Self {
        self.dump = dump;
        self
    }

    /// Human-readable run mode for the startup banner
    pub fn run_description(&self) -> String {
        if self.count == 0 {
            "(run for ever)".to_string()
        } else {
            format!("(run for {} requests)", self.count)
        }
    }
}
