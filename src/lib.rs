//! # stubhttp
//!
//! A configurable HTTP response stub: every request, whatever its method or path, gets the
//! same configured status, headers and body.
//!
//! ## Features
//!
//! - **Fixed responses**: status, repeatable headers, literal or file body
//! - **Directory serving**: `@dir` maps request paths onto files, with traversal rejected
//! - **Basic Auth**: a single `user:password` gate with a `WWW-Authenticate` challenge
//! - **TLS**: PEM certificate and key via rustls
//! - **Count-triggered shutdown**: stop gracefully after N responses
//! - **Access log**: combined-style lines with an optional hex dump of each request
//!
//! ## Embedding
//!
//! ```rust,no_run
//! use stubhttp::{BodySource, StubConfig, StubServer, validate_address};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = StubConfig::new(validate_address("127.0.0.1:8080")?)
//!         .with_status(503)
//!         .with_header("Retry-After: 30")
//!         .with_body(BodySource::Literal("down for maintenance".to_string()))
//!         .with_count(10);
//!
//!     let server = StubServer::new(config)?;
//!     stubhttp::server::forward_os_signals(server.shutdown_signal());
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub mod config;
pub mod server;
pub mod utils;

// Re-export main types
pub use config::{
    BodySource, Credentials, DumpMode, ListenAddress, StubConfig, TlsConfig, validate_address,
};
pub use server::{BoundServer, ShutdownReason, ShutdownSignal, StubServer};
pub use utils::error::{ConfigError, LifecycleError, RequestError, Result, StubError};

// Version information
/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");
/// Short git revision the binary was built from
pub const GIT_HASH: &str = env!("GIT_HASH");

/// Default `Server` header value and banner name, e.g. `stubhttp/0.1.0`
pub fn server_identity() -> String {
    format!("{}/{}", NAME, VERSION)
}
