//! Error handling for the stub server
//!
//! Errors fall into three groups, each with its own failure policy:
//! - [`ConfigError`]: bad flags, addresses or body sources. Fatal before any socket is opened.
//! - [`RequestError`]: anything that goes wrong while answering a single request. Logged, the
//!   request is short-circuited and the server keeps serving.
//! - [`LifecycleError`]: bind, TLS and shutdown failures. Fatal, the process exits non-zero.

mod helpers;
mod response;
mod types;

pub use types::{ConfigError, LifecycleError, RequestError, Result, StubError};
