//! HTTP server implementation
//!
//! The request pipeline (auth gate, access logger, header applier, body resolver, accountant)
//! and the lifecycle that drives it.

pub mod accounting;
pub mod body;
mod handlers;
pub mod headers;
pub mod middleware;
pub mod server;
pub mod shutdown;
pub mod state;
pub mod tls;
pub mod types;


pub use handlers::stub_response;
pub use server::{BoundServer, GRACE_PERIOD, LifecycleState, StubServer, create_app};
pub use shutdown::{ShutdownListener, ShutdownReason, ShutdownSignal, forward_os_signals};
pub use state::StubState;
