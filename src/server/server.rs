//! HTTP server core implementation
//!
//! [`StubServer`] moves through `Configured → Starting → Listening → ShuttingDown → Stopped`.
//! Construction validates the configuration and classifies the body source, [`StubServer::bind`]
//! opens the socket, and [`BoundServer::serve`] runs until a [`ShutdownReason`] arrives.

use crate::config::{StubConfig, Validate};
use crate::server::handlers::stub_response;
use crate::server::middleware::{BasicAuthMiddleware, RequestLoggerMiddleware};
use crate::server::shutdown::{self, ShutdownListener, ShutdownReason, ShutdownSignal};
use crate::server::state::StubState;
use crate::server::tls;
use crate::utils::error::{ConfigError, LifecycleError};
use actix_web::dev::Server;
use actix_web::{App, HttpServer, web};
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info};

/// How long in-flight requests get to finish once shutdown starts
pub const GRACE_PERIOD: Duration = Duration::from_secs(10);

/// Where a server is in its life
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Configured,
    Starting,
    Listening,
    ShuttingDown,
    Stopped,
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LifecycleState::Configured => "configured",
            LifecycleState::Starting => "starting",
            LifecycleState::Listening => "listening",
            LifecycleState::ShuttingDown => "shutting down",
            LifecycleState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Create the Actix-web application.
///
/// Every path and method lands on [`stub_response`]. The auth gate wraps the access logger, so
/// rejected requests are neither logged as served nor counted.
pub fn create_app(
    state: web::Data<StubState>,
) -> App<
    impl actix_web::dev::ServiceFactory<
        actix_web::dev::ServiceRequest,
        Config = (),
        Response = actix_web::dev::ServiceResponse<impl actix_web::body::MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let credentials = state.credentials.clone();
    let dump = state.dump;

    App::new()
        .app_data(state)
        .wrap(RequestLoggerMiddleware::new(dump))
        .wrap(BasicAuthMiddleware::new(credentials))
        .service(web::resource("/{tail:.*}").to(stub_response))
        .default_service(web::to(stub_response))
}

/// A configured stub server that has not opened its socket yet
pub struct StubServer {
    config: StubConfig,
    state: web::Data<StubState>,
    signal: ShutdownSignal,
    listener: ShutdownListener,
    lifecycle: LifecycleState,
}

impl StubServer {
    /// Validate `config` and classify the body source. Nothing is bound yet.
    pub fn new(config: StubConfig) -> Result<Self, ConfigError> {
        debug!("lifecycle: {} -> {}", LifecycleState::Configured, LifecycleState::Starting);
        config.validate().map_err(ConfigError::invalid)?;

        let (signal, listener) = shutdown::channel();
        let state = StubState::new(&config, signal.clone())?;

        Ok(Self {
            config,
            state: web::Data::new(state),
            signal,
            listener,
            lifecycle: LifecycleState::Starting,
        })
    }

    /// Handle for requesting shutdown, e.g. from OS signals
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.signal.clone()
    }

    pub fn state(&self) -> web::Data<StubState> {
        self.state.clone()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        self.lifecycle
    }

    pub fn config(&self) -> &StubConfig {
        &self.config
    }

    /// Bind the listening socket, over TLS when a certificate pair is configured
    pub fn bind(self) -> Result<BoundServer, LifecycleError> {
        info!(
            "starting {} on {} {}",
            crate::server_identity(),
            self.config.address,
            self.config.run_description()
        );

        let addr = self.config.address.bind_target();
        let state = self.state.clone();
        let builder = HttpServer::new(move || create_app(state.clone()))
            .disable_signals()
            .shutdown_timeout(GRACE_PERIOD.as_secs());

        let builder = match &self.config.tls {
            Some(tls_config) => {
                let server_config = tls::load_server_config(tls_config)?;
                debug!("serving TLS with {}", tls_config.cert_file.display());
                builder.bind_rustls_0_23(addr.as_str(), server_config)
            }
            None => builder.bind(addr.as_str()),
        }
        .map_err(|e| LifecycleError::bind(addr.as_str(), e))?;

        let local_addrs = builder.addrs();
        debug!("lifecycle: {} -> {}", self.lifecycle, LifecycleState::Listening);

        Ok(BoundServer {
            server: builder.run(),
            state: self.state,
            _signal: self.signal,
            listener: self.listener,
            local_addrs,
        })
    }

    /// Bind and serve until shutdown
    pub async fn run(self) -> Result<(), LifecycleError> {
        self.bind()?.serve().await
    }
}

/// A stub server with an open socket, ready to serve
pub struct BoundServer {
    server: Server,
    state: web::Data<StubState>,
    // Keeps the channel open so the listener only ends on a real request.
    _signal: ShutdownSignal,
    listener: ShutdownListener,
    local_addrs: Vec<SocketAddr>,
}

impl BoundServer {
    /// Addresses actually bound, useful with port 0
    pub fn local_addrs(&self) -> &[SocketAddr] {
        &self.local_addrs
    }

    pub fn state(&self) -> web::Data<StubState> {
        self.state.clone()
    }

    pub fn lifecycle(&self) -> LifecycleState {
        LifecycleState::Listening
    }

    /// Serve until a shutdown request arrives, then stop gracefully within [`GRACE_PERIOD`]
    pub async fn serve(self) -> Result<(), LifecycleError> {
        let BoundServer {
            server,
            state,
            mut listener,
            ..
        } = self;
        let handle = server.handle();
        tokio::pin!(server);

        let reason = tokio::select! {
            res = &mut server => {
                debug!("lifecycle: {} -> {}", LifecycleState::Listening, LifecycleState::Stopped);
                return res.map_err(LifecycleError::Listener);
            }
            reason = listener.wait() => reason,
        };

        match reason {
            // the accountant already announced it
            Some(ShutdownReason::ThresholdReached(_)) => {}
            Some(reason) => info!(
                "{}, shutting down after {} responses",
                reason,
                state.accountant.served()
            ),
            None => info!(
                "shutting down after {} responses",
                state.accountant.served()
            ),
        }
        debug!("lifecycle: {} -> {}", LifecycleState::Listening, LifecycleState::ShuttingDown);
        state.accountant.begin_shutdown();

        let stopped = tokio::time::timeout(GRACE_PERIOD, async {
            let ((), res) = tokio::join!(handle.stop(true), server.as_mut());
            res
        })
        .await;

        debug!("lifecycle: {} -> {}", LifecycleState::ShuttingDown, LifecycleState::Stopped);
        match stopped {
            Ok(Ok(())) => {
                info!("server stopped");
                Ok(())
            }
            Ok(Err(e)) => Err(LifecycleError::Shutdown(e)),
            Err(_) => Err(LifecycleError::ShutdownTimeout(GRACE_PERIOD)),
        }
    }
}
