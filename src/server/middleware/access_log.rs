//! Access logging middleware
//!
//! Wraps the authenticated part of the pipeline. The final status is taken from the response
//! the handler produced, the byte count is accumulated while the body streams out, and the log
//! line is written once the body is dropped (fully sent, or abandoned mid-stream).

use crate::config::DumpMode;
use crate::server::middleware::helpers::{capture_request, client_address, header_str};
use crate::server::types::RequestOutcome;
use crate::utils::hexdump;
use actix_web::body::{BodySize, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use actix_web::http::StatusCode;
use actix_web::http::header::{REFERER, USER_AGENT};
use bytes::Bytes;
use futures::future::{Ready, ready};
use pin_project_lite::pin_project;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tracing::info;

/// Target used for access log events
pub const ACCESS_LOG_TARGET: &str = "stubhttp::access";

/// Something that can watch a response being written
pub trait ObservableResponse {
    /// Record the response status; only the first call counts
    fn observe_status(&mut self, status: StatusCode);

    /// Record `len` body bytes written
    fn observe_bytes(&mut self, len: usize);
}

/// Everything one access log line needs
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub client: String,
    pub method: String,
    pub path: String,
    pub version: String,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
    pub status: Option<StatusCode>,
    pub bytes: u64,
    pub served_file: Option<PathBuf>,
    pub dump: Option<Bytes>,
    started: Instant,
}

impl AccessRecord {
    pub fn from_request(req: &ServiceRequest) -> Self {
        let path = req
            .uri()
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| req.path().to_string());

        Self {
            client: client_address(req),
            method: req.method().to_string(),
            path,
            version: format!("{:?}", req.version()),
            referer: header_str(req.headers(), REFERER).map(str::to_string),
            user_agent: header_str(req.headers(), USER_AGENT).map(str::to_string),
            status: None,
            bytes: 0,
            served_file: None,
            dump: None,
            started: Instant::now(),
        }
    }

    /// Request path, with the served file appended in directory mode
    pub fn display_path(&self) -> String {
        match &self.served_file {
            Some(file) => format!("{} ({})", self.path, file.display()),
            None => self.path.clone(),
        }
    }

    /// Combined-log style line
    pub fn line(&self, elapsed: Duration) -> String {
        format!(
            "{} \"{} {} {}\" {} {} \"{}\" \"{}\" {:.3}ms",
            self.client,
            self.method,
            self.display_path(),
            self.version,
            self.status
                .map(|s| s.as_u16().to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.bytes,
            self.referer.as_deref().unwrap_or("-"),
            self.user_agent.as_deref().unwrap_or("-"),
            elapsed.as_secs_f64() * 1000.0,
        )
    }

    pub fn emit(&self) {
        let elapsed = self.started.elapsed();
        let line = self.line(elapsed);
        let status = self.status.map(|s| s.as_u16()).unwrap_or(0);

        let message = match &self.dump {
            Some(dump) => format!("{}\n{}", line, hexdump::render(dump, "    ")),
            None => line,
        };

        info!(
            target: ACCESS_LOG_TARGET,
            client = %self.client,
            method = %self.method,
            path = %self.display_path(),
            version = %self.version,
            status,
            bytes = self.bytes,
            referer = self.referer.as_deref().unwrap_or("-"),
            user_agent = self.user_agent.as_deref().unwrap_or("-"),
            elapsed_ms = elapsed.as_millis() as u64,
            "{}",
            message
        );
    }
}

impl ObservableResponse for AccessRecord {
    fn observe_status(&mut self, status: StatusCode) {
        if self.status.is_none() {
            self.status = Some(status);
        }
    }

    fn observe_bytes(&mut self, len: usize) {
        self.bytes += len as u64;
    }
}

pin_project! {
    /// Response body that reports streamed bytes to an [`ObservableResponse`] and logs on drop
    pub struct AccessLogBody<B> {
        #[pin]
        body: B,
        record: AccessRecord,
    }

    impl<B> PinnedDrop for AccessLogBody<B> {
        fn drop(this: Pin<&mut Self>) {
            this.project().record.emit();
        }
    }
}

impl<B> AccessLogBody<B> {
    pub fn new(body: B, record: AccessRecord) -> Self {
        Self { body, record }
    }
}

impl<B: MessageBody> MessageBody for AccessLogBody<B> {
    type Error = B::Error;

    fn size(&self) -> BodySize {
        self.body.size()
    }

    fn poll_next(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Bytes, Self::Error>>> {
        let this = self.project();
        match std::task::ready!(this.body.poll_next(cx)) {
            Some(Ok(chunk)) => {
                this.record.observe_bytes(chunk.len());
                Poll::Ready(Some(Ok(chunk)))
            }
            other => Poll::Ready(other),
        }
    }
}

/// Access log middleware for Actix-web
pub struct RequestLoggerMiddleware {
    dump: DumpMode,
}

impl RequestLoggerMiddleware {
    pub fn new(dump: DumpMode) -> Self {
        Self { dump }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RequestLoggerMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<AccessLogBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = RequestLoggerMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RequestLoggerMiddlewareService {
            service: Rc::new(service),
            dump: self.dump,
        }))
    }
}

/// Service implementation for the access log middleware
pub struct RequestLoggerMiddlewareService<S> {
    service: Rc<S>,
    dump: DumpMode,
}

impl<S, B> Service<ServiceRequest> for RequestLoggerMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<AccessLogBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, mut req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let dump = self.dump;

        Box::pin(async move {
            let mut record = AccessRecord::from_request(&req);
            if dump.is_enabled() {
                record.dump = Some(capture_request(&mut req, dump).await);
            }

            let res = service.call(req).await?;

            record.observe_status(res.status());
            record.served_file = res
                .response()
                .extensions()
                .get::<RequestOutcome>()
                .and_then(|outcome| outcome.served_file.clone());

            Ok(res.map_body(move |_, body| AccessLogBody::new(body, record)))
        })
    }
}
