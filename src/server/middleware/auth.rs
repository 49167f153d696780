//! Basic authentication gate
//!
//! Rejected requests are answered here with a 401 and never reach the access logger, the
//! handler or the request accountant.

use crate::config::Credentials;
use crate::server::middleware::helpers::{client_address, validate_basic_auth};
use crate::utils::error::RequestError;
use actix_web::ResponseError;
use actix_web::body::EitherBody;
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready};
use futures::future::{Ready, ready};
use std::future::Future;
use std::pin::Pin;
use tracing::warn;

/// Basic auth middleware for Actix-web; passes everything when no credentials are configured
pub struct BasicAuthMiddleware {
    credentials: Option<Credentials>,
}

impl BasicAuthMiddleware {
    pub fn new(credentials: Option<Credentials>) -> Self {
        Self { credentials }
    }
}

impl<S, B> Transform<S, ServiceRequest> for BasicAuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type InitError = ();
    type Transform = BasicAuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(BasicAuthMiddlewareService {
            service,
            credentials: self.credentials.clone(),
        }))
    }
}

/// Service implementation for the basic auth middleware
pub struct BasicAuthMiddlewareService<S> {
    service: S,
    credentials: Option<Credentials>,
}

impl<S, B> Service<ServiceRequest> for BasicAuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = actix_web::Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = actix_web::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        if let Some(credentials) = &self.credentials {
            if !validate_basic_auth(req.headers(), credentials) {
                warn!(
                    "unauthorized request from {}: {} {}",
                    client_address(&req),
                    req.method(),
                    req.path()
                );
                let response = req
                    .into_response(RequestError::Unauthorized.error_response())
                    .map_into_right_body();
                return Box::pin(async move { Ok(response) });
            }
        }

        let fut = self.service.call(req);
        Box::pin(async move {
            let res = fut.await?;
            Ok(res.map_into_left_body())
        })
    }
}
