//! HTTP route handlers

use crate::server::body::{ResolvedBody, ServedFile, file_stream};
use crate::server::state::StubState;
use crate::server::types::RequestOutcome;
use crate::utils::error::RequestError;
use actix_web::body::SizedStream;
use actix_web::http::ConnectionType;
use actix_web::{HttpRequest, HttpResponse, ResponseError, web};
use tracing::{error, warn};

/// Answer any request with the configured status, headers and body.
///
/// Every request that reaches this handler is counted, including ones whose body could not
/// be resolved. The response that meets the threshold, and any response sent after shutdown
/// has begun, carries `Connection: close`.
pub async fn stub_response(req: HttpRequest, state: web::Data<StubState>) -> HttpResponse {
    state.accountant.record();

    let mut response = match build_response(&req, &state).await {
        Ok(response) => response,
        Err(e) => {
            match &e {
                RequestError::Io { .. } => error!("{} {}: {}", req.method(), req.path(), e),
                _ => warn!("{} {}: {}", req.method(), req.path(), e),
            }
            e.error_response()
        }
    };

    if state.accountant.closing() {
        response.head_mut().set_connection_type(ConnectionType::Close);
    }
    response
}

async fn build_response(req: &HttpRequest, state: &StubState) -> Result<HttpResponse, RequestError> {
    let request_path = req.match_info().get("tail").unwrap_or_else(|| req.path());
    let body = state.body.resolve(request_path).await?;

    let mut builder = HttpResponse::build(state.status);
    state.headers.apply(&mut builder);

    let response = match body {
        ResolvedBody::Empty => builder.finish(),
        ResolvedBody::Literal(bytes) => builder.body(bytes),
        ResolvedBody::File(ServedFile {
            path,
            len,
            file,
            from_directory,
        }) => {
            let mut response = match state.headers.content_length_override() {
                Some(declared) => builder.no_chunking(declared).streaming(file_stream(file)),
                None => builder.body(SizedStream::new(len, file_stream(file))),
            };
            if from_directory {
                response.extensions_mut().insert(RequestOutcome::served(path));
            }
            response
        }
    };

    Ok(response)
}
