use crate::catalog::CatalogCache;
use crate::config::Overrides;
use crate::errors::RotorError;
use crate::metrics_defs;
use crate::rotation::{self, Rotation};
use crate::store::CursorStore;
use http_body_util::{BodyExt, Full, combinators::BoxBody};
use hyper::body::{Bytes, Incoming};
use hyper::header::{ACCESS_CONTROL_ALLOW_ORIGIN, CACHE_CONTROL, CONTENT_TYPE};
use hyper::service::Service;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use shared::{counter, histogram};
use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

pub type ServiceBody = BoxBody<Bytes, RotorError>;

/// Everything a request needs: startup overrides, the lazily-cached catalog
/// and the (possibly unconfigured) cursor store.
pub struct AppState {
    pub overrides: Overrides,
    pub catalog: CatalogCache,
    pub store: Option<Arc<dyn CursorStore>>,
}

/// One hyper service handling the rotation endpoint on every path except
/// `/healthcheck`. No method restriction is enforced.
#[derive(Clone)]
pub struct RotorService {
    state: Arc<AppState>,
}

impl RotorService {
    pub fn new(state: AppState) -> Self {
        RotorService {
            state: Arc::new(state),
        }
    }
}

impl Service<Request<Incoming>> for RotorService {
    type Response = Response<ServiceBody>;
    type Error = RotorError;
    type Future =
        Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

    fn call(&self, req: Request<Incoming>) -> Self::Future {
        let state = self.state.clone();
        Box::pin(async move { handle(state, req).await })
    }
}

async fn handle(
    state: Arc<AppState>,
    req: Request<Incoming>,
) -> Result<Response<ServiceBody>, RotorError> {
    if req.uri().path() == "/healthcheck" {
        return Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from_static(b"ok\n")).map_err(|e| match e {}).boxed())
            .map_err(|e| RotorError::InternalError(format!("Failed to build response: {e}")));
    }

    let started = Instant::now();
    counter!(metrics_defs::REQUESTS).increment(1);

    let result = serve_rotation(&state, &req).await;
    histogram!(metrics_defs::REQUEST_DURATION).record(started.elapsed().as_secs_f64());

    match result {
        Ok(rotation) => success_response(&rotation),
        Err(err) => {
            tracing::error!(error = %err, path = %req.uri().path(), "rotation request failed");
            counter!(metrics_defs::REQUEST_ERRORS).increment(1);
            failure_response(&err)
        }
    }
}

async fn serve_rotation(state: &AppState, req: &Request<Incoming>) -> Result<Rotation, RotorError> {
    let catalog = state.catalog.get().await?;

    let (query_reset, query_start) = rotation_query(req.uri().query());
    let directive = rotation::resolve_directive(
        &state.overrides,
        query_reset.as_deref(),
        query_start.as_deref(),
    );

    let store = state.store.as_ref().ok_or(RotorError::StoreNotConfigured)?;
    rotation::rotate(store.as_ref(), catalog, directive).await
}

/// Extracts the `reset` and `start` query values; later duplicates win.
fn rotation_query(query: Option<&str>) -> (Option<String>, Option<String>) {
    let mut reset = None;
    let mut start = None;
    if let Some(query) = query {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "reset" => reset = Some(value.into_owned()),
                "start" => start = Some(value.into_owned()),
                _ => {}
            }
        }
    }
    (reset, start)
}

#[derive(Serialize)]
struct FailureBody {
    error: bool,
    message: String,
    details: String,
    instructions: String,
}

fn success_response(rotation: &Rotation) -> Result<Response<ServiceBody>, RotorError> {
    json_response(StatusCode::OK, rotation, true)
}

fn failure_response(err: &RotorError) -> Result<Response<ServiceBody>, RotorError> {
    let body = FailureBody {
        error: true,
        message: err.summary().to_string(),
        details: err.to_string(),
        instructions: err.instructions().to_string(),
    };
    json_response(StatusCode::INTERNAL_SERVER_ERROR, &body, false)
}

fn json_response<T: Serialize>(
    status: StatusCode,
    value: &T,
    no_store: bool,
) -> Result<Response<ServiceBody>, RotorError> {
    let bytes = serde_json::to_vec(value)
        .map_err(|e| RotorError::InternalError(format!("Failed to serialize response: {e}")))?;

    let mut builder = Response::builder()
        .status(status)
        .header(CONTENT_TYPE, "application/json")
        .header(ACCESS_CONTROL_ALLOW_ORIGIN, "*");
    if no_store {
        builder = builder.header(CACHE_CONTROL, "no-store");
    }

    builder
        .body(Full::new(Bytes::from(bytes)).map_err(|e| match e {}).boxed())
        .map_err(|e| RotorError::InternalError(format!("Failed to build response: {e}")))
}
