//! HTTP transport wrapper around the render pipeline.
//!
//! Every method and path hits the same handler; the query string is the whole
//! request surface. The error surface is deliberately flat: a missing or
//! malformed `url` is a 400 with usage guidance, anything else collapses to a
//! generic 500 while the concrete cause goes to the server log only.

use std::collections::HashMap;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Query, State};
use axum::http::{header, Response, StatusCode};
use axum::response::IntoResponse;
use axum::Router;
use tracing::{error, info, warn};

use crate::engine::{Engine, LaunchOptions};
use crate::error::{ErrorCategory, RenderError};
use crate::options::RenderRequest;
use crate::pipeline;
use crate::producer::RenderedArtifact;

/// Guidance returned for requests without a usable `url`.
pub const MISSING_URL_HELP: &str =
    "Search with url parameter. For example, ?url=http://yourdomain";

/// Body of every non-validation failure; details stay server-side.
pub const GENERIC_FAILURE: &str = "Oops, An expected error seems to have occurred.";

/// Request-independent server state. The engine factory is shared; every
/// request still gets its own engine instance.
pub struct AppState {
    pub engine: Arc<dyn Engine>,
    pub launch_options: LaunchOptions,
}

impl AppState {
    pub fn new(engine: Arc<dyn Engine>, launch_options: LaunchOptions) -> Self {
        Self {
            engine,
            launch_options,
        }
    }
}

/// Builds the gateway router: one fallback handler for every path.
pub fn router(state: Arc<AppState>) -> Router {
    Router::new().fallback(render_handler).with_state(state)
}

async fn render_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> Response<Body> {
    let request = match RenderRequest::from_query(params) {
        Ok(request) => request,
        Err(err) => {
            warn!(error = %err, "rejected request");
            return error_response(&err);
        }
    };

    info!(url = %request.url, output = ?request.output_type, "rendering");
    match pipeline::render(state.engine.as_ref(), &state.launch_options, &request).await {
        Ok(artifact) => artifact_response(artifact),
        Err(err) => {
            error!(
                url = %request.url,
                category = ?err.category(),
                error = %err,
                "render failed"
            );
            error_response(&err)
        }
    }
}

fn error_response(err: &RenderError) -> Response<Body> {
    match err.category() {
        ErrorCategory::Validation => {
            (StatusCode::BAD_REQUEST, MISSING_URL_HELP).into_response()
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE).into_response(),
    }
}

fn artifact_response(artifact: RenderedArtifact) -> Response<Body> {
    let content_length = artifact.bytes.len();
    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, artifact.content_type.as_str())
        .header(header::CONTENT_LENGTH, content_length);
    if let Some(disposition) = artifact.content_disposition.as_deref() {
        builder = builder.header(header::CONTENT_DISPOSITION, disposition);
    }
    match builder.body(Body::from(artifact.bytes)) {
        Ok(response) => response,
        Err(err) => {
            error!(error = %err, "failed to frame response headers");
            (StatusCode::INTERNAL_SERVER_ERROR, GENERIC_FAILURE).into_response()
        }
    }
}
