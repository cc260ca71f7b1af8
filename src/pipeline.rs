//! Render pipeline orchestration: normalize → launch → navigate → capture →
//! teardown. This is the single place that opens and closes sessions, which
//! is what guarantees exactly-once teardown on every exit path.

use crate::engine::{Engine, LaunchOptions};
use crate::error::Result;
use crate::options::{normalize, RenderConfig, RenderRequest};
use crate::producer::{render_html, render_pdf, render_screenshot, RenderedArtifact};
use crate::session::RenderSession;

/// Runs one request through the full pipeline.
///
/// The session opened here is closed exactly once before the outcome is
/// reported, whether navigation or capture succeeded or failed. When both the
/// producer and the teardown fail, the producer error wins: it is the cause.
pub async fn render(
    engine: &dyn Engine,
    launch_options: &LaunchOptions,
    request: &RenderRequest,
) -> Result<RenderedArtifact> {
    let config = normalize(request)?;

    let mut session = RenderSession::open(engine, launch_options).await?;
    let outcome = navigate_and_capture(&mut session, request, &config).await;
    let teardown = session.close().await;

    let artifact = outcome?;
    teardown?;
    Ok(artifact)
}

async fn navigate_and_capture(
    session: &mut RenderSession,
    request: &RenderRequest,
    config: &RenderConfig,
) -> Result<RenderedArtifact> {
    session.navigate(&request.url, config.nav()).await?;
    match config {
        RenderConfig::Html(config) => render_html(session, config).await,
        RenderConfig::Pdf(config) => render_pdf(session, config).await,
        RenderConfig::Screenshot(config) => render_screenshot(session, config).await,
    }
}
