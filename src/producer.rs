//! Output producers: turn a live, navigated page into the final artifact
//! bytes plus the metadata the transport needs to frame the response.

use crate::error::Result;
use crate::options::{DispositionType, HtmlConfig, PdfConfig, ScreenshotConfig};
use crate::session::RenderSession;
use crate::settle::settle_animations;

/// The terminal value of the render pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedArtifact {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub content_disposition: Option<String>,
}

/// Serializes the page's rendered markup.
pub async fn render_html(
    session: &mut RenderSession,
    _config: &HtmlConfig,
) -> Result<RenderedArtifact> {
    let html = session.content().await?;
    Ok(RenderedArtifact {
        bytes: html.into_bytes(),
        content_type: "text/html; charset=utf-8".to_string(),
        content_disposition: None,
    })
}

/// Captures the page as a PDF and frames it as a named download.
pub async fn render_pdf(
    session: &mut RenderSession,
    config: &PdfConfig,
) -> Result<RenderedArtifact> {
    let bytes = session.pdf(config).await?;
    Ok(RenderedArtifact {
        bytes,
        content_type: "application/pdf".to_string(),
        content_disposition: Some(content_disposition(config.disposition, &config.filename)),
    })
}

/// Sizes the viewport, optionally waits for animations to settle, and
/// captures the page as an image.
pub async fn render_screenshot(
    session: &mut RenderSession,
    config: &ScreenshotConfig,
) -> Result<RenderedArtifact> {
    session.set_viewport(config.viewport).await?;
    if !config.animation_timeout.is_zero() {
        settle_animations(session, config, config.animation_timeout).await;
    }
    let bytes = session.screenshot(config).await?;
    Ok(RenderedArtifact {
        bytes,
        content_type: format!("image/{}", config.format.as_str()),
        content_disposition: None,
    })
}

/// Builds a `Content-Disposition` header value. Filenames are reduced to
/// printable ASCII so the value is always a legal header.
fn content_disposition(disposition: DispositionType, filename: &str) -> String {
    let mut quoted = String::with_capacity(filename.len());
    for ch in filename.chars() {
        match ch {
            '"' | '\\' => {
                quoted.push('\\');
                quoted.push(ch);
            }
            c if c.is_ascii_graphic() || c == ' ' => quoted.push(c),
            _ => quoted.push('_'),
        }
    }
    format!("{}; filename=\"{}\"", disposition.as_str(), quoted)
}
