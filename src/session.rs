//! Per-request browser session lifecycle.
//!
//! A [`RenderSession`] owns exactly one engine connection and at most one
//! page for the duration of one request. Sessions are never shared, reused,
//! or pooled; every request pays the full launch/teardown cost by design.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as Base64Engine;
use serde_json::Value;

use crate::engine::{Command, Engine, EngineConnection, LaunchOptions};
use crate::error::{RenderError, Result};
use crate::options::{NavigationConfig, PdfConfig, ScreenshotConfig};
use crate::viewport::Viewport;

pub struct RenderSession {
    connection: Box<dyn EngineConnection>,
    launch_options: LaunchOptions,
}

impl RenderSession {
    /// Launches a fresh engine instance for this request. A launch failure is
    /// fatal for the request; the partially-started helper is torn down
    /// before the error is returned.
    pub async fn open(engine: &dyn Engine, launch_options: &LaunchOptions) -> Result<Self> {
        let mut connection = engine.connect().await?;
        if let Err(err) = connection.request(Command::Launch).await {
            let _ = connection.shutdown().await;
            return Err(err);
        }
        Ok(Self {
            connection,
            launch_options: launch_options.clone(),
        })
    }

    /// Creates the page, applies pre-navigation setup, and navigates.
    ///
    /// Credentials bind at page creation and media emulation runs before the
    /// navigation starts; protected or print-styled resources fail to load
    /// otherwise.
    pub async fn navigate(&mut self, url: &str, nav: &NavigationConfig) -> Result<()> {
        self.connection
            .request(Command::NewPage {
                ignore_https_errors: self.launch_options.ignore_https_errors,
                credentials: nav.credentials.clone(),
            })
            .await?;
        if let Some(media) = &nav.emulate_media {
            self.connection
                .request(Command::EmulateMedia {
                    media: media.clone(),
                })
                .await?;
        }
        self.connection
            .request(Command::Navigate {
                url: url.to_string(),
                timeout_ms: nav.timeout.as_millis() as u64,
                wait_until: nav.wait_until,
            })
            .await?;
        Ok(())
    }

    /// Serializes the page's current document markup.
    pub async fn content(&mut self) -> Result<String> {
        let reply = self.connection.request(Command::Content).await?;
        reply
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| RenderError::engine("engine returned no page content"))
    }

    pub async fn pdf(&mut self, config: &PdfConfig) -> Result<Vec<u8>> {
        let reply = self
            .connection
            .request(Command::Pdf {
                scale: config.scale,
                display_header_footer: config.display_header_footer,
                print_background: config.print_background,
                landscape: config.landscape,
            })
            .await?;
        decode_payload(&reply)
    }

    pub async fn set_viewport(&mut self, viewport: Viewport) -> Result<()> {
        self.connection
            .request(Command::SetViewport {
                width: viewport.width,
                height: viewport.height,
            })
            .await?;
        Ok(())
    }

    pub async fn screenshot(&mut self, config: &ScreenshotConfig) -> Result<Vec<u8>> {
        let reply = self
            .connection
            .request(Command::Screenshot {
                format: config.format,
                quality: config.quality,
                full_page: config.full_page,
                omit_background: config.omit_background,
            })
            .await?;
        decode_payload(&reply)
    }

    /// Tears the session down. Consumes the session so the single teardown
    /// path in the pipeline runs exactly once; the close handshake is best
    /// effort and the transport kills the helper if it does not exit.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.connection.request(Command::Close).await;
        let shutdown = self.connection.shutdown().await;
        closed?;
        shutdown
    }
}

fn decode_payload(reply: &Value) -> Result<Vec<u8>> {
    let encoded = reply
        .get("data")
        .and_then(Value::as_str)
        .ok_or_else(|| RenderError::engine("engine returned no capture data"))?;
    BASE64
        .decode(encoded)
        .map_err(|err| RenderError::engine(format!("engine capture data is not base64: {err}")))
}
