//! Browser-engine abstraction.
//!
//! The pipeline drives the engine through a small line-delimited JSON command
//! protocol. [`Command`] is the typed form of that protocol; [`Engine`] and
//! [`EngineConnection`] are the seam between the render pipeline and the
//! concrete Playwright transport, so tests can substitute a scripted engine.

pub mod playwright;

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;

use crate::error::{RenderError, Result};
use crate::options::{Credentials, ImageFormat, WaitUntil};

pub use playwright::PlaywrightEngine;

/// Deadline for browser launch, page creation, and media emulation replies.
pub const SETUP_DEADLINE: Duration = Duration::from_secs(30);

/// Deadline for capture replies (content, pdf, screenshot).
pub const CAPTURE_DEADLINE: Duration = Duration::from_secs(60);

/// Grace added on top of the request's navigation timeout before the helper
/// is considered wedged.
pub const NAVIGATION_GRACE: Duration = Duration::from_secs(5);

/// Deadline for the close handshake before the helper is killed.
pub const CLOSE_DEADLINE: Duration = Duration::from_secs(5);

/// Engine launch parameters resolved from process configuration.
#[derive(Debug, Clone, Default)]
pub struct LaunchOptions {
    /// Tolerate TLS certificate errors during outbound navigation.
    pub ignore_https_errors: bool,
}

/// One command sent to the engine helper. Serializes to a single JSON object
/// tagged with `cmd`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    Launch,
    NewPage {
        ignore_https_errors: bool,
        credentials: Option<Credentials>,
    },
    EmulateMedia {
        media: String,
    },
    Navigate {
        url: String,
        timeout_ms: u64,
        wait_until: WaitUntil,
    },
    Content,
    SetViewport {
        width: u32,
        height: u32,
    },
    Pdf {
        scale: f64,
        display_header_footer: bool,
        print_background: bool,
        landscape: bool,
    },
    Screenshot {
        format: ImageFormat,
        quality: u32,
        full_page: bool,
        omit_background: bool,
    },
    Close,
}

impl Command {
    /// Short label used in logs and error messages.
    pub fn label(&self) -> &'static str {
        match self {
            Command::Launch => "launch",
            Command::NewPage { .. } => "new_page",
            Command::EmulateMedia { .. } => "emulate_media",
            Command::Navigate { .. } => "navigate",
            Command::Content => "content",
            Command::SetViewport { .. } => "set_viewport",
            Command::Pdf { .. } => "pdf",
            Command::Screenshot { .. } => "screenshot",
            Command::Close => "close",
        }
    }

    /// How long the transport waits for this command's reply.
    pub fn deadline(&self) -> Duration {
        match self {
            Command::Navigate { timeout_ms, .. } => {
                Duration::from_millis(*timeout_ms) + NAVIGATION_GRACE
            }
            Command::Content | Command::Pdf { .. } | Command::Screenshot { .. } => CAPTURE_DEADLINE,
            Command::Close => CLOSE_DEADLINE,
            _ => SETUP_DEADLINE,
        }
    }

    /// Wraps an engine failure for this command in the matching error
    /// category.
    pub fn failure(&self, message: impl Into<String>) -> RenderError {
        let message = message.into();
        match self {
            Command::Launch | Command::NewPage { .. } => RenderError::Launch(message),
            Command::EmulateMedia { .. } | Command::Navigate { .. } => {
                RenderError::Navigation(message)
            }
            Command::Content
            | Command::SetViewport { .. }
            | Command::Pdf { .. }
            | Command::Screenshot { .. } => RenderError::Capture(message),
            Command::Close => RenderError::Engine(message),
        }
    }
}

/// Factory for per-request engine connections. One connection is one browser
/// instance; connections are never shared or pooled.
#[async_trait]
pub trait Engine: Send + Sync {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>>;
}

/// A live conversation with one engine instance.
#[async_trait]
pub trait EngineConnection: Send {
    /// Sends one command and waits for its reply payload.
    async fn request(&mut self, command: Command) -> Result<Value>;

    /// Releases the underlying engine process. Infallible teardown is the
    /// transport's responsibility; errors here are advisory.
    async fn shutdown(&mut self) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;

    #[test]
    fn commands_serialize_with_cmd_tag() {
        let command = Command::Navigate {
            url: "http://example.com".to_string(),
            timeout_ms: 30_000,
            wait_until: WaitUntil::NetworkIdle2,
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["cmd"], "navigate");
        assert_eq!(value["url"], "http://example.com");
        assert_eq!(value["timeout_ms"], 30_000);
        assert_eq!(value["wait_until"], "networkidle2");

        let value = serde_json::to_value(Command::Launch).unwrap();
        assert_eq!(value["cmd"], "launch");
    }

    #[test]
    fn nan_scale_crosses_the_protocol_as_null() {
        let command = Command::Pdf {
            scale: f64::NAN,
            display_header_footer: false,
            print_background: false,
            landscape: false,
        };
        let value = serde_json::to_value(&command).unwrap();
        assert!(value["scale"].is_null());
    }

    #[test]
    fn screenshot_command_carries_format_as_lowercase() {
        let command = Command::Screenshot {
            format: ImageFormat::Jpeg,
            quality: 80,
            full_page: true,
            omit_background: false,
        };
        let value = serde_json::to_value(&command).unwrap();
        assert_eq!(value["format"], "jpeg");
        assert_eq!(value["full_page"], true);
    }

    #[test]
    fn navigation_deadline_extends_the_request_timeout() {
        let command = Command::Navigate {
            url: "http://example.com".to_string(),
            timeout_ms: 10_000,
            wait_until: WaitUntil::Load,
        };
        assert_eq!(
            command.deadline(),
            Duration::from_millis(10_000) + NAVIGATION_GRACE
        );
        assert_eq!(Command::Content.deadline(), CAPTURE_DEADLINE);
        assert_eq!(Command::Launch.deadline(), SETUP_DEADLINE);
    }

    #[test]
    fn failures_map_to_their_pipeline_stage() {
        assert_eq!(
            Command::Launch.failure("boom").category(),
            ErrorCategory::Launch
        );
        let navigate = Command::Navigate {
            url: String::new(),
            timeout_ms: 0,
            wait_until: WaitUntil::Load,
        };
        assert_eq!(navigate.failure("boom").category(), ErrorCategory::Navigation);
        assert_eq!(
            Command::Content.failure("boom").category(),
            ErrorCategory::Capture
        );
    }
}
