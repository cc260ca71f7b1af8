//! rendergate library
//!
//! A URL-to-document rendering gateway: given a web address, drive a headless
//! browser and return the rendered page as raw HTML, a PDF, or a screenshot
//! image.
//!
//! # Module Overview
//!
//! - [`options`] - Request parsing and option normalization into typed configs
//! - [`engine`] - Engine command protocol and the Playwright helper transport
//! - [`session`] - Per-request browser session lifecycle
//! - [`producer`] - HTML/PDF/screenshot output producers
//! - [`settle`] - Animation settling before screenshot capture
//! - [`pipeline`] - End-to-end orchestration with guaranteed teardown
//! - [`server`] - axum transport wrapper
//! - [`error`] - Error taxonomy
//!
//! # Example
//!
//! ```no_run
//! use std::collections::HashMap;
//! use rendergate_lib::{render, LaunchOptions, PlaywrightEngine, RenderRequest};
//!
//! # async fn example() -> rendergate_lib::Result<()> {
//! let engine = PlaywrightEngine::default();
//! let mut params = HashMap::new();
//! params.insert("url".to_string(), "example.com".to_string());
//! params.insert("type".to_string(), "pdf".to_string());
//!
//! let request = RenderRequest::from_query(params)?;
//! let artifact = render(&engine, &LaunchOptions::default(), &request).await?;
//! assert_eq!(artifact.content_type, "application/pdf");
//! # Ok(())
//! # }
//! ```

pub mod engine;
pub mod error;
pub mod options;
pub mod pipeline;
pub mod producer;
pub mod server;
pub mod session;
pub mod settle;
pub mod viewport;

pub use engine::{Command, Engine, EngineConnection, LaunchOptions, PlaywrightEngine};
pub use error::{ErrorCategory, RenderError, Result};
pub use options::{
    normalize, Credentials, DispositionType, HtmlConfig, ImageFormat, NavigationConfig,
    OutputType, PdfConfig, RenderConfig, RenderRequest, ScreenshotConfig, WaitUntil,
    DEFAULT_NAVIGATION_TIMEOUT,
};
pub use pipeline::render;
pub use producer::{render_html, render_pdf, render_screenshot, RenderedArtifact};
pub use server::{router, AppState, GENERIC_FAILURE, MISSING_URL_HELP};
pub use session::RenderSession;
pub use settle::settle_animations;
pub use viewport::Viewport;
