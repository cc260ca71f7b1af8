//! Request parsing and option normalization.
//!
//! Inbound requests arrive as a flat, stringly-typed key/value map (the
//! transport has already flattened dot-notation nesting). This module turns
//! that map into one of three strongly-typed render configurations, applying
//! type coercion, default substitution, and PDF filename derivation.

use std::collections::HashMap;
use std::time::Duration;

use serde::Serialize;
use url::Url;

use crate::error::{RenderError, Result};
use crate::viewport::Viewport;

/// Default navigation timeout when the request does not override it.
pub const DEFAULT_NAVIGATION_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Default PDF render scale.
pub const DEFAULT_PDF_SCALE: f64 = 1.0;

/// Default media emulation applied to PDF renders.
pub const DEFAULT_PDF_MEDIA: &str = "print";

/// Default quality for non-png screenshot formats.
pub const DEFAULT_LOSSY_QUALITY: u32 = 100;

/// The artifact kind selected by the `type` query parameter.
///
/// Anything other than `pdf` or `screenshot` (including an absent parameter)
/// renders plain HTML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Html,
    Pdf,
    Screenshot,
}

impl OutputType {
    pub fn from_param(value: &str) -> Self {
        match value {
            "pdf" => OutputType::Pdf,
            "screenshot" => OutputType::Screenshot,
            _ => OutputType::Html,
        }
    }
}

/// Navigation-completion criterion forwarded to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WaitUntil {
    Load,
    DomContentLoaded,
    NetworkIdle0,
    #[default]
    NetworkIdle2,
}

impl WaitUntil {
    fn from_param(value: &str) -> Self {
        match value {
            "load" => WaitUntil::Load,
            "domcontentloaded" => WaitUntil::DomContentLoaded,
            "networkidle0" => WaitUntil::NetworkIdle0,
            "networkidle2" => WaitUntil::NetworkIdle2,
            _ => WaitUntil::default(),
        }
    }
}

/// Screenshot image encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    #[default]
    Png,
    Jpeg,
    Webp,
}

impl ImageFormat {
    fn from_param(value: &str) -> Self {
        match value {
            "png" => ImageFormat::Png,
            "jpeg" => ImageFormat::Jpeg,
            "webp" => ImageFormat::Webp,
            _ => ImageFormat::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Jpeg => "jpeg",
            ImageFormat::Webp => "webp",
        }
    }
}

/// How the PDF response asks the client to present the download.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DispositionType {
    #[default]
    Attachment,
    Inline,
}

impl DispositionType {
    fn from_param(value: &str) -> Self {
        match value {
            "attachment" => DispositionType::Attachment,
            "inline" => DispositionType::Inline,
            _ => DispositionType::default(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            DispositionType::Attachment => "attachment",
            DispositionType::Inline => "inline",
        }
    }
}

/// HTTP credentials applied to the page before navigation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Navigation fields shared by all three producers.
#[derive(Debug, Clone)]
pub struct NavigationConfig {
    pub timeout: Duration,
    pub wait_until: WaitUntil,
    pub credentials: Option<Credentials>,
    pub emulate_media: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HtmlConfig {
    pub nav: NavigationConfig,
}

#[derive(Debug, Clone)]
pub struct PdfConfig {
    pub nav: NavigationConfig,
    pub scale: f64,
    pub display_header_footer: bool,
    pub print_background: bool,
    pub landscape: bool,
    pub disposition: DispositionType,
    /// Resolved download filename; always ends in `.pdf` (case-insensitive).
    pub filename: String,
}

#[derive(Debug, Clone)]
pub struct ScreenshotConfig {
    pub nav: NavigationConfig,
    pub viewport: Viewport,
    pub format: ImageFormat,
    pub quality: u32,
    pub full_page: bool,
    pub omit_background: bool,
    /// Zero disables animation settling before capture.
    pub animation_timeout: Duration,
}

/// The three disjoint configurations a request can normalize into.
#[derive(Debug, Clone)]
pub enum RenderConfig {
    Html(HtmlConfig),
    Pdf(PdfConfig),
    Screenshot(ScreenshotConfig),
}

impl RenderConfig {
    pub fn nav(&self) -> &NavigationConfig {
        match self {
            RenderConfig::Html(config) => &config.nav,
            RenderConfig::Pdf(config) => &config.nav,
            RenderConfig::Screenshot(config) => &config.nav,
        }
    }
}

/// One inbound render request, immutable after parsing.
#[derive(Debug, Clone)]
pub struct RenderRequest {
    pub url: String,
    pub output_type: OutputType,
    pub filename: Option<String>,
    pub raw_options: HashMap<String, String>,
}

impl RenderRequest {
    /// Builds a request from the decoded query map.
    ///
    /// `url` is required and non-empty; scheme-less values are promoted to
    /// `http://`. The remaining keys stay in `raw_options` for the
    /// normalizer, which ignores whatever the active output type does not
    /// consume.
    pub fn from_query(mut params: HashMap<String, String>) -> Result<Self> {
        let url = params
            .remove("url")
            .filter(|value| !value.is_empty())
            .ok_or(RenderError::MissingUrl)?;
        let url = if url.contains("://") {
            url
        } else {
            format!("http://{url}")
        };
        Url::parse(&url)?;

        let output_type = params
            .remove("type")
            .map(|value| OutputType::from_param(&value))
            .unwrap_or(OutputType::Html);
        let filename = params.remove("filename");

        Ok(Self {
            url,
            output_type,
            filename,
            raw_options: params,
        })
    }
}

/// Normalizes a request's raw options into the typed configuration for its
/// output type.
pub fn normalize(request: &RenderRequest) -> Result<RenderConfig> {
    let raw = &request.raw_options;
    let nav = NavigationConfig {
        timeout: Duration::from_millis(parse_u64(
            raw,
            "timeout",
            DEFAULT_NAVIGATION_TIMEOUT.as_millis() as u64,
        )),
        wait_until: raw
            .get("waitUntil")
            .map(|value| WaitUntil::from_param(value))
            .unwrap_or_default(),
        credentials: parse_credentials(raw),
        emulate_media: None,
    };

    match request.output_type {
        OutputType::Html => Ok(RenderConfig::Html(HtmlConfig { nav })),
        OutputType::Pdf => {
            let nav = NavigationConfig {
                emulate_media: Some(
                    raw.get("emulateMedia")
                        .cloned()
                        .unwrap_or_else(|| DEFAULT_PDF_MEDIA.to_string()),
                ),
                ..nav
            };
            Ok(RenderConfig::Pdf(PdfConfig {
                nav,
                // scale is re-coerced even when defaulted, so an explicit
                // non-numeric value propagates as NaN toward the engine
                // instead of quietly reverting to 1.0.
                scale: raw
                    .get("scale")
                    .map(|value| value.parse::<f64>().unwrap_or(f64::NAN))
                    .unwrap_or(DEFAULT_PDF_SCALE),
                display_header_footer: parse_bool(raw, "displayHeaderFooter"),
                print_background: parse_bool(raw, "printBackground"),
                landscape: parse_bool(raw, "landscape"),
                disposition: raw
                    .get("contentDispositionType")
                    .map(|value| DispositionType::from_param(value))
                    .unwrap_or_default(),
                filename: resolve_filename(request.filename.as_deref(), &request.url)?,
            }))
        }
        OutputType::Screenshot => {
            let format = raw
                .get("screenshotType")
                .map(|value| ImageFormat::from_param(value))
                .unwrap_or_default();
            let quality = raw
                .get("quality")
                .and_then(|value| value.parse::<u32>().ok())
                .unwrap_or(match format {
                    ImageFormat::Png => 0,
                    _ => DEFAULT_LOSSY_QUALITY,
                });
            Ok(RenderConfig::Screenshot(ScreenshotConfig {
                nav,
                viewport: Viewport {
                    width: parse_u32(raw, "width", 800),
                    height: parse_u32(raw, "height", 600),
                },
                format,
                quality,
                full_page: parse_bool(raw, "fullPage"),
                omit_background: parse_bool(raw, "omitBackground"),
                animation_timeout: Duration::from_millis(parse_u64(raw, "animationTimeout", 0)),
            }))
        }
    }
}

/// A boolean option is true only for the exact string `"true"`.
fn parse_bool(raw: &HashMap<String, String>, key: &str) -> bool {
    raw.get(key).map(|value| value == "true").unwrap_or(false)
}

fn parse_u64(raw: &HashMap<String, String>, key: &str, default: u64) -> u64 {
    raw.get(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_u32(raw: &HashMap<String, String>, key: &str, default: u32) -> u32 {
    raw.get(key)
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}

fn parse_credentials(raw: &HashMap<String, String>) -> Option<Credentials> {
    match (raw.get("credentials.username"), raw.get("credentials.password")) {
        (Some(username), Some(password)) => Some(Credentials {
            username: username.clone(),
            password: password.clone(),
        }),
        _ => None,
    }
}

/// Resolves the PDF download filename, deriving one from the URL when the
/// request did not supply it, and guaranteeing the `.pdf` suffix.
fn resolve_filename(explicit: Option<&str>, url: &str) -> Result<String> {
    let mut filename = match explicit {
        Some(name) => name.to_string(),
        None => derive_filename(url)?,
    };
    if !filename.to_lowercase().ends_with(".pdf") {
        filename.push_str(".pdf");
    }
    Ok(filename)
}

/// Derives a base filename from the target URL: the hostname for root paths,
/// otherwise the last path segment (a trailing slash collapses the whole path
/// instead), with an extension-like tail truncated at its final dot.
fn derive_filename(url: &str) -> Result<String> {
    let parsed = Url::parse(url)?;
    let mut filename = parsed.host_str().unwrap_or_default().to_string();
    let path = parsed.path();
    if path != "/" {
        let last_segment = path.rsplit('/').next().unwrap_or_default();
        filename = if last_segment.is_empty() {
            path.replace('/', "")
        } else {
            last_segment.to_string()
        };
        if let Some(dot) = filename.rfind('.') {
            if dot > 0 {
                filename.truncate(dot);
            }
        }
    }
    Ok(filename)
}
