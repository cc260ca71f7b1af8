use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::ParseError;

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Missing url parameter")]
    MissingUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] ParseError),

    #[error("Engine launch failed: {0}")]
    Launch(String),

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Engine protocol error: {0}")]
    Engine(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl RenderError {
    pub fn launch(message: impl Into<String>) -> Self {
        RenderError::Launch(message.into())
    }

    pub fn navigation(message: impl Into<String>) -> Self {
        RenderError::Navigation(message.into())
    }

    pub fn capture(message: impl Into<String>) -> Self {
        RenderError::Capture(message.into())
    }

    pub fn engine(message: impl Into<String>) -> Self {
        RenderError::Engine(message.into())
    }

    /// Coarse failure category. Validation errors map to 400 at the HTTP
    /// boundary; everything else collapses to a generic 500 and the category
    /// only appears in server-side logs.
    pub fn category(&self) -> ErrorCategory {
        match self {
            RenderError::MissingUrl | RenderError::InvalidUrl(_) => ErrorCategory::Validation,
            RenderError::Launch(_) => ErrorCategory::Launch,
            RenderError::Navigation(_) => ErrorCategory::Navigation,
            RenderError::Capture(_) => ErrorCategory::Capture,
            RenderError::Engine(_) => ErrorCategory::Engine,
            RenderError::Io(_) | RenderError::Serialization(_) => ErrorCategory::Internal,
        }
    }
}

pub type Result<T> = std::result::Result<T, RenderError>;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ErrorCategory {
    Validation,
    Launch,
    Navigation,
    Capture,
    Engine,
    Internal,
}
