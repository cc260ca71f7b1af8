#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use rendergate_lib::{Command, Engine, EngineConnection, RenderError, Result};
use serde_json::{json, Value};

pub const HTML_SAMPLE: &str = "<html><head></head><body>sample</body></html>";
pub const PDF_SAMPLE: &[u8] = b"%PDF-1.4 rendergate sample";
pub const PNG_SAMPLE: &[u8] = b"\x89PNG\r\n\x1a\nrendergate sample";

/// Which pipeline stage the scripted engine refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Launch,
    Navigate,
    Capture,
}

#[derive(Debug, Default)]
pub struct MockStats {
    pub connects: AtomicUsize,
    pub close_commands: AtomicUsize,
    pub shutdowns: AtomicUsize,
    pub screenshots: AtomicUsize,
}

impl MockStats {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn close_commands(&self) -> usize {
        self.close_commands.load(Ordering::SeqCst)
    }

    pub fn shutdowns(&self) -> usize {
        self.shutdowns.load(Ordering::SeqCst)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }
}

/// Scripted engine: answers the command protocol from canned data and counts
/// lifecycle events so tests can assert exactly-once teardown.
pub struct MockEngine {
    fail_at: FailAt,
    pub stats: Arc<MockStats>,
    screenshot_samples: Arc<Mutex<VecDeque<Vec<u8>>>>,
    unique_screenshots: bool,
}

impl MockEngine {
    pub fn new(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            stats: Arc::new(MockStats::default()),
            screenshot_samples: Arc::new(Mutex::new(VecDeque::new())),
            unique_screenshots: false,
        }
    }

    /// Screenshot replies consume `samples` in order, then repeat the last
    /// one (a page that eventually settles).
    pub fn with_screenshot_samples(samples: Vec<Vec<u8>>) -> Self {
        Self {
            screenshot_samples: Arc::new(Mutex::new(samples.into())),
            ..Self::new(FailAt::Nothing)
        }
    }

    /// Every screenshot reply differs (a page that never settles).
    pub fn with_unique_screenshots() -> Self {
        Self {
            unique_screenshots: true,
            ..Self::new(FailAt::Nothing)
        }
    }
}

#[async_trait]
impl Engine for MockEngine {
    async fn connect(&self) -> Result<Box<dyn EngineConnection>> {
        self.stats.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            fail_at: self.fail_at,
            stats: self.stats.clone(),
            samples: self.screenshot_samples.clone(),
            unique_screenshots: self.unique_screenshots,
            last_sample: PNG_SAMPLE.to_vec(),
        }))
    }
}

struct MockConnection {
    fail_at: FailAt,
    stats: Arc<MockStats>,
    samples: Arc<Mutex<VecDeque<Vec<u8>>>>,
    unique_screenshots: bool,
    last_sample: Vec<u8>,
}

#[async_trait]
impl EngineConnection for MockConnection {
    async fn request(&mut self, command: Command) -> Result<Value> {
        match &command {
            Command::Launch => {
                if self.fail_at == FailAt::Launch {
                    return Err(RenderError::launch("mock launch refused"));
                }
                Ok(json!({}))
            }
            Command::NewPage { .. }
            | Command::EmulateMedia { .. }
            | Command::SetViewport { .. } => Ok(json!({})),
            Command::Navigate { .. } => {
                if self.fail_at == FailAt::Navigate {
                    return Err(RenderError::navigation("mock navigation refused"));
                }
                Ok(json!({}))
            }
            Command::Content => {
                if self.fail_at == FailAt::Capture {
                    return Err(RenderError::capture("mock capture refused"));
                }
                Ok(json!({ "content": HTML_SAMPLE }))
            }
            Command::Pdf { .. } => {
                if self.fail_at == FailAt::Capture {
                    return Err(RenderError::capture("mock capture refused"));
                }
                Ok(json!({ "data": BASE64.encode(PDF_SAMPLE) }))
            }
            Command::Screenshot { .. } => {
                let shot = self.stats.screenshots.fetch_add(1, Ordering::SeqCst);
                if self.fail_at == FailAt::Capture {
                    return Err(RenderError::capture("mock capture refused"));
                }
                if self.unique_screenshots {
                    return Ok(json!({ "data": BASE64.encode(format!("frame-{shot}")) }));
                }
                if let Some(next) = self.samples.lock().unwrap().pop_front() {
                    self.last_sample = next;
                }
                Ok(json!({ "data": BASE64.encode(&self.last_sample) }))
            }
            Command::Close => {
                self.stats.close_commands.fetch_add(1, Ordering::SeqCst);
                Ok(json!({}))
            }
        }
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.stats.shutdowns.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
