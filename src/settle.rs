//! Animation settling: delay screenshot capture until the page's visual
//! output stops changing between samples, bounded by a per-request budget.

use std::time::Duration;

use tokio::time::{sleep, Instant};

use crate::options::ScreenshotConfig;
use crate::session::RenderSession;

/// Pause between consecutive stability samples.
pub const SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// Samples the page with the producer's capture parameters until two
/// consecutive samples are byte-identical or `budget` elapses.
///
/// Timeout is not an error: capture proceeds with whatever frame is current
/// at expiry. A sampling failure also ends settling early; the producer's own
/// capture will surface the problem if it persists.
pub async fn settle_animations(
    session: &mut RenderSession,
    config: &ScreenshotConfig,
    budget: Duration,
) {
    let deadline = Instant::now() + budget;
    let mut previous: Option<Vec<u8>> = None;
    loop {
        if Instant::now() >= deadline {
            return;
        }
        let sample = match session.screenshot(config).await {
            Ok(bytes) => bytes,
            Err(_) => return,
        };
        if previous.as_deref() == Some(sample.as_slice()) {
            return;
        }
        previous = Some(sample);

        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            return;
        }
        sleep(remaining.min(SAMPLE_INTERVAL)).await;
    }
}
