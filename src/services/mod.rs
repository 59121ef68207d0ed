/// OpenAPI documentation generation.
pub mod documentation;
/// Change-feed event builders and publishing helpers.
pub mod feed_events;
/// Health check service.
pub mod health_service;
/// Match lifecycle operations.
pub mod match_service;
/// Display profile operations.
pub mod profile_service;
/// Round progress aggregation and completion detection.
pub mod progress_service;
/// Server-Sent Events broadcasting service.
pub mod sse_service;

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as unix milliseconds.
pub(crate) fn now_unix_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or_default()
}
