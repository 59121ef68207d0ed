//! Wire-facing request and response types.

use time::{OffsetDateTime, format_description::well_known::Rfc3339};

pub mod health;
pub mod matches;
pub mod profile;
pub mod progress;
pub mod sse;
pub mod validation;

/// Render a unix-milliseconds timestamp as RFC 3339 for API responses.
fn format_unix_ms(ms: i64) -> String {
    OffsetDateTime::from_unix_timestamp_nanos(i128::from(ms) * 1_000_000)
        .ok()
        .and_then(|timestamp| timestamp.format(&Rfc3339).ok())
        .unwrap_or_else(|| "invalid-timestamp".into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_renders_as_rfc3339() {
        assert_eq!(format_unix_ms(0), "1970-01-01T00:00:00Z");
    }

    #[test]
    fn sub_second_precision_is_kept() {
        assert_eq!(format_unix_ms(1_500), "1970-01-01T00:00:01.5Z");
    }
}
