use std::time::SystemTime;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Health check payloads.
pub mod health;
/// Track, appearance and navigation signals.
pub mod player;
/// Server-Sent Events payloads.
pub mod sse;
/// Theme snapshot returned by `GET /theme`.
pub mod theme;
/// Custom validators used by request bodies.
pub mod validation;

fn format_system_time(time: SystemTime) -> String {
    OffsetDateTime::from(time)
        .format(&Rfc3339)
        .unwrap_or_else(|_| "invalid-timestamp".into())
}
