//! Tracing subscriber setup.
//!
//! The library crates only emit `tracing` events with structured fields;
//! whichever application embeds the backend decides where those go. This
//! module wires the subscriber the embedding binary is expected to install:
//!
//! - `RUST_LOG` controls filtering (default: `info`), e.g.
//!   `RUST_LOG=dp_principal=debug`.
//! - `LOG_FORMAT=json` switches to JSON output for log aggregation;
//!   anything else gives human-readable text.
//!
//! ```rust,ignore
//! dp_common::logging::init_logging();
//! tracing::info!(uri = %uri, "Created principal");
//! ```

use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Install the global tracing subscriber.
///
/// Panics if a global subscriber is already set, so call it once, early.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .flatten_event(true)
                    .with_span_events(FmtSpan::CLOSE),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false)
                    .with_ansi(true),
            )
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_filter_parses() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        drop(filter);
    }
}
