//! Telemetry
//!
//! Structured logging for playback sessions.
//! - Session and turn transitions logged at `debug` with epoch/index fields
//! - Configurable log levels via RUST_LOG
//! - JSON output via `DISPUTECAST_LOG_FORMAT=json`
//! - Always written to stderr so the transcript on stdout stays clean

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Environment variable selecting the log line format ("compact" or "json").
pub const LOG_FORMAT_ENV: &str = "DISPUTECAST_LOG_FORMAT";

/// Sanitize a string for safe log output by escaping control characters.
/// Script files are user-supplied, so turn text goes through here before
/// it reaches a log line.
pub fn sanitize_for_log(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\x1b' => out.push_str("\\e"),
            '\x00' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}

/// Shorten turn text for log lines.
pub fn preview(s: &str, max_chars: usize) -> String {
    let sanitized = sanitize_for_log(s);
    if sanitized.chars().count() <= max_chars {
        return sanitized;
    }
    let mut out: String = sanitized.chars().take(max_chars).collect();
    out.push('…');
    out
}

/// Initialize global tracing subscriber.
/// Only enables tracing if RUST_LOG is explicitly set, so the TUI is not
/// painted over by log lines.
pub fn init_tracing() {
    if let Ok(filter) = std::env::var("RUST_LOG") {
        init_tracing_with_filter(&filter);
    }
}

/// Initialize tracing for `--verbose`
pub fn init_tracing_verbose() {
    init_tracing_with_filter("disputecast=debug,info")
}

/// Initialize with custom filter string
pub fn init_tracing_with_filter(filter: &str) {
    use std::sync::Once;
    static INIT: Once = Once::new();

    INIT.call_once(|| {
        let filter_layer = EnvFilter::try_new(filter).unwrap_or_else(|_| EnvFilter::new("warn"));
        let json = std::env::var(LOG_FORMAT_ENV)
            .map(|v| v.eq_ignore_ascii_case("json"))
            .unwrap_or(false);

        if json {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .try_init();
        } else {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .with_file(false)
                .with_line_number(false)
                .with_level(true)
                .compact()
                .with_writer(std::io::stderr);
            let _ = tracing_subscriber::registry()
                .with(filter_layer)
                .with(fmt_layer)
                .try_init();
        }
    });
}
