//! Tracing initialization
//!
//! Provides standardized tracing setup for diskwatch binaries.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Map a `-v` count to the default level for our own crates
///
/// 0 = info, 1 = debug, 2+ = trace.
pub fn default_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "info",
        1 => "debug",
        _ => "trace",
    }
}

/// Initialize tracing/logging
///
/// Sets up logging to stderr with:
/// - Formatted output without ANSI colors (for clean service logs)
/// - Environment-based filtering via RUST_LOG
/// - A default level for each of the given crates, raised by `verbosity`
///
/// Set `LOG_FORMAT=json` for structured JSON output (useful when the
/// daemon runs under a service manager that ships logs elsewhere).
/// Default is human-readable text output.
///
/// # Arguments
///
/// * `crate_names` - Crates to enable at the default level (e.g., `["diskwatch"]`)
/// * `verbosity` - Number of `-v` flags passed on the command line
///
/// # Example
///
/// ```rust,ignore
/// diskwatch_common::init_tracing(&["diskwatch", "discord_notify"], 0)?;
/// ```
pub fn init_tracing(crate_names: &[&str], verbosity: u8) -> anyhow::Result<()> {
    let level = default_level(verbosity);
    let mut filter = EnvFilter::from_default_env();
    for name in crate_names {
        filter = filter.add_directive(format!("{}={}", name, level).parse()?);
    }

    let use_json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let registry = tracing_subscriber::registry().with(filter);

    if use_json {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()?;
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_ansi(false),
            )
            .try_init()?;
    }

    Ok(())
}
