use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

// ── Directory bootstrap ────────────────────────────────────────────────────────

/// Ensure the standard `~/.pantry-monitor/` directory hierarchy exists.
///
/// Creates the following directories if absent (including any missing parents):
/// - `~/.pantry-monitor/`
/// - `~/.pantry-monitor/logs/`
/// - `~/.pantry-monitor/cache/`
pub fn ensure_directories() -> anyhow::Result<()> {
    let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
    let monitor_dir = home.join(".pantry-monitor");
    std::fs::create_dir_all(&monitor_dir)?;
    std::fs::create_dir_all(monitor_dir.join("logs"))?;
    std::fs::create_dir_all(monitor_dir.join("cache"))?;
    Ok(())
}

// ── Logging bootstrap ──────────────────────────────────────────────────────────

/// Initialise the global `tracing` subscriber.
///
/// `log_level` is mapped to a [`tracing_subscriber::EnvFilter`] directive.
/// Falls back to `"info"` if the level string is not recognised.
///
/// The `log_file` parameter is accepted for forward-compatibility but file
/// logging is not yet wired – all output currently goes to stderr.
pub fn setup_logging(log_level: &str, _log_file: Option<&PathBuf>) -> anyhow::Result<()> {
    // Map the CLI level names to tracing level names (tracing uses lowercase).
    let upper = log_level.to_uppercase();
    let normalised = match upper.as_str() {
        "DEBUG" | "CRITICAL" => "debug",
        "INFO" => "info",
        "WARNING" => "warn",
        "ERROR" => "error",
        other => other,
    };

    let filter = EnvFilter::try_new(normalised).unwrap_or_else(|_| EnvFilter::new("info"));

    let subscriber = fmt::layer().with_target(false).with_thread_ids(false);

    tracing_subscriber::registry()
        .with(filter)
        .with(subscriber)
        .init();

    Ok(())
}

// ── Source discovery ───────────────────────────────────────────────────────────

/// Attempt to locate a table source when none is configured.
///
/// Checks the following in order and returns the first that applies:
/// 1. The `PANTRY_TABLE` environment variable (path or URL).
/// 2. `~/.pantry-monitor/table.csv`, when the file exists.
///
/// Returns `None` when neither applies.
pub fn discover_source() -> Option<String> {
    if let Ok(value) = std::env::var("PANTRY_TABLE") {
        if !value.is_empty() {
            return Some(value);
        }
    }

    let home = dirs::home_dir()?;
    let default_table = home.join(".pantry-monitor").join("table.csv");
    if default_table.exists() {
        return Some(default_table.to_string_lossy().to_string());
    }

    None
}

// ── Tests ──────────────────────────────────────────────────────────────────────
