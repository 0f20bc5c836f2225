//! Subscriber setup shared by the bridge binaries.

use std::env;
use std::path::PathBuf;
use tracing::{warn, Level};
use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// `CORTEX_LOG_DIR` if set, else `<data_local_dir>/cortex/logs`.
pub fn log_dir() -> PathBuf {
    if let Ok(custom_dir) = env::var("CORTEX_LOG_DIR") {
        return PathBuf::from(custom_dir);
    }
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("cortex")
        .join("logs")
}

/// Maps a `LOG_LEVEL` value to a level. Anything unrecognised is INFO.
pub fn parse_level(value: Option<&str>) -> Level {
    match value.map(str::to_lowercase).as_deref() {
        Some("error") => Level::ERROR,
        Some("warn") => Level::WARN,
        Some("info") => Level::INFO,
        Some("debug") => Level::DEBUG,
        Some("trace") => Level::TRACE,
        _ => Level::INFO,
    }
}

/// Stderr without ANSI plus a daily rolling `<file_name>` under [`log_dir`].
///
/// Nothing is written to stdout, which the stdio MCP transport owns.
pub fn init_logging(file_name: &str) -> Result<(), TryInitError> {
    let level = parse_level(env::var("LOG_LEVEL").ok().as_deref());
    let log_dir = log_dir();
    let dir_ready = std::fs::create_dir_all(&log_dir);

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_filter(EnvFilter::from_default_env().add_directive(level.into()));

    let file_layer = dir_ready.is_ok().then(|| {
        tracing_subscriber::fmt::layer()
            .with_writer(tracing_appender::rolling::daily(&log_dir, file_name))
            .with_ansi(false)
            .with_filter(EnvFilter::from_default_env().add_directive(level.into()))
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .try_init()?;

    if let Err(e) = dir_ready {
        warn!("Failed to create log directory {}: {}", log_dir.display(), e);
    }
    Ok(())
}

/// Panics go to stderr only.
pub fn install_panic_hook(binary: &'static str) {
    std::panic::set_hook(Box::new(move |info| {
        eprintln!("{binary} panicked: {info}");
    }));
}
