//! Tracing subscriber setup.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter (default: "jotter_api=debug,jotter_db=info,tower_http=debug")
//!
//! Events carry `subsystem`, `component` and `op` fields. WARN is used for
//! rejected credentials and bad tokens, INFO for state transitions. Passwords,
//! hashes and session tokens are never logged.

use std::path::Path;

use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "jotter_api=debug,jotter_db=info,tower_http=debug";

/// Logging options read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub json: bool,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_values(
            std::env::var("LOG_FORMAT").ok(),
            std::env::var("LOG_FILE").ok(),
            std::env::var("LOG_ANSI").ok(),
        )
    }

    fn from_values(format: Option<String>, file: Option<String>, ansi: Option<String>) -> Self {
        Self {
            json: format.as_deref() == Some("json"),
            file: file.filter(|f| !f.trim().is_empty()),
            ansi: ansi.map(|v| v == "true" || v == "1"),
        }
    }
}

/// Install the global subscriber.
///
/// The returned guard flushes the file writer on drop; keep it alive for the
/// life of the process.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
    let registry = tracing_subscriber::registry().with(env_filter);

    let guard = if let Some(ref path) = settings.file {
        let path = Path::new(path);
        let dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or("jotter-api.log");
        let file_appender = tracing_appender::rolling::daily(dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if settings.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // no ANSI in files unless asked for
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(settings.ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if settings.json {
            registry
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer();
            if let Some(ansi) = settings.ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    };

    info!(
        subsystem = "api",
        component = "logging",
        json = settings.json,
        log_file = settings.file.as_deref().unwrap_or("(stdout)"),
        "Logging initialized"
    );
    guard
}
