//! Logging Infrastructure
//!
//! `tracing` subscriber with an `EnvFilter`. `RUST_LOG` wins when set;
//! otherwise the crate and the HTTP layer log at the configured level.

use std::path::Path;
use tracing_subscriber::EnvFilter;

/// Initialize the logger at `info`, stdout only
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with optional daily rolling file output
///
/// File output is used only when `log_dir` exists.
pub fn init_logger_with_file(log_level: Option<&str>, log_dir: Option<&str>) {
    let level = log_level.unwrap_or("info");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("menu_sync={level},tower_http={level},http_access={level}")));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.is_dir()
            && let Some(dir_str) = log_path.to_str()
        {
            let file_appender = tracing_appender::rolling::daily(dir_str, "menu-sync");
            // try_init: a second call (tests, embedding) keeps the first subscriber
            let _ = subscriber.with_ansi(false).with_writer(file_appender).try_init();
            return;
        }
    }

    let _ = subscriber.try_init();
}
