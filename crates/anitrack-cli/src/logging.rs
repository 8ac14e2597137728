//! Tracing setup
//!
//! Logging is off unless ANITRACK_LOG is set to a level (e.g. `debug`).
//! Commands log to stderr; the TUI logs to a file so output never lands on
//! the alternate screen.

use std::fs::File;
use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

use anitrack_core::Config;

const LOG_ENV: &str = "ANITRACK_LOG";

/// Initialize stderr logging for one-shot commands
pub fn init_cli_logging() {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Initialize logging for TUI mode
///
/// Logs to file (config.log_file or default {data_dir}/debug.log).
pub fn init_tui_logging(config: &Config) {
    let Ok(log_level) = std::env::var(LOG_ENV) else {
        return;
    };

    let log_path = tui_log_path(config);

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter(&log_level))
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("TUI logging initialized to {:?}", log_path);
}

fn tui_log_path(config: &Config) -> PathBuf {
    config
        .log_file
        .clone()
        .unwrap_or_else(|| config.data_dir.join("debug.log"))
}

fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::new(filter_directive(level))
}

fn filter_directive(level: &str) -> String {
    format!("anitrack_core={},anitrack_cli={}", level, level)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_directive() {
        assert_eq!(
            filter_directive("debug"),
            "anitrack_core=debug,anitrack_cli=debug"
        );
    }

    #[test]
    fn test_tui_log_path() {
        let mut config = Config {
            data_dir: PathBuf::from("/tmp/anitrack"),
            ..Config::default()
        };
        assert_eq!(tui_log_path(&config), PathBuf::from("/tmp/anitrack/debug.log"));

        config.log_file = Some(PathBuf::from("/var/log/anitrack.log"));
        assert_eq!(tui_log_path(&config), PathBuf::from("/var/log/anitrack.log"));
    }
}
