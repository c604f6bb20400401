//! Logging configuration and initialization

use log::SetLoggerError;

/// Environment variable holding the log filter.
pub const LOG_ENV: &str = "MULTIVIEW_LOG";

/// Logging configuration
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Default log level filter (default: "info")
    pub default_level: String,
    /// Prefix records with millisecond timestamps (default: true)
    pub timestamps: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            default_level: "info".to_string(),
            timestamps: true,
        }
    }
}

/// Initialize the global logger.
///
/// The filter is read from `MULTIVIEW_LOG`, then `RUST_LOG`, then
/// `config.default_level`, e.g. `"debug"` or `"info,multiview_gen=debug"`.
pub fn init_logging(config: &LogConfig) -> Result<(), SetLoggerError> {
    let filter = resolve_filter(config, |name| std::env::var(name).ok());

    let mut builder = env_logger::Builder::new();
    builder.parse_filters(&filter);
    if config.timestamps {
        builder.format_timestamp_millis();
    } else {
        builder.format_timestamp(None);
    }
    builder.try_init()
}

fn resolve_filter(config: &LogConfig, lookup: impl Fn(&str) -> Option<String>) -> String {
    [LOG_ENV, "RUST_LOG"]
        .into_iter()
        .filter_map(|name| lookup(name))
        .find(|value| !value.trim().is_empty())
        .unwrap_or_else(|| config.default_level.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_precedence() {
        let config = LogConfig::default();

        let both = |name: &str| match name {
            LOG_ENV => Some("debug".to_string()),
            "RUST_LOG" => Some("warn".to_string()),
            _ => None,
        };
        assert_eq!(resolve_filter(&config, both), "debug");

        let rust_log_only = |name: &str| (name == "RUST_LOG").then(|| "warn".to_string());
        assert_eq!(resolve_filter(&config, rust_log_only), "warn");

        assert_eq!(resolve_filter(&config, |_| None), "info");
    }

    #[test]
    fn test_blank_variable_falls_through() {
        let config = LogConfig {
            default_level: "error".to_string(),
            timestamps: false,
        };
        assert_eq!(resolve_filter(&config, |_| Some("  ".to_string())), "error");
    }
}
