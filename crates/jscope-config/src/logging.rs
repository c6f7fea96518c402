use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;

/// The `[logging]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// `warn`, `debug`, ... or any `EnvFilter` directive string such as `jscope.syntax=trace`.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// One JSON object per event instead of the human-readable format.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    /// Filter directives: the configured level, followed by `rust_log` so that it takes
    /// precedence for the targets it names.
    pub fn directives(&self, rust_log: Option<&str>) -> String {
        let level = match self.level.trim() {
            "" => Self::default_level(),
            "warning" | "WARNING" => "warn".to_owned(),
            other => other.to_owned(),
        };
        match rust_log.map(str::trim).filter(|extra| !extra.is_empty()) {
            Some(extra) => format!("{level},{extra}"),
            None => level,
        }
    }

    fn filter(&self) -> EnvFilter {
        let rust_log = std::env::var("RUST_LOG").ok();
        EnvFilter::try_new(self.directives(rust_log.as_deref()))
            .unwrap_or_else(|_| EnvFilter::new(Self::default_level()))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
        }
    }
}

/// Install a stderr `tracing` subscriber for `config`.
///
/// Returns `false` when a global subscriber was already installed; the existing one is kept.
pub fn init_tracing(config: &LoggingConfig) -> bool {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(config.filter())
        .with_writer(std::io::stderr)
        .with_ansi(false);
    let installed = if config.json {
        builder.json().try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };
    if installed {
        tracing::debug!(target: "jscope.config", level = %config.level, json = config.json, "logging initialized");
    }
    installed
}
