//! Configuration for jscope: logging, the lexical ruleset, and scope detection knobs.
//!
//! ```toml
//! [logging]
//! level = "debug"
//! json = false
//!
//! [lexical]
//! extra_ident_chars = ["$"]
//!
//! [scopes]
//! statement_keywords = ["if", "else", "for", "while", "do", "switch", "try", "catch", "finally", "static", "synchronized"]
//! array_predecessors = [",", "]", "="]
//! ```

use std::path::{Path, PathBuf};

use jscope_core::{LexicalRules, Ruleset};
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;

pub use logging::{init_tracing, LoggingConfig};

/// Environment variable that overrides config discovery.
pub const JSCOPE_CONFIG_ENV_VAR: &str = "JSCOPE_CONFIG_PATH";

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JscopeConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Comment/string/identifier syntax of the scanned dialect.
    #[serde(default)]
    pub lexical: Ruleset,

    #[serde(default)]
    pub scopes: ScopeConfig,
}

/// Knobs of the scope detectors.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScopeConfig {
    /// Words that open a statement block when they directly precede `{` or `(...) {`.
    #[serde(default = "ScopeConfig::default_statement_keywords")]
    pub statement_keywords: Vec<String>,

    /// Characters that, as the last non-trivia character before `{`, mark an array initializer.
    #[serde(default = "ScopeConfig::default_array_predecessors")]
    pub array_predecessors: Vec<char>,
}

impl ScopeConfig {
    fn default_statement_keywords() -> Vec<String> {
        [
            "if",
            "else",
            "for",
            "while",
            "do",
            "switch",
            "try",
            "catch",
            "finally",
            "static",
            "synchronized",
        ]
        .into_iter()
        .map(str::to_owned)
        .collect()
    }

    fn default_array_predecessors() -> Vec<char> {
        vec![',', ']', '=']
    }

    pub fn is_statement_keyword(&self, word: &str) -> bool {
        self.statement_keywords.iter().any(|kw| kw == word)
    }
}

impl Default for ScopeConfig {
    fn default() -> Self {
        Self {
            statement_keywords: Self::default_statement_keywords(),
            array_predecessors: Self::default_array_predecessors(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // Keep the message and drop the source snippet.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl JscopeConfig {
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: JscopeConfig = toml::from_str(text)?;
        config.validate();
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::load_from_str(&text)
    }

    fn validate(&self) {
        if self.scopes.statement_keywords.is_empty() {
            tracing::warn!(
                target: "jscope.config",
                "scopes.statement_keywords is empty; every `(...) {{` block will be read as a method"
            );
        }
        if let Some(kw) = self
            .scopes
            .statement_keywords
            .iter()
            .find(|kw| kw.is_empty() || !kw.chars().all(|c| self.lexical.is_ident_char(c)))
        {
            tracing::warn!(
                target: "jscope.config",
                keyword = %kw,
                "statement keyword is not an identifier and will never match"
            );
        }
    }
}

/// Discover the config file for a workspace root.
///
/// Search order:
/// 1) `JSCOPE_CONFIG_PATH` (absolute or relative to `workspace_root`)
/// 2) `jscope.toml` in `workspace_root`
/// 3) `.jscope/config.toml` in `workspace_root`
pub fn discover_config_path(workspace_root: &Path) -> Option<PathBuf> {
    if let Some(value) = std::env::var_os(JSCOPE_CONFIG_ENV_VAR) {
        let candidate = PathBuf::from(value);
        let path = if candidate.is_absolute() {
            candidate
        } else {
            workspace_root.join(candidate)
        };
        return Some(path.canonicalize().unwrap_or(path));
    }

    ["jscope.toml", ".jscope/config.toml"]
        .into_iter()
        .map(|name| workspace_root.join(name))
        .find(|path| path.is_file())
        .map(|path| path.canonicalize().unwrap_or(path))
}

/// Load the configuration for a workspace root, or the defaults when no file exists.
pub fn load_for_workspace(
    workspace_root: &Path,
) -> Result<(JscopeConfig, Option<PathBuf>), ConfigError> {
    let Some(path) = discover_config_path(workspace_root) else {
        return Ok((JscopeConfig::default(), None));
    };
    let config = JscopeConfig::load_from_path(&path)?;
    Ok((config, Some(path)))
}
