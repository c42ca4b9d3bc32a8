use std::path::Path;

use nova_core::JavaLanguageLevel;
use schemars::schema::RootSchema;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};

/// Settings of one analysis pass.
///
/// Loadable from the `[highlight]`-style TOML table hosts keep next to the
/// rest of their configuration:
///
/// ```toml
/// report_unchecked_warnings = false
/// disabled_checks = ["reassigned-parameter"]
///
/// [language_level]
/// major = 8
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct HighlightConfig {
    /// Overrides the language level supplied by the host.
    #[serde(default)]
    pub language_level: Option<LanguageLevelConfig>,

    /// Report statements that can never execute.
    #[serde(default = "default_true")]
    pub report_unreachable_code: bool,

    /// Warn about catch sections whose exceptions are all caught by earlier sections.
    #[serde(default = "default_true")]
    pub report_exception_already_caught_warnings: bool,

    /// Report unchecked casts and unchecked calls on raw types.
    #[serde(default = "default_true")]
    pub report_unchecked_warnings: bool,

    /// Emit informational markers for parameters that are reassigned.
    #[serde(default)]
    pub report_reassigned_variables: bool,

    /// Run every check under `catch_unwind` so a defect in one check only
    /// loses that node's diagnostics.
    #[serde(default = "default_true")]
    pub isolate_rule_panics: bool,

    /// Check ids the driver skips, e.g. `"same-erasure"`.
    #[serde(default)]
    pub disabled_checks: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct LanguageLevelConfig {
    /// Java feature release, e.g. `8`, `17`.
    #[schemars(range(min = 1))]
    pub major: u16,
    /// Whether `--enable-preview` is in effect.
    #[serde(default)]
    pub preview: bool,
}

impl From<LanguageLevelConfig> for JavaLanguageLevel {
    fn from(config: LanguageLevelConfig) -> Self {
        JavaLanguageLevel::new(config.major).with_preview(config.preview)
    }
}

impl From<JavaLanguageLevel> for LanguageLevelConfig {
    fn from(level: JavaLanguageLevel) -> Self {
        Self {
            major: level.major,
            preview: level.preview,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Default for HighlightConfig {
    fn default() -> Self {
        Self {
            language_level: None,
            report_unreachable_code: true,
            report_exception_already_caught_warnings: true,
            report_unchecked_warnings: true,
            report_reassigned_variables: false,
            isolate_rule_panics: true,
            disabled_checks: Vec::new(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("failed to parse json config: {0}")]
    Json(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Toml(value.message().to_string())
    }
}

impl HighlightConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&text)
    }

    /// Settings sent by an editor client as JSON.
    pub fn from_json(value: serde_json::Value) -> Result<Self, ConfigError> {
        serde_json::from_value(value).map_err(|err| ConfigError::Json(err.to_string()))
    }

    pub fn is_check_enabled(&self, check: &str) -> bool {
        !self.disabled_checks.iter().any(|c| c == check)
    }

    /// The configured override, or `host` when none is set.
    pub fn effective_language_level(&self, host: JavaLanguageLevel) -> JavaLanguageLevel {
        self.language_level.map(Into::into).unwrap_or(host)
    }
}

/// JSON schema for [`HighlightConfig`], for editor tooling and CI validation.
#[must_use]
pub fn json_schema() -> RootSchema {
    schema_for!(HighlightConfig)
}
