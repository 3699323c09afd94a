//! Configuration System for credit-fis
//!
//! Provides a flexible configuration system supporting:
//! - TOML configuration files
//! - Environment variable overrides
//! - Multiple config file locations
//!
//! # Configuration File Locations
//!
//! Configuration files are searched in order (first found wins):
//! 1. `./credit-fis.toml` - Project-local configuration
//! 2. `~/.config/credit-fis/config.toml` - User configuration (XDG)
//! 3. `~/.credit-fis/config.toml` - User configuration (legacy)
//! 4. `/etc/credit-fis/config.toml` - System-wide configuration
//!
//! # Environment Variables
//!
//! - `CREDIT_FIS_LOG_LEVEL` - Logging verbosity (quiet, normal, verbose, debug)
//! - `CREDIT_FIS_FORMAT` - Output format (text, json)
//! - `CREDIT_FIS_OUTPUT_STEP` - Sampling step of the eligibility universe
//! - `CREDIT_FIS_APPROVE_THRESHOLD` - Minimum score for approval
//! - `CREDIT_FIS_REVIEW_THRESHOLD` - Minimum score for manual review
//! - `CREDIT_FIS_DBR_WARNING` - Debt-burden ratio (percent) that raises a warning
//! - `CREDIT_FIS_NO_ACTIVATION_AS_REJECT` - Treat "no rule activated" as a reject (true/false)
//!
//! # Example Configuration
//!
//! ```toml
//! # credit-fis.toml
//!
//! [general]
//! log_level = "normal"
//! format = "text"
//!
//! [engine]
//! output_step = 1.0
//!
//! [assessment]
//! approve_threshold = 60.0
//! review_threshold = 40.0
//! dbr_warning_threshold = 60.0
//! no_activation_as_reject = false
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::credit::knowledge::ELIGIBILITY_RANGE;
use crate::error::{ErrorCode, FisError};
use crate::fuzzy::Universe;

// ============================================================================
// Configuration Schema
// ============================================================================

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FisConfig {
    /// General settings
    pub general: GeneralConfig,
    /// Inference engine settings
    pub engine: EngineConfig,
    /// Loan assessment policy
    pub assessment: AssessmentConfig,
}

/// General configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Logging level
    pub log_level: LogLevel,
    /// Default output format
    pub format: OutputFormat,
}

/// Engine configuration options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Sampling step of the output universe
    pub output_step: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { output_step: 1.0 }
    }
}

/// Thresholds applied to the eligibility score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssessmentConfig {
    /// Scores at or above this are approved
    pub approve_threshold: f64,
    /// Scores at or above this (and below approve) go to manual review
    pub review_threshold: f64,
    /// DBR percentage above which a warning is attached
    pub dbr_warning_threshold: f64,
    /// Report "no rule activated" as a reject instead of an error
    pub no_activation_as_reject: bool,
}

impl Default for AssessmentConfig {
    fn default() -> Self {
        Self {
            approve_threshold: 60.0,
            review_threshold: 40.0,
            dbr_warning_threshold: 60.0,
            no_activation_as_reject: false,
        }
    }
}

// ============================================================================
// Enums
// ============================================================================

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "plain" => Some(OutputFormat::Text),
            "json" => Some(OutputFormat::Json),
            _ => None,
        }
    }
}

/// Log level options
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Quiet,
    #[default]
    Normal,
    Verbose,
    Debug,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Quiet => "quiet",
            LogLevel::Normal => "normal",
            LogLevel::Verbose => "verbose",
            LogLevel::Debug => "debug",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "quiet" | "q" | "0" => Some(LogLevel::Quiet),
            "normal" | "n" | "1" => Some(LogLevel::Normal),
            "verbose" | "v" | "2" => Some(LogLevel::Verbose),
            "debug" | "d" | "3" => Some(LogLevel::Debug),
            _ => None,
        }
    }

    /// Maximum `tracing` level emitted at this verbosity
    pub fn tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Quiet => tracing::Level::ERROR,
            LogLevel::Normal => tracing::Level::WARN,
            LogLevel::Verbose => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
        }
    }

    /// One step louder, saturating at debug
    pub fn louder(self) -> Self {
        match self {
            LogLevel::Quiet => LogLevel::Normal,
            LogLevel::Normal => LogLevel::Verbose,
            LogLevel::Verbose | LogLevel::Debug => LogLevel::Debug,
        }
    }
}

// ============================================================================
// Configuration Loading
// ============================================================================

const ENV_PREFIX: &str = "CREDIT_FIS_";

impl FisConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from default locations
    ///
    /// The first existing file in [`FisConfig::config_paths`] wins, then
    /// environment overrides are applied and the result is validated.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        for path in Self::config_paths() {
            if path.exists() {
                config = Self::load_from_file(&path)?;
                break;
            }
        }

        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit file, then apply environment overrides and validate
    pub fn load_explicit(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e.to_string()))?;

        toml::from_str(&content).map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    /// Load configuration from a TOML string
    pub fn load_from_str(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content)
            .map_err(|e| ConfigError::Parse(PathBuf::from("<string>"), e.to_string()))
    }

    /// Get the list of config file search paths
    pub fn config_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();

        paths.push(PathBuf::from("./credit-fis.toml"));

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("credit-fis").join("config.toml"));
        }

        if let Some(home_dir) = dirs::home_dir() {
            paths.push(home_dir.join(".credit-fis").join("config.toml"));
        }

        #[cfg(unix)]
        paths.push(PathBuf::from("/etc/credit-fis/config.toml"));

        paths
    }

    /// Apply `CREDIT_FIS_*` environment variable overrides
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        self.apply_overrides(|key| env::var(format!("{}{}", ENV_PREFIX, key)).ok())
    }

    /// Apply overrides from any key lookup (keys without the prefix)
    ///
    /// Unparseable values are an error rather than silently ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(val) = lookup("LOG_LEVEL") {
            self.general.log_level = LogLevel::from_str(&val)
                .ok_or_else(|| ConfigError::invalid_env("LOG_LEVEL", &val))?;
        }

        if let Some(val) = lookup("FORMAT") {
            self.general.format = OutputFormat::from_str(&val)
                .ok_or_else(|| ConfigError::invalid_env("FORMAT", &val))?;
        }

        if let Some(val) = lookup("OUTPUT_STEP") {
            self.engine.output_step = parse_number("OUTPUT_STEP", &val)?;
        }

        if let Some(val) = lookup("APPROVE_THRESHOLD") {
            self.assessment.approve_threshold = parse_number("APPROVE_THRESHOLD", &val)?;
        }

        if let Some(val) = lookup("REVIEW_THRESHOLD") {
            self.assessment.review_threshold = parse_number("REVIEW_THRESHOLD", &val)?;
        }

        if let Some(val) = lookup("DBR_WARNING") {
            self.assessment.dbr_warning_threshold = parse_number("DBR_WARNING", &val)?;
        }

        if let Some(val) = lookup("NO_ACTIVATION_AS_REJECT") {
            self.assessment.no_activation_as_reject = match val.to_lowercase().as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => return Err(ConfigError::invalid_env("NO_ACTIVATION_AS_REJECT", &val)),
            };
        }

        Ok(())
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let step = self.engine.output_step;
        if !(step.is_finite() && step > 0.0 && step <= 10.0) {
            return Err(ConfigError::InvalidValue {
                key: "engine.output_step".into(),
                reason: format!("{} is not in (0, 10]", step),
            });
        }
        let (min, max) = ELIGIBILITY_RANGE;
        if let Err(e) = Universe::interval_count(min, max, step) {
            return Err(ConfigError::InvalidValue {
                key: "engine.output_step".into(),
                reason: e.message,
            });
        }

        let a = &self.assessment;
        let ordered = a.review_threshold.is_finite()
            && a.approve_threshold.is_finite()
            && 0.0 <= a.review_threshold
            && a.review_threshold < a.approve_threshold
            && a.approve_threshold <= 100.0;
        if !ordered {
            return Err(ConfigError::InvalidValue {
                key: "assessment".into(),
                reason: format!(
                    "thresholds must satisfy 0 <= review ({}) < approve ({}) <= 100",
                    a.review_threshold, a.approve_threshold
                ),
            });
        }

        if !(a.dbr_warning_threshold.is_finite() && a.dbr_warning_threshold >= 0.0) {
            return Err(ConfigError::InvalidValue {
                key: "assessment.dbr_warning_threshold".into(),
                reason: format!("{} is negative or not finite", a.dbr_warning_threshold),
            });
        }

        Ok(())
    }

    /// Serialize configuration to TOML string
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Serialize(e.to_string()))
    }

    /// Generate a default configuration file content
    pub fn default_config_content() -> &'static str {
        r#"# credit-fis configuration file

[general]
# Logging level: quiet, normal, verbose, debug
log_level = "normal"
# Output format: text, json
format = "text"

[engine]
# Sampling step of the eligibility universe [0, 100], must divide 100 evenly
output_step = 1.0

[assessment]
# Scores at or above approve_threshold are approved
approve_threshold = 60.0
# Scores at or above review_threshold go to manual review
review_threshold = 40.0
# Debt-burden ratio (percent) above which a warning is attached
dbr_warning_threshold = 60.0
# Report applications that activate no rule as a reject instead of an error
no_activation_as_reject = false
"#
    }
}

fn parse_number(key: &str, val: &str) -> Result<f64, ConfigError> {
    val.trim()
        .parse::<f64>()
        .map_err(|_| ConfigError::invalid_env(key, val))
}

// ============================================================================
// Error Types
// ============================================================================

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("IO error reading {}: {}", .0.display(), .1)]
    Io(PathBuf, String),
    #[error("parse error in {}: {}", .0.display(), .1)]
    Parse(PathBuf, String),
    #[error("serialization error: {0}")]
    Serialize(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

impl ConfigError {
    fn invalid_env(key: &str, val: &str) -> Self {
        ConfigError::InvalidValue {
            key: format!("{}{}", ENV_PREFIX, key),
            reason: format!("cannot parse '{}'", val),
        }
    }
}

impl From<ConfigError> for FisError {
    fn from(err: ConfigError) -> Self {
        let code = match &err {
            ConfigError::NotFound(_) => ErrorCode::ConfigNotFound,
            ConfigError::Parse(..) => ErrorCode::InvalidConfigSyntax,
            ConfigError::InvalidValue { .. } => ErrorCode::InvalidConfigValue,
            ConfigError::Io(..) | ConfigError::Serialize(_) => ErrorCode::ConfigError,
        };
        let fis = FisError::config(err.to_string()).with_code(code);
        match err {
            ConfigError::NotFound(path) | ConfigError::Io(path, _) | ConfigError::Parse(path, _) => {
                fis.with_context("path", path.display().to_string())
            }
            ConfigError::InvalidValue { key, .. } => fis.with_context("key", key),
            ConfigError::Serialize(_) => fis,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
