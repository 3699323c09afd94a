//! Structured Error Handling for credit-fis
//!
//! Provides a unified error type hierarchy with:
//! - Error codes for programmatic handling
//! - Structured error responses (JSON-friendly)
//! - Context preservation through error chains
//! - Process exit code mapping for the CLI
//!
//! # Error Categories
//!
//! - Model errors (1xxx) - malformed variables, terms or rules; raised while
//!   an engine is being built, never during inference
//! - Input errors (2xxx) - missing, unknown or non-finite crisp inputs
//! - Inference errors (3xxx) - no rule activated for a consequent
//! - Config errors (7xxx) - configuration file and value problems
//!
//! # Example
//!
//! ```rust,ignore
//! use credit_fis::error::{FisError, ErrorCode};
//!
//! fn require(name: &str, value: Option<f64>) -> Result<f64, FisError> {
//!     value.ok_or_else(|| FisError::missing_input(name)
//!         .with_hint("Supply one crisp value per antecedent"))
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use serde::{Deserialize, Serialize};

// ============================================================================
// Error Codes
// ============================================================================

/// Unique error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Model construction errors (1xxx)
    /// Triangle breakpoints out of order or not finite
    InvalidMembership = 1001,
    /// Universe bounds or step invalid
    InvalidUniverse = 1002,
    /// Term name registered twice on one variable
    DuplicateTerm = 1003,
    /// Variable name declared twice on one engine
    DuplicateVariable = 1004,
    /// Reference to an undeclared variable
    UnknownVariable = 1005,
    /// Reference to an undeclared term
    UnknownTerm = 1006,
    /// Variable used in the wrong role
    RoleMismatch = 1007,
    /// Rule without any consequent
    EmptyConsequent = 1008,
    /// Engine without any rule
    EmptyRuleBase = 1009,
    /// Rule weight outside [0, 1]
    InvalidWeight = 1010,

    // Input errors (2xxx)
    /// Generic input error
    InputError = 2000,
    /// No crisp value for a declared antecedent
    MissingInput = 2001,
    /// Crisp value for an undeclared variable
    UnknownInput = 2002,
    /// Crisp value is NaN or infinite
    NonFiniteInput = 2003,
    /// Loan application rejected by upstream validation
    InvalidApplication = 2004,

    // Inference errors (3xxx)
    /// Aggregated distribution sums to zero
    NoRuleActivated = 3001,

    // Config errors (7xxx)
    /// Generic config error
    ConfigError = 7000,
    /// Config file not found
    ConfigNotFound = 7001,
    /// Invalid config syntax
    InvalidConfigSyntax = 7002,
    /// Invalid config value
    InvalidConfigValue = 7004,

    // Internal errors (9xxx)
    /// Internal error
    InternalError = 9000,
}

impl ErrorCode {
    /// Get the numeric code value
    pub fn code(&self) -> u32 {
        *self as u32
    }

    /// Get a short description of the error code
    pub fn description(&self) -> &'static str {
        match self {
            // Model errors
            ErrorCode::InvalidMembership => "Invalid membership function",
            ErrorCode::InvalidUniverse => "Invalid universe of discourse",
            ErrorCode::DuplicateTerm => "Duplicate term",
            ErrorCode::DuplicateVariable => "Duplicate variable",
            ErrorCode::UnknownVariable => "Unknown variable",
            ErrorCode::UnknownTerm => "Unknown term",
            ErrorCode::RoleMismatch => "Variable used in wrong role",
            ErrorCode::EmptyConsequent => "Rule has no consequent",
            ErrorCode::EmptyRuleBase => "Rule base is empty",
            ErrorCode::InvalidWeight => "Invalid rule weight",

            // Input errors
            ErrorCode::InputError => "Input error",
            ErrorCode::MissingInput => "Missing input",
            ErrorCode::UnknownInput => "Unknown input",
            ErrorCode::NonFiniteInput => "Non-finite input",
            ErrorCode::InvalidApplication => "Invalid loan application",

            // Inference errors
            ErrorCode::NoRuleActivated => "No rule activated",

            // Config errors
            ErrorCode::ConfigError => "Configuration error",
            ErrorCode::ConfigNotFound => "Configuration file not found",
            ErrorCode::InvalidConfigSyntax => "Invalid configuration syntax",
            ErrorCode::InvalidConfigValue => "Invalid configuration value",

            // Internal errors
            ErrorCode::InternalError => "Internal error",
        }
    }

    /// Get the process exit code the CLI uses for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            // Caller data problems
            ErrorCode::InputError
            | ErrorCode::MissingInput
            | ErrorCode::UnknownInput
            | ErrorCode::NonFiniteInput
            | ErrorCode::InvalidApplication => 2,

            // The engine ran but could not produce a score
            ErrorCode::NoRuleActivated => 3,

            // Broken knowledge base
            ErrorCode::InvalidMembership
            | ErrorCode::InvalidUniverse
            | ErrorCode::DuplicateTerm
            | ErrorCode::DuplicateVariable
            | ErrorCode::UnknownVariable
            | ErrorCode::UnknownTerm
            | ErrorCode::RoleMismatch
            | ErrorCode::EmptyConsequent
            | ErrorCode::EmptyRuleBase
            | ErrorCode::InvalidWeight => 4,

            ErrorCode::ConfigError
            | ErrorCode::ConfigNotFound
            | ErrorCode::InvalidConfigSyntax
            | ErrorCode::InvalidConfigValue => 78,

            ErrorCode::InternalError => 70,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

// ============================================================================
// Error Context
// ============================================================================

/// Additional context information for an error
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Key-value pairs of context information
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fields: HashMap<String, String>,
    /// Source location (file:line)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Stack of error causes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl ErrorContext {
    /// Create a new empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field to the context
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for credit-fis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FisError {
    /// Error code for programmatic handling
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Additional context
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<ErrorContext>,
    /// Hint for resolving the error
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl FisError {
    /// Create a new error with a code and message
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: None,
            hint: None,
        }
    }

    // ========================================================================
    // Factory methods for common error types
    // ========================================================================

    /// Create a malformed triangle error
    pub fn invalid_membership(term: &str, a: f64, b: f64, c: f64) -> Self {
        Self::new(
            ErrorCode::InvalidMembership,
            format!(
                "Term '{}' has invalid triangle ({}, {}, {}); expected finite a <= b <= c",
                term, a, b, c
            ),
        )
        .with_context("term", term)
    }

    /// Create an invalid universe error
    pub fn invalid_universe(variable: &str, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidUniverse, message).with_context("variable", variable)
    }

    /// Create an unknown variable error
    pub fn unknown_variable(variable: &str) -> Self {
        Self::new(
            ErrorCode::UnknownVariable,
            format!("Variable '{}' is not declared", variable),
        )
        .with_context("variable", variable)
    }

    /// Create an unknown term error
    pub fn unknown_term(variable: &str, term: &str) -> Self {
        Self::new(
            ErrorCode::UnknownTerm,
            format!("Variable '{}' has no term '{}'", variable, term),
        )
        .with_context("variable", variable)
        .with_context("term", term)
    }

    /// Create a missing input error
    pub fn missing_input(variable: &str) -> Self {
        Self::new(
            ErrorCode::MissingInput,
            format!("No crisp value supplied for antecedent '{}'", variable),
        )
        .with_context("variable", variable)
    }

    /// Create an unknown input error
    pub fn unknown_input(variable: &str) -> Self {
        Self::new(
            ErrorCode::UnknownInput,
            format!("'{}' is not a declared antecedent", variable),
        )
        .with_context("variable", variable)
    }

    /// Create a no-activation error
    pub fn no_rule_activated(consequent: &str) -> Self {
        Self::new(
            ErrorCode::NoRuleActivated,
            format!("No rule activated for consequent '{}'", consequent),
        )
        .with_context("variable", consequent)
        .with_hint("No rule antecedent has a non-zero degree for these inputs")
    }

    /// Create an invalid application error
    pub fn invalid_application(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidApplication, message)
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigError, message)
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    // ========================================================================
    // Builder methods
    // ========================================================================

    /// Set the error code
    pub fn with_code(mut self, code: ErrorCode) -> Self {
        self.code = code;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.fields.insert(key.into(), value.into());
        self
    }

    /// Add a cause to the error chain
    pub fn with_cause(mut self, cause: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.causes.push(cause.into());
        self
    }

    /// Add source location
    pub fn at(mut self, location: impl Into<String>) -> Self {
        let ctx = self.context.get_or_insert_with(ErrorContext::new);
        ctx.location = Some(location.into());
        self
    }

    /// Add a hint for resolving the error
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Look up a context field
    pub fn context_field(&self, key: &str) -> Option<&str> {
        self.context
            .as_ref()
            .and_then(|c| c.fields.get(key))
            .map(String::as_str)
    }

    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    /// Check if this error was caused by caller-supplied data
    pub fn is_input_error(&self) -> bool {
        (2000..3000).contains(&self.code.code())
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| {
            format!(r#"{{"code":"INTERNAL_ERROR","message":"{}"}}"#, self.message)
        })
    }

    /// Convert to pretty JSON string
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| self.to_json())
    }
}

impl fmt::Display for FisError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code.code(), self.message)?;

        if let Some(ref ctx) = self.context {
            if let Some(ref loc) = ctx.location {
                write!(f, " at {}", loc)?;
            }
            if !ctx.causes.is_empty() {
                write!(f, "\nCaused by:")?;
                for cause in &ctx.causes {
                    write!(f, "\n  - {}", cause)?;
                }
            }
        }

        if let Some(ref hint) = self.hint {
            write!(f, "\nHint: {}", hint)?;
        }

        Ok(())
    }
}

impl std::error::Error for FisError {}

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<std::io::Error> for FisError {
    fn from(err: std::io::Error) -> Self {
        use std::io::ErrorKind;
        let code = match err.kind() {
            ErrorKind::NotFound => ErrorCode::ConfigNotFound,
            _ => ErrorCode::InternalError,
        };
        FisError::new(code, err.to_string())
    }
}

impl From<serde_json::Error> for FisError {
    fn from(err: serde_json::Error) -> Self {
        FisError::invalid_application(err.to_string())
            .with_code(ErrorCode::InputError)
            .with_context("format", "JSON")
    }
}

impl From<toml::de::Error> for FisError {
    fn from(err: toml::de::Error) -> Self {
        FisError::config(err.to_string())
            .with_code(ErrorCode::InvalidConfigSyntax)
    }
}

// ============================================================================
// Result type alias
// ============================================================================

/// A Result type using FisError
pub type FisResult<T> = Result<T, FisError>;

// ============================================================================
// Macros for convenient error creation
// ============================================================================

/// Create a FisError with context from the current location
#[macro_export]
macro_rules! fis_error {
    ($code:expr, $msg:expr) => {
        $crate::error::FisError::new($code, $msg)
            .at(format!("{}:{}", file!(), line!()))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        $crate::error::FisError::new($code, format!($fmt, $($arg)*))
            .at(format!("{}:{}", file!(), line!()))
    };
}

/// Bail out early with an error
#[macro_export]
macro_rules! fis_bail {
    ($code:expr, $msg:expr) => {
        return Err($crate::fis_error!($code, $msg))
    };
    ($code:expr, $fmt:expr, $($arg:tt)*) => {
        return Err($crate::fis_error!($code, $fmt, $($arg)*))
    };
}

/// Ensure a condition holds, or return an error
#[macro_export]
macro_rules! fis_ensure {
    ($cond:expr, $code:expr, $msg:expr) => {
        if !$cond {
            $crate::fis_bail!($code, $msg);
        }
    };
    ($cond:expr, $code:expr, $fmt:expr, $($arg:tt)*) => {
        if !$cond {
            $crate::fis_bail!($code, $fmt, $($arg)*);
        }
    };
}

// ============================================================================
// Tests
// ============================================================================
