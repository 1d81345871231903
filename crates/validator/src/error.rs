//! Error types for rule configuration.
//!
//! Validation failures are not errors: they travel as `false` plus collected
//! messages. The types here cover programming and configuration mistakes
//! that must reach the caller, and the wrapper returned by
//! [`Validator::validate`](crate::engine::Validator::validate).

use crate::engine::MessageBag;

/// Error type for rule configuration and collaborator setup.
#[derive(Debug, thiserror::Error)]
pub enum RuleError {
    /// A default callback was neither a factory nor an instance of the rule.
    #[error("the given callback should be callable or an instance of {rule}")]
    InvalidDefaultCallback { rule: &'static str },

    /// Translation lines could not be loaded.
    #[error("invalid translation lines for locale `{locale}`: {reason}")]
    InvalidTranslations { locale: String, reason: String },

    /// Validator configuration could not be parsed.
    #[error("invalid validator configuration: {0}")]
    InvalidConfig(#[from] serde_json::Error),
}

impl RuleError {
    /// Broad error category for grouping in logs.
    #[must_use]
    pub fn category(&self) -> &str {
        match self {
            Self::InvalidDefaultCallback { .. } => "argument",
            Self::InvalidTranslations { .. } => "translation",
            Self::InvalidConfig(_) => "config",
        }
    }

    /// Machine-readable error code for programmatic handling.
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::InvalidDefaultCallback { .. } => "RULE_INVALID_DEFAULT",
            Self::InvalidTranslations { .. } => "RULE_INVALID_TRANSLATIONS",
            Self::InvalidConfig(_) => "RULE_INVALID_CONFIG",
        }
    }
}

/// Returned by [`Validator::validate`](crate::engine::Validator::validate)
/// when at least one attribute failed.
#[derive(Debug, Clone, thiserror::Error)]
#[error("validation failed with {} message(s)", .errors.len())]
pub struct ValidationFailure {
    /// Every collected message, grouped by attribute.
    pub errors: MessageBag,
}

impl ValidationFailure {
    /// Consumes the failure and returns its messages.
    #[must_use]
    pub fn into_errors(self) -> MessageBag {
        self.errors
    }
}
