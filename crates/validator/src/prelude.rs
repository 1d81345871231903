//! Prelude module for convenient imports.
//!
//! ```rust,ignore
//! use gatekeep_validator::prelude::*;
//! ```

pub use crate::conditionable::{Conditionable, apply_unless, apply_when};
pub use crate::custom::{CustomRule, DefaultCallback, DefaultFactory, RuleState};
pub use crate::engine::{Factory, MessageBag, Validator, ValidatorConfig, ValidatorContext};
pub use crate::error::{RuleError, ValidationFailure};
pub use crate::foundation::{
    ArrayTranslator, Data, MessageKeys, Rule, RuleSet, RuleToken, SharedRule, Translator, Value,
};
pub use crate::rules;
