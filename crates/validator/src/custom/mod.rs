//! Base for application-defined validation rules.
//!
//! Implement [`CustomRule`] for a `Default` type that owns a [`RuleState`]
//! and it becomes a [`Rule`](crate::foundation::Rule) the engine can run,
//! with default-configuration helpers (`required()`, `nullable()`, ...),
//! nested validation through [`CustomRule::validate`] and translated
//! failures through [`CustomRule::fail`].

mod base;
pub mod defaults;

pub use base::{CustomRule, RuleState};
pub use defaults::{DefaultCallback, DefaultFactory};
