//! # gatekeep-validator
//!
//! Building blocks for application-defined validation rules.
//!
//! A custom rule implements [`CustomRule`](custom::CustomRule): it supplies a
//! `passes` check and gets, for free, a per-type default configuration
//! registry, `required()` / `sometimes()` / `nullable()` rule-set
//! constructors, nested validation with caller-supplied extra rules, and
//! translated failure messages.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use gatekeep_validator::prelude::*;
//!
//! EvenNumber::defaults(Some(DefaultCallback::instance(EvenNumber::default().rules("integer"))));
//!
//! let mut validator = factory.make(data, [("age", EvenNumber::required())], HashMap::new(), HashMap::new());
//! assert!(validator.passes());
//! ```
//!
//! ## Layout
//!
//! - [`foundation`]: values, the [`Rule`](foundation::Rule) capability, rule tokens, translation
//! - [`engine`]: the reference validation engine ([`Factory`](engine::Factory), [`Validator`](engine::Validator))
//! - [`custom`]: the custom rule base and default registry
//! - [`conditionable`]: `when` / `unless` chaining

pub mod conditionable;
pub mod custom;
pub mod engine;
pub mod error;
pub mod foundation;
mod macros;
pub mod prelude;
