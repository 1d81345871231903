//! Reference validation engine.
//!
//! A [`Factory`] builds [`Validator`] sessions from a record, a per-attribute
//! rule map, custom messages and custom attribute labels. Rule objects see the
//! session through a [`ValidatorContext`].

mod builtin;
pub mod factory;
pub mod messages;
pub mod validator;

pub use factory::{Extension, Factory, FactoryBuilder, ValidatorConfig};
pub use messages::MessageBag;
pub use validator::{Validator, ValidatorContext};
