//! Conditional chaining.
//!
//! `value.when(condition, f)` applies `f` only when `condition` holds, so a
//! builder chain does not need to be broken up around an `if`.
//!
//! ```rust,ignore
//! use gatekeep_validator::prelude::*;
//!
//! let rules = RuleSet::from("integer")
//!     .when(strict, |rules| rules.merged("bail"))
//!     .unless(optional, |rules| rules.merged("required"));
//! ```

use crate::foundation::RuleSet;

/// Applies `then` when `condition` holds, otherwise `otherwise`.
pub fn apply_when<T>(
    value: T,
    condition: bool,
    then: impl FnOnce(T) -> T,
    otherwise: impl FnOnce(T) -> T,
) -> T {
    if condition { then(value) } else { otherwise(value) }
}

/// Applies `then` when `condition` does not hold, otherwise `otherwise`.
pub fn apply_unless<T>(
    value: T,
    condition: bool,
    then: impl FnOnce(T) -> T,
    otherwise: impl FnOnce(T) -> T,
) -> T {
    apply_when(value, !condition, then, otherwise)
}

/// Method form of [`apply_when`] and [`apply_unless`].
pub trait Conditionable: Sized {
    /// Applies `then` when `condition` holds.
    #[must_use]
    fn when(self, condition: bool, then: impl FnOnce(Self) -> Self) -> Self {
        apply_when(self, condition, then, std::convert::identity)
    }

    /// Applies `then` when `condition` holds, otherwise `otherwise`.
    #[must_use]
    fn when_else(
        self,
        condition: bool,
        then: impl FnOnce(Self) -> Self,
        otherwise: impl FnOnce(Self) -> Self,
    ) -> Self {
        apply_when(self, condition, then, otherwise)
    }

    /// Applies `then` when `condition` does not hold.
    #[must_use]
    fn unless(self, condition: bool, then: impl FnOnce(Self) -> Self) -> Self {
        apply_unless(self, condition, then, std::convert::identity)
    }

    /// Applies `then` when `condition` does not hold, otherwise `otherwise`.
    #[must_use]
    fn unless_else(
        self,
        condition: bool,
        then: impl FnOnce(Self) -> Self,
        otherwise: impl FnOnce(Self) -> Self,
    ) -> Self {
        apply_unless(self, condition, then, otherwise)
    }
}

impl Conditionable for RuleSet {}
