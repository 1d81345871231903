//! Process-wide default configuration per rule type.
//!
//! Each [`CustomRule`] type has at most one registered [`DefaultCallback`],
//! keyed by its `TypeId`. The registry is meant to be written during
//! application start-up and only read while requests are handled: the lock
//! keeps concurrent access memory-safe, but a write racing with
//! [`CustomRule::default_rule`] gives that caller either the old or the new
//! default, with no ordering guarantee.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::custom::CustomRule;
use crate::error::RuleError;
use crate::foundation::SharedRule;

/// Produces the default rule on demand. `None` means "no usable rule", in
/// which case a bare instance is built instead.
pub type DefaultFactory = Arc<dyn Fn() -> Option<SharedRule> + Send + Sync>;

/// How the default configuration of a rule type is produced.
pub enum DefaultCallback<R> {
    /// Called on every [`default_rule`](CustomRule::default_rule).
    Factory(DefaultFactory),
    /// Returned as the same shared object on every call.
    Instance(R),
}

impl<R> DefaultCallback<R> {
    /// Wraps a closure.
    pub fn factory<F>(factory: F) -> Self
    where
        F: Fn() -> Option<SharedRule> + Send + Sync + 'static,
    {
        Self::Factory(Arc::new(factory))
    }

    /// Wraps a configured instance.
    pub fn instance(rule: R) -> Self {
        Self::Instance(rule)
    }
}

impl<R> fmt::Debug for DefaultCallback<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Factory(_) => f.write_str("DefaultCallback::Factory(..)"),
            Self::Instance(_) => write!(f, "DefaultCallback::Instance({})", type_name::<R>()),
        }
    }
}

#[derive(Clone)]
enum Slot {
    Factory(DefaultFactory),
    Instance(SharedRule),
}

static REGISTRY: LazyLock<RwLock<HashMap<TypeId, Slot>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// Resolves the default rule for `R`.
///
/// The factory runs outside the lock, so it may resolve other rule types.
pub(crate) fn resolve<R: CustomRule>() -> SharedRule {
    let slot = REGISTRY.read().get(&TypeId::of::<R>()).cloned();

    let candidate = match slot {
        Some(Slot::Factory(factory)) => factory(),
        Some(Slot::Instance(rule)) => Some(rule),
        None => None,
    };

    candidate.unwrap_or_else(|| {
        trace!(rule = type_name::<R>(), "no usable default, building a bare instance");
        SharedRule::new(R::default())
    })
}

/// Stores or clears the callback for `R`.
///
/// Clearing returns the default that was in effect, read before the reset.
pub(crate) fn configure<R: CustomRule>(callback: Option<DefaultCallback<R>>) -> Option<SharedRule> {
    let key = TypeId::of::<R>();

    match callback {
        None => {
            let previous = resolve::<R>();
            REGISTRY.write().remove(&key);
            debug!(rule = type_name::<R>(), "default callback cleared");
            Some(previous)
        }
        Some(callback) => {
            let slot = match callback {
                DefaultCallback::Factory(factory) => Slot::Factory(factory),
                DefaultCallback::Instance(rule) => Slot::Instance(SharedRule::new(rule)),
            };
            REGISTRY.write().insert(key, slot);
            debug!(rule = type_name::<R>(), "default callback registered");
            None
        }
    }
}

/// Dynamic form of [`configure`]: accepts a boxed `DefaultCallback<R>`, an
/// `R`, a [`DefaultFactory`], a boxed `dyn Fn() -> Option<SharedRule>` or a
/// plain `fn() -> Option<SharedRule>`, and rejects anything else before
/// touching the registry.
///
/// Closures have unnamed types and cannot be recognised behind `dyn Any`;
/// pass them as a `DefaultFactory` or a `DefaultCallback`.
pub(crate) fn try_configure<R: CustomRule>(
    callback: Option<Box<dyn Any + Send>>,
) -> Result<Option<SharedRule>, RuleError> {
    let Some(callback) = callback else {
        return Ok(configure::<R>(None));
    };

    let callback = downcast_callback::<R>(callback).ok_or(RuleError::InvalidDefaultCallback {
        rule: type_name::<R>(),
    })?;

    Ok(configure(Some(callback)))
}

type BoxedFactory = Box<dyn Fn() -> Option<SharedRule> + Send + Sync>;

fn downcast_callback<R: CustomRule>(callback: Box<dyn Any + Send>) -> Option<DefaultCallback<R>> {
    let callback = match callback.downcast::<DefaultCallback<R>>() {
        Ok(callback) => return Some(*callback),
        Err(other) => other,
    };
    let callback = match callback.downcast::<R>() {
        Ok(rule) => return Some(DefaultCallback::Instance(*rule)),
        Err(other) => other,
    };
    let callback = match callback.downcast::<DefaultFactory>() {
        Ok(factory) => return Some(DefaultCallback::Factory(*factory)),
        Err(other) => other,
    };
    let callback = match callback.downcast::<BoxedFactory>() {
        Ok(factory) => return Some(DefaultCallback::Factory(Arc::from(*factory))),
        Err(other) => other,
    };
    match callback.downcast::<fn() -> Option<SharedRule>>() {
        Ok(factory) => Some(DefaultCallback::Factory(Arc::new(*factory))),
        Err(_) => None,
    }
}
