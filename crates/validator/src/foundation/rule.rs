//! The rule capability understood by the validation engine.

use std::cell::RefCell;
use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};

use crate::engine::ValidatorContext;
use crate::foundation::{Data, Value};

/// A unit of validation logic checked against one attribute's value.
///
/// The engine injects the active session and the full record before calling
/// [`evaluate`](Rule::evaluate), then reads
/// [`failure_messages`](Rule::failure_messages) when it returns `false`.
///
/// Most rules are written against [`CustomRule`](crate::custom::CustomRule),
/// which implements this trait for them.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeep_validator::foundation::{Rule, Value};
///
/// #[derive(Default)]
/// struct Uppercase;
///
/// impl Rule for Uppercase {
///     fn evaluate(&mut self, _attribute: &str, value: &Value) -> bool {
///         value.as_str().is_some_and(|s| s.chars().all(char::is_uppercase))
///     }
///
///     fn failure_messages(&self) -> Vec<String> {
///         vec!["The :attribute must be uppercase.".to_owned()]
///     }
/// }
/// ```
pub trait Rule: Send + 'static {
    /// Returns `true` when `value` satisfies the rule.
    fn evaluate(&mut self, attribute: &str, value: &Value) -> bool;

    /// Messages describing the most recent failure.
    fn failure_messages(&self) -> Vec<String>;

    /// Receives the session performing the validation.
    fn inject_validator(&mut self, _validator: &ValidatorContext) {}

    /// Receives the whole record under validation.
    fn inject_data(&mut self, _data: &Data) {}

    /// Implicit rules run even when the attribute is absent or blank.
    fn is_implicit(&self) -> bool {
        false
    }

    /// Name used in logs.
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// A rule object that can sit in several rule sets at once.
///
/// Cloning is cheap and keeps identity: two clones are [`ptr_eq`](Self::ptr_eq).
#[derive(Clone)]
pub struct SharedRule(Arc<Mutex<dyn Rule>>);

impl SharedRule {
    /// Wraps a rule.
    pub fn new<R: Rule>(rule: R) -> Self {
        let inner: Arc<Mutex<dyn Rule>> = Arc::new(Mutex::new(rule));
        Self(inner)
    }

    /// Locks the rule for evaluation.
    pub fn lock(&self) -> MutexGuard<'_, dyn Rule> {
        self.0.lock()
    }

    /// Locks the rule if no evaluation currently holds it.
    pub fn try_lock(&self) -> Option<MutexGuard<'_, dyn Rule>> {
        self.0.try_lock()
    }

    /// Returns `true` if both handles point at the same rule object.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Locks the rule for evaluation on this thread.
    ///
    /// Waits while another thread evaluates the same object. Returns `None`
    /// when this thread is already evaluating it, e.g. from a nested
    /// validation that reaches the rule again.
    pub fn enter(&self) -> Option<Evaluation<'_>> {
        let key = self.key();
        if EVALUATING.with_borrow(|active| active.contains(&key)) {
            return None;
        }

        let guard = self.0.lock();
        EVALUATING.with_borrow_mut(|active| active.push(key));
        Some(Evaluation { guard, key })
    }

    fn key(&self) -> *const () {
        Arc::as_ptr(&self.0).cast::<()>()
    }
}

thread_local! {
    /// Rule objects the current thread is evaluating, innermost last.
    static EVALUATING: RefCell<Vec<*const ()>> = const { RefCell::new(Vec::new()) };
}

/// Exclusive access to a rule while this thread evaluates it.
///
/// Returned by [`SharedRule::enter`]; dropping it releases the rule.
pub struct Evaluation<'a> {
    guard: MutexGuard<'a, dyn Rule>,
    key: *const (),
}

impl Deref for Evaluation<'_> {
    type Target = dyn Rule;

    fn deref(&self) -> &Self::Target {
        &*self.guard
    }
}

impl DerefMut for Evaluation<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut *self.guard
    }
}

impl Drop for Evaluation<'_> {
    fn drop(&mut self) {
        EVALUATING.with_borrow_mut(|active| {
            if let Some(position) = active.iter().rposition(|key| *key == self.key) {
                active.remove(position);
            }
        });
    }
}

impl fmt::Debug for SharedRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_lock() {
            Some(rule) => f.debug_tuple("SharedRule").field(&rule.name()).finish(),
            None => f.debug_tuple("SharedRule").field(&"<locked>").finish(),
        }
    }
}

impl<R: Rule> From<R> for SharedRule {
    fn from(rule: R) -> Self {
        Self::new(rule)
    }
}
