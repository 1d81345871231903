//! The custom rule trait and its per-instance state.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::conditionable::Conditionable;
use crate::custom::defaults::{self, DefaultCallback};
use crate::engine::{Factory, Validator, ValidatorContext};
use crate::error::RuleError;
use crate::foundation::{Data, MessageKeys, Rule, RuleSet, SharedRule, Value};

// ============================================================================
// STATE
// ============================================================================

/// State every custom rule carries between injection and evaluation.
///
/// `validator` and `data` are replaced before each evaluation. `messages`
/// only grows through [`CustomRule::fail`] and is cleared only by
/// [`CustomRule::reset_messages`].
#[derive(Debug, Clone, Default)]
pub struct RuleState {
    validator: Option<ValidatorContext>,
    data: Data,
    custom_rules: RuleSet,
    messages: Vec<String>,
}

impl RuleState {
    /// Creates empty state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The injected session, if any.
    #[must_use]
    pub fn validator(&self) -> Option<&ValidatorContext> {
        self.validator.as_ref()
    }

    /// The injected record.
    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Rules appended after the rule's own set in [`CustomRule::validate`].
    #[must_use]
    pub fn custom_rules(&self) -> &RuleSet {
        &self.custom_rules
    }

    /// Accumulated failure messages.
    #[must_use]
    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}

// ============================================================================
// CUSTOM RULE
// ============================================================================

/// Base for application-defined rules.
///
/// Implementors provide [`passes`](Self::passes) and access to their
/// [`RuleState`]; everything else is provided. Every `CustomRule` is a
/// [`Rule`], so it can be placed in any rule set.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeep_validator::prelude::*;
///
/// #[derive(Debug, Default)]
/// struct EvenNumber {
///     state: RuleState,
/// }
///
/// impl CustomRule for EvenNumber {
///     fn state(&self) -> &RuleState {
///         &self.state
///     }
///
///     fn state_mut(&mut self) -> &mut RuleState {
///         &mut self.state
///     }
///
///     fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
///         self.reset_messages();
///         if value.as_i64().is_some_and(|n| n % 2 == 0) {
///             return true;
///         }
///         self.fail("validation.even")
///     }
/// }
///
/// let rules = EvenNumber::required(); // ["required", <default EvenNumber>]
/// ```
pub trait CustomRule: Default + Send + 'static {
    /// Whether the engine runs this rule for absent or blank attributes.
    const IMPLICIT: bool = false;

    /// Shared state.
    fn state(&self) -> &RuleState;

    /// Shared state, mutably.
    fn state_mut(&mut self) -> &mut RuleState;

    /// Returns `true` when `value` satisfies the rule.
    ///
    /// On failure, record messages through [`fail`](Self::fail) before
    /// returning `false`. Call [`reset_messages`](Self::reset_messages) first
    /// if the instance may be evaluated more than once.
    fn passes(&mut self, attribute: &str, value: &Value) -> bool;

    // ------------------------------------------------------------------------
    // Default configuration
    // ------------------------------------------------------------------------

    /// Registers or clears the default configuration of this rule type.
    ///
    /// With `Some(callback)`, stores it and returns `None`. With `None`,
    /// returns the default currently in effect and then clears the callback.
    fn defaults(callback: Option<DefaultCallback<Self>>) -> Option<SharedRule> {
        defaults::configure::<Self>(callback)
    }

    /// Like [`defaults`](Self::defaults) for callbacks of unknown type.
    ///
    /// Accepts a boxed `DefaultCallback<Self>`, `Self`,
    /// [`DefaultFactory`](defaults::DefaultFactory), boxed
    /// `dyn Fn() -> Option<SharedRule>` or `fn() -> Option<SharedRule>`.
    /// Bare closures are not recognised. Anything else returns
    /// [`RuleError::InvalidDefaultCallback`] and leaves the registry untouched.
    fn try_defaults(callback: Option<Box<dyn Any + Send>>) -> Result<Option<SharedRule>, RuleError> {
        defaults::try_configure::<Self>(callback)
    }

    /// The default configuration of this rule type.
    ///
    /// Uses the registered callback when it yields a rule, otherwise a
    /// fresh `Self::default()`.
    fn default_rule() -> SharedRule {
        defaults::resolve::<Self>()
    }

    /// `[default]`
    fn to_array() -> RuleSet {
        RuleSet::from(Self::default_rule())
    }

    /// `["required", default]`
    fn required() -> RuleSet {
        RuleSet::from("required").merged(Self::default_rule())
    }

    /// `["sometimes", default]`
    fn sometimes() -> RuleSet {
        RuleSet::from("sometimes").merged(Self::default_rule())
    }

    /// `["nullable", default]`
    fn nullable() -> RuleSet {
        RuleSet::from("nullable").merged(Self::default_rule())
    }

    // ------------------------------------------------------------------------
    // Instance API
    // ------------------------------------------------------------------------

    /// Wraps this instance for use in rule sets.
    fn into_shared(self) -> SharedRule {
        SharedRule::new(self)
    }

    /// Stores the session performing the validation.
    fn set_validator(&mut self, validator: &ValidatorContext) -> &mut Self {
        self.state_mut().validator = Some(validator.clone());
        self
    }

    /// Stores the record under validation.
    fn set_data(&mut self, data: Data) -> &mut Self {
        self.state_mut().data = data;
        self
    }

    /// Sets rules appended to the rule's own set in [`validate`](Self::validate).
    /// A single rule is wrapped into a one-element set.
    #[must_use = "builder methods must be chained or built"]
    fn rules(mut self, rules: impl Into<RuleSet>) -> Self {
        self.state_mut().custom_rules = rules.into();
        self
    }

    /// Accumulated failure messages.
    fn message(&self) -> &[String] {
        &self.state().messages
    }

    /// Clears the accumulated messages.
    fn reset_messages(&mut self) {
        self.state_mut().messages.clear();
    }

    /// Builds a validator for `attribute` over the injected record with
    /// `rules` followed by the custom rules, reusing the session's custom
    /// messages and attribute labels.
    fn validate(&self, attribute: &str, rules: impl Into<RuleSet>) -> Validator {
        let state = self.state();
        let rules = rules.into().merged(state.custom_rules.clone());
        let data = state.data.clone();

        match &state.validator {
            Some(context) => context.factory().make(
                data,
                [(attribute, rules)],
                Arc::clone(context.custom_messages()),
                Arc::clone(context.custom_attributes()),
            ),
            None => {
                debug!(attribute, "no validator injected, using a default factory");
                Factory::default().make(data, [(attribute, rules)], HashMap::new(), HashMap::new())
            }
        }
    }

    /// Records translated failure messages and returns `false`.
    ///
    /// Without an injected validator the keys are stored as given.
    fn fail(&mut self, messages: impl Into<MessageKeys>) -> bool {
        let keys = messages.into();
        let state = self.state_mut();

        let resolved: Vec<String> = match &state.validator {
            Some(context) => {
                let translator = context.translator();
                keys.iter().map(|key| translator.get(key)).collect()
            }
            None => keys.into_vec(),
        };

        trace!(count = resolved.len(), "rule failed");
        state.messages.extend(resolved);
        false
    }
}

impl<R: CustomRule> Rule for R {
    fn evaluate(&mut self, attribute: &str, value: &Value) -> bool {
        CustomRule::passes(self, attribute, value)
    }

    fn failure_messages(&self) -> Vec<String> {
        self.message().to_vec()
    }

    fn inject_validator(&mut self, validator: &ValidatorContext) {
        self.set_validator(validator);
    }

    fn inject_data(&mut self, data: &Data) {
        self.set_data(data.clone());
    }

    fn is_implicit(&self) -> bool {
        R::IMPLICIT
    }
}

impl<R: CustomRule> Conditionable for R {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::{ArrayTranslator, RuleToken};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[derive(Debug, Default)]
    struct EvenNumber {
        state: RuleState,
    }

    impl CustomRule for EvenNumber {
        fn state(&self) -> &RuleState {
            &self.state
        }

        fn state_mut(&mut self) -> &mut RuleState {
            &mut self.state
        }

        fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
            self.reset_messages();
            if value.as_i64().is_some_and(|n| n % 2 == 0) {
                return true;
            }
            self.fail("not_even")
        }
    }

    fn context() -> ValidatorContext {
        Factory::builder()
            .translator(
                ArrayTranslator::new("en")
                    .with_line("not_even", "Value must be even.")
                    .with_line("a.key", "First.")
                    .with_line("b.key", "Second."),
            )
            .build()
            .context()
    }

    #[test]
    fn test_even_number_scenario() {
        let mut rule = EvenNumber::default();
        rule.set_validator(&context());

        assert!(rule.passes("x", &json!(4)));
        assert!(rule.message().is_empty());

        assert!(!rule.passes("x", &json!(3)));
        assert_eq!(rule.message(), ["Value must be even.".to_owned()]);
    }

    #[test]
    fn test_fail_returns_false_and_accumulates() {
        let mut rule = EvenNumber::default();
        rule.set_validator(&context());

        assert!(!rule.fail(["a.key", "b.key"]));
        assert!(!rule.fail("a.key"));
        assert_eq!(
            rule.message(),
            ["First.".to_owned(), "Second.".to_owned(), "First.".to_owned()]
        );

        rule.reset_messages();
        assert!(rule.message().is_empty());
    }

    #[test]
    fn test_fail_without_validator_keeps_keys() {
        let mut rule = EvenNumber::default();
        assert!(!rule.fail("not_even"));
        assert_eq!(rule.message(), ["not_even".to_owned()]);
    }

    #[test]
    fn test_validate_appends_custom_rules() {
        let mut rule = EvenNumber::default().rules("foo");
        rule.set_data(Data::new());
        rule.set_validator(&context());

        let validator = rule.validate("field", "bar");
        let names: Vec<_> = validator.rules()["field"]
            .iter()
            .filter_map(RuleToken::name)
            .collect();
        assert_eq!(names, vec!["bar", "foo"]);
    }

    #[test]
    fn test_validate_reuses_session_messages_and_labels() {
        let factory = Factory::default();
        let session = factory.make(
            Data::new(),
            [("n", "integer")],
            HashMap::from([("integer".to_owned(), "Whole :attribute.".to_owned())]),
            HashMap::from([("n".to_owned(), "number".to_owned())]),
        );

        let mut rule = EvenNumber::default();
        rule.set_validator(session.context());
        let data = match json!({"n": "x"}) {
            Value::Object(map) => map,
            _ => unreachable!(),
        };
        rule.set_data(data);

        let mut nested = rule.validate("n", "integer");
        assert!(Arc::ptr_eq(nested.context().custom_messages(), session.context().custom_messages()));
        assert!(nested.fails());
        assert_eq!(nested.errors().first("n"), Some("Whole number."));
    }

    #[test]
    fn test_rules_wraps_single_rule() {
        let rule = EvenNumber::default().rules("integer");
        assert_eq!(rule.state().custom_rules(), &RuleSet::from(["integer"]));

        let rule = EvenNumber::default().rules(["integer", "min"]);
        assert_eq!(rule.state().custom_rules().len(), 2);
    }

    #[test]
    fn test_rule_capability_forwards_to_custom_rule() {
        let shared = EvenNumber::default().into_shared();
        let mut rule = shared.lock();
        rule.inject_validator(&context());
        assert!(!rule.evaluate("x", &json!(5)));
        assert_eq!(rule.failure_messages(), vec!["Value must be even.".to_owned()]);
        assert!(!rule.is_implicit());
    }
}
