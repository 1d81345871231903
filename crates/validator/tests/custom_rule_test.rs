//! Custom rules evaluated through the engine.

use std::collections::HashMap;
use std::sync::Barrier;
use std::thread;
use std::time::Duration;

use gatekeep_validator::prelude::*;
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

// ============================================================================
// RULES UNDER TEST
// ============================================================================

/// Accepts even integers.
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
        self.fail("validation.even")
    }
}

/// Requires `{attribute}_confirmation` to hold the same value.
#[derive(Debug, Default)]
struct Confirmed {
    state: RuleState,
}

impl CustomRule for Confirmed {
    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, attribute: &str, value: &Value) -> bool {
        self.reset_messages();
        let confirmation = self.state().data().get(&format!("{attribute}_confirmation"));
        if confirmation == Some(value) {
            return true;
        }
        self.fail("validation.confirmed")
    }
}

/// Integer check delegated to the engine, plus whatever the caller adds
/// through `rules(...)`.
#[derive(Debug, Default)]
struct Quantity {
    state: RuleState,
}

impl CustomRule for Quantity {
    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, attribute: &str, _value: &Value) -> bool {
        self.reset_messages();
        let mut validator = self.validate(attribute, ["bail", "integer"]);
        if validator.passes() {
            return true;
        }
        let messages: Vec<String> = validator.errors().get(attribute).to_vec();
        self.fail(messages)
    }
}

/// Runs even when the attribute is missing.
#[derive(Debug, Default)]
struct Present {
    state: RuleState,
}

impl CustomRule for Present {
    const IMPLICIT: bool = true;

    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, attribute: &str, _value: &Value) -> bool {
        self.reset_messages();
        if self.state().data().contains_key(attribute) {
            return true;
        }
        self.fail("validation.present")
    }
}

/// Rejects everything without recording a message.
#[derive(Debug, Default)]
struct Silent {
    state: RuleState,
}

impl CustomRule for Silent {
    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, _attribute: &str, _value: &Value) -> bool {
        self.reset_messages();
        false
    }
}

/// Even check that takes long enough for concurrent sessions to overlap.
#[derive(Debug, Default)]
struct Slow {
    state: RuleState,
}

impl CustomRule for Slow {
    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, _attribute: &str, value: &Value) -> bool {
        self.reset_messages();
        thread::sleep(Duration::from_millis(50));
        if value.as_i64().is_some_and(|n| n % 2 == 0) {
            return true;
        }
        self.fail("validation.even")
    }
}

/// Validates the attribute against its own registered default.
#[derive(Debug, Default)]
struct Looping {
    state: RuleState,
}

impl CustomRule for Looping {
    fn state(&self) -> &RuleState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut RuleState {
        &mut self.state
    }

    fn passes(&mut self, attribute: &str, _value: &Value) -> bool {
        self.reset_messages();
        let mut validator = self.validate(attribute, Self::to_array());
        if validator.passes() {
            return true;
        }
        let messages: Vec<String> = validator.errors().get(attribute).to_vec();
        self.fail(messages)
    }
}

// ============================================================================
// HELPERS
// ============================================================================

fn factory() -> Factory {
    Factory::builder()
        .translator(
            ArrayTranslator::from_json(
                "en",
                r#"{
                    "validation": {
                        "required": "The :attribute field is required.",
                        "integer": "The :attribute must be an integer.",
                        "positive": "The :attribute must be positive.",
                        "even": "The :attribute must be even.",
                        "confirmed": "The :attribute confirmation does not match.",
                        "present": "The :attribute field must be present.",
                        "silent": "The :attribute is not accepted.",
                        "recursive_rule": "The :attribute rule refers to itself."
                    }
                }"#,
            )
            .expect("valid translation lines"),
        )
        .extend("positive", |_, value, _| value.as_f64().is_some_and(|n| n > 0.0))
        .build()
}

fn record(value: Value) -> Data {
    match value {
        Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

fn run(data: Value, attribute: &str, rules: RuleSet) -> Validator {
    let mut validator = factory().make(record(data), [(attribute, rules)], HashMap::new(), HashMap::new());
    validator.passes();
    validator
}

// ============================================================================
// TESTS
// ============================================================================

#[rstest]
#[case(json!({"age": 4}), true)]
#[case(json!({"age": 0}), true)]
#[case(json!({"age": 3}), false)]
#[case(json!({"age": "four"}), false)]
fn even_number_through_engine(#[case] data: Value, #[case] expected: bool) {
    let validator = run(data, "age", EvenNumber::to_array());
    assert_eq!(validator.errors().is_empty(), expected);
}

#[test]
fn failure_message_is_translated_and_labelled() {
    let validator = run(json!({"team_size": 3}), "team_size", EvenNumber::to_array());
    assert_eq!(validator.errors().get("team_size"), ["The team size must be even.".to_owned()]);
}

#[test]
fn custom_attribute_label_is_used_for_rule_objects() {
    let mut validator = factory().make(
        record(json!({"n": 3})),
        [("n", EvenNumber::to_array())],
        HashMap::new(),
        HashMap::from([("n".to_owned(), "player count".to_owned())]),
    );
    assert!(validator.fails());
    assert_eq!(validator.errors().first("n"), Some("The player count must be even."));
}

#[test]
fn required_modifier_rejects_missing_attribute() {
    let validator = run(json!({}), "age", EvenNumber::required());
    assert_eq!(validator.errors().get("age"), ["The age field is required.".to_owned()]);
}

#[test]
fn sometimes_modifier_skips_missing_attribute() {
    let validator = run(json!({}), "age", EvenNumber::sometimes());
    assert!(validator.errors().is_empty());

    let validator = run(json!({"age": 5}), "age", EvenNumber::sometimes());
    assert!(validator.errors().has("age"));
}

#[test]
fn nullable_modifier_skips_null() {
    let validator = run(json!({"age": null}), "age", EvenNumber::nullable());
    assert!(validator.errors().is_empty());
}

#[test]
fn rule_sees_the_whole_record() {
    let ok = run(
        json!({"password": "s3cret", "password_confirmation": "s3cret"}),
        "password",
        Confirmed::to_array(),
    );
    assert!(ok.errors().is_empty());

    let mismatch = run(
        json!({"password": "s3cret", "password_confirmation": "typo"}),
        "password",
        Confirmed::to_array(),
    );
    assert_eq!(
        mismatch.errors().first("password"),
        Some("The password confirmation does not match.")
    );
}

#[test]
fn nested_validation_uses_own_rules_then_custom_rules() {
    let rules = RuleSet::from(Quantity::default().rules("positive").into_shared());

    assert!(run(json!({"qty": 3}), "qty", rules.clone()).errors().is_empty());

    let negative = run(json!({"qty": -3}), "qty", rules.clone());
    assert_eq!(negative.errors().get("qty"), ["The qty must be positive.".to_owned()]);

    // `bail` from the rule's own set stops before the custom `positive` rule.
    let text = run(json!({"qty": "x"}), "qty", rules);
    assert_eq!(text.errors().get("qty"), ["The qty must be an integer.".to_owned()]);
}

#[test]
fn nested_validation_reuses_session_custom_messages() {
    let mut validator = factory().make(
        record(json!({"qty": -1})),
        [("qty", RuleSet::from(Quantity::default().rules("positive").into_shared()))],
        HashMap::from([("qty.positive".to_owned(), "Need at least one :attribute.".to_owned())]),
        HashMap::from([("qty".to_owned(), "item".to_owned())]),
    );

    assert!(validator.fails());
    assert_eq!(validator.errors().first("qty"), Some("Need at least one item."));
}

#[test]
fn implicit_rule_runs_for_missing_attribute() {
    let validator = run(json!({}), "terms", Present::to_array());
    assert_eq!(validator.errors().first("terms"), Some("The terms field must be present."));

    let validator = run(json!({"terms": ""}), "terms", Present::to_array());
    assert!(validator.errors().is_empty());
}

#[test]
fn non_implicit_rule_skips_missing_attribute() {
    let validator = run(json!({}), "age", EvenNumber::to_array());
    assert!(validator.errors().is_empty());
}

#[test]
fn shared_default_is_reset_between_attributes() {
    let even = EvenNumber::default().into_shared();
    let mut validator = factory().make(
        record(json!({"a": 3, "b": 4})),
        [("a", RuleSet::from(even.clone())), ("b", RuleSet::from(even))],
        HashMap::new(),
        HashMap::new(),
    );

    assert!(validator.fails());
    assert_eq!(validator.errors().len(), 1);
    assert!(validator.errors().has("a"));
    assert!(!validator.errors().has("b"));
}

#[test]
fn rules_macro_combines_names_and_objects() {
    let validator = run(json!({"age": "7"}), "age", rules!["bail", "integer", EvenNumber::default_rule()]);
    assert!(validator.errors().has("age"));
    assert_eq!(validator.errors().get("age").len(), 1);
}

#[test]
fn conditionable_adds_rules_on_demand() {
    let strict = true;
    let rules = EvenNumber::to_array().when(strict, |rules| rules.merged("required"));
    let validator = run(json!({}), "age", rules);
    assert!(validator.errors().has("age"));

    let rule = EvenNumber::default().unless(strict, |rule| rule.rules("positive"));
    assert!(rule.state().custom_rules().is_empty());
}

#[test]
fn rule_failing_without_messages_still_fails() {
    let mut validator = factory().make(
        record(json!({"age": 1})),
        [("age", Silent::to_array())],
        HashMap::new(),
        HashMap::new(),
    );

    assert!(!validator.passes());
    assert_eq!(validator.errors().get("age"), ["The age is not accepted.".to_owned()]);
}

#[test]
fn shared_default_serves_concurrent_sessions() {
    Slow::defaults(Some(DefaultCallback::instance(Slow::default())));
    let factory = &factory();
    let barrier = &Barrier::new(2);

    let results: Vec<(bool, Vec<String>)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(move || {
                    barrier.wait();
                    let mut validator = factory.make(
                        record(json!({"x": 2})),
                        [("x", Slow::required())],
                        HashMap::new(),
                        HashMap::new(),
                    );
                    let passed = validator.passes();
                    let messages = validator.errors().all().into_iter().map(str::to_owned).collect();
                    (passed, messages)
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    assert_eq!(results, vec![(true, Vec::new()), (true, Vec::new())]);
}

#[test]
fn rule_reaching_itself_fails_instead_of_deadlocking() {
    Looping::defaults(Some(DefaultCallback::instance(Looping::default())));

    let validator = run(json!({"value": 1}), "value", Looping::to_array());
    assert_eq!(
        validator.errors().get("value"),
        ["The value rule refers to itself.".to_owned()]
    );
}
