//! Registers a default configuration for a custom rule and validates a
//! record with it.
//!
//! Run with `RUST_LOG=debug` to see the engine's tracing output.

use std::collections::HashMap;

use gatekeep_validator::prelude::*;
use serde_json::json;
use tracing_subscriber::EnvFilter;

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

    fn passes(&mut self, attribute: &str, _value: &Value) -> bool {
        self.reset_messages();

        let mut validator = self.validate(attribute, ["bail", "integer"]);
        if validator.fails() {
            let messages: Vec<String> = validator.errors().get(attribute).to_vec();
            return self.fail(messages);
        }

        let even = self
            .state()
            .data()
            .get(attribute)
            .and_then(Value::as_i64)
            .is_some_and(|n| n % 2 == 0);
        if even {
            return true;
        }
        self.fail("validation.even")
    }
}

const LINES: &str = r#"{
    "validation": {
        "required": "The :attribute field is required.",
        "integer": "The :attribute must be an integer.",
        "positive": "The :attribute must be positive.",
        "even": "The :attribute must be even."
    }
}"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ValidatorConfig::from_json(r#"{"stop_on_first_failure": false}"#)?;
    let factory = Factory::builder()
        .translator(ArrayTranslator::from_json("en", LINES)?)
        .extend("positive", |_, value, _| value.as_f64().is_some_and(|n| n > 0.0))
        .config(config)
        .build();

    // Application start-up: every `EvenNumber` default also requires a positive value.
    EvenNumber::defaults(Some(DefaultCallback::factory(|| {
        Some(EvenNumber::default().rules("positive").into_shared())
    })));

    let Value::Object(data) = json!({ "players": 3, "teams": -2, "referees": 2 }) else {
        unreachable!("literal is an object");
    };

    let mut validator = factory.make(
        data,
        [
            ("players", EvenNumber::required()),
            ("teams", EvenNumber::required()),
            ("referees", EvenNumber::nullable()),
            ("coaches", EvenNumber::sometimes()),
        ],
        HashMap::new(),
        HashMap::from([("referees".to_owned(), "referee count".to_owned())]),
    );

    match validator.validate() {
        Ok(valid) => println!("valid: {}", Value::Object(valid)),
        Err(failure) => println!("{}", serde_json::to_string_pretty(&failure.errors)?),
    }

    Ok(())
}
