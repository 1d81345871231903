//! Validator sessions.

use std::collections::HashMap;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace, warn};

use crate::engine::{Factory, MessageBag, builtin};
use crate::error::ValidationFailure;
use crate::foundation::{Data, RuleSet, RuleToken, SharedRule, Translator, Value, lookup};

// ============================================================================
// CONTEXT
// ============================================================================

/// The part of a session that rule objects keep a reference to.
///
/// Cloning is cheap; custom messages and labels are shared.
#[derive(Debug, Clone)]
pub struct ValidatorContext {
    factory: Factory,
    custom_messages: Arc<HashMap<String, String>>,
    custom_attributes: Arc<HashMap<String, String>>,
}

impl ValidatorContext {
    /// Creates a context.
    pub fn new(
        factory: Factory,
        custom_messages: impl Into<Arc<HashMap<String, String>>>,
        custom_attributes: impl Into<Arc<HashMap<String, String>>>,
    ) -> Self {
        Self {
            factory,
            custom_messages: custom_messages.into(),
            custom_attributes: custom_attributes.into(),
        }
    }

    /// The factory that built the session.
    #[must_use]
    pub fn factory(&self) -> &Factory {
        &self.factory
    }

    /// The session's translator.
    #[must_use]
    pub fn translator(&self) -> &dyn Translator {
        self.factory.translator()
    }

    /// Custom messages keyed by `"{attribute}.{rule}"` or `"{rule}"`.
    #[must_use]
    pub fn custom_messages(&self) -> &Arc<HashMap<String, String>> {
        &self.custom_messages
    }

    /// Display labels keyed by attribute name.
    #[must_use]
    pub fn custom_attributes(&self) -> &Arc<HashMap<String, String>> {
        &self.custom_attributes
    }

    /// Display name for `attribute`: its custom label, or the name with `_`
    /// replaced by spaces.
    #[must_use]
    pub fn display_name(&self, attribute: &str) -> String {
        self.custom_attributes
            .get(attribute)
            .cloned()
            .unwrap_or_else(|| attribute.replace('_', " "))
    }

    fn named_message(&self, attribute: &str, rule: &str) -> String {
        let line = self
            .custom_messages
            .get(&format!("{attribute}.{rule}"))
            .or_else(|| self.custom_messages.get(rule))
            .cloned()
            .unwrap_or_else(|| {
                let namespace = &self.factory.config().message_namespace;
                self.translator().get(&format!("{namespace}.{rule}"))
            });
        self.replace_attribute(&line, attribute)
    }

    fn replace_attribute(&self, line: &str, attribute: &str) -> String {
        line.replace(":attribute", &self.display_name(attribute))
    }
}

// ============================================================================
// VALIDATOR
// ============================================================================

/// One validation pass over a record.
///
/// # Examples
///
/// ```rust,ignore
/// let mut validator = factory.make(data, [("age", rules!["required", "integer"])], HashMap::new(), HashMap::new());
/// if validator.fails() {
///     println!("{:?}", validator.errors().all());
/// }
/// ```
#[derive(Debug)]
pub struct Validator {
    context: ValidatorContext,
    data: Data,
    rules: IndexMap<String, RuleSet>,
    errors: MessageBag,
    stop_on_first_failure: bool,
}

impl Validator {
    pub(crate) fn new(context: ValidatorContext, data: Data, rules: IndexMap<String, RuleSet>) -> Self {
        let stop_on_first_failure = context.factory.config().stop_on_first_failure;
        Self {
            context,
            data,
            rules,
            errors: MessageBag::new(),
            stop_on_first_failure,
        }
    }

    /// Overrides the factory's `stop_on_first_failure` setting.
    #[must_use = "builder methods must be chained or built"]
    pub fn stop_on_first_failure(mut self, stop: bool) -> Self {
        self.stop_on_first_failure = stop;
        self
    }

    /// Runs every rule and returns `true` if no messages were collected.
    ///
    /// Each call starts from an empty [`MessageBag`].
    pub fn passes(&mut self) -> bool {
        let mut errors = MessageBag::new();

        for (attribute, rules) in &self.rules {
            self.evaluate_attribute(attribute, rules, &mut errors);
            if self.stop_on_first_failure && errors.has(attribute) {
                debug!(attribute = %attribute, "stopping on first failure");
                break;
            }
        }

        debug!(
            attributes = self.rules.len(),
            failures = errors.len(),
            "validation pass finished"
        );
        self.errors = errors;
        self.errors.is_empty()
    }

    /// Inverse of [`passes`](Self::passes).
    pub fn fails(&mut self) -> bool {
        !self.passes()
    }

    /// Runs the rules and returns the validated part of the record.
    pub fn validate(&mut self) -> Result<Data, ValidationFailure> {
        if !self.passes() {
            return Err(ValidationFailure {
                errors: self.errors.clone(),
            });
        }
        Ok(self.validated())
    }

    /// Top-level entries of the record that have rules.
    #[must_use]
    pub fn validated(&self) -> Data {
        let mut validated = Data::new();
        for attribute in self.rules.keys() {
            let key = if self.data.contains_key(attribute) {
                attribute.as_str()
            } else {
                attribute.split('.').next().unwrap_or(attribute)
            };
            if let Some(value) = self.data.get(key) {
                validated.insert(key.to_owned(), value.clone());
            }
        }
        validated
    }

    /// Messages from the last pass.
    #[must_use]
    pub fn errors(&self) -> &MessageBag {
        &self.errors
    }

    /// Rules per attribute, in insertion order.
    #[must_use]
    pub fn rules(&self) -> &IndexMap<String, RuleSet> {
        &self.rules
    }

    /// The record under validation.
    #[must_use]
    pub fn data(&self) -> &Data {
        &self.data
    }

    /// Handle given to rule objects.
    #[must_use]
    pub fn context(&self) -> &ValidatorContext {
        &self.context
    }

    /// Custom messages of this session.
    #[must_use]
    pub fn custom_messages(&self) -> &HashMap<String, String> {
        &self.context.custom_messages
    }

    /// Custom attribute labels of this session.
    #[must_use]
    pub fn custom_attributes(&self) -> &HashMap<String, String> {
        &self.context.custom_attributes
    }

    /// The session's translator.
    #[must_use]
    pub fn translator(&self) -> &dyn Translator {
        self.context.translator()
    }

    fn evaluate_attribute(&self, attribute: &str, rules: &RuleSet, errors: &mut MessageBag) {
        let value = lookup(&self.data, attribute);

        if value.is_none() && rules.contains("sometimes") {
            trace!(attribute, "attribute absent, skipped by `sometimes`");
            return;
        }

        let nullable = rules.contains("nullable");
        let bail = rules.contains("bail");
        let mut failed = false;

        for token in rules {
            if failed && bail {
                break;
            }

            let passed = match token {
                RuleToken::Named(name) if builtin::is_modifier(name) => true,
                RuleToken::Named(name) if name == "required" => builtin::is_filled(value),
                RuleToken::Named(name) => {
                    let Some(value) = value.filter(|v| is_validatable(v, nullable)) else {
                        continue;
                    };
                    self.check_named(attribute, name, value)
                }
                RuleToken::Rule(rule) => {
                    if !self.check_object(attribute, rule, value, nullable, errors) {
                        failed = true;
                    }
                    continue;
                }
            };

            if !passed {
                failed = true;
                if let RuleToken::Named(name) = token {
                    errors.add(attribute, self.context.named_message(attribute, name));
                }
            }
        }
    }

    fn check_named(&self, attribute: &str, name: &str, value: &Value) -> bool {
        if let Some(passed) = builtin::check(name, value) {
            return passed;
        }
        if let Some(extension) = self.context.factory.extension(name) {
            return extension(attribute, value, &self.data);
        }
        warn!(attribute, rule = name, "unknown named rule, treating as failed");
        false
    }

    /// Runs a rule object and records its messages. Returns `false` on failure.
    fn check_object(
        &self,
        attribute: &str,
        rule: &SharedRule,
        value: Option<&Value>,
        nullable: bool,
        errors: &mut MessageBag,
    ) -> bool {
        let Some(mut rule) = rule.enter() else {
            warn!(attribute, "rule object reached itself during evaluation, treating as failed");
            errors.add(attribute, self.context.named_message(attribute, "recursive_rule"));
            return false;
        };

        let value = match value {
            Some(v) if is_validatable(v, nullable) => v,
            _ if rule.is_implicit() => value.unwrap_or(&NULL),
            _ => return true,
        };

        rule.inject_validator(&self.context);
        rule.inject_data(&self.data);

        if rule.evaluate(attribute, value) {
            return true;
        }

        trace!(attribute, rule = rule.name(), "rule object failed");
        let messages = rule.failure_messages();
        if messages.is_empty() {
            // Silent failures still count: fall back to a line named after the rule type.
            errors.add(attribute, self.context.named_message(attribute, &rule_key(rule.name())));
            return false;
        }
        for message in messages {
            errors.add(attribute, self.context.replace_attribute(&message, attribute));
        }
        false
    }
}

/// Message key for a rule type: its base name in snake case, so
/// `app::rules::EvenNumber` becomes `even_number`.
fn rule_key(type_name: &str) -> String {
    let path = type_name.split('<').next().unwrap_or(type_name);
    let base = path.rsplit("::").next().unwrap_or(path);

    let mut key = String::with_capacity(base.len() + 4);
    for (i, c) in base.char_indices() {
        if c.is_uppercase() {
            if i > 0 {
                key.push('_');
            }
            key.extend(c.to_lowercase());
        } else {
            key.push(c);
        }
    }
    key
}

static NULL: Value = Value::Null;

/// Non-implicit rules only see values that are present and not blank.
fn is_validatable(value: &Value, nullable: bool) -> bool {
    match value {
        Value::Null => !nullable,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    }
}
