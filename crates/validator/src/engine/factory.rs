//! Validator construction.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::engine::{Validator, ValidatorContext};
use crate::error::RuleError;
use crate::foundation::{ArrayTranslator, Data, RuleSet, Translator, Value};

/// A host-registered named rule: `(attribute, value, data) -> passed`.
pub type Extension = Arc<dyn Fn(&str, &Value, &Data) -> bool + Send + Sync>;

// ============================================================================
// CONFIG
// ============================================================================

/// Engine settings shared by every validator a factory builds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Stop after the first attribute that fails.
    pub stop_on_first_failure: bool,
    /// Translation namespace for named rule messages (`{namespace}.{rule}`).
    pub message_namespace: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            stop_on_first_failure: false,
            message_namespace: "validation".to_owned(),
        }
    }
}

impl ValidatorConfig {
    /// Parses a configuration document; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, RuleError> {
        Ok(serde_json::from_str(json)?)
    }
}

// ============================================================================
// FACTORY
// ============================================================================

/// Builds validator sessions.
///
/// Cheap to clone; every clone shares the translator, extensions and config.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeep_validator::prelude::*;
///
/// let factory = Factory::builder()
///     .translator(ArrayTranslator::new("en").with_line("validation.required", "Required."))
///     .extend("even", |_, value, _| value.as_i64().is_some_and(|n| n % 2 == 0))
///     .build();
///
/// let mut validator = factory.make(data, [("age", rules!["required", "even"])], HashMap::new(), HashMap::new());
/// assert!(validator.passes());
/// ```
#[derive(Clone)]
pub struct Factory {
    inner: Arc<FactoryInner>,
}

struct FactoryInner {
    translator: Arc<dyn Translator>,
    extensions: HashMap<String, Extension>,
    config: ValidatorConfig,
}

impl Default for Factory {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl fmt::Debug for Factory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extensions: Vec<_> = self.inner.extensions.keys().collect();
        extensions.sort();
        f.debug_struct("Factory")
            .field("locale", &self.inner.translator.locale())
            .field("extensions", &extensions)
            .field("config", &self.inner.config)
            .finish()
    }
}

impl Factory {
    /// Starts building a factory.
    #[must_use]
    pub fn builder() -> FactoryBuilder {
        FactoryBuilder::default()
    }

    /// Creates a validator for `data` checked against `rules`.
    ///
    /// `custom_messages` are keyed by `"{attribute}.{rule}"` or `"{rule}"`;
    /// `custom_attributes` map attribute names to display labels.
    pub fn make<K, R>(
        &self,
        data: Data,
        rules: impl IntoIterator<Item = (K, R)>,
        custom_messages: impl Into<Arc<HashMap<String, String>>>,
        custom_attributes: impl Into<Arc<HashMap<String, String>>>,
    ) -> Validator
    where
        K: Into<String>,
        R: Into<RuleSet>,
    {
        let rules: IndexMap<String, RuleSet> = rules
            .into_iter()
            .map(|(attribute, set)| (attribute.into(), set.into()))
            .collect();

        let context = ValidatorContext::new(self.clone(), custom_messages, custom_attributes);
        Validator::new(context, data, rules)
    }

    /// A context with no custom messages or labels, for rules used outside
    /// a session.
    #[must_use]
    pub fn context(&self) -> ValidatorContext {
        ValidatorContext::new(self.clone(), HashMap::new(), HashMap::new())
    }

    /// The translator shared by every session.
    #[must_use]
    pub fn translator(&self) -> &dyn Translator {
        self.inner.translator.as_ref()
    }

    /// Engine settings.
    #[must_use]
    pub fn config(&self) -> &ValidatorConfig {
        &self.inner.config
    }

    /// Looks up a host-registered named rule.
    #[must_use]
    pub fn extension(&self, name: &str) -> Option<&Extension> {
        self.inner.extensions.get(name)
    }
}

// ============================================================================
// BUILDER
// ============================================================================

/// Builder for [`Factory`].
#[derive(Default)]
pub struct FactoryBuilder {
    translator: Option<Arc<dyn Translator>>,
    extensions: HashMap<String, Extension>,
    config: ValidatorConfig,
}

impl fmt::Debug for FactoryBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FactoryBuilder")
            .field("has_translator", &self.translator.is_some())
            .field("extensions", &self.extensions.len())
            .field("config", &self.config)
            .finish()
    }
}

impl FactoryBuilder {
    /// Sets the translator. Defaults to an empty [`ArrayTranslator`].
    #[must_use = "builder methods must be chained or built"]
    pub fn translator(mut self, translator: impl Translator + 'static) -> Self {
        self.translator = Some(Arc::new(translator));
        self
    }

    /// Shares an existing translator.
    #[must_use = "builder methods must be chained or built"]
    pub fn shared_translator(mut self, translator: Arc<dyn Translator>) -> Self {
        self.translator = Some(translator);
        self
    }

    /// Registers a named rule.
    #[must_use = "builder methods must be chained or built"]
    pub fn extend<F>(mut self, name: impl Into<String>, check: F) -> Self
    where
        F: Fn(&str, &Value, &Data) -> bool + Send + Sync + 'static,
    {
        self.extensions.insert(name.into(), Arc::new(check));
        self
    }

    /// Sets engine settings.
    #[must_use = "builder methods must be chained or built"]
    pub fn config(mut self, config: ValidatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Finishes the factory.
    #[must_use]
    pub fn build(self) -> Factory {
        let translator = self
            .translator
            .unwrap_or_else(|| Arc::new(ArrayTranslator::default()));

        Factory {
            inner: Arc::new(FactoryInner {
                translator,
                extensions: self.extensions,
                config: self.config,
            }),
        }
    }
}
