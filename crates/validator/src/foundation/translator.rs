//! Message translation.

use std::collections::HashMap;

use crate::error::RuleError;
use crate::foundation::Value;

/// Resolves message keys into display strings.
///
/// Lookups are pure: a missing key resolves to the key itself.
pub trait Translator: Send + Sync {
    /// Returns the line for `key`, or `key` when none exists.
    fn get(&self, key: &str) -> String;

    /// Locale the lines belong to.
    fn locale(&self) -> &str {
        "en"
    }
}

/// In-memory translation lines for a single locale.
///
/// # Examples
///
/// ```rust,ignore
/// use gatekeep_validator::foundation::{ArrayTranslator, Translator};
///
/// let translator = ArrayTranslator::new("en")
///     .with_line("validation.required", "The :attribute field is required.");
/// assert_eq!(translator.get("validation.required"), "The :attribute field is required.");
/// assert_eq!(translator.get("missing.key"), "missing.key");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayTranslator {
    locale: String,
    lines: HashMap<String, String>,
}

impl Default for ArrayTranslator {
    fn default() -> Self {
        Self::new("en")
    }
}

impl ArrayTranslator {
    /// Creates an empty translator for `locale`.
    pub fn new(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            lines: HashMap::new(),
        }
    }

    /// Loads lines from a JSON object; nested objects become `.`-joined keys.
    ///
    /// ```rust,ignore
    /// let translator = ArrayTranslator::from_json(
    ///     "en",
    ///     r#"{"validation": {"required": "The :attribute field is required."}}"#,
    /// )?;
    /// assert!(translator.has("validation.required"));
    /// ```
    pub fn from_json(locale: impl Into<String>, json: &str) -> Result<Self, RuleError> {
        let locale = locale.into();
        let document: Value =
            serde_json::from_str(json).map_err(|e| RuleError::InvalidTranslations {
                locale: locale.clone(),
                reason: e.to_string(),
            })?;

        let Value::Object(root) = document else {
            return Err(RuleError::InvalidTranslations {
                locale,
                reason: "expected a JSON object at the top level".to_owned(),
            });
        };

        let mut translator = Self::new(locale);
        let mut pending: Vec<(String, Value)> = root.into_iter().collect();
        while let Some((key, value)) = pending.pop() {
            match value {
                Value::String(line) => {
                    translator.lines.insert(key, line);
                }
                Value::Object(children) => {
                    pending.extend(
                        children
                            .into_iter()
                            .map(|(child, value)| (format!("{key}.{child}"), value)),
                    );
                }
                other => {
                    return Err(RuleError::InvalidTranslations {
                        locale: translator.locale,
                        reason: format!("line `{key}` must be a string, got {other}"),
                    });
                }
            }
        }

        Ok(translator)
    }

    /// Adds a single line.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_line(mut self, key: impl Into<String>, line: impl Into<String>) -> Self {
        self.lines.insert(key.into(), line.into());
        self
    }

    /// Adds or replaces several lines.
    pub fn add_lines<K, V>(&mut self, lines: impl IntoIterator<Item = (K, V)>)
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.lines
            .extend(lines.into_iter().map(|(k, v)| (k.into(), v.into())));
    }

    /// Returns `true` if a line exists for `key`.
    #[must_use]
    pub fn has(&self, key: &str) -> bool {
        self.lines.contains_key(key)
    }

    /// Number of loaded lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Returns `true` if no lines are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

impl Translator for ArrayTranslator {
    fn get(&self, key: &str) -> String {
        self.lines
            .get(key)
            .cloned()
            .unwrap_or_else(|| key.to_owned())
    }

    fn locale(&self) -> &str {
        &self.locale
    }
}
