//! Building blocks shared by the engine and custom rules.
//!
//! - **Values**: [`Value`] and [`Data`], the record under validation
//! - **Capability**: [`Rule`] and its shared handle [`SharedRule`]
//! - **Tokens**: [`RuleToken`], [`RuleSet`], [`MessageKeys`]
//! - **Translation**: [`Translator`], [`ArrayTranslator`]

pub mod rule;
pub mod token;
pub mod translator;

pub use rule::{Evaluation, Rule, SharedRule};
pub use token::{MessageKeys, RuleSet, RuleToken};
pub use translator::{ArrayTranslator, Translator};

/// A single attribute value.
pub type Value = serde_json::Value;

/// The whole record under validation, keyed by attribute name.
pub type Data = serde_json::Map<String, Value>;

/// Looks up an attribute, following `.`-separated paths into nested
/// objects and arrays when no top-level key matches exactly.
#[must_use]
pub fn lookup<'a>(data: &'a Data, attribute: &str) -> Option<&'a Value> {
    if let Some(value) = data.get(attribute) {
        return Some(value);
    }

    let mut segments = attribute.split('.');
    let mut current = data.get(segments.next()?)?;
    for segment in segments {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
