//! Collected failure messages.

use indexmap::IndexMap;
use serde::Serialize;

/// Failure messages grouped by attribute, in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MessageBag {
    messages: IndexMap<String, Vec<String>>,
}

impl MessageBag {
    /// Creates an empty bag.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a message for `attribute`.
    pub fn add(&mut self, attribute: impl Into<String>, message: impl Into<String>) {
        self.messages
            .entry(attribute.into())
            .or_default()
            .push(message.into());
    }

    /// All messages for `attribute`.
    #[must_use]
    pub fn get(&self, attribute: &str) -> &[String] {
        self.messages
            .get(attribute)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// First message for `attribute`.
    #[must_use]
    pub fn first(&self, attribute: &str) -> Option<&str> {
        self.get(attribute).first().map(String::as_str)
    }

    /// Returns `true` if `attribute` has at least one message.
    #[must_use]
    pub fn has(&self, attribute: &str) -> bool {
        !self.get(attribute).is_empty()
    }

    /// Every message, attribute by attribute.
    #[must_use]
    pub fn all(&self) -> Vec<&str> {
        self.messages
            .values()
            .flatten()
            .map(String::as_str)
            .collect()
    }

    /// Attributes that have messages.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.messages.keys().map(String::as_str)
    }

    /// Total number of messages.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.values().map(Vec::len).sum()
    }

    /// Returns `true` if no messages were added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
