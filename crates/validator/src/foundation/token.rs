//! Rule tokens and the wrap-into-a-list normalisation used across the API.

use std::borrow::Cow;
use std::fmt;

use crate::foundation::SharedRule;

// ============================================================================
// RULE TOKEN
// ============================================================================

/// One entry of a rule set: a rule name understood by the engine, or a
/// rule object.
#[derive(Clone)]
pub enum RuleToken {
    /// A named rule such as `"required"` or `"integer"`.
    Named(Cow<'static, str>),
    /// A rule object.
    Rule(SharedRule),
}

impl RuleToken {
    /// Returns the rule name for named tokens.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Rule(_) => None,
        }
    }

    /// Returns the rule object for object tokens.
    #[must_use]
    pub fn as_rule(&self) -> Option<&SharedRule> {
        match self {
            Self::Named(_) => None,
            Self::Rule(rule) => Some(rule),
        }
    }

    /// Returns `true` if this is the named rule `name`.
    #[must_use]
    pub fn is_named(&self, name: &str) -> bool {
        self.name() == Some(name)
    }
}

impl fmt::Debug for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.debug_tuple("Named").field(name).finish(),
            Self::Rule(rule) => fmt::Debug::fmt(rule, f),
        }
    }
}

/// Named tokens compare by name, object tokens by identity.
impl PartialEq for RuleToken {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Named(a), Self::Named(b)) => a == b,
            (Self::Rule(a), Self::Rule(b)) => a.ptr_eq(b),
            _ => false,
        }
    }
}

impl From<&'static str> for RuleToken {
    fn from(name: &'static str) -> Self {
        Self::Named(Cow::Borrowed(name))
    }
}

impl From<String> for RuleToken {
    fn from(name: String) -> Self {
        Self::Named(Cow::Owned(name))
    }
}

impl From<SharedRule> for RuleToken {
    fn from(rule: SharedRule) -> Self {
        Self::Rule(rule)
    }
}

// ============================================================================
// RULE SET
// ============================================================================

/// An ordered list of rule tokens for one attribute.
///
/// Anything that converts into a single token converts into a one-element
/// set, so call sites accept either a bare rule or a list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleSet(Vec<RuleToken>);

impl RuleSet {
    /// Creates an empty rule set.
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Appends a token.
    pub fn push(&mut self, token: impl Into<RuleToken>) {
        self.0.push(token.into());
    }

    /// Returns this set followed by every token of `other`.
    #[must_use = "merged rule set is returned, not applied in place"]
    pub fn merged(mut self, other: impl Into<RuleSet>) -> Self {
        self.0.extend(other.into().0);
        self
    }

    /// Returns `true` if the named rule `name` appears anywhere in the set.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|token| token.is_named(name))
    }

    /// Iterates over the tokens in order.
    pub fn iter(&self) -> std::slice::Iter<'_, RuleToken> {
        self.0.iter()
    }

    /// Number of tokens.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if the set holds no tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Tokens as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[RuleToken] {
        &self.0
    }

    /// Consumes the set and returns its tokens.
    #[must_use]
    pub fn into_vec(self) -> Vec<RuleToken> {
        self.0
    }
}

impl From<RuleToken> for RuleSet {
    fn from(token: RuleToken) -> Self {
        Self(vec![token])
    }
}

impl From<&'static str> for RuleSet {
    fn from(name: &'static str) -> Self {
        Self::from(RuleToken::from(name))
    }
}

impl From<String> for RuleSet {
    fn from(name: String) -> Self {
        Self::from(RuleToken::from(name))
    }
}

impl From<SharedRule> for RuleSet {
    fn from(rule: SharedRule) -> Self {
        Self::from(RuleToken::from(rule))
    }
}

impl From<Vec<RuleToken>> for RuleSet {
    fn from(tokens: Vec<RuleToken>) -> Self {
        Self(tokens)
    }
}

impl From<Vec<&'static str>> for RuleSet {
    fn from(names: Vec<&'static str>) -> Self {
        names.into_iter().collect()
    }
}

impl<const N: usize> From<[&'static str; N]> for RuleSet {
    fn from(names: [&'static str; N]) -> Self {
        names.into_iter().collect()
    }
}

impl<const N: usize> From<[RuleToken; N]> for RuleSet {
    fn from(tokens: [RuleToken; N]) -> Self {
        Self(tokens.into())
    }
}

impl<T: Into<RuleToken>> FromIterator<T> for RuleSet {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl IntoIterator for RuleSet {
    type Item = RuleToken;
    type IntoIter = std::vec::IntoIter<RuleToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a RuleToken;
    type IntoIter = std::slice::Iter<'a, RuleToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

// ============================================================================
// MESSAGE KEYS
// ============================================================================

/// One or more translation keys handed to
/// [`CustomRule::fail`](crate::custom::CustomRule::fail).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageKeys(Vec<String>);

impl MessageKeys {
    /// Iterates over the keys in order.
    pub fn iter(&self) -> std::slice::Iter<'_, String> {
        self.0.iter()
    }

    /// Consumes the keys.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}

impl From<&str> for MessageKeys {
    fn from(key: &str) -> Self {
        Self(vec![key.to_owned()])
    }
}

impl From<String> for MessageKeys {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<Vec<String>> for MessageKeys {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<Vec<&str>> for MessageKeys {
    fn from(keys: Vec<&str>) -> Self {
        Self(keys.into_iter().map(str::to_owned).collect())
    }
}

impl From<&[&str]> for MessageKeys {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|key| (*key).to_owned()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for MessageKeys {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.into_iter().map(str::to_owned).collect())
    }
}
