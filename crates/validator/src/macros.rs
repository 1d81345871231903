//! Macros for building rule sets.

/// Builds a [`RuleSet`](crate::foundation::RuleSet) from rule names and rule
/// objects.
///
/// ```rust,ignore
/// use gatekeep_validator::rules;
///
/// let set = rules!["bail", "integer", EvenNumber::default_rule()];
/// assert_eq!(set.len(), 3);
/// ```
#[macro_export]
macro_rules! rules {
    () => {
        $crate::foundation::RuleSet::new()
    };
    ($($token:expr),+ $(,)?) => {
        $crate::foundation::RuleSet::from(::std::vec![
            $($crate::foundation::RuleToken::from($token)),+
        ])
    };
}
