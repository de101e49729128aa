//! User-supplied predicates and the regex string matcher.

use std::fmt;
use std::sync::Arc;

use regex::Regex;

use super::{MatchFault, Matcher, SharedMatcher};
use crate::core::errors::{MockaError, Result};
use crate::core::value::{Kind, KindSet, Value};

type Predicate = dyn Fn(&Value) -> std::result::Result<bool, MatchFault> + Send + Sync;

/// Matcher backed by a plain boolean predicate over `kinds`.
pub fn satisfies<F>(kinds: KindSet, predicate: F) -> SharedMatcher
where
    F: Fn(&Value) -> bool + Send + Sync + 'static,
{
    try_satisfies(kinds, move |value| Ok(predicate(value)))
}

/// Matcher backed by a fallible predicate; a fault counts as no match.
pub fn try_satisfies<F>(kinds: KindSet, predicate: F) -> SharedMatcher
where
    F: Fn(&Value) -> std::result::Result<bool, MatchFault> + Send + Sync + 'static,
{
    Arc::new(Custom {
        kinds,
        predicate: Box::new(predicate),
    })
}

struct Custom {
    kinds: KindSet,
    predicate: Box<Predicate>,
}

impl fmt::Debug for Custom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Custom")
            .field("kinds", &self.kinds)
            .finish_non_exhaustive()
    }
}

impl Matcher for Custom {
    fn supported_kinds(&self) -> KindSet {
        self.kinds
    }

    fn evaluate(&self, value: &Value) -> std::result::Result<bool, MatchFault> {
        (self.predicate)(value)
    }
}

/// Matches `Str` values containing a match for `pattern`.
pub fn str_matching(pattern: &str) -> Result<SharedMatcher> {
    let regex = Regex::new(pattern).map_err(|e| MockaError::InvalidPattern {
        pattern: pattern.to_string(),
        details: e.to_string(),
    })?;
    Ok(Arc::new(StrMatching { regex }))
}

#[derive(Debug)]
struct StrMatching {
    regex: Regex,
}

impl Matcher for StrMatching {
    fn supported_kinds(&self) -> KindSet {
        KindSet::of(&[Kind::Str])
    }

    fn evaluate(&self, value: &Value) -> std::result::Result<bool, MatchFault> {
        Ok(value.as_str().is_some_and(|s| self.regex.is_match(s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicate_sees_supported_values() {
        let even = satisfies(KindSet::of(&[Kind::I64]), |v| {
            v.as_i64().is_some_and(|n| n % 2 == 0)
        });
        assert!(even.is_match(&Value::I64(4)));
        assert!(!even.is_match(&Value::I64(3)));
        assert!(!even.is_match(&Value::I32(4)));
    }

    #[test]
    fn fallible_predicate_fault_is_no_match() {
        let strict = try_satisfies(KindSet::ALL, |v| {
            if v.is_nil() {
                Err(MatchFault::new("nil not allowed"))
            } else {
                Ok(true)
            }
        });
        assert!(strict.is_match(&Value::from("x")));
        assert!(!strict.is_match(&Value::Nil));
    }

    #[test]
    fn str_matching_uses_regex() {
        let m = str_matching(r"^user-\d+$").expect("valid pattern");
        assert!(m.is_match(&Value::from("user-42")));
        assert!(!m.is_match(&Value::from("user-x")));
        assert!(!m.is_match(&Value::I64(42)));
    }

    #[test]
    fn str_matching_rejects_bad_pattern() {
        let err = str_matching("(unclosed").expect_err("invalid pattern");
        assert_eq!(err.code(), "MOCKA-1006");
    }
}
