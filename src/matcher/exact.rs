//! Exact-value matcher.

use std::sync::Arc;

use super::{MatchFault, Matcher, SharedMatcher};
use crate::core::value::{KindSet, Value};

/// Matches values deeply equal to `expected`.
pub fn equals(expected: impl Into<Value>) -> SharedMatcher {
    Arc::new(Exactly {
        expected: expected.into(),
    })
}

#[derive(Debug)]
struct Exactly {
    expected: Value,
}

impl Matcher for Exactly {
    fn supported_kinds(&self) -> KindSet {
        KindSet::ALL
    }

    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault> {
        Ok(*value == self.expected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Kind;

    #[test]
    fn matches_equal_values_only() {
        let m = equals("123");
        assert!(m.is_match(&Value::from("123")));
        assert!(!m.is_match(&Value::from("1234")));
        assert!(!m.is_match(&Value::Nil));
    }

    #[test]
    fn equality_is_kind_sensitive() {
        let m = equals(5_i64);
        assert!(m.is_match(&Value::I64(5)));
        assert!(!m.is_match(&Value::I32(5)));
    }

    #[test]
    fn lists_compare_deeply() {
        let m = equals(vec!["123", "456"]);
        assert!(m.supports(Kind::List));
        assert!(m.is_match(&Value::from(vec!["123", "456"])));
        assert!(!m.is_match(&Value::from(vec!["123"])));
    }
}
