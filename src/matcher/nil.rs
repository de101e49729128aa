//! Nil matcher.

use std::sync::Arc;

use super::{MatchFault, Matcher, SharedMatcher};
use crate::core::value::{KindSet, Value};

/// Matches `Nil`, and reference-like values that are present but empty.
///
/// An empty packed variadic tail is an empty list, so this is also the
/// matcher for "no variadic arguments".
pub fn nil() -> SharedMatcher {
    Arc::new(NilMatcher)
}

#[derive(Debug)]
struct NilMatcher;

impl Matcher for NilMatcher {
    fn supported_kinds(&self) -> KindSet {
        KindSet::REFERENCE_LIKE
    }

    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault> {
        Ok(value.is_nil() || value.is_empty_reference())
    }
}
