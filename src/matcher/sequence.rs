//! Element-wise list matcher, used for variadic tails.

use std::sync::Arc;

use super::{MatchFault, Matcher, SharedMatcher};
use crate::core::value::{Kind, KindSet, Value};

/// Matches a list whose elements match `matchers` pairwise.
///
/// A length mismatch is a non-match.
pub fn slice_of(matchers: impl IntoIterator<Item = SharedMatcher>) -> SharedMatcher {
    Arc::new(SliceOf {
        elements: matchers.into_iter().collect(),
    })
}

#[derive(Debug)]
struct SliceOf {
    elements: Vec<SharedMatcher>,
}

impl Matcher for SliceOf {
    fn supported_kinds(&self) -> KindSet {
        KindSet::of(&[Kind::List])
    }

    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault> {
        let Some(items) = value.as_list() else {
            return Ok(false);
        };
        if items.len() != self.elements.len() {
            return Ok(false);
        }
        Ok(self
            .elements
            .iter()
            .zip(items)
            .all(|(matcher, item)| matcher.is_match(item)))
    }
}
