//! Value matchers used to pin a binding to an argument shape.
//!
//! A matcher declares the kinds it understands and evaluates one value at a
//! time. Evaluation returns a [`MatchFault`] instead of panicking; callers go
//! through [`Matcher::is_match`], which folds unsupported kinds and faults
//! into a plain `false`.

pub mod custom;
pub mod exact;
pub mod nil;
pub mod numeric;
pub mod sequence;

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::core::value::{Kind, KindSet, Value};

pub use custom::{satisfies, str_matching, try_satisfies};
pub use exact::equals;
pub use nil::nil;
pub use numeric::{
    Comparison, float_greater_than, float_greater_than_or_equal_to, float_less_than,
    float_less_than_or_equal_to, int_greater_than, int_greater_than_or_equal_to, int_less_than,
    int_less_than_or_equal_to,
};
pub use sequence::slice_of;

/// Failure raised while a matcher inspects a value. Always treated as a
/// non-match by [`Matcher::is_match`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("matcher fault: {0}")]
pub struct MatchFault(String);

impl MatchFault {
    pub fn new(details: impl Into<String>) -> Self {
        Self(details.into())
    }
}

/// Predicate over a single [`Value`].
pub trait Matcher: Send + Sync + fmt::Debug {
    /// Kinds this matcher can meaningfully evaluate.
    fn supported_kinds(&self) -> KindSet;

    /// Raw evaluation. `Nil` is always passed through; other values only
    /// when their kind is supported.
    fn evaluate(&self, value: &Value) -> Result<bool, MatchFault>;

    fn supports(&self, kind: Kind) -> bool {
        self.supported_kinds().contains(kind)
    }

    /// Total match: unsupported kinds and faults are `false`.
    fn is_match(&self, value: &Value) -> bool {
        if let Some(kind) = value.kind()
            && !self.supports(kind)
        {
            return false;
        }
        self.evaluate(value).unwrap_or(false)
    }
}

/// Matchers are shared between bindings, patterns and the caller.
pub type SharedMatcher = Arc<dyn Matcher>;
