//! Argument-pattern bindings with their own return policy.

use std::fmt;
use std::sync::Arc;

use super::engine::StubShared;
use super::on_call::{OnCall, ReturnOverrides, Scope};
use crate::core::errors::Result;
use crate::core::value::Value;
use crate::matcher::SharedMatcher;
use crate::validate::Arg;

/// Stub-side state of one binding. Lives inside the stub lock.
pub(crate) struct BindingState {
    pattern: Vec<Arg>,
    matchers: Vec<SharedMatcher>,
    pub(crate) defaults: Option<Vec<Value>>,
    pub(crate) overrides: ReturnOverrides,
    pub(crate) call_count: usize,
}

impl BindingState {
    pub(crate) fn new(pattern: Vec<Arg>, matchers: Vec<SharedMatcher>) -> Self {
        Self {
            pattern,
            matchers,
            defaults: None,
            overrides: ReturnOverrides::default(),
            call_count: 0,
        }
    }

    pub(crate) fn has_pattern(&self, pattern: &[Arg]) -> bool {
        self.pattern.len() == pattern.len()
            && self.pattern.iter().zip(pattern).all(|(a, b)| a.same_as(b))
    }

    pub(crate) fn is_match(&self, args: &[Value]) -> bool {
        self.matchers.len() == args.len()
            && self
                .matchers
                .iter()
                .zip(args)
                .all(|(matcher, arg)| matcher.is_match(arg))
    }

    /// Consume one binding-local index. `None` means this binding has no
    /// answer for it and the caller falls back to the stub's global policy.
    pub(crate) fn next_return_values(&mut self) -> Option<Vec<Value>> {
        let local = self.call_count;
        self.call_count += 1;
        self.overrides
            .get(local)
            .or(self.defaults.as_deref())
            .map(<[Value]>::to_vec)
    }
}

/// Handle to a binding created by [`Stub::with_args`](super::Stub::with_args).
///
/// An inert binding (its pattern failed validation) accepts every operation
/// and does nothing.
#[derive(Clone)]
pub struct Binding {
    stub: Arc<StubShared>,
    slot: Option<usize>,
}

impl Binding {
    pub(crate) fn new(stub: Arc<StubShared>, slot: usize) -> Self {
        Self {
            stub,
            slot: Some(slot),
        }
    }

    pub(crate) fn inert(stub: Arc<StubShared>) -> Self {
        Self { stub, slot: None }
    }

    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.slot.is_none()
    }

    /// Values returned whenever this pattern matches and no override applies.
    pub fn returns(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        let Some(slot) = self.slot else {
            return Ok(());
        };
        self.stub
            .assign_binding_defaults(slot, values.into_iter().collect())
    }

    /// Override for the `index`-th matching call (zero-based, counted per
    /// binding).
    pub fn on_call(&self, index: usize) -> OnCall {
        match self.slot {
            Some(slot) => self.stub.register_override(Scope::Binding(slot), index),
            None => OnCall::inert(index),
        }
    }

    pub fn on_first_call(&self) -> OnCall {
        self.on_call(0)
    }

    pub fn on_second_call(&self) -> OnCall {
        self.on_call(1)
    }

    pub fn on_third_call(&self) -> OnCall {
        self.on_call(2)
    }

    /// How many invocations this binding has matched.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.slot
            .map_or(0, |slot| self.stub.binding_call_count(slot))
    }
}

impl PartialEq for Binding {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.stub, &other.stub) && self.slot == other.slot
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("stub", &self.stub.name())
            .field("slot", &self.slot)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::args;
    use crate::core::signature::Signature;
    use crate::core::value::Kind;
    use crate::matcher::int_greater_than;
    use crate::validate::build_matchers;
    use crate::values;

    fn state_for(pattern: Vec<Arg>) -> BindingState {
        let signature = Signature::new([Kind::Str, Kind::I64]).returns([Kind::I64]);
        let matchers = build_matchers(&signature, &pattern).expect("valid pattern");
        BindingState::new(pattern, matchers)
    }

    #[test]
    fn matches_every_position() {
        let state = state_for(args!["abc", int_greater_than(5)]);
        assert!(state.is_match(&values!["abc", 6_i64]));
        assert!(!state.is_match(&values!["abc", 5_i64]));
        assert!(!state.is_match(&values!["abd", 6_i64]));
        assert!(!state.is_match(&values!["abc"]));
    }

    #[test]
    fn override_beats_default_then_default_resumes() {
        let mut state = state_for(args!["abc", 1_i64]);
        state.defaults = Some(values![20_i64]);
        state.overrides.assign(0, values![5_i64]);
        assert_eq!(state.next_return_values(), Some(values![5_i64]));
        assert_eq!(state.next_return_values(), Some(values![20_i64]));
        assert_eq!(state.call_count, 2);
    }

    #[test]
    fn nothing_configured_falls_through_but_counts() {
        let mut state = state_for(args!["abc", 1_i64]);
        state.overrides.assign(1, values![7_i64]);
        assert_eq!(state.next_return_values(), None);
        assert_eq!(state.next_return_values(), Some(values![7_i64]));
        assert_eq!(state.next_return_values(), None);
        assert_eq!(state.call_count, 3);
    }

    #[test]
    fn pattern_identity() {
        let shared = int_greater_than(5);
        let state = state_for(vec![Arg::from("abc"), Arg::from(Arc::clone(&shared))]);
        assert!(state.has_pattern(&[Arg::from("abc"), Arg::from(shared)]));
        assert!(!state.has_pattern(&args!["abc", int_greater_than(5)]));
        assert!(!state.has_pattern(&args!["abc"]));
    }
}
