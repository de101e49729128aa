//! Call records and the per-stub ledger that holds them.
//!
//! The ledger itself is a plain append-only list; the owning stub's lock
//! serializes appends against reads.

#![allow(missing_docs)]

use crate::core::value::Value;

/// One invocation: the packed arguments in, the resolved values out.
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    arguments: Vec<Value>,
    return_values: Vec<Value>,
}

impl Call {
    pub(crate) fn new(arguments: Vec<Value>, return_values: Vec<Value>) -> Self {
        Self {
            arguments,
            return_values,
        }
    }

    /// Arguments the stub was called with.
    #[must_use]
    pub fn arguments(&self) -> &[Value] {
        &self.arguments
    }

    /// Values the stub returned.
    #[must_use]
    pub fn return_values(&self) -> &[Value] {
        &self.return_values
    }
}

#[derive(Debug, Clone, Default)]
pub struct CallLedger {
    calls: Vec<Call>,
}

impl CallLedger {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, call: Call) {
        self.calls.push(call);
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Call> {
        self.calls.get(index)
    }

    #[must_use]
    pub fn first(&self) -> Option<&Call> {
        self.get(0)
    }

    #[must_use]
    pub fn second(&self) -> Option<&Call> {
        self.get(1)
    }

    #[must_use]
    pub fn third(&self) -> Option<&Call> {
        self.get(2)
    }

    #[must_use]
    pub fn last(&self) -> Option<&Call> {
        self.calls.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.calls.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.calls.is_empty()
    }

    #[must_use]
    pub fn called_at_least(&self, times: usize) -> bool {
        self.calls.len() >= times
    }

    #[must_use]
    pub fn called_times(&self, times: usize) -> bool {
        self.calls.len() == times
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Call> {
        self.calls.iter()
    }

    pub fn clear(&mut self) {
        self.calls.clear();
    }
}

impl<'a> IntoIterator for &'a CallLedger {
    type Item = &'a Call;
    type IntoIter = std::slice::Iter<'a, Call>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
