//! Per-call-index return overrides and the handle that assigns them.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::engine::StubShared;
use crate::core::errors::Result;
use crate::core::value::Value;

/// Index -> values. A registered index without values yet is `None` and
/// counts as absent during resolution.
#[derive(Debug, Clone, Default)]
pub(crate) struct ReturnOverrides {
    slots: BTreeMap<usize, Option<Vec<Value>>>,
}

impl ReturnOverrides {
    pub(crate) fn register(&mut self, index: usize) {
        self.slots.entry(index).or_insert(None);
    }

    pub(crate) fn assign(&mut self, index: usize, values: Vec<Value>) {
        self.slots.insert(index, Some(values));
    }

    pub(crate) fn get(&self, index: usize) -> Option<&[Value]> {
        self.slots.get(&index)?.as_deref()
    }
}

/// Which override table an [`OnCall`] writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Scope {
    Global,
    Binding(usize),
}

/// Handle for the return values of one specific call.
///
/// Asking for the same index twice yields equal handles writing the same
/// slot. Handles from an inert binding ignore every assignment.
#[derive(Clone)]
pub struct OnCall {
    stub: Option<Arc<StubShared>>,
    scope: Scope,
    index: usize,
}

impl OnCall {
    pub(crate) fn new(stub: Arc<StubShared>, scope: Scope, index: usize) -> Self {
        Self {
            stub: Some(stub),
            scope,
            index,
        }
    }

    pub(crate) fn inert(index: usize) -> Self {
        Self {
            stub: None,
            scope: Scope::Global,
            index,
        }
    }

    /// Zero-based call index this handle targets.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_inert(&self) -> bool {
        self.stub.is_none()
    }

    /// Set the values returned at this index. Validated against the
    /// signature; a failure is reported and leaves the slot untouched.
    pub fn returns(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        let Some(stub) = &self.stub else {
            return Ok(());
        };
        stub.assign_override(self.scope, self.index, values.into_iter().collect())
    }
}

impl PartialEq for OnCall {
    fn eq(&self, other: &Self) -> bool {
        let same_stub = match (&self.stub, &other.stub) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        };
        same_stub && self.scope == other.scope && self.index == other.index
    }
}

impl fmt::Debug for OnCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OnCall")
            .field("stub", &self.stub.as_ref().map(|s| s.name()))
            .field("scope", &self.scope)
            .field("index", &self.index)
            .finish()
    }
}
