//! Resolution engine: shared stub state and the per-invocation algorithm.

use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;

use super::binding::{Binding, BindingState};
use super::ledger::{Call, CallLedger};
use super::on_call::{OnCall, ReturnOverrides, Scope};
use super::StubOptions;
use crate::core::errors::{MockaError, Result};
use crate::core::signature::Signature;
use crate::core::value::Value;
use crate::intercept::{Behavior, Interceptor};
use crate::logger::{EventType, LogEntry, Severity};
use crate::report::Reporter;
use crate::validate::{Arg, build_matchers, check_return_values};

pub(crate) type SideEffect = Box<dyn Fn(&[Value]) + Send + Sync>;

/// Everything the stub lock guards.
pub(crate) struct StubState {
    installed: Option<Behavior>,
    displaced: Option<Behavior>,
    restored: bool,
    defaults: Vec<Value>,
    overrides: ReturnOverrides,
    bindings: Vec<BindingState>,
    call_count: usize,
    pub(crate) ledger: CallLedger,
    side_effect: Option<SideEffect>,
}

impl StubState {
    fn new(defaults: Vec<Value>) -> Self {
        Self {
            installed: None,
            displaced: None,
            restored: false,
            defaults,
            overrides: ReturnOverrides::default(),
            bindings: Vec::new(),
            call_count: 0,
            ledger: CallLedger::new(),
            side_effect: None,
        }
    }

    /// First matching binding wins; a binding with nothing configured for
    /// its local index defers to the global policy at `global_index`.
    fn resolve(&mut self, global_index: usize, args: &[Value]) -> Vec<Value> {
        let from_binding = self
            .bindings
            .iter_mut()
            .find(|binding| binding.is_match(args))
            .and_then(BindingState::next_return_values);

        from_binding.unwrap_or_else(|| {
            self.overrides
                .get(global_index)
                .unwrap_or(self.defaults.as_slice())
                .to_vec()
        })
    }

    fn reset_history(&mut self) {
        self.ledger.clear();
        self.call_count = 0;
        for binding in &mut self.bindings {
            binding.call_count = 0;
        }
    }
}

pub(crate) struct StubShared {
    name: String,
    signature: Signature,
    target: Box<dyn Interceptor>,
    reporter: Arc<dyn Reporter>,
    options: StubOptions,
    pub(crate) state: Mutex<StubState>,
}

impl StubShared {
    /// Validate defaults, install the replacement and hand back the shared
    /// state. Every failure is reported before it is returned.
    pub(crate) fn install(
        reporter: Arc<dyn Reporter>,
        target: Box<dyn Interceptor>,
        defaults: Vec<Value>,
        options: StubOptions,
    ) -> Result<Arc<Self>> {
        let signature = target.signature().clone();
        if let Err(err) = check_return_values(&signature, &defaults) {
            reporter.report_failure(&err.report_message());
            return Err(err);
        }

        let shared = Arc::new(Self {
            name: target.name().to_string(),
            signature,
            target,
            reporter,
            options,
            state: Mutex::new(StubState::new(defaults)),
        });

        let fallback: Arc<OnceLock<Behavior>> = Arc::default();
        let replacement = replacement_for(Arc::downgrade(&shared), Arc::clone(&fallback));
        let displaced = shared
            .target
            .install(&shared.signature, Arc::clone(&replacement))
            .map_err(|err| shared.fail(err))?;
        let _ = fallback.set(Arc::clone(&displaced));
        {
            let mut state = shared.state.lock();
            state.installed = Some(replacement);
            state.displaced = Some(displaced);
        }

        shared.record(|| {
            LogEntry::new(EventType::StubCreated, Severity::Info).details(shared.signature.to_string())
        });
        Ok(shared)
    }

    pub(crate) fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Report `err` to the sink and hand it back for propagation.
    pub(crate) fn fail(&self, err: MockaError) -> MockaError {
        self.reporter.report_failure(&err.report_message());
        err
    }

    pub(crate) fn record(&self, entry: impl FnOnce() -> LogEntry) {
        if let Some(journal) = &self.options.journal {
            journal.record(&entry().stub(&self.name));
        }
    }

    // ──────────────────────── invocation ────────────────────────

    pub(crate) fn invoke(&self, args: &[Value]) -> Vec<Value> {
        let mut state = self.state.lock();
        if state.restored {
            let displaced = state.displaced.clone();
            drop(state);
            return displaced.map_or_else(Vec::new, |behavior| behavior(args));
        }

        let global_index = state.call_count;
        state.call_count += 1;
        let resolved = state.resolve(global_index, args);
        if let Some(effect) = &state.side_effect {
            effect(args);
        }
        state
            .ledger
            .append(Call::new(args.to_vec(), resolved.clone()));
        drop(state);

        self.record(|| {
            LogEntry::new(EventType::StubInvoked, Severity::Info)
                .call_index(global_index)
                .arguments(args)
                .return_values(&resolved)
        });
        resolved
    }

    // ──────────────────────── configuration ────────────────────────

    fn check_returns(&self, values: &[Value]) -> Result<()> {
        check_return_values(&self.signature, values).map_err(|err| self.fail(err))
    }

    /// Apply `change` under the lock unless the stub is restored.
    fn configure<F>(&self, operation: &'static str, change: F) -> Result<()>
    where
        F: FnOnce(&mut StubState),
    {
        let mut state = self.state.lock();
        if state.restored {
            drop(state);
            return Err(self.fail(MockaError::StubRestored {
                name: self.name.clone(),
                operation,
            }));
        }
        change(&mut *state);
        drop(state);

        self.record(|| LogEntry::new(EventType::StubConfigured, Severity::Info).details(operation));
        Ok(())
    }

    pub(crate) fn assign_defaults(&self, values: Vec<Value>) -> Result<()> {
        self.check_returns(&values)?;
        self.configure("returns", |state| state.defaults = values)
    }

    pub(crate) fn assign_binding_defaults(&self, slot: usize, values: Vec<Value>) -> Result<()> {
        self.check_returns(&values)?;
        self.configure("binding returns", |state| {
            if let Some(binding) = state.bindings.get_mut(slot) {
                binding.defaults = Some(values);
            }
        })
    }

    pub(crate) fn assign_override(&self, scope: Scope, index: usize, values: Vec<Value>) -> Result<()> {
        self.check_returns(&values)?;
        self.configure("on_call returns", |state| match scope {
            Scope::Global => state.overrides.assign(index, values),
            Scope::Binding(slot) => {
                if let Some(binding) = state.bindings.get_mut(slot) {
                    binding.overrides.assign(index, values);
                }
            }
        })
    }

    pub(crate) fn set_side_effect(&self, effect: SideEffect) -> Result<()> {
        self.configure("exec_on_call", |state| state.side_effect = Some(effect))
    }

    /// Reserve an override slot. On a restored stub the handle is still
    /// returned; assigning through it reports `StubRestored`.
    pub(crate) fn register_override(self: &Arc<Self>, scope: Scope, index: usize) -> OnCall {
        let mut state = self.state.lock();
        if !state.restored {
            match scope {
                Scope::Global => state.overrides.register(index),
                Scope::Binding(slot) => {
                    if let Some(binding) = state.bindings.get_mut(slot) {
                        binding.overrides.register(index);
                    }
                }
            }
        }
        drop(state);
        OnCall::new(Arc::clone(self), scope, index)
    }

    pub(crate) fn bind(self: &Arc<Self>, pattern: Vec<Arg>) -> Binding {
        let matchers = match build_matchers(&self.signature, &pattern) {
            Ok(matchers) => matchers,
            Err(err) => {
                self.fail(err);
                return Binding::inert(Arc::clone(self));
            }
        };

        let mut state = self.state.lock();
        if state.restored {
            drop(state);
            self.fail(MockaError::StubRestored {
                name: self.name.clone(),
                operation: "with_args",
            });
            return Binding::inert(Arc::clone(self));
        }
        let slot = match state.bindings.iter().position(|b| b.has_pattern(&pattern)) {
            Some(existing) => existing,
            None => {
                state.bindings.push(BindingState::new(pattern, matchers));
                state.bindings.len() - 1
            }
        };
        drop(state);

        self.record(|| LogEntry::new(EventType::StubConfigured, Severity::Info).details("with_args"));
        Binding::new(Arc::clone(self), slot)
    }

    pub(crate) fn binding_call_count(&self, slot: usize) -> usize {
        self.state
            .lock()
            .bindings
            .get(slot)
            .map_or(0, |binding| binding.call_count)
    }

    pub(crate) fn reset_history(&self) {
        self.state.lock().reset_history();
    }

    // ──────────────────────── lifecycle ────────────────────────

    pub(crate) fn is_restored(&self) -> bool {
        self.state.lock().restored
    }

    /// Still active, but a later replacement sits on top of this one.
    pub(crate) fn is_covered(&self) -> bool {
        let state = self.state.lock();
        !state.restored
            && state
                .installed
                .as_ref()
                .is_some_and(|installed| !self.target.is_installed(installed))
    }

    pub(crate) fn restore(&self) -> Result<()> {
        let mut state = self.state.lock();
        if state.restored {
            drop(state);
            if self.options.strict_restore {
                return Err(self.fail(MockaError::AlreadyRestored {
                    name: self.name.clone(),
                }));
            }
            return Ok(());
        }
        let reinstated = match (&state.installed, &state.displaced) {
            (Some(installed), Some(displaced)) => {
                self.target.reinstate(installed, Arc::clone(displaced))
            }
            _ => Ok(()),
        };
        if let Err(err) = reinstated {
            drop(state);
            return Err(self.fail(err));
        }
        state.restored = true;
        // The callback may own handles to this stub; release them.
        let side_effect = state.side_effect.take();
        drop(state);
        drop(side_effect);

        self.record(|| LogEntry::new(EventType::StubRestored, Severity::Info));
        Ok(())
    }
}

impl Drop for StubShared {
    fn drop(&mut self) {
        let state = self.state.get_mut();
        if state.restored {
            return;
        }
        state.restored = true;
        let (Some(installed), Some(displaced)) = (state.installed.take(), state.displaced.take())
        else {
            return;
        };
        // Out of order: the replacement stays under the later stub and
        // forwards to `displaced` once this stub is gone.
        let outcome = self.target.reinstate(&installed, displaced);
        if let Err(err) = &outcome {
            self.reporter.report_failure(&err.report_message());
        }
        if let Some(journal) = &self.options.journal {
            let severity = if outcome.is_ok() {
                Severity::Info
            } else {
                Severity::Warning
            };
            let mut entry = LogEntry::new(EventType::StubRestored, severity)
                .stub(&self.name)
                .details("dropped");
            if let Err(err) = &outcome {
                entry = entry.error(err);
            }
            journal.record(&entry);
        }
    }
}

/// The behavior installed in the target. Holds the stub weakly so the cell
/// never keeps a dropped stub alive.
fn replacement_for(stub: Weak<StubShared>, fallback: Arc<OnceLock<Behavior>>) -> Behavior {
    Arc::new(move |args: &[Value]| match stub.upgrade() {
        Some(stub) => stub.invoke(args),
        None => fallback
            .get()
            .map_or_else(Vec::new, |behavior| behavior(args)),
    })
}
