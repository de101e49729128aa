//! Programmable stubs: take over a function, answer per call, record
//! every invocation, and hand the function back on restore.
//!
//! Resolution order for each call, under the stub's lock:
//! 1. the first binding (in creation order) whose matchers accept the
//!    arguments answers with its override for its own call index, else its
//!    default;
//! 2. otherwise the global override for the global call index, else the
//!    global defaults.
//!
//! A matching binding with nothing configured still consumes its index and
//! then defers to step 2.

pub mod binding;
mod engine;
pub mod ledger;
pub mod on_call;

#[cfg(test)]
mod test_properties;

use std::fmt;
use std::sync::Arc;

use crate::core::config::Config;
use crate::core::errors::Result;
use crate::core::signature::Signature;
use crate::core::value::Value;
use crate::intercept::Interceptor;
use crate::logger::Journal;
use crate::report::Reporter;
use crate::validate::Arg;

pub use binding::Binding;
pub use ledger::{Call, CallLedger};
pub use on_call::OnCall;

use engine::StubShared;
use on_call::Scope;

/// Per-stub behavior switches.
#[derive(Debug, Clone, Default)]
pub struct StubOptions {
    /// Restoring twice is an error instead of a no-op.
    pub strict_restore: bool,
    /// Where lifecycle and invocation events are journaled.
    pub journal: Option<Arc<Journal>>,
}

impl StubOptions {
    /// Options from `[stub]` and `[journal]`. Opens the journal when enabled.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            strict_restore: config.stub.strict_restore,
            journal: Journal::from_config(&config.journal).map(Arc::new),
        }
    }
}

/// A live stub. Cheap to clone; clones share one state.
///
/// Dropping the last handle of an active stub restores the target. Stubs
/// stacked on one target unwind last-in-first-out: restoring a stub while a
/// later one is still installed fails with `RestoreOrder`.
///
/// ```
/// use std::sync::Arc;
/// use mocka::{values, Function, Kind, RecordingReporter, Signature, Stub};
///
/// let len = Function::new(
///     "len",
///     Signature::new([Kind::Str]).returns([Kind::I64]),
///     |args| values![args[0].as_str().map_or(0, str::len) as i64],
/// );
/// let reporter = Arc::new(RecordingReporter::new());
/// let stub = Stub::create(reporter.clone(), &len, values![20_i64]).unwrap();
/// stub.on_second_call().returns(values![5_i64]).unwrap();
///
/// assert_eq!(len.call(&values!["a"]).unwrap(), values![20_i64]);
/// assert_eq!(len.call(&values!["a"]).unwrap(), values![5_i64]);
///
/// stub.restore().unwrap();
/// assert_eq!(len.call(&values!["abc"]).unwrap(), values![3_i64]);
/// reporter.assert_no_failures();
/// ```
#[derive(Clone)]
pub struct Stub {
    shared: Arc<StubShared>,
}

impl Stub {
    /// Stub `target`, answering `defaults` until configured otherwise.
    pub fn create<T>(reporter: Arc<dyn Reporter>, target: &T, defaults: Vec<Value>) -> Result<Self>
    where
        T: Interceptor + Clone + 'static,
    {
        Self::create_with(reporter, target, defaults, StubOptions::default())
    }

    pub fn create_with<T>(
        reporter: Arc<dyn Reporter>,
        target: &T,
        defaults: Vec<Value>,
        options: StubOptions,
    ) -> Result<Self>
    where
        T: Interceptor + Clone + 'static,
    {
        let shared = StubShared::install(reporter, Box::new(target.clone()), defaults, options)?;
        Ok(Self { shared })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.shared.name()
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        self.shared.signature()
    }

    // ──────────────────────── configuration ────────────────────────

    /// Replace the global defaults.
    pub fn returns(&self, values: impl IntoIterator<Item = Value>) -> Result<()> {
        self.shared.assign_defaults(values.into_iter().collect())
    }

    /// Handle for the `index`-th call overall (zero-based).
    pub fn on_call(&self, index: usize) -> OnCall {
        self.shared.register_override(Scope::Global, index)
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

    /// Bind an argument pattern. An invalid pattern is reported and yields
    /// an inert binding.
    pub fn with_args(&self, pattern: impl IntoIterator<Item = Arg>) -> Binding {
        self.shared.bind(pattern.into_iter().collect())
    }

    /// Run `callback` with the arguments of every call, before it returns.
    ///
    /// The callback runs under the stub's lock and must not call this stub.
    /// A callback that owns a clone of this stub keeps it alive until
    /// [`restore`](Self::restore) releases the callback, so dropping the
    /// other handles alone will not restore the target.
    pub fn exec_on_call<F>(&self, callback: F) -> Result<()>
    where
        F: Fn(&[Value]) + Send + Sync + 'static,
    {
        self.shared.set_side_effect(Box::new(callback))
    }

    // ──────────────────────── history ────────────────────────

    #[must_use]
    pub fn calls(&self) -> Vec<Call> {
        self.shared.state.lock().ledger.iter().cloned().collect()
    }

    #[must_use]
    pub fn call(&self, index: usize) -> Option<Call> {
        self.shared.state.lock().ledger.get(index).cloned()
    }

    #[must_use]
    pub fn first_call(&self) -> Option<Call> {
        self.call(0)
    }

    #[must_use]
    pub fn second_call(&self) -> Option<Call> {
        self.call(1)
    }

    #[must_use]
    pub fn third_call(&self) -> Option<Call> {
        self.call(2)
    }

    #[must_use]
    pub fn last_call(&self) -> Option<Call> {
        self.shared.state.lock().ledger.last().cloned()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.shared.state.lock().ledger.len()
    }

    #[must_use]
    pub fn called_once(&self) -> bool {
        self.called_times(1)
    }

    #[must_use]
    pub fn called_twice(&self) -> bool {
        self.called_times(2)
    }

    #[must_use]
    pub fn called_thrice(&self) -> bool {
        self.called_times(3)
    }

    #[must_use]
    pub fn called_times(&self, times: usize) -> bool {
        self.shared.state.lock().ledger.called_times(times)
    }

    /// Forget every recorded call and rewind all call counters, global and
    /// per binding. Configuration is kept.
    pub fn reset_history(&self) {
        self.shared.reset_history();
    }

    // ──────────────────────── lifecycle ────────────────────────

    #[must_use]
    pub fn is_restored(&self) -> bool {
        self.shared.is_restored()
    }

    /// Hand the target back to the behavior this stub displaced.
    pub fn restore(&self) -> Result<()> {
        self.shared.restore()
    }

    pub(crate) fn is_covered(&self) -> bool {
        self.shared.is_covered()
    }
}

impl fmt::Debug for Stub {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Stub")
            .field("name", &self.name())
            .field("signature", self.signature())
            .field("calls", &self.call_count())
            .field("restored", &self.is_restored())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::value::Kind;
    use crate::intercept::Function;
    use crate::matcher::{int_greater_than, nil};
    use crate::report::RecordingReporter;
    use crate::{args, values};

    fn len_fn() -> Function {
        Function::new(
            "len",
            Signature::new([Kind::Str]).returns([Kind::I64]),
            |args| values![i64::try_from(args[0].as_str().map_or(0, str::len)).unwrap_or(0)],
        )
    }

    fn str_int_fn() -> Function {
        Function::new(
            "pick",
            Signature::new([Kind::Str, Kind::I64]).returns([Kind::I64, Kind::Error]),
            |_| values![0_i64, Value::Nil],
        )
    }

    fn setup(target: &Function, defaults: Vec<Value>) -> (Stub, Arc<RecordingReporter>) {
        let reporter = Arc::new(RecordingReporter::new());
        let stub = Stub::create(reporter.clone(), target, defaults).expect("create");
        (stub, reporter)
    }

    #[test]
    fn global_overrides_interleave_with_defaults() {
        let len = len_fn();
        let (stub, reporter) = setup(&len, values![20_i64]);
        stub.on_second_call().returns(values![5_i64]).unwrap();
        stub.on_call(3).returns(values![3_i64]).unwrap();

        let got: Vec<_> = (0..4).map(|_| len.call(&values!["x"]).unwrap()).collect();
        assert_eq!(
            got,
            vec![values![20_i64], values![5_i64], values![20_i64], values![3_i64]]
        );
        reporter.assert_no_failures();
    }

    #[test]
    fn binding_override_uses_its_own_index() {
        let f = str_int_fn();
        let (stub, reporter) = setup(&f, values![20_i64, Value::Nil]);
        let binding = stub.with_args(args!["abc", int_greater_than(5)]);
        binding.on_first_call().returns(values![5_i64, Value::Nil]).unwrap();

        assert_eq!(f.call(&values!["zzz", 1_i64]).unwrap(), values![20_i64, Value::Nil]);
        assert_eq!(f.call(&values!["abc", 6_i64]).unwrap(), values![5_i64, Value::Nil]);
        assert_eq!(f.call(&values!["abc", 7_i64]).unwrap(), values![20_i64, Value::Nil]);
        assert_eq!(binding.call_count(), 2);
        assert_eq!(stub.call_count(), 3);
        reporter.assert_no_failures();
    }

    #[test]
    fn bare_binding_defers_to_global_index() {
        let f = str_int_fn();
        let (stub, _) = setup(&f, values![20_i64, Value::Nil]);
        let _binding = stub.with_args(args!["abc", 1_i64]);
        stub.on_first_call().returns(values![9_i64, Value::Nil]).unwrap();

        assert_eq!(f.call(&values!["abc", 1_i64]).unwrap(), values![9_i64, Value::Nil]);
        assert_eq!(f.call(&values!["abc", 1_i64]).unwrap(), values![20_i64, Value::Nil]);
    }

    #[test]
    fn first_matching_binding_wins() {
        let f = str_int_fn();
        let (stub, _) = setup(&f, values![0_i64, Value::Nil]);
        stub.with_args(args!["abc", int_greater_than(0)])
            .returns(values![1_i64, Value::Nil])
            .unwrap();
        stub.with_args(args!["abc", 5_i64])
            .returns(values![2_i64, Value::Nil])
            .unwrap();
        assert_eq!(f.call(&values!["abc", 5_i64]).unwrap(), values![1_i64, Value::Nil]);
    }

    #[test]
    fn equal_pattern_returns_existing_binding() {
        let f = str_int_fn();
        let (stub, _) = setup(&f, values![0_i64, Value::Nil]);
        let a = stub.with_args(args!["abc", 1_i64]);
        let b = stub.with_args(args!["abc", 1_i64]);
        assert_eq!(a, b);
        a.returns(values![1_i64, Value::Nil]).unwrap();
        b.returns(values![2_i64, Value::Nil]).unwrap();
        assert_eq!(f.call(&values!["abc", 1_i64]).unwrap(), values![2_i64, Value::Nil]);
    }

    #[test]
    fn invalid_pattern_is_reported_and_inert() {
        let f = str_int_fn();
        let (stub, reporter) = setup(&f, values![0_i64, Value::Nil]);
        let binding = stub.with_args(args!["abc"]);
        assert!(binding.is_inert());
        assert!(binding.returns(values!["wrong"]).is_ok());
        assert!(binding.on_first_call().returns(values![1_i64]).is_ok());
        assert_eq!(binding.call_count(), 0);

        let messages = reporter.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].starts_with("mocka: [MOCKA-1003]"));
    }

    #[test]
    fn nil_matcher_on_error_param() {
        let f = Function::new(
            "check",
            Signature::new([Kind::Error]).returns([Kind::Bool]),
            |_| values![false],
        );
        let (stub, reporter) = setup(&f, values![false]);
        stub.with_args(args![nil()]).returns(values![true]).unwrap();
        assert_eq!(f.call(&values![Value::Nil]).unwrap(), values![true]);
        assert_eq!(f.call(&values![Value::error("boom")]).unwrap(), values![false]);
        reporter.assert_no_failures();
    }

    #[test]
    fn wrong_return_values_are_reported_and_rejected() {
        let len = len_fn();
        let (stub, reporter) = setup(&len, values![20_i64]);
        let err = stub.returns(values!["nope"]).expect_err("wrong kind");
        assert_eq!(err.code(), "MOCKA-1004");
        let err = stub.on_first_call().returns(values![1_i64, 2_i64]).expect_err("arity");
        assert_eq!(err.code(), "MOCKA-1004");
        assert_eq!(reporter.messages().len(), 2);
        assert_eq!(len.call(&values!["x"]).unwrap(), values![20_i64]);
    }

    #[test]
    fn invalid_defaults_fail_creation_without_installing() {
        let len = len_fn();
        let reporter = Arc::new(RecordingReporter::new());
        let err = Stub::create(reporter.clone(), &len, values!["a"]).expect_err("bad defaults");
        assert_eq!(err.code(), "MOCKA-1004");
        assert!(!len.is_intercepted());
        assert!(reporter.has_failures());
    }

    #[test]
    fn unbound_target_cannot_be_stubbed() {
        let f = Function::unbound("later", Signature::new([]).returns([Kind::Bool]));
        let reporter = Arc::new(RecordingReporter::new());
        let err = Stub::create(reporter.clone(), &f, values![true]).expect_err("unbound");
        assert_eq!(err.code(), "MOCKA-1001");
        assert_eq!(reporter.messages().len(), 1);
    }

    #[test]
    fn on_call_handles_are_idempotent() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        assert_eq!(stub.on_call(1), stub.on_second_call());
        assert_ne!(stub.on_call(1), stub.on_call(2));
        assert_eq!(stub.on_third_call().index(), 2);
    }

    #[test]
    fn registered_but_unassigned_override_is_absent() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        let _pending = stub.on_first_call();
        assert_eq!(len.call(&values!["x"]).unwrap(), values![20_i64]);
    }

    #[test]
    fn history_reads() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        assert!(stub.first_call().is_none());
        assert!(stub.last_call().is_none());
        for word in ["a", "bb", "ccc"] {
            len.call(&values![word]).unwrap();
        }
        assert!(stub.called_thrice());
        assert!(!stub.called_twice());
        assert_eq!(stub.second_call().unwrap().arguments(), values!["bb"].as_slice());
        assert_eq!(stub.last_call(), stub.third_call());
        assert_eq!(stub.calls().len(), 3);
        assert!(stub.call(3).is_none());
    }

    #[test]
    fn reset_history_rewinds_every_counter() {
        let f = str_int_fn();
        let (stub, _) = setup(&f, values![20_i64, Value::Nil]);
        let binding = stub.with_args(args!["abc", 1_i64]);
        binding.on_first_call().returns(values![5_i64, Value::Nil]).unwrap();
        stub.on_first_call().returns(values![7_i64, Value::Nil]).unwrap();

        f.call(&values!["abc", 1_i64]).unwrap();
        f.call(&values!["x", 1_i64]).unwrap();
        stub.reset_history();
        assert_eq!(stub.call_count(), 0);
        assert_eq!(binding.call_count(), 0);

        assert_eq!(f.call(&values!["x", 1_i64]).unwrap(), values![7_i64, Value::Nil]);
        assert_eq!(f.call(&values!["abc", 1_i64]).unwrap(), values![5_i64, Value::Nil]);
    }

    #[test]
    fn exec_on_call_sees_arguments() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        let seen = Arc::new(parking_lot::Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        stub.exec_on_call(move |args| sink.lock().push(args.to_vec()))
            .unwrap();

        len.call(&values!["one"]).unwrap();
        len.call(&values!["two"]).unwrap();
        assert_eq!(*seen.lock(), vec![values!["one"], values!["two"]]);
    }

    #[test]
    fn restore_twice_is_a_no_op_by_default() {
        let len = len_fn();
        let (stub, reporter) = setup(&len, values![20_i64]);
        stub.restore().unwrap();
        stub.restore().unwrap();
        assert!(stub.is_restored());
        reporter.assert_no_failures();
    }

    #[test]
    fn strict_restore_reports_second_restore() {
        let len = len_fn();
        let reporter = Arc::new(RecordingReporter::new());
        let options = StubOptions {
            strict_restore: true,
            journal: None,
        };
        let stub = Stub::create_with(reporter.clone(), &len, values![20_i64], options).unwrap();
        stub.restore().unwrap();
        let err = stub.restore().expect_err("second restore");
        assert_eq!(err.code(), "MOCKA-2001");
        assert_eq!(reporter.messages().len(), 1);
    }

    #[test]
    fn configuration_after_restore_fails_and_keeps_history() {
        let len = len_fn();
        let (stub, reporter) = setup(&len, values![20_i64]);
        len.call(&values!["a"]).unwrap();
        stub.restore().unwrap();

        assert_eq!(stub.returns(values![1_i64]).unwrap_err().code(), "MOCKA-2002");
        assert_eq!(
            stub.on_first_call().returns(values![1_i64]).unwrap_err().code(),
            "MOCKA-2002"
        );
        assert!(stub.exec_on_call(|_| {}).is_err());
        assert!(stub.with_args(args!["a"]).is_inert());
        assert_eq!(reporter.messages().len(), 4);

        assert_eq!(len.call(&values!["abc"]).unwrap(), values![3_i64]);
        assert!(stub.called_once());
    }

    #[test]
    fn dropping_last_handle_restores() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        let clone = stub.clone();
        drop(stub);
        assert_eq!(len.call(&values!["a"]).unwrap(), values![20_i64]);
        drop(clone);
        assert!(!len.is_intercepted());
        assert_eq!(len.call(&values!["abcd"]).unwrap(), values![4_i64]);
    }

    #[test]
    fn restore_releases_the_callback() {
        let len = len_fn();
        let (stub, _) = setup(&len, values![20_i64]);
        let held = stub.clone();
        let token = Arc::new(());
        let captured = Arc::clone(&token);
        stub.exec_on_call(move |_| {
            let _ = (&held, &captured);
        })
        .unwrap();
        assert_eq!(Arc::strong_count(&token), 2);

        stub.restore().unwrap();
        assert_eq!(Arc::strong_count(&token), 1);
        assert!(!len.is_intercepted());
    }

    #[test]
    fn restoring_a_covered_stub_is_refused() {
        let len = len_fn();
        let (outer, reporter) = setup(&len, values![1_i64]);
        let (inner, _) = setup(&len, values![2_i64]);
        assert!(outer.is_covered());
        assert!(!inner.is_covered());

        let err = outer.restore().expect_err("inner is still installed");
        assert_eq!(err.code(), "MOCKA-2003");
        assert_eq!(reporter.messages().len(), 1);
        assert!(!outer.is_restored());
        assert_eq!(len.call(&values!["a"]).unwrap(), values![2_i64]);

        inner.restore().unwrap();
        assert_eq!(len.call(&values!["a"]).unwrap(), values![1_i64]);
        outer.restore().unwrap();
        assert_eq!(len.call(&values!["ab"]).unwrap(), values![2_i64]);
    }

    #[test]
    fn dropping_a_covered_stub_is_reported_and_forwards() {
        let len = len_fn();
        let (outer, reporter) = setup(&len, values![1_i64]);
        let (inner, _) = setup(&len, values![2_i64]);
        drop(outer);
        assert!(reporter.messages()[0].contains("MOCKA-2003"));

        assert_eq!(len.call(&values!["a"]).unwrap(), values![2_i64]);
        assert!(inner.called_once());
        inner.restore().unwrap();
        assert_eq!(len.call(&values!["abc"]).unwrap(), values![3_i64]);
    }

    #[test]
    fn stubs_stack_and_unwind() {
        let len = len_fn();
        let (outer, _) = setup(&len, values![1_i64]);
        let (inner, _) = setup(&len, values![2_i64]);
        assert_eq!(len.call(&values!["a"]).unwrap(), values![2_i64]);
        inner.restore().unwrap();
        assert_eq!(len.call(&values!["a"]).unwrap(), values![1_i64]);
        outer.restore().unwrap();
        assert_eq!(len.call(&values!["ab"]).unwrap(), values![2_i64]);
        assert!(inner.called_once());
        assert!(outer.called_once());
    }
}
