//! Sandbox: a group of stubs restored together.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::core::config::Config;
use crate::core::errors::{MockaError, Result};
use crate::core::value::Value;
use crate::intercept::Interceptor;
use crate::logger::{EventType, LogEntry, Severity};
use crate::report::{self, Reporter};
use crate::stub::{Stub, StubOptions};

/// Creates stubs that share a reporter and options, and restores them all
/// at once.
///
/// ```
/// use std::sync::Arc;
/// use mocka::{values, Function, Kind, RecordingReporter, Sandbox, Signature};
///
/// let now = Function::new("now", Signature::new([]).returns([Kind::I64]), |_| values![1_i64]);
/// let sandbox = Sandbox::new(Arc::new(RecordingReporter::new()));
/// sandbox.stub_function(&now, values![42_i64]).unwrap();
/// assert_eq!(now.call(&[]).unwrap(), values![42_i64]);
///
/// sandbox.restore().unwrap();
/// assert_eq!(now.call(&[]).unwrap(), values![1_i64]);
/// ```
pub struct Sandbox {
    reporter: Arc<dyn Reporter>,
    options: StubOptions,
    stubs: Mutex<Vec<Stub>>,
}

impl Sandbox {
    pub fn new(reporter: Arc<dyn Reporter>) -> Self {
        Self::with_options(reporter, StubOptions::default())
    }

    pub fn with_options(reporter: Arc<dyn Reporter>, options: StubOptions) -> Self {
        Self {
            reporter,
            options,
            stubs: Mutex::new(Vec::new()),
        }
    }

    /// Apply `[stub]`, `[reporter]` and `[journal]` settings; the reporter is
    /// wrapped with the stderr echo and journal sinks when they are enabled.
    pub fn from_config(reporter: Arc<dyn Reporter>, config: &Config) -> Self {
        let options = StubOptions::from_config(config);
        let reporter = report::layered(reporter, config, options.journal.as_ref());
        Self::with_options(reporter, options)
    }

    /// Stub `target` and track it for [`restore`](Self::restore).
    pub fn stub_function<T>(&self, target: &T, defaults: Vec<Value>) -> Result<Stub>
    where
        T: Interceptor + Clone + 'static,
    {
        let stub = Stub::create_with(
            Arc::clone(&self.reporter),
            target,
            defaults,
            self.options.clone(),
        )?;
        self.stubs.lock().push(stub.clone());
        Ok(stub)
    }

    /// Restore every tracked stub in creation order and forget them.
    ///
    /// A stub still covered by a later stub on the same target waits until
    /// the uncovered ones are done; covered stubs then unwind newest first.
    /// A failing stub does not stop the rest; the first error is returned.
    pub fn restore(&self) -> Result<()> {
        let stubs = std::mem::take(&mut *self.stubs.lock());
        let (covered, uncovered): (Vec<&Stub>, Vec<&Stub>) =
            stubs.iter().partition(|stub| stub.is_covered());
        let mut first_error: Option<MockaError> = None;
        for stub in uncovered.into_iter().chain(covered.into_iter().rev()) {
            if let Err(err) = stub.restore() {
                first_error.get_or_insert(err);
            }
        }

        if let Some(journal) = &self.options.journal {
            let mut entry = LogEntry::new(EventType::SandboxRestored, Severity::Info)
                .details(format!("{} stub(s)", stubs.len()));
            if let Some(err) = &first_error {
                entry = entry.error(err);
            }
            journal.record(&entry);
        }

        first_error.map_or(Ok(()), Err)
    }

    /// Number of stubs awaiting restore.
    #[must_use]
    pub fn len(&self) -> usize {
        self.stubs.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stubs.lock().is_empty()
    }
}
