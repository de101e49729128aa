#![forbid(unsafe_code)]

//! mocka: programmable function stubs for tests.
//!
//! A stubbed [`Function`] answers with values you choose instead of running
//! its real body:
//! 1. **Defaults**: returned when nothing more specific applies
//! 2. **Call-index overrides**: `on_call(i)` answers only the `i`-th call
//! 3. **Argument bindings**: `with_args(..)` answers calls whose arguments
//!    match a pattern of literals and [`matcher`]s
//!
//! Every call is recorded, and `restore` hands the function back.
//!
//! # Library usage
//!
//! Use the [`prelude`] for convenient access to the most common types:
//!
//! ```rust,no_run
//! use mocka::prelude::*;
//! ```
//!
//! Individual modules can also be imported directly:
//!
//! ```rust,no_run
//! use mocka::core::config::Config;
//! use mocka::matcher::{int_greater_than, str_matching};
//! ```

pub mod prelude;

pub mod core;
pub mod file;
pub mod intercept;
pub mod logger;
pub mod matcher;
pub mod report;
pub mod sandbox;
pub mod stub;
pub mod validate;

pub use crate::core::config::Config;
pub use crate::core::errors::{ErrorCategory, MockaError, Result};
pub use crate::core::signature::Signature;
pub use crate::core::value::{Handle, Kind, KindSet, Value};
pub use crate::file::MockFile;
pub use crate::intercept::{Behavior, Function, Interceptor};
pub use crate::report::{JournalReporter, RecordingReporter, Reporter, StderrReporter};
pub use crate::sandbox::Sandbox;
pub use crate::stub::{Binding, Call, OnCall, Stub, StubOptions};
pub use crate::validate::Arg;
