//! Convenience re-exports for test code.
//!
//! ```rust,no_run
//! use mocka::prelude::*;
//! ```

// Core
pub use crate::core::config::Config;
pub use crate::core::errors::{MockaError, Result};
pub use crate::core::signature::Signature;
pub use crate::core::value::{Handle, Kind, KindSet, Value};

// Interception
pub use crate::intercept::{Function, Interceptor};

// Stubs
pub use crate::sandbox::Sandbox;
pub use crate::stub::{Binding, Call, OnCall, Stub, StubOptions};
pub use crate::validate::Arg;

// Matchers
pub use crate::matcher::{
    Matcher, SharedMatcher, equals, float_greater_than, float_less_than, int_greater_than,
    int_less_than, nil, satisfies, slice_of,
};

// Reporting
pub use crate::report::{RecordingReporter, Reporter, StderrReporter};

pub use crate::file::MockFile;
pub use crate::{args, values};
