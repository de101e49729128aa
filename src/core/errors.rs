//! MOCKA-prefixed error types with structured error codes.

#![allow(missing_docs)]

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Shared `Result` alias for the project.
pub type Result<T> = std::result::Result<T, MockaError>;

/// Coarse grouping used when deciding how a failure surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Stub or binding could not be set up against the target signature.
    Setup,
    /// A return-value assignment violated the signature.
    Configuration,
    /// The stub was used outside its active lifetime.
    Lifecycle,
    /// Config file, environment, or journal I/O.
    Environment,
}

/// Top-level error type for mocka.
#[derive(Debug, Error)]
pub enum MockaError {
    #[error("[MOCKA-1001] cannot use `{name}`: no implementation is bound to the function")]
    Unbound { name: String },

    #[error("[MOCKA-1002] replacement for `{name}` must have signature {expected}, but received {received}")]
    SignatureMismatch {
        name: String,
        expected: String,
        received: String,
    },

    #[error("[MOCKA-1003] expected arguments matching {signature}, but received ({provided})")]
    ArgumentValidation { signature: String, provided: String },

    #[error("[MOCKA-1004] expected return values of type {expected}, but received {received}")]
    ReturnValidation { expected: String, received: String },

    #[error("[MOCKA-1005] invalid call to `{name}`: {details}")]
    InvalidCall { name: String, details: String },

    #[error("[MOCKA-1006] invalid matcher pattern {pattern:?}: {details}")]
    InvalidPattern { pattern: String, details: String },

    #[error("[MOCKA-2001] stub for `{name}` has already been restored")]
    AlreadyRestored { name: String },

    #[error("[MOCKA-2002] `{operation}` is not allowed on stub for `{name}`: stub has been restored")]
    StubRestored {
        name: String,
        operation: &'static str,
    },

    #[error("[MOCKA-2003] cannot restore stub for `{name}` while a later stub on the same function is active")]
    RestoreOrder { name: String },

    #[error("[MOCKA-3001] invalid configuration: {details}")]
    InvalidConfig { details: String },

    #[error("[MOCKA-3002] missing configuration file: {path}")]
    MissingConfig { path: PathBuf },

    #[error("[MOCKA-3003] configuration parse failure in {context}: {details}")]
    ConfigParse {
        context: &'static str,
        details: String,
    },

    #[error("[MOCKA-3004] IO failure at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl MockaError {
    /// Stable machine-parseable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Unbound { .. } => "MOCKA-1001",
            Self::SignatureMismatch { .. } => "MOCKA-1002",
            Self::ArgumentValidation { .. } => "MOCKA-1003",
            Self::ReturnValidation { .. } => "MOCKA-1004",
            Self::InvalidCall { .. } => "MOCKA-1005",
            Self::InvalidPattern { .. } => "MOCKA-1006",
            Self::AlreadyRestored { .. } => "MOCKA-2001",
            Self::StubRestored { .. } => "MOCKA-2002",
            Self::RestoreOrder { .. } => "MOCKA-2003",
            Self::InvalidConfig { .. } => "MOCKA-3001",
            Self::MissingConfig { .. } => "MOCKA-3002",
            Self::ConfigParse { .. } => "MOCKA-3003",
            Self::Io { .. } => "MOCKA-3004",
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Unbound { .. }
            | Self::SignatureMismatch { .. }
            | Self::ArgumentValidation { .. }
            | Self::InvalidCall { .. }
            | Self::InvalidPattern { .. } => ErrorCategory::Setup,
            Self::ReturnValidation { .. } => ErrorCategory::Configuration,
            Self::AlreadyRestored { .. }
            | Self::StubRestored { .. }
            | Self::RestoreOrder { .. } => ErrorCategory::Lifecycle,
            Self::InvalidConfig { .. }
            | Self::MissingConfig { .. }
            | Self::ConfigParse { .. }
            | Self::Io { .. } => ErrorCategory::Environment,
        }
    }

    /// Message handed to a failure reporter.
    #[must_use]
    pub fn report_message(&self) -> String {
        format!("mocka: {self}")
    }

    /// Convenience constructor for IO errors with a known path.
    #[must_use]
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

impl From<toml::de::Error> for MockaError {
    fn from(value: toml::de::Error) -> Self {
        Self::ConfigParse {
            context: "toml",
            details: value.to_string(),
        }
    }
}
