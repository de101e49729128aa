//! Configuration: optional TOML file + env var overrides + defaults.

#![allow(missing_docs)]

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::core::errors::{MockaError, Result};
use crate::logger::jsonl::JsonlConfig;

/// Smallest rotation threshold accepted for an enabled journal.
pub const MIN_JOURNAL_SIZE_BYTES: u64 = 1024;

/// Full mocka configuration model.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub stub: StubConfig,
    pub reporter: ReporterConfig,
    pub journal: JournalConfig,
}

/// Stub lifecycle knobs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StubConfig {
    /// Restoring an already-restored stub is an error instead of a no-op.
    pub strict_restore: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ReporterConfig {
    /// Echo every reported failure to stderr as well.
    pub echo_stderr: bool,
}

/// Activity journal settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct JournalConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub fallback_path: Option<PathBuf>,
    pub max_size_bytes: u64,
    pub max_rotated_files: u32,
}

impl Default for JournalConfig {
    fn default() -> Self {
        let writer = JsonlConfig::default();
        Self {
            enabled: false,
            path: writer.path,
            fallback_path: writer.fallback_path,
            max_size_bytes: writer.max_size_bytes,
            max_rotated_files: writer.max_rotated_files,
        }
    }
}

impl JournalConfig {
    /// Writer settings for this journal.
    #[must_use]
    pub fn writer_config(&self) -> JsonlConfig {
        JsonlConfig {
            path: self.path.clone(),
            fallback_path: self.fallback_path.clone(),
            max_size_bytes: self.max_size_bytes,
            max_rotated_files: self.max_rotated_files,
        }
    }
}

impl Config {
    /// `MOCKA_CONFIG` when set, else `mocka.toml` in the working directory.
    #[must_use]
    pub fn default_path() -> PathBuf {
        env_var("MOCKA_CONFIG").map_or_else(|| PathBuf::from("mocka.toml"), PathBuf::from)
    }

    /// Load config from default or explicit path, then apply env overrides.
    ///
    /// A missing file at the default path is not an error; defaults are used.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path_buf = path.map_or_else(Self::default_path, Path::to_path_buf);
        let is_explicit_path = path.is_some();

        let mut cfg = if path_buf.exists() {
            let raw = fs::read_to_string(&path_buf).map_err(|source| MockaError::Io {
                path: path_buf.clone(),
                source,
            })?;
            Self::from_toml(&raw)?
        } else if is_explicit_path {
            return Err(MockaError::MissingConfig { path: path_buf });
        } else {
            Self::default()
        };

        cfg.apply_env_overrides_from(env_var)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse a TOML document without consulting the environment.
    pub fn from_toml(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    fn apply_env_overrides_from<F>(&mut self, mut lookup: F) -> Result<()>
    where
        F: FnMut(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("MOCKA_STRICT_RESTORE") {
            self.stub.strict_restore = parse_env_bool("MOCKA_STRICT_RESTORE", &raw)?;
        }

        if let Some(raw) = lookup("MOCKA_ECHO_STDERR") {
            self.reporter.echo_stderr = parse_env_bool("MOCKA_ECHO_STDERR", &raw)?;
        }

        if let Some(raw) = lookup("MOCKA_JOURNAL_ENABLED") {
            self.journal.enabled = parse_env_bool("MOCKA_JOURNAL_ENABLED", &raw)?;
        }

        if let Some(raw) = lookup("MOCKA_JOURNAL_PATH") {
            self.journal.path = PathBuf::from(raw);
        }

        if let Some(raw) = lookup("MOCKA_JOURNAL_MAX_SIZE_BYTES") {
            self.journal.max_size_bytes = parse_env_u64("MOCKA_JOURNAL_MAX_SIZE_BYTES", &raw)?;
        }

        if let Some(raw) = lookup("MOCKA_JOURNAL_MAX_ROTATED_FILES") {
            self.journal.max_rotated_files =
                parse_env_u32("MOCKA_JOURNAL_MAX_ROTATED_FILES", &raw)?;
        }

        Ok(())
    }

    /// Journal limits only matter while the journal is on.
    pub fn validate(&self) -> Result<()> {
        if !self.journal.enabled {
            return Ok(());
        }
        if self.journal.path.as_os_str().is_empty() {
            return Err(MockaError::InvalidConfig {
                details: "journal.path must not be empty".to_string(),
            });
        }
        if self.journal.max_size_bytes < MIN_JOURNAL_SIZE_BYTES {
            return Err(MockaError::InvalidConfig {
                details: format!(
                    "journal.max_size_bytes must be >= {MIN_JOURNAL_SIZE_BYTES}, got {}",
                    self.journal.max_size_bytes
                ),
            });
        }
        if self.journal.max_rotated_files == 0 {
            return Err(MockaError::InvalidConfig {
                details: "journal.max_rotated_files must be >= 1".to_string(),
            });
        }
        Ok(())
    }
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|raw| !raw.trim().is_empty())
}

fn parse_env_u64(name: &str, raw: &str) -> Result<u64> {
    raw.trim().parse::<u64>().map_err(|error| MockaError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_u32(name: &str, raw: &str) -> Result<u32> {
    raw.trim().parse::<u32>().map_err(|error| MockaError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}

fn parse_env_bool(name: &str, raw: &str) -> Result<bool> {
    raw.trim().parse::<bool>().map_err(|error| MockaError::ConfigParse {
        context: "env",
        details: format!("{name}={raw:?}: {error}"),
    })
}
