//! dbasic_options: Scanner configuration and `dbasic.json` parsing.
//!
//! Every field has a default matching the fixed limits of the embedded
//! toolchain, so an empty `{}` config is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default identifier/string length limit (`MAXTOKEN`).
pub const DEFAULT_MAX_TOKEN: usize = 32;
/// Default line buffer length (`MAXLINE`).
pub const DEFAULT_MAX_LINE: usize = 128;

/// Options controlling one scanner instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScanOptions {
    /// Longest identifier or string literal, in bytes.
    pub max_token: usize,
    /// Longest line fetched from any source, in bytes. Longer physical
    /// lines are split into several logical lines.
    pub max_line: usize,
    /// Directories searched, after the working directory, for `INCLUDE` files.
    pub include_paths: Vec<String>,
    /// What to do when a numeric literal does not fit the VM value width.
    pub literal_overflow: LiteralOverflow,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            max_token: DEFAULT_MAX_TOKEN,
            max_line: DEFAULT_MAX_LINE,
            include_paths: Vec::new(),
            literal_overflow: LiteralOverflow::Wrap,
        }
    }
}

/// Numeric literal overflow policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LiteralOverflow {
    /// Keep the low 32 bits, as the legacy compiler did.
    #[default]
    Wrap,
    /// Raise a "number literal out of range" diagnostic.
    Error,
}

/// Failure to load a `dbasic.json` file.
#[derive(Debug, thiserror::Error)]
pub enum OptionsError {
    #[error("cannot read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

impl ScanOptions {
    /// Parse options from JSON text.
    pub fn from_json(content: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(content)?)
    }

    /// Parse options from a config file on disk.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| OptionsError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&content)
    }

    pub fn with_include_path(mut self, dir: impl Into<String>) -> Self {
        self.include_paths.push(dir.into());
        self
    }

    pub fn with_literal_overflow(mut self, policy: LiteralOverflow) -> Self {
        self.literal_overflow = policy;
        self
    }
}
