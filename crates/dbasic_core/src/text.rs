//! Source position types for diagnostic reporting.
//!
//! The scanner works one line at a time, so a position is the line
//! currently being scanned plus the byte column of the failing token.

use std::fmt;

/// Where a diagnostic occurred: the active source, its line counter, the
/// raw text of the line and the column the offending token started at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePosition {
    /// The include file name, or `None` for the primary source.
    pub file: Option<String>,
    /// 1-based line number within `file` (0 before any line was read).
    pub line: u32,
    /// The raw line text, including its trailing newline if it had one.
    pub text: String,
    /// 0-based byte offset of the token start within `text`.
    pub column: usize,
}

impl SourcePosition {
    /// A position inside the primary (callback-driven) source.
    pub fn primary(line: u32, text: impl Into<String>, column: usize) -> Self {
        Self {
            file: None,
            line,
            text: text.into(),
            column,
        }
    }

    /// A position inside an included file.
    pub fn in_file(file: impl Into<String>, line: u32, text: impl Into<String>, column: usize) -> Self {
        Self {
            file: Some(file.into()),
            line,
            text: text.into(),
            column,
        }
    }

    /// The line text without its line terminator.
    pub fn line_text(&self) -> &str {
        self.text.trim_end_matches(['\n', '\r'])
    }
}

impl fmt::Display for SourcePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.file {
            Some(ref file) => write!(f, "file '{}', line {}", file, self.line),
            None => write!(f, "line {}", self.line),
        }
    }
}
