//! dbasic_diagnostics: Diagnostic messages and error reporting infrastructure.
//!
//! A diagnostic is fatal to the compilation pass that raised it: the scanner
//! renders it once to a [`DiagnosticSink`] and hands the caller a
//! [`PassError`], the single condition code above the pass boundary has to
//! handle.

use dbasic_core::SourcePosition;
use std::cell::RefCell;
use std::fmt::{self, Write as _};
use std::rc::Rc;

/// A diagnostic message template with a code.
#[derive(Debug, Clone)]
pub struct DiagnosticMessage {
    /// The diagnostic code (e.g., 1003).
    pub code: u32,
    /// The message template string. May contain `{0}`, `{1}`, etc. placeholders.
    pub message: &'static str,
}

/// A realized diagnostic with resolved message text and, when the input
/// had an active source, the position it was raised at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// The diagnostic code.
    pub code: u32,
    /// The message with its placeholders substituted.
    pub message_text: String,
    /// Where the scanner was when the diagnostic was raised.
    pub position: Option<SourcePosition>,
}

impl Diagnostic {
    /// Create a new diagnostic without location info.
    pub fn new(message: &DiagnosticMessage, args: &[&str]) -> Self {
        Self {
            code: message.code,
            message_text: format_message(message.message, args),
            position: None,
        }
    }

    pub fn with_position(mut self, position: SourcePosition) -> Self {
        self.position = Some(position);
        self
    }

    /// Render the full report: the message, then the source label, the raw
    /// line and a caret under the column the failing token began at.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", self);
        if let Some(ref pos) = self.position {
            let _ = writeln!(out, "  {}", pos);
            let _ = writeln!(out, "    {}", pos.line_text());
            let _ = writeln!(out, "    {:>width$}", "^", width = pos.column + 1);
        }
        out
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message_text)
    }
}

/// Format a diagnostic message template by replacing `{0}`, `{1}`, etc. with arguments.
pub fn format_message(template: &str, args: &[&str]) -> String {
    let mut result = template.to_string();
    for (i, arg) in args.iter().enumerate() {
        result = result.replace(&format!("{{{}}}", i), arg);
    }
    result
}

/// The one way a compilation pass fails.
///
/// Every scanner operation returns `Result<_, PassError>`; by the time one
/// exists the diagnostic has already been written to the sink.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{diagnostic}")]
pub struct PassError {
    diagnostic: Diagnostic,
}

impl PassError {
    pub fn new(diagnostic: Diagnostic) -> Self {
        Self { diagnostic }
    }

    pub fn diagnostic(&self) -> &Diagnostic {
        &self.diagnostic
    }

    pub fn into_diagnostic(self) -> Diagnostic {
        self.diagnostic
    }

    /// The diagnostic code, for matching in callers and tests.
    pub fn code(&self) -> u32 {
        self.diagnostic.code
    }
}

/// Destination for rendered diagnostic text.
pub trait DiagnosticSink {
    fn emit(&mut self, text: &str);
}

/// Writes diagnostics to standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl DiagnosticSink for StderrSink {
    fn emit(&mut self, text: &str) {
        eprint!("{}", text);
    }
}

/// Accumulates diagnostic text in memory. Clones share the same buffer,
/// so a caller can keep one handle and give another to the scanner.
#[derive(Debug, Default, Clone)]
pub struct CollectSink {
    buffer: Rc<RefCell<String>>,
}

impl CollectSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far.
    pub fn contents(&self) -> String {
        self.buffer.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.borrow().is_empty()
    }
}

impl DiagnosticSink for CollectSink {
    fn emit(&mut self, text: &str) {
        self.buffer.borrow_mut().push_str(text);
    }
}

// ============================================================================
// Diagnostic Messages
// ============================================================================

pub mod messages {
    use super::*;

    macro_rules! diag {
        ($code:expr, $msg:expr) => {
            DiagnosticMessage { code: $code, message: $msg }
        };
    }

    // ========================================================================
    // Lexical errors (1000-1099)
    // ========================================================================
    pub const IDENTIFIER_TOO_LONG: DiagnosticMessage = diag!(1001, "Identifier too long");
    pub const STRING_TOO_LONG: DiagnosticMessage = diag!(1002, "String too long");
    pub const UNTERMINATED_STRING: DiagnosticMessage = diag!(1003, "unterminated string");
    pub const EXPECTING_CLOSING_QUOTE: DiagnosticMessage = diag!(1004, "Expecting a closing single quote");
    pub const EXPECTING_TOKEN: DiagnosticMessage = diag!(1005, "Expecting '{0}', found '{1}'");
    pub const NUMBER_OUT_OF_RANGE: DiagnosticMessage = diag!(1006, "number literal out of range: {0}");

    // ========================================================================
    // Input errors (1100-1199)
    // ========================================================================
    pub const READ_ERROR: DiagnosticMessage = diag!(1101, "error reading {0}: {1}");
    pub const INCLUDE_NOT_FOUND: DiagnosticMessage = diag!(1102, "include file not found: {0}");
}
