//! The per-compilation scanner state and the parser-facing entry points.
//!
//! A [`ParseContext`] owns everything one compilation needs: the input
//! stack, the included-file registry, the current line and cursor, the
//! one-token lookahead slot and the block-comment state. Independent
//! compilations use independent contexts.

use crate::input::LineSource;
use crate::reader::LastRead;
use crate::source::{IncludeResolver, PrimarySource, SearchPathResolver};
use crate::token::{Token, TokenKind};
use dbasic_core::{OrderedSet, SourcePosition};
use dbasic_diagnostics::messages::EXPECTING_TOKEN;
use dbasic_diagnostics::{Diagnostic, DiagnosticMessage, DiagnosticSink, PassError, StderrSink};
use dbasic_options::ScanOptions;
use tracing::debug;

/// Scanner state for one compilation.
pub struct ParseContext {
    pub(crate) options: ScanOptions,
    /// Input stack, bottom first. Entry 0 is always the primary source.
    pub(crate) stack: Vec<LineSource>,
    /// Names of every file included during the current pass.
    pub(crate) included: OrderedSet<String>,
    pub(crate) resolver: Box<dyn IncludeResolver>,
    sink: Box<dyn DiagnosticSink>,
    /// The current line, always newline-terminated once fetched.
    pub(crate) line: Vec<u8>,
    pub(crate) cursor: usize,
    pub(crate) last_read: LastRead,
    /// Column the most recent token started at.
    pub(crate) token_start: usize,
    pub(crate) in_comment: bool,
    saved: Option<Token>,
}

impl ParseContext {
    /// Create a context reading `primary`, resolving includes against the
    /// search paths in `options` and reporting to standard error.
    pub fn new(primary: impl PrimarySource + 'static, options: ScanOptions) -> Self {
        let resolver = SearchPathResolver::new(options.include_paths.clone());
        Self {
            options,
            stack: vec![LineSource::primary(Box::new(primary))],
            included: OrderedSet::new(),
            resolver: Box::new(resolver),
            sink: Box::new(StderrSink),
            line: Vec::new(),
            cursor: 0,
            last_read: LastRead::Fresh,
            token_start: 0,
            in_comment: false,
            saved: None,
        }
    }

    pub fn with_resolver(mut self, resolver: impl IncludeResolver + 'static) -> Self {
        self.resolver = Box::new(resolver);
        self
    }

    pub fn with_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.sink = Box::new(sink);
        self
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    // ========================================================================
    // Token cache
    // ========================================================================

    /// Get the next token: the saved lookahead token if there is one,
    /// otherwise a freshly scanned token from the current line.
    pub fn get_token(&mut self) -> Result<Token, PassError> {
        match self.saved.take() {
            Some(token) => Ok(token),
            None => self.next_token(),
        }
    }

    /// Push `token` back so the next [`get_token`](Self::get_token) returns it.
    ///
    /// # Panics
    ///
    /// If a token is already saved; the slot holds exactly one.
    pub fn save_token(&mut self, token: Token) {
        assert!(
            self.saved.is_none(),
            "save_token called with a token already pending"
        );
        self.saved = Some(token);
    }

    /// The pending lookahead token, if any.
    pub fn saved_token(&self) -> Option<&Token> {
        self.saved.as_ref()
    }

    /// Check that `token` is of the `required` kind.
    pub fn require_token(&mut self, token: Token, required: TokenKind) -> Result<Token, PassError> {
        if token.kind != required {
            self.token_start = token.offset;
            return Err(self.error(&EXPECTING_TOKEN, &[&required.name(), &token.kind.name()]));
        }
        Ok(token)
    }

    /// Get the next token and check that it is of the `required` kind.
    pub fn fetch_and_require(&mut self, required: TokenKind) -> Result<Token, PassError> {
        let token = self.get_token()?;
        self.require_token(token, required)
    }

    pub(crate) fn clear_saved_token(&mut self) {
        self.saved = None;
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Where the scanner is: the active source, its line number, the raw
    /// line text and the column of the current token.
    pub fn current_position(&self) -> SourcePosition {
        let text: String = self.line.iter().copied().map(char::from).collect();
        match self.stack.last() {
            Some(LineSource::Included {
                entry, line_number, ..
            }) => {
                let name = self.included.get_index(*entry).cloned().unwrap_or_default();
                SourcePosition::in_file(name, *line_number, text, self.token_start)
            }
            Some(LineSource::Primary { line_number, .. }) => {
                SourcePosition::primary(*line_number, text, self.token_start)
            }
            None => SourcePosition::primary(0, text, self.token_start),
        }
    }

    /// Report a fatal diagnostic at the current position.
    ///
    /// The rendered report goes to the sink, every open include file is
    /// closed, and the returned [`PassError`] must be propagated to the
    /// pass boundary: nothing scans after it.
    #[must_use = "the pass is over; return the error"]
    pub fn error(&mut self, message: &DiagnosticMessage, args: &[&str]) -> PassError {
        let diagnostic = Diagnostic::new(message, args).with_position(self.current_position());
        debug!(code = diagnostic.code, message = %diagnostic.message_text, "fatal diagnostic");
        self.sink.emit(&diagnostic.render());
        self.close_all();
        PassError::new(diagnostic)
    }

    /// Run one compilation pass: rewind the input, run `pass`, and make
    /// sure no include file stays open if it fails.
    pub fn run_pass<T>(
        &mut self,
        pass: impl FnOnce(&mut Self) -> Result<T, PassError>,
    ) -> Result<T, PassError> {
        self.rewind_for_new_pass()?;
        debug!("pass started");
        let result = pass(self);
        if let Err(ref err) = result {
            self.close_all();
            debug!(code = err.code(), "pass failed");
        }
        result
    }
}
