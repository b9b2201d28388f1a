//! The character reader: raw bytes from the current line, comment
//! elision, and single-character pushback.

use crate::char_codes::{is_space, ASTERISK, SLASH};
use crate::context::ParseContext;
use dbasic_diagnostics::PassError;
use memchr::memmem;

/// What the most recent read did, so that pushback undoes exactly it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LastRead {
    /// Nothing read since the line was loaded or the reader reset.
    Fresh,
    /// A byte was consumed.
    Consumed,
    /// The read hit the end of the line; nothing was consumed.
    AtEnd,
    /// The previous byte was already pushed back.
    PushedBack,
}

/// A saved reader position for speculative scanning.
#[derive(Debug, Clone, Copy)]
pub(crate) struct ReaderMark {
    cursor: usize,
    in_comment: bool,
    last_read: LastRead,
}

impl ParseContext {
    /// Next byte of the current line, without comment handling.
    pub(crate) fn next_raw(&mut self) -> Option<u8> {
        match self.line.get(self.cursor).copied() {
            Some(ch) => {
                self.cursor += 1;
                self.last_read = LastRead::Consumed;
                Some(ch)
            }
            None => {
                self.last_read = LastRead::AtEnd;
                None
            }
        }
    }

    /// Un-read the byte returned by the last read. A read that hit the end
    /// of the line consumed nothing, so pushing it back is a no-op.
    ///
    /// # Panics
    ///
    /// If the previous byte was already pushed back; pushback is one level deep.
    pub fn push_back(&mut self) {
        assert!(
            self.last_read != LastRead::PushedBack,
            "character pushback is limited to one level"
        );
        if self.last_read == LastRead::Consumed {
            self.cursor -= 1;
            self.last_read = LastRead::PushedBack;
        }
    }

    /// Next byte with `//` and `/* */` comments removed, or `None` at the
    /// end of the line.
    ///
    /// A block comment left open at the end of a line stays open: stripping
    /// resumes at the start of the next line.
    pub fn next_char(&mut self) -> Option<u8> {
        if self.in_comment {
            if !self.skip_block_comment() {
                return None;
            }
            self.in_comment = false;
        }

        loop {
            let ch = self.next_raw()?;
            if ch != SLASH {
                return Some(ch);
            }
            match self.next_raw() {
                Some(SLASH) => {
                    self.cursor = self.line.len();
                    self.last_read = LastRead::AtEnd;
                    return None;
                }
                Some(ASTERISK) => {
                    if !self.skip_block_comment() {
                        self.in_comment = true;
                        return None;
                    }
                }
                Some(_) => {
                    self.push_back();
                    self.last_read = LastRead::Consumed;
                    return Some(SLASH);
                }
                None => {
                    self.last_read = LastRead::Consumed;
                    return Some(SLASH);
                }
            }
        }
    }

    /// Skip whitespace and return the first non-blank byte.
    pub fn skip_spaces(&mut self) -> Option<u8> {
        loop {
            match self.next_char() {
                Some(ch) if is_space(ch) => continue,
                other => return other,
            }
        }
    }

    /// Skip past the `*/` closing the current block comment. Returns
    /// `false` if the line ends first.
    fn skip_block_comment(&mut self) -> bool {
        let rest = self.line.get(self.cursor..).unwrap_or(&[]);
        match memmem::find(rest, b"*/") {
            Some(idx) => {
                self.cursor += idx + 2;
                self.last_read = LastRead::Consumed;
                true
            }
            None => {
                self.cursor = self.line.len();
                self.last_read = LastRead::AtEnd;
                false
            }
        }
    }

    pub(crate) fn mark(&self) -> ReaderMark {
        ReaderMark {
            cursor: self.cursor,
            in_comment: self.in_comment,
            last_read: self.last_read,
        }
    }

    pub(crate) fn reset_to(&mut self, mark: ReaderMark) {
        self.cursor = mark.cursor;
        self.in_comment = mark.in_comment;
        self.last_read = mark.last_read;
    }

    /// Try scanning: save the reader position, call `f`, and restore the
    /// position if it produced nothing.
    pub(crate) fn try_scan<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, PassError>,
    ) -> Result<Option<T>, PassError> {
        let mark = self.mark();
        let result = f(self)?;
        if result.is_none() {
            self.reset_to(mark);
        }
        Ok(result)
    }
}
