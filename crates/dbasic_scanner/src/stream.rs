//! A token stream over the whole input.
//!
//! The parser normally drives [`ParseContext::get_line`] itself. Tools that
//! just want every token (dumpers, tests, benchmarks) can iterate instead:
//! lines are fetched as each one ends, and a final EOF token follows the
//! last line of the primary source.

use crate::context::ParseContext;
use crate::token::{Token, TokenKind};
use dbasic_diagnostics::PassError;

/// Iterator returned by [`ParseContext::tokens`].
pub struct Tokens<'a> {
    ctx: &'a mut ParseContext,
    need_line: bool,
    done: bool,
}

impl Iterator for Tokens<'_> {
    type Item = Result<Token, PassError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.need_line {
            match self.ctx.get_line() {
                Ok(true) => self.need_line = false,
                Ok(false) => {
                    self.done = true;
                    return Some(Ok(Token::new(TokenKind::Eof, 0)));
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err));
                }
            }
        }
        let result = self.ctx.get_token();
        match result {
            Ok(ref token) if token.kind == TokenKind::Eol => self.need_line = true,
            Ok(_) => {}
            Err(_) => self.done = true,
        }
        Some(result)
    }
}

impl ParseContext {
    /// Iterate over the tokens of every remaining line, ending with EOF.
    pub fn tokens(&mut self) -> Tokens<'_> {
        Tokens {
            ctx: self,
            need_line: true,
            done: false,
        }
    }

    /// Collect every remaining token, ending with EOF.
    pub fn scan_all(&mut self) -> Result<Vec<Token>, PassError> {
        self.tokens().collect()
    }
}
