//! The token classifier.
//!
//! Scans one token from the current line: literals, operators,
//! identifiers and keywords, including the two-word compound keywords
//! (`END IF`, `DO WHILE`, `ELSE IF`, ...) recognized by speculative
//! lookahead with exact rollback.

use crate::char_codes::*;
use crate::context::ParseContext;
use crate::token::{Keyword, Token, TokenKind};
use dbasic_core::VmValue;
use dbasic_diagnostics::messages::{
    EXPECTING_CLOSING_QUOTE, IDENTIFIER_TOO_LONG, NUMBER_OUT_OF_RANGE, STRING_TOO_LONG,
    UNTERMINATED_STRING,
};
use dbasic_diagnostics::PassError;
use dbasic_options::LiteralOverflow;
use tracing::trace;

/// Radix of a numeric literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Radix {
    Binary,
    Decimal,
    Hex,
}

impl Radix {
    fn base(self) -> u32 {
        match self {
            Radix::Binary => 2,
            Radix::Decimal => 10,
            Radix::Hex => 16,
        }
    }

    fn is_digit(self, ch: u8) -> bool {
        match self {
            Radix::Binary => is_binary_digit(ch),
            Radix::Decimal => is_digit(ch),
            Radix::Hex => is_hex_digit(ch),
        }
    }
}

impl ParseContext {
    /// Scan the next token from the current line. The end of the line
    /// yields [`TokenKind::Eol`]; fetching the next line is the caller's job.
    pub(crate) fn next_token(&mut self) -> Result<Token, PassError> {
        let ch = self.skip_spaces();
        self.token_start = match ch {
            Some(_) => self.cursor.saturating_sub(1),
            None => self.cursor,
        };
        let start = self.token_start;

        let Some(ch) = ch else {
            return Ok(Token::new(TokenKind::Eol, start));
        };

        let token = match ch {
            DOUBLE_QUOTE => self.scan_string()?,
            SINGLE_QUOTE => self.scan_char_literal()?,
            b'<' => {
                let kind = match self.next_char() {
                    Some(b'=') => TokenKind::Le,
                    Some(b'>') => TokenKind::Ne,
                    Some(b'<') => TokenKind::Shl,
                    _ => {
                        self.push_back();
                        TokenKind::Char(b'<')
                    }
                };
                Token::new(kind, start)
            }
            b'>' => {
                let kind = match self.next_char() {
                    Some(b'=') => TokenKind::Ge,
                    Some(b'>') => TokenKind::Shr,
                    _ => {
                        self.push_back();
                        TokenKind::Char(b'>')
                    }
                };
                Token::new(kind, start)
            }
            b'0' => match self.next_char() {
                Some(b'x') | Some(b'X') => self.scan_number(Radix::Hex, String::new())?,
                Some(b'b') | Some(b'B') => self.scan_number(Radix::Binary, String::new())?,
                _ => {
                    self.push_back();
                    self.scan_number(Radix::Decimal, String::from("0"))?
                }
            },
            _ if is_digit(ch) => self.scan_number(Radix::Decimal, char::from(ch).to_string())?,
            _ if is_identifier_char(ch) => self.scan_word(ch)?,
            _ => Token::new(TokenKind::Char(ch), start),
        };
        Ok(token)
    }

    /// Scan an identifier or keyword, collapsing a compound keyword when
    /// the next word completes one.
    fn scan_word(&mut self, first: u8) -> Result<Token, PassError> {
        let start = self.token_start;
        let (kind, text) = self.scan_identifier(first)?;

        if let TokenKind::Keyword(keyword) = kind {
            if keyword.starts_compound() {
                if let Some((compound, second)) = self.scan_compound_suffix(keyword)? {
                    trace!(first = %text, second = %second, "compound keyword");
                    return Ok(Token::new(compound, start).with_text(format!("{} {}", text, second)));
                }
            }
        }
        Ok(Token::new(kind, start).with_text(text))
    }

    /// Look past whitespace for a second word completing a compound
    /// keyword that begins with `first`. On a miss the reader is restored
    /// to just after the first word.
    fn scan_compound_suffix(&mut self, first: Keyword) -> Result<Option<(TokenKind, String)>, PassError> {
        self.try_scan(|ctx| {
            let ch = match ctx.skip_spaces() {
                Some(ch) if is_identifier_char(ch) => ch,
                _ => return Ok(None),
            };
            let (kind, text) = ctx.scan_identifier(ch)?;
            Ok(match kind {
                TokenKind::Keyword(second) => TokenKind::compound(first, second).map(|k| (k, text)),
                _ => None,
            })
        })
    }

    /// Scan the rest of an identifier starting with `first` and classify it.
    fn scan_identifier(&mut self, first: u8) -> Result<(TokenKind, String), PassError> {
        let mut text = String::new();
        text.push(char::from(first));
        while let Some(ch) = self.next_char() {
            if !is_identifier_char(ch) {
                break;
            }
            if text.len() + 1 > self.options.max_token {
                return Err(self.error(&IDENTIFIER_TOO_LONG, &[]));
            }
            text.push(char::from(ch));
        }
        self.push_back();

        let kind = match Keyword::lookup(&text) {
            Some(keyword) => TokenKind::Keyword(keyword),
            None => TokenKind::Identifier,
        };
        Ok((kind, text))
    }

    /// Scan the digits of a number. `_` separators are skipped wherever
    /// they appear; the radix prefix has already been consumed.
    fn scan_number(&mut self, radix: Radix, mut digits: String) -> Result<Token, PassError> {
        let start = self.token_start;
        while let Some(ch) = self.next_char() {
            if radix.is_digit(ch) {
                digits.push(char::from(ch));
            } else if ch != UNDERSCORE {
                break;
            }
        }
        self.push_back();

        let value = self.literal_value(radix, &digits)?;
        Ok(Token::new(TokenKind::Number, start)
            .with_text(digits)
            .with_value(value))
    }

    /// Convert validated digits to a VM value, wrapping at 32 bits unless
    /// the options ask for out-of-range literals to be rejected.
    fn literal_value(&mut self, radix: Radix, digits: &str) -> Result<VmValue, PassError> {
        let base = radix.base();
        let mut value: u32 = 0;
        let mut overflow = false;
        for ch in digits.chars() {
            let digit = ch.to_digit(base).unwrap_or(0);
            let (shifted, o1) = value.overflowing_mul(base);
            let (sum, o2) = shifted.overflowing_add(digit);
            overflow |= o1 || o2;
            value = sum;
        }
        // Decimal literals are signed; hex and binary may use the sign bit.
        if radix == Radix::Decimal && value > VmValue::MAX as u32 {
            overflow = true;
        }

        if overflow && self.options.literal_overflow == LiteralOverflow::Error {
            return Err(self.error(&NUMBER_OUT_OF_RANGE, &[digits]));
        }
        Ok(value as VmValue)
    }

    /// Scan a string literal; the opening quote has been consumed. Comments
    /// are not recognized inside strings.
    fn scan_string(&mut self) -> Result<Token, PassError> {
        let start = self.token_start;
        let mut text = String::new();
        let mut len = 0;
        loop {
            let ch = match self.next_raw() {
                Some(DOUBLE_QUOTE) => break,
                Some(ch) => ch,
                None => return Err(self.error(&UNTERMINATED_STRING, &[])),
            };
            len += 1;
            if len > self.options.max_token {
                return Err(self.error(&STRING_TOO_LONG, &[]));
            }
            let ch = if ch == BACKSLASH { self.escaped_char() } else { ch };
            text.push(char::from(ch));
        }
        Ok(Token::new(TokenKind::String, start).with_text(text))
    }

    /// Scan a character literal; the opening quote has been consumed. The
    /// token is a NUMBER whose value is the character code.
    fn scan_char_literal(&mut self) -> Result<Token, PassError> {
        let start = self.token_start;
        let ch = match self.next_raw() {
            Some(BACKSLASH) => self.escaped_char(),
            Some(ch) => ch,
            None => return Err(self.error(&EXPECTING_CLOSING_QUOTE, &[])),
        };
        if self.next_raw() != Some(SINGLE_QUOTE) {
            return Err(self.error(&EXPECTING_CLOSING_QUOTE, &[]));
        }
        Ok(Token::new(TokenKind::Number, start)
            .with_text(char::from(ch).to_string())
            .with_value(VmValue::from(ch)))
    }

    /// Decode the character after a backslash. Anything other than `n`,
    /// `r` or `t` stands for itself; a backslash at the very end of the
    /// input stands for a backslash.
    fn escaped_char(&mut self) -> u8 {
        match self.next_raw() {
            Some(b'n') => b'\n',
            Some(b'r') => b'\r',
            Some(b't') => b'\t',
            Some(ch) => ch,
            None => BACKSLASH,
        }
    }
}
