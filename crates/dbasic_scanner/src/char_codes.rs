//! Byte classification used by the scanner.
//!
//! The scanner is byte-oriented: every test here is ASCII-only, matching
//! the C locale classification the BASIC dialect was defined against.

pub const LINE_FEED: u8 = b'\n';
pub const BACKSLASH: u8 = b'\\';
pub const DOUBLE_QUOTE: u8 = b'"';
pub const SINGLE_QUOTE: u8 = b'\'';
pub const SLASH: u8 = b'/';
pub const ASTERISK: u8 = b'*';
pub const UNDERSCORE: u8 = b'_';

/// Check if a byte is whitespace (`isspace` in the C locale).
#[inline]
pub fn is_space(ch: u8) -> bool {
    matches!(ch, b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C)
}

/// Check if a byte is a decimal digit.
#[inline]
pub fn is_digit(ch: u8) -> bool {
    ch.is_ascii_digit()
}

/// Check if a byte is a hex digit.
#[inline]
pub fn is_hex_digit(ch: u8) -> bool {
    ch.is_ascii_hexdigit()
}

/// Check if a byte is a binary digit.
#[inline]
pub fn is_binary_digit(ch: u8) -> bool {
    ch == b'0' || ch == b'1'
}

/// Check if a byte can appear in an identifier. Digits are included; the
/// classifier routes a leading digit to number scanning first.
#[inline]
pub fn is_identifier_char(ch: u8) -> bool {
    ch.is_ascii_alphanumeric() || ch == UNDERSCORE
}
