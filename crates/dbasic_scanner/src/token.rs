//! Token kinds and the tokens produced by the scanner.

use dbasic_core::VmValue;
use std::borrow::Cow;
use std::fmt;

/// Single-word keywords, in the same order as [`KEYWORDS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Rem,
    Option,
    Include,
    Def,
    Dim,
    As,
    In,
    Let,
    If,
    Then,
    Else,
    Select,
    Case,
    End,
    For,
    To,
    Step,
    Next,
    Do,
    While,
    Until,
    Loop,
    Goto,
    Mod,
    And,
    Or,
    Xor,
    Not,
    Stop,
    Return,
    Input,
    Print,
    Asm,
}

/// The keyword table. Entry `i` must be the keyword whose discriminant is
/// `i`, so a keyword's display text is a direct index.
pub const KEYWORDS: [(&str, Keyword); 33] = [
    ("REM", Keyword::Rem),
    ("OPTION", Keyword::Option),
    ("INCLUDE", Keyword::Include),
    ("DEF", Keyword::Def),
    ("DIM", Keyword::Dim),
    ("AS", Keyword::As),
    ("IN", Keyword::In),
    ("LET", Keyword::Let),
    ("IF", Keyword::If),
    ("THEN", Keyword::Then),
    ("ELSE", Keyword::Else),
    ("SELECT", Keyword::Select),
    ("CASE", Keyword::Case),
    ("END", Keyword::End),
    ("FOR", Keyword::For),
    ("TO", Keyword::To),
    ("STEP", Keyword::Step),
    ("NEXT", Keyword::Next),
    ("DO", Keyword::Do),
    ("WHILE", Keyword::While),
    ("UNTIL", Keyword::Until),
    ("LOOP", Keyword::Loop),
    ("GOTO", Keyword::Goto),
    ("MOD", Keyword::Mod),
    ("AND", Keyword::And),
    ("OR", Keyword::Or),
    ("XOR", Keyword::Xor),
    ("NOT", Keyword::Not),
    ("STOP", Keyword::Stop),
    ("RETURN", Keyword::Return),
    ("INPUT", Keyword::Input),
    ("PRINT", Keyword::Print),
    ("ASM", Keyword::Asm),
];

impl Keyword {
    /// Case-insensitive lookup against the keyword table.
    pub fn lookup(word: &str) -> Option<Keyword> {
        KEYWORDS
            .iter()
            .find(|(text, _)| text.eq_ignore_ascii_case(word))
            .map(|&(_, keyword)| keyword)
    }

    /// The upper-case spelling of this keyword.
    #[inline]
    pub fn as_str(self) -> &'static str {
        KEYWORDS[self as usize].0
    }

    /// Whether this keyword may be the first word of a compound keyword.
    #[inline]
    pub fn starts_compound(self) -> bool {
        matches!(self, Keyword::End | Keyword::Do | Keyword::Loop | Keyword::Else)
    }
}

/// The classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword(Keyword),

    // Compound keywords, synthesized from two words.
    EndDef,
    EndIf,
    EndSelect,
    EndAsm,
    DoWhile,
    DoUntil,
    LoopWhile,
    LoopUntil,
    ElseIf,

    // Two-character operators.
    Le,
    Ne,
    Ge,
    Shl,
    Shr,

    Identifier,
    Number,
    String,
    Eol,
    Eof,

    /// Any other single character, returned verbatim (`+`, `(`, `<`, ...).
    Char(u8),
}

impl TokenKind {
    /// The compound keyword formed by `first` followed by `second`, if any.
    pub fn compound(first: Keyword, second: Keyword) -> Option<TokenKind> {
        let kind = match (first, second) {
            (Keyword::End, Keyword::Def) => TokenKind::EndDef,
            (Keyword::End, Keyword::If) => TokenKind::EndIf,
            (Keyword::End, Keyword::Select) => TokenKind::EndSelect,
            (Keyword::End, Keyword::Asm) => TokenKind::EndAsm,
            (Keyword::Do, Keyword::While) => TokenKind::DoWhile,
            (Keyword::Do, Keyword::Until) => TokenKind::DoUntil,
            (Keyword::Loop, Keyword::While) => TokenKind::LoopWhile,
            (Keyword::Loop, Keyword::Until) => TokenKind::LoopUntil,
            (Keyword::Else, Keyword::If) => TokenKind::ElseIf,
            _ => return None,
        };
        Some(kind)
    }

    /// The printable name used in diagnostics.
    pub fn name(self) -> Cow<'static, str> {
        let name = match self {
            TokenKind::Keyword(keyword) => keyword.as_str(),
            TokenKind::EndDef => "END DEF",
            TokenKind::EndIf => "END IF",
            TokenKind::EndSelect => "END SELECT",
            TokenKind::EndAsm => "END ASM",
            TokenKind::DoWhile => "DO WHILE",
            TokenKind::DoUntil => "DO UNTIL",
            TokenKind::LoopWhile => "LOOP WHILE",
            TokenKind::LoopUntil => "LOOP UNTIL",
            TokenKind::ElseIf => "ELSE IF",
            TokenKind::Le => "<=",
            TokenKind::Ne => "<>",
            TokenKind::Ge => ">=",
            TokenKind::Shl => "<<",
            TokenKind::Shr => ">>",
            TokenKind::Identifier => "<IDENTIFIER>",
            TokenKind::Number => "<NUMBER>",
            TokenKind::String => "<STRING>",
            TokenKind::Eol => "<EOL>",
            TokenKind::Eof => "<EOF>",
            TokenKind::Char(ch) => return Cow::Owned(format!("'{}'", char::from(ch))),
        };
        Cow::Borrowed(name)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// The printable name of a token kind.
pub fn token_name(kind: TokenKind) -> Cow<'static, str> {
    kind.name()
}

/// A scanned token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,
    /// The lexeme: identifier/keyword spelling, decoded string contents,
    /// or the digits of a number with separators and radix prefix removed.
    pub text: String,
    /// The numeric value of a NUMBER token (0 otherwise).
    pub value: VmValue,
    /// Byte offset of the token start within its line.
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, offset: usize) -> Self {
        Self {
            kind,
            text: String::new(),
            value: 0,
            offset,
        }
    }

    pub fn with_text(mut self, text: String) -> Self {
        self.text = text;
        self
    }

    pub fn with_value(mut self, value: VmValue) -> Self {
        self.value = value;
        self
    }

    /// Whether this token is the given keyword.
    #[inline]
    pub fn is_keyword(&self, keyword: Keyword) -> bool {
        self.kind == TokenKind::Keyword(keyword)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Identifier => write!(f, "{}({})", self.kind, self.text),
            TokenKind::Number => write!(f, "{}({})", self.kind, self.value),
            TokenKind::String => write!(f, "{}({:?})", self.kind, self.text),
            kind => write!(f, "{}", kind),
        }
    }
}
