//! dbasic_scanner: Scanner and source-file management for the dbasic compiler.
//!
//! Turns a primary program source plus nested `INCLUDE` files into the
//! token stream consumed by the recursive-descent parser:
//! - line-at-a-time input from a stack of sources, with include deduplication
//! - `//` and `/* */` comment removal, including comments spanning lines
//! - keyword and compound-keyword (`END IF`, `DO WHILE`, ...) recognition
//! - decimal, hex and binary numbers, character and string literals
//! - a one-token lookahead slot shared with the parser
//!
//! Every operation returns `Result<_, PassError>`: a diagnostic ends the
//! current compilation pass.

mod char_codes;
mod context;
mod input;
mod reader;
mod scanner;
mod source;
mod stream;
mod token;

pub use context::ParseContext;
pub use dbasic_diagnostics::PassError;
pub use input::IncludeStatus;
pub use source::{
    FileLineReader, FileSource, IncludeResolver, LineReader, MemoryResolver, PrimarySource,
    SearchPathResolver, StringSource,
};
pub use stream::Tokens;
pub use token::{token_name, Keyword, Token, TokenKind, KEYWORDS};
