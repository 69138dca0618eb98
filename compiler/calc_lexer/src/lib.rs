//! Lexer for the calc scripting language using logos.
//!
//! Two layers:
//! - `raw_token`: logos DFA over the source (keywords, operators, numbers,
//!   string extents, names)
//! - `cooker`: bracket tracking, NEWLINE/INDENT/DEDENT synthesis and literal
//!   cooking (escape processing, `_` removal)
//!
//! f-string bodies are passed through uncooked; the parser splits them and
//! lexes each replacement field with [`lex_expression`].

mod cooker;
mod escape;
mod lex_error;
mod raw_token;
mod token;

pub use escape::{unescape_bytes, unescape_str};
pub use lex_error::{LexError, LexErrorKind};
pub use token::{Token, TokenKind};

use cooker::{Cooker, LexMode};

/// Lex a whole script.
///
/// The token list always ends with `EndMarker`, preceded by a `Newline` when
/// the last line holds tokens and by one `Dedent` per open block.
pub fn lex(source: &str) -> Result<Vec<Token>, LexError> {
    Cooker::new(source, 0, LexMode::Module).run()
}

/// Lex a free-standing expression fragment whose first byte sits at
/// `base` in the enclosing source. Newlines carry no meaning here.
pub fn lex_expression(fragment: &str, base: u32) -> Result<Vec<Token>, LexError> {
    Cooker::new(fragment, base, LexMode::Expression).run()
}
