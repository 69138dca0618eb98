//! Recursive descent parser for the calc scripting language.
//!
//! Produces the closed `calc_ir` syntax tree. Constructs the sandbox does
//! not run (definitions, imports, exception handling, coroutines, ...) are
//! parsed just far enough to be skipped and recorded as `Unsupported`.

mod cursor;
mod error;
mod grammar;

pub use cursor::Cursor;
pub use error::{ParseError, ParseErrorKind};

use calc_ir::{Module, Span};
use calc_lexer::{Token, TokenKind};

/// Parser state.
pub struct Parser {
    cursor: Cursor,
    /// f-string nesting depth of this parser (0 for a script).
    fstring_depth: u32,
}

impl Parser {
    /// Create a parser over a lexed token list.
    pub fn new(tokens: Vec<Token>) -> Self {
        Parser {
            cursor: Cursor::new(tokens),
            fstring_depth: 0,
        }
    }

    #[inline]
    fn current_kind(&self) -> &TokenKind {
        self.cursor.current_kind()
    }

    #[inline]
    fn current_span(&self) -> Span {
        self.cursor.current_span()
    }

    #[inline]
    fn previous_span(&self) -> Span {
        self.cursor.previous_span()
    }

    #[inline]
    fn check(&self, kind: &TokenKind) -> bool {
        self.cursor.check(kind)
    }

    #[inline]
    fn eat(&mut self, kind: &TokenKind) -> bool {
        self.cursor.eat(kind)
    }

    #[inline]
    fn advance(&mut self) -> Span {
        self.cursor.advance().span
    }

    #[inline]
    fn expect(&mut self, kind: &TokenKind, what: &'static str) -> Result<Span, ParseError> {
        self.cursor.expect(kind, what)
    }

    /// Parse a whole script.
    pub fn parse_module(&mut self) -> Result<Module, ParseError> {
        let mut body = Vec::new();
        while !self.cursor.is_at_end() {
            if self.check(&TokenKind::Indent) {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedIndent,
                    self.current_span(),
                ));
            }
            self.parse_statement(&mut body)?;
        }
        Ok(Module { body })
    }
}

/// Lex and parse a script.
#[tracing::instrument(level = "debug", skip_all, fields(len = source.len()))]
pub fn parse(source: &str) -> Result<Module, ParseError> {
    let tokens = calc_lexer::lex(source)?;
    tracing::trace!(tokens = tokens.len(), "lexed");
    let module = Parser::new(tokens).parse_module()?;
    tracing::debug!(statements = module.body.len(), "parsed module");
    Ok(module)
}

#[cfg(test)]
mod tests;
