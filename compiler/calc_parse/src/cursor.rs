//! Token cursor for navigating the token stream.
//!
//! Provides low-level token access, lookahead, and consumption methods.

use std::mem;

use calc_ir::Span;
use calc_lexer::{Token, TokenKind};

use crate::ParseError;

/// Cursor over a lexed token list.
///
/// Invariant: the list is non-empty and ends with `EndMarker`, and the
/// position never moves past it.
pub struct Cursor {
    tokens: Vec<Token>,
    pos: usize,
}

impl Cursor {
    /// Create a cursor at the start of `tokens`, appending an `EndMarker`
    /// if the list lacks one.
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if !matches!(tokens.last(), Some(t) if t.kind == TokenKind::EndMarker) {
            let end = tokens.last().map_or(Span::DUMMY, |t| t.span);
            tokens.push(Token::new(TokenKind::EndMarker, Span::new(end.end, end.end)));
        }
        Cursor { tokens, pos: 0 }
    }

    /// Current position in the token stream.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Get the current token.
    #[inline]
    pub fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    #[inline]
    pub fn current_kind(&self) -> &TokenKind {
        &self.current().kind
    }

    #[inline]
    pub fn current_span(&self) -> Span {
        self.current().span
    }

    /// Span of the most recently consumed token.
    #[inline]
    pub fn previous_span(&self) -> Span {
        if self.pos > 0 {
            self.tokens[self.pos - 1].span
        } else {
            Span::DUMMY
        }
    }

    /// Token kind `offset` tokens ahead, saturating at `EndMarker`.
    pub fn peek_kind(&self, offset: usize) -> &TokenKind {
        let idx = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[idx].kind
    }

    #[inline]
    pub fn is_at_end(&self) -> bool {
        *self.current_kind() == TokenKind::EndMarker
    }

    /// Check the current token's variant, ignoring payloads.
    #[inline]
    pub fn check(&self, kind: &TokenKind) -> bool {
        mem::discriminant(self.current_kind()) == mem::discriminant(kind)
    }

    /// Check if the current token is the name `text` (soft keywords).
    pub fn check_soft_keyword(&self, text: &str) -> bool {
        matches!(self.current_kind(), TokenKind::Name(name) if name == text)
    }

    /// Advance to the next token and return the consumed token.
    #[inline]
    pub fn advance(&mut self) -> &Token {
        let current = self.pos;
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        &self.tokens[current]
    }

    /// Consume the current token if it matches `kind`.
    pub fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    /// Consume a token of `kind` or fail with "expected '<what>'".
    pub fn expect(&mut self, kind: &TokenKind, what: &'static str) -> Result<Span, ParseError> {
        if self.check(kind) {
            Ok(self.advance().span)
        } else {
            Err(self.make_expect_error(what))
        }
    }

    #[cold]
    #[inline(never)]
    fn make_expect_error(&self, what: &'static str) -> ParseError {
        if self.is_at_end() || *self.current_kind() == TokenKind::Newline {
            ParseError::expected(what, self.current_span())
        } else {
            ParseError::invalid_syntax(self.current_span())
        }
    }

    /// Consume a name token, returning its text.
    pub fn expect_name(&mut self) -> Result<(String, Span), ParseError> {
        if let TokenKind::Name(name) = self.current_kind() {
            let name = name.clone();
            let span = self.advance().span;
            Ok((name, span))
        } else {
            Err(ParseError::invalid_syntax(self.current_span()))
        }
    }

    /// Skip tokens up to (not including) the next `Newline` or `;` at the
    /// current logical line; brackets are already balanced by the lexer.
    pub fn skip_simple_statement(&mut self) {
        while !matches!(
            self.current_kind(),
            TokenKind::Newline | TokenKind::Semicolon | TokenKind::EndMarker
        ) {
            self.advance();
        }
    }
}
