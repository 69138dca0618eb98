//! Skipping of disallowed statements.
//!
//! Each construct is consumed far enough to leave the cursor on the next
//! statement, then recorded as `StmtKind::Unsupported(kind)` so the
//! evaluator can reject it by name.

use calc_ir::{Stmt, StmtKind, UnsupportedKind};
use calc_lexer::TokenKind;
use tracing::trace;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    /// Skip a simple statement (`import`, `return`, `global`, ...).
    pub(crate) fn skip_simple(&mut self, kind: UnsupportedKind) -> Stmt {
        let start = self.current_span();
        trace!(%kind, "skipping statement");
        self.advance();
        self.cursor.skip_simple_statement();
        Stmt::new(
            StmtKind::Unsupported(kind),
            start.merge(self.previous_span()),
        )
    }

    /// Skip a compound statement: the header up to its `:` and the suite.
    pub(crate) fn skip_compound(&mut self, kind: UnsupportedKind) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        trace!(%kind, "skipping compound statement");
        self.skip_header()?;
        self.skip_suite()?;
        Ok(Stmt::new(
            StmtKind::Unsupported(kind),
            start.merge(self.previous_span()),
        ))
    }

    /// `try` with its `except`/`except*`/`else`/`finally` clauses.
    pub(crate) fn skip_try(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        self.skip_header()?;
        self.skip_suite()?;
        let mut star = false;
        while matches!(
            self.current_kind(),
            TokenKind::Except | TokenKind::Else | TokenKind::Finally
        ) {
            if self.check(&TokenKind::Except) && *self.cursor.peek_kind(1) == TokenKind::Star {
                star = true;
            }
            self.skip_header()?;
            self.skip_suite()?;
        }
        let kind = if star {
            UnsupportedKind::TryStar
        } else {
            UnsupportedKind::Try
        };
        trace!(%kind, "skipped try statement");
        Ok(Stmt::new(
            StmtKind::Unsupported(kind),
            start.merge(self.previous_span()),
        ))
    }

    /// Decorator lines followed by `def`, `class` or `async def`.
    pub(crate) fn skip_decorated(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        while self.check(&TokenKind::At) {
            self.cursor.skip_simple_statement();
            self.expect(&TokenKind::Newline, "newline")?;
        }
        let stmt = match self.current_kind() {
            TokenKind::Def => self.skip_compound(UnsupportedKind::FunctionDef)?,
            TokenKind::Class => self.skip_compound(UnsupportedKind::ClassDef)?,
            TokenKind::Async if *self.cursor.peek_kind(1) == TokenKind::Def => {
                self.skip_compound(UnsupportedKind::AsyncFunctionDef)?
            }
            _ => return Err(ParseError::invalid_syntax(self.current_span())),
        };
        Ok(Stmt::new(stmt.kind, start.merge(stmt.span)))
    }

    /// `async def`, `async for`, `async with`.
    pub(crate) fn skip_async(&mut self) -> Result<Stmt, ParseError> {
        let kind = match self.cursor.peek_kind(1) {
            TokenKind::Def => UnsupportedKind::AsyncFunctionDef,
            TokenKind::For => UnsupportedKind::AsyncFor,
            TokenKind::With => UnsupportedKind::AsyncWith,
            _ => return Err(ParseError::invalid_syntax(self.current_span())),
        };
        self.skip_compound(kind)
    }

    /// Soft keyword `match`: the logical line ends in `:` and opens a block.
    pub(crate) fn is_match_statement(&self) -> bool {
        if matches!(
            self.cursor.peek_kind(1),
            TokenKind::Colon | TokenKind::Eq | TokenKind::AugAssign(_)
        ) {
            return false;
        }
        let mut depth = 0usize;
        let mut i = 1;
        loop {
            match self.cursor.peek_kind(i) {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Colon if depth == 0 => {
                    return *self.cursor.peek_kind(i + 1) == TokenKind::Newline
                        && *self.cursor.peek_kind(i + 2) == TokenKind::Indent;
                }
                TokenKind::Newline | TokenKind::Semicolon | TokenKind::EndMarker => return false,
                _ => {}
            }
            i += 1;
        }
    }

    /// Soft keyword `type`: `type Name = ...` or `type Name[...] = ...`.
    pub(crate) fn is_type_alias(&self) -> bool {
        matches!(self.cursor.peek_kind(1), TokenKind::Name(_))
            && matches!(
                self.cursor.peek_kind(2),
                TokenKind::Eq | TokenKind::LBracket
            )
    }

    /// Consume tokens through the `:` that ends a compound header.
    fn skip_header(&mut self) -> Result<(), ParseError> {
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Colon if depth == 0 => {
                    self.advance();
                    return Ok(());
                }
                TokenKind::Newline | TokenKind::EndMarker => {
                    return Err(ParseError::expected(":", self.current_span()));
                }
                _ => {}
            }
            self.advance();
        }
    }

    /// Consume an indented suite, or the rest of the header line.
    fn skip_suite(&mut self) -> Result<(), ParseError> {
        if !self.eat(&TokenKind::Newline) {
            while !matches!(
                self.current_kind(),
                TokenKind::Newline | TokenKind::EndMarker
            ) {
                self.advance();
            }
            self.eat(&TokenKind::Newline);
            return Ok(());
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedIndentedBlock("compound statement header"),
                self.current_span(),
            ));
        }
        let mut depth = 1usize;
        while depth > 0 && !self.cursor.is_at_end() {
            match self.current_kind() {
                TokenKind::Indent => depth += 1,
                TokenKind::Dedent => depth -= 1,
                _ => {}
            }
            self.advance();
        }
        Ok(())
    }
}
