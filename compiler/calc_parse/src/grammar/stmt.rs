//! Statement parsing.

use calc_ir::{Expr, ExprKind, Stmt, StmtKind, UnsupportedKind};
use calc_lexer::TokenKind;
use tracing::trace;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    /// Parse one statement line (or compound statement) into `out`.
    ///
    /// Simple statements separated by `;` produce several entries.
    pub(crate) fn parse_statement(&mut self, out: &mut Vec<Stmt>) -> Result<(), ParseError> {
        match self.current_kind() {
            TokenKind::If => out.push(self.parse_if()?),
            TokenKind::While => out.push(self.parse_while()?),
            TokenKind::For => out.push(self.parse_for()?),
            TokenKind::Def => out.push(self.skip_compound(UnsupportedKind::FunctionDef)?),
            TokenKind::Class => out.push(self.skip_compound(UnsupportedKind::ClassDef)?),
            TokenKind::With => out.push(self.skip_compound(UnsupportedKind::With)?),
            TokenKind::Try => out.push(self.skip_try()?),
            TokenKind::At => out.push(self.skip_decorated()?),
            TokenKind::Async => out.push(self.skip_async()?),
            TokenKind::Name(name) if name == "match" && self.is_match_statement() => {
                out.push(self.skip_compound(UnsupportedKind::Match)?);
            }
            TokenKind::Elif | TokenKind::Else | TokenKind::Except | TokenKind::Finally => {
                return Err(ParseError::invalid_syntax(self.current_span()));
            }
            _ => self.parse_simple_statements(out)?,
        }
        Ok(())
    }

    /// `simple_stmt (';' simple_stmt)* [';'] NEWLINE`
    pub(crate) fn parse_simple_statements(
        &mut self,
        out: &mut Vec<Stmt>,
    ) -> Result<(), ParseError> {
        loop {
            out.push(self.parse_simple_statement()?);
            if !self.eat(&TokenKind::Semicolon) {
                break;
            }
            if self.check(&TokenKind::Newline) || self.cursor.is_at_end() {
                break;
            }
        }
        if !self.eat(&TokenKind::Newline) && !self.cursor.is_at_end() {
            return Err(ParseError::invalid_syntax(self.current_span()));
        }
        Ok(())
    }

    fn parse_simple_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let kind = match self.current_kind() {
            TokenKind::Pass => {
                self.advance();
                StmtKind::Pass
            }
            TokenKind::Break => {
                self.advance();
                StmtKind::Break
            }
            TokenKind::Continue => {
                self.advance();
                StmtKind::Continue
            }
            TokenKind::Del => {
                self.advance();
                StmtKind::Delete {
                    targets: self.parse_del_targets()?,
                }
            }
            TokenKind::Return => return Ok(self.skip_simple(UnsupportedKind::Return)),
            TokenKind::Import => return Ok(self.skip_simple(UnsupportedKind::Import)),
            TokenKind::From => return Ok(self.skip_simple(UnsupportedKind::ImportFrom)),
            TokenKind::Raise => return Ok(self.skip_simple(UnsupportedKind::Raise)),
            TokenKind::Assert => return Ok(self.skip_simple(UnsupportedKind::Assert)),
            TokenKind::Global => return Ok(self.skip_simple(UnsupportedKind::Global)),
            TokenKind::Nonlocal => return Ok(self.skip_simple(UnsupportedKind::Nonlocal)),
            TokenKind::Name(name) if name == "type" && self.is_type_alias() => {
                return Ok(self.skip_simple(UnsupportedKind::TypeAlias));
            }
            _ => return self.parse_expression_statement(),
        };
        Ok(Stmt::new(kind, start.merge(self.previous_span())))
    }

    /// Expression statement, assignment chain, augmented or annotated
    /// assignment.
    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let start = self.current_span();
        let first = self.parse_star_expressions_or_yield()?;

        if self.check(&TokenKind::Colon) {
            trace!("skipping annotated assignment");
            self.cursor.skip_simple_statement();
            return Ok(Stmt::new(
                StmtKind::Unsupported(UnsupportedKind::AnnAssign),
                start.merge(self.previous_span()),
            ));
        }

        if let TokenKind::AugAssign(symbol) = *self.current_kind() {
            let op_span = self.advance();
            let op = Self::aug_assign_op(symbol)
                .ok_or_else(|| ParseError::invalid_syntax(op_span))?;
            let value = self.parse_star_expressions_or_yield()?;
            return Ok(Stmt::new(
                StmtKind::AugAssign {
                    target: first,
                    op,
                    value,
                },
                start.merge(self.previous_span()),
            ));
        }

        if self.check(&TokenKind::Eq) {
            let mut targets = vec![first];
            let value = loop {
                self.advance();
                let next = self.parse_star_expressions_or_yield()?;
                if !self.check(&TokenKind::Eq) {
                    break next;
                }
                targets.push(next);
            };
            return Ok(Stmt::new(
                StmtKind::Assign { targets, value },
                start.merge(self.previous_span()),
            ));
        }

        Ok(Stmt::new(StmtKind::Expr(first), start.merge(self.previous_span())))
    }

    /// `del_target (',' del_target)* [',']`
    fn parse_del_targets(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut targets = vec![self.parse_bitwise_or()?];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            targets.push(self.parse_bitwise_or()?);
        }
        Ok(targets)
    }

    /// `if`/`elif` chain; `elif` becomes a nested `If` in `orelse`.
    fn parse_if(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance();
        let test = self.parse_named_expression()?;
        self.expect(&TokenKind::Colon, ":")?;
        let body = self.parse_block("'if' statement")?;
        let orelse = if self.check(&TokenKind::Elif) {
            vec![self.parse_if()?]
        } else {
            self.parse_else_block()?
        };
        Ok(Stmt::new(
            StmtKind::If { test, body, orelse },
            start.merge(self.previous_span()),
        ))
    }

    fn parse_while(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance();
        let test = self.parse_named_expression()?;
        self.expect(&TokenKind::Colon, ":")?;
        let body = self.parse_block("'while' statement")?;
        let orelse = self.parse_else_block()?;
        Ok(Stmt::new(
            StmtKind::While { test, body, orelse },
            start.merge(self.previous_span()),
        ))
    }

    fn parse_for(&mut self) -> Result<Stmt, ParseError> {
        let start = self.advance();
        let target = self.parse_target_list()?;
        self.expect(&TokenKind::In, "in")?;
        let iter = self.parse_star_expressions()?;
        self.expect(&TokenKind::Colon, ":")?;
        let body = self.parse_block("'for' statement")?;
        let orelse = self.parse_else_block()?;
        Ok(Stmt::new(
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            },
            start.merge(self.previous_span()),
        ))
    }

    fn parse_else_block(&mut self) -> Result<Vec<Stmt>, ParseError> {
        if !self.eat(&TokenKind::Else) {
            return Ok(Vec::new());
        }
        self.expect(&TokenKind::Colon, ":")?;
        self.parse_block("'else' statement")
    }

    /// A suite: `NEWLINE INDENT stmt+ DEDENT`, or simple statements on the
    /// header line.
    fn parse_block(&mut self, after: &'static str) -> Result<Vec<Stmt>, ParseError> {
        let mut body = Vec::new();
        if !self.eat(&TokenKind::Newline) {
            if self.cursor.is_at_end() {
                return Err(ParseError::new(
                    ParseErrorKind::ExpectedIndentedBlock(after),
                    self.current_span(),
                ));
            }
            self.parse_simple_statements(&mut body)?;
            return Ok(body);
        }
        if !self.eat(&TokenKind::Indent) {
            return Err(ParseError::new(
                ParseErrorKind::ExpectedIndentedBlock(after),
                self.current_span(),
            ));
        }
        while !self.check(&TokenKind::Dedent) && !self.cursor.is_at_end() {
            if self.check(&TokenKind::Indent) {
                return Err(ParseError::new(
                    ParseErrorKind::UnexpectedIndent,
                    self.current_span(),
                ));
            }
            self.parse_statement(&mut body)?;
        }
        self.eat(&TokenKind::Dedent);
        Ok(body)
    }

    /// `star_target (',' star_target)* [',']`, stopping before `in`.
    pub(crate) fn parse_target_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let first = self.parse_star_target()?;
        if !self.check(&TokenKind::Comma) {
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elts.push(self.parse_star_target()?);
        }
        Ok(Expr::new(
            ExprKind::Tuple(elts),
            start.merge(self.previous_span()),
        ))
    }

    fn parse_star_target(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            let start = self.advance();
            let value = self.parse_bitwise_or()?;
            return Ok(Expr::new(
                ExprKind::Starred(value.boxed()),
                start.merge(self.previous_span()),
            ));
        }
        self.parse_bitwise_or()
    }
}
