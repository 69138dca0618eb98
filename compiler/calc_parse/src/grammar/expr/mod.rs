//! Expression parsing.
//!
//! This module extends Parser with methods for parsing expressions, one
//! method per precedence level (lowest first):
//! `lambda` < `x if c else y` < `or` < `and` < `not` < comparisons < `|` <
//! `^` < `&` < shifts < `+ -` < `* / // % @` < unary `- + ~` < `**` <
//! `await` < primary.
//!
//! # Module Structure
//!
//! - `mod.rs`: entry points and the precedence chain
//! - `operators.rs`: operator matching helpers
//! - `primary.rs`: literals, names, displays, comprehensions
//! - `postfix.rs`: attribute access, calls, subscripts

mod operators;
mod postfix;
mod primary;

use calc_ir::{ensure_sufficient_stack, BoolOp, Expr, ExprKind, UnaryOp, UnsupportedKind};
use calc_lexer::TokenKind;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    /// True if the current token can begin an expression.
    pub(crate) fn starts_expression(&self) -> bool {
        matches!(
            self.current_kind(),
            TokenKind::Name(_)
                | TokenKind::Int { .. }
                | TokenKind::Float(_)
                | TokenKind::Imaginary(_)
                | TokenKind::Str(_)
                | TokenKind::Bytes(_)
                | TokenKind::FString { .. }
                | TokenKind::True
                | TokenKind::False
                | TokenKind::None
                | TokenKind::Ellipsis
                | TokenKind::LParen
                | TokenKind::LBracket
                | TokenKind::LBrace
                | TokenKind::Minus
                | TokenKind::Plus
                | TokenKind::Tilde
                | TokenKind::Not
                | TokenKind::Lambda
                | TokenKind::Await
                | TokenKind::Star
        )
    }

    /// `yield_expr | star_expressions`, as allowed on either side of `=`.
    pub(crate) fn parse_star_expressions_or_yield(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Yield) {
            self.parse_yield()
        } else {
            self.parse_star_expressions()
        }
    }

    /// Comma-separated expressions; a trailing or separating comma makes a
    /// tuple without parentheses.
    pub(crate) fn parse_star_expressions(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let first = self.parse_star_expression()?;
        if !self.check(&TokenKind::Comma) {
            if matches!(first.kind, ExprKind::Starred(_)) {
                return Err(ParseError::new(
                    ParseErrorKind::StarredNotAllowed,
                    first.span,
                ));
            }
            return Ok(first);
        }
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma) {
            if !self.starts_expression() {
                break;
            }
            elts.push(self.parse_star_expression()?);
        }
        Ok(Expr::new(
            ExprKind::Tuple(elts),
            start.merge(self.previous_span()),
        ))
    }

    fn parse_star_expression(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            let start = self.advance();
            let value = self.parse_bitwise_or()?;
            return Ok(Expr::new(
                ExprKind::Starred(value.boxed()),
                start.merge(self.previous_span()),
            ));
        }
        self.parse_expression()
    }

    /// `*x` or a named expression, as allowed inside displays.
    pub(crate) fn parse_star_named_expression(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Star) {
            return self.parse_star_expression();
        }
        self.parse_named_expression()
    }

    /// `name := value` or a plain expression.
    pub(crate) fn parse_named_expression(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression()?;
        if !self.check(&TokenKind::ColonEq) {
            return Ok(expr);
        }
        if !matches!(expr.kind, ExprKind::Name(_)) {
            return Err(ParseError::invalid_syntax(self.current_span()));
        }
        self.advance();
        self.parse_expression()?;
        Ok(Expr::new(
            ExprKind::Unsupported(UnsupportedKind::NamedExpr),
            expr.span.merge(self.previous_span()),
        ))
    }

    /// Parse an expression.
    ///
    /// Uses `ensure_sufficient_stack` to prevent stack overflow on deeply
    /// nested expressions.
    pub(crate) fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        ensure_sufficient_stack(|| self.parse_expression_inner())
    }

    fn parse_expression_inner(&mut self) -> Result<Expr, ParseError> {
        if self.check(&TokenKind::Lambda) {
            return self.parse_lambda();
        }
        let body = self.parse_disjunction()?;
        if !self.eat(&TokenKind::If) {
            return Ok(body);
        }
        let test = self.parse_disjunction()?;
        self.expect(&TokenKind::Else, "else")?;
        let orelse = self.parse_expression()?;
        let span = body.span.merge(orelse.span);
        Ok(Expr::new(
            ExprKind::IfExp {
                test: test.boxed(),
                body: body.boxed(),
                orelse: orelse.boxed(),
            },
            span,
        ))
    }

    /// Parse `lambda params: body`; the body is parsed and dropped.
    fn parse_lambda(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance();
        let mut depth = 0usize;
        loop {
            match self.current_kind() {
                TokenKind::LParen | TokenKind::LBracket | TokenKind::LBrace => depth += 1,
                TokenKind::RParen | TokenKind::RBracket | TokenKind::RBrace => {
                    depth = depth.saturating_sub(1);
                }
                TokenKind::Colon if depth == 0 => break,
                TokenKind::Newline | TokenKind::EndMarker => {
                    return Err(ParseError::expected(":", self.current_span()));
                }
                _ => {}
            }
            self.advance();
        }
        self.advance();
        self.parse_expression()?;
        Ok(Expr::new(
            ExprKind::Unsupported(UnsupportedKind::Lambda),
            start.merge(self.previous_span()),
        ))
    }

    /// Parse `yield [from] value`; the value is parsed and dropped.
    pub(crate) fn parse_yield(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance();
        let kind = if self.eat(&TokenKind::From) {
            self.parse_expression()?;
            UnsupportedKind::YieldFrom
        } else {
            if self.starts_expression() {
                self.parse_star_expressions()?;
            }
            UnsupportedKind::Yield
        };
        Ok(Expr::new(
            ExprKind::Unsupported(kind),
            start.merge(self.previous_span()),
        ))
    }

    /// Parse `or` chains.
    pub(crate) fn parse_disjunction(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_conjunction()?;
        if !self.check(&TokenKind::Or) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::Or) {
            values.push(self.parse_conjunction()?);
        }
        Ok(Self::bool_op(BoolOp::Or, values))
    }

    /// Parse `and` chains.
    fn parse_conjunction(&mut self) -> Result<Expr, ParseError> {
        let first = self.parse_inversion()?;
        if !self.check(&TokenKind::And) {
            return Ok(first);
        }
        let mut values = vec![first];
        while self.eat(&TokenKind::And) {
            values.push(self.parse_inversion()?);
        }
        Ok(Self::bool_op(BoolOp::And, values))
    }

    fn bool_op(op: BoolOp, values: Vec<Expr>) -> Expr {
        let span = match (values.first(), values.last()) {
            (Some(first), Some(last)) => first.span.merge(last.span),
            _ => calc_ir::Span::DUMMY,
        };
        Expr::new(ExprKind::BoolOp { op, values }, span)
    }

    /// Parse `not x`.
    fn parse_inversion(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::Not) {
            return self.parse_comparison();
        }
        let start = self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_inversion())?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::UnaryOp {
                op: UnaryOp::Not,
                operand: operand.boxed(),
            },
            span,
        ))
    }

    /// Parse a comparison chain `a < b <= c`.
    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let left = self.parse_bitwise_or()?;
        let mut ops = Vec::new();
        while let Some(op) = self.eat_comparison_op() {
            ops.push((op, self.parse_bitwise_or()?));
        }
        if ops.is_empty() {
            return Ok(left);
        }
        let span = left.span.merge(self.previous_span());
        Ok(Expr::new(
            ExprKind::Compare {
                left: left.boxed(),
                ops,
            },
            span,
        ))
    }

    /// Parse `|` (bitwise or).
    pub(crate) fn parse_bitwise_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_xor()?;
        while self.check(&TokenKind::Pipe) {
            self.advance();
            let right = self.parse_bitwise_xor()?;
            left = Self::binary(left, calc_ir::BinaryOp::BitOr, right);
        }
        Ok(left)
    }

    /// Parse `^` (bitwise xor).
    fn parse_bitwise_xor(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_bitwise_and()?;
        while self.check(&TokenKind::Caret) {
            self.advance();
            let right = self.parse_bitwise_and()?;
            left = Self::binary(left, calc_ir::BinaryOp::BitXor, right);
        }
        Ok(left)
    }

    /// Parse `&` (bitwise and).
    fn parse_bitwise_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_shift()?;
        while self.check(&TokenKind::Amp) {
            self.advance();
            let right = self.parse_shift()?;
            left = Self::binary(left, calc_ir::BinaryOp::BitAnd, right);
        }
        Ok(left)
    }

    /// Parse `<<` and `>>`.
    fn parse_shift(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;
        while let Some(op) = self.match_shift_op() {
            self.advance();
            let right = self.parse_additive()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    /// Parse `+` and `-`.
    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;
        while let Some(op) = self.match_additive_op() {
            self.advance();
            let right = self.parse_multiplicative()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    /// Parse `*`, `/`, `//`, `%` and `@`.
    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_factor()?;
        while let Some(op) = self.match_multiplicative_op() {
            self.advance();
            let right = self.parse_factor()?;
            left = Self::binary(left, op, right);
        }
        Ok(left)
    }

    /// Parse unary `-`, `+` and `~`.
    fn parse_factor(&mut self) -> Result<Expr, ParseError> {
        let Some(op) = self.match_unary_op() else {
            return self.parse_power();
        };
        let start = self.advance();
        let operand = ensure_sufficient_stack(|| self.parse_factor())?;
        let span = start.merge(operand.span);
        Ok(Expr::new(
            ExprKind::UnaryOp {
                op,
                operand: operand.boxed(),
            },
            span,
        ))
    }

    /// Parse `**`, right-associative and binding tighter than a unary
    /// operator on its left (`-2 ** 2 == -4`).
    fn parse_power(&mut self) -> Result<Expr, ParseError> {
        let base = self.parse_await_primary()?;
        if !self.eat(&TokenKind::DoubleStar) {
            return Ok(base);
        }
        let exponent = ensure_sufficient_stack(|| self.parse_factor())?;
        Ok(Self::binary(base, calc_ir::BinaryOp::Pow, exponent))
    }

    fn parse_await_primary(&mut self) -> Result<Expr, ParseError> {
        if !self.check(&TokenKind::Await) {
            return self.parse_primary();
        }
        let start = self.advance();
        self.parse_primary()?;
        Ok(Expr::new(
            ExprKind::Unsupported(UnsupportedKind::Await),
            start.merge(self.previous_span()),
        ))
    }

    fn binary(left: Expr, op: calc_ir::BinaryOp, right: Expr) -> Expr {
        let span = left.span.merge(right.span);
        Expr::new(
            ExprKind::BinOp {
                left: left.boxed(),
                op,
                right: right.boxed(),
            },
            span,
        )
    }
}
