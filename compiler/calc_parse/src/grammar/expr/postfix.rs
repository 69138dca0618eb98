//! Postfix expression parsing.
//!
//! Attribute access, calls and subscripts applied to an atom, left to right.

use calc_ir::{Expr, ExprKind, Keyword, UnsupportedKind};
use calc_lexer::TokenKind;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    /// Parse an atom followed by any number of `.attr`, `(args)` and `[index]`.
    pub(crate) fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_atom()?;
        loop {
            expr = match self.current_kind() {
                TokenKind::Dot => {
                    self.advance();
                    let (attr, attr_span) = self.cursor.expect_name()?;
                    let span = expr.span.merge(attr_span);
                    Expr::new(
                        ExprKind::Attribute {
                            value: expr.boxed(),
                            attr,
                        },
                        span,
                    )
                }
                TokenKind::LParen => self.parse_call(expr)?,
                TokenKind::LBracket => self.parse_subscript(expr)?,
                _ => return Ok(expr),
            };
        }
    }

    /// Parse a call's argument list.
    ///
    /// Positional arguments may follow `*iterable` but not a `name=value`
    /// keyword or a `**mapping`.
    fn parse_call(&mut self, func: Expr) -> Result<Expr, ParseError> {
        self.advance();
        let mut args = Vec::new();
        let mut keywords: Vec<Keyword> = Vec::new();
        let mut seen_keyword = false;
        let mut seen_mapping = false;

        while !self.check(&TokenKind::RParen) {
            let start = self.current_span();
            if self.eat(&TokenKind::Star) {
                let value = self.parse_expression()?;
                let span = start.merge(value.span);
                if seen_mapping {
                    return Err(ParseError::new(
                        ParseErrorKind::PositionalAfterKeywordUnpacking,
                        span,
                    ));
                }
                args.push(Expr::new(ExprKind::Starred(value.boxed()), span));
            } else if self.eat(&TokenKind::DoubleStar) {
                let value = self.parse_expression()?;
                let span = start.merge(value.span);
                keywords.push(Keyword {
                    arg: None,
                    value,
                    span,
                });
                seen_mapping = true;
            } else if let (TokenKind::Name(name), TokenKind::Eq) =
                (self.current_kind(), self.cursor.peek_kind(1))
            {
                let name = name.clone();
                self.advance();
                self.advance();
                let value = self.parse_expression()?;
                let span = start.merge(value.span);
                if keywords.iter().any(|k| k.arg.as_deref() == Some(name.as_str())) {
                    return Err(ParseError::new(
                        ParseErrorKind::RepeatedKeyword(name),
                        span,
                    ));
                }
                keywords.push(Keyword {
                    arg: Some(name),
                    value,
                    span,
                });
                seen_keyword = true;
            } else {
                let mut value = self.parse_named_expression()?;
                if self.starts_comprehension() {
                    self.parse_comprehension_clauses()?;
                    value = Expr::new(
                        ExprKind::Unsupported(UnsupportedKind::GeneratorExp),
                        start.merge(self.previous_span()),
                    );
                }
                if seen_mapping {
                    return Err(ParseError::new(
                        ParseErrorKind::PositionalAfterKeywordUnpacking,
                        value.span,
                    ));
                }
                if seen_keyword {
                    return Err(ParseError::new(
                        ParseErrorKind::PositionalAfterKeyword,
                        value.span,
                    ));
                }
                args.push(value);
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }

        let end = self.expect(&TokenKind::RParen, ")")?;
        let span = func.span.merge(end);
        Ok(Expr::new(
            ExprKind::Call {
                func: func.boxed(),
                args,
                keywords,
            },
            span,
        ))
    }

    /// Parse `[index]`, where the index may be a slice or a tuple of
    /// slices and expressions.
    fn parse_subscript(&mut self, value: Expr) -> Result<Expr, ParseError> {
        self.advance();
        let start = self.current_span();
        let first = self.parse_slice_item()?;
        let index = if self.check(&TokenKind::Comma) {
            let mut elts = vec![first];
            while self.eat(&TokenKind::Comma) {
                if self.check(&TokenKind::RBracket) {
                    break;
                }
                elts.push(self.parse_slice_item()?);
            }
            Expr::new(ExprKind::Tuple(elts), start.merge(self.previous_span()))
        } else {
            first
        };
        let end = self.expect(&TokenKind::RBracket, "]")?;
        let span = value.span.merge(end);
        Ok(Expr::new(
            ExprKind::Subscript {
                value: value.boxed(),
                index: index.boxed(),
            },
            span,
        ))
    }

    /// `expr` or `[lower]:[upper][:[step]]`.
    fn parse_slice_item(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let lower = if self.check(&TokenKind::Colon) {
            None
        } else {
            let expr = self.parse_star_named_expression()?;
            if !self.check(&TokenKind::Colon) {
                return Ok(expr);
            }
            Some(expr.boxed())
        };
        self.advance();
        let upper = self.parse_slice_bound()?;
        let step = if self.eat(&TokenKind::Colon) {
            self.parse_slice_bound()?
        } else {
            None
        };
        Ok(Expr::new(
            ExprKind::Slice { lower, upper, step },
            start.merge(self.previous_span()),
        ))
    }

    fn parse_slice_bound(&mut self) -> Result<Option<Box<Expr>>, ParseError> {
        if matches!(
            self.current_kind(),
            TokenKind::Colon | TokenKind::Comma | TokenKind::RBracket
        ) {
            Ok(None)
        } else {
            Ok(Some(self.parse_expression()?.boxed()))
        }
    }
}
