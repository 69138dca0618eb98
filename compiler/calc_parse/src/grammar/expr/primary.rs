//! Primary expression parsing.
//!
//! Literals, names, parenthesized expressions, list/dict/set displays and
//! their comprehensions, and adjacent string concatenation.

use calc_ir::{Comprehension, DictItem, Expr, ExprKind, Literal, Span, UnsupportedKind};
use calc_lexer::TokenKind;

use crate::{ParseError, ParseErrorKind, Parser};

impl Parser {
    /// Parse an atom.
    pub(crate) fn parse_atom(&mut self) -> Result<Expr, ParseError> {
        let span = self.current_span();
        let literal = match self.current_kind() {
            TokenKind::Name(name) => {
                let kind = ExprKind::Name(name.clone());
                self.advance();
                return Ok(Expr::new(kind, span));
            }
            TokenKind::Int { digits, radix } => Literal::Int {
                digits: digits.clone(),
                radix: *radix,
            },
            TokenKind::Float(text) => Literal::Float(text.clone()),
            TokenKind::Imaginary(text) => Literal::Imaginary(text.clone()),
            TokenKind::True => Literal::Bool(true),
            TokenKind::False => Literal::Bool(false),
            TokenKind::None => Literal::None,
            TokenKind::Ellipsis => Literal::Ellipsis,
            TokenKind::Str(_) | TokenKind::Bytes(_) | TokenKind::FString { .. } => {
                return self.parse_strings();
            }
            TokenKind::LParen => return self.parse_paren(),
            TokenKind::LBracket => return self.parse_list(),
            TokenKind::LBrace => return self.parse_brace(),
            _ => return Err(ParseError::invalid_syntax(span)),
        };
        self.advance();
        Ok(Expr::new(ExprKind::Literal(literal), span))
    }

    /// `()`, `(x)`, `(x,)`, `(yield)`, `(x for x in y)`.
    fn parse_paren(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance();
        if self.check(&TokenKind::RParen) {
            let end = self.advance();
            return Ok(Expr::new(ExprKind::Tuple(Vec::new()), start.merge(end)));
        }
        if self.check(&TokenKind::Yield) {
            let inner = self.parse_yield()?;
            self.expect(&TokenKind::RParen, ")")?;
            return Ok(inner);
        }

        let first = self.parse_star_named_expression()?;
        if self.starts_comprehension() {
            self.parse_comprehension_clauses()?;
            let end = self.expect(&TokenKind::RParen, ")")?;
            return Ok(Expr::new(
                ExprKind::Unsupported(UnsupportedKind::GeneratorExp),
                start.merge(end),
            ));
        }
        if self.check(&TokenKind::RParen) {
            if matches!(first.kind, ExprKind::Starred(_)) {
                return Err(ParseError::new(
                    ParseErrorKind::StarredNotAllowed,
                    first.span,
                ));
            }
            self.advance();
            return Ok(first);
        }

        let elts = self.parse_display_tail(first, &TokenKind::RParen)?;
        let end = self.expect(&TokenKind::RParen, ")")?;
        Ok(Expr::new(ExprKind::Tuple(elts), start.merge(end)))
    }

    /// `[a, b]` or `[x for x in y]`.
    fn parse_list(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance();
        if self.check(&TokenKind::RBracket) {
            let end = self.advance();
            return Ok(Expr::new(ExprKind::List(Vec::new()), start.merge(end)));
        }
        let first = self.parse_star_named_expression()?;
        if self.starts_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            let end = self.expect(&TokenKind::RBracket, "]")?;
            return Ok(Expr::new(
                ExprKind::ListComp {
                    elt: first.boxed(),
                    generators,
                },
                start.merge(end),
            ));
        }
        let elts = self.parse_display_tail(first, &TokenKind::RBracket)?;
        let end = self.expect(&TokenKind::RBracket, "]")?;
        Ok(Expr::new(ExprKind::List(elts), start.merge(end)))
    }

    /// Dict or set display, or their comprehensions.
    fn parse_brace(&mut self) -> Result<Expr, ParseError> {
        let start = self.advance();
        if self.check(&TokenKind::RBrace) {
            let end = self.advance();
            return Ok(Expr::new(ExprKind::Dict(Vec::new()), start.merge(end)));
        }
        if self.check(&TokenKind::DoubleStar) {
            return self.parse_dict_items(start, Vec::new());
        }

        let first = self.parse_star_named_expression()?;
        if self.eat(&TokenKind::Colon) {
            if matches!(first.kind, ExprKind::Starred(_)) {
                return Err(ParseError::new(
                    ParseErrorKind::StarredNotAllowed,
                    first.span,
                ));
            }
            let value = self.parse_expression()?;
            if self.starts_comprehension() {
                let generators = self.parse_comprehension_clauses()?;
                let end = self.expect(&TokenKind::RBrace, "}")?;
                return Ok(Expr::new(
                    ExprKind::DictComp {
                        key: first.boxed(),
                        value: value.boxed(),
                        generators,
                    },
                    start.merge(end),
                ));
            }
            let items = vec![DictItem {
                key: Some(first),
                value,
            }];
            if !self.eat(&TokenKind::Comma) {
                let end = self.expect(&TokenKind::RBrace, "}")?;
                return Ok(Expr::new(ExprKind::Dict(items), start.merge(end)));
            }
            return self.parse_dict_items(start, items);
        }

        if self.starts_comprehension() {
            let generators = self.parse_comprehension_clauses()?;
            let end = self.expect(&TokenKind::RBrace, "}")?;
            return Ok(Expr::new(
                ExprKind::SetComp {
                    elt: first.boxed(),
                    generators,
                },
                start.merge(end),
            ));
        }
        let elts = self.parse_display_tail(first, &TokenKind::RBrace)?;
        let end = self.expect(&TokenKind::RBrace, "}")?;
        Ok(Expr::new(ExprKind::Set(elts), start.merge(end)))
    }

    /// Remaining `key: value` / `**mapping` entries up to the closing brace.
    fn parse_dict_items(
        &mut self,
        start: Span,
        mut items: Vec<DictItem>,
    ) -> Result<Expr, ParseError> {
        while !self.check(&TokenKind::RBrace) {
            if self.eat(&TokenKind::DoubleStar) {
                let value = self.parse_bitwise_or()?;
                items.push(DictItem { key: None, value });
            } else {
                let key = self.parse_expression()?;
                self.expect(&TokenKind::Colon, ":")?;
                let value = self.parse_expression()?;
                items.push(DictItem {
                    key: Some(key),
                    value,
                });
            }
            if !self.eat(&TokenKind::Comma) {
                break;
            }
        }
        let end = self.expect(&TokenKind::RBrace, "}")?;
        Ok(Expr::new(ExprKind::Dict(items), start.merge(end)))
    }

    /// Elements after `first` in a comma-separated display.
    fn parse_display_tail(
        &mut self,
        first: Expr,
        close: &TokenKind,
    ) -> Result<Vec<Expr>, ParseError> {
        let mut elts = vec![first];
        while self.eat(&TokenKind::Comma) {
            if self.check(close) {
                break;
            }
            elts.push(self.parse_star_named_expression()?);
        }
        Ok(elts)
    }

    pub(crate) fn starts_comprehension(&self) -> bool {
        self.check(&TokenKind::For)
            || (self.check(&TokenKind::Async) && *self.cursor.peek_kind(1) == TokenKind::For)
    }

    /// `[async] for targets in iter (if cond)*`, repeated.
    pub(crate) fn parse_comprehension_clauses(
        &mut self,
    ) -> Result<Vec<Comprehension>, ParseError> {
        let mut generators = Vec::new();
        while self.starts_comprehension() {
            let is_async = self.eat(&TokenKind::Async);
            self.expect(&TokenKind::For, "for")?;
            let target = self.parse_target_list()?;
            self.expect(&TokenKind::In, "in")?;
            let iter = self.parse_disjunction()?;
            let mut ifs = Vec::new();
            while self.eat(&TokenKind::If) {
                ifs.push(self.parse_disjunction()?);
            }
            generators.push(Comprehension {
                target,
                iter,
                ifs,
                is_async,
            });
        }
        Ok(generators)
    }

    /// Adjacent string literals concatenate; any f-string part makes the
    /// whole a `JoinedStr`.
    fn parse_strings(&mut self) -> Result<Expr, ParseError> {
        let start = self.current_span();
        let mut parts: Vec<Expr> = Vec::new();
        let mut bytes: Option<Vec<u8>> = None;
        let mut has_str = false;
        let mut has_fstring = false;

        loop {
            let token = self.cursor.current().clone();
            match token.kind {
                TokenKind::Str(text) => {
                    has_str = true;
                    push_text(&mut parts, text, token.span);
                }
                TokenKind::Bytes(data) => {
                    bytes.get_or_insert_with(Vec::new).extend(data);
                }
                TokenKind::FString {
                    body,
                    raw,
                    body_start,
                } => {
                    has_fstring = true;
                    for part in self.parse_fstring(&body, raw, body_start)? {
                        match part.kind {
                            ExprKind::Literal(Literal::Str(text)) => {
                                push_text(&mut parts, text, part.span);
                            }
                            _ => parts.push(part),
                        }
                    }
                }
                _ => break,
            }
            if bytes.is_some() && (has_str || has_fstring) {
                return Err(ParseError::new(
                    ParseErrorKind::MixedBytesAndStr,
                    start.merge(token.span),
                ));
            }
            self.advance();
        }

        let span = start.merge(self.previous_span());
        if let Some(data) = bytes {
            return Ok(Expr::new(ExprKind::Literal(Literal::Bytes(data)), span));
        }
        if has_fstring {
            return Ok(Expr::new(ExprKind::JoinedStr(parts), span));
        }
        let text = match parts.pop() {
            Some(Expr {
                kind: ExprKind::Literal(Literal::Str(text)),
                ..
            }) => text,
            _ => String::new(),
        };
        Ok(Expr::new(ExprKind::Literal(Literal::Str(text)), span))
    }
}

/// Append literal text, merging with a preceding literal segment.
fn push_text(parts: &mut Vec<Expr>, text: String, span: Span) {
    if let Some(Expr {
        kind: ExprKind::Literal(Literal::Str(prev)),
        span: prev_span,
    }) = parts.last_mut()
    {
        prev.push_str(&text);
        *prev_span = prev_span.merge(span);
        return;
    }
    if !text.is_empty() {
        parts.push(Expr::new(ExprKind::Literal(Literal::Str(text)), span));
    }
}
