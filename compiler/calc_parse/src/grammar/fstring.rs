//! f-string bodies.
//!
//! The lexer hands over the raw body text. It is split here into literal
//! segments and `{expr[=][!conv][:spec]}` replacement fields; each field's
//! expression is lexed on its own and parsed by a nested parser. A format
//! spec is itself an f-string body, nested at most two levels deep.

use calc_ir::{Conversion, Expr, ExprKind, Literal, Span};
use calc_lexer::{lex_expression, unescape_str, TokenKind};

use crate::{ParseError, Parser};

/// Maximum nesting of replacement fields inside format specs.
const MAX_SPEC_LEVEL: u32 = 2;

/// Maximum nesting of f-string literals inside replacement fields.
const MAX_FSTRING_DEPTH: u32 = 16;

impl Parser {
    /// Split an f-string body into `Literal(Str)` and `FormattedValue` parts.
    pub(crate) fn parse_fstring(
        &self,
        body: &str,
        raw: bool,
        base: u32,
    ) -> Result<Vec<Expr>, ParseError> {
        if self.fstring_depth >= MAX_FSTRING_DEPTH {
            return Err(ParseError::fstring(
                "expressions nested too deeply",
                Span::new(base, base + to_u32(body.len())),
            ));
        }
        self.parse_fstring_parts(body, raw, base, 0)
    }

    fn parse_fstring_parts(
        &self,
        body: &str,
        raw: bool,
        base: u32,
        level: u32,
    ) -> Result<Vec<Expr>, ParseError> {
        let bytes = body.as_bytes();
        let mut parts = Vec::new();
        let mut chunk_start = 0;
        let mut i = 0;

        while i < bytes.len() {
            match bytes[i] {
                b'{' if bytes.get(i + 1) == Some(&b'{') => {
                    let chunk = &body[chunk_start..=i];
                    push_literal(&mut parts, chunk, raw, base + to_u32(chunk_start))?;
                    i += 2;
                    chunk_start = i;
                }
                b'}' if bytes.get(i + 1) == Some(&b'}') => {
                    let chunk = &body[chunk_start..=i];
                    push_literal(&mut parts, chunk, raw, base + to_u32(chunk_start))?;
                    i += 2;
                    chunk_start = i;
                }
                b'}' => {
                    let at = base + to_u32(i);
                    return Err(ParseError::fstring(
                        "single '}' is not allowed",
                        Span::new(at, at + 1),
                    ));
                }
                b'{' => {
                    let chunk = &body[chunk_start..i];
                    push_literal(&mut parts, chunk, raw, base + to_u32(chunk_start))?;
                    if level >= MAX_SPEC_LEVEL {
                        let at = base + to_u32(i);
                        return Err(ParseError::fstring(
                            "expressions nested too deeply",
                            Span::new(at, at + 1),
                        ));
                    }
                    i = self.parse_field(body, raw, base, level, i, &mut parts)?;
                    chunk_start = i;
                }
                _ => i += 1,
            }
        }
        let chunk = &body[chunk_start..];
        push_literal(&mut parts, chunk, raw, base + to_u32(chunk_start))?;
        Ok(parts)
    }

    /// Parse the replacement field opening at `open`; returns the index just
    /// past its closing `}`.
    fn parse_field(
        &self,
        body: &str,
        raw: bool,
        base: u32,
        level: u32,
        open: usize,
        parts: &mut Vec<Expr>,
    ) -> Result<usize, ParseError> {
        let bytes = body.as_bytes();
        let field_span = |end: usize| Span::new(base + to_u32(open), base + to_u32(end));
        let expr_start = open + 1;
        let (expr_end, debug) = scan_field_expression(bytes, expr_start)
            .ok_or_else(|| ParseError::fstring("expecting '}'", field_span(bytes.len())))?;

        let text = &body[expr_start..expr_end];
        if text.trim().is_empty() {
            return Err(ParseError::fstring(
                "valid expression required before '}'",
                field_span(expr_end + 1),
            ));
        }
        let value = self.parse_field_expression(text, base + to_u32(expr_start))?;

        let mut j = expr_end;
        if debug {
            j += 1;
            while bytes.get(j).is_some_and(u8::is_ascii_whitespace) {
                j += 1;
            }
            let debug_text = &body[expr_start..j];
            push_literal(parts, debug_text, true, base + to_u32(expr_start))?;
        }

        let mut conversion = None;
        if bytes.get(j) == Some(&b'!') {
            conversion = Some(match bytes.get(j + 1) {
                Some(b's') => Conversion::Str,
                Some(b'r') => Conversion::Repr,
                Some(b'a') => Conversion::Ascii,
                _ => {
                    let at = base + to_u32(j);
                    return Err(ParseError::fstring(
                        "invalid conversion character: expected 's', 'r', or 'a'",
                        Span::new(at, at + 1),
                    ));
                }
            });
            j += 2;
        }

        let mut format_spec = None;
        if bytes.get(j) == Some(&b':') {
            let spec_start = j + 1;
            let spec_end = scan_format_spec(bytes, spec_start)
                .ok_or_else(|| ParseError::fstring("expecting '}'", field_span(bytes.len())))?;
            let spec_parts = self.parse_fstring_parts(
                &body[spec_start..spec_end],
                raw,
                base + to_u32(spec_start),
                level + 1,
            )?;
            let spec_span = Span::new(base + to_u32(spec_start), base + to_u32(spec_end));
            format_spec = Some(Expr::new(ExprKind::JoinedStr(spec_parts), spec_span).boxed());
            j = spec_end;
        }

        if bytes.get(j) != Some(&b'}') {
            return Err(ParseError::fstring("expecting '}'", field_span(j)));
        }
        if debug && conversion.is_none() && format_spec.is_none() {
            conversion = Some(Conversion::Repr);
        }
        parts.push(Expr::new(
            ExprKind::FormattedValue {
                value: value.boxed(),
                conversion,
                format_spec,
            },
            field_span(j + 1),
        ));
        Ok(j + 1)
    }

    fn parse_field_expression(&self, text: &str, base: u32) -> Result<Expr, ParseError> {
        let tokens = lex_expression(text, base)?;
        let mut parser = Parser::new(tokens);
        parser.fstring_depth = self.fstring_depth + 1;
        let value = if parser.check(&TokenKind::Yield) {
            parser.parse_yield()?
        } else {
            parser.parse_star_expressions()?
        };
        if !parser.cursor.is_at_end() {
            return Err(ParseError::invalid_syntax(parser.current_span()));
        }
        Ok(value)
    }
}

/// Find where a field's expression ends: the `!`, `:`, `=` or `}` that
/// follows it outside brackets and strings. Returns the index and whether
/// it is a `=` debug marker; `None` if the body ends first.
fn scan_field_expression(bytes: &[u8], start: usize) -> Option<(usize, bool)> {
    let mut depth = 0usize;
    let mut quote: Option<u8> = None;
    let mut j = start;
    while j < bytes.len() {
        let c = bytes[j];
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            j += 1;
            continue;
        }
        let next = bytes.get(j + 1).copied();
        match c {
            b'\'' | b'"' => quote = Some(c),
            b'(' | b'[' | b'{' => depth += 1,
            b')' | b']' if depth > 0 => depth -= 1,
            b'}' if depth > 0 => depth -= 1,
            b'}' => return Some((j, false)),
            b'!' if depth == 0 && next != Some(b'=') => return Some((j, false)),
            b':' if depth == 0 => return Some((j, false)),
            b'=' if depth == 0 => {
                let prev = if j > start { bytes[j - 1] } else { b' ' };
                if next == Some(b'=') {
                    j += 1;
                } else if !matches!(prev, b'=' | b'!' | b'<' | b'>') {
                    return Some((j, true));
                }
            }
            _ => {}
        }
        j += 1;
    }
    None
}

/// Find the `}` that closes a format spec starting at `start`.
fn scan_format_spec(bytes: &[u8], start: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (offset, &c) in bytes[start..].iter().enumerate() {
        match c {
            b'{' => depth += 1,
            b'}' if depth == 0 => return Some(start + offset),
            b'}' => depth -= 1,
            _ => {}
        }
    }
    None
}

fn push_literal(parts: &mut Vec<Expr>, text: &str, raw: bool, base: u32) -> Result<(), ParseError> {
    if text.is_empty() {
        return Ok(());
    }
    let value = unescape_str(text, raw, base)?;
    let span = Span::new(base, base + to_u32(text.len()));
    parts.push(Expr::new(ExprKind::Literal(Literal::Str(value)), span));
    Ok(())
}

fn to_u32(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}
