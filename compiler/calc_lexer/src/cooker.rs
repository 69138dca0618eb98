//! Layout and literal cooking.
//!
//! Turns the raw logos stream into parser tokens: tracks bracket nesting
//! for implicit line joining, emits NEWLINE/INDENT/DEDENT from leading
//! whitespace, and cooks numeric and string literals.

use calc_ir::Span;
use logos::Logos;

use crate::escape::{unescape_bytes, unescape_str};
use crate::lex_error::{LexError, LexErrorKind};
use crate::raw_token::{RawError, RawToken, StrShape};
use crate::token::{Token, TokenKind};

const MAX_BRACKET_DEPTH: usize = 200;
const MAX_INDENT_DEPTH: usize = 100;
const TAB_SIZE: u32 = 8;

/// How the cooker treats line structure.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum LexMode {
    /// A whole script: newlines and indentation are significant.
    Module,
    /// A free-standing expression (f-string field): newlines are ignored.
    Expression,
}

pub(crate) struct Cooker<'src> {
    source: &'src str,
    base: u32,
    mode: LexMode,
    tokens: Vec<Token>,
    indents: Vec<u32>,
    brackets: Vec<(char, Span)>,
    at_line_start: bool,
    line_start: usize,
    /// End offset of the last numeric literal, for `1abc` detection.
    last_number_end: Option<usize>,
}

impl<'src> Cooker<'src> {
    pub(crate) fn new(source: &'src str, base: u32, mode: LexMode) -> Self {
        Cooker {
            source,
            base,
            mode,
            tokens: Vec::new(),
            indents: vec![0],
            brackets: Vec::new(),
            at_line_start: true,
            line_start: 0,
            last_number_end: None,
        }
    }

    fn span(&self, range: std::ops::Range<usize>) -> Span {
        Span::from_range(range).shifted(self.base)
    }

    fn layout_significant(&self) -> bool {
        self.mode == LexMode::Module && self.brackets.is_empty()
    }

    pub(crate) fn run(mut self) -> Result<Vec<Token>, LexError> {
        let mut lexer = RawToken::lexer(self.source);
        while let Some(raw) = lexer.next() {
            let range = lexer.span();
            match raw {
                Ok(token) => self.cook(token, range)?,
                Err(err) => return Err(self.raw_error(err, range)),
            }
        }
        self.finish()
    }

    fn raw_error(&self, err: RawError, range: std::ops::Range<usize>) -> LexError {
        let span = self.span(range.clone());
        match err {
            RawError::UnterminatedString => LexError::unterminated_string(span),
            RawError::UnterminatedTripleQuoted => {
                LexError::new(LexErrorKind::UnterminatedTripleQuoted, span)
            }
            RawError::Unrecognized => match self.source[range.start..].chars().next() {
                Some('\\') => LexError::new(LexErrorKind::StrayBackslash, span),
                Some(c) => LexError::invalid_character(c, span),
                None => LexError::unterminated_string(span),
            },
        }
    }

    fn cook(&mut self, raw: RawToken, range: std::ops::Range<usize>) -> Result<(), LexError> {
        match raw {
            RawToken::Comment | RawToken::LineContinuation => return Ok(()),
            RawToken::Newline => {
                if self.layout_significant() {
                    if !self.at_line_start {
                        let span = self.span(range.clone());
                        self.tokens.push(Token::new(TokenKind::Newline, span));
                        self.at_line_start = true;
                    }
                    self.line_start = range.end;
                }
                return Ok(());
            }
            _ => {}
        }

        if self.at_line_start && self.layout_significant() {
            self.indent_to(range.start)?;
        }
        self.at_line_start = false;

        if raw == RawToken::Name {
            if let Some(end) = self.last_number_end {
                if end == range.start {
                    let name = self.span(range);
                    let span = self.tokens.last().map_or(name, |t| t.span.merge(name));
                    return Err(LexError::new(LexErrorKind::InvalidDecimalLiteral, span));
                }
            }
        }
        self.last_number_end = None;

        let span = self.span(range.clone());
        let source = self.source;
        let text = &source[range.clone()];
        let kind = match raw {
            RawToken::Comment | RawToken::LineContinuation | RawToken::Newline => return Ok(()),
            RawToken::False => TokenKind::False,
            RawToken::None => TokenKind::None,
            RawToken::True => TokenKind::True,
            RawToken::And => TokenKind::And,
            RawToken::As => TokenKind::As,
            RawToken::Assert => TokenKind::Assert,
            RawToken::Async => TokenKind::Async,
            RawToken::Await => TokenKind::Await,
            RawToken::Break => TokenKind::Break,
            RawToken::Class => TokenKind::Class,
            RawToken::Continue => TokenKind::Continue,
            RawToken::Def => TokenKind::Def,
            RawToken::Del => TokenKind::Del,
            RawToken::Elif => TokenKind::Elif,
            RawToken::Else => TokenKind::Else,
            RawToken::Except => TokenKind::Except,
            RawToken::Finally => TokenKind::Finally,
            RawToken::For => TokenKind::For,
            RawToken::From => TokenKind::From,
            RawToken::Global => TokenKind::Global,
            RawToken::If => TokenKind::If,
            RawToken::Import => TokenKind::Import,
            RawToken::In => TokenKind::In,
            RawToken::Is => TokenKind::Is,
            RawToken::Lambda => TokenKind::Lambda,
            RawToken::Nonlocal => TokenKind::Nonlocal,
            RawToken::Not => TokenKind::Not,
            RawToken::Or => TokenKind::Or,
            RawToken::Pass => TokenKind::Pass,
            RawToken::Raise => TokenKind::Raise,
            RawToken::Return => TokenKind::Return,
            RawToken::Try => TokenKind::Try,
            RawToken::While => TokenKind::While,
            RawToken::With => TokenKind::With,
            RawToken::Yield => TokenKind::Yield,
            RawToken::AugAssign(op) => TokenKind::AugAssign(op),
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::DoubleStar => TokenKind::DoubleStar,
            RawToken::Slash => TokenKind::Slash,
            RawToken::DoubleSlash => TokenKind::DoubleSlash,
            RawToken::Percent => TokenKind::Percent,
            RawToken::At => TokenKind::At,
            RawToken::Shl => TokenKind::Shl,
            RawToken::Shr => TokenKind::Shr,
            RawToken::Amp => TokenKind::Amp,
            RawToken::Pipe => TokenKind::Pipe,
            RawToken::Caret => TokenKind::Caret,
            RawToken::Tilde => TokenKind::Tilde,
            RawToken::ColonEq => TokenKind::ColonEq,
            RawToken::Lt => TokenKind::Lt,
            RawToken::Gt => TokenKind::Gt,
            RawToken::LtEq => TokenKind::LtEq,
            RawToken::GtEq => TokenKind::GtEq,
            RawToken::EqEq => TokenKind::EqEq,
            RawToken::NotEq => TokenKind::NotEq,
            RawToken::Bang => TokenKind::Bang,
            RawToken::LParen => self.open('(', span, TokenKind::LParen)?,
            RawToken::LBracket => self.open('[', span, TokenKind::LBracket)?,
            RawToken::LBrace => self.open('{', span, TokenKind::LBrace)?,
            RawToken::RParen => self.close(')', span, TokenKind::RParen)?,
            RawToken::RBracket => self.close(']', span, TokenKind::RBracket)?,
            RawToken::RBrace => self.close('}', span, TokenKind::RBrace)?,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Colon => TokenKind::Colon,
            RawToken::Dot => TokenKind::Dot,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Eq => TokenKind::Eq,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Ellipsis => TokenKind::Ellipsis,
            RawToken::HexInt => self.number(radix_int(text, 16), range.end),
            RawToken::OctInt => self.number(radix_int(text, 8), range.end),
            RawToken::BinInt => self.number(radix_int(text, 2), range.end),
            RawToken::DecInt => {
                let digits = strip_underscores(text);
                if digits.len() > 1 && digits.starts_with('0') && digits.bytes().any(|b| b != b'0')
                {
                    return Err(LexError::new(LexErrorKind::LeadingZeros, span));
                }
                self.number(TokenKind::Int { digits, radix: 10 }, range.end)
            }
            RawToken::Float => self.number(TokenKind::Float(strip_underscores(text)), range.end),
            RawToken::Imaginary => {
                let digits = strip_underscores(&text[..text.len() - 1]);
                self.number(TokenKind::Imaginary(digits), range.end)
            }
            RawToken::Str(shape) => self.string(text, shape, range.start)?,
            RawToken::Name => TokenKind::Name(text.to_owned()),
        };
        self.tokens.push(Token::new(kind, span));
        Ok(())
    }

    fn number(&mut self, kind: TokenKind, end: usize) -> TokenKind {
        self.last_number_end = Some(end);
        kind
    }

    fn open(&mut self, c: char, span: Span, kind: TokenKind) -> Result<TokenKind, LexError> {
        if self.brackets.len() >= MAX_BRACKET_DEPTH {
            return Err(LexError::new(LexErrorKind::TooManyNestedBrackets, span));
        }
        self.brackets.push((c, span));
        Ok(kind)
    }

    fn close(&mut self, c: char, span: Span, kind: TokenKind) -> Result<TokenKind, LexError> {
        let expected = match c {
            ')' => '(',
            ']' => '[',
            _ => '{',
        };
        match self.brackets.pop() {
            None => Err(LexError::new(LexErrorKind::UnmatchedBracket(c), span)),
            Some((open, _)) if open != expected => Err(LexError::new(
                LexErrorKind::MismatchedBracket { open, close: c },
                span,
            )),
            Some(_) => Ok(kind),
        }
    }

    fn string(&self, text: &str, shape: StrShape, start: usize) -> Result<TokenKind, LexError> {
        let prefix = &text[..shape.prefix_len];
        let body = &text[shape.prefix_len + shape.quote_len..text.len() - shape.quote_len];
        let body_start = start + shape.prefix_len + shape.quote_len;
        let base = u32::try_from(body_start)
            .unwrap_or(u32::MAX)
            .saturating_add(self.base);

        let raw = prefix.contains(['r', 'R']);
        if prefix.contains(['f', 'F']) {
            return Ok(TokenKind::FString {
                body: body.to_owned(),
                raw,
                body_start: base,
            });
        }
        if prefix.contains(['b', 'B']) {
            return unescape_bytes(body, raw, base).map(TokenKind::Bytes);
        }
        unescape_str(body, raw, base).map(TokenKind::Str)
    }

    /// Measure the indentation of the line starting at `line_start` and emit
    /// INDENT/DEDENT tokens against the indent stack.
    fn indent_to(&mut self, token_start: usize) -> Result<(), LexError> {
        let mut column = 0u32;
        for c in self.source[self.line_start..token_start].chars() {
            match c {
                ' ' => column += 1,
                '\t' => column = (column / TAB_SIZE + 1) * TAB_SIZE,
                '\x0C' => column = 0,
                _ => break,
            }
        }
        let span = self.span(token_start..token_start);
        let current = self.indents.last().copied().unwrap_or(0);

        if column > current {
            if self.indents.len() >= MAX_INDENT_DEPTH {
                return Err(LexError::new(LexErrorKind::TooManyIndentationLevels, span));
            }
            self.indents.push(column);
            self.tokens.push(Token::new(TokenKind::Indent, span));
        } else {
            while self.indents.last().is_some_and(|&top| top > column) {
                self.indents.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, span));
            }
            if self.indents.last() != Some(&column) {
                return Err(LexError::new(LexErrorKind::InconsistentDedent, span));
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Vec<Token>, LexError> {
        if let Some(&(open, span)) = self.brackets.first() {
            return Err(LexError::new(LexErrorKind::UnclosedBracket(open), span));
        }
        let end = self.span(self.source.len()..self.source.len());
        if self.mode == LexMode::Module {
            if !self.at_line_start {
                self.tokens.push(Token::new(TokenKind::Newline, end));
            }
            while self.indents.len() > 1 {
                self.indents.pop();
                self.tokens.push(Token::new(TokenKind::Dedent, end));
            }
        }
        self.tokens.push(Token::new(TokenKind::EndMarker, end));
        Ok(self.tokens)
    }
}

fn strip_underscores(text: &str) -> String {
    text.chars().filter(|&c| c != '_').collect()
}

fn radix_int(text: &str, radix: u32) -> TokenKind {
    TokenKind::Int {
        digits: strip_underscores(&text[2..]),
        radix,
    }
}
