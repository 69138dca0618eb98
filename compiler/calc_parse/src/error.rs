//! Parse error types.

use std::fmt;

use calc_ir::Span;
use calc_lexer::{LexError, LexErrorKind};

/// A syntax error with the span that triggered it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub span: Span,
}

/// What kind of syntax error occurred.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Tokenizer failure.
    Lex(LexErrorKind),
    /// Generic unexpected token.
    InvalidSyntax,
    /// A specific token was required.
    Expected(&'static str),
    /// INDENT where a statement was expected.
    UnexpectedIndent,
    /// A compound statement header not followed by a suite.
    ExpectedIndentedBlock(&'static str),
    /// `b'a' 'b'`.
    MixedBytesAndStr,
    /// `*x` outside a display, call or assignment target list.
    StarredNotAllowed,
    /// `f(a=1, b)`.
    PositionalAfterKeyword,
    /// `f(**a, b)`.
    PositionalAfterKeywordUnpacking,
    /// `f(a=1, a=2)`.
    RepeatedKeyword(String),
    /// Malformed f-string; the payload is the detail message.
    FString(&'static str),
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lex(kind) => kind.fmt(f),
            Self::InvalidSyntax => write!(f, "invalid syntax"),
            Self::Expected(what) => write!(f, "expected '{what}'"),
            Self::UnexpectedIndent => write!(f, "unexpected indent"),
            Self::ExpectedIndentedBlock(after) => {
                write!(f, "expected an indented block after {after}")
            }
            Self::MixedBytesAndStr => write!(f, "cannot mix bytes and nonbytes literals"),
            Self::StarredNotAllowed => write!(f, "cannot use starred expression here"),
            Self::PositionalAfterKeyword => {
                write!(f, "positional argument follows keyword argument")
            }
            Self::PositionalAfterKeywordUnpacking => {
                write!(f, "positional argument follows keyword argument unpacking")
            }
            Self::RepeatedKeyword(name) => write!(f, "keyword argument repeated: {name}"),
            Self::FString(detail) => write!(f, "f-string: {detail}"),
        }
    }
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, span: Span) -> Self {
        ParseError { kind, span }
    }

    #[cold]
    pub fn invalid_syntax(span: Span) -> Self {
        Self::new(ParseErrorKind::InvalidSyntax, span)
    }

    #[cold]
    pub fn expected(what: &'static str, span: Span) -> Self {
        Self::new(ParseErrorKind::Expected(what), span)
    }

    #[cold]
    pub fn fstring(detail: &'static str, span: Span) -> Self {
        Self::new(ParseErrorKind::FString(detail), span)
    }

    /// Message with the 1-based line and column of the error in `source`.
    pub fn render(&self, source: &str) -> String {
        let (line, col) = self.span.line_col(source);
        format!("{} (line {line}, column {col})", self.kind)
    }
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        ParseError::new(ParseErrorKind::Lex(err.kind), err.span)
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for ParseError {}
