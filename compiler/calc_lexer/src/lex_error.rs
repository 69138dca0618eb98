//! Lexer error types.
//!
//! A `LexError` pairs the offending span with a `LexErrorKind`; the kind's
//! `Display` produces the message shown to the user.

use std::fmt;

use calc_ir::Span;

/// A lexer error.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct LexError {
    pub span: Span,
    pub kind: LexErrorKind,
}

/// What kind of lexer error occurred.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum LexErrorKind {
    // === Character Errors ===
    /// A character no token can start with.
    InvalidCharacter(char),
    /// `\` not followed by a newline.
    StrayBackslash,

    // === String Errors ===
    /// Missing closing quote on a single-quoted string.
    UnterminatedString,
    /// Missing closing `'''`/`"""`.
    UnterminatedTripleQuoted,
    /// Non-ASCII character in a bytes literal.
    NonAsciiBytes,
    /// `\x`, `\u` or `\U` escape with too few hex digits.
    TruncatedEscape { escape: &'static str },
    /// `\u`/`\U`/octal escape naming an invalid code point.
    InvalidCodePoint,
    /// Octal escape above `\377` in a bytes literal.
    OctalEscapeTooLarge,
    /// `\N{...}` named escapes are not supported.
    NamedEscape,

    // === Numeric Errors ===
    /// Number immediately followed by a name (`1abc`, `0x1g`).
    InvalidDecimalLiteral,
    /// Decimal integer with leading zeros (`007`).
    LeadingZeros,

    // === Layout Errors ===
    /// Dedent to a column no enclosing block uses.
    InconsistentDedent,
    /// Closing bracket with no opener.
    UnmatchedBracket(char),
    /// Closing bracket of the wrong kind.
    MismatchedBracket { open: char, close: char },
    /// Opening bracket still open at end of input.
    UnclosedBracket(char),
    /// Bracket nesting exceeds the limit.
    TooManyNestedBrackets,
    /// Block nesting exceeds the limit.
    TooManyIndentationLevels,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCharacter(c) => {
                write!(f, "invalid character '{c}' (U+{:04X})", u32::from(*c))
            }
            Self::StrayBackslash => {
                write!(f, "unexpected character after line continuation character")
            }
            Self::UnterminatedString => write!(f, "unterminated string literal"),
            Self::UnterminatedTripleQuoted => {
                write!(f, "unterminated triple-quoted string literal")
            }
            Self::NonAsciiBytes => write!(f, "bytes can only contain ASCII literal characters"),
            Self::TruncatedEscape { escape } => write!(f, "truncated {escape} escape"),
            Self::InvalidCodePoint => write!(f, "illegal Unicode character in escape"),
            Self::OctalEscapeTooLarge => write!(f, "octal escape value > 0o377 in bytes literal"),
            Self::NamedEscape => write!(f, "\\N{{...}} escapes are not supported"),
            Self::InvalidDecimalLiteral => write!(f, "invalid decimal literal"),
            Self::LeadingZeros => write!(
                f,
                "leading zeros in decimal integer literals are not permitted; \
                 use an 0o prefix for octal integers"
            ),
            Self::InconsistentDedent => {
                write!(f, "unindent does not match any outer indentation level")
            }
            Self::UnmatchedBracket(c) => write!(f, "unmatched '{c}'"),
            Self::MismatchedBracket { open, close } => write!(
                f,
                "closing parenthesis '{close}' does not match opening parenthesis '{open}'"
            ),
            Self::UnclosedBracket(c) => write!(f, "'{c}' was never closed"),
            Self::TooManyNestedBrackets => write!(f, "too many nested parentheses"),
            Self::TooManyIndentationLevels => write!(f, "too many levels of indentation"),
        }
    }
}

impl LexError {
    pub fn new(kind: LexErrorKind, span: Span) -> Self {
        LexError { span, kind }
    }

    #[cold]
    pub fn invalid_character(c: char, span: Span) -> Self {
        Self::new(LexErrorKind::InvalidCharacter(c), span)
    }

    #[cold]
    pub fn unterminated_string(span: Span) -> Self {
        Self::new(LexErrorKind::UnterminatedString, span)
    }

    #[cold]
    pub fn truncated_escape(escape: &'static str, span: Span) -> Self {
        Self::new(LexErrorKind::TruncatedEscape { escape }, span)
    }
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for LexError {}
