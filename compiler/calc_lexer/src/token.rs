//! Cooked tokens handed to the parser.

use calc_ir::Span;

/// A token with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

/// Token kinds.
///
/// Soft keywords (`match`, `case`, `type`, `_`) are plain names; the parser
/// recognises them by position.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    // Literals
    Name(String),
    /// Integer digits without underscores or radix prefix.
    Int { digits: String, radix: u32 },
    /// Float text without underscores.
    Float(String),
    /// Imaginary literal text without underscores and without the `j`.
    Imaginary(String),
    /// Cooked string literal.
    Str(String),
    /// Cooked bytes literal.
    Bytes(Vec<u8>),
    /// f-string body, uncooked. `body_start` is the byte offset of the first
    /// body character in the source.
    FString {
        body: String,
        raw: bool,
        body_start: u32,
    },

    // Keywords
    False,
    None,
    True,
    And,
    As,
    Assert,
    Async,
    Await,
    Break,
    Class,
    Continue,
    Def,
    Del,
    Elif,
    Else,
    Except,
    Finally,
    For,
    From,
    Global,
    If,
    Import,
    In,
    Is,
    Lambda,
    Nonlocal,
    Not,
    Or,
    Pass,
    Raise,
    Return,
    Try,
    While,
    With,
    Yield,

    // Operators
    Plus,
    Minus,
    Star,
    DoubleStar,
    Slash,
    DoubleSlash,
    Percent,
    At,
    Shl,
    Shr,
    Amp,
    Pipe,
    Caret,
    Tilde,
    ColonEq,
    Lt,
    Gt,
    LtEq,
    GtEq,
    EqEq,
    NotEq,
    Bang,

    // Delimiters
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Comma,
    Colon,
    Dot,
    Semicolon,
    Eq,
    Arrow,
    Ellipsis,
    /// Augmented assignment operator; the payload is the binary operator
    /// symbol without the trailing `=` (`+`, `//`, `**`, ...).
    AugAssign(&'static str),

    // Layout
    Newline,
    Indent,
    Dedent,
    EndMarker,
}

impl TokenKind {
    /// Name shown in syntax errors.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Name(_) => "name",
            Self::Int { .. } | Self::Float(_) | Self::Imaginary(_) => "number",
            Self::Str(_) | Self::Bytes(_) | Self::FString { .. } => "string",
            Self::Newline => "newline",
            Self::Indent => "indent",
            Self::Dedent => "dedent",
            Self::EndMarker => "end of input",
            other => other.symbol(),
        }
    }

    /// Source text of a fixed token (keyword, operator, delimiter).
    fn symbol(&self) -> &'static str {
        match self {
            Self::False => "False",
            Self::None => "None",
            Self::True => "True",
            Self::And => "and",
            Self::As => "as",
            Self::Assert => "assert",
            Self::Async => "async",
            Self::Await => "await",
            Self::Break => "break",
            Self::Class => "class",
            Self::Continue => "continue",
            Self::Def => "def",
            Self::Del => "del",
            Self::Elif => "elif",
            Self::Else => "else",
            Self::Except => "except",
            Self::Finally => "finally",
            Self::For => "for",
            Self::From => "from",
            Self::Global => "global",
            Self::If => "if",
            Self::Import => "import",
            Self::In => "in",
            Self::Is => "is",
            Self::Lambda => "lambda",
            Self::Nonlocal => "nonlocal",
            Self::Not => "not",
            Self::Or => "or",
            Self::Pass => "pass",
            Self::Raise => "raise",
            Self::Return => "return",
            Self::Try => "try",
            Self::While => "while",
            Self::With => "with",
            Self::Yield => "yield",
            Self::Plus => "+",
            Self::Minus => "-",
            Self::Star => "*",
            Self::DoubleStar => "**",
            Self::Slash => "/",
            Self::DoubleSlash => "//",
            Self::Percent => "%",
            Self::At => "@",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::Amp => "&",
            Self::Pipe => "|",
            Self::Caret => "^",
            Self::Tilde => "~",
            Self::ColonEq => ":=",
            Self::Lt => "<",
            Self::Gt => ">",
            Self::LtEq => "<=",
            Self::GtEq => ">=",
            Self::EqEq => "==",
            Self::NotEq => "!=",
            Self::Bang => "!",
            Self::LParen => "(",
            Self::RParen => ")",
            Self::LBracket => "[",
            Self::RBracket => "]",
            Self::LBrace => "{",
            Self::RBrace => "}",
            Self::Comma => ",",
            Self::Colon => ":",
            Self::Dot => ".",
            Self::Semicolon => ";",
            Self::Eq => "=",
            Self::Arrow => "->",
            Self::Ellipsis => "...",
            Self::AugAssign(_) => "augmented assignment",
            Self::Name(_)
            | Self::Int { .. }
            | Self::Float(_)
            | Self::Imaginary(_)
            | Self::Str(_)
            | Self::Bytes(_)
            | Self::FString { .. }
            | Self::Newline
            | Self::Indent
            | Self::Dedent
            | Self::EndMarker => "token",
        }
    }

    /// True for a token that may start a string-literal run.
    pub fn is_string(&self) -> bool {
        matches!(self, Self::Str(_) | Self::Bytes(_) | Self::FString { .. })
    }
}
