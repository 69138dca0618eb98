//! Raw Token Definition
//!
//! The `RawToken` enum is the logos-derived tokenizer output before layout
//! (NEWLINE/INDENT/DEDENT) and literal cooking.

use logos::{Lexer, Logos};

/// Failure reported by the raw tokenizer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) enum RawError {
    /// No pattern matched.
    #[default]
    Unrecognized,
    /// A single-quoted string ran into a newline or the end of input.
    UnterminatedString,
    /// A triple-quoted string ran into the end of input.
    UnterminatedTripleQuoted,
}

/// Shape of a string literal token: prefix length and quote length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct StrShape {
    pub prefix_len: usize,
    pub quote_len: usize,
}

/// Raw token from logos.
#[derive(Logos, Debug, Clone, Copy, PartialEq)]
#[logos(error = RawError)]
#[logos(skip r"[ \t\x0C\r]+")] // Skip horizontal whitespace
pub(crate) enum RawToken {
    #[regex(r"#[^\n]*")]
    Comment,

    #[token("\n")]
    Newline,

    #[regex(r"\\\r?\n")]
    LineContinuation,

    #[token("False")]
    False,
    #[token("None")]
    None,
    #[token("True")]
    True,
    #[token("and")]
    And,
    #[token("as")]
    As,
    #[token("assert")]
    Assert,
    #[token("async")]
    Async,
    #[token("await")]
    Await,
    #[token("break")]
    Break,
    #[token("class")]
    Class,
    #[token("continue")]
    Continue,
    #[token("def")]
    Def,
    #[token("del")]
    Del,
    #[token("elif")]
    Elif,
    #[token("else")]
    Else,
    #[token("except")]
    Except,
    #[token("finally")]
    Finally,
    #[token("for")]
    For,
    #[token("from")]
    From,
    #[token("global")]
    Global,
    #[token("if")]
    If,
    #[token("import")]
    Import,
    #[token("in")]
    In,
    #[token("is")]
    Is,
    #[token("lambda")]
    Lambda,
    #[token("nonlocal")]
    Nonlocal,
    #[token("not")]
    Not,
    #[token("or")]
    Or,
    #[token("pass")]
    Pass,
    #[token("raise")]
    Raise,
    #[token("return")]
    Return,
    #[token("try")]
    Try,
    #[token("while")]
    While,
    #[token("with")]
    With,
    #[token("yield")]
    Yield,

    #[token("+=", aug_op)]
    #[token("-=", aug_op)]
    #[token("*=", aug_op)]
    #[token("/=", aug_op)]
    #[token("//=", aug_op)]
    #[token("%=", aug_op)]
    #[token("@=", aug_op)]
    #[token("&=", aug_op)]
    #[token("|=", aug_op)]
    #[token("^=", aug_op)]
    #[token("<<=", aug_op)]
    #[token(">>=", aug_op)]
    #[token("**=", aug_op)]
    AugAssign(&'static str),

    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("**")]
    DoubleStar,
    #[token("/")]
    Slash,
    #[token("//")]
    DoubleSlash,
    #[token("%")]
    Percent,
    #[token("@")]
    At,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("&")]
    Amp,
    #[token("|")]
    Pipe,
    #[token("^")]
    Caret,
    #[token("~")]
    Tilde,
    #[token(":=")]
    ColonEq,
    #[token("<")]
    Lt,
    #[token(">")]
    Gt,
    #[token("<=")]
    LtEq,
    #[token(">=")]
    GtEq,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("!")]
    Bang,

    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(".")]
    Dot,
    #[token(";")]
    Semicolon,
    #[token("=")]
    Eq,
    #[token("->")]
    Arrow,
    #[token("...")]
    Ellipsis,

    #[regex(r"0[xX](_?[0-9a-fA-F])+")]
    HexInt,
    #[regex(r"0[oO](_?[0-7])+")]
    OctInt,
    #[regex(r"0[bB](_?[01])+")]
    BinInt,
    #[regex(r"[0-9](_?[0-9])*")]
    DecInt,

    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*")]
    Float,

    #[regex(r"[0-9](_?[0-9])*[jJ]")]
    #[regex(r"[0-9](_?[0-9])*\.([0-9](_?[0-9])*)?([eE][+-]?[0-9](_?[0-9])*)?[jJ]")]
    #[regex(r"\.[0-9](_?[0-9])*([eE][+-]?[0-9](_?[0-9])*)?[jJ]")]
    #[regex(r"[0-9](_?[0-9])*[eE][+-]?[0-9](_?[0-9])*[jJ]")]
    Imaginary,

    // The opener (prefix and first quote) is matched by the pattern; the
    // callback scans the body and the closing quote.
    #[regex(r#"([rRuUbBfF]|[rR][bBfF]|[bBfF][rR])?["']"#, scan_string)]
    Str(StrShape),

    #[regex(r"[\p{XID_Start}_][\p{XID_Continue}]*")]
    Name,
}

/// Operator of an augmented assignment token, without the `=`.
fn aug_op(lex: &mut Lexer<'_, RawToken>) -> &'static str {
    match lex.slice() {
        "+=" => "+",
        "-=" => "-",
        "*=" => "*",
        "/=" => "/",
        "//=" => "//",
        "%=" => "%",
        "@=" => "@",
        "&=" => "&",
        "|=" => "|",
        "^=" => "^",
        "<<=" => "<<",
        ">>=" => ">>",
        _ => "**",
    }
}

/// Scan a string body after its opener, bumping the lexer past the closing
/// quote.
///
/// A backslash always escapes the next byte for the purpose of finding the
/// end, in raw strings too.
fn scan_string(lex: &mut Lexer<'_, RawToken>) -> Result<StrShape, RawError> {
    let opener = lex.slice().as_bytes();
    let prefix_len = opener.len() - 1;
    let quote = opener[prefix_len];
    let rest = lex.remainder().as_bytes();

    let triple = rest.len() >= 2 && rest[0] == quote && rest[1] == quote;
    let (quote_len, mut i) = if triple { (3, 2) } else { (1, 0) };

    while i < rest.len() {
        match rest[i] {
            b'\\' => i += 2,
            b'\n' if !triple => {
                lex.bump(i);
                return Err(RawError::UnterminatedString);
            }
            b if b == quote => {
                if !triple {
                    lex.bump(i + 1);
                    return Ok(StrShape {
                        prefix_len,
                        quote_len,
                    });
                }
                if rest.get(i + 1) == Some(&quote) && rest.get(i + 2) == Some(&quote) {
                    lex.bump(i + 3);
                    return Ok(StrShape {
                        prefix_len,
                        quote_len,
                    });
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    lex.bump(rest.len());
    Err(if triple {
        RawError::UnterminatedTripleQuoted
    } else {
        RawError::UnterminatedString
    })
}
