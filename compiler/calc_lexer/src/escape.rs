//! Escape processing for string and bytes literals.
//!
//! Recognised escapes: `\\` `\'` `\"` `\a` `\b` `\f` `\n` `\r` `\t` `\v`,
//! octal `\ooo`, `\xhh`, a backslash-newline continuation, and in `str`
//! literals only `\uXXXX` and `\UXXXXXXXX`. Any other backslash pair is kept
//! verbatim. Raw literals skip escape processing entirely.

use std::iter::Peekable;
use std::str::CharIndices;

use calc_ir::Span;

use crate::lex_error::{LexError, LexErrorKind};

/// Cook a `str` literal body. `base` is the source offset of `body`.
pub fn unescape_str(body: &str, raw: bool, base: u32) -> Result<String, LexError> {
    if raw || !body.contains('\\') {
        return Ok(body.to_owned());
    }
    let mut out = String::with_capacity(body.len());
    for unit in decode(body, false, base)? {
        let c = char::from_u32(unit.value)
            .ok_or_else(|| LexError::new(LexErrorKind::InvalidCodePoint, unit.span))?;
        out.push(c);
    }
    Ok(out)
}

/// Cook a `bytes` literal body. `base` is the source offset of `body`.
pub fn unescape_bytes(body: &str, raw: bool, base: u32) -> Result<Vec<u8>, LexError> {
    if let Some((i, c)) = body.char_indices().find(|(_, c)| !c.is_ascii()) {
        return Err(LexError::new(
            LexErrorKind::NonAsciiBytes,
            char_span(base, i, c),
        ));
    }
    if raw {
        return Ok(body.as_bytes().to_vec());
    }
    decode(body, true, base)?
        .into_iter()
        .map(|unit| {
            u8::try_from(unit.value)
                .map_err(|_| LexError::new(LexErrorKind::OctalEscapeTooLarge, unit.span))
        })
        .collect()
}

struct Unit {
    value: u32,
    span: Span,
}

fn char_span(base: u32, offset: usize, c: char) -> Span {
    Span::from_range(offset..offset + c.len_utf8()).shifted(base)
}

fn decode(body: &str, bytes: bool, base: u32) -> Result<Vec<Unit>, LexError> {
    let mut out = Vec::with_capacity(body.len());
    let mut chars = body.char_indices().peekable();

    while let Some((i, c)) = chars.next() {
        if c != '\\' {
            out.push(Unit {
                value: u32::from(c),
                span: char_span(base, i, c),
            });
            continue;
        }
        let Some((j, esc)) = chars.next() else {
            out.push(Unit {
                value: u32::from('\\'),
                span: char_span(base, i, c),
            });
            break;
        };
        let span = Span::from_range(i..j + esc.len_utf8()).shifted(base);
        let simple = match esc {
            '\n' => continue,
            '\r' => {
                if chars.peek().is_some_and(|&(_, n)| n == '\n') {
                    chars.next();
                }
                continue;
            }
            '\\' | '\'' | '"' => Some(u32::from(esc)),
            'a' => Some(0x07),
            'b' => Some(0x08),
            'f' => Some(0x0C),
            'n' => Some(0x0A),
            'r' => Some(0x0D),
            't' => Some(0x09),
            'v' => Some(0x0B),
            _ => None,
        };
        if let Some(value) = simple {
            out.push(Unit { value, span });
            continue;
        }

        match esc {
            '0'..='7' => {
                let mut value = u32::from(esc) - u32::from('0');
                let mut end = j + 1;
                for _ in 0..2 {
                    match chars.peek() {
                        Some(&(k, d @ '0'..='7')) => {
                            value = value * 8 + (u32::from(d) - u32::from('0'));
                            end = k + 1;
                            chars.next();
                        }
                        _ => break,
                    }
                }
                out.push(Unit {
                    value,
                    span: Span::from_range(i..end).shifted(base),
                });
            }
            'x' => out.push(hex_escape(&mut chars, i, 2, "\\xXX", base)?),
            'u' if !bytes => out.push(hex_escape(&mut chars, i, 4, "\\uXXXX", base)?),
            'U' if !bytes => out.push(hex_escape(&mut chars, i, 8, "\\UXXXXXXXX", base)?),
            'N' if !bytes => return Err(LexError::new(LexErrorKind::NamedEscape, span)),
            _ => {
                out.push(Unit {
                    value: u32::from('\\'),
                    span,
                });
                out.push(Unit {
                    value: u32::from(esc),
                    span,
                });
            }
        }
    }

    Ok(out)
}

fn hex_escape(
    chars: &mut Peekable<CharIndices<'_>>,
    start: usize,
    digits: usize,
    escape: &'static str,
    base: u32,
) -> Result<Unit, LexError> {
    let mut value = 0u32;
    // `\` plus the escape letter
    let mut end = start + 2;
    for _ in 0..digits {
        match chars.peek() {
            Some(&(k, d)) if d.is_ascii_hexdigit() => {
                value = value * 16 + d.to_digit(16).unwrap_or(0);
                end = k + 1;
                chars.next();
            }
            _ => {
                return Err(LexError::truncated_escape(
                    escape,
                    Span::from_range(start..end).shifted(base),
                ))
            }
        }
    }
    Ok(Unit {
        value,
        span: Span::from_range(start..end).shifted(base),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_plain_body_is_borrowed_verbatim() {
        assert_eq!(unescape_str("abc", false, 0).ok(), Some("abc".to_owned()));
    }

    #[test]
    fn test_common_escapes() {
        assert_eq!(
            unescape_str(r"a\tb\n\\\'\x41\101é", false, 0).ok(),
            Some("a\tb\n\\'AAé".to_owned())
        );
    }

    #[test]
    fn test_unknown_escape_kept() {
        assert_eq!(unescape_str(r"\d", false, 0).ok(), Some("\\d".to_owned()));
    }

    #[test]
    fn test_raw_keeps_backslashes() {
        assert_eq!(unescape_str(r"\n", true, 0).ok(), Some("\\n".to_owned()));
    }

    #[test]
    fn test_line_continuation_in_string() {
        assert_eq!(unescape_str("a\\\nb", false, 0).ok(), Some("ab".to_owned()));
    }

    #[test]
    fn test_truncated_hex_escape() {
        let err = unescape_str(r"ab\x4", false, 10);
        assert_eq!(
            err,
            Err(LexError::truncated_escape("\\xXX", Span::new(12, 15)))
        );
    }

    #[test]
    fn test_bytes_escapes() {
        assert_eq!(
            unescape_bytes(r"\x00\xff\u", false, 0).ok(),
            Some(vec![0, 255, b'\\', b'u'])
        );
    }

    #[test]
    fn test_bytes_reject_non_ascii() {
        let err = unescape_bytes("aé", false, 0).map_err(|e| e.kind);
        assert_eq!(err, Err(LexErrorKind::NonAsciiBytes));
    }

    #[test]
    fn test_bytes_octal_too_large() {
        let err = unescape_bytes(r"\777", false, 0).map_err(|e| e.kind);
        assert_eq!(err, Err(LexErrorKind::OctalEscapeTooLarge));
    }
}
