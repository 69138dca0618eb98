//! Methods of `str` and `bytes`.
//!
//! Positions taken and returned by these methods count characters, not
//! bytes; the helpers below convert between the two.

use super::no_such_method;
use crate::args::{expect_int, expect_str, optional, CallArgs};
use crate::builtins::decode;
use crate::errors::{type_error, value_error, EvalResult};
use crate::value::iterate;
use crate::Value;

pub(super) fn call_str(s: &str, name: &str, mut args: CallArgs) -> EvalResult {
    match name {
        "upper" => no_args(args, name).map(|()| Value::str(s.to_uppercase())),
        "lower" => no_args(args, name).map(|()| Value::str(s.to_lowercase())),
        "title" => no_args(args, name).map(|()| Value::str(title(s))),
        "capitalize" => no_args(args, name).map(|()| Value::str(capitalize(s))),
        "strip" | "lstrip" | "rstrip" => {
            let args = args.between(name, 0, 1)?;
            let chars = match optional(&args, 0) {
                Some(v) => Some(expect_str(name, v)?.to_string()),
                None => None,
            };
            let matcher = |c: char| match &chars {
                Some(set) => set.contains(c),
                None => c.is_whitespace(),
            };
            let out = match name {
                "strip" => s.trim_matches(matcher),
                "lstrip" => s.trim_start_matches(matcher),
                _ => s.trim_end_matches(matcher),
            };
            Ok(Value::str(out))
        }
        "split" | "rsplit" => {
            let sep = args.take_keyword("sep");
            let maxsplit = args.take_keyword("maxsplit");
            let positional = args.between(name, 0, 2)?;
            let sep = sep.or_else(|| positional.first().cloned());
            let maxsplit = match maxsplit.or_else(|| positional.get(1).cloned()) {
                Some(v) => expect_int(&v)?,
                None => -1,
            };
            let limit = usize::try_from(maxsplit).ok();
            let parts = match sep {
                None | Some(Value::None) => split_whitespace(s, limit, name == "rsplit"),
                Some(sep) => {
                    let sep = expect_str(name, &sep)?;
                    if sep.is_empty() {
                        return Err(value_error("empty separator"));
                    }
                    split_on(s, sep, limit, name == "rsplit")
                }
            };
            Ok(Value::list(parts.into_iter().map(Value::str).collect()))
        }
        "join" => {
            let iterable = args.single(name)?;
            let mut out = String::new();
            for (index, item) in iterate(&iterable)?.enumerate() {
                let Value::Str(piece) = &item else {
                    return Err(type_error(format!(
                        "sequence item {index}: expected str instance, {} found",
                        item.type_name()
                    )));
                };
                if index > 0 {
                    out.push_str(s);
                }
                out.push_str(piece);
            }
            Ok(Value::str(out))
        }
        "replace" => {
            let args = args.between(name, 2, 3)?;
            let old = expect_str(name, &args[0])?;
            let new = expect_str(name, &args[1])?;
            let count = match args.get(2) {
                Some(v) => expect_int(v)?,
                None => -1,
            };
            let out = match usize::try_from(count) {
                Ok(n) => s.replacen(old, new, n),
                Err(_) => s.replace(old, new),
            };
            Ok(Value::str(out))
        }
        "startswith" | "endswith" => {
            let args = args.between(name, 1, 3)?;
            let (lo, hi) = char_window(s, args.get(1), args.get(2))?;
            let window = &s[lo..hi];
            let test = |prefix: &str| {
                if name == "startswith" {
                    window.starts_with(prefix)
                } else {
                    window.ends_with(prefix)
                }
            };
            match &args[0] {
                Value::Str(p) => Ok(Value::Bool(test(p))),
                Value::Tuple(options) => {
                    for option in options.iter() {
                        if test(expect_str(name, option)?) {
                            return Ok(Value::Bool(true));
                        }
                    }
                    Ok(Value::Bool(false))
                }
                other => Err(type_error(format!(
                    "{name} first arg must be str or a tuple of str, not {}",
                    other.type_name()
                ))),
            }
        }
        "find" | "rfind" | "index" | "rindex" | "count" => {
            let args = args.between(name, 1, 3)?;
            let needle = expect_str(name, &args[0])?;
            let (lo, hi) = char_window(s, args.get(1), args.get(2))?;
            let window = &s[lo..hi];
            if name == "count" {
                let n = if needle.is_empty() {
                    window.chars().count() + 1
                } else {
                    window.matches(needle).count()
                };
                return Ok(Value::Int(i64::try_from(n).unwrap_or(i64::MAX)));
            }
            let found = if name.starts_with('r') {
                window.rfind(needle)
            } else {
                window.find(needle)
            };
            match found {
                Some(at) => Ok(Value::Int(char_index(s, lo + at))),
                None if name.ends_with("index") => Err(value_error("substring not found")),
                None => Ok(Value::Int(-1)),
            }
        }
        "isdigit" | "isnumeric" | "isdecimal" => {
            no_args(args, name)?;
            Ok(Value::Bool(!s.is_empty() && s.chars().all(char::is_numeric)))
        }
        "isalpha" => predicate(s, args, name, char::is_alphabetic),
        "isalnum" => predicate(s, args, name, char::is_alphanumeric),
        "isspace" => predicate(s, args, name, char::is_whitespace),
        "isupper" | "islower" => {
            no_args(args, name)?;
            let mut cased = false;
            for c in s.chars() {
                if c.is_lowercase() {
                    if name == "isupper" {
                        return Ok(Value::Bool(false));
                    }
                    cased = true;
                } else if c.is_uppercase() {
                    if name == "islower" {
                        return Ok(Value::Bool(false));
                    }
                    cased = true;
                }
            }
            Ok(Value::Bool(cased))
        }
        "zfill" => {
            let width = width_arg(&args.single(name)?)?;
            let len = s.chars().count();
            if len >= width {
                return Ok(Value::str(s));
            }
            let (sign, digits) = match s.chars().next() {
                Some(c @ ('+' | '-')) => (Some(c), &s[1..]),
                _ => (None, s),
            };
            let mut out = String::with_capacity(width);
            out.extend(sign);
            out.extend(std::iter::repeat('0').take(width - len));
            out.push_str(digits);
            Ok(Value::str(out))
        }
        "center" | "ljust" | "rjust" => {
            let args = args.between(name, 1, 2)?;
            let width = width_arg(&args[0])?;
            let fill = match args.get(1) {
                Some(v) => {
                    let f = expect_str(name, v)?;
                    let mut chars = f.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) => c,
                        _ => {
                            return Err(type_error(
                                "The fill character must be exactly one character long",
                            ))
                        }
                    }
                }
                None => ' ',
            };
            Ok(Value::str(pad(s, width, fill, name)))
        }
        "removeprefix" => {
            let prefix = args.single(name)?;
            let prefix = expect_str(name, &prefix)?;
            Ok(Value::str(s.strip_prefix(prefix).unwrap_or(s)))
        }
        "removesuffix" => {
            let suffix = args.single(name)?;
            let suffix = expect_str(name, &suffix)?;
            Ok(Value::str(s.strip_suffix(suffix).unwrap_or(s)))
        }
        _ => Err(no_such_method(name, "str")),
    }
}

pub(super) fn call_bytes(data: &[u8], name: &str, mut args: CallArgs) -> EvalResult {
    match name {
        "decode" => {
            let encoding = args.take_keyword("encoding");
            let positional = args.between(name, 0, 1)?;
            let encoding = encoding
                .or_else(|| positional.first().cloned())
                .unwrap_or_else(|| Value::str("utf-8"));
            decode(data, &encoding)
        }
        "hex" => {
            no_args(args, name)?;
            let mut out = String::with_capacity(data.len() * 2);
            for b in data {
                out.push_str(&format!("{b:02x}"));
            }
            Ok(Value::str(out))
        }
        _ => Err(no_such_method(name, "bytes")),
    }
}

fn no_args(args: CallArgs, name: &str) -> EvalResult<()> {
    args.exact(name, 0).map(drop)
}

fn predicate(s: &str, args: CallArgs, name: &str, test: fn(char) -> bool) -> EvalResult {
    no_args(args, name)?;
    Ok(Value::Bool(!s.is_empty() && s.chars().all(test)))
}

fn width_arg(value: &Value) -> EvalResult<usize> {
    Ok(usize::try_from(expect_int(value)?).unwrap_or(0))
}

/// Byte offset of the character at `index` (clamped to the end).
fn byte_offset(s: &str, index: usize) -> usize {
    s.char_indices().nth(index).map_or(s.len(), |(at, _)| at)
}

/// Character index of a byte offset.
fn char_index(s: &str, offset: usize) -> i64 {
    i64::try_from(s[..offset].chars().count()).unwrap_or(i64::MAX)
}

/// Byte range of `s[start:end]` with slice-style character bounds.
fn char_window(s: &str, start: Option<&Value>, end: Option<&Value>) -> EvalResult<(usize, usize)> {
    let len = i64::try_from(s.chars().count()).unwrap_or(i64::MAX);
    let resolve = |bound: Option<&Value>, default: i64| -> EvalResult<usize> {
        let raw = match bound {
            None | Some(Value::None) => default,
            Some(v) => expect_int(v)?,
        };
        let clamped = if raw < 0 { (raw + len).max(0) } else { raw.min(len) };
        Ok(usize::try_from(clamped).unwrap_or(0))
    };
    let lo = resolve(start, 0)?;
    let hi = resolve(end, len)?.max(lo);
    Ok((byte_offset(s, lo), byte_offset(s, hi)))
}

fn title(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_cased = false;
    for c in s.chars() {
        if prev_cased {
            out.extend(c.to_lowercase());
        } else {
            out.extend(c.to_uppercase());
        }
        prev_cased = c.is_alphabetic();
    }
    out
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn split_whitespace(s: &str, limit: Option<usize>, from_right: bool) -> Vec<String> {
    let words: Vec<&str> = s.split_whitespace().collect();
    let limit = match limit {
        Some(limit) if limit < words.len() => limit,
        _ => return words.into_iter().map(str::to_string).collect(),
    };
    if from_right {
        let mut rest = s.trim_end();
        let mut tail = Vec::with_capacity(limit + 1);
        for _ in 0..limit {
            let at = rest.rfind(char::is_whitespace).unwrap_or(0);
            let word_start = rest[at..]
                .char_indices()
                .find(|(_, c)| !c.is_whitespace())
                .map_or(at, |(i, _)| at + i);
            tail.push(rest[word_start..].to_string());
            rest = rest[..at].trim_end();
        }
        tail.push(rest.to_string());
        tail.reverse();
        tail
    } else {
        let mut rest = s.trim_start();
        let mut head = Vec::with_capacity(limit + 1);
        for _ in 0..limit {
            let at = rest.find(char::is_whitespace).unwrap_or(rest.len());
            head.push(rest[..at].to_string());
            rest = rest[at..].trim_start();
        }
        head.push(rest.to_string());
        head
    }
}

fn split_on(s: &str, sep: &str, limit: Option<usize>, from_right: bool) -> Vec<String> {
    let parts: Vec<String> = match (limit, from_right) {
        (None, _) => s.split(sep).map(str::to_string).collect(),
        (Some(n), false) => s.splitn(n + 1, sep).map(str::to_string).collect(),
        (Some(n), true) => {
            let mut parts: Vec<String> = s.rsplitn(n + 1, sep).map(str::to_string).collect();
            parts.reverse();
            parts
        }
    };
    parts
}

fn pad(s: &str, width: usize, fill: char, how: &str) -> String {
    let len = s.chars().count();
    if len >= width {
        return s.to_string();
    }
    let total = width - len;
    let (left, right) = match how {
        "ljust" => (0, total),
        "rjust" => (total, 0),
        // Odd padding goes left when the target width is odd.
        _ => {
            let left = total / 2 + (total & width & 1);
            (left, total - left)
        }
    };
    let mut out = String::with_capacity(width);
    out.extend(std::iter::repeat(fill).take(left));
    out.push_str(s);
    out.extend(std::iter::repeat(fill).take(right));
    out
}
