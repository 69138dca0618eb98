//! `repr()` / `str()` rendering.

use std::fmt::Write;

use super::{TypeTag, Value};
use crate::numeric::decimal_to_string;

impl Value {
    /// The `repr()` form.
    pub fn repr(&self) -> String {
        let mut out = String::new();
        write_repr(self, &mut out, &mut Vec::new());
        out
    }

    /// The `str()` form.
    pub fn to_str(&self) -> String {
        match self {
            Value::Str(s) => s.to_string(),
            Value::Decimal(d) => decimal_to_string(d),
            other => other.repr(),
        }
    }

    /// The `ascii()` form: `repr()` with non-ASCII characters escaped.
    pub fn ascii(&self) -> String {
        let mut out = String::new();
        for c in self.repr().chars() {
            if c.is_ascii() {
                out.push(c);
            } else {
                push_escaped_char(&mut out, c);
            }
        }
        out
    }
}

/// Containers currently being rendered, by address.
type Visiting = Vec<usize>;

fn write_repr(value: &Value, out: &mut String, visiting: &mut Visiting) {
    match value {
        Value::None => out.push_str("None"),
        Value::Bool(true) => out.push_str("True"),
        Value::Bool(false) => out.push_str("False"),
        Value::Int(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => out.push_str(&float_repr(*f)),
        Value::Decimal(d) => {
            let _ = write!(out, "Decimal('{}')", decimal_to_string(d));
        }
        Value::Ellipsis => out.push_str("Ellipsis"),
        Value::Str(s) => out.push_str(&str_repr(s)),
        Value::Bytes(b) => out.push_str(&bytes_repr(b)),
        Value::Tuple(items) => {
            out.push('(');
            write_items(items.iter(), out, visiting);
            if items.len() == 1 {
                out.push(',');
            }
            out.push(')');
        }
        Value::Range(r) => {
            if r.step == 1 {
                let _ = write!(out, "range({}, {})", r.start, r.stop);
            } else {
                let _ = write!(out, "range({}, {}, {})", r.start, r.stop, r.step);
            }
        }
        Value::Slice(s) => {
            out.push_str("slice(");
            write_repr(&s.start, out, visiting);
            out.push_str(", ");
            write_repr(&s.stop, out, visiting);
            out.push_str(", ");
            write_repr(&s.step, out, visiting);
            out.push(')');
        }
        Value::List(items) => {
            if enter(items.addr(), visiting) {
                out.push('[');
                write_items(items.borrow().iter(), out, visiting);
                out.push(']');
                visiting.pop();
            } else {
                out.push_str("[...]");
            }
        }
        Value::Dict(table) => {
            if enter(table.addr(), visiting) {
                out.push('{');
                for (i, (k, v)) in table.borrow().iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    write_repr(k, out, visiting);
                    out.push_str(": ");
                    write_repr(v, out, visiting);
                }
                out.push('}');
                visiting.pop();
            } else {
                out.push_str("{...}");
            }
        }
        Value::Set(table) => {
            let table = table.borrow();
            if table.is_empty() {
                out.push_str("set()");
            } else {
                out.push('{');
                write_items(table.keys(), out, visiting);
                out.push('}');
            }
        }
        Value::Iterator(state) => {
            let _ = write!(out, "<{} object>", state.borrow().kind);
        }
        Value::Builtin(b) => {
            let _ = write!(out, "<built-in function {}>", b.name());
        }
        Value::Type(tag) => {
            let _ = write!(out, "<class '{}'>", tag.name());
        }
        Value::Module(m) => {
            let _ = write!(out, "<module '{}'>", m.name());
        }
        Value::Method(m) => {
            let _ = write!(
                out,
                "<built-in method {} of {} object>",
                m.name,
                m.receiver.type_name()
            );
        }
        Value::UnboundMethod(tag, name) => {
            let _ = write!(out, "<method '{name}' of '{}' objects>", class_name(*tag));
        }
    }
}

fn class_name(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Decimal => "decimal.Decimal",
        other => other.name(),
    }
}

fn enter(addr: usize, visiting: &mut Visiting) -> bool {
    if visiting.contains(&addr) {
        return false;
    }
    visiting.push(addr);
    true
}

fn write_items<'a>(
    items: impl Iterator<Item = &'a Value>,
    out: &mut String,
    visiting: &mut Visiting,
) {
    for (i, item) in items.enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_repr(item, out, visiting);
    }
}

/// Python float repr: shortest round-trip digits, scientific notation when
/// the decimal exponent is below -4 or at least 16.
pub fn float_repr(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i64 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let sign = if f.is_sign_negative() { "-" } else { "" };

    if (-4..16).contains(&exp) {
        let body = if exp >= 0 {
            let int_len = usize::try_from(exp + 1).unwrap_or(0);
            if digits.len() <= int_len {
                format!("{digits}{}.0", "0".repeat(int_len - digits.len()))
            } else {
                format!("{}.{}", &digits[..int_len], &digits[int_len..])
            }
        } else {
            let zeros = usize::try_from(-exp - 1).unwrap_or(0);
            format!("0.{}{digits}", "0".repeat(zeros))
        };
        format!("{sign}{body}")
    } else {
        let (first, rest) = digits.split_at(1);
        let frac = if rest.is_empty() {
            String::new()
        } else {
            format!(".{rest}")
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{sign}{first}{frac}e{exp_sign}{:02}", exp.abs())
    }
}

/// Quote a string the way Python's `repr` does.
pub fn str_repr(s: &str) -> String {
    let quote = if s.contains('\'') && !s.contains('"') {
        '"'
    } else {
        '\''
    };
    let mut out = String::with_capacity(s.len() + 2);
    out.push(quote);
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c if c.is_control() => push_escaped_char(&mut out, c),
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

fn bytes_repr(bytes: &[u8]) -> String {
    let quote = if bytes.contains(&b'\'') && !bytes.contains(&b'"') {
        b'"'
    } else {
        b'\''
    };
    let mut out = String::with_capacity(bytes.len() + 3);
    out.push('b');
    out.push(char::from(quote));
    for &b in bytes {
        match b {
            b'\\' => out.push_str("\\\\"),
            b'\n' => out.push_str("\\n"),
            b'\r' => out.push_str("\\r"),
            b'\t' => out.push_str("\\t"),
            b if b == quote => {
                out.push('\\');
                out.push(char::from(b));
            }
            0x20..=0x7e => out.push(char::from(b)),
            b => {
                let _ = write!(out, "\\x{b:02x}");
            }
        }
    }
    out.push(char::from(quote));
    out
}

fn push_escaped_char(out: &mut String, c: char) {
    let code = u32::from(c);
    let _ = if code <= 0xff {
        write!(out, "\\x{code:02x}")
    } else if code <= 0xffff {
        write!(out, "\\u{code:04x}")
    } else {
        write!(out, "\\U{code:08x}")
    };
}
