//! The `format()` mini-language for `format(value, spec)` and f-string
//! replacement fields.
//!
//! Supports:
//! - Integers: decimal, binary, octal, hex, char, sign, alternate, grouping
//! - Floats: repr default, scientific, fixed-point, general, percentage
//! - Decimals: exact fixed-point and percentage; other types via `f64`
//! - Strings: precision truncation, width, alignment

use std::borrow::Cow;

use bigdecimal::{BigDecimal, RoundingMode};
use calc_ir::format_spec::{parse_format_spec, Align, FormatType, ParsedFormatSpec, Sign};

use crate::errors::{overflow, type_error, value_error, EvalError, EvalResult};
use crate::numeric::{decimal_parts, decimal_to_f64, decimal_to_string, i64_to_f64};
use crate::value::float_repr;
use crate::Value;

/// Format `value` with a format specification.
pub fn format_value(value: &Value, spec: &str) -> EvalResult<String> {
    if spec.is_empty() {
        return Ok(value.to_str());
    }
    let parsed = parse_format_spec(spec).map_err(|e| value_error(e.to_string()))?;
    match value {
        Value::Int(_) | Value::Bool(_) => format_int(value.as_int().unwrap_or(0), &parsed, value),
        Value::Float(f) => format_float(*f, &parsed, "float"),
        Value::Decimal(d) => format_decimal(d, &parsed),
        Value::Str(s) => format_str(s, &parsed),
        other => Err(type_error(format!(
            "unsupported format string passed to {}.__format__",
            other.type_name()
        ))),
    }
}

#[cold]
fn unknown_code(format_type: FormatType, type_name: &str) -> EvalError {
    value_error(format!(
        "Unknown format code '{}' for object of type '{type_name}'",
        format_type.as_char()
    ))
}

fn format_int(n: i64, spec: &ParsedFormatSpec, value: &Value) -> EvalResult<String> {
    let type_name = value.type_name();
    match spec.format_type {
        Some(
            FormatType::Exp
            | FormatType::ExpUpper
            | FormatType::Fixed
            | FormatType::FixedUpper
            | FormatType::General
            | FormatType::GeneralUpper
            | FormatType::Percent,
        ) => return format_float(i64_to_f64(n), spec, type_name),
        Some(FormatType::Str) => return Err(unknown_code(FormatType::Str, type_name)),
        _ => {}
    }
    if spec.precision.is_some() {
        return Err(value_error(
            "Precision not allowed in integer format specifier",
        ));
    }
    if spec.format_type == Some(FormatType::Char) {
        if spec.sign.is_some() {
            return Err(value_error(
                "Sign not allowed with integer format specifier 'c'",
            ));
        }
        let c = u32::try_from(n)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| overflow("%c arg not in range(0x110000)"))?;
        return Ok(pad(&c.to_string(), "", spec, Align::Right));
    }

    let magnitude = n.unsigned_abs();
    let (digits, prefix, group_size) = match spec.format_type {
        Some(FormatType::Binary) => (format!("{magnitude:b}"), "0b", 4),
        Some(FormatType::Octal) => (format!("{magnitude:o}"), "0o", 4),
        Some(FormatType::Hex) => (format!("{magnitude:x}"), "0x", 4),
        Some(FormatType::HexUpper) => (format!("{magnitude:X}"), "0X", 4),
        _ => (magnitude.to_string(), "", 3),
    };
    let prefix = if spec.alternate { prefix } else { "" };
    let sign = sign_str(n < 0, spec);
    let head = format!("{sign}{prefix}");
    Ok(assemble(&head, &digits, "", group_size, spec))
}

fn format_float(f: f64, spec: &ParsedFormatSpec, type_name: &str) -> EvalResult<String> {
    let format_type = spec.format_type;
    if let Some(t) = format_type.filter(|t| t.is_integer_only() || *t == FormatType::Str) {
        return Err(unknown_code(t, type_name));
    }
    let upper = matches!(
        format_type,
        Some(FormatType::ExpUpper | FormatType::FixedUpper | FormatType::GeneralUpper)
    );
    let magnitude = f.abs();
    let body = if f.is_nan() {
        "nan".to_string()
    } else if f.is_infinite() {
        "inf".to_string()
    } else {
        match format_type {
            Some(FormatType::Fixed | FormatType::FixedUpper) => {
                let precision = spec.precision.unwrap_or(6);
                fixed(magnitude, precision, spec.alternate)
            }
            Some(FormatType::Exp | FormatType::ExpUpper) => {
                scientific(magnitude, spec.precision.unwrap_or(6), spec.alternate)
            }
            Some(FormatType::Percent) => {
                let precision = spec.precision.unwrap_or(6);
                format!("{}%", fixed(magnitude * 100.0, precision, spec.alternate))
            }
            Some(FormatType::General | FormatType::GeneralUpper | FormatType::Number) => {
                general(magnitude, spec.precision.unwrap_or(6), spec.alternate)
            }
            _ => match spec.precision {
                None => float_repr(magnitude),
                Some(precision) => {
                    let mut out = general(magnitude, precision, spec.alternate);
                    if !out.contains(['.', 'e']) {
                        out.push_str(".0");
                    }
                    out
                }
            },
        }
    };
    let body = if upper { body.to_uppercase() } else { body };
    let negative = f.is_sign_negative() && !f.is_nan();
    let negative = negative && !(spec.coerce_zero && is_zero_text(&body));
    let sign = sign_str(negative, spec);

    // Grouping applies to the integer part only.
    let split = body.find(['.', 'e', 'E', '%']).unwrap_or(body.len());
    let (int_part, rest) = body.split_at(split);
    if f.is_finite() {
        Ok(assemble(sign, int_part, rest, 3, spec))
    } else {
        Ok(pad(&format!("{sign}{body}"), "", spec, Align::Right))
    }
}

fn format_decimal(d: &BigDecimal, spec: &ParsedFormatSpec) -> EvalResult<String> {
    let type_name = "decimal.Decimal";
    let negative = decimal_parts(d).negative;
    let body = match spec.format_type {
        Some(t) if t.is_integer_only() || t == FormatType::Str => {
            return Err(unknown_code(t, type_name))
        }
        None if spec.precision.is_none() => decimal_to_string(&d.abs()),
        Some(FormatType::Fixed | FormatType::FixedUpper) => {
            let magnitude = d.abs();
            match spec.precision {
                Some(p) => plain(&round_to(&magnitude, p)),
                None => plain(&magnitude),
            }
        }
        Some(FormatType::Percent) => {
            let scaled = d.abs() * BigDecimal::from(100);
            let text = match spec.precision {
                Some(p) => plain(&round_to(&scaled, p)),
                None => plain(&scaled),
            };
            format!("{text}%")
        }
        _ => {
            // Remaining presentation types go through binary floating point.
            let formatted = format_float(decimal_to_f64(d).abs(), &unsigned(spec), type_name)?;
            return Ok(pad_signed(&formatted, negative, spec));
        }
    };
    let negative = negative && !(spec.coerce_zero && is_zero_text(&body));
    let sign = sign_str(negative, spec);
    let split = body.find(['.', 'E', '%']).unwrap_or(body.len());
    let (int_part, rest) = body.split_at(split);
    Ok(assemble(sign, int_part, rest, 3, spec))
}

/// The spec with the width and sign stripped, for formatting a magnitude.
fn unsigned(spec: &ParsedFormatSpec) -> ParsedFormatSpec {
    ParsedFormatSpec {
        width: None,
        sign: None,
        fill: None,
        align: None,
        zero_pad: false,
        grouping: None,
        ..spec.clone()
    }
}

fn pad_signed(magnitude: &str, negative: bool, spec: &ParsedFormatSpec) -> String {
    let sign = sign_str(negative, spec);
    let split = magnitude.find(['.', 'e', 'E', '%']).unwrap_or(magnitude.len());
    let (int_part, rest) = magnitude.split_at(split);
    assemble(sign, int_part, rest, 3, spec)
}

fn round_to(d: &BigDecimal, precision: usize) -> BigDecimal {
    let scale = i64::try_from(precision).unwrap_or(i64::MAX);
    d.with_scale_round(scale, RoundingMode::HalfEven)
}

fn format_str(s: &str, spec: &ParsedFormatSpec) -> EvalResult<String> {
    if let Some(t) = spec.format_type.filter(|t| *t != FormatType::Str) {
        return Err(unknown_code(t, "str"));
    }
    if spec.sign.is_some() {
        return Err(value_error("Sign not allowed in string format specifier"));
    }
    if spec.alternate {
        return Err(value_error(
            "Alternate form (#) not allowed in string format specifier",
        ));
    }
    if spec.align == Some(Align::AfterSign) {
        return Err(value_error(
            "'=' alignment not allowed in string format specifier",
        ));
    }
    let truncated: Cow<'_, str> = match spec.precision {
        Some(p) if s.chars().count() > p => Cow::Owned(s.chars().take(p).collect()),
        _ => Cow::Borrowed(s),
    };
    Ok(pad(&truncated, "", spec, Align::Left))
}

fn sign_str(negative: bool, spec: &ParsedFormatSpec) -> &'static str {
    if negative {
        "-"
    } else {
        match spec.sign {
            Some(Sign::Plus) => "+",
            Some(Sign::Space) => " ",
            _ => "",
        }
    }
}

/// True when the rendered magnitude is zero (for the `z` option).
fn is_zero_text(body: &str) -> bool {
    body.chars()
        .take_while(|c| !matches!(c, 'e' | 'E' | '%'))
        .all(|c| c == '0' || c == '.')
}

/// Insert `sep` every `size` digits, from the right.
fn group(digits: &str, sep: char, size: usize) -> String {
    let count = digits.chars().count();
    let mut out = String::with_capacity(count + count / size);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % size == 0 {
            out.push(sep);
        }
        out.push(c);
    }
    out
}

/// Build `head` + grouped `digits` + `tail`, then pad to the width.
fn assemble(
    head: &str,
    digits: &str,
    tail: &str,
    group_size: usize,
    spec: &ParsedFormatSpec,
) -> String {
    let zero_fill = spec.zero_pad && spec.fill.is_none() && spec.align.is_none();
    let render = |digits: &str| match spec.grouping {
        Some(sep) => group(digits, sep, group_size),
        None => digits.to_string(),
    };
    if zero_fill {
        let width = spec.width.unwrap_or(0);
        let fixed_len = head.chars().count() + tail.chars().count();
        let mut padded = digits.to_string();
        while fixed_len + render(&padded).chars().count() < width {
            padded.insert(0, '0');
        }
        return format!("{head}{}{tail}", render(&padded));
    }
    pad(&format!("{}{tail}", render(digits)), head, spec, Align::Right)
}

/// Pad `head` + `body` to the spec's width.
fn pad(body: &str, head: &str, spec: &ParsedFormatSpec, default_align: Align) -> String {
    let len = head.chars().count() + body.chars().count();
    let width = spec.width.unwrap_or(0);
    if len >= width {
        return format!("{head}{body}");
    }
    let fill = spec.fill.unwrap_or(if spec.zero_pad { '0' } else { ' ' });
    let total = width - len;
    let fill_n = |n: usize| std::iter::repeat(fill).take(n).collect::<String>();
    match spec.align.unwrap_or(default_align) {
        Align::Left => format!("{head}{body}{}", fill_n(total)),
        Align::Right => format!("{}{head}{body}", fill_n(total)),
        Align::AfterSign => format!("{head}{}{body}", fill_n(total)),
        Align::Center => {
            let left = total / 2;
            format!("{}{head}{body}{}", fill_n(left), fill_n(total - left))
        }
    }
}

/// `{:.Nf}` with the alternate form keeping a trailing point.
fn fixed(f: f64, precision: usize, alternate: bool) -> String {
    let mut out = format!("{f:.precision$}");
    if alternate && precision == 0 {
        out.push('.');
    }
    out
}

/// `{:.Ne}` with a signed exponent of at least two digits.
fn scientific(f: f64, precision: usize, alternate: bool) -> String {
    let raw = format!("{f:.precision$e}");
    let (mantissa, exp) = raw.split_once('e').unwrap_or((&raw, "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let point = if alternate && precision == 0 { "." } else { "" };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{mantissa}{point}e{exp_sign}{:02}", exp.abs())
}

/// `g` presentation: fixed or scientific by magnitude, trailing zeros removed.
fn general(f: f64, precision: usize, alternate: bool) -> String {
    let precision = precision.max(1);
    if f == 0.0 {
        return if alternate {
            format!("{:.*}", precision - 1, 0.0)
        } else {
            "0".to_string()
        };
    }
    let exponent_form = format!("{f:.prec$e}", prec = precision - 1);
    let exp: i64 = exponent_form
        .split_once('e')
        .and_then(|(_, e)| e.parse().ok())
        .unwrap_or(0);
    let p = i64::try_from(precision).unwrap_or(i64::MAX);
    let mut out = if (-4..p).contains(&exp) {
        let decimals = usize::try_from(p - 1 - exp).unwrap_or(0);
        format!("{f:.decimals$}")
    } else {
        scientific(f, precision - 1, false)
    };
    if !alternate {
        out = strip_fraction_zeros(&out);
    }
    out
}

fn strip_fraction_zeros(text: &str) -> String {
    let (mantissa, exp) = match text.find('e') {
        Some(at) => text.split_at(at),
        None => (text, ""),
    };
    let mantissa = if mantissa.contains('.') {
        mantissa.trim_end_matches('0').trim_end_matches('.')
    } else {
        mantissa
    };
    format!("{mantissa}{exp}")
}

/// Positional rendering of a decimal without an exponent.
fn plain(d: &BigDecimal) -> String {
    let parts = decimal_parts(d);
    let sign = if parts.negative { "-" } else { "" };
    let digits = parts.digits;
    if parts.exp >= 0 {
        let zeros = usize::try_from(parts.exp).unwrap_or(0);
        return format!("{sign}{digits}{}", "0".repeat(zeros));
    }
    let frac_len = usize::try_from(-parts.exp).unwrap_or(0);
    if digits.len() > frac_len {
        let (int_part, frac) = digits.split_at(digits.len() - frac_len);
        format!("{sign}{int_part}.{frac}")
    } else {
        let zeros = "0".repeat(frac_len - digits.len());
        format!("{sign}0.{zeros}{digits}")
    }
}

#[cfg(test)]
mod tests;
