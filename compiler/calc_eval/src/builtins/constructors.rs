//! Calling a type object: `int("7")`, `list(range(3))`, `Decimal("1.5")`.

use bigdecimal::{BigDecimal, RoundingMode};

use crate::args::{expect_int, CallArgs};
use crate::errors::{integer_overflow, overflow, type_error, value_error, EvalResult};
use crate::numeric::{decimal_from_f64, decimal_from_i64, decimal_from_str, decimal_to_i64};
use crate::numeric::{decimal_to_f64, f64_to_i64, i64_to_f64};
use crate::value::{iterate, str_repr, DictTable, RangeValue, SetTable, SliceValue, TypeTag};
use crate::Value;

pub(super) fn construct(tag: TypeTag, mut args: CallArgs) -> EvalResult {
    let name = tag.name();
    match tag {
        TypeTag::Bool => {
            let args = args.between(name, 0, 1)?;
            Ok(Value::Bool(args.first().is_some_and(Value::is_truthy)))
        }
        TypeTag::Int => {
            let base = args.take_keyword("base");
            let positional = args.between(name, 0, 2)?;
            let base = base.or_else(|| positional.get(1).cloned());
            match positional.first() {
                None => Ok(Value::Int(0)),
                Some(value) => to_int(value, base.as_ref()).map(Value::Int),
            }
        }
        TypeTag::Float => {
            let args = args.between(name, 0, 1)?;
            match args.first() {
                None => Ok(Value::Float(0.0)),
                Some(value) => to_float(value).map(Value::Float),
            }
        }
        TypeTag::Str => {
            let encoding = args.take_keyword("encoding");
            let args = args.between(name, 0, 2)?;
            let encoding = encoding.or_else(|| args.get(1).cloned());
            match (args.first(), encoding) {
                (None, _) => Ok(Value::str("")),
                (Some(Value::Bytes(data)), Some(encoding)) => decode(data, &encoding),
                (Some(other), Some(_)) => Err(type_error(format!(
                    "decoding to str: need a bytes-like object, {} found",
                    other.type_name()
                ))),
                (Some(value), None) => Ok(Value::str(value.to_str())),
            }
        }
        TypeTag::Bytes => {
            let encoding = args.take_keyword("encoding");
            let args = args.between(name, 0, 2)?;
            let encoding = encoding.or_else(|| args.get(1).cloned());
            to_bytes(args.first(), encoding.as_ref())
        }
        TypeTag::List => {
            let args = args.between(name, 0, 1)?;
            let items = match args.first() {
                Some(v) => iterate(v)?.collect(),
                None => Vec::new(),
            };
            Ok(Value::list(items))
        }
        TypeTag::Tuple => {
            let args = args.between(name, 0, 1)?;
            match args.first() {
                Some(Value::Tuple(items)) => Ok(Value::Tuple(items.clone())),
                Some(v) => Ok(Value::tuple(iterate(v)?.collect())),
                None => Ok(Value::tuple(Vec::new())),
            }
        }
        TypeTag::Set => {
            let args = args.between(name, 0, 1)?;
            let table = match args.first() {
                Some(v) => SetTable::from_values(iterate(v)?)?,
                None => SetTable::new(),
            };
            Ok(Value::set(table))
        }
        TypeTag::Dict => {
            let keywords = std::mem::take(&mut args.keywords);
            let positional = args.between(name, 0, 1)?;
            let mut table = match positional.first() {
                Some(source) => dict_from(source)?,
                None => DictTable::new(),
            };
            for (key, value) in keywords {
                table.insert(Value::str(key), value)?;
            }
            Ok(Value::dict(table))
        }
        TypeTag::Range => {
            let positional = args.between(name, 1, 3)?;
            let ints = positional
                .iter()
                .map(expect_int)
                .collect::<EvalResult<Vec<_>>>()?;
            let (start, stop, step) = match ints[..] {
                [stop] => (0, stop, 1),
                [start, stop] => (start, stop, 1),
                [start, stop, step, ..] => (start, stop, step),
                [] => (0, 0, 1),
            };
            if step == 0 {
                return Err(value_error("range() arg 3 must not be zero"));
            }
            Ok(Value::Range(RangeValue { start, stop, step }))
        }
        TypeTag::Slice => {
            let mut positional = args.between(name, 1, 3)?;
            let (start, stop, step) = match positional.len() {
                1 => (Value::None, positional.remove(0), Value::None),
                2 => {
                    let stop = positional.remove(1);
                    (positional.remove(0), stop, Value::None)
                }
                _ => {
                    let step = positional.remove(2);
                    let stop = positional.remove(1);
                    (positional.remove(0), stop, step)
                }
            };
            Ok(Value::Slice(std::rc::Rc::new(SliceValue { start, stop, step })))
        }
        TypeTag::Decimal => {
            let args = args.between("Decimal", 0, 1)?;
            match args.first() {
                None => Ok(Value::decimal(decimal_from_i64(0))),
                Some(value) => to_decimal(value).map(Value::decimal),
            }
        }
        other => Err(type_error(format!(
            "cannot create '{}' instances",
            other.name()
        ))),
    }
}

/// `int(x)`, `int(text, base)`.
fn to_int(value: &Value, base: Option<&Value>) -> EvalResult<i64> {
    if let Some(base) = base {
        let base = expect_int(base)?;
        return match value {
            Value::Str(text) => parse_int(text, base),
            Value::Bytes(data) => parse_int(&String::from_utf8_lossy(data), base),
            _ => Err(type_error("int() can't convert non-string with explicit base")),
        };
    }
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(value.as_int().unwrap_or(0)),
        Value::Float(f) => f64_to_i64(f.trunc()),
        Value::Decimal(d) => {
            let truncated = d.with_scale_round(0, RoundingMode::Down);
            decimal_to_i64(&truncated)
                .ok_or_else(|| integer_overflow("Decimal conversion"))
        }
        Value::Str(text) => parse_int(text, 10),
        Value::Bytes(data) => parse_int(&String::from_utf8_lossy(data), 10),
        other => Err(type_error(format!(
            "int() argument must be a string, a bytes-like object or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Parse integer text in `base` (0 infers the base from a prefix).
pub(crate) fn parse_int(text: &str, base: i64) -> EvalResult<i64> {
    if base != 0 && !(2..=36).contains(&base) {
        return Err(value_error("int() base must be >= 2 and <= 36, or 0"));
    }
    let invalid = || {
        value_error(format!(
            "invalid literal for int() with base {base}: {}",
            str_repr(text)
        ))
    };
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let lower = body.to_ascii_lowercase();
    let prefixed = |p: &str| lower.starts_with(p);
    let (radix, digits) = match base {
        0 if prefixed("0x") => (16, &body[2..]),
        0 if prefixed("0o") => (8, &body[2..]),
        0 if prefixed("0b") => (2, &body[2..]),
        0 => {
            let nonzero = body.bytes().any(|b| b != b'0' && b != b'_');
            if body.len() > 1 && body.starts_with('0') && nonzero {
                return Err(invalid());
            }
            (10, body)
        }
        16 if prefixed("0x") => (16, &body[2..]),
        8 if prefixed("0o") => (8, &body[2..]),
        2 if prefixed("0b") => (2, &body[2..]),
        b => (u32::try_from(b).map_err(|_| invalid())?, body),
    };
    // After a base prefix a single leading underscore is allowed.
    let digits = if digits.len() < body.len() {
        digits.strip_prefix('_').unwrap_or(digits)
    } else {
        digits
    };
    let misplaced_separator =
        digits.starts_with('_') || digits.ends_with('_') || digits.contains("__");
    if digits.is_empty() || misplaced_separator {
        return Err(invalid());
    }
    let mut acc: i128 = 0;
    for c in digits.chars().filter(|c| *c != '_') {
        let d = c.to_digit(radix).ok_or_else(invalid)?;
        acc = acc * i128::from(radix) + i128::from(d);
        if acc > i128::from(i64::MAX) + 1 {
            return Err(integer_overflow("int() conversion"));
        }
    }
    let signed = if negative { -acc } else { acc };
    i64::try_from(signed).map_err(|_| integer_overflow("int() conversion"))
}

fn to_float(value: &Value) -> EvalResult<f64> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(i64_to_f64(value.as_int().unwrap_or(0))),
        Value::Float(f) => Ok(*f),
        Value::Decimal(d) => Ok(decimal_to_f64(d)),
        Value::Str(text) => parse_float(text).ok_or_else(|| {
            value_error(format!(
                "could not convert string to float: {}",
                str_repr(text)
            ))
        }),
        other => Err(type_error(format!(
            "float() argument must be a string or a real number, not '{}'",
            other.type_name()
        ))),
    }
}

/// Float text: decimal digits with `_` separators, or `inf`/`nan` words.
pub(crate) fn parse_float(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let (sign, body) = match trimmed.as_bytes().first()? {
        b'-' => (-1.0, &trimmed[1..]),
        b'+' => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    match body.to_ascii_lowercase().as_str() {
        "inf" | "infinity" => return Some(sign * f64::INFINITY),
        "nan" => return Some(f64::NAN),
        _ => {}
    }
    let valid = !body.is_empty()
        && body
            .bytes()
            .all(|b| b.is_ascii_digit() || matches!(b, b'.' | b'e' | b'E' | b'+' | b'-' | b'_'))
        && !body.starts_with('_')
        && !body.ends_with('_')
        && !body.contains("__");
    if !valid {
        return None;
    }
    let cleaned = body.replace('_', "");
    cleaned.parse::<f64>().ok().map(|f| sign * f)
}

fn to_decimal(value: &Value) -> EvalResult<BigDecimal> {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(decimal_from_i64(value.as_int().unwrap_or(0))),
        Value::Float(f) => decimal_from_f64(*f),
        Value::Decimal(d) => Ok((**d).clone()),
        Value::Str(text) => decimal_from_str(text).ok_or_else(|| {
            value_error(format!("invalid literal for Decimal: {}", str_repr(text)))
        }),
        other => Err(type_error(format!(
            "conversion from {} to Decimal is not supported",
            other.type_name()
        ))),
    }
}

fn check_encoding(encoding: &Value) -> EvalResult<()> {
    let name = encoding
        .as_str()
        .ok_or_else(|| type_error("encoding must be str"))?
        .to_ascii_lowercase()
        .replace('_', "-");
    match name.as_str() {
        "utf-8" | "utf8" | "ascii" => Ok(()),
        _ => Err(value_error(format!("unknown encoding: {name}"))),
    }
}

/// `bytes.decode` and `str(bytes, encoding)`.
pub(crate) fn decode(data: &[u8], encoding: &Value) -> EvalResult {
    check_encoding(encoding)?;
    std::str::from_utf8(data)
        .map(Value::str)
        .map_err(|e| value_error(format!("'utf-8' codec can't decode bytes: {e}")))
}

fn to_bytes(source: Option<&Value>, encoding: Option<&Value>) -> EvalResult {
    match (source, encoding) {
        (None, _) => Ok(Value::bytes(Vec::new())),
        (Some(Value::Str(text)), Some(encoding)) => {
            check_encoding(encoding)?;
            Ok(Value::bytes(text.as_bytes().to_vec()))
        }
        (Some(Value::Str(_)), None) => Err(type_error("string argument without an encoding")),
        (Some(_), Some(_)) => Err(type_error("encoding without a string argument")),
        (Some(Value::Int(n)), None) => {
            let n = usize::try_from(*n).map_err(|_| value_error("negative count"))?;
            Ok(Value::bytes(vec![0; n]))
        }
        (Some(Value::Bytes(data)), None) => Ok(Value::Bytes(data.clone())),
        (Some(iterable), None) => {
            let mut data = Vec::new();
            for item in iterate(iterable)? {
                let n = expect_int(&item)?;
                let byte =
                    u8::try_from(n).map_err(|_| value_error("bytes must be in range(0, 256)"))?;
                data.push(byte);
            }
            Ok(Value::bytes(data))
        }
    }
}

/// `dict(mapping)` or `dict(iterable_of_pairs)`.
fn dict_from(source: &Value) -> EvalResult<DictTable> {
    if let Value::Dict(table) = source {
        return Ok(table.borrow().clone());
    }
    let mut table = DictTable::new();
    for (index, element) in iterate(source)?.enumerate() {
        let pair: Vec<Value> = iterate(&element)
            .map_err(|_| {
                type_error(format!(
                    "cannot convert dictionary update sequence element #{index} to a sequence"
                ))
            })?
            .collect();
        let [key, value] = <[Value; 2]>::try_from(pair).map_err(|pair| {
            value_error(format!(
                "dictionary update sequence element #{index} has length {}; 2 is required",
                pair.len()
            ))
        })?;
        table.insert(key, value)?;
    }
    Ok(table)
}

/// `dict.fromkeys(iterable, value=None)`.
pub(super) fn dict_fromkeys(args: CallArgs) -> EvalResult {
    let mut args = args.between("fromkeys", 1, 2)?;
    let value = if args.len() == 2 {
        args.remove(1)
    } else {
        Value::None
    };
    let mut table = DictTable::new();
    for key in iterate(&args[0])? {
        table.insert(key, value.clone())?;
    }
    Ok(Value::dict(table))
}

/// `float.fromhex(text)`.
pub(super) fn float_fromhex(args: CallArgs) -> EvalResult {
    let value = args.single("fromhex")?;
    let text = value.as_str().ok_or_else(|| {
        type_error(format!(
            "must be str, not {}",
            value.type_name()
        ))
    })?;
    parse_hex_float(text).map(Value::Float)
}

fn parse_hex_float(text: &str) -> EvalResult<f64> {
    let invalid = || value_error("invalid hexadecimal floating-point string");
    let trimmed = text.trim();
    let (sign, body) = match trimmed.as_bytes().first() {
        Some(b'-') => (-1.0, &trimmed[1..]),
        Some(b'+') => (1.0, &trimmed[1..]),
        _ => (1.0, trimmed),
    };
    let lower = body.to_ascii_lowercase();
    match lower.as_str() {
        "inf" | "infinity" => return Ok(sign * f64::INFINITY),
        "nan" => return Ok(f64::NAN),
        _ => {}
    }
    let body = lower.strip_prefix("0x").unwrap_or(&lower);
    let (mantissa, exponent) = match body.split_once('p') {
        Some((m, e)) => (m, e.parse::<i32>().map_err(|_| invalid())?),
        None => (body, 0),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return Err(invalid());
    }

    let mut acc: u128 = 0;
    let mut shift: i32 = 0;
    for (position, c) in int_part.chars().chain(frac_part.chars()).enumerate() {
        let d = c.to_digit(16).ok_or_else(invalid)?;
        let in_fraction = position >= int_part.len();
        if acc >> 120 == 0 {
            acc = (acc << 4) | u128::from(d);
            if in_fraction {
                shift -= 4;
            }
        } else if !in_fraction {
            shift += 4;
        }
    }
    #[expect(clippy::cast_precision_loss, reason = "rounding to the nearest double")]
    let mantissa = acc as f64;
    let result = scale_by_power_of_two(mantissa, exponent.saturating_add(shift));
    if result.is_infinite() {
        return Err(overflow("hexadecimal value too large to represent as a float"));
    }
    Ok(sign * result)
}

fn scale_by_power_of_two(mut x: f64, mut exp: i32) -> f64 {
    while exp > 1000 {
        x *= 2f64.powi(1000);
        exp -= 1000;
    }
    while exp < -1000 {
        x *= 2f64.powi(-1000);
        exp += 1000;
    }
    x * 2f64.powi(exp)
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn call(tag: TypeTag, args: Vec<Value>) -> EvalResult {
        construct(tag, CallArgs::new(args))
    }

    #[test]
    fn test_int_parsing() {
        assert_eq!(parse_int(" 42 ", 10).unwrap(), 42);
        assert_eq!(parse_int("-0x1f", 0).unwrap(), -31);
        assert_eq!(parse_int("1_000", 10).unwrap(), 1000);
        assert_eq!(parse_int("ff", 16).unwrap(), 255);
        let err = parse_int("x", 10).unwrap_err();
        assert_eq!(err.to_string(), "invalid literal for int() with base 10: 'x'");
        let err = parse_int("1", 99).unwrap_err();
        assert_eq!(err.to_string(), "int() base must be >= 2 and <= 36, or 0");
    }

    #[test]
    fn test_int_from_float_truncates() {
        assert!(matches!(
            call(TypeTag::Int, vec![Value::Float(-2.7)]).unwrap(),
            Value::Int(-2)
        ));
    }

    #[test]
    fn test_float_words() {
        assert_eq!(parse_float("-inf"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_float("1e3"), Some(1000.0));
        let err = call(TypeTag::Float, vec![Value::str("abc")]).unwrap_err();
        assert_eq!(err.to_string(), "could not convert string to float: 'abc'");
    }

    #[test]
    fn test_range_zero_step() {
        let err = call(
            TypeTag::Range,
            vec![Value::Int(0), Value::Int(5), Value::Int(0)],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "range() arg 3 must not be zero");
    }

    #[test]
    fn test_dict_from_pairs_and_keywords() {
        let pairs = Value::list(vec![Value::tuple(vec![Value::Int(1), Value::Int(2)])]);
        let mut args = CallArgs::new(vec![pairs]);
        args.keywords.push(("x".into(), Value::Int(3)));
        let dict = construct(TypeTag::Dict, args).unwrap();
        assert_eq!(dict.repr(), "{1: 2, 'x': 3}");

        let bad = Value::list(vec![Value::tuple(vec![Value::Int(1)])]);
        let err = call(TypeTag::Dict, vec![bad]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "dictionary update sequence element #0 has length 1; 2 is required"
        );
    }

    #[test]
    fn test_decimal_constructor() {
        let d = call(TypeTag::Decimal, vec![Value::str("1.25")]).unwrap();
        assert_eq!(d.repr(), "Decimal('1.25')");
        let err = call(TypeTag::Decimal, vec![Value::str("abc")]).unwrap_err();
        assert_eq!(err.to_string(), "invalid literal for Decimal: 'abc'");
    }

    #[test]
    fn test_hex_float() {
        assert_eq!(parse_hex_float("0x1.8p1").unwrap(), 3.0);
        assert_eq!(parse_hex_float("-0x10").unwrap(), -16.0);
        assert!(parse_hex_float("0xg").is_err());
    }

    #[test]
    fn test_bytes_constructor() {
        let b = call(TypeTag::Bytes, vec![Value::list(vec![Value::Int(104), Value::Int(105)])])
            .unwrap();
        assert_eq!(b.repr(), "b'hi'");
        let err = call(TypeTag::Bytes, vec![Value::list(vec![Value::Int(300)])]).unwrap_err();
        assert_eq!(err.to_string(), "bytes must be in range(0, 256)");
    }
}
