//! Methods of `int`, `float` and `decimal.Decimal`.

use bigdecimal::{BigDecimal, RoundingMode};

use super::no_such_method;
use crate::args::CallArgs;
use crate::errors::{integer_overflow, overflow, type_error, value_error, EvalResult};
use crate::numeric::{
    decimal_from_f64, decimal_parts, decimal_sqrt, decimal_to_f64, normalize, round_to_context,
};
use crate::Value;

pub(super) fn call_int(receiver: &Value, name: &str, args: CallArgs) -> EvalResult {
    let n = receiver.as_int().unwrap_or(0);
    args.exact(name, 0)?;
    match name {
        "bit_length" => Ok(Value::Int(i64::from(64 - n.unsigned_abs().leading_zeros()))),
        "bit_count" => Ok(Value::Int(i64::from(n.unsigned_abs().count_ones()))),
        "conjugate" => Ok(Value::Int(n)),
        "as_integer_ratio" => Ok(Value::tuple(vec![Value::Int(n), Value::Int(1)])),
        "is_integer" => Ok(Value::Bool(true)),
        _ => Err(no_such_method(name, receiver.type_name())),
    }
}

pub(super) fn call_float(f: f64, name: &str, args: CallArgs) -> EvalResult {
    args.exact(name, 0)?;
    match name {
        "is_integer" => Ok(Value::Bool(f.is_finite() && f.fract() == 0.0)),
        "conjugate" => Ok(Value::Float(f)),
        "as_integer_ratio" => {
            let (num, den) = float_ratio(f)?;
            Ok(Value::tuple(vec![Value::Int(num), Value::Int(den)]))
        }
        "hex" => Ok(Value::str(float_hex(f))),
        _ => Err(no_such_method(name, "float")),
    }
}

/// Exact `numerator / denominator` of a finite float.
fn float_ratio(f: f64) -> EvalResult<(i64, i64)> {
    if f.is_nan() {
        return Err(value_error("cannot convert NaN to integer ratio"));
    }
    if f.is_infinite() {
        return Err(overflow("cannot convert Infinity to integer ratio"));
    }
    if f == 0.0 {
        return Ok((0, 1));
    }
    let bits = f.to_bits();
    let raw_exp = i64::try_from((bits >> 52) & 0x7ff).unwrap_or(0);
    let fraction = bits & ((1 << 52) - 1);
    let (mut mantissa, mut exp) = if raw_exp == 0 {
        (fraction, -1074)
    } else {
        (fraction | (1 << 52), raw_exp - 1075)
    };
    while mantissa & 1 == 0 && exp < 0 {
        mantissa >>= 1;
        exp += 1;
    }
    let mantissa = i64::try_from(mantissa).map_err(|_| integer_overflow("as_integer_ratio"))?;
    let signed = if f < 0.0 { -mantissa } else { mantissa };
    if exp >= 0 {
        let numerator = u32::try_from(exp)
            .ok()
            .and_then(|e| 2_i64.checked_pow(e))
            .and_then(|scale| signed.checked_mul(scale))
            .ok_or_else(|| integer_overflow("as_integer_ratio"))?;
        Ok((numerator, 1))
    } else {
        let denominator = u32::try_from(-exp)
            .ok()
            .and_then(|e| 2_i64.checked_pow(e))
            .ok_or_else(|| integer_overflow("as_integer_ratio"))?;
        Ok((signed, denominator))
    }
}

/// `float.hex()`: `0x1.8000000000000p+1`.
pub(crate) fn float_hex(f: f64) -> String {
    if f.is_nan() {
        return "nan".into();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".into() } else { "-inf".into() };
    }
    let sign = if f.is_sign_negative() { "-" } else { "" };
    if f == 0.0 {
        return format!("{sign}0x0.0p+0");
    }
    let bits = f.to_bits();
    let raw_exp = i64::try_from((bits >> 52) & 0x7ff).unwrap_or(0);
    let fraction = bits & ((1 << 52) - 1);
    let (lead, exp) = if raw_exp == 0 {
        (0, -1022)
    } else {
        (1, raw_exp - 1023)
    };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    format!("{sign}0x{lead}.{fraction:013x}p{exp_sign}{}", exp.abs())
}

pub(super) fn call_decimal(d: &BigDecimal, name: &str, args: CallArgs) -> EvalResult {
    if name == "quantize" {
        let args = args.exact(name, 1)?;
        let Value::Decimal(exp) = &args[0] else {
            return Err(type_error(format!(
                "conversion from {} to Decimal is not supported",
                args[0].type_name()
            )));
        };
        let scale = -decimal_parts(exp).exp;
        return Ok(Value::decimal(d.with_scale_round(scale, RoundingMode::HalfEven)));
    }
    args.exact(name, 0)?;
    let parts = decimal_parts(d);
    match name {
        "sqrt" => Ok(Value::decimal(decimal_sqrt(d)?)),
        "exp" => through_float(d, f64::exp),
        "ln" => through_float(d, f64::ln),
        "log10" => through_float(d, f64::log10),
        "normalize" => Ok(Value::decimal(normalize(&round_to_context(d)))),
        "to_integral_value" => {
            if parts.exp >= 0 {
                Ok(Value::decimal(d.clone()))
            } else {
                Ok(Value::decimal(d.with_scale_round(0, RoundingMode::HalfEven)))
            }
        }
        "is_signed" => Ok(Value::Bool(parts.negative)),
        "is_zero" => Ok(Value::Bool(parts.digits.bytes().all(|b| b == b'0'))),
        "copy_abs" => Ok(Value::decimal(d.abs())),
        "copy_negate" => Ok(Value::decimal(-d.clone())),
        "adjusted" => {
            let significant = if parts.digits.bytes().all(|b| b == b'0') {
                0
            } else {
                i64::try_from(parts.digits.trim_start_matches('0').len()).unwrap_or(0) - 1
            };
            Ok(Value::Int(parts.exp + significant))
        }
        _ => Err(no_such_method(name, "decimal.Decimal")),
    }
}

/// Transcendental functions are evaluated in double precision.
fn through_float(d: &BigDecimal, f: impl Fn(f64) -> f64) -> EvalResult {
    let result = f(decimal_to_f64(d));
    if result.is_nan() || result.is_infinite() {
        return Err(value_error("invalid operation on Decimal"));
    }
    Ok(Value::decimal(round_to_context(&decimal_from_f64(result)?)))
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::numeric::decimal_from_str;

    fn no_args() -> CallArgs {
        CallArgs::default()
    }

    #[test]
    fn test_int_bits() {
        let v = call_int(&Value::Int(255), "bit_length", no_args()).unwrap();
        assert!(matches!(v, Value::Int(8)));
        let v = call_int(&Value::Int(-7), "bit_count", no_args()).unwrap();
        assert!(matches!(v, Value::Int(3)));
    }

    #[test]
    fn test_float_hex() {
        assert_eq!(float_hex(3.0), "0x1.8000000000000p+1");
        assert_eq!(float_hex(-0.5), "-0x1.0000000000000p-1");
        assert_eq!(float_hex(0.0), "0x0.0p+0");
        assert_eq!(float_hex(5e-324), "0x0.0000000000001p-1022");
    }

    #[test]
    fn test_float_ratio() {
        assert_eq!(float_ratio(0.75).unwrap(), (3, 4));
        assert_eq!(float_ratio(-2.0).unwrap(), (-2, 1));
        assert!(float_ratio(f64::NAN).is_err());
    }

    #[test]
    fn test_decimal_quantize() {
        let d = decimal_from_str("2.675").unwrap();
        let q = Value::decimal(decimal_from_str("0.01").unwrap());
        let v = call_decimal(&d, "quantize", CallArgs::new(vec![q])).unwrap();
        assert_eq!(v.repr(), "Decimal('2.68')");
    }

    #[test]
    fn test_decimal_adjusted() {
        let d = decimal_from_str("123.45").unwrap();
        let v = call_decimal(&d, "adjusted", no_args()).unwrap();
        assert!(matches!(v, Value::Int(2)));
    }
}
