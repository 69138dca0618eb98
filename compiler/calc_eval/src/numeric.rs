//! Exact-mode decimal arithmetic and numeric conversions.
//!
//! Decimal results are rounded half-even to a 28 significant digit context.
//! Rendering follows the `decimal` module's scientific-string rules.

use std::str::FromStr;

use bigdecimal::{num_bigint::BigInt, BigDecimal, RoundingMode, Zero};

use crate::errors::{division_by_zero, integer_overflow, overflow, value_error, EvalResult};

/// Significant digits kept by decimal operations.
pub const PRECISION: usize = 28;

/// Guard digits used for intermediate products in `**`.
const POW_GUARD_PRECISION: usize = PRECISION + 12;

/// Sign, coefficient digits and exponent: value = ±digits × 10^exp.
pub(crate) struct DecimalParts {
    pub negative: bool,
    pub digits: String,
    pub exp: i64,
}

pub(crate) fn decimal_parts(d: &BigDecimal) -> DecimalParts {
    let (coefficient, scale) = d.as_bigint_and_exponent();
    let text = coefficient.to_string();
    let negative = text.starts_with('-');
    let digits = text.trim_start_matches('-').to_string();
    DecimalParts {
        negative,
        digits,
        exp: -scale,
    }
}

fn from_parts(negative: bool, digits: &str, exp: i64) -> BigDecimal {
    let sign = if negative { "-" } else { "" };
    BigDecimal::from_str(&format!("{sign}{digits}e{exp}")).unwrap_or_default()
}

/// The `decimal` module's `str()` form: plain notation unless the exponent
/// is positive or the value is smaller than `1E-6`.
pub fn decimal_to_string(d: &BigDecimal) -> String {
    let DecimalParts {
        negative,
        digits,
        exp,
    } = decimal_parts(d);
    let len = i64::try_from(digits.len()).unwrap_or(i64::MAX);
    let left_digits = exp + len;
    let dot_place = if exp <= 0 && left_digits > -6 {
        left_digits
    } else {
        1
    };

    let mut out = String::new();
    if negative {
        out.push('-');
    }
    if dot_place <= 0 {
        out.push_str("0.");
        out.push_str(&"0".repeat(usize::try_from(-dot_place).unwrap_or(0)));
        out.push_str(&digits);
    } else if dot_place >= len {
        out.push_str(&digits);
        out.push_str(&"0".repeat(usize::try_from(dot_place - len).unwrap_or(0)));
    } else {
        let split = usize::try_from(dot_place).unwrap_or(0);
        out.push_str(&digits[..split]);
        out.push('.');
        out.push_str(&digits[split..]);
    }
    if left_digits != dot_place {
        let exponent = left_digits - dot_place;
        out.push_str(&format!("E{exponent:+}"));
    }
    out
}

pub fn decimal_is_integral(d: &BigDecimal) -> bool {
    let parts = decimal_parts(d);
    if parts.exp >= 0 {
        return true;
    }
    let frac_len = usize::try_from(-parts.exp).unwrap_or(usize::MAX);
    let frac_start = parts.digits.len().saturating_sub(frac_len);
    parts.digits[frac_start..].bytes().all(|b| b == b'0')
}

/// Truncate toward zero into an `i64`, if it fits.
pub fn decimal_to_i64(d: &BigDecimal) -> Option<i64> {
    let DecimalParts {
        negative,
        digits,
        exp,
    } = decimal_parts(d);
    let int_digits = if exp >= 0 {
        if digits.chars().all(|c| c == '0') {
            "0".to_string()
        } else {
            format!("{digits}{}", "0".repeat(usize::try_from(exp).ok()?))
        }
    } else {
        let keep = i64::try_from(digits.len()).ok()? + exp;
        if keep <= 0 {
            "0".to_string()
        } else {
            digits[..usize::try_from(keep).ok()?].to_string()
        }
    };
    let magnitude: i128 = int_digits.parse().ok()?;
    i64::try_from(if negative { -magnitude } else { magnitude }).ok()
}

/// Strip trailing zeros from the coefficient.
pub fn normalize(d: &BigDecimal) -> BigDecimal {
    if d.is_zero() {
        return BigDecimal::zero();
    }
    let parts = decimal_parts(d);
    let trimmed = parts.digits.trim_end_matches('0');
    let dropped = i64::try_from(parts.digits.len() - trimmed.len()).unwrap_or(0);
    from_parts(parts.negative, trimmed, parts.exp + dropped)
}

fn round_digits(d: &BigDecimal, precision: usize) -> BigDecimal {
    let mut result = d.clone();
    // A carry can add one digit; the second pass drops the trailing zero.
    for _ in 0..2 {
        let (coefficient, scale) = result.as_bigint_and_exponent();
        let digits = coefficient.to_string().trim_start_matches('-').len();
        if digits <= precision {
            break;
        }
        let excess = i64::try_from(digits - precision).unwrap_or(0);
        result = result.with_scale_round(scale - excess, RoundingMode::HalfEven);
    }
    result
}

/// Round to the decimal context.
pub fn round_to_context(d: &BigDecimal) -> BigDecimal {
    round_digits(d, PRECISION)
}

pub fn decimal_from_i64(n: i64) -> BigDecimal {
    BigDecimal::from(n)
}

/// Decimal with the float's shortest round-trip digits.
pub fn decimal_from_f64(f: f64) -> EvalResult<BigDecimal> {
    if f.is_nan() {
        return Err(value_error("cannot convert float NaN to Decimal"));
    }
    if f.is_infinite() {
        return Err(overflow("cannot convert float infinity to Decimal"));
    }
    let text = crate::value::float_repr(f);
    decimal_from_str(&text)
        .ok_or_else(|| value_error(format!("invalid literal for Decimal: '{text}'")))
}

/// Parse decimal text: optional sign, digits with `_` separators, an
/// optional fraction and exponent. Surrounding whitespace is ignored.
pub fn decimal_from_str(text: &str) -> Option<BigDecimal> {
    let trimmed = text.trim();
    let (negative, body) = match trimmed.as_bytes().first()? {
        b'-' => (true, &trimmed[1..]),
        b'+' => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let body = body.replace('_', "");
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(at) => (&body[..at], Some(&body[at + 1..])),
        None => (body.as_str(), None),
    };
    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty())
        || !all_digits(int_part)
        || !all_digits(frac_part)
    {
        return None;
    }
    let exp: i64 = match exponent {
        Some(e) => e.parse().ok()?,
        None => 0,
    };
    let frac_len = i64::try_from(frac_part.len()).ok()?;
    let digits = format!("{int_part}{frac_part}");
    Some(from_parts(negative, &digits, exp.checked_sub(frac_len)?))
}

pub fn decimal_to_f64(d: &BigDecimal) -> f64 {
    decimal_to_string(d).parse().unwrap_or(f64::NAN)
}

// Arithmetic

pub fn decimal_add(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    let (a, b) = align_for_addition(a, b);
    round_to_context(&(a + b))
}

pub fn decimal_sub(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    decimal_add(a, &-(b.clone()))
}

/// Bound the exponent gap between two addends.
///
/// An operand whose digits all fall below the rounding point of the other is
/// replaced by a single sticky digit of the same sign just past it, which
/// rounds identically. A zero addend keeps at most `PRECISION + 1` digits of
/// alignment.
fn align_for_addition(a: &BigDecimal, b: &BigDecimal) -> (BigDecimal, BigDecimal) {
    let pa = decimal_parts(a);
    let pb = decimal_parts(b);
    let precision = i64::try_from(PRECISION).unwrap_or(i64::MAX);
    if a.is_zero() && b.is_zero() {
        return (a.clone(), b.clone());
    }
    if a.is_zero() || b.is_zero() {
        let (zero, other, po) = if a.is_zero() { (&pa, b, &pb) } else { (&pb, a, &pa) };
        let exp = zero.exp.min(po.exp).max(po.exp - precision - 1);
        let zero = from_parts(false, "0", exp);
        return if a.is_zero() { (zero, other.clone()) } else { (other.clone(), zero) };
    }
    let a_is_wider = pa.exp >= pb.exp;
    let (wide, narrow) = if a_is_wider { (&pa, &pb) } else { (&pb, &pa) };
    let wide_len = i64::try_from(wide.digits.len()).unwrap_or(i64::MAX);
    let narrow_len = i64::try_from(narrow.digits.len()).unwrap_or(i64::MAX);
    let sticky_exp = wide.exp + (wide_len - precision - 2).min(-1);
    if narrow_len + narrow.exp - 1 >= sticky_exp {
        return (a.clone(), b.clone());
    }
    let sticky = from_parts(narrow.negative, "1", sticky_exp);
    if a_is_wider {
        (a.clone(), sticky)
    } else {
        (sticky, b.clone())
    }
}

pub fn decimal_mul(a: &BigDecimal, b: &BigDecimal) -> BigDecimal {
    round_to_context(&(a * b))
}

/// `a / b`; exact quotients keep the ideal exponent `exp(a) - exp(b)`.
pub fn decimal_div(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    if b.is_zero() {
        return Err(division_by_zero("division by zero"));
    }
    let ideal = decimal_parts(a).exp - decimal_parts(b).exp;
    if a.is_zero() {
        return Ok(from_parts(false, "0", ideal));
    }
    let quotient = a / b;
    let exact = &quotient * b == *a;
    let rounded = round_to_context(&quotient);
    if !exact || rounded != quotient {
        return Ok(rounded);
    }
    let parts = decimal_parts(&rounded);
    let mut digits = parts.digits;
    let mut exp = parts.exp;
    while exp < ideal && digits.len() > 1 && digits.ends_with('0') {
        digits.pop();
        exp += 1;
    }
    while exp > ideal && digits.len() < PRECISION {
        digits.push('0');
        exp -= 1;
    }
    Ok(from_parts(parts.negative, &digits, exp))
}

/// `a // b`: the quotient truncated toward zero.
pub fn decimal_floordiv(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    Ok(decimal_divmod(a, b)?.0)
}

/// `a % b`: the remainder takes the sign of the dividend.
pub fn decimal_mod(a: &BigDecimal, b: &BigDecimal) -> EvalResult<BigDecimal> {
    Ok(decimal_divmod(a, b)?.1)
}

/// Exact integer quotient (truncated) and remainder.
///
/// Fails when the quotient needs more than `PRECISION` digits.
pub fn decimal_divmod(a: &BigDecimal, b: &BigDecimal) -> EvalResult<(BigDecimal, BigDecimal)> {
    if b.is_zero() {
        return Err(division_by_zero("division by zero"));
    }
    let pa = decimal_parts(a);
    let pb = decimal_parts(b);
    let ideal = pa.exp.min(pb.exp);
    if a.is_zero() {
        return Ok((BigDecimal::zero(), from_parts(false, "0", ideal)));
    }
    let adjusted = |p: &DecimalParts| {
        p.exp + i64::try_from(p.digits.len()).unwrap_or(i64::MAX) - 1
    };
    let expdiff = adjusted(&pa) - adjusted(&pb);
    if expdiff <= -2 {
        // |a| < |b|: the remainder is the dividend itself.
        return Ok((BigDecimal::zero(), round_to_context(&a.with_scale(-ideal))));
    }
    if expdiff > i64::try_from(PRECISION).unwrap_or(i64::MAX) {
        return Err(division_impossible());
    }
    // Both gaps are bounded by the coefficient lengths here.
    let (x, _) = a.with_scale(-ideal).as_bigint_and_exponent();
    let (y, _) = b.with_scale(-ideal).as_bigint_and_exponent();
    let quotient: BigInt = &x / &y;
    let remainder: BigInt = &x % &y;
    if quotient.to_string().trim_start_matches('-').len() > PRECISION {
        return Err(division_impossible());
    }
    Ok((
        BigDecimal::new(quotient, 0),
        round_to_context(&BigDecimal::new(remainder, -ideal)),
    ))
}

#[cold]
fn division_impossible() -> crate::errors::EvalError {
    value_error(format!(
        "invalid operation: integer quotient needs more than {PRECISION} digits"
    ))
}

pub fn decimal_pow(base: &BigDecimal, exponent: &BigDecimal) -> EvalResult<BigDecimal> {
    if decimal_is_integral(exponent) {
        let n = decimal_to_i64(exponent).ok_or_else(|| integer_overflow("exponentiation"))?;
        if n == 0 {
            if base.is_zero() {
                return Err(value_error("0 ** 0 is undefined"));
            }
            return Ok(BigDecimal::from(1));
        }
        if n < 0 && base.is_zero() {
            return Err(division_by_zero("division by zero"));
        }
        let power = pow_unsigned(base, n.unsigned_abs());
        return if n < 0 {
            decimal_div(&BigDecimal::from(1), &power)
        } else {
            Ok(round_to_context(&power))
        };
    }
    if *base < BigDecimal::zero() {
        return Err(value_error("negative number cannot be raised to a fractional power"));
    }
    let result = decimal_to_f64(base).powf(decimal_to_f64(exponent));
    Ok(round_to_context(&decimal_from_f64(result)?))
}

fn pow_unsigned(base: &BigDecimal, mut n: u64) -> BigDecimal {
    let mut result = BigDecimal::from(1);
    let mut factor = base.clone();
    while n > 0 {
        if n & 1 == 1 {
            result = round_digits(&(&result * &factor), POW_GUARD_PRECISION);
        }
        n >>= 1;
        if n > 0 {
            factor = round_digits(&(&factor * &factor), POW_GUARD_PRECISION);
        }
    }
    result
}

pub fn decimal_sqrt(d: &BigDecimal) -> EvalResult<BigDecimal> {
    if *d < BigDecimal::zero() {
        return Err(value_error("invalid operation: square root of a negative number"));
    }
    if d.is_zero() {
        return Ok(BigDecimal::zero());
    }
    let root = d
        .sqrt()
        .ok_or_else(|| value_error("invalid operation: square root of a negative number"))?;
    let rounded = round_to_context(&root);
    if &rounded * &rounded == *d {
        return Ok(normalize(&rounded));
    }
    Ok(rounded)
}

// Float conversions

/// Convert an integral-valued float to `i64`, with Python's error wording
/// for non-finite values.
#[expect(
    clippy::cast_possible_truncation,
    reason = "range is checked before the cast"
)]
pub fn f64_to_i64(f: f64) -> EvalResult<i64> {
    if f.is_nan() {
        return Err(value_error("cannot convert float NaN to integer"));
    }
    if f.is_infinite() {
        return Err(overflow("cannot convert float infinity to integer"));
    }
    let truncated = f.trunc();
    if !(-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&truncated) {
        return Err(integer_overflow("float conversion"));
    }
    Ok(truncated as i64)
}

#[expect(clippy::cast_precision_loss, reason = "int to float follows IEEE rounding")]
pub fn i64_to_f64(n: i64) -> f64 {
    n as f64
}
