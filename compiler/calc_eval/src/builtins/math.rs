//! The `math` module.

use std::f64::consts;

use bigdecimal::{BigDecimal, RoundingMode};

use crate::args::{expect_int, CallArgs};
use crate::errors::{integer_overflow, overflow, type_error, value_error, EvalResult};
use crate::numeric::{decimal_to_i64, f64_to_i64, i64_to_f64};
use crate::operators::Number;
use crate::Value;

/// Functions of the `math` module.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum MathFn {
    Sqrt,
    Isqrt,
    Exp,
    Log,
    Log2,
    Log10,
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Atan2,
    Sinh,
    Cosh,
    Tanh,
    Floor,
    Ceil,
    Trunc,
    Fabs,
    Factorial,
    Gcd,
    Lcm,
    Comb,
    Perm,
    Hypot,
    Degrees,
    Radians,
    Pow,
    Fmod,
    Copysign,
    Isfinite,
    Isinf,
    Isnan,
    Isclose,
}

const ALL: &[MathFn] = &[
    MathFn::Sqrt,
    MathFn::Isqrt,
    MathFn::Exp,
    MathFn::Log,
    MathFn::Log2,
    MathFn::Log10,
    MathFn::Sin,
    MathFn::Cos,
    MathFn::Tan,
    MathFn::Asin,
    MathFn::Acos,
    MathFn::Atan,
    MathFn::Atan2,
    MathFn::Sinh,
    MathFn::Cosh,
    MathFn::Tanh,
    MathFn::Floor,
    MathFn::Ceil,
    MathFn::Trunc,
    MathFn::Fabs,
    MathFn::Factorial,
    MathFn::Gcd,
    MathFn::Lcm,
    MathFn::Comb,
    MathFn::Perm,
    MathFn::Hypot,
    MathFn::Degrees,
    MathFn::Radians,
    MathFn::Pow,
    MathFn::Fmod,
    MathFn::Copysign,
    MathFn::Isfinite,
    MathFn::Isinf,
    MathFn::Isnan,
    MathFn::Isclose,
];

/// Module-level constant, if `name` is one.
pub(crate) fn constant(name: &str) -> Option<Value> {
    let value = match name {
        "pi" => consts::PI,
        "e" => consts::E,
        "tau" => consts::TAU,
        "inf" => f64::INFINITY,
        "nan" => f64::NAN,
        _ => return None,
    };
    Some(Value::Float(value))
}

/// A member of the `math` module: a constant or a function.
pub(crate) fn member(name: &str) -> Option<Value> {
    constant(name).or_else(|| {
        MathFn::from_name(name).map(|f| Value::Builtin(super::Builtin::Math(f)))
    })
}

#[cold]
fn domain_error() -> crate::EvalError {
    value_error("math domain error")
}

#[cold]
fn range_error() -> crate::EvalError {
    overflow("math range error")
}

/// A real-number argument as `f64`.
fn real(value: &Value) -> EvalResult<f64> {
    Number::of(value).map(Number::to_f64).ok_or_else(|| {
        type_error(format!(
            "must be real number, not {}",
            value.type_name()
        ))
    })
}

/// Finish a float computation: NaN from a finite input is a domain error,
/// infinity from a finite input is a range error.
fn checked(inputs: &[f64], result: f64) -> EvalResult {
    let finite_inputs = inputs.iter().all(|x| x.is_finite());
    if result.is_nan() && !inputs.iter().any(|x| x.is_nan()) {
        return Err(domain_error());
    }
    if result.is_infinite() && finite_inputs {
        return Err(range_error());
    }
    Ok(Value::Float(result))
}

fn unary(args: CallArgs, name: &str, f: impl Fn(f64) -> f64) -> EvalResult {
    let x = real(&args.single(name)?)?;
    checked(&[x], f(x))
}

fn binary(args: CallArgs, name: &str) -> EvalResult<(f64, f64)> {
    let args = args.exact(name, 2)?;
    Ok((real(&args[0])?, real(&args[1])?))
}

impl MathFn {
    pub fn name(self) -> &'static str {
        match self {
            Self::Sqrt => "sqrt",
            Self::Isqrt => "isqrt",
            Self::Exp => "exp",
            Self::Log => "log",
            Self::Log2 => "log2",
            Self::Log10 => "log10",
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Atan2 => "atan2",
            Self::Sinh => "sinh",
            Self::Cosh => "cosh",
            Self::Tanh => "tanh",
            Self::Floor => "floor",
            Self::Ceil => "ceil",
            Self::Trunc => "trunc",
            Self::Fabs => "fabs",
            Self::Factorial => "factorial",
            Self::Gcd => "gcd",
            Self::Lcm => "lcm",
            Self::Comb => "comb",
            Self::Perm => "perm",
            Self::Hypot => "hypot",
            Self::Degrees => "degrees",
            Self::Radians => "radians",
            Self::Pow => "pow",
            Self::Fmod => "fmod",
            Self::Copysign => "copysign",
            Self::Isfinite => "isfinite",
            Self::Isinf => "isinf",
            Self::Isnan => "isnan",
            Self::Isclose => "isclose",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        ALL.iter().copied().find(|f| f.name() == name)
    }

    pub(crate) fn call(self, mut args: CallArgs) -> EvalResult {
        let name = self.name();
        match self {
            Self::Sqrt => unary(args, name, f64::sqrt),
            Self::Exp => unary(args, name, f64::exp),
            Self::Log2 => unary(args, name, |x| if x <= 0.0 { f64::NAN } else { x.log2() }),
            Self::Log10 => unary(args, name, |x| if x <= 0.0 { f64::NAN } else { x.log10() }),
            Self::Sin => unary(args, name, f64::sin),
            Self::Cos => unary(args, name, f64::cos),
            Self::Tan => unary(args, name, f64::tan),
            Self::Asin => unary(args, name, f64::asin),
            Self::Acos => unary(args, name, f64::acos),
            Self::Atan => unary(args, name, f64::atan),
            Self::Sinh => unary(args, name, f64::sinh),
            Self::Cosh => unary(args, name, f64::cosh),
            Self::Tanh => unary(args, name, f64::tanh),
            Self::Fabs => unary(args, name, f64::abs),
            Self::Degrees => unary(args, name, f64::to_degrees),
            Self::Radians => unary(args, name, f64::to_radians),
            Self::Log => {
                let positional = args.between(name, 1, 2)?;
                let x = real(&positional[0])?;
                if x <= 0.0 {
                    return Err(domain_error());
                }
                match positional.get(1) {
                    None => checked(&[x], x.ln()),
                    Some(base) => {
                        let base = real(base)?;
                        if base <= 0.0 {
                            return Err(domain_error());
                        }
                        let denominator = base.ln();
                        if denominator == 0.0 {
                            return Err(crate::errors::division_by_zero("float division by zero"));
                        }
                        checked(&[x, base], x.ln() / denominator)
                    }
                }
            }
            Self::Atan2 => {
                let (y, x) = binary(args, name)?;
                Ok(Value::Float(y.atan2(x)))
            }
            Self::Pow => {
                let (x, y) = binary(args, name)?;
                if x == 0.0 && y < 0.0 {
                    return Err(domain_error());
                }
                checked(&[x, y], x.powf(y))
            }
            Self::Fmod => {
                let (x, y) = binary(args, name)?;
                if y == 0.0 || x.is_infinite() {
                    return Err(domain_error());
                }
                Ok(Value::Float(x % y))
            }
            Self::Copysign => {
                let (x, y) = binary(args, name)?;
                Ok(Value::Float(x.copysign(y)))
            }
            Self::Hypot => {
                args.no_keywords(name)?;
                let mut coords = Vec::with_capacity(args.len());
                for v in &args.positional {
                    coords.push(real(v)?);
                }
                let result = coords.iter().fold(0.0_f64, |acc, x| acc.hypot(*x));
                checked(&coords, result)
            }
            Self::Isfinite => Ok(Value::Bool(real(&args.single(name)?)?.is_finite())),
            Self::Isinf => Ok(Value::Bool(real(&args.single(name)?)?.is_infinite())),
            Self::Isnan => Ok(Value::Bool(real(&args.single(name)?)?.is_nan())),
            Self::Isclose => {
                let rel_tol = args.take_keyword("rel_tol").map(|v| real(&v)).transpose()?;
                let abs_tol = args.take_keyword("abs_tol").map(|v| real(&v)).transpose()?;
                let (a, b) = binary(args, name)?;
                let rel_tol = rel_tol.unwrap_or(1e-9);
                let abs_tol = abs_tol.unwrap_or(0.0);
                if rel_tol < 0.0 || abs_tol < 0.0 {
                    return Err(value_error("tolerances must be non-negative"));
                }
                Ok(Value::Bool(isclose(a, b, rel_tol, abs_tol)))
            }
            Self::Floor => to_integral(&args.single(name)?, RoundingMode::Floor, f64::floor),
            Self::Ceil => to_integral(&args.single(name)?, RoundingMode::Ceiling, f64::ceil),
            Self::Trunc => to_integral(&args.single(name)?, RoundingMode::Down, f64::trunc),
            Self::Isqrt => {
                let n = expect_int(&args.single(name)?)?;
                if n < 0 {
                    return Err(value_error("isqrt() argument must be nonnegative"));
                }
                Ok(Value::Int(isqrt(n)))
            }
            Self::Factorial => {
                let n = integral_arg(&args.single(name)?)?;
                if n < 0 {
                    return Err(value_error("factorial() not defined for negative values"));
                }
                let mut acc: i64 = 1;
                for k in 2..=n {
                    acc = acc
                        .checked_mul(k)
                        .ok_or_else(|| integer_overflow("factorial"))?;
                }
                Ok(Value::Int(acc))
            }
            Self::Gcd => {
                args.no_keywords(name)?;
                let mut acc: i64 = 0;
                for v in &args.positional {
                    acc = gcd(acc, expect_int(v)?).ok_or_else(|| integer_overflow("gcd"))?;
                }
                Ok(Value::Int(acc))
            }
            Self::Lcm => {
                args.no_keywords(name)?;
                let mut acc: i64 = 1;
                for v in &args.positional {
                    let n = expect_int(v)?;
                    if acc == 0 || n == 0 {
                        acc = 0;
                        continue;
                    }
                    let g = gcd(acc, n).ok_or_else(|| integer_overflow("lcm"))?;
                    acc = (acc / g)
                        .checked_mul(n)
                        .and_then(i64::checked_abs)
                        .ok_or_else(|| integer_overflow("lcm"))?;
                }
                Ok(Value::Int(acc))
            }
            Self::Comb => {
                let args = args.exact(name, 2)?;
                let (n, k) = (expect_int(&args[0])?, expect_int(&args[1])?);
                if n < 0 {
                    return Err(value_error("n must be a non-negative integer"));
                }
                if k < 0 {
                    return Err(value_error("k must be a non-negative integer"));
                }
                if k > n {
                    return Ok(Value::Int(0));
                }
                let k = k.min(n - k);
                let mut acc: i128 = 1;
                for i in 0..k {
                    acc = acc * i128::from(n - i) / i128::from(i + 1);
                    if acc > i128::from(i64::MAX) {
                        return Err(integer_overflow("comb"));
                    }
                }
                i64::try_from(acc)
                    .map(Value::Int)
                    .map_err(|_| integer_overflow("comb"))
            }
            Self::Perm => {
                let args = args.between(name, 1, 2)?;
                let n = expect_int(&args[0])?;
                let k = match args.get(1) {
                    None | Some(Value::None) => n,
                    Some(v) => expect_int(v)?,
                };
                if n < 0 {
                    return Err(value_error("n must be a non-negative integer"));
                }
                if k < 0 {
                    return Err(value_error("k must be a non-negative integer"));
                }
                if k > n {
                    return Ok(Value::Int(0));
                }
                let mut acc: i64 = 1;
                for i in 0..k {
                    acc = acc
                        .checked_mul(n - i)
                        .ok_or_else(|| integer_overflow("perm"))?;
                }
                Ok(Value::Int(acc))
            }
        }
    }
}

fn isclose(a: f64, b: f64, rel_tol: f64, abs_tol: f64) -> bool {
    if a == b {
        return true;
    }
    if a.is_infinite() || b.is_infinite() {
        return false;
    }
    let diff = (b - a).abs();
    diff <= (rel_tol * b).abs() || diff <= (rel_tol * a).abs() || diff <= abs_tol
}

/// `floor`/`ceil`/`trunc`: always an `int`.
fn to_integral(value: &Value, mode: RoundingMode, f: impl Fn(f64) -> f64) -> EvalResult {
    match value {
        Value::Int(_) | Value::Bool(_) => Ok(Value::Int(value.as_int().unwrap_or(0))),
        Value::Float(x) => f64_to_i64(f(*x)).map(Value::Int),
        Value::Decimal(d) => {
            let rounded: BigDecimal = d.with_scale_round(0, mode);
            decimal_to_i64(&rounded)
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("decimal conversion"))
        }
        other => Err(type_error(format!(
            "must be real number, not {}",
            other.type_name()
        ))),
    }
}

/// An integer, or an integral float.
fn integral_arg(value: &Value) -> EvalResult<i64> {
    if let Value::Float(f) = value {
        if f.fract() == 0.0 && f.is_finite() {
            return f64_to_i64(*f);
        }
        return Err(value_error("factorial() only accepts integral values"));
    }
    expect_int(value)
}

fn isqrt(n: i64) -> i64 {
    let mut x = f64_to_i64(i64_to_f64(n).sqrt()).unwrap_or(0).max(0);
    while x.checked_mul(x).map_or(true, |sq| sq > n) {
        x -= 1;
    }
    while (x + 1).checked_mul(x + 1).is_some_and(|sq| sq <= n) {
        x += 1;
    }
    x
}

fn gcd(a: i64, b: i64) -> Option<i64> {
    let (mut a, mut b) = (a.unsigned_abs(), b.unsigned_abs());
    while b != 0 {
        (a, b) = (b, a % b);
    }
    i64::try_from(a).ok()
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    fn call(f: MathFn, args: Vec<Value>) -> EvalResult {
        f.call(CallArgs::new(args))
    }

    #[test]
    fn test_lookup_by_name() {
        assert_eq!(MathFn::from_name("sqrt"), Some(MathFn::Sqrt));
        assert_eq!(MathFn::from_name("system"), None);
        assert!(matches!(member("pi"), Some(Value::Float(_))));
    }

    #[test]
    fn test_domain_error() {
        let err = call(MathFn::Sqrt, vec![Value::Int(-1)]).unwrap_err();
        assert_eq!(err.class_name(), "ValueError");
        assert_eq!(err.to_string(), "math domain error");
        let err = call(MathFn::Log, vec![Value::Int(0)]).unwrap_err();
        assert_eq!(err.to_string(), "math domain error");
    }

    #[test]
    fn test_range_error() {
        let err = call(MathFn::Exp, vec![Value::Int(1000)]).unwrap_err();
        assert_eq!(err.class_name(), "OverflowError");
    }

    #[test]
    fn test_integral_results() {
        assert!(matches!(
            call(MathFn::Floor, vec![Value::Float(-1.5)]).unwrap(),
            Value::Int(-2)
        ));
        assert!(matches!(
            call(MathFn::Ceil, vec![Value::Float(1.2)]).unwrap(),
            Value::Int(2)
        ));
        assert!(matches!(
            call(MathFn::Isqrt, vec![Value::Int(99)]).unwrap(),
            Value::Int(9)
        ));
    }

    #[test]
    fn test_combinatorics() {
        assert!(matches!(
            call(MathFn::Factorial, vec![Value::Int(20)]).unwrap(),
            Value::Int(2_432_902_008_176_640_000)
        ));
        let err = call(MathFn::Factorial, vec![Value::Int(21)]).unwrap_err();
        assert_eq!(err.class_name(), "OverflowError");
        assert!(matches!(
            call(MathFn::Comb, vec![Value::Int(10), Value::Int(3)]).unwrap(),
            Value::Int(120)
        ));
        assert!(matches!(
            call(MathFn::Gcd, vec![Value::Int(12), Value::Int(-18)]).unwrap(),
            Value::Int(6)
        ));
        assert!(matches!(
            call(MathFn::Lcm, vec![Value::Int(4), Value::Int(6)]).unwrap(),
            Value::Int(12)
        ));
    }

    #[test]
    fn test_isclose_keywords() {
        let mut args = CallArgs::new(vec![Value::Float(1.0), Value::Float(1.05)]);
        args.keywords.push(("abs_tol".into(), Value::Float(0.1)));
        assert!(matches!(MathFn::Isclose.call(args).unwrap(), Value::Bool(true)));
    }
}
