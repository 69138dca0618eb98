//! Binary operator implementations for the evaluator.
//!
//! Direct enum dispatch on the operand pair. Numbers of any mix are promoted
//! first (`bool` → `int` → `float`, and anything → `decimal.Decimal` when a
//! decimal is involved); sequences, sets and dicts follow.

use std::rc::Rc;

use bigdecimal::BigDecimal;
use calc_ir::BinaryOp;

use crate::errors::{
    division_by_zero, integer_overflow, overflow, unsupported_operand, value_error, EvalResult,
};
use crate::numeric::{
    decimal_add, decimal_div, decimal_floordiv, decimal_from_f64, decimal_from_i64, decimal_mod,
    decimal_mul, decimal_pow, decimal_sub, i64_to_f64,
};
use crate::value::{DictTable, SetTable, Value};

/// A numeric operand after `bool` → `int` folding.
#[derive(Copy, Clone, Debug)]
pub(crate) enum Number<'a> {
    Int(i64),
    Float(f64),
    Decimal(&'a BigDecimal),
}

impl<'a> Number<'a> {
    pub(crate) fn of(value: &'a Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(Number::Int(i64::from(*b))),
            Value::Int(n) => Some(Number::Int(*n)),
            Value::Float(f) => Some(Number::Float(*f)),
            Value::Decimal(d) => Some(Number::Decimal(d)),
            _ => None,
        }
    }

    pub(crate) fn to_f64(self) -> f64 {
        match self {
            Number::Int(n) => i64_to_f64(n),
            Number::Float(f) => f,
            Number::Decimal(d) => crate::numeric::decimal_to_f64(d),
        }
    }

    pub(crate) fn to_decimal(self) -> EvalResult<BigDecimal> {
        match self {
            Number::Int(n) => Ok(decimal_from_i64(n)),
            Number::Float(f) => decimal_from_f64(f),
            Number::Decimal(d) => Ok(d.clone()),
        }
    }
}

// Helper functions for repetitive checked arithmetic patterns

/// Checked arithmetic operation with overflow handling.
#[inline]
fn checked_arith(result: Option<i64>, op_name: &'static str) -> EvalResult {
    result.map(Value::Int).ok_or_else(|| integer_overflow(op_name))
}

/// Checked integer division-like operation with zero guard.
#[inline]
fn checked_div<F>(is_zero: bool, op: F, op_name: &'static str) -> EvalResult
where
    F: FnOnce() -> Option<i64>,
{
    if is_zero {
        Err(division_by_zero("integer division or modulo by zero"))
    } else {
        op().map(Value::Int).ok_or_else(|| integer_overflow(op_name))
    }
}

fn mismatch(left: &Value, right: &Value, op: BinaryOp) -> crate::EvalError {
    unsupported_operand(op.as_symbol(), left.type_name(), right.type_name())
}

// Direct Dispatch Function

/// Evaluate `left op right`.
pub fn evaluate_binary(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    if let (Some(a), Some(b)) = (Number::of(left), Number::of(right)) {
        return match (a, b) {
            (Number::Decimal(_), _) | (_, Number::Decimal(_)) => {
                if op.is_bitwise() {
                    return Err(mismatch(left, right, op));
                }
                eval_decimal_binary(&a.to_decimal()?, &b.to_decimal()?, op)
            }
            (Number::Int(_), Number::Int(_)) if is_bool_logic(left, right, op) => {
                let (a, b) = (left.is_truthy(), right.is_truthy());
                Ok(Value::Bool(match op {
                    BinaryOp::BitAnd => a & b,
                    BinaryOp::BitOr => a | b,
                    _ => a ^ b,
                }))
            }
            (Number::Int(a), Number::Int(b)) => eval_int_binary(a, b, op),
            _ if op.is_bitwise() => Err(mismatch(left, right, op)),
            _ => eval_float_binary(a.to_f64(), b.to_f64(), op),
        };
    }

    match (left, right) {
        (Value::Str(a), Value::Str(b)) if op == BinaryOp::Add => {
            let mut s = String::with_capacity(a.len() + b.len());
            s.push_str(a);
            s.push_str(b);
            Ok(Value::str(s))
        }
        (Value::Bytes(a), Value::Bytes(b)) if op == BinaryOp::Add => {
            Ok(Value::bytes([&a[..], &b[..]].concat()))
        }
        (Value::List(a), Value::List(b)) if op == BinaryOp::Add => {
            let mut items = a.borrow().clone();
            items.extend(b.borrow().iter().cloned());
            Ok(Value::list(items))
        }
        (Value::Tuple(a), Value::Tuple(b)) if op == BinaryOp::Add => {
            Ok(Value::tuple([&a[..], &b[..]].concat()))
        }
        (Value::Str(_) | Value::Bytes(_) | Value::List(_) | Value::Tuple(_), count)
            if op == BinaryOp::Mul && count.as_int().is_some() =>
        {
            repeat(left, count.as_int().unwrap_or(0))
        }
        (count, Value::Str(_) | Value::Bytes(_) | Value::List(_) | Value::Tuple(_))
            if op == BinaryOp::Mul && count.as_int().is_some() =>
        {
            repeat(right, count.as_int().unwrap_or(0))
        }
        (Value::Set(a), Value::Set(b)) => {
            let (a, b) = (a.borrow(), b.borrow());
            eval_set_binary(&a, &b, op).map_or_else(|| Err(mismatch(left, right, op)), |r| r)
        }
        (Value::Dict(a), Value::Dict(b)) if op == BinaryOp::BitOr => {
            Ok(Value::dict(merge_dicts(&a.borrow(), &b.borrow())?))
        }
        _ => Err(mismatch(left, right, op)),
    }
}

/// `&`, `|` and `^` on two bools stay boolean.
fn is_bool_logic(left: &Value, right: &Value, op: BinaryOp) -> bool {
    matches!((left, right), (Value::Bool(_), Value::Bool(_)))
        && matches!(op, BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor)
}

// Type-Specific Evaluation Functions

/// Binary operations on integers.
fn eval_int_binary(a: i64, b: i64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => checked_arith(a.checked_add(b), "addition"),
        BinaryOp::Sub => checked_arith(a.checked_sub(b), "subtraction"),
        BinaryOp::Mul => checked_arith(a.checked_mul(b), "multiplication"),
        BinaryOp::Div => {
            if b == 0 {
                Err(division_by_zero("division by zero"))
            } else {
                Ok(Value::Float(i64_to_f64(a) / i64_to_f64(b)))
            }
        }
        BinaryOp::FloorDiv => checked_div(b == 0, || floor_div(a, b), "floor division"),
        BinaryOp::Mod => checked_div(b == 0, || floor_mod(a, b), "modulo"),
        BinaryOp::Pow => int_pow(a, b),
        BinaryOp::BitAnd => Ok(Value::Int(a & b)),
        BinaryOp::BitOr => Ok(Value::Int(a | b)),
        BinaryOp::BitXor => Ok(Value::Int(a ^ b)),
        BinaryOp::Shl => {
            if b < 0 {
                return Err(value_error("negative shift count"));
            }
            if a == 0 {
                return Ok(Value::Int(0));
            }
            let shifted = u32::try_from(b)
                .ok()
                .filter(|&s| s < 64)
                .map(|s| a << s)
                .filter(|&r| r >> b == a);
            checked_arith(shifted, "left shift")
        }
        BinaryOp::Shr => {
            if b < 0 {
                return Err(value_error("negative shift count"));
            }
            Ok(Value::Int(match u32::try_from(b) {
                Ok(s) if s < 64 => a >> s,
                _ if a < 0 => -1,
                _ => 0,
            }))
        }
        BinaryOp::MatMul => Err(unsupported_operand(op.as_symbol(), "int", "int")),
    }
}

/// Division rounded toward negative infinity.
pub(crate) fn floor_div(a: i64, b: i64) -> Option<i64> {
    let q = a.checked_div(b)?;
    if a % b != 0 && ((a < 0) != (b < 0)) {
        q.checked_sub(1)
    } else {
        Some(q)
    }
}

/// Remainder with the sign of the divisor.
pub(crate) fn floor_mod(a: i64, b: i64) -> Option<i64> {
    let r = a.checked_rem(b)?;
    if r != 0 && ((r < 0) != (b < 0)) {
        r.checked_add(b)
    } else {
        Some(r)
    }
}

fn int_pow(a: i64, b: i64) -> EvalResult {
    if b < 0 {
        if a == 0 {
            return Err(division_by_zero("0.0 cannot be raised to a negative power"));
        }
        return Ok(Value::Float(i64_to_f64(a).powf(i64_to_f64(b))));
    }
    let result = match a {
        0 | 1 => Some(if b == 0 { 1 } else { a }),
        -1 => Some(if b % 2 == 0 { 1 } else { -1 }),
        _ => u32::try_from(b).ok().and_then(|e| a.checked_pow(e)),
    };
    checked_arith(result, "exponentiation")
}

/// Binary operations on floats (and ints promoted to float).
fn eval_float_binary(a: f64, b: f64, op: BinaryOp) -> EvalResult {
    match op {
        BinaryOp::Add => Ok(Value::Float(a + b)),
        BinaryOp::Sub => Ok(Value::Float(a - b)),
        BinaryOp::Mul => Ok(Value::Float(a * b)),
        BinaryOp::Div => {
            if b == 0.0 {
                Err(division_by_zero("float division by zero"))
            } else {
                Ok(Value::Float(a / b))
            }
        }
        BinaryOp::FloorDiv => {
            if b == 0.0 {
                Err(division_by_zero("float floor division by zero"))
            } else {
                Ok(Value::Float((a / b).floor()))
            }
        }
        BinaryOp::Mod => {
            if b == 0.0 {
                Err(division_by_zero("float modulo"))
            } else {
                Ok(Value::Float(float_mod(a, b)))
            }
        }
        BinaryOp::Pow => float_pow(a, b),
        BinaryOp::MatMul
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr => Err(unsupported_operand(op.as_symbol(), "float", "float")),
    }
}

pub(crate) fn float_mod(a: f64, b: f64) -> f64 {
    let r = a % b;
    if r != 0.0 && ((r < 0.0) != (b < 0.0)) {
        r + b
    } else if r == 0.0 {
        0.0_f64.copysign(b)
    } else {
        r
    }
}

pub(crate) fn float_pow(a: f64, b: f64) -> EvalResult {
    if a == 0.0 && b < 0.0 {
        return Err(division_by_zero("0.0 cannot be raised to a negative power"));
    }
    if a < 0.0 && b.is_finite() && b.fract() != 0.0 {
        return Err(value_error(
            "negative number cannot be raised to a fractional power",
        ));
    }
    let result = a.powf(b);
    if result.is_infinite() && a.is_finite() && b.is_finite() {
        return Err(overflow("(34, 'Numerical result out of range')"));
    }
    Ok(Value::Float(result))
}

/// Binary operations on decimals (operands already converted).
fn eval_decimal_binary(a: &BigDecimal, b: &BigDecimal, op: BinaryOp) -> EvalResult {
    let result = match op {
        BinaryOp::Add => decimal_add(a, b),
        BinaryOp::Sub => decimal_sub(a, b),
        BinaryOp::Mul => decimal_mul(a, b),
        BinaryOp::Div => decimal_div(a, b)?,
        BinaryOp::FloorDiv => decimal_floordiv(a, b)?,
        BinaryOp::Mod => decimal_mod(a, b)?,
        BinaryOp::Pow => decimal_pow(a, b)?,
        BinaryOp::MatMul
        | BinaryOp::BitAnd
        | BinaryOp::BitOr
        | BinaryOp::BitXor
        | BinaryOp::Shl
        | BinaryOp::Shr => {
            return Err(unsupported_operand(
                op.as_symbol(),
                "decimal.Decimal",
                "decimal.Decimal",
            ))
        }
    };
    Ok(Value::decimal(result))
}

/// `seq * n`; a non-positive count yields an empty sequence.
fn repeat(seq: &Value, count: i64) -> EvalResult {
    let times = usize::try_from(count).unwrap_or(0);
    let too_long = || overflow("repeated sequence is too long");
    let check = |len: usize| {
        len.checked_mul(times)
            .filter(|&total| isize::try_from(total).is_ok())
            .ok_or_else(too_long)
    };
    match seq {
        Value::Str(s) => {
            check(s.len())?;
            Ok(Value::str(s.repeat(times)))
        }
        Value::Bytes(b) => {
            check(b.len())?;
            Ok(Value::bytes(b.repeat(times)))
        }
        Value::List(items) => {
            let items = items.borrow();
            check(items.len())?;
            Ok(Value::list(repeat_items(&items, times)))
        }
        Value::Tuple(items) => {
            check(items.len())?;
            Ok(Value::Tuple(Rc::from(repeat_items(items, times))))
        }
        _ => Ok(seq.clone()),
    }
}

fn repeat_items(items: &[Value], times: usize) -> Vec<Value> {
    let mut out = Vec::with_capacity(items.len() * times);
    for _ in 0..times {
        out.extend_from_slice(items);
    }
    out
}

/// Set algebra; `None` when the operator does not apply to sets.
fn eval_set_binary(a: &SetTable, b: &SetTable, op: BinaryOp) -> Option<EvalResult> {
    fn keys_where(from: &SetTable, other: &SetTable, keep_shared: bool) -> EvalResult<Vec<Value>> {
        let mut out = Vec::new();
        for k in from.keys() {
            if other.contains(k)? == keep_shared {
                out.push(k.clone());
            }
        }
        Ok(out)
    }
    let collect = |keys: Vec<Value>| SetTable::from_values(keys).map(Value::set);
    let result = match op {
        BinaryOp::BitOr => collect(a.keys().chain(b.keys()).cloned().collect()),
        BinaryOp::BitAnd => keys_where(a, b, true).and_then(collect),
        BinaryOp::Sub => keys_where(a, b, false).and_then(collect),
        BinaryOp::BitXor => keys_where(a, b, false).and_then(|mut left_only| {
            left_only.extend(keys_where(b, a, false)?);
            collect(left_only)
        }),
        _ => return None,
    };
    Some(result)
}

/// Merge of two dict tables for `|`.
pub(crate) fn merge_dicts(a: &DictTable, b: &DictTable) -> EvalResult<DictTable> {
    let mut merged = a.clone();
    for (k, v) in b.iter() {
        merged.insert(k.clone(), v.clone())?;
    }
    Ok(merged)
}
