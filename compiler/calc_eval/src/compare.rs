//! Equality, ordering and membership.

use std::cmp::Ordering;

use calc_ir::CmpOp;

use crate::errors::{type_error, unorderable, EvalResult};
use crate::operators::Number;
use crate::value::{iterate, SetTable, Value};

/// `a == b`. Never fails; unrelated types compare unequal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    if let (Some(x), Some(y)) = (Number::of(a), Number::of(b)) {
        return numbers_cmp(x, y) == Some(Ordering::Equal);
    }
    match (a, b) {
        (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
        (Value::Str(x), Value::Str(y)) => x == y,
        (Value::Bytes(x), Value::Bytes(y)) => x == y,
        (Value::Tuple(x), Value::Tuple(y)) => items_equal(x, y),
        (Value::List(x), Value::List(y)) => x.ptr_eq(y) || items_equal(&x.borrow(), &y.borrow()),
        (Value::Range(x), Value::Range(y)) => {
            let len = x.len();
            len == y.len() && (len == 0 || (x.start == y.start && (len == 1 || x.step == y.step)))
        }
        (Value::Slice(x), Value::Slice(y)) => {
            values_equal(&x.start, &y.start)
                && values_equal(&x.stop, &y.stop)
                && values_equal(&x.step, &y.step)
        }
        (Value::Dict(x), Value::Dict(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len()
                && x.iter().all(|(k, v)| {
                    matches!(
                        y.get(k),
                        Ok(Some(other)) if v.is_identical(other) || values_equal(v, other)
                    )
                })
        }
        (Value::Set(x), Value::Set(y)) => {
            let (x, y) = (x.borrow(), y.borrow());
            x.len() == y.len() && is_subset(&x, &y)
        }
        _ => a.is_identical(b),
    }
}

fn items_equal(a: &[Value], b: &[Value]) -> bool {
    a.len() == b.len()
        && a
            .iter()
            .zip(b)
            .all(|(x, y)| x.is_identical(y) || values_equal(x, y))
}

fn is_subset(a: &SetTable, b: &SetTable) -> bool {
    a.keys().all(|k| matches!(b.contains(k), Ok(true)))
}

/// Numeric comparison; `None` when a NaN is involved.
pub(crate) fn numbers_cmp(a: Number<'_>, b: Number<'_>) -> Option<Ordering> {
    match (a, b) {
        (Number::Int(x), Number::Int(y)) => Some(x.cmp(&y)),
        (Number::Decimal(_), _) | (_, Number::Decimal(_)) => {
            let x = a.to_decimal().ok()?;
            let y = b.to_decimal().ok()?;
            Some(x.cmp(&y))
        }
        _ => a.to_f64().partial_cmp(&b.to_f64()),
    }
}

/// Ordering used by `<`, `sorted`, `min` and `max`.
///
/// `Ok(None)` means the operands are comparable but unordered (NaN).
pub fn compare_order(a: &Value, b: &Value, op: &'static str) -> EvalResult<Option<Ordering>> {
    if let (Some(x), Some(y)) = (Number::of(a), Number::of(b)) {
        return Ok(numbers_cmp(x, y));
    }
    match (a, b) {
        (Value::Str(x), Value::Str(y)) => Ok(Some(x.cmp(y))),
        (Value::Bytes(x), Value::Bytes(y)) => Ok(Some(x.cmp(y))),
        (Value::Tuple(x), Value::Tuple(y)) => sequence_order(x, y, op),
        (Value::List(x), Value::List(y)) => {
            let (x, y) = (x.borrow().clone(), y.borrow().clone());
            sequence_order(&x, &y, op)
        }
        _ => Err(unorderable(op, a.type_name(), b.type_name())),
    }
}

/// Lexicographic order: the first unequal pair decides, then length.
fn sequence_order(a: &[Value], b: &[Value], op: &'static str) -> EvalResult<Option<Ordering>> {
    for (x, y) in a.iter().zip(b) {
        if !(x.is_identical(y) || values_equal(x, y)) {
            return compare_order(x, y, op);
        }
    }
    Ok(Some(a.len().cmp(&b.len())))
}

/// `a < b` as a boolean, used by sorting and `min`/`max`.
pub fn less_than(a: &Value, b: &Value) -> EvalResult<bool> {
    if let (Value::Set(_), Value::Set(_)) = (a, b) {
        return set_compare(a, b, CmpOp::Lt);
    }
    Ok(compare_order(a, b, "<")? == Some(Ordering::Less))
}

fn set_compare(a: &Value, b: &Value, op: CmpOp) -> EvalResult<bool> {
    let (Value::Set(x), Value::Set(y)) = (a, b) else {
        return Err(unorderable(op.as_symbol(), a.type_name(), b.type_name()));
    };
    let (x, y) = (x.borrow(), y.borrow());
    Ok(match op {
        CmpOp::Lt => x.len() < y.len() && is_subset(&x, &y),
        CmpOp::LtEq => is_subset(&x, &y),
        CmpOp::Gt => x.len() > y.len() && is_subset(&y, &x),
        _ => is_subset(&y, &x),
    })
}

/// One link of a comparison chain.
pub fn evaluate_compare(left: &Value, right: &Value, op: CmpOp) -> EvalResult<bool> {
    match op {
        CmpOp::Eq => Ok(values_equal(left, right)),
        CmpOp::NotEq => Ok(!values_equal(left, right)),
        CmpOp::Is => Ok(left.is_identical(right)),
        CmpOp::IsNot => Ok(!left.is_identical(right)),
        CmpOp::In => contains(right, left),
        CmpOp::NotIn => contains(right, left).map(|found| !found),
        CmpOp::Lt | CmpOp::LtEq | CmpOp::Gt | CmpOp::GtEq => {
            if let (Value::Set(_), Value::Set(_)) = (left, right) {
                return set_compare(left, right, op);
            }
            let Some(ordering) = compare_order(left, right, op.as_symbol())? else {
                return Ok(false);
            };
            Ok(match op {
                CmpOp::Lt => ordering == Ordering::Less,
                CmpOp::LtEq => ordering != Ordering::Greater,
                CmpOp::Gt => ordering == Ordering::Greater,
                _ => ordering != Ordering::Less,
            })
        }
    }
}

/// `item in container`.
pub fn contains(container: &Value, item: &Value) -> EvalResult<bool> {
    match container {
        Value::Str(haystack) => match item {
            Value::Str(needle) => Ok(haystack.contains(&**needle)),
            other => Err(type_error(format!(
                "'in <string>' requires string as left operand, not {}",
                other.type_name()
            ))),
        },
        Value::Bytes(haystack) => match item {
            Value::Bytes(needle) => Ok(needle.is_empty()
                || haystack
                    .windows(needle.len())
                    .any(|window| window == &needle[..])),
            other => match other.as_int() {
                Some(byte) => Ok(u8::try_from(byte).is_ok_and(|b| haystack.contains(&b))),
                None => Err(type_error(format!(
                    "a bytes-like object is required, not '{}'",
                    other.type_name()
                ))),
            },
        },
        Value::Dict(table) => table.borrow().contains(item),
        Value::Set(table) => table.borrow().contains(item),
        Value::Range(range) => Ok(match Number::of(item) {
            Some(Number::Int(n)) => range.contains(n),
            Some(_) => {
                let mut found = false;
                for candidate in iterate(container)? {
                    if values_equal(&candidate, item) {
                        found = true;
                        break;
                    }
                }
                found
            }
            None => false,
        }),
        Value::List(_) | Value::Tuple(_) | Value::Iterator(_) => {
            for candidate in iterate(container)? {
                if candidate.is_identical(item) || values_equal(&candidate, item) {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        other => Err(type_error(format!(
            "argument of type '{}' is not iterable",
            other.type_name()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numbers_compare_across_types() {
        assert!(values_equal(&Value::Int(1), &Value::Float(1.0)));
        assert!(values_equal(&Value::Bool(true), &Value::Int(1)));
        assert!(values_equal(
            &Value::decimal(crate::numeric::decimal_from_i64(2)),
            &Value::Float(2.0)
        ));
        assert!(!values_equal(&Value::Float(f64::NAN), &Value::Float(f64::NAN)));
    }

    #[test]
    fn test_sequence_order() {
        let a = Value::tuple(vec![Value::Int(1), Value::Int(2)]);
        let b = Value::tuple(vec![Value::Int(1), Value::Int(3)]);
        assert!(evaluate_compare(&a, &b, CmpOp::Lt).unwrap_or(false));
        let short = Value::tuple(vec![Value::Int(1)]);
        assert!(evaluate_compare(&short, &a, CmpOp::Lt).unwrap_or(false));
    }

    #[test]
    fn test_unorderable_message() {
        let err = evaluate_compare(&Value::Int(1), &Value::str("a"), CmpOp::Lt).err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("'<' not supported between instances of 'int' and 'str'")
        );
    }

    #[test]
    fn test_set_subset_order() {
        let small = Value::set(SetTable::from_values([Value::Int(1)]).unwrap_or_default());
        let big = Value::set(
            SetTable::from_values([Value::Int(1), Value::Int(2)]).unwrap_or_default(),
        );
        assert!(evaluate_compare(&small, &big, CmpOp::Lt).unwrap_or(false));
        assert!(!evaluate_compare(&big, &small, CmpOp::LtEq).unwrap_or(true));
    }

    #[test]
    fn test_membership() {
        let s = Value::str("hello");
        assert!(contains(&s, &Value::str("ell")).unwrap_or(false));
        let err = contains(&s, &Value::Int(1)).err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("'in <string>' requires string as left operand, not int")
        );
        let r = Value::Range(crate::value::RangeValue {
            start: 0,
            stop: 10,
            step: 3,
        });
        assert!(contains(&r, &Value::Int(9)).unwrap_or(false));
        assert!(!contains(&r, &Value::Int(8)).unwrap_or(true));
    }
}
