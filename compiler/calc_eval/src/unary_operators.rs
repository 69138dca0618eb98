//! Unary operator implementations for the evaluator.
//!
//! Direct enum dispatch on the operand. `not` applies to every value; the
//! arithmetic operators accept numbers, and `~` only integers.

use calc_ir::UnaryOp;

use crate::errors::{bad_unary_operand, integer_overflow, EvalResult};
use crate::Value;

/// Evaluate `op value`.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> EvalResult {
    match (value, op) {
        (_, UnaryOp::Not) => Ok(Value::Bool(!value.is_truthy())),

        // Numeric negation
        (Value::Int(n), UnaryOp::Neg) => n
            .checked_neg()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("negation")),
        (Value::Bool(b), UnaryOp::Neg) => Ok(Value::Int(-i64::from(*b))),
        (Value::Float(f), UnaryOp::Neg) => Ok(Value::Float(-f)),
        (Value::Decimal(d), UnaryOp::Neg) => Ok(Value::decimal(-(**d).clone())),

        // Identity
        (Value::Int(_) | Value::Float(_) | Value::Decimal(_), UnaryOp::Pos) => Ok(value.clone()),
        (Value::Bool(b), UnaryOp::Pos) => Ok(Value::Int(i64::from(*b))),

        // Bitwise not
        (Value::Int(n), UnaryOp::Invert) => Ok(Value::Int(!*n)),
        (Value::Bool(b), UnaryOp::Invert) => Ok(Value::Int(!i64::from(*b))),

        // Invalid combinations
        _ => Err(bad_unary_operand(op.as_symbol(), value.type_name())),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;

    #[test]
    fn test_negation() {
        assert!(matches!(
            evaluate_unary(&Value::Int(5), UnaryOp::Neg).unwrap(),
            Value::Int(-5)
        ));
        assert!(matches!(
            evaluate_unary(&Value::Bool(true), UnaryOp::Neg).unwrap(),
            Value::Int(-1)
        ));
        let err = evaluate_unary(&Value::Int(i64::MIN), UnaryOp::Neg).unwrap_err();
        assert_eq!(err.to_string(), "integer overflow in negation");
    }

    #[test]
    fn test_not_uses_truthiness() {
        assert!(matches!(
            evaluate_unary(&Value::list(vec![]), UnaryOp::Not).unwrap(),
            Value::Bool(true)
        ));
        assert!(matches!(
            evaluate_unary(&Value::str("x"), UnaryOp::Not).unwrap(),
            Value::Bool(false)
        ));
    }

    #[test]
    fn test_invert() {
        assert!(matches!(
            evaluate_unary(&Value::Int(0), UnaryOp::Invert).unwrap(),
            Value::Int(-1)
        ));
        let err = evaluate_unary(&Value::Float(1.0), UnaryOp::Invert).unwrap_err();
        assert_eq!(err.to_string(), "bad operand type for unary ~: 'float'");
    }

    #[test]
    fn test_decimal_invert_is_rejected() {
        let d = Value::decimal(crate::numeric::decimal_from_i64(3));
        let err = evaluate_unary(&d, UnaryOp::Invert).unwrap_err();
        assert_eq!(
            err.to_string(),
            "bad operand type for unary ~: 'decimal.Decimal'"
        );
        assert!(matches!(evaluate_unary(&d, UnaryOp::Neg).unwrap(), Value::Decimal(_)));
    }

    #[test]
    fn test_str_negation_is_rejected() {
        let err = evaluate_unary(&Value::str("a"), UnaryOp::Neg).unwrap_err();
        assert_eq!(err.to_string(), "bad operand type for unary -: 'str'");
    }
}
