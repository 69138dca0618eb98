#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::numeric::decimal_from_str;

fn fmt(value: Value, spec: &str) -> String {
    format_value(&value, spec).unwrap()
}

fn dec(text: &str) -> Value {
    Value::decimal(decimal_from_str(text).unwrap())
}

#[test]
fn test_empty_spec_is_str() {
    assert_eq!(fmt(Value::Float(0.1), ""), "0.1");
    assert_eq!(fmt(Value::str("x"), ""), "x");
    assert_eq!(fmt(Value::list(vec![Value::Int(1)]), ""), "[1]");
}

#[test]
fn test_int_presentations() {
    assert_eq!(fmt(Value::Int(255), "x"), "ff");
    assert_eq!(fmt(Value::Int(255), "#X"), "0XFF");
    assert_eq!(fmt(Value::Int(5), "#b"), "0b101");
    assert_eq!(fmt(Value::Int(-42), "+d"), "-42");
    assert_eq!(fmt(Value::Int(42), "+d"), "+42");
    assert_eq!(fmt(Value::Int(65), "c"), "A");
}

#[test]
fn test_int_width_and_grouping() {
    assert_eq!(fmt(Value::Int(1_234_567), ","), "1,234,567");
    assert_eq!(fmt(Value::Int(1234), "010,"), "00,001,234");
    assert_eq!(fmt(Value::Int(-7), "05"), "-0007");
    assert_eq!(fmt(Value::Int(7), "*^5"), "**7**");
    assert_eq!(fmt(Value::Int(7), "<3"), "7  ");
    assert_eq!(fmt(Value::Int(-7), "=5"), "-   7");
    assert_eq!(fmt(Value::Int(0xffff_ffff), "_x"), "ffff_ffff");
}

#[test]
fn test_float_presentations() {
    assert_eq!(fmt(Value::Float(3.14159), ".2f"), "3.14");
    assert_eq!(fmt(Value::Float(1234.5), ".2e"), "1.23e+03");
    assert_eq!(fmt(Value::Float(0.000_012_3), "g"), "1.23e-05");
    assert_eq!(fmt(Value::Float(123.456), "g"), "123.456");
    assert_eq!(fmt(Value::Float(0.25), ".1%"), "25.0%");
    assert_eq!(fmt(Value::Float(2.0), ".3"), "2.0");
    assert_eq!(fmt(Value::Float(1234.5), ".2"), "1.2e+03");
    assert_eq!(fmt(Value::Float(1_234_567.891), ",.2f"), "1,234,567.89");
    assert_eq!(fmt(Value::Float(f64::INFINITY), "F"), "INF");
}

#[test]
fn test_negative_zero_coercion() {
    assert_eq!(fmt(Value::Float(-0.0001), ".2f"), "-0.00");
    assert_eq!(fmt(Value::Float(-0.0001), "z.2f"), "0.00");
}

#[test]
fn test_int_accepts_float_presentation() {
    assert_eq!(fmt(Value::Int(3), ".1f"), "3.0");
}

#[test]
fn test_decimal_fixed_is_exact() {
    assert_eq!(fmt(dec("2.675"), ".2f"), "2.68");
    assert_eq!(fmt(dec("-1.50"), ""), "-1.50");
    assert_eq!(fmt(dec("1234.5"), ",.1f"), "1,234.5");
    assert_eq!(fmt(dec("0.125"), ".1%"), "12.5%");
}

#[test]
fn test_string_alignment() {
    assert_eq!(fmt(Value::str("ab"), ">4"), "  ab");
    assert_eq!(fmt(Value::str("ab"), "^6"), "  ab  ");
    assert_eq!(fmt(Value::str("abcdef"), ".3"), "abc");
    assert_eq!(fmt(Value::str("ab"), "05"), "ab000");
}

#[test]
fn test_rejections() {
    let err = format_value(&Value::str("a"), "d").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown format code 'd' for object of type 'str'"
    );
    let err = format_value(&Value::Float(1.0), "x").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Unknown format code 'x' for object of type 'float'"
    );
    let err = format_value(&Value::Int(1), ".2").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Precision not allowed in integer format specifier"
    );
    let err = format_value(&Value::None, ">5").unwrap_err();
    assert_eq!(err.class_name(), "TypeError");
    let err = format_value(&Value::str("a"), "+").unwrap_err();
    assert_eq!(err.to_string(), "Sign not allowed in string format specifier");
}
