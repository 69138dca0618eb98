#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::builtins::call_value;
use crate::numeric::decimal_from_str;
use crate::value::{RangeValue, TypeTag};

fn attr(value: &Value, name: &str) -> Value {
    get_attribute(value, name).unwrap()
}

fn denied(value: &Value, name: &str) -> String {
    get_attribute(value, name).unwrap_err().to_string()
}

fn invoke(callee: &Value, args: Vec<Value>) -> String {
    call_value(callee, CallArgs::new(args)).unwrap().repr()
}

#[test]
fn test_math_members() {
    let math = Value::Module(ModuleId::Math);
    assert!(matches!(attr(&math, "pi"), Value::Float(f) if f == std::f64::consts::PI));
    let sqrt = attr(&math, "sqrt");
    assert_eq!(invoke(&sqrt, vec![Value::Int(9)]), "3.0");
    assert_eq!(
        denied(&math, "__loader__"),
        "access to attribute '__loader__' is not allowed"
    );
}

#[test]
fn test_properties_read_as_values() {
    assert_eq!(attr(&Value::Int(5), "real").repr(), "5");
    assert_eq!(attr(&Value::Bool(true), "numerator").repr(), "1");
    assert_eq!(attr(&Value::Int(5), "denominator").repr(), "1");
    assert_eq!(attr(&Value::Float(2.5), "imag").repr(), "0.0");
    let d = Value::decimal(decimal_from_str("1.5").unwrap());
    assert_eq!(attr(&d, "imag").repr(), "Decimal('0')");
    let r = Value::Range(RangeValue {
        start: 1,
        stop: 9,
        step: 2,
    });
    assert_eq!(attr(&r, "start").repr(), "1");
    assert_eq!(attr(&r, "step").repr(), "2");
}

#[test]
fn test_bound_methods_keep_their_receiver() {
    let upper = attr(&Value::str("abc"), "upper");
    assert_eq!(upper.type_name(), "builtin_function_or_method");
    assert_eq!(invoke(&upper, vec![]), "'ABC'");

    let list = Value::list(vec![]);
    let append = attr(&list, "append");
    invoke(&append, vec![Value::Int(1)]);
    invoke(&append, vec![Value::Int(2)]);
    assert_eq!(list.repr(), "[1, 2]");
}

#[test]
fn test_type_members_are_unbound() {
    let join = attr(&Value::Type(TypeTag::Str), "join");
    assert!(matches!(join, Value::UnboundMethod(TypeTag::Str, "join")));
    let parts = Value::list(vec![Value::str("a"), Value::str("b")]);
    assert_eq!(invoke(&join, vec![Value::str("-"), parts]), "'a-b'");

    let fromhex = attr(&Value::Type(TypeTag::Float), "fromhex");
    assert_eq!(invoke(&fromhex, vec![Value::str("0x1.8p1")]), "3.0");

    let sqrt = attr(&Value::Type(TypeTag::Decimal), "sqrt");
    let sixteen = Value::decimal(decimal_from_str("16").unwrap());
    assert_eq!(invoke(&sqrt, vec![sixteen]), "Decimal('4')");
}

#[test]
fn test_denied_members() {
    assert_eq!(
        denied(&Value::str("a"), "__class__"),
        "access to attribute '__class__' is not allowed"
    );
    assert_eq!(
        denied(&Value::Type(TypeTag::List), "append"),
        "access to attribute 'append' of 'type' object is not allowed"
    );
    assert_eq!(
        denied(&Value::None, "real"),
        "access to attribute 'real' of 'NoneType' object is not allowed"
    );
    let method = attr(&Value::str("a"), "upper");
    assert!(get_attribute(&method, "__self__").is_err());
}

#[test]
fn test_text_surface_is_limited() {
    for name in ["swapcase", "casefold", "partition", "splitlines", "istitle"] {
        let err = get_attribute(&Value::str("a"), name).unwrap_err();
        assert_eq!(err.class_name(), "AttributeError", "{name}");
        assert!(err.to_string().contains(name));
    }
    let err = get_attribute(&Value::bytes(b"ab".to_vec()), "count").unwrap_err();
    assert_eq!(err.class_name(), "AttributeError");
    assert_eq!(attr(&Value::str("a"), "upper").type_name(), "builtin_function_or_method");
}

#[test]
fn test_unknown_receiver_rejects_calls() {
    let err = call_method(&Value::None, "upper", CallArgs::default()).unwrap_err();
    assert_eq!(err.class_name(), "AttributeError");
}
