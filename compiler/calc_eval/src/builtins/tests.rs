#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::numeric::decimal_from_str;

fn call(name: &str, args: Vec<Value>) -> EvalResult {
    call_value(&lookup_global(name).unwrap(), CallArgs::new(args))
}

fn call_kw(name: &str, args: Vec<Value>, keywords: Vec<(&str, Value)>) -> EvalResult {
    let args = CallArgs {
        positional: args,
        keywords: keywords
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect(),
    };
    call_value(&lookup_global(name).unwrap(), args)
}

fn repr(result: EvalResult) -> String {
    result.unwrap().repr()
}

fn message(result: EvalResult) -> String {
    result.unwrap_err().to_string()
}

fn drain(value: &Value) -> Vec<String> {
    iterate(value).unwrap().map(|v| v.repr()).collect()
}

fn ints(values: &[i64]) -> Value {
    Value::list(values.iter().map(|n| Value::Int(*n)).collect())
}

fn strs(values: &[&str]) -> Value {
    Value::list(values.iter().map(|s| Value::str(*s)).collect())
}

#[test]
fn test_global_table() {
    assert!(matches!(lookup_global("len"), Some(Value::Builtin(Builtin::Len))));
    assert!(matches!(lookup_global("Decimal"), Some(Value::Type(TypeTag::Decimal))));
    assert!(matches!(lookup_global("math"), Some(Value::Module(ModuleId::Math))));
    assert!(matches!(lookup_global("pi"), Some(Value::Float(_))));
    assert!(lookup_global("open").is_none());
    assert!(lookup_global("__import__").is_none());
    assert!(lookup_global("eval").is_none());
}

#[test]
fn test_len_counts_characters() {
    assert_eq!(repr(call("len", vec![Value::str("héllo")])), "5");
    assert_eq!(repr(call("len", vec![ints(&[1, 2])])), "2");
    assert_eq!(
        message(call("len", vec![Value::Int(3)])),
        "object of type 'int' has no len()"
    );
    assert_eq!(
        message(call("len", vec![])),
        "len() takes exactly one argument (0 given)"
    );
}

#[test]
fn test_sorted_is_stable() {
    assert_eq!(repr(call("sorted", vec![ints(&[3, 1, 2])])), "[1, 2, 3]");
    let words = strs(&["bb", "a", "cc"]);
    let by_len = lookup_global("len").unwrap();
    assert_eq!(
        repr(call_kw("sorted", vec![words.clone()], vec![("key", by_len.clone())])),
        "['a', 'bb', 'cc']"
    );
    assert_eq!(
        repr(call_kw(
            "sorted",
            vec![words],
            vec![("key", by_len), ("reverse", Value::Bool(true))]
        )),
        "['bb', 'cc', 'a']"
    );
    let mixed = Value::list(vec![Value::Int(1), Value::str("a")]);
    let err = call("sorted", vec![mixed]).unwrap_err();
    assert_eq!(err.class_name(), "TypeError");
}

#[test]
fn test_min_max() {
    assert_eq!(
        repr(call("max", vec![Value::Int(1), Value::Int(5), Value::Int(3)])),
        "5"
    );
    assert_eq!(repr(call("min", vec![ints(&[4, 2, 8])])), "2");
    assert_eq!(
        repr(call_kw(
            "max",
            vec![strs(&["a", "ccc", "bb"])],
            vec![("key", lookup_global("len").unwrap())]
        )),
        "'ccc'"
    );
    assert_eq!(
        message(call("min", vec![ints(&[])])),
        "min() arg is an empty sequence"
    );
    assert_eq!(
        repr(call_kw("min", vec![ints(&[])], vec![("default", Value::Int(0))])),
        "0"
    );
    // The first of equal candidates wins.
    let pairs = Value::list(vec![
        Value::tuple(vec![Value::Int(1), Value::str("x")]),
        Value::tuple(vec![Value::Int(1), Value::str("y")]),
    ]);
    let by_len = lookup_global("len").unwrap();
    assert_eq!(
        repr(call_kw("max", vec![pairs], vec![("key", by_len)])),
        "(1, 'x')"
    );
}

#[test]
fn test_round_half_even() {
    assert_eq!(repr(call("round", vec![Value::Float(2.5)])), "2");
    assert_eq!(repr(call("round", vec![Value::Float(3.5)])), "4");
    assert_eq!(repr(call("round", vec![Value::Float(-0.5)])), "0");
    assert_eq!(
        repr(call("round", vec![Value::Float(2.675), Value::Int(2)])),
        "2.67"
    );
    assert_eq!(repr(call("round", vec![Value::Int(1250), Value::Int(-2)])), "1200");
    assert_eq!(repr(call("round", vec![Value::Int(1350), Value::Int(-2)])), "1400");
    assert_eq!(repr(call("round", vec![Value::Int(7), Value::Int(3)])), "7");
    let half = Value::decimal(decimal_from_str("2.5").unwrap());
    assert_eq!(repr(call("round", vec![half.clone()])), "2");
    assert_eq!(
        repr(call("round", vec![half, Value::Int(1)])),
        "Decimal('2.5')"
    );
    assert_eq!(
        message(call("round", vec![Value::str("1")])),
        "type str doesn't define __round__ method"
    );
}

#[test]
fn test_pow_three_argument_form() {
    let pow = |a, b, m| call("pow", vec![Value::Int(a), Value::Int(b), Value::Int(m)]);
    assert_eq!(repr(pow(2, 10, 1000)), "24");
    assert_eq!(repr(pow(3, -1, 7)), "5");
    assert_eq!(repr(pow(2, 3, -5)), "-2");
    assert_eq!(message(pow(2, 3, 0)), "pow() 3rd argument cannot be 0");
    assert_eq!(
        message(pow(2, -1, 4)),
        "base is not invertible for the given modulus"
    );
    assert_eq!(
        message(call(
            "pow",
            vec![Value::Float(2.0), Value::Int(3), Value::Int(5)]
        )),
        "pow() 3rd argument not allowed unless all arguments are integers"
    );
    assert_eq!(repr(call("pow", vec![Value::Int(2), Value::Int(-2)])), "0.25");
}

#[test]
fn test_sum() {
    assert_eq!(repr(call("sum", vec![ints(&[1, 2, 3])])), "6");
    assert_eq!(
        repr(call("sum", vec![ints(&[1, 2]), Value::Float(0.5)])),
        "3.5"
    );
    let nested = Value::list(vec![ints(&[1]), ints(&[2])]);
    assert_eq!(repr(call("sum", vec![nested, ints(&[])])), "[1, 2]");
    assert_eq!(
        message(call("sum", vec![strs(&["a"]), Value::str("")])),
        "sum() can't sum strings [use ''.join(seq) instead]"
    );
}

#[test]
fn test_isinstance() {
    let int = Value::Type(TypeTag::Int);
    assert_eq!(repr(call("isinstance", vec![Value::Bool(true), int.clone()])), "True");
    assert_eq!(repr(call("isinstance", vec![Value::Int(1), int.clone()])), "True");
    let choices = Value::tuple(vec![Value::Type(TypeTag::Str), Value::Type(TypeTag::Float)]);
    assert_eq!(repr(call("isinstance", vec![Value::Int(1), choices])), "False");
    assert_eq!(
        message(call("isinstance", vec![Value::Int(1), Value::Int(1)])),
        "isinstance() arg 2 must be a type, a tuple of types, or a union"
    );
}

#[test]
fn test_divmod_and_abs() {
    assert_eq!(repr(call("divmod", vec![Value::Int(-7), Value::Int(2)])), "(-4, 1)");
    assert_eq!(repr(call("abs", vec![Value::Int(-3)])), "3");
    assert_eq!(repr(call("abs", vec![Value::Bool(true)])), "1");
    assert_eq!(
        message(call("abs", vec![Value::Int(i64::MIN)])),
        "integer overflow in absolute value"
    );
    assert_eq!(
        message(call("abs", vec![Value::str("x")])),
        "bad operand type for abs(): 'str'"
    );
}

#[test]
fn test_lazy_builtins_yield_iterators() {
    let start = vec![("start", Value::Int(1))];
    let e = call_kw("enumerate", vec![strs(&["a", "b"])], start).unwrap();
    assert_eq!(e.type_name(), "enumerate");
    assert_eq!(drain(&e), vec!["(1, 'a')", "(2, 'b')"]);

    let z = call("zip", vec![ints(&[1, 2, 3]), strs(&["x", "y"])]).unwrap();
    assert_eq!(drain(&z), vec!["(1, 'x')", "(2, 'y')"]);
    assert!(drain(&call("zip", vec![]).unwrap()).is_empty());

    let pow = lookup_global("pow").unwrap();
    let m = call("map", vec![pow, ints(&[2, 3]), ints(&[2, 2])]).unwrap();
    assert_eq!(drain(&m), vec!["4", "9"]);

    let mixed = Value::list(vec![Value::Int(0), Value::Int(1), Value::str(""), Value::Int(2)]);
    let f = call("filter", vec![Value::None, mixed]).unwrap();
    assert_eq!(drain(&f), vec!["1", "2"]);

    let r = call("reversed", vec![call("range", vec![Value::Int(3)]).unwrap()]).unwrap();
    assert_eq!(drain(&r), vec!["2", "1", "0"]);
    assert_eq!(
        message(call("reversed", vec![Value::set(crate::value::SetTable::new())])),
        "'set' object is not reversible"
    );
}

#[test]
fn test_next_and_stop_iteration() {
    let it = call("iter", vec![ints(&[1])]).unwrap();
    assert_eq!(it.type_name(), "list_iterator");
    assert_eq!(repr(call("next", vec![it.clone()])), "1");
    assert_eq!(repr(call("next", vec![it.clone(), Value::str("done")])), "'done'");
    let err = call("next", vec![it]).unwrap_err();
    assert_eq!(err.class_name(), "StopIteration");
    assert_eq!(
        message(call("next", vec![ints(&[1])])),
        "'list' object is not an iterator"
    );
}

#[test]
fn test_character_functions() {
    assert_eq!(repr(call("bin", vec![Value::Int(-5)])), "'-0b101'");
    assert_eq!(repr(call("oct", vec![Value::Int(8)])), "'0o10'");
    assert_eq!(repr(call("hex", vec![Value::Int(255)])), "'0xff'");
    assert_eq!(repr(call("chr", vec![Value::Int(97)])), "'a'");
    assert_eq!(
        message(call("chr", vec![Value::Int(-1)])),
        "chr() arg not in range(0x110000)"
    );
    assert_eq!(repr(call("ord", vec![Value::str("é")])), "233");
    assert_eq!(
        message(call("ord", vec![Value::str("ab")])),
        "ord() expected a character, but string of length 2 found"
    );
    assert_eq!(
        repr(call("format", vec![Value::Float(3.14159), Value::str(".2f")])),
        "'3.14'"
    );
    assert_eq!(repr(call("repr", vec![Value::str("a")])), "\"'a'\"");
}

#[test]
fn test_calling_non_callables() {
    assert_eq!(
        message(call_value(&Value::Int(1), CallArgs::default())),
        "'int' object is not callable"
    );
    assert_eq!(
        message(call_kw("abs", vec![Value::Int(1)], vec![("key", Value::None)])),
        "abs() got an unexpected keyword argument 'key'"
    );
}

#[test]
fn test_unbound_methods() {
    let upper = Value::UnboundMethod(TypeTag::Str, "upper");
    assert_eq!(
        repr(call_value(&upper, CallArgs::new(vec![Value::str("abc")]))),
        "'ABC'"
    );
    assert_eq!(
        message(call_value(&upper, CallArgs::new(vec![Value::Int(1)]))),
        "descriptor 'upper' for 'str' objects doesn't apply to a 'int' object"
    );
    assert_eq!(
        message(call_value(&upper, CallArgs::default())),
        "unbound method str.upper() needs an argument"
    );
    let fromkeys = Value::UnboundMethod(TypeTag::Dict, "fromkeys");
    assert_eq!(
        repr(call_value(&fromkeys, CallArgs::new(vec![strs(&["a", "b"])]))),
        "{'a': None, 'b': None}"
    );
}
