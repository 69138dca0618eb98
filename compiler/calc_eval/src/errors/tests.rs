use pretty_assertions::assert_eq;

use super::*;

#[test]
fn test_rejected_syntax_messages() {
    assert_eq!(
        unsupported_syntax(UnsupportedKind::Import).to_string(),
        "Import is not supported"
    );
    assert_eq!(
        unsupported_syntax(UnsupportedKind::AsyncFunctionDef).to_string(),
        "async function definition is not supported"
    );
    assert_eq!(
        unsupported_syntax(UnsupportedKind::AsyncComprehension).to_string(),
        "async comprehension is not supported"
    );
    assert_eq!(
        unsupported_literal("complex").to_string(),
        "complex literals are not supported"
    );
}

#[test]
fn test_async_kinds_pick_async_variant() {
    for kind in [
        UnsupportedKind::AsyncFunctionDef,
        UnsupportedKind::AsyncWith,
        UnsupportedKind::AsyncFor,
        UnsupportedKind::AsyncComprehension,
    ] {
        assert!(matches!(
            unsupported_syntax(kind).kind,
            EvalErrorKind::UnsupportedAsyncSyntax { .. }
        ));
    }
    assert!(matches!(
        unsupported_syntax(UnsupportedKind::Await).kind,
        EvalErrorKind::UnsupportedSyntax { .. }
    ));
}

#[test]
fn test_target_messages_follow_context() {
    assert_eq!(
        bad_target("attribute", TargetContext::Assign).to_string(),
        "cannot assign to attribute"
    );
    assert_eq!(
        bad_target("literal", TargetContext::Delete).to_string(),
        "cannot delete literal"
    );
    assert_eq!(
        bad_target("slice", TargetContext::AugAssign).to_string(),
        "'slice' is an illegal expression for augmented assignment"
    );
}

#[test]
fn test_unpack_messages() {
    assert_eq!(
        not_enough_values(3, 2).to_string(),
        "not enough values to unpack (expected 3, got 2)"
    );
    assert_eq!(
        too_many_values(2).to_string(),
        "too many values to unpack (expected 2)"
    );
}

#[test]
fn test_access_messages() {
    assert_eq!(
        bad_access("__dict__").to_string(),
        "access to attribute '__dict__' is not allowed"
    );
    assert_eq!(
        bad_access_on("x", "NoneType").to_string(),
        "access to attribute 'x' of 'NoneType' object is not allowed"
    );
}

#[test]
fn test_class_names() {
    assert_eq!(name_not_found("x").class_name(), "NameError");
    assert_eq!(bad_access("x").class_name(), "AttributeError");
    assert_eq!(not_callable("int").class_name(), "TypeError");
    assert_eq!(too_many_values(1).class_name(), "ValueError");
    assert_eq!(division_by_zero("division by zero").class_name(), "ZeroDivisionError");
    assert_eq!(integer_overflow("multiplication").class_name(), "OverflowError");
    assert_eq!(key_error("'k'".to_string()).class_name(), "KeyError");
    assert_eq!(stop_iteration().class_name(), "StopIteration");
    assert_eq!(
        unsupported_syntax(UnsupportedKind::Lambda).class_name(),
        "SyntaxError"
    );
}

#[test]
fn test_arithmetic_messages() {
    assert_eq!(
        unsupported_operand("+", "int", "str").to_string(),
        "unsupported operand type(s) for +: 'int' and 'str'"
    );
    assert_eq!(
        unorderable("<", "int", "str").to_string(),
        "'<' not supported between instances of 'int' and 'str'"
    );
    assert_eq!(
        bad_unary_operand("-", "str").to_string(),
        "bad operand type for unary -: 'str'"
    );
    assert_eq!(
        integer_overflow("multiplication").to_string(),
        "integer overflow in multiplication"
    );
}

#[test]
fn test_with_span_keeps_innermost() {
    let inner = Span::new(4, 7);
    let outer = Span::new(0, 10);
    let err = name_not_found("x").with_span(inner).with_span(outer);
    assert_eq!(err.span, Some(inner));
}

#[test]
fn test_call_messages() {
    assert_eq!(
        wrong_arg_count("len", "exactly one argument", 2).to_string(),
        "len() takes exactly one argument (2 given)"
    );
    assert_eq!(
        unexpected_keyword("abs", "key").to_string(),
        "abs() got an unexpected keyword argument 'key'"
    );
    assert_eq!(keyword_must_be_identifier().to_string(), "keywords must be strings");
}
