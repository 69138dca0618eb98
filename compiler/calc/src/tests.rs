#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

fn rendered(source: &str, exact_mode: bool) -> RenderedOutcome {
    RenderedOutcome::from(&evaluate(source, exact_mode).unwrap())
}

#[test]
fn test_evaluate_returns_result_and_bindings() {
    let outcome = rendered("x = 6\ny = 7\nx * y", false);
    assert_eq!(outcome.result.as_deref(), Some("42"));
    let names: Vec<&str> = outcome.bindings.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["x", "y"]);
}

#[test]
fn test_evaluate_exact_mode() {
    assert_eq!(rendered("0.1 + 0.2", true).result.as_deref(), Some("Decimal('0.3')"));
    assert_eq!(rendered("0.1 + 0.2", false).result.as_deref(), Some("0.30000000000000004"));
}

#[test]
fn test_sessions_are_independent() {
    evaluate("x = 1", false).unwrap();
    let err = evaluate("x", false).unwrap_err();
    assert_eq!(err.class_name(), "NameError");
    assert_eq!(err.to_string(), "NameError: name 'x' is not defined");
}

#[test]
fn test_parse_errors_carry_position() {
    let err = evaluate("x = (1 +\n", false).unwrap_err();
    assert_eq!(err.class_name(), "SyntaxError");
    assert!(err.message().contains("line "), "{}", err.message());
    assert!(err.to_string().starts_with("SyntaxError: "));
}

#[test]
fn test_unsupported_syntax_is_a_syntax_error() {
    let err = evaluate("import os", false).unwrap_err();
    assert_eq!(err.class_name(), "SyntaxError");
    assert_eq!(err.message(), "Import is not supported");
}

#[test]
fn test_init_tracing_is_idempotent() {
    init_tracing();
    init_tracing();
}
