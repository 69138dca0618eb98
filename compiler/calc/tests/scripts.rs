// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end behavior of `calc::evaluate` on whole scripts.

use calc::{evaluate, RenderedOutcome};
use pretty_assertions::assert_eq;

fn run(source: &str) -> RenderedOutcome {
    RenderedOutcome::from(&evaluate(source, false).unwrap())
}

fn result(source: &str) -> String {
    run(source).result.expect("script should end in an expression")
}

fn error(source: &str) -> String {
    evaluate(source, false).unwrap_err().to_string()
}

#[test]
fn literal_values() {
    assert_eq!(result("42"), "42");
    assert_eq!(result("'hi'"), "'hi'");
    assert_eq!(result("[1, (2,), {3: 4}]"), "[1, (2,), {3: 4}]");
    assert_eq!(result("None"), "None");
    assert_eq!(
        RenderedOutcome::from(&evaluate("1.5", true).unwrap()).result.as_deref(),
        Some("Decimal('1.5')")
    );
}

#[test]
fn dict_comprehension_leaves_outer_name() {
    let outcome = run("k = 'outer'\nd = {k + 1: 1 for k in [1, 2, 3]}");
    assert_eq!(outcome.bindings["d"], "{2: 1, 3: 1, 4: 1}");
    assert_eq!(outcome.bindings["k"], "'outer'");
}

#[test]
fn comprehension_over_none_binds_nothing() {
    assert_eq!(error("[x for x in None]"), "TypeError: 'NoneType' object is not iterable");
}

#[test]
fn unpacking_arity() {
    assert_eq!(
        error("a, b = 1, 2, 3"),
        "ValueError: too many values to unpack (expected 2)"
    );
    assert_eq!(
        error("a, b, c = 1, 2"),
        "ValueError: not enough values to unpack (expected 3, got 2)"
    );
}

#[test]
fn loops_with_else() {
    let source = "\
found = None
for n in range(2, 10):
    if n * n > 20:
        found = n
        break
else:
    found = -1
found";
    assert_eq!(result(source), "5");
    let source = "hits = 0\nwhile hits < 3:\n    hits += 1\nelse:\n    hits *= 10\nhits";
    assert_eq!(result(source), "30");
}

#[test]
fn generators_and_lambdas_are_rejected() {
    assert_eq!(
        error("sum(x for x in range(4))"),
        "SyntaxError: GeneratorExp is not supported"
    );
    assert_eq!(error("f = lambda: 1"), "SyntaxError: Lambda is not supported");
}

#[test]
fn top_level_break_is_harmless() {
    let outcome = run("break");
    assert_eq!(outcome.result, None);
    assert!(outcome.bindings.is_empty());
}

#[test]
fn calculator_style_scripts() {
    assert_eq!(result("math.sqrt(2) ** 2 == 2"), "False");
    assert_eq!(result("round(math.pi, 3)"), "3.142");
    assert_eq!(result("sum([x ** 2 for x in range(4)])"), "14");
    assert_eq!(result("f'{2 ** 0.5:.3f}'"), "'1.414'");
    assert_eq!(result("sorted({'b': 1, 'a': 2}.items())"), "[('a', 2), ('b', 1)]");
}

#[test]
fn denied_attributes_name_the_attribute() {
    assert_eq!(
        error("(1).__class__"),
        "AttributeError: access to attribute '__class__' is not allowed"
    );
    assert_eq!(
        error("math.__dict__"),
        "AttributeError: access to attribute '__dict__' is not allowed"
    );
}
