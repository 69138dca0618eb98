#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::errors::{EvalError, EvalErrorKind};
use calc_ir::UnsupportedKind;

fn run_in(interp: &mut Interpreter, source: &str) -> EvalResult<Outcome> {
    let module = calc_parse::parse(source).unwrap();
    interp.run(&module)
}

fn run(source: &str) -> Outcome {
    run_in(&mut Interpreter::new(false), source).unwrap()
}

fn run_exact(source: &str) -> Outcome {
    run_in(&mut Interpreter::new(true), source).unwrap()
}

fn run_err(source: &str) -> EvalError {
    run_in(&mut Interpreter::new(false), source).unwrap_err()
}

/// Repr of the script's result value.
fn result(source: &str) -> String {
    run(source).result.map(|v| v.repr()).unwrap_or_default()
}

fn binding(outcome: &Outcome, name: &str) -> String {
    outcome.bindings[name].repr()
}

// Literals and numeric modes

#[test]
fn test_native_literals() {
    assert_eq!(result("1"), "1");
    assert_eq!(result("0x1f"), "31");
    assert_eq!(result("1_000"), "1000");
    assert_eq!(result("2.5"), "2.5");
    assert_eq!(result("'a'"), "'a'");
    assert_eq!(result("b'a'"), "b'a'");
    assert_eq!(result("None"), "None");
    assert_eq!(result("..."), "Ellipsis");
}

#[test]
fn test_exact_mode_literals_become_decimals() {
    let repr = |source: &str| run_exact(source).result.unwrap().repr();
    assert_eq!(repr("1"), "Decimal('1')");
    assert_eq!(repr("0.1"), "Decimal('0.1')");
    assert_eq!(repr("0x10"), "Decimal('16')");
    assert_eq!(repr("'text'"), "'text'");
    assert_eq!(repr("True"), "True");
}

#[test]
fn test_exact_mode_arithmetic() {
    assert_eq!(run_exact("1 + 2").result.unwrap().repr(), "Decimal('3')");
    assert_eq!(run_exact("0.1 + 0.2").result.unwrap().repr(), "Decimal('0.3')");
    let err = run_in(&mut Interpreter::new(true), "3 & 2").unwrap_err();
    assert_eq!(
        err.to_string(),
        "unsupported operand type(s) for &: 'decimal.Decimal' and 'decimal.Decimal'"
    );
}

#[test]
fn test_exact_mode_integer_division_of_wide_operands() {
    let repr = |source: &str| run_exact(source).result.unwrap().repr();
    assert_eq!(repr("1e40 // 3e39"), "Decimal('3')");
    assert_eq!(repr("1e40 % 3e39"), "Decimal('1E+39')");
    assert_eq!(
        repr("divmod(-1234567890123456789012345678, 1000)"),
        "(Decimal('-1234567890123456789012345'), Decimal('-678'))"
    );
    for source in ["1e150 % 7", "1e150 // 7", "divmod(1e150, 7)"] {
        let err = run_in(&mut Interpreter::new(true), source).unwrap_err();
        assert_eq!(err.class_name(), "ValueError", "{source}");
    }
}

#[test]
fn test_complex_literal_rejected_in_both_modes() {
    assert_eq!(run_err("2j").to_string(), "complex literals are not supported");
    let err = run_in(&mut Interpreter::new(true), "1 + 2j").unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::UnsupportedLiteralType { type_name: "complex" }
    ));
}

#[test]
fn test_integer_literal_overflow() {
    let err = run_err("99999999999999999999");
    assert_eq!(err.to_string(), "integer overflow in integer literal");
}

// Disallowed syntax

#[test]
fn test_unsupported_statement_leaves_scope_untouched() {
    let mut interp = Interpreter::new(false);
    let err = run_in(&mut interp, "x = 1\nimport os").unwrap_err();
    assert!(matches!(
        err.kind,
        EvalErrorKind::UnsupportedSyntax {
            kind: UnsupportedKind::Import
        }
    ));
    assert!(!interp.scope().contains("x"));
}

#[test]
fn test_every_unsupported_kind_leaves_scope_untouched() {
    let constructs = [
        "def f(x):\n    return x",
        "class A:\n    pass",
        "import os",
        "from os import path",
        "return 1",
        "raise ValueError",
        "assert x",
        "global x",
        "nonlocal x",
        "with open(p) as f:\n    pass",
        "try:\n    x\nexcept E:\n    y\nfinally:\n    z",
        "try:\n    x\nexcept* E:\n    y",
        "@dec\ndef f():\n    pass",
        "async def f():\n    pass",
        "async for x in y:\n    pass",
        "match x:\n    case 1:\n        pass",
        "type Point = tuple",
        "y: int = 1",
        "f = lambda: 1",
        "(y := 2)",
        "sum(v for v in [1])",
        "await x",
        "yield x",
        "yield from x",
    ];
    for construct in constructs {
        let mut interp = Interpreter::new(false);
        let err = run_in(&mut interp, &format!("x = 1\n{construct}")).unwrap_err();
        assert!(
            matches!(
                err.kind,
                EvalErrorKind::UnsupportedSyntax { .. }
                    | EvalErrorKind::UnsupportedAsyncSyntax { .. }
            ),
            "{construct}: {err:?}"
        );
        assert!(!interp.scope().contains("x"), "{construct}");
    }
}

#[test]
fn test_unsupported_expression_kinds() {
    for (source, expected) in [
        ("f = lambda: 1", UnsupportedKind::Lambda),
        ("(y := 2)", UnsupportedKind::NamedExpr),
        ("sum(x for x in [1])", UnsupportedKind::GeneratorExp),
    ] {
        let err = run_err(source);
        assert!(
            matches!(err.kind, EvalErrorKind::UnsupportedSyntax { kind } if kind == expected),
            "{source}: {err:?}"
        );
        assert!(err.span.is_some());
    }
}

#[test]
fn test_async_kinds_use_async_template() {
    let err = run_err("async def f():\n    pass");
    assert!(matches!(err.kind, EvalErrorKind::UnsupportedAsyncSyntax { .. }));
    let err = run_err("[x async for x in y]");
    assert!(matches!(
        err.kind,
        EvalErrorKind::UnsupportedAsyncSyntax {
            kind: UnsupportedKind::AsyncComprehension
        }
    ));
}

// Bindings and results

#[test]
fn test_result_and_bindings() {
    let outcome = run("x = 1\nx");
    assert!(matches!(outcome.result, Some(Value::Int(1))));
    assert_eq!(outcome.bindings.len(), 1);
    assert_eq!(binding(&outcome, "x"), "1");
}

#[test]
fn test_no_result_after_statement() {
    let outcome = run("x = 1");
    assert!(outcome.result.is_none());
}

#[test]
fn test_chained_assignment() {
    let outcome = run("a = b = [1]\na.append(2)");
    assert_eq!(binding(&outcome, "b"), "[1, 2]");
}

#[test]
fn test_session_bindings_persist() {
    let mut interp = Interpreter::new(false);
    run_in(&mut interp, "x = 41").unwrap();
    let outcome = run_in(&mut interp, "x + 1").unwrap();
    assert!(matches!(outcome.result, Some(Value::Int(42))));
}

#[test]
fn test_builtin_names_are_not_bindings() {
    let outcome = run("y = len([1, 2])");
    assert_eq!(outcome.bindings.keys().collect::<Vec<_>>(), vec!["y"]);
}

#[test]
fn test_undefined_name() {
    assert_eq!(run_err("undefined").to_string(), "name 'undefined' is not defined");
}

// Loops and the interrupt slot

#[test]
fn test_top_level_break_sets_slot() {
    let mut interp = Interpreter::new(false);
    run_in(&mut interp, "break").unwrap();
    assert_eq!(interp.pending_interrupt(), Some(LoopInterrupt::Break));
    run_in(&mut interp, "continue").unwrap();
    assert_eq!(interp.pending_interrupt(), Some(LoopInterrupt::Continue));
}

#[test]
fn test_loop_clears_slot() {
    let mut interp = Interpreter::new(false);
    run_in(&mut interp, "break").unwrap();
    run_in(&mut interp, "for i in range(3):\n    pass").unwrap();
    assert_eq!(interp.pending_interrupt(), None);
    assert_eq!(interp.scope().get("i").unwrap().repr(), "2");
}

#[test]
fn test_for_else_runs_without_break() {
    let outcome = run("n = 0\nfor i in range(3):\n    n += i\nelse:\n    n += 100");
    assert_eq!(binding(&outcome, "n"), "103");
}

#[test]
fn test_for_else_skipped_on_break() {
    let source =
        "n = 0\nfor i in range(10):\n    if i == 2:\n        break\n    n += 1\nelse:\n    n = -1";
    let outcome = run(source);
    assert_eq!(binding(&outcome, "n"), "2");
    assert_eq!(binding(&outcome, "i"), "2");
}

#[test]
fn test_while_else() {
    let outcome = run("i = 0\nwhile i < 3:\n    i += 1\nelse:\n    done = True");
    assert_eq!(binding(&outcome, "i"), "3");
    assert_eq!(binding(&outcome, "done"), "True");

    let outcome =
        run("i = 0\nwhile True:\n    i += 1\n    if i > 4:\n        break\nelse:\n    i = 0");
    assert_eq!(binding(&outcome, "i"), "5");
}

#[test]
fn test_continue_skips_rest_of_body() {
    let source =
        "odd = []\nfor i in range(6):\n    if i % 2 == 0:\n        continue\n    odd.append(i)";
    assert_eq!(binding(&run(source), "odd"), "[1, 3, 5]");
}

#[test]
fn test_break_only_leaves_inner_loop() {
    let source = "\
pairs = []
for a in range(3):
    for b in range(3):
        if b > a:
            break
        pairs.append((a, b))
";
    assert_eq!(
        binding(&run(source), "pairs"),
        "[(0, 0), (1, 0), (1, 1), (2, 0), (2, 1), (2, 2)]"
    );
}

#[test]
fn test_loop_sees_appends() {
    let source = "xs = [1]\nfor x in xs:\n    if x < 4:\n        xs.append(x + 1)";
    assert_eq!(binding(&run(source), "xs"), "[1, 2, 3, 4]");
}

#[test]
fn test_for_target_destructures() {
    let source = "total = 0\nfor k, v in {'a': 1, 'b': 2}.items():\n    total += v";
    assert_eq!(binding(&run(source), "total"), "3");
}

// Comprehensions

#[test]
fn test_dict_comprehension_keeps_outer_binding() {
    let outcome = run("k = 'keep'\nd = {k + 1: 1 for k in [1, 2, 3]}");
    assert_eq!(binding(&outcome, "d"), "{2: 1, 3: 1, 4: 1}");
    assert_eq!(binding(&outcome, "k"), "'keep'");
}

#[test]
fn test_comprehension_target_does_not_leak() {
    let mut interp = Interpreter::new(false);
    let err = run_in(&mut interp, "[x for x in None]").unwrap_err();
    assert_eq!(err.to_string(), "'NoneType' object is not iterable");
    assert!(!interp.scope().contains("x"));
    assert_eq!(interp.scope().depth(), 1);

    let outcome = run("ys = [x * 2 for x in range(3)]");
    assert!(!outcome.bindings.contains_key("x"));
}

#[test]
fn test_comprehension_clauses_and_guards() {
    assert_eq!(
        result("[(a, b) for a in range(3) if a for b in 'xy' if b != 'y']"),
        "[(1, 'x'), (2, 'x')]"
    );
    assert_eq!(result("{n % 3 for n in range(10)}"), "{0, 1, 2}");
    assert_eq!(
        result("[[y for y in range(x)] for x in range(3)]"),
        "[[], [0], [0, 1]]"
    );
}

#[test]
fn test_comprehension_error_pops_frame() {
    let mut interp = Interpreter::new(false);
    let err = run_in(&mut interp, "[1 / x for x in [1, 0]]").unwrap_err();
    assert_eq!(err.class_name(), "ZeroDivisionError");
    assert_eq!(interp.scope().depth(), 1);
}

// Assignment targets

#[test]
fn test_unpack_arity() {
    assert_eq!(
        run_err("a, b = 1, 2, 3").to_string(),
        "too many values to unpack (expected 2)"
    );
    assert_eq!(
        run_err("a, b, c = 1, 2").to_string(),
        "not enough values to unpack (expected 3, got 2)"
    );
    assert_eq!(run_err("a, b = 1").to_string(), "'int' object is not iterable");
}

#[test]
fn test_nested_unpack() {
    let outcome = run("[a, (b, c)] = 1, 'xy'");
    assert_eq!(binding(&outcome, "b"), "'x'");
    assert_eq!(binding(&outcome, "c"), "'y'");
}

#[test]
fn test_subscript_targets() {
    let outcome = run("xs = [1, 2, 3]\nxs[0:2] = [9]\nd = {}\nd['k'] = xs");
    assert_eq!(binding(&outcome, "xs"), "[9, 3]");
    assert_eq!(binding(&outcome, "d"), "{'k': [9, 3]}");
    assert_eq!(
        run_err("t = (1,)\nt[0] = 2").to_string(),
        "'tuple' object does not support item assignment"
    );
}

#[test]
fn test_rejected_assignment_targets() {
    assert_eq!(run_err("x = 1\nx.real = 2").to_string(), "cannot assign to attribute");
    assert_eq!(run_err("*a, b = [1, 2]").to_string(), "cannot assign to starred");
    let err = run_err("a.b = 1");
    assert!(matches!(err.kind, EvalErrorKind::BadTarget { .. }));
}

#[test]
fn test_augmented_assignment() {
    let outcome = run("x = 1\nx += 2\nxs = [1, 2]\nxs[1] *= 10\nd = {'n': 1}\nd['n'] -= 1");
    assert_eq!(binding(&outcome, "x"), "3");
    assert_eq!(binding(&outcome, "xs"), "[1, 20]");
    assert_eq!(binding(&outcome, "d"), "{'n': 0}");
}

#[test]
fn test_augmented_assignment_is_not_in_place() {
    let outcome = run("a = [1]\nb = a\nb += [2]");
    assert_eq!(binding(&outcome, "a"), "[1]");
    assert_eq!(binding(&outcome, "b"), "[1, 2]");
}

#[test]
fn test_augmented_assignment_rejections() {
    assert_eq!(
        run_err("xs = [1, 2]\nxs[0:1] += [3]").to_string(),
        "'slice' is an illegal expression for augmented assignment"
    );
    assert_eq!(
        run_err("x = 1\nx.real += 1").to_string(),
        "'attribute' is an illegal expression for augmented assignment"
    );
    assert_eq!(
        run_err("s = 'a'\ns -= 1").to_string(),
        "unsupported operand type(s) for -=: 'str' and 'int'"
    );
    assert_eq!(run_err("missing += 1").to_string(), "name 'missing' is not defined");
}

#[test]
fn test_delete_targets() {
    let outcome = run("x = 1\ny = 2\nxs = [1, 2, 3]\nd = {'a': 1}\ndel x, xs[0], d['a']");
    assert!(!outcome.bindings.contains_key("x"));
    assert_eq!(binding(&outcome, "xs"), "[2, 3]");
    assert_eq!(binding(&outcome, "d"), "{}");

    assert_eq!(run_err("xs = [1]\ndel xs[:]").to_string(), "cannot delete slice");
    assert_eq!(run_err("x = 1\ndel x.real").to_string(), "cannot delete attribute");
    assert_eq!(run_err("del nothing").to_string(), "name 'nothing' is not defined");
}

// Expressions

#[test]
fn test_chained_comparison_evaluates_every_comparator() {
    let outcome = run("calls = []\nr = 3 < 1 == calls.append(1)\ns = 1 < 2 < 3");
    assert_eq!(binding(&outcome, "calls"), "[1]");
    assert_eq!(binding(&outcome, "r"), "False");
    assert_eq!(binding(&outcome, "s"), "True");
}

#[test]
fn test_membership_and_identity() {
    assert_eq!(result("2 in [1, 2] and 'b' not in 'abc'"), "False");
    assert_eq!(result("x = []\ny = x\ny is x and [] is not x"), "True");
}

#[test]
fn test_bool_ops_return_operand() {
    assert_eq!(result("0 or 'x'"), "'x'");
    assert_eq!(result("1 and []"), "[]");
    assert_eq!(result("None or 0 or ()"), "()");
}

#[test]
fn test_bool_ops_short_circuit() {
    let outcome = run("calls = []\nr = 0 and calls.append(1)");
    assert_eq!(binding(&outcome, "calls"), "[]");
}

#[test]
fn test_conditional_expression() {
    assert_eq!(result("'yes' if [] else 'no'"), "'no'");
}

#[test]
fn test_displays_with_unpacking() {
    assert_eq!(result("[*range(3), 3]"), "[0, 1, 2, 3]");
    assert_eq!(result("(*'ab',)"), "('a', 'b')");
    assert_eq!(result("{**{'a': 1}, 'b': 2, 'a': 3}"), "{'a': 3, 'b': 2}");
    assert_eq!(result("{1, 1.0, True}"), "{1}");
    assert_eq!(run_err("{**1}").to_string(), "'int' object is not a mapping");
}

#[test]
fn test_subscripts_and_slices() {
    assert_eq!(result("'hello'[1:4]"), "'ell'");
    assert_eq!(result("[1, 2, 3][::-1]"), "[3, 2, 1]");
    assert_eq!(result("{'a': [10, 20]}['a'][-1]"), "20");
    assert_eq!(result("range(10)[2:8:2]"), "range(2, 8, 2)");
}

#[test]
fn test_attribute_whitelist() {
    assert_eq!(result("'abc'.upper()"), "'ABC'");
    assert_eq!(result("math.sqrt(16)"), "4.0");
    assert_eq!(result("(255).bit_length()"), "8");
    assert_eq!(result("str.join('-', ['a', 'b'])"), "'a-b'");
    assert_eq!(
        run_err("(1).__class__").to_string(),
        "access to attribute '__class__' is not allowed"
    );
    assert_eq!(
        run_err("None.__class__").to_string(),
        "access to attribute '__class__' of 'NoneType' object is not allowed"
    );
    assert_eq!(
        run_err("math.os").to_string(),
        "access to attribute 'os' is not allowed"
    );
}

#[test]
fn test_f_strings() {
    let source = r#"x = 3.14159
f"{x:.2f}|{'ab'!r}|{x!s}|{42:>5}|{'é'!a}""#;
    assert_eq!(
        run(source).result.unwrap().to_str(),
        r"3.14|'ab'|3.14159|   42|'\xe9'"
    );
    assert_eq!(result("w = 6\nf'{1:>{w}}'"), "'     1'");
}

// Calls

#[test]
fn test_call_argument_expansion() {
    assert_eq!(result("len(*[[1, 2]])"), "2");
    assert_eq!(result("sorted([3, 1, 2], **{'reverse': True})"), "[3, 2, 1]");
    assert_eq!(result("max([1, -5, 3], key=abs)"), "-5");
}

#[test]
fn test_call_errors() {
    assert_eq!(run_err("len(**{1: 2})").to_string(), "keywords must be strings");
    assert!(matches!(
        run_err("len(**{1: 2})").kind,
        EvalErrorKind::KeywordArgumentMustBeIdentifier
    ));
    assert_eq!(
        run_err("len(**[1])").to_string(),
        "argument after ** must be a mapping, not list"
    );
    assert_eq!(
        run_err("sorted([1], reverse=True, **{'reverse': False})").to_string(),
        "got multiple values for keyword argument 'reverse'"
    );
    assert_eq!(run_err("1()").to_string(), "'int' object is not callable");
    assert_eq!(
        run_err("len(1, 2)").to_string(),
        "len() takes exactly one argument (2 given)"
    );
}

// Errors

#[test]
fn test_errors_carry_innermost_span() {
    let source = "y = 1\nz = y + 'a'";
    let err = run_err(source);
    let span = err.span.unwrap();
    assert_eq!(&source[span.start as usize..span.end as usize], "y + 'a'");
}

#[test]
fn test_division_by_zero_class() {
    let err = run_err("1 // 0");
    assert_eq!(err.class_name(), "ZeroDivisionError");
    assert_eq!(err.to_string(), "integer division or modulo by zero");
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let depth = 199;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    assert_eq!(result(&source), "1");
    let source = format!("{}1", "-".repeat(4000));
    assert_eq!(result(&source), "1");
}

#[test]
fn test_bracket_nesting_limit_is_syntax_error() {
    let depth = 201;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let err = calc_parse::parse(&source).unwrap_err();
    assert_eq!(err.to_string(), "too many nested parentheses");
}
