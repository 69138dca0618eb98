//! Parser tests.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{parse, ParseError, ParseErrorKind};
use calc_ir::{
    BinaryOp, BoolOp, CmpOp, Conversion, Expr, ExprKind, Literal, Module, StmtKind, UnaryOp,
    UnsupportedKind,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn parse_ok(source: &str) -> Module {
    parse(source).unwrap_or_else(|e| panic!("{source:?}: {}", e.render(source)))
}

fn parse_err(source: &str) -> ParseError {
    match parse(source) {
        Ok(module) => panic!("{source:?} parsed: {module:?}"),
        Err(err) => err,
    }
}

/// The single expression statement of `source`.
fn expr(source: &str) -> Expr {
    let mut module = parse_ok(source);
    assert_eq!(module.body.len(), 1, "{source:?}");
    match module.body.remove(0).kind {
        StmtKind::Expr(expr) => expr,
        other => panic!("expected expression statement, got {other:?}"),
    }
}

fn int(expr: &Expr) -> &str {
    match &expr.kind {
        ExprKind::Literal(Literal::Int { digits, .. }) => digits,
        other => panic!("expected int literal, got {other:?}"),
    }
}

fn unsupported_stmt(source: &str) -> UnsupportedKind {
    let module = parse_ok(source);
    match &module.body[0].kind {
        StmtKind::Unsupported(kind) => *kind,
        other => panic!("expected unsupported statement, got {other:?}"),
    }
}

fn unsupported_expr(source: &str) -> UnsupportedKind {
    match expr(source).kind {
        ExprKind::Unsupported(kind) => kind,
        other => panic!("expected unsupported expression, got {other:?}"),
    }
}

// Expressions

#[test]
fn test_multiplication_binds_tighter_than_addition() {
    let e = expr("1 + 2 * 3");
    let ExprKind::BinOp {
        left,
        op: BinaryOp::Add,
        right,
    } = &e.kind
    else {
        panic!("expected addition, got {e:?}");
    };
    assert_eq!(int(left), "1");
    assert!(matches!(
        right.kind,
        ExprKind::BinOp {
            op: BinaryOp::Mul,
            ..
        }
    ));
}

#[test]
fn test_subtraction_is_left_associative() {
    let e = expr("10 - 4 - 3");
    let ExprKind::BinOp { left, right, .. } = &e.kind else {
        panic!("expected binop");
    };
    assert!(matches!(
        left.kind,
        ExprKind::BinOp {
            op: BinaryOp::Sub,
            ..
        }
    ));
    assert_eq!(int(right), "3");
}

#[test]
fn test_power_is_right_associative_and_binds_over_unary_minus() {
    let e = expr("-2 ** 3 ** 2");
    let ExprKind::UnaryOp {
        op: UnaryOp::Neg,
        operand,
    } = &e.kind
    else {
        panic!("expected negation, got {e:?}");
    };
    let ExprKind::BinOp {
        left,
        op: BinaryOp::Pow,
        right,
    } = &operand.kind
    else {
        panic!("expected power");
    };
    assert_eq!(int(left), "2");
    assert!(matches!(
        right.kind,
        ExprKind::BinOp {
            op: BinaryOp::Pow,
            ..
        }
    ));
}

#[test]
fn test_power_accepts_unary_exponent() {
    let e = expr("2 ** -1");
    let ExprKind::BinOp { right, .. } = &e.kind else {
        panic!("expected binop");
    };
    assert!(matches!(
        right.kind,
        ExprKind::UnaryOp {
            op: UnaryOp::Neg,
            ..
        }
    ));
}

#[test]
fn test_bitwise_precedence() {
    // `|` < `^` < `&` < shifts
    let e = expr("a | b ^ c & d << 1");
    let ExprKind::BinOp {
        op: BinaryOp::BitOr,
        right,
        ..
    } = &e.kind
    else {
        panic!("expected |");
    };
    let ExprKind::BinOp {
        op: BinaryOp::BitXor,
        right,
        ..
    } = &right.kind
    else {
        panic!("expected ^");
    };
    let ExprKind::BinOp {
        op: BinaryOp::BitAnd,
        right,
        ..
    } = &right.kind
    else {
        panic!("expected &");
    };
    assert!(matches!(
        right.kind,
        ExprKind::BinOp {
            op: BinaryOp::Shl,
            ..
        }
    ));
}

#[test]
fn test_comparison_chain() {
    let e = expr("a < b <= c not in d is not e");
    let ExprKind::Compare { ops, .. } = &e.kind else {
        panic!("expected compare");
    };
    let kinds: Vec<CmpOp> = ops.iter().map(|(op, _)| *op).collect();
    assert_eq!(
        kinds,
        vec![CmpOp::Lt, CmpOp::LtEq, CmpOp::NotIn, CmpOp::IsNot]
    );
}

#[test]
fn test_boolean_operators() {
    let e = expr("not a or b and c or d");
    let ExprKind::BoolOp {
        op: BoolOp::Or,
        values,
    } = &e.kind
    else {
        panic!("expected or");
    };
    assert_eq!(values.len(), 3);
    assert!(matches!(
        values[0].kind,
        ExprKind::UnaryOp {
            op: UnaryOp::Not,
            ..
        }
    ));
    assert!(matches!(
        values[1].kind,
        ExprKind::BoolOp {
            op: BoolOp::And,
            ..
        }
    ));
}

#[test]
fn test_conditional_expression() {
    let e = expr("1 if x else 2 if y else 3");
    let ExprKind::IfExp { body, orelse, .. } = &e.kind else {
        panic!("expected conditional");
    };
    assert_eq!(int(body), "1");
    assert!(matches!(orelse.kind, ExprKind::IfExp { .. }));
}

#[test]
fn test_postfix_chain() {
    let e = expr("a.b(1)[2].c");
    let ExprKind::Attribute { value, attr } = &e.kind else {
        panic!("expected attribute");
    };
    assert_eq!(attr, "c");
    let ExprKind::Subscript { value, .. } = &value.kind else {
        panic!("expected subscript");
    };
    assert!(matches!(value.kind, ExprKind::Call { .. }));
}

#[test]
fn test_call_arguments() {
    let e = expr("f(1, *xs, key=2, **opts)");
    let ExprKind::Call { args, keywords, .. } = &e.kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    assert!(matches!(args[1].kind, ExprKind::Starred(_)));
    assert_eq!(keywords.len(), 2);
    assert_eq!(keywords[0].arg.as_deref(), Some("key"));
    assert_eq!(keywords[1].arg, None);
}

#[test]
fn test_starred_after_keyword_is_allowed() {
    let e = expr("f(a=1, *rest)");
    let ExprKind::Call { args, .. } = &e.kind else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 1);
}

#[test]
fn test_call_argument_errors() {
    assert_eq!(
        parse_err("f(a=1, 2)").kind,
        ParseErrorKind::PositionalAfterKeyword
    );
    assert_eq!(
        parse_err("f(**k, 2)").kind,
        ParseErrorKind::PositionalAfterKeywordUnpacking
    );
    assert_eq!(
        parse_err("f(a=1, a=2)").kind,
        ParseErrorKind::RepeatedKeyword("a".to_string())
    );
}

#[test]
fn test_slices() {
    let e = expr("x[1:2, ::3, 4]");
    let ExprKind::Subscript { index, .. } = &e.kind else {
        panic!("expected subscript");
    };
    let ExprKind::Tuple(items) = &index.kind else {
        panic!("expected tuple index");
    };
    assert_eq!(items.len(), 3);
    let ExprKind::Slice { lower, upper, step } = &items[0].kind else {
        panic!("expected slice");
    };
    assert!(lower.is_some() && upper.is_some() && step.is_none());
    let ExprKind::Slice { lower, upper, step } = &items[1].kind else {
        panic!("expected slice");
    };
    assert!(lower.is_none() && upper.is_none() && step.is_some());
    assert_eq!(int(&items[2]), "4");
}

#[test]
fn test_displays() {
    assert!(matches!(expr("()").kind, ExprKind::Tuple(ref v) if v.is_empty()));
    assert!(matches!(expr("(1,)").kind, ExprKind::Tuple(ref v) if v.len() == 1));
    assert!(matches!(expr("(1)").kind, ExprKind::Literal(_)));
    assert!(matches!(expr("[1, *a, 2,]").kind, ExprKind::List(ref v) if v.len() == 3));
    assert!(matches!(expr("{}").kind, ExprKind::Dict(ref v) if v.is_empty()));
    assert!(matches!(expr("{1, 2}").kind, ExprKind::Set(ref v) if v.len() == 2));
    let ExprKind::Dict(items) = expr("{'a': 1, **b}").kind else {
        panic!("expected dict");
    };
    assert_eq!(items.len(), 2);
    assert!(items[0].key.is_some());
    assert!(items[1].key.is_none());
}

#[test]
fn test_bare_tuple_statement() {
    assert!(matches!(expr("1, 2").kind, ExprKind::Tuple(ref v) if v.len() == 2));
    assert!(matches!(expr("1,").kind, ExprKind::Tuple(ref v) if v.len() == 1));
}

#[test]
fn test_comprehensions() {
    let ExprKind::ListComp { generators, .. } = expr("[x * y for x in a if x for y in b]").kind
    else {
        panic!("expected list comprehension");
    };
    assert_eq!(generators.len(), 2);
    assert_eq!(generators[0].ifs.len(), 1);
    assert!(!generators[0].is_async);

    assert!(matches!(
        expr("{k: v for k, v in items}").kind,
        ExprKind::DictComp { .. }
    ));
    assert!(matches!(
        expr("{x for x in s}").kind,
        ExprKind::SetComp { .. }
    ));
    let ExprKind::ListComp { generators, .. } = expr("[x async for x in a]").kind else {
        panic!("expected list comprehension");
    };
    assert!(generators[0].is_async);
}

#[test]
fn test_starred_expression_alone_is_rejected() {
    assert_eq!(parse_err("*a").kind, ParseErrorKind::StarredNotAllowed);
    assert_eq!(parse_err("(*a)").kind, ParseErrorKind::StarredNotAllowed);
    assert!(matches!(expr("*a, b").kind, ExprKind::Tuple(_)));
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        expr("'a' \"b\" '''c'''").kind,
        ExprKind::Literal(Literal::Str("abc".to_string()))
    );
    assert_eq!(
        expr("b'a' b'b'").kind,
        ExprKind::Literal(Literal::Bytes(b"ab".to_vec()))
    );
    assert_eq!(parse_err("b'a' 'b'").kind, ParseErrorKind::MixedBytesAndStr);
}

#[test]
fn test_numeric_literals() {
    assert_eq!(
        expr("0x_ff").kind,
        ExprKind::Literal(Literal::Int {
            digits: "ff".to_string(),
            radix: 16
        })
    );
    assert_eq!(
        expr("1_000.5").kind,
        ExprKind::Literal(Literal::Float("1000.5".to_string()))
    );
    assert_eq!(
        expr("2j").kind,
        ExprKind::Literal(Literal::Imaginary("2".to_string()))
    );
}

// f-strings

#[test]
fn test_fstring_segments() {
    let ExprKind::JoinedStr(parts) = expr("f'a{x!r:>{w}}b{{c}}'").kind else {
        panic!("expected f-string");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].kind, ExprKind::Literal(Literal::Str("a".to_string())));
    let ExprKind::FormattedValue {
        value,
        conversion,
        format_spec,
    } = &parts[1].kind
    else {
        panic!("expected formatted value");
    };
    assert_eq!(value.kind, ExprKind::Name("x".to_string()));
    assert_eq!(*conversion, Some(Conversion::Repr));
    let spec = format_spec.as_ref().expect("format spec");
    let ExprKind::JoinedStr(spec_parts) = &spec.kind else {
        panic!("expected nested f-string");
    };
    assert_eq!(spec_parts.len(), 2);
    assert_eq!(
        parts[2].kind,
        ExprKind::Literal(Literal::Str("b{c}".to_string()))
    );
}

#[test]
fn test_fstring_merges_with_adjacent_literals() {
    let ExprKind::JoinedStr(parts) = expr("'x' f'y{z}' 'w'").kind else {
        panic!("expected f-string");
    };
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[0].kind, ExprKind::Literal(Literal::Str("xy".to_string())));
    assert_eq!(parts[2].kind, ExprKind::Literal(Literal::Str("w".to_string())));
}

#[test]
fn test_fstring_debug_field() {
    let ExprKind::JoinedStr(parts) = expr("f'{x + 1 = }'").kind else {
        panic!("expected f-string");
    };
    assert_eq!(
        parts[0].kind,
        ExprKind::Literal(Literal::Str("x + 1 = ".to_string()))
    );
    assert!(matches!(
        parts[1].kind,
        ExprKind::FormattedValue {
            conversion: Some(Conversion::Repr),
            ..
        }
    ));
}

#[test]
fn test_fstring_comparison_is_not_debug() {
    let ExprKind::JoinedStr(parts) = expr("f'{a == b}{a != b}{a >= b}'").kind else {
        panic!("expected f-string");
    };
    assert_eq!(parts.len(), 3);
    for part in &parts {
        let ExprKind::FormattedValue {
            value, conversion, ..
        } = &part.kind
        else {
            panic!("expected formatted value");
        };
        assert!(matches!(value.kind, ExprKind::Compare { .. }));
        assert_eq!(*conversion, None);
    }
}

#[test]
fn test_fstring_field_span_points_into_source() {
    let source = "f'ab{1 +}'";
    let err = parse_err(source);
    assert_eq!(err.kind, ParseErrorKind::InvalidSyntax);
    assert_eq!(err.span.start, 8);
}

#[test]
fn test_fstring_errors() {
    let cases = [
        ("f'}'", "single '}' is not allowed"),
        ("f'{}'", "valid expression required before '}'"),
        ("f'{x'", "expecting '}'"),
        ("f'{x!z}'", "invalid conversion character: expected 's', 'r', or 'a'"),
        ("f'{x:{y:{z}}}'", "expressions nested too deeply"),
    ];
    for (source, detail) in cases {
        assert_eq!(
            parse_err(source).kind,
            ParseErrorKind::FString(detail),
            "{source}"
        );
    }
}

// Statements

#[test]
fn test_assignment_forms() {
    let module = parse_ok("a = b = 1\nx, *y = z\nc += 2\n");
    let StmtKind::Assign { targets, .. } = &module.body[0].kind else {
        panic!("expected assignment");
    };
    assert_eq!(targets.len(), 2);
    let StmtKind::Assign { targets, .. } = &module.body[1].kind else {
        panic!("expected assignment");
    };
    assert!(matches!(targets[0].kind, ExprKind::Tuple(_)));
    assert!(matches!(
        module.body[2].kind,
        StmtKind::AugAssign {
            op: BinaryOp::Add,
            ..
        }
    ));
}

#[test]
fn test_semicolon_separated_statements() {
    let module = parse_ok("a = 1; b = 2; a + b");
    assert_eq!(module.body.len(), 3);
}

#[test]
fn test_if_elif_else() {
    let module = parse_ok("if a:\n    x = 1\nelif b:\n    x = 2\nelse:\n    x = 3\n");
    assert_eq!(module.body.len(), 1);
    let StmtKind::If { body, orelse, .. } = &module.body[0].kind else {
        panic!("expected if");
    };
    assert_eq!(body.len(), 1);
    let StmtKind::If { orelse, .. } = &orelse[0].kind else {
        panic!("expected nested elif");
    };
    assert_eq!(orelse.len(), 1);
}

#[test]
fn test_loops_with_else() {
    let module = parse_ok(
        "for i, j in pairs:\n    if i:\n        break\nelse:\n    pass\nwhile x: x -= 1\n",
    );
    assert_eq!(module.body.len(), 2);
    let StmtKind::For { target, orelse, .. } = &module.body[0].kind else {
        panic!("expected for");
    };
    assert!(matches!(target.kind, ExprKind::Tuple(ref v) if v.len() == 2));
    assert_eq!(orelse.len(), 1);
    let StmtKind::While { body, .. } = &module.body[1].kind else {
        panic!("expected while");
    };
    assert_eq!(body.len(), 1);
}

#[test]
fn test_del_targets() {
    let module = parse_ok("del a, b[0], c.d");
    let StmtKind::Delete { targets } = &module.body[0].kind else {
        panic!("expected del");
    };
    assert_eq!(targets.len(), 3);
}

#[test]
fn test_indentation_errors() {
    assert_eq!(parse_err("  x = 1").kind, ParseErrorKind::UnexpectedIndent);
    assert_eq!(
        parse_err("if x:\ny = 1").kind,
        ParseErrorKind::ExpectedIndentedBlock("'if' statement")
    );
    assert_eq!(
        parse_err("if x:\n    a\n        b\n").kind,
        ParseErrorKind::UnexpectedIndent
    );
}

#[test]
fn test_missing_colon() {
    let err = parse_err("if x\n    pass\n");
    assert_eq!(err.kind, ParseErrorKind::Expected(":"));
    assert_eq!(err.render("if x\n    pass\n"), "expected ':' (line 1, column 5)");
}

#[test]
fn test_stray_else_is_syntax_error() {
    assert_eq!(parse_err("else:\n    pass\n").kind, ParseErrorKind::InvalidSyntax);
}

// Unsupported constructs

#[test]
fn test_unsupported_statements() {
    let cases = [
        ("def f(x):\n    return x\n", UnsupportedKind::FunctionDef),
        ("class A:\n    pass\n", UnsupportedKind::ClassDef),
        ("import os", UnsupportedKind::Import),
        ("from os import path", UnsupportedKind::ImportFrom),
        ("return 1", UnsupportedKind::Return),
        ("raise ValueError", UnsupportedKind::Raise),
        ("assert x", UnsupportedKind::Assert),
        ("global x", UnsupportedKind::Global),
        ("nonlocal x", UnsupportedKind::Nonlocal),
        ("with open(p) as f:\n    pass\n", UnsupportedKind::With),
        ("try:\n    x\nexcept E:\n    y\nfinally:\n    z\n", UnsupportedKind::Try),
        ("try:\n    x\nexcept* E:\n    y\n", UnsupportedKind::TryStar),
        ("@dec\ndef f():\n    pass\n", UnsupportedKind::FunctionDef),
        ("async def f():\n    pass\n", UnsupportedKind::AsyncFunctionDef),
        ("async for x in y:\n    pass\n", UnsupportedKind::AsyncFor),
        ("match x:\n    case 1:\n        pass\n", UnsupportedKind::Match),
        ("type Point = tuple", UnsupportedKind::TypeAlias),
        ("x: int = 1", UnsupportedKind::AnnAssign),
    ];
    for (source, kind) in cases {
        assert_eq!(unsupported_stmt(source), kind, "{source}");
    }
}

#[test]
fn test_skipped_statement_leaves_following_code() {
    let module = parse_ok("def f():\n    pass\nx = 1\n");
    assert_eq!(module.body.len(), 2);
    assert!(matches!(module.body[1].kind, StmtKind::Assign { .. }));
}

#[test]
fn test_soft_keywords_as_names() {
    let module = parse_ok("match = 1\ntype = 2\nmatch(x)\n");
    assert_eq!(module.body.len(), 3);
    assert!(matches!(module.body[0].kind, StmtKind::Assign { .. }));
    assert!(matches!(module.body[1].kind, StmtKind::Assign { .. }));
    assert!(matches!(module.body[2].kind, StmtKind::Expr(_)));
}

#[test]
fn test_unsupported_expressions() {
    assert_eq!(unsupported_expr("lambda x: x"), UnsupportedKind::Lambda);
    assert_eq!(unsupported_expr("(y := 1)"), UnsupportedKind::NamedExpr);
    assert_eq!(unsupported_expr("(x for x in y)"), UnsupportedKind::GeneratorExp);
    assert_eq!(unsupported_expr("await x"), UnsupportedKind::Await);
    assert_eq!(unsupported_expr("yield x"), UnsupportedKind::Yield);
    assert_eq!(unsupported_expr("yield from x"), UnsupportedKind::YieldFrom);
}

#[test]
fn test_generator_argument() {
    let e = expr("sum(x for x in y)");
    let ExprKind::Call { args, .. } = &e.kind else {
        panic!("expected call");
    };
    assert_eq!(
        args[0].kind,
        ExprKind::Unsupported(UnsupportedKind::GeneratorExp)
    );
}

// Errors

#[test]
fn test_lex_errors_surface_as_parse_errors() {
    let err = parse_err("x = 'abc");
    assert!(matches!(err.kind, ParseErrorKind::Lex(_)));
    assert_eq!(err.span.start, 4);
}

#[test]
fn test_unbalanced_expression() {
    assert_eq!(parse_err("1 +").kind, ParseErrorKind::InvalidSyntax);
    assert_eq!(parse_err("1 2").kind, ParseErrorKind::InvalidSyntax);
}

#[test]
fn test_deep_nesting_does_not_overflow() {
    let source = format!("{}1{}", "(".repeat(150), ")".repeat(150));
    assert!(matches!(expr(&source).kind, ExprKind::Literal(_)));
    let source = format!("{}1", "-".repeat(2000));
    assert!(matches!(expr(&source).kind, ExprKind::UnaryOp { .. }));
}

proptest! {
    #[test]
    fn parse_never_panics(source in "[a-z0-9 +*/()\\[\\]{}:,.=!<>'\"f\\n-]{0,40}") {
        let _ = parse(&source);
    }

    #[test]
    fn integer_sums_parse(terms in prop::collection::vec(0u32..1000, 1..20)) {
        let source = terms.iter().map(u32::to_string).collect::<Vec<_>>().join(" + ");
        let parsed = parse(&source);
        prop_assert!(parsed.is_ok());
    }
}
