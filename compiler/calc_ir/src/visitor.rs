//! Syntax tree visitor.
//!
//! Default `visit_*` implementations call the `walk_*` functions, which
//! traverse children in source order. Override a `visit_*` method to act on
//! specific nodes and call the matching `walk_*` to keep descending.

use crate::ast::{Comprehension, Expr, ExprKind, Module, Stmt, StmtKind, UnsupportedKind};
use crate::Span;

/// Syntax tree visitor.
///
/// The visitor may mutate its own state; the tree stays immutable.
pub trait Visitor<'ast> {
    fn visit_module(&mut self, module: &'ast Module) {
        walk_module(self, module);
    }

    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        walk_expr(self, expr);
    }

    fn visit_comprehension(&mut self, comprehension: &'ast Comprehension, span: Span) {
        let _ = span;
        walk_comprehension(self, comprehension);
    }
}

pub fn walk_module<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, module: &'ast Module) {
    for stmt in &module.body {
        visitor.visit_stmt(stmt);
    }
}

fn walk_block<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, block: &'ast [Stmt]) {
    for stmt in block {
        visitor.visit_stmt(stmt);
    }
}

pub fn walk_stmt<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, stmt: &'ast Stmt) {
    match &stmt.kind {
        StmtKind::Expr(expr) => visitor.visit_expr(expr),
        StmtKind::Assign { targets, value } => {
            for target in targets {
                visitor.visit_expr(target);
            }
            visitor.visit_expr(value);
        }
        StmtKind::AugAssign { target, value, .. } => {
            visitor.visit_expr(target);
            visitor.visit_expr(value);
        }
        StmtKind::If { test, body, orelse } | StmtKind::While { test, body, orelse } => {
            visitor.visit_expr(test);
            walk_block(visitor, body);
            walk_block(visitor, orelse);
        }
        StmtKind::For {
            target,
            iter,
            body,
            orelse,
        } => {
            visitor.visit_expr(target);
            visitor.visit_expr(iter);
            walk_block(visitor, body);
            walk_block(visitor, orelse);
        }
        StmtKind::Delete { targets } => {
            for target in targets {
                visitor.visit_expr(target);
            }
        }
        StmtKind::Break | StmtKind::Continue | StmtKind::Pass | StmtKind::Unsupported(_) => {}
    }
}

pub fn walk_expr<'ast, V: Visitor<'ast> + ?Sized>(visitor: &mut V, expr: &'ast Expr) {
    match &expr.kind {
        ExprKind::Literal(_) | ExprKind::Name(_) | ExprKind::Unsupported(_) => {}
        ExprKind::Attribute { value, .. } | ExprKind::Starred(value) => visitor.visit_expr(value),
        ExprKind::Subscript { value, index } => {
            visitor.visit_expr(value);
            visitor.visit_expr(index);
        }
        ExprKind::Slice { lower, upper, step } => {
            for part in [lower, upper, step].into_iter().flatten() {
                visitor.visit_expr(part);
            }
        }
        ExprKind::BinOp { left, right, .. } => {
            visitor.visit_expr(left);
            visitor.visit_expr(right);
        }
        ExprKind::BoolOp { values, .. }
        | ExprKind::List(values)
        | ExprKind::Tuple(values)
        | ExprKind::Set(values)
        | ExprKind::JoinedStr(values) => {
            for value in values {
                visitor.visit_expr(value);
            }
        }
        ExprKind::UnaryOp { operand, .. } => visitor.visit_expr(operand),
        ExprKind::Compare { left, ops } => {
            visitor.visit_expr(left);
            for (_, comparator) in ops {
                visitor.visit_expr(comparator);
            }
        }
        ExprKind::Call {
            func,
            args,
            keywords,
        } => {
            visitor.visit_expr(func);
            for arg in args {
                visitor.visit_expr(arg);
            }
            for keyword in keywords {
                visitor.visit_expr(&keyword.value);
            }
        }
        ExprKind::Dict(items) => {
            for item in items {
                if let Some(key) = &item.key {
                    visitor.visit_expr(key);
                }
                visitor.visit_expr(&item.value);
            }
        }
        ExprKind::ListComp { elt, generators } | ExprKind::SetComp { elt, generators } => {
            for generator in generators {
                visitor.visit_comprehension(generator, expr.span);
            }
            visitor.visit_expr(elt);
        }
        ExprKind::DictComp {
            key,
            value,
            generators,
        } => {
            for generator in generators {
                visitor.visit_comprehension(generator, expr.span);
            }
            visitor.visit_expr(key);
            visitor.visit_expr(value);
        }
        ExprKind::IfExp { test, body, orelse } => {
            visitor.visit_expr(test);
            visitor.visit_expr(body);
            visitor.visit_expr(orelse);
        }
        ExprKind::FormattedValue {
            value, format_spec, ..
        } => {
            visitor.visit_expr(value);
            if let Some(spec) = format_spec {
                visitor.visit_expr(spec);
            }
        }
    }
}

pub fn walk_comprehension<'ast, V: Visitor<'ast> + ?Sized>(
    visitor: &mut V,
    comprehension: &'ast Comprehension,
) {
    visitor.visit_expr(&comprehension.iter);
    visitor.visit_expr(&comprehension.target);
    for cond in &comprehension.ifs {
        visitor.visit_expr(cond);
    }
}

/// Collects the first disallowed node in source order.
#[derive(Default)]
struct UnsupportedFinder {
    found: Option<(UnsupportedKind, Span)>,
}

impl<'ast> Visitor<'ast> for UnsupportedFinder {
    fn visit_stmt(&mut self, stmt: &'ast Stmt) {
        if self.found.is_some() {
            return;
        }
        if let StmtKind::Unsupported(kind) = stmt.kind {
            self.found = Some((kind, stmt.span));
            return;
        }
        walk_stmt(self, stmt);
    }

    fn visit_expr(&mut self, expr: &'ast Expr) {
        if self.found.is_some() {
            return;
        }
        if let ExprKind::Unsupported(kind) = expr.kind {
            self.found = Some((kind, expr.span));
            return;
        }
        walk_expr(self, expr);
    }

    fn visit_comprehension(&mut self, comprehension: &'ast Comprehension, span: Span) {
        if self.found.is_some() {
            return;
        }
        if comprehension.is_async {
            self.found = Some((UnsupportedKind::AsyncComprehension, span));
            return;
        }
        walk_comprehension(self, comprehension);
    }
}

/// Find the first disallowed construct in `module`, if any.
///
/// Run before evaluation so that a rejected script never leaves partial
/// bindings behind.
pub fn find_unsupported(module: &Module) -> Option<(UnsupportedKind, Span)> {
    let mut finder = UnsupportedFinder::default();
    finder.visit_module(module);
    finder.found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Literal;

    fn expr(kind: ExprKind) -> Expr {
        Expr::new(kind, Span::new(0, 1))
    }

    #[test]
    fn test_clean_module_has_no_unsupported() {
        let module = Module {
            body: vec![Stmt::new(
                StmtKind::Expr(expr(ExprKind::Literal(Literal::None))),
                Span::new(0, 4),
            )],
        };
        assert_eq!(find_unsupported(&module), None);
    }

    #[test]
    fn test_finds_nested_expression() {
        let lambda = Expr::new(
            ExprKind::Unsupported(UnsupportedKind::Lambda),
            Span::new(5, 10),
        );
        let module = Module {
            body: vec![Stmt::new(
                StmtKind::If {
                    test: expr(ExprKind::Literal(Literal::Bool(true))),
                    body: vec![Stmt::new(StmtKind::Expr(lambda), Span::new(5, 10))],
                    orelse: vec![],
                },
                Span::new(0, 10),
            )],
        };
        assert_eq!(
            find_unsupported(&module),
            Some((UnsupportedKind::Lambda, Span::new(5, 10)))
        );
    }

    #[test]
    fn test_async_comprehension_reported() {
        let comp = expr(ExprKind::ListComp {
            elt: expr(ExprKind::Name("x".into())).boxed(),
            generators: vec![Comprehension {
                target: expr(ExprKind::Name("x".into())),
                iter: expr(ExprKind::Name("y".into())),
                ifs: vec![],
                is_async: true,
            }],
        });
        let module = Module {
            body: vec![Stmt::new(StmtKind::Expr(comp), Span::new(0, 1))],
        };
        let found = find_unsupported(&module).map(|(kind, _)| kind);
        assert_eq!(found, Some(UnsupportedKind::AsyncComprehension));
    }

    #[test]
    fn test_first_in_source_order_wins() {
        let module = Module {
            body: vec![
                Stmt::new(StmtKind::Pass, Span::new(0, 4)),
                Stmt::new(
                    StmtKind::Unsupported(UnsupportedKind::Import),
                    Span::new(5, 15),
                ),
                Stmt::new(
                    StmtKind::Unsupported(UnsupportedKind::FunctionDef),
                    Span::new(16, 30),
                ),
            ],
        };
        assert_eq!(
            find_unsupported(&module),
            Some((UnsupportedKind::Import, Span::new(5, 15)))
        );
    }
}
