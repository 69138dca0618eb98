//! Expression evaluation.
//!
//! One arm per `ExprKind`; the match has no catch-all so a new node kind
//! cannot slip through unevaluated.

use std::rc::Rc;

use calc_ir::{
    ensure_sufficient_stack, BoolOp, CmpOp, Conversion, DictItem, Expr, ExprKind, Literal,
};

use super::comprehension::Collector;
use super::Interpreter;
use crate::compare::evaluate_compare;
use crate::errors::{
    integer_overflow, type_error, unsupported_literal, unsupported_syntax, value_error, EvalResult,
};
use crate::format::format_value;
use crate::methods::get_attribute;
use crate::numeric::{decimal_from_i64, decimal_from_str};
use crate::operators::evaluate_binary;
use crate::subscript::get_item;
use crate::unary_operators::evaluate_unary;
use crate::value::{iterate, DictTable, SetTable, SliceValue};
use crate::Value;

impl Interpreter {
    /// Evaluate an expression, growing the stack for deep nesting.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr)).map_err(|e| e.with_span(expr.span))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Literal(literal) => self.eval_literal(literal),
            ExprKind::Name(name) => self.scope.get(name),
            ExprKind::Attribute { value, attr } => get_attribute(&self.eval(value)?, attr),
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value)?;
                let key = self.eval_index(index)?;
                get_item(&container, &key)
            }
            ExprKind::Slice { lower, upper, step } => {
                self.eval_slice(lower.as_deref(), upper.as_deref(), step.as_deref())
            }
            ExprKind::BinOp { left, op, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                evaluate_binary(&left, &right, *op)
            }
            ExprKind::BoolOp { op, values } => self.eval_bool_op(*op, values),
            ExprKind::UnaryOp { op, operand } => evaluate_unary(&self.eval(operand)?, *op),
            ExprKind::Compare { left, ops } => self.eval_compare(left, ops),
            ExprKind::Call {
                func,
                args,
                keywords,
            } => self.eval_call(func, args, keywords),
            ExprKind::List(items) => Ok(Value::list(self.eval_elements(items)?)),
            ExprKind::Tuple(items) => Ok(Value::tuple(self.eval_elements(items)?)),
            ExprKind::Set(items) => {
                let values = self.eval_elements(items)?;
                Ok(Value::set(SetTable::from_values(values)?))
            }
            ExprKind::Dict(items) => self.eval_dict(items),
            ExprKind::ListComp { elt, generators } => {
                self.eval_comprehension(generators, Collector::List(elt, Vec::new()))
            }
            ExprKind::SetComp { elt, generators } => {
                self.eval_comprehension(generators, Collector::Set(elt, SetTable::new()))
            }
            ExprKind::DictComp {
                key,
                value,
                generators,
            } => {
                let collector = Collector::Dict(key, value, DictTable::new());
                self.eval_comprehension(generators, collector)
            }
            ExprKind::IfExp { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.eval(body)
                } else {
                    self.eval(orelse)
                }
            }
            ExprKind::JoinedStr(parts) => {
                let mut out = String::new();
                for part in parts {
                    match self.eval(part)? {
                        Value::Str(s) => out.push_str(&s),
                        other => out.push_str(&other.to_str()),
                    }
                }
                Ok(Value::str(out))
            }
            ExprKind::FormattedValue {
                value,
                conversion,
                format_spec,
            } => self.eval_formatted(value, *conversion, format_spec.as_deref()),
            ExprKind::Starred(_) => Err(type_error("can't use starred expression here")),
            ExprKind::Unsupported(kind) => Err(unsupported_syntax(*kind)),
        }
    }

    /// Numeric literals become decimals in exact mode; complex literals are
    /// refused in both modes.
    fn eval_literal(&self, literal: &Literal) -> EvalResult {
        Ok(match literal {
            Literal::Int { digits, radix } => {
                if self.exact_mode && *radix == 10 {
                    let d = decimal_from_str(digits).ok_or_else(|| {
                        value_error(format!("invalid literal for Decimal: '{digits}'"))
                    })?;
                    return Ok(Value::decimal(d));
                }
                let n = i64::from_str_radix(digits, *radix)
                    .map_err(|_| integer_overflow("integer literal"))?;
                if self.exact_mode {
                    Value::decimal(decimal_from_i64(n))
                } else {
                    Value::Int(n)
                }
            }
            Literal::Float(text) => {
                if self.exact_mode {
                    let d = decimal_from_str(text).ok_or_else(|| {
                        value_error(format!("invalid literal for Decimal: '{text}'"))
                    })?;
                    Value::decimal(d)
                } else {
                    let f: f64 = text.parse().map_err(|_| {
                        value_error(format!("could not convert string to float: '{text}'"))
                    })?;
                    Value::Float(f)
                }
            }
            Literal::Imaginary(_) => return Err(unsupported_literal("complex")),
            Literal::Str(s) => Value::str(s.as_str()),
            Literal::Bytes(b) => Value::bytes(b.clone()),
            Literal::Bool(b) => Value::Bool(*b),
            Literal::None => Value::None,
            Literal::Ellipsis => Value::Ellipsis,
        })
    }

    /// A subscript key: slices and tuples of slices become slice values.
    pub(crate) fn eval_index(&mut self, index: &Expr) -> EvalResult {
        match &index.kind {
            ExprKind::Tuple(items) if items.iter().any(is_slice) => {
                let keys = items
                    .iter()
                    .map(|item| self.eval_index(item))
                    .collect::<EvalResult<Vec<_>>>()?;
                Ok(Value::tuple(keys))
            }
            _ => self.eval(index),
        }
    }

    fn eval_slice(
        &mut self,
        lower: Option<&Expr>,
        upper: Option<&Expr>,
        step: Option<&Expr>,
    ) -> EvalResult {
        let mut part = |bound: Option<&Expr>| match bound {
            Some(expr) => self.eval(expr),
            None => Ok(Value::None),
        };
        Ok(Value::Slice(Rc::new(SliceValue {
            start: part(lower)?,
            stop: part(upper)?,
            step: part(step)?,
        })))
    }

    /// Short-circuits and yields the deciding operand itself.
    fn eval_bool_op(&mut self, op: BoolOp, values: &[Expr]) -> EvalResult {
        let mut last = Value::None;
        for value in values {
            last = self.eval(value)?;
            let truthy = last.is_truthy();
            match op {
                BoolOp::And if !truthy => break,
                BoolOp::Or if truthy => break,
                _ => {}
            }
        }
        Ok(last)
    }

    /// Chained comparison: every comparator is evaluated exactly once and
    /// no pair short-circuits the chain.
    fn eval_compare(&mut self, left: &Expr, ops: &[(CmpOp, Expr)]) -> EvalResult {
        let mut current = self.eval(left)?;
        let mut holds = true;
        for (op, comparator) in ops {
            let right = self.eval(comparator)?;
            if !evaluate_compare(&current, &right, *op)? {
                holds = false;
            }
            current = right;
        }
        Ok(Value::Bool(holds))
    }

    /// Display elements with `*iterable` expanded in place.
    pub(crate) fn eval_elements(&mut self, items: &[Expr]) -> EvalResult<Vec<Value>> {
        let mut out = Vec::with_capacity(items.len());
        for item in items {
            if let ExprKind::Starred(inner) = &item.kind {
                let iterable = self.eval(inner)?;
                out.extend(iterate(&iterable).map_err(|e| e.with_span(item.span))?);
            } else {
                out.push(self.eval(item)?);
            }
        }
        Ok(out)
    }

    fn eval_dict(&mut self, items: &[DictItem]) -> EvalResult {
        let mut table = DictTable::new();
        for item in items {
            match &item.key {
                Some(key) => {
                    let key = self.eval(key)?;
                    let value = self.eval(&item.value)?;
                    table.insert(key, value)?;
                }
                None => {
                    let mapping = self.eval(&item.value)?;
                    let Value::Dict(other) = &mapping else {
                        return Err(type_error(format!(
                            "'{}' object is not a mapping",
                            mapping.type_name()
                        ))
                        .with_span(item.value.span));
                    };
                    let entries: Vec<(Value, Value)> = other
                        .borrow()
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    for (key, value) in entries {
                        table.insert(key, value)?;
                    }
                }
            }
        }
        Ok(Value::dict(table))
    }

    fn eval_formatted(
        &mut self,
        value: &Expr,
        conversion: Option<Conversion>,
        format_spec: Option<&Expr>,
    ) -> EvalResult {
        let value = self.eval(value)?;
        let value = match conversion {
            None => value,
            Some(Conversion::Str) => Value::str(value.to_str()),
            Some(Conversion::Repr) => Value::str(value.repr()),
            Some(Conversion::Ascii) => Value::str(value.ascii()),
        };
        let spec = match format_spec {
            Some(spec) => self.eval(spec)?.to_str(),
            None => String::new(),
        };
        Ok(Value::str(format_value(&value, &spec)?))
    }
}

#[inline]
fn is_slice(expr: &Expr) -> bool {
    matches!(expr.kind, ExprKind::Slice { .. })
}

/// A subscript key that is a slice or a tuple holding one.
pub(super) fn is_slice_index(index: &Expr) -> bool {
    match &index.kind {
        ExprKind::Slice { .. } => true,
        ExprKind::Tuple(items) => items.iter().any(is_slice),
        _ => false,
    }
}
