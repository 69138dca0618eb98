//! Assignment, augmented assignment and deletion targets.

use calc_ir::{BinaryOp, Expr, ExprKind};

use super::expr::is_slice_index;
use super::Interpreter;
use crate::errors::{
    bad_target, not_enough_values, too_many_values, EvalErrorKind, EvalResult, TargetContext,
};
use crate::operators::evaluate_binary;
use crate::subscript::{del_item, get_item, set_item};
use crate::value::iterate;
use crate::Value;

impl Interpreter {
    /// Bind `value` to an assignment target.
    pub(crate) fn assign(&mut self, target: &Expr, value: Value) -> EvalResult<()> {
        let ctx = TargetContext::Assign;
        match &target.kind {
            ExprKind::Name(name) => {
                self.scope.set(name, value);
                Ok(())
            }
            ExprKind::Tuple(targets) | ExprKind::List(targets) => self.unpack(targets, &value),
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                let container = self.eval(container)?;
                let key = self.eval_index(index)?;
                set_item(&container, &key, value)
            }
            ExprKind::Attribute { .. } => Err(bad_target("attribute", ctx)),
            _ => Err(bad_target(target.kind_name(), ctx)),
        }
        .map_err(|e| e.with_span(target.span))
    }

    fn unpack(&mut self, targets: &[Expr], value: &Value) -> EvalResult<()> {
        let items: Vec<Value> = iterate(value)?.collect();
        if items.len() < targets.len() {
            return Err(not_enough_values(targets.len(), items.len()));
        }
        if items.len() > targets.len() {
            return Err(too_many_values(targets.len()));
        }
        for (target, item) in targets.iter().zip(items) {
            self.assign(target, item)?;
        }
        Ok(())
    }

    /// `target op= value`: read, apply the plain operator, store.
    ///
    /// Slice keys are refused here although plain assignment takes them.
    pub(crate) fn aug_assign(
        &mut self,
        target: &Expr,
        op: BinaryOp,
        value: &Expr,
    ) -> EvalResult<()> {
        let ctx = TargetContext::AugAssign;
        match &target.kind {
            ExprKind::Name(name) => {
                let current = self.scope.get(name)?;
                let rhs = self.eval(value)?;
                let result = apply_augmented(&current, &rhs, op)?;
                self.scope.set(name, result);
                Ok(())
            }
            ExprKind::Subscript { index, .. } if is_slice_index(index) => {
                Err(bad_target("slice", ctx))
            }
            ExprKind::Subscript {
                value: container,
                index,
            } => {
                let container = self.eval(container)?;
                let key = self.eval(index)?;
                let current = get_item(&container, &key)?;
                let rhs = self.eval(value)?;
                let result = apply_augmented(&current, &rhs, op)?;
                set_item(&container, &key, result)
            }
            ExprKind::Attribute { .. } => Err(bad_target("attribute", ctx)),
            _ => Err(bad_target(target.kind_name(), ctx)),
        }
        .map_err(|e| e.with_span(target.span))
    }

    /// `del target`; tuple and list targets delete element by element.
    pub(crate) fn delete(&mut self, target: &Expr) -> EvalResult<()> {
        let ctx = TargetContext::Delete;
        match &target.kind {
            ExprKind::Name(name) => self.scope.delete(name),
            ExprKind::Tuple(targets) | ExprKind::List(targets) => {
                for target in targets {
                    self.delete(target)?;
                }
                Ok(())
            }
            ExprKind::Subscript { index, .. } if is_slice_index(index) => {
                Err(bad_target("slice", ctx))
            }
            ExprKind::Subscript { value, index } => {
                let container = self.eval(value)?;
                let key = self.eval(index)?;
                del_item(&container, &key)
            }
            ExprKind::Attribute { .. } => Err(bad_target("attribute", ctx)),
            _ => Err(bad_target(target.kind_name(), ctx)),
        }
        .map_err(|e| e.with_span(target.span))
    }
}

/// The binary operation behind `op=`, reported with the augmented symbol.
fn apply_augmented(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    evaluate_binary(left, right, op).map_err(|mut e| {
        if let EvalErrorKind::UnsupportedOperand { op: symbol, .. } = &mut e.kind {
            *symbol = op.as_aug_symbol();
        }
        e
    })
}
