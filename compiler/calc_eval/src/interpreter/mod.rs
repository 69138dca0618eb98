//! Tree-walking interpreter for calculator scripts.
//!
//! # Architecture
//!
//! Statements execute in `mod.rs`; expressions evaluate in `expr.rs`.
//! Helper modules split off the larger protocols:
//!
//! - `assign` - assignment, augmented assignment and deletion targets
//! - `call` - argument evaluation with `*` and `**` expansion
//! - `comprehension` - list/set/dict comprehensions in a pushed frame
//! - `scope_guard` - RAII frame management
//!
//! # Loop Control
//!
//! `break` and `continue` do not travel through `Result`. They set the
//! pending-interrupt slot; every block checks the slot after each statement
//! and the innermost loop consumes it. Top-level statements ignore it, so a
//! bare `break` outside a loop succeeds and leaves the slot set until the
//! next top-level statement starts.

mod assign;
mod call;
mod comprehension;
mod expr;
mod scope_guard;

pub use scope_guard::ScopedInterpreter;

use std::collections::BTreeMap;

use calc_ir::{find_unsupported, Expr, Module, Stmt, StmtKind};

use crate::environment::ScopeStack;
use crate::errors::{unsupported_syntax, EvalResult};
use crate::value::iterate;
use crate::Value;

/// Pending `break` or `continue`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LoopInterrupt {
    Break,
    Continue,
}

/// Result of running one script.
#[derive(Clone, Debug)]
pub struct Outcome {
    /// Value of the last statement when it was a bare expression.
    pub result: Option<Value>,
    /// Ambient-frame bindings after the run, sorted by name.
    pub bindings: BTreeMap<String, Value>,
}

/// One evaluation session: a scope stack, the numeric mode and the
/// pending-interrupt slot.
///
/// A session can run several scripts in turn; bindings persist between
/// them.
pub struct Interpreter {
    pub(crate) scope: ScopeStack,
    pub(crate) exact_mode: bool,
    pub(crate) interrupt: Option<LoopInterrupt>,
}

impl Interpreter {
    /// A session with an empty ambient frame.
    ///
    /// With `exact_mode`, numeric literals evaluate to `decimal.Decimal`.
    pub fn new(exact_mode: bool) -> Self {
        Interpreter {
            scope: ScopeStack::new(),
            exact_mode,
            interrupt: None,
        }
    }

    pub fn exact_mode(&self) -> bool {
        self.exact_mode
    }

    /// The `break`/`continue` left pending by the last statement, if any.
    pub fn pending_interrupt(&self) -> Option<LoopInterrupt> {
        self.interrupt
    }

    pub fn scope(&self) -> &ScopeStack {
        &self.scope
    }

    pub fn scope_mut(&mut self) -> &mut ScopeStack {
        &mut self.scope
    }

    /// Run a whole script.
    ///
    /// The tree is checked for disallowed kinds before anything executes,
    /// so a rejected script leaves the scope untouched.
    #[tracing::instrument(level = "debug", skip_all, fields(statements = module.body.len()))]
    pub fn run(&mut self, module: &Module) -> EvalResult<Outcome> {
        if let Some((kind, span)) = find_unsupported(module) {
            tracing::debug!(kind = kind.name(), "rejected before execution");
            return Err(unsupported_syntax(kind).with_span(span));
        }

        let mut result = None;
        for stmt in &module.body {
            // A stray top-level `break` must not cut the next block short.
            self.interrupt = None;
            result = match &stmt.kind {
                StmtKind::Expr(expr) => Some(self.eval(expr)?),
                _ => {
                    self.exec_stmt(stmt)?;
                    None
                }
            };
        }
        Ok(Outcome {
            result,
            bindings: self.scope.bindings(),
        })
    }

    /// Execute statements until one of them leaves an interrupt pending.
    pub(crate) fn exec_block(&mut self, block: &[Stmt]) -> EvalResult<()> {
        for stmt in block {
            self.exec_stmt(stmt)?;
            if self.interrupt.is_some() {
                break;
            }
        }
        Ok(())
    }

    pub(crate) fn exec_stmt(&mut self, stmt: &Stmt) -> EvalResult<()> {
        tracing::trace!(start = stmt.span.start, "statement");
        self.exec_stmt_inner(stmt).map_err(|e| e.with_span(stmt.span))
    }

    fn exec_stmt_inner(&mut self, stmt: &Stmt) -> EvalResult<()> {
        match &stmt.kind {
            StmtKind::Expr(expr) => {
                self.eval(expr)?;
            }
            StmtKind::Assign { targets, value } => {
                let value = self.eval(value)?;
                for target in targets {
                    self.assign(target, value.clone())?;
                }
            }
            StmtKind::AugAssign { target, op, value } => self.aug_assign(target, *op, value)?,
            StmtKind::If { test, body, orelse } => {
                if self.eval(test)?.is_truthy() {
                    self.exec_block(body)?;
                } else {
                    self.exec_block(orelse)?;
                }
            }
            StmtKind::For {
                target,
                iter,
                body,
                orelse,
            } => self.exec_for(target, iter, body, orelse)?,
            StmtKind::While { test, body, orelse } => self.exec_while(test, body, orelse)?,
            StmtKind::Break => self.interrupt = Some(LoopInterrupt::Break),
            StmtKind::Continue => self.interrupt = Some(LoopInterrupt::Continue),
            StmtKind::Pass => {}
            StmtKind::Delete { targets } => {
                for target in targets {
                    self.delete(target)?;
                }
            }
            StmtKind::Unsupported(kind) => return Err(unsupported_syntax(*kind)),
        }
        Ok(())
    }

    fn exec_for(
        &mut self,
        target: &Expr,
        iter: &Expr,
        body: &[Stmt],
        orelse: &[Stmt],
    ) -> EvalResult<()> {
        self.interrupt = None;
        let iterable = self.eval(iter)?;
        let mut broke = false;
        for item in iterate(&iterable)? {
            self.assign(target, item)?;
            self.exec_block(body)?;
            if self.take_break() {
                broke = true;
                break;
            }
        }
        self.interrupt = None;
        tracing::trace!(broke, "for loop finished");
        if !broke {
            self.exec_block(orelse)?;
        }
        Ok(())
    }

    fn exec_while(&mut self, test: &Expr, body: &[Stmt], orelse: &[Stmt]) -> EvalResult<()> {
        self.interrupt = None;
        let mut broke = false;
        while self.eval(test)?.is_truthy() {
            self.exec_block(body)?;
            if self.take_break() {
                broke = true;
                break;
            }
        }
        self.interrupt = None;
        tracing::trace!(broke, "while loop finished");
        if !broke {
            self.exec_block(orelse)?;
        }
        Ok(())
    }

    /// Consume the interrupt left by one loop iteration; `true` on `break`.
    fn take_break(&mut self) -> bool {
        matches!(self.interrupt.take(), Some(LoopInterrupt::Break))
    }
}

#[cfg(test)]
mod tests;
