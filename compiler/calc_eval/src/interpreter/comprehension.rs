//! List, set and dict comprehensions.
//!
//! The whole comprehension runs in one pushed frame, so its targets never
//! leak into (or clobber) the enclosing bindings.

use calc_ir::{Comprehension, Expr, UnsupportedKind};

use super::Interpreter;
use crate::errors::{unsupported_syntax, EvalResult};
use crate::value::{iterate, DictTable, SetTable};
use crate::Value;

/// Element expression(s) and the results accumulated so far.
pub(super) enum Collector<'a> {
    List(&'a Expr, Vec<Value>),
    Set(&'a Expr, SetTable),
    Dict(&'a Expr, &'a Expr, DictTable),
}

impl Collector<'_> {
    fn into_value(self) -> Value {
        match self {
            Collector::List(_, items) => Value::list(items),
            Collector::Set(_, table) => Value::set(table),
            Collector::Dict(_, _, table) => Value::dict(table),
        }
    }
}

impl Interpreter {
    pub(super) fn eval_comprehension(
        &mut self,
        generators: &[Comprehension],
        mut collector: Collector<'_>,
    ) -> EvalResult {
        self.with_env_scope(|scoped| scoped.run_generators(generators, &mut collector))?;
        Ok(collector.into_value())
    }

    fn run_generators(
        &mut self,
        generators: &[Comprehension],
        collector: &mut Collector<'_>,
    ) -> EvalResult<()> {
        let Some((clause, rest)) = generators.split_first() else {
            return self.collect(collector);
        };
        if clause.is_async {
            return Err(unsupported_syntax(UnsupportedKind::AsyncComprehension));
        }
        let iterable = self.eval(&clause.iter)?;
        for item in iterate(&iterable).map_err(|e| e.with_span(clause.iter.span))? {
            self.assign(&clause.target, item)?;
            if self.guards_hold(&clause.ifs)? {
                self.run_generators(rest, collector)?;
            }
        }
        Ok(())
    }

    /// Guards combine with short-circuit AND.
    fn guards_hold(&mut self, guards: &[Expr]) -> EvalResult<bool> {
        for guard in guards {
            if !self.eval(guard)?.is_truthy() {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn collect(&mut self, collector: &mut Collector<'_>) -> EvalResult<()> {
        match collector {
            Collector::List(elt, items) => items.push(self.eval(elt)?),
            Collector::Set(elt, table) => table.add(self.eval(elt)?)?,
            Collector::Dict(key, value, table) => {
                let key = self.eval(key)?;
                let value = self.eval(value)?;
                table.insert(key, value)?;
            }
        }
        Ok(())
    }
}
