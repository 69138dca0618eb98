//! Call expressions: callee, then positional arguments with `*`
//! expansion, then keyword arguments with `**` expansion.

use calc_ir::{Expr, Keyword};

use super::Interpreter;
use crate::args::CallArgs;
use crate::builtins::call_value;
use crate::errors::{keyword_must_be_identifier, type_error, EvalResult};
use crate::Value;

impl Interpreter {
    pub(crate) fn eval_call(
        &mut self,
        func: &Expr,
        args: &[Expr],
        keywords: &[Keyword],
    ) -> EvalResult {
        let callee = self.eval(func)?;
        let mut call_args = CallArgs::new(self.eval_elements(args)?);
        for keyword in keywords {
            self.eval_keyword(keyword, &mut call_args)
                .map_err(|e| e.with_span(keyword.span))?;
        }
        tracing::trace!(
            callee = callee.type_name(),
            positional = call_args.len(),
            keywords = call_args.keywords.len(),
            "call"
        );
        call_value(&callee, call_args)
    }

    fn eval_keyword(&mut self, keyword: &Keyword, call_args: &mut CallArgs) -> EvalResult<()> {
        let value = self.eval(&keyword.value)?;
        if let Some(name) = &keyword.arg {
            return push_keyword(call_args, name.clone(), value);
        }
        let Value::Dict(table) = &value else {
            return Err(type_error(format!(
                "argument after ** must be a mapping, not {}",
                value.type_name()
            )));
        };
        let entries: Vec<(Value, Value)> = table
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        for (key, value) in entries {
            let Value::Str(name) = key else {
                return Err(keyword_must_be_identifier());
            };
            push_keyword(call_args, name.to_string(), value)?;
        }
        Ok(())
    }
}

fn push_keyword(call_args: &mut CallArgs, name: String, value: Value) -> EvalResult<()> {
    if call_args.keywords.iter().any(|(existing, _)| *existing == name) {
        return Err(type_error(format!(
            "got multiple values for keyword argument '{name}'"
        )));
    }
    call_args.keywords.push((name, value));
    Ok(())
}
