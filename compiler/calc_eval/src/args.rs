//! Call arguments and arity checks for built-in callables.

use crate::errors::{type_error, unexpected_keyword, wrong_arg_count, EvalResult};
use crate::Value;

/// Evaluated arguments of one call.
#[derive(Clone, Debug, Default)]
pub struct CallArgs {
    pub positional: Vec<Value>,
    pub keywords: Vec<(String, Value)>,
}

impl CallArgs {
    pub fn new(positional: Vec<Value>) -> Self {
        CallArgs {
            positional,
            keywords: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.positional.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positional.is_empty()
    }

    /// Remove and return a keyword argument.
    pub fn take_keyword(&mut self, name: &str) -> Option<Value> {
        let at = self.keywords.iter().position(|(k, _)| k == name)?;
        Some(self.keywords.remove(at).1)
    }

    /// Fail if any keyword is left over.
    pub fn no_keywords(&self, func: &str) -> EvalResult<()> {
        match self.keywords.first() {
            Some((name, _)) => Err(unexpected_keyword(func, name)),
            None => Ok(()),
        }
    }

    /// Exactly `n` positional arguments and no keywords.
    pub fn exact(self, func: &str, n: usize) -> EvalResult<Vec<Value>> {
        self.no_keywords(func)?;
        if self.positional.len() != n {
            let expected = match n {
                0 => "no arguments".to_string(),
                1 => "exactly one argument".to_string(),
                n => format!("exactly {n} arguments"),
            };
            return Err(wrong_arg_count(func, &expected, self.positional.len()));
        }
        Ok(self.positional)
    }

    /// Between `min` and `max` positional arguments and no keywords.
    pub fn between(self, func: &str, min: usize, max: usize) -> EvalResult<Vec<Value>> {
        self.no_keywords(func)?;
        let given = self.positional.len();
        if given < min {
            return Err(type_error(format!(
                "{func} expected at least {min} argument{}, got {given}",
                if min == 1 { "" } else { "s" }
            )));
        }
        if given > max {
            return Err(type_error(format!(
                "{func} expected at most {max} argument{}, got {given}",
                if max == 1 { "" } else { "s" }
            )));
        }
        Ok(self.positional)
    }

    /// Exactly one positional argument.
    pub fn single(self, func: &str) -> EvalResult<Value> {
        let mut args = self.exact(func, 1)?;
        Ok(args.swap_remove(0))
    }
}

/// Integer argument (`int` or `bool`).
pub fn expect_int(value: &Value) -> EvalResult<i64> {
    value.as_int().ok_or_else(|| {
        type_error(format!(
            "'{}' object cannot be interpreted as an integer",
            value.type_name()
        ))
    })
}

/// String argument.
pub fn expect_str<'a>(func: &str, value: &'a Value) -> EvalResult<&'a str> {
    value.as_str().ok_or_else(|| {
        type_error(format!(
            "{func}() argument must be str, not {}",
            value.type_name()
        ))
    })
}

/// Optional argument at `index`, treating `None` as absent.
pub fn optional(args: &[Value], index: usize) -> Option<&Value> {
    args.get(index).filter(|v| !matches!(v, Value::None))
}
