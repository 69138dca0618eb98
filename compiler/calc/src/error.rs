//! Errors surfaced by [`evaluate`](crate::evaluate).

use calc_eval::EvalError;
use calc_parse::ParseError;
use thiserror::Error;

/// A script that failed to parse or to run.
#[derive(Error, Debug)]
pub enum CalcError {
    #[error("SyntaxError: {rendered}")]
    Parse {
        /// Message with the line and column of the error.
        rendered: String,
        #[source]
        error: ParseError,
    },
    #[error("{}: {}", .0.class_name(), .0)]
    Eval(#[from] EvalError),
}

impl CalcError {
    pub(crate) fn parse(source: &str, error: ParseError) -> Self {
        CalcError::Parse {
            rendered: error.render(source),
            error,
        }
    }

    /// Error class name used by the worker protocol.
    pub fn class_name(&self) -> &'static str {
        match self {
            CalcError::Parse { .. } => "SyntaxError",
            CalcError::Eval(error) => error.class_name(),
        }
    }

    /// The message without the class prefix.
    pub fn message(&self) -> String {
        match self {
            CalcError::Parse { rendered, .. } => rendered.clone(),
            CalcError::Eval(error) => error.to_string(),
        }
    }
}
