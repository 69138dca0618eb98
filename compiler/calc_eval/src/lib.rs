//! Calc Eval - sandboxed tree-walking evaluator for calculator scripts.
//!
//! # Architecture
//!
//! The evaluator uses:
//! - `ScopeStack`: binding frames over a read-only table of global names
//! - `evaluate_binary` / `evaluate_unary`: enum-based operator dispatch,
//!   including the exact-mode decimal promotion
//! - `capability`: the static allow-list every `value.attr` is checked
//!   against before a member is produced
//! - `builtins` and `methods`: the callable surface scripts can reach
//! - `Interpreter`: statement execution with the pending-interrupt slot for
//!   `break`/`continue`
//!
//! Every failure is an `EvalError` built through the factories in
//! [`errors`].

mod args;
mod builtins;
mod capability;
mod compare;
mod environment;
pub mod errors;
mod format;
pub mod interpreter;
mod methods;
mod numeric;
mod operators;
mod subscript;
mod unary_operators;
mod value;

pub use args::CallArgs;
pub use builtins::{Builtin, MathFn};
pub use environment::ScopeStack;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interpreter::{Interpreter, LoopInterrupt, Outcome, ScopedInterpreter};
pub use numeric::{decimal_from_str, decimal_to_string};
pub use value::{
    BoundMethod, DictTable, IterState, ModuleId, RangeValue, SetTable, Shared, SliceValue, TypeTag,
    Value,
};
