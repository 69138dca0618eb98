//! Centralized error types and constructors for the evaluator.
//!
//! `EvalErrorKind` carries the structured data of every failure; its
//! `Display` impl renders the deterministic message. Factory functions are
//! the single construction point so messages stay in one place.
//!
//! # Usage
//!
//! ```ignore
//! use calc_eval::errors::{name_not_found, division_by_zero};
//! ```

use std::fmt;

use calc_ir::{Span, UnsupportedKind};

use crate::Value;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Which statement rejected an assignment or deletion target.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TargetContext {
    Assign,
    AugAssign,
    Delete,
}

/// Typed error category.
///
/// Each variant carries the data needed to render its message: offending
/// node kind, value type, attribute name, expected vs. given arity.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EvalErrorKind {
    // Rejected syntax
    UnsupportedSyntax {
        kind: UnsupportedKind,
    },
    UnsupportedAsyncSyntax {
        kind: UnsupportedKind,
    },
    UnsupportedLiteralType {
        type_name: &'static str,
    },
    BadTarget {
        target: &'static str,
        context: TargetContext,
    },

    // Names and access
    NameNotFound {
        name: String,
    },
    BadAccess {
        attr: String,
        type_name: Option<String>,
    },

    // Iteration, subscripts, calls
    NotIterable {
        type_name: String,
    },
    NotSubscriptable {
        type_name: String,
    },
    NotCallable {
        type_name: String,
    },
    KeywordArgumentMustBeIdentifier,
    UnpackArityMismatch {
        expected: usize,
        /// `None` when the value had more elements than targets.
        got: Option<usize>,
    },

    // Arithmetic
    DivisionByZero {
        message: &'static str,
    },
    IntegerOverflow {
        operation: &'static str,
    },
    UnsupportedOperand {
        op: String,
        left: String,
        right: String,
    },
    Unorderable {
        op: &'static str,
        left: String,
        right: String,
    },
    BadUnaryOperand {
        op: &'static str,
        type_name: String,
    },
    Overflow {
        message: String,
    },

    // Runtime failures raised by built-in functions and methods
    TypeError {
        message: String,
    },
    ValueError {
        message: String,
    },
    IndexError {
        message: String,
    },
    /// Missing mapping key; holds the key's repr.
    KeyError {
        key: String,
    },
    StopIteration,
}

impl EvalErrorKind {
    /// Exception class reported to callers outside the evaluator.
    pub fn class_name(&self) -> &'static str {
        match self {
            Self::UnsupportedSyntax { .. }
            | Self::UnsupportedAsyncSyntax { .. }
            | Self::UnsupportedLiteralType { .. }
            | Self::BadTarget { .. } => "SyntaxError",
            Self::NameNotFound { .. } => "NameError",
            Self::BadAccess { .. } => "AttributeError",
            Self::NotIterable { .. }
            | Self::NotSubscriptable { .. }
            | Self::NotCallable { .. }
            | Self::KeywordArgumentMustBeIdentifier
            | Self::UnsupportedOperand { .. }
            | Self::Unorderable { .. }
            | Self::BadUnaryOperand { .. }
            | Self::TypeError { .. } => "TypeError",
            Self::UnpackArityMismatch { .. } | Self::ValueError { .. } => "ValueError",
            Self::DivisionByZero { .. } => "ZeroDivisionError",
            Self::IntegerOverflow { .. } | Self::Overflow { .. } => "OverflowError",
            Self::IndexError { .. } => "IndexError",
            Self::KeyError { .. } => "KeyError",
            Self::StopIteration => "StopIteration",
        }
    }
}

/// Wording used for the asynchronous variants.
fn async_subject(kind: UnsupportedKind) -> &'static str {
    match kind {
        UnsupportedKind::AsyncFunctionDef => "function definition",
        UnsupportedKind::AsyncFor => "for loop",
        UnsupportedKind::AsyncWith => "with statement",
        _ => kind.name(),
    }
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnsupportedSyntax { kind } => write!(f, "{kind} is not supported"),
            Self::UnsupportedAsyncSyntax { kind } => {
                write!(f, "async {} is not supported", async_subject(*kind))
            }
            Self::UnsupportedLiteralType { type_name } => {
                write!(f, "{type_name} literals are not supported")
            }
            Self::BadTarget { target, context } => match context {
                TargetContext::Assign => write!(f, "cannot assign to {target}"),
                TargetContext::Delete => write!(f, "cannot delete {target}"),
                TargetContext::AugAssign => {
                    write!(f, "'{target}' is an illegal expression for augmented assignment")
                }
            },
            Self::NameNotFound { name } => write!(f, "name '{name}' is not defined"),
            Self::BadAccess {
                attr,
                type_name: Some(type_name),
            } => write!(
                f,
                "access to attribute '{attr}' of '{type_name}' object is not allowed"
            ),
            Self::BadAccess {
                attr,
                type_name: None,
            } => write!(f, "access to attribute '{attr}' is not allowed"),
            Self::NotIterable { type_name } => write!(f, "'{type_name}' object is not iterable"),
            Self::NotSubscriptable { type_name } => {
                write!(f, "'{type_name}' object is not subscriptable")
            }
            Self::NotCallable { type_name } => write!(f, "'{type_name}' object is not callable"),
            Self::KeywordArgumentMustBeIdentifier => write!(f, "keywords must be strings"),
            Self::UnpackArityMismatch {
                expected,
                got: Some(got),
            } => write!(
                f,
                "not enough values to unpack (expected {expected}, got {got})"
            ),
            Self::UnpackArityMismatch {
                expected,
                got: None,
            } => write!(f, "too many values to unpack (expected {expected})"),
            Self::DivisionByZero { message } => f.write_str(message),
            Self::IntegerOverflow { operation } => write!(f, "integer overflow in {operation}"),
            Self::UnsupportedOperand { op, left, right } => write!(
                f,
                "unsupported operand type(s) for {op}: '{left}' and '{right}'"
            ),
            Self::Unorderable { op, left, right } => write!(
                f,
                "'{op}' not supported between instances of '{left}' and '{right}'"
            ),
            Self::BadUnaryOperand { op, type_name } => {
                write!(f, "bad operand type for unary {op}: '{type_name}'")
            }
            Self::Overflow { message }
            | Self::TypeError { message }
            | Self::ValueError { message }
            | Self::IndexError { message } => f.write_str(message),
            Self::KeyError { key } => f.write_str(key),
            Self::StopIteration => Ok(()),
        }
    }
}

/// An evaluation failure with the span of the node that raised it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    pub span: Option<Span>,
}

impl EvalError {
    pub fn new(kind: EvalErrorKind) -> Self {
        EvalError { kind, span: None }
    }

    /// Attach a source span unless a more precise one is already set.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    pub fn class_name(&self) -> &'static str {
        self.kind.class_name()
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for EvalError {}

impl From<EvalErrorKind> for EvalError {
    fn from(kind: EvalErrorKind) -> Self {
        EvalError::new(kind)
    }
}

// Rejected Syntax

/// A disallowed node kind, reported with the template matching its family.
#[cold]
pub fn unsupported_syntax(kind: UnsupportedKind) -> EvalError {
    if kind.is_async() {
        EvalError::new(EvalErrorKind::UnsupportedAsyncSyntax { kind })
    } else {
        EvalError::new(EvalErrorKind::UnsupportedSyntax { kind })
    }
}

#[cold]
pub fn unsupported_literal(type_name: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::UnsupportedLiteralType { type_name })
}

#[cold]
pub fn bad_target(target: &'static str, context: TargetContext) -> EvalError {
    EvalError::new(EvalErrorKind::BadTarget { target, context })
}

// Names and Access

#[cold]
pub fn name_not_found(name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NameNotFound {
        name: name.to_string(),
    })
}

/// Attribute denied on a whitelisted subject.
#[cold]
pub fn bad_access(attr: &str) -> EvalError {
    EvalError::new(EvalErrorKind::BadAccess {
        attr: attr.to_string(),
        type_name: None,
    })
}

/// Attribute denied on a value whose type has no whitelist entry.
#[cold]
pub fn bad_access_on(attr: &str, type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::BadAccess {
        attr: attr.to_string(),
        type_name: Some(type_name.to_string()),
    })
}

// Iteration, Subscripts and Calls

#[cold]
pub fn not_iterable(type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NotIterable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_subscriptable(type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NotSubscriptable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn not_callable(type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::NotCallable {
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn keyword_must_be_identifier() -> EvalError {
    EvalError::new(EvalErrorKind::KeywordArgumentMustBeIdentifier)
}

#[cold]
pub fn not_enough_values(expected: usize, got: usize) -> EvalError {
    EvalError::new(EvalErrorKind::UnpackArityMismatch {
        expected,
        got: Some(got),
    })
}

#[cold]
pub fn too_many_values(expected: usize) -> EvalError {
    EvalError::new(EvalErrorKind::UnpackArityMismatch {
        expected,
        got: None,
    })
}

// Arithmetic

/// Division by zero with the operation-specific wording.
#[cold]
pub fn division_by_zero(message: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::DivisionByZero { message })
}

#[cold]
pub fn integer_overflow(operation: &'static str) -> EvalError {
    EvalError::new(EvalErrorKind::IntegerOverflow { operation })
}

#[cold]
pub fn unsupported_operand(op: &str, left: &str, right: &str) -> EvalError {
    EvalError::new(EvalErrorKind::UnsupportedOperand {
        op: op.to_string(),
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn unorderable(op: &'static str, left: &str, right: &str) -> EvalError {
    EvalError::new(EvalErrorKind::Unorderable {
        op,
        left: left.to_string(),
        right: right.to_string(),
    })
}

#[cold]
pub fn bad_unary_operand(op: &'static str, type_name: &str) -> EvalError {
    EvalError::new(EvalErrorKind::BadUnaryOperand {
        op,
        type_name: type_name.to_string(),
    })
}

#[cold]
pub fn overflow(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::Overflow {
        message: message.into(),
    })
}

// Runtime Failures

#[cold]
pub fn type_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::TypeError {
        message: message.into(),
    })
}

#[cold]
pub fn value_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::ValueError {
        message: message.into(),
    })
}

#[cold]
pub fn index_error(message: impl Into<String>) -> EvalError {
    EvalError::new(EvalErrorKind::IndexError {
        message: message.into(),
    })
}

#[cold]
pub fn key_error(key_repr: String) -> EvalError {
    EvalError::new(EvalErrorKind::KeyError { key: key_repr })
}

#[cold]
pub fn stop_iteration() -> EvalError {
    EvalError::new(EvalErrorKind::StopIteration)
}

/// `unhashable type: 'list'`.
#[cold]
pub fn unhashable(type_name: &str) -> EvalError {
    type_error(format!("unhashable type: '{type_name}'"))
}

/// `len() takes exactly one argument (2 given)`.
#[cold]
pub fn wrong_arg_count(func: &str, expected: &str, given: usize) -> EvalError {
    type_error(format!("{func}() takes {expected} ({given} given)"))
}

/// `'str' object does not support item assignment`.
#[cold]
pub fn no_item_assignment(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object does not support item assignment"))
}

/// `'tuple' object doesn't support item deletion`.
#[cold]
pub fn no_item_deletion(type_name: &str) -> EvalError {
    type_error(format!("'{type_name}' object doesn't support item deletion"))
}

/// `foo() got an unexpected keyword argument 'x'`.
#[cold]
pub fn unexpected_keyword(func: &str, name: &str) -> EvalError {
    type_error(format!("{func}() got an unexpected keyword argument '{name}'"))
}

#[cfg(test)]
mod tests;
