//! Attribute access and method dispatch.
//!
//! `get_attribute` checks the capability table first and only then produces
//! a value: a module member, an unbound method, a data property or a bound
//! method. Calling a bound method dispatches on the receiver's type and the
//! member name.

mod collections;
mod numeric;
mod text;

use crate::args::CallArgs;
use crate::builtins::math_member;
use crate::capability::resolve_member;
use crate::errors::{bad_access, bad_access_on, EvalError, EvalResult};
use crate::numeric::decimal_from_i64;
use crate::value::{ModuleId, Value};

/// `value.attr`.
pub fn get_attribute(value: &Value, attr: &str) -> EvalResult {
    let member = resolve_member(value, attr)?;
    match value {
        Value::Module(ModuleId::Math) => math_member(member).ok_or_else(|| bad_access(attr)),
        Value::Type(tag) => Ok(Value::UnboundMethod(*tag, member)),
        _ => Ok(property(value, member).unwrap_or_else(|| Value::method(value.clone(), member))),
    }
}

/// Data attributes that read as values rather than methods.
fn property(value: &Value, member: &str) -> Option<Value> {
    let result = match (value, member) {
        (Value::Int(_) | Value::Bool(_), "real" | "numerator") => {
            Value::Int(value.as_int().unwrap_or(0))
        }
        (Value::Int(_) | Value::Bool(_), "imag") => Value::Int(0),
        (Value::Int(_) | Value::Bool(_), "denominator") => Value::Int(1),
        (Value::Float(f), "real") => Value::Float(*f),
        (Value::Float(_), "imag") => Value::Float(0.0),
        (Value::Decimal(_), "real") => value.clone(),
        (Value::Decimal(_), "imag") => Value::decimal(decimal_from_i64(0)),
        (Value::Range(r), "start") => Value::Int(r.start),
        (Value::Range(r), "stop") => Value::Int(r.stop),
        (Value::Range(r), "step") => Value::Int(r.step),
        (Value::Slice(s), "start") => s.start.clone(),
        (Value::Slice(s), "stop") => s.stop.clone(),
        (Value::Slice(s), "step") => s.step.clone(),
        _ => return None,
    };
    Some(result)
}

/// Invoke a whitelisted method on `receiver`.
pub fn call_method(receiver: &Value, name: &str, args: CallArgs) -> EvalResult {
    tracing::trace!(receiver = receiver.type_name(), method = name, "method call");
    match receiver {
        Value::Int(_) | Value::Bool(_) => numeric::call_int(receiver, name, args),
        Value::Float(f) => numeric::call_float(*f, name, args),
        Value::Decimal(d) => numeric::call_decimal(d, name, args),
        Value::Str(s) => text::call_str(s, name, args),
        Value::Bytes(b) => text::call_bytes(b, name, args),
        Value::List(_) => collections::call_list(receiver, name, args),
        Value::Tuple(items) => collections::call_tuple(items, name, args),
        Value::Dict(_) => collections::call_dict(receiver, name, args),
        Value::Set(_) => collections::call_set(receiver, name, args),
        Value::Range(r) => collections::call_range(*r, name, args),
        _ => Err(no_such_method(name, receiver.type_name())),
    }
}

#[cold]
fn no_such_method(name: &str, type_name: &str) -> EvalError {
    bad_access_on(name, type_name)
}

#[cfg(test)]
mod tests;
