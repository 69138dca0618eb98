//! Iteration over runtime values.

use super::{RangeValue, Shared, Value};
use crate::errors::{not_iterable, EvalResult};

/// State of a one-shot iterator object.
#[derive(Clone, Debug)]
pub struct IterState {
    /// Type name, e.g. `list_iterator` or `enumerate`.
    pub kind: &'static str,
    items: Vec<Value>,
    pos: usize,
}

impl IterState {
    pub fn new(kind: &'static str, items: Vec<Value>) -> Self {
        IterState {
            kind,
            items,
            pos: 0,
        }
    }

    pub fn next_item(&mut self) -> Option<Value> {
        let item = self.items.get(self.pos)?.clone();
        self.pos += 1;
        Some(item)
    }
}

/// A Rust iterator over a value's elements.
///
/// Lists are read live by position so appends made during a `for` loop are
/// observed. Ranges are produced lazily and iterator objects are advanced in
/// place.
pub enum ValueIter {
    Items(std::vec::IntoIter<Value>),
    List(Shared<Vec<Value>>, usize),
    Range(RangeValue, usize),
    Shared(Shared<IterState>),
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ValueIter::Items(items) => items.next(),
            ValueIter::List(list, pos) => {
                let item = list.borrow().get(*pos).cloned()?;
                *pos += 1;
                Some(item)
            }
            ValueIter::Range(range, pos) => {
                let item = range.get(*pos)?;
                *pos += 1;
                Some(Value::Int(item))
            }
            ValueIter::Shared(state) => state.borrow_mut().next_item(),
        }
    }
}

/// Start iterating `value`, or fail with `NotIterable`.
pub fn iterate(value: &Value) -> EvalResult<ValueIter> {
    let items: Vec<Value> = match value {
        Value::List(list) => return Ok(ValueIter::List(list.clone(), 0)),
        Value::Iterator(state) => return Ok(ValueIter::Shared(state.clone())),
        Value::Range(r) => return Ok(ValueIter::Range(*r, 0)),
        Value::Tuple(items) => items.to_vec(),
        Value::Str(s) => s.chars().map(|c| Value::str(c.to_string())).collect(),
        Value::Bytes(b) => b.iter().map(|&byte| Value::Int(i64::from(byte))).collect(),
        Value::Dict(table) => table.borrow().keys().cloned().collect(),
        Value::Set(table) => table.borrow().keys().cloned().collect(),
        other => return Err(not_iterable(other.type_name())),
    };
    Ok(ValueIter::Items(items.into_iter()))
}

/// Iterator type name produced by `iter()` on a value.
pub(crate) fn iterator_kind(value: &Value) -> &'static str {
    match value {
        Value::List(_) => "list_iterator",
        Value::Tuple(_) => "tuple_iterator",
        Value::Str(_) => "str_iterator",
        Value::Bytes(_) => "bytes_iterator",
        Value::Range(_) => "range_iterator",
        Value::Dict(_) => "dict_keyiterator",
        Value::Set(_) => "set_iterator",
        _ => "iterator",
    }
}
