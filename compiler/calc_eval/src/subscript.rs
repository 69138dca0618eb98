//! Indexing, slicing, item assignment and item deletion.

use crate::errors::{
    index_error, integer_overflow, key_error, no_item_assignment, no_item_deletion,
    not_subscriptable, type_error, value_error, EvalResult,
};
use crate::value::{iterate, RangeValue, Shared, SliceValue, Value};

/// Normalized `start`, `stop`, `step` of a slice over `len` items.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct SliceBounds {
    start: i64,
    stop: i64,
    step: i64,
}

impl SliceBounds {
    fn resolve(slice: &SliceValue, len: usize) -> EvalResult<Self> {
        let len = i64::try_from(len).map_err(|_| integer_overflow("slice"))?;
        let step = match slice_part(&slice.step)? {
            None => 1,
            Some(0) => return Err(value_error("slice step cannot be zero")),
            Some(step) => step,
        };
        let clamp = |bound: Option<i64>, default: i64| -> i64 {
            let Some(mut index) = bound else {
                return default;
            };
            if index < 0 {
                index = index.saturating_add(len);
                if index < 0 {
                    index = if step < 0 { -1 } else { 0 };
                }
            } else if index >= len {
                index = if step < 0 { len - 1 } else { len };
            }
            index
        };
        let (default_start, default_stop) = if step < 0 { (len - 1, -1) } else { (0, len) };
        Ok(SliceBounds {
            start: clamp(slice_part(&slice.start)?, default_start),
            stop: clamp(slice_part(&slice.stop)?, default_stop),
            step,
        })
    }

    /// Selected positions, in slice order.
    fn positions(self) -> Vec<usize> {
        let mut out = Vec::new();
        let mut i = self.start;
        while (self.step > 0 && i < self.stop) || (self.step < 0 && i > self.stop) {
            out.extend(usize::try_from(i).ok());
            match i.checked_add(self.step) {
                Some(next) => i = next,
                None => break,
            }
        }
        out
    }
}

fn slice_part(value: &Value) -> EvalResult<Option<i64>> {
    match value {
        Value::None => Ok(None),
        other => other.as_int().map(Some).ok_or_else(|| {
            type_error("slice indices must be integers or None or have an __index__ method")
        }),
    }
}

/// Position of `index` in a sequence of `len` items, negative from the end.
fn resolve_index(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index.checked_add(len)? } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Integer key of a sequence subscript.
fn int_key(key: &Value, what: &str) -> EvalResult<i64> {
    key.as_int().ok_or_else(|| {
        type_error(format!(
            "{what} indices must be integers or slices, not {}",
            key.type_name()
        ))
    })
}

fn take<T: Clone>(items: &[T], positions: &[usize]) -> Vec<T> {
    positions.iter().filter_map(|&i| items.get(i).cloned()).collect()
}

/// `container[key]`.
pub fn get_item(container: &Value, key: &Value) -> EvalResult {
    match (container, key) {
        (Value::Dict(table), _) => table
            .borrow()
            .get(key)?
            .cloned()
            .ok_or_else(|| key_error(key.repr())),

        (Value::List(items), Value::Slice(slice)) => {
            let items = items.borrow();
            let positions = SliceBounds::resolve(slice, items.len())?.positions();
            Ok(Value::list(take(&items, &positions)))
        }
        (Value::List(items), _) => {
            let items = items.borrow();
            resolve_index(int_key(key, "list")?, items.len())
                .map(|i| items[i].clone())
                .ok_or_else(|| index_error("list index out of range"))
        }

        (Value::Tuple(items), Value::Slice(slice)) => {
            let positions = SliceBounds::resolve(slice, items.len())?.positions();
            Ok(Value::tuple(take(items, &positions)))
        }
        (Value::Tuple(items), _) => resolve_index(int_key(key, "tuple")?, items.len())
            .map(|i| items[i].clone())
            .ok_or_else(|| index_error("tuple index out of range")),

        (Value::Str(s), Value::Slice(slice)) => {
            let chars: Vec<char> = s.chars().collect();
            let positions = SliceBounds::resolve(slice, chars.len())?.positions();
            Ok(Value::str(take(&chars, &positions).into_iter().collect::<String>()))
        }
        (Value::Str(s), _) => {
            let index = key.as_int().ok_or_else(|| {
                type_error(format!(
                    "string indices must be integers, not '{}'",
                    key.type_name()
                ))
            })?;
            let len = s.chars().count();
            resolve_index(index, len)
                .and_then(|i| s.chars().nth(i))
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(|| index_error("string index out of range"))
        }

        (Value::Bytes(data), Value::Slice(slice)) => {
            let positions = SliceBounds::resolve(slice, data.len())?.positions();
            Ok(Value::bytes(take(data, &positions)))
        }
        (Value::Bytes(data), _) => resolve_index(int_key(key, "byte")?, data.len())
            .map(|i| Value::Int(i64::from(data[i])))
            .ok_or_else(|| index_error("index out of range")),

        (Value::Range(range), Value::Slice(slice)) => slice_range(*range, slice),
        (Value::Range(range), _) => resolve_index(int_key(key, "range")?, range.len())
            .and_then(|i| range.get(i))
            .map(Value::Int)
            .ok_or_else(|| index_error("range object index out of range")),

        _ => Err(not_subscriptable(container.type_name())),
    }
}

fn slice_range(range: RangeValue, slice: &SliceValue) -> EvalResult {
    let bounds = SliceBounds::resolve(slice, range.len())?;
    let at = |offset: i64| {
        offset
            .checked_mul(range.step)
            .and_then(|o| range.start.checked_add(o))
            .ok_or_else(|| integer_overflow("range slicing"))
    };
    let step = range
        .step
        .checked_mul(bounds.step)
        .ok_or_else(|| integer_overflow("range slicing"))?;
    Ok(Value::Range(RangeValue {
        start: at(bounds.start)?,
        stop: at(bounds.stop)?,
        step,
    }))
}

/// `container[key] = value`.
pub fn set_item(container: &Value, key: &Value, value: Value) -> EvalResult<()> {
    match (container, key) {
        (Value::Dict(table), _) => {
            table.borrow_mut().insert(key.clone(), value)?;
            Ok(())
        }
        (Value::List(items), Value::Slice(slice)) => assign_slice(items, slice, &value),
        (Value::List(items), _) => {
            let index = int_key(key, "list")?;
            let mut items = items.borrow_mut();
            let at = resolve_index(index, items.len())
                .ok_or_else(|| index_error("list assignment index out of range"))?;
            items[at] = value;
            Ok(())
        }
        _ => Err(no_item_assignment(container.type_name())),
    }
}

fn assign_slice(items: &Shared<Vec<Value>>, slice: &SliceValue, value: &Value) -> EvalResult<()> {
    // Collect first: the source may be the list itself.
    let replacement: Vec<Value> = match value {
        Value::List(source) if source.ptr_eq(items) => source.borrow().clone(),
        other => iterate(other)
            .map_err(|_| type_error("can only assign an iterable"))?
            .collect(),
    };
    let len = items.borrow().len();
    let bounds = SliceBounds::resolve(slice, len)?;
    if bounds.step == 1 {
        let start = usize::try_from(bounds.start.max(0)).unwrap_or(0);
        let stop = usize::try_from(bounds.stop.max(bounds.start).max(0)).unwrap_or(start);
        items.borrow_mut().splice(start..stop, replacement);
        return Ok(());
    }
    let positions = bounds.positions();
    if positions.len() != replacement.len() {
        return Err(value_error(format!(
            "attempt to assign sequence of size {} to extended slice of size {}",
            replacement.len(),
            positions.len()
        )));
    }
    let mut list = items.borrow_mut();
    for (at, item) in positions.into_iter().zip(replacement) {
        list[at] = item;
    }
    Ok(())
}

/// `del container[key]`.
pub fn del_item(container: &Value, key: &Value) -> EvalResult<()> {
    match container {
        Value::Dict(table) => match table.borrow_mut().remove(key)? {
            Some(_) => Ok(()),
            None => Err(key_error(key.repr())),
        },
        Value::List(items) => {
            let index = int_key(key, "list")?;
            let mut items = items.borrow_mut();
            let at = resolve_index(index, items.len())
                .ok_or_else(|| index_error("list assignment index out of range"))?;
            items.remove(at);
            Ok(())
        }
        _ => Err(no_item_deletion(container.type_name())),
    }
}
