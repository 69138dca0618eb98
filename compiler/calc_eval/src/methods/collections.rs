//! Methods of `list`, `tuple`, `dict`, `set` and `range`.

use super::no_such_method;
use crate::args::{expect_int, CallArgs};
use crate::builtins::sort_values;
use crate::compare::values_equal;
use crate::errors::{index_error, integer_overflow, key_error, value_error, EvalResult};
use crate::value::{iterate, str_repr, DictTable, RangeValue, SetTable, Shared};
use crate::Value;

fn same(a: &Value, b: &Value) -> bool {
    a.is_identical(b) || values_equal(a, b)
}

fn count_of(items: &[Value], needle: &Value) -> Value {
    let n = items.iter().filter(|item| same(item, needle)).count();
    Value::Int(i64::try_from(n).unwrap_or(i64::MAX))
}

/// `seq.index(x[, start[, end]])` over a snapshot of the items.
fn index_of(items: &[Value], args: &[Value], type_name: &str) -> EvalResult {
    let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
    let bound = |at: usize, default: i64| -> EvalResult<usize> {
        let raw = match args.get(at) {
            None | Some(Value::None) => default,
            Some(v) => expect_int(v)?,
        };
        let clamped = if raw < 0 { (raw + len).max(0) } else { raw.min(len) };
        Ok(usize::try_from(clamped).unwrap_or(0))
    };
    let (lo, hi) = (bound(1, 0)?, bound(2, len)?);
    for (i, item) in items.iter().enumerate().take(hi).skip(lo) {
        if same(item, &args[0]) {
            return Ok(Value::Int(i64::try_from(i).unwrap_or(i64::MAX)));
        }
    }
    Err(value_error(format!(
        "{} is not in {type_name}",
        args[0].repr()
    )))
}

/// Resolve a possibly negative position for `insert`/`pop`.
fn position(index: i64, len: usize) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { index + len } else { index };
    usize::try_from(resolved).ok().filter(|i| i64::try_from(*i).is_ok_and(|i| i < len))
}

pub(super) fn call_list(receiver: &Value, name: &str, mut args: CallArgs) -> EvalResult {
    let Value::List(list) = receiver else {
        return Err(no_such_method(name, receiver.type_name()));
    };
    match name {
        "append" => {
            let item = args.single(name)?;
            list.borrow_mut().push(item);
            Ok(Value::None)
        }
        "extend" => {
            let source = args.single(name)?;
            let items: Vec<Value> = iterate(&source)?.collect();
            list.borrow_mut().extend(items);
            Ok(Value::None)
        }
        "insert" => {
            let mut args = args.exact(name, 2)?;
            let item = args.pop().unwrap_or(Value::None);
            let index = expect_int(&args[0])?;
            let mut items = list.borrow_mut();
            let len = i64::try_from(items.len()).unwrap_or(i64::MAX);
            let at = if index < 0 { (index + len).max(0) } else { index.min(len) };
            items.insert(usize::try_from(at).unwrap_or(0), item);
            Ok(Value::None)
        }
        "pop" => {
            let args = args.between(name, 0, 1)?;
            let index = match args.first() {
                Some(v) => expect_int(v)?,
                None => -1,
            };
            let mut items = list.borrow_mut();
            if items.is_empty() {
                return Err(index_error("pop from empty list"));
            }
            let at = position(index, items.len())
                .ok_or_else(|| index_error("pop index out of range"))?;
            Ok(items.remove(at))
        }
        "remove" => {
            let needle = args.single(name)?;
            let snapshot = list.borrow().clone();
            let at = snapshot
                .iter()
                .position(|item| same(item, &needle))
                .ok_or_else(|| value_error("list.remove(x): x not in list"))?;
            list.borrow_mut().remove(at);
            Ok(Value::None)
        }
        "index" => {
            let args = args.between(name, 1, 3)?;
            let snapshot = list.borrow().clone();
            index_of(&snapshot, &args, "list")
        }
        "count" => {
            let needle = args.single(name)?;
            let snapshot = list.borrow().clone();
            Ok(count_of(&snapshot, &needle))
        }
        "sort" => {
            let key = args.take_keyword("key");
            let reverse = args.take_keyword("reverse").is_some_and(|r| r.is_truthy());
            args.exact(name, 0)?;
            let snapshot = list.borrow().clone();
            let sorted = sort_values(snapshot, key.as_ref(), reverse)?;
            *list.borrow_mut() = sorted;
            Ok(Value::None)
        }
        "reverse" => {
            args.exact(name, 0)?;
            list.borrow_mut().reverse();
            Ok(Value::None)
        }
        "copy" => {
            args.exact(name, 0)?;
            Ok(Value::list(list.borrow().clone()))
        }
        "clear" => {
            args.exact(name, 0)?;
            list.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(no_such_method(name, "list")),
    }
}

pub(super) fn call_tuple(items: &[Value], name: &str, args: CallArgs) -> EvalResult {
    match name {
        "index" => index_of(items, &args.between(name, 1, 3)?, "tuple"),
        "count" => Ok(count_of(items, &args.single(name)?)),
        _ => Err(no_such_method(name, "tuple")),
    }
}

fn dict_of(receiver: &Value) -> Option<&Shared<DictTable>> {
    match receiver {
        Value::Dict(table) => Some(table),
        _ => None,
    }
}

/// Merge a mapping or an iterable of pairs into `table`.
fn update_dict(table: &Shared<DictTable>, source: &Value) -> EvalResult<()> {
    let pairs: Vec<(Value, Value)> = match source {
        Value::Dict(other) => other
            .borrow()
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect(),
        other => {
            let mut pairs = Vec::new();
            for (index, element) in iterate(other)?.enumerate() {
                let pair: Vec<Value> = iterate(&element)?.collect();
                let [key, value] = <[Value; 2]>::try_from(pair).map_err(|pair| {
                    value_error(format!(
                        "dictionary update sequence element #{index} has length {}; 2 is required",
                        pair.len()
                    ))
                })?;
                pairs.push((key, value));
            }
            pairs
        }
    };
    let mut table = table.borrow_mut();
    for (key, value) in pairs {
        table.insert(key, value)?;
    }
    Ok(())
}

pub(super) fn call_dict(receiver: &Value, name: &str, mut args: CallArgs) -> EvalResult {
    let Some(table) = dict_of(receiver) else {
        return Err(no_such_method(name, receiver.type_name()));
    };
    match name {
        "keys" => {
            args.exact(name, 0)?;
            Ok(Value::list(table.borrow().keys().cloned().collect()))
        }
        "values" => {
            args.exact(name, 0)?;
            Ok(Value::list(table.borrow().values().cloned().collect()))
        }
        "items" => {
            args.exact(name, 0)?;
            let items = table
                .borrow()
                .iter()
                .map(|(k, v)| Value::tuple(vec![k.clone(), v.clone()]))
                .collect();
            Ok(Value::list(items))
        }
        "get" => {
            let mut args = args.between(name, 1, 2)?;
            let default = if args.len() == 2 {
                args.remove(1)
            } else {
                Value::None
            };
            let found = table.borrow().get(&args[0])?.cloned();
            Ok(found.unwrap_or(default))
        }
        "pop" => {
            let mut args = args.between(name, 1, 2)?;
            let default = (args.len() == 2).then(|| args.remove(1));
            let removed = table.borrow_mut().remove(&args[0])?;
            match (removed, default) {
                (Some((_, value)), _) => Ok(value),
                (None, Some(default)) => Ok(default),
                (None, None) => Err(key_error(args[0].repr())),
            }
        }
        "popitem" => {
            args.exact(name, 0)?;
            let (key, value) = table
                .borrow_mut()
                .pop_last()
                .ok_or_else(|| key_error(str_repr("popitem(): dictionary is empty")))?;
            Ok(Value::tuple(vec![key, value]))
        }
        "setdefault" => {
            let mut args = args.between(name, 1, 2)?;
            let default = if args.len() == 2 {
                args.remove(1)
            } else {
                Value::None
            };
            let key = args.remove(0);
            if let Some(existing) = table.borrow().get(&key)?.cloned() {
                return Ok(existing);
            }
            table.borrow_mut().insert(key, default.clone())?;
            Ok(default)
        }
        "update" => {
            let keywords = std::mem::take(&mut args.keywords);
            let positional = args.between(name, 0, 1)?;
            if let Some(source) = positional.first() {
                update_dict(table, source)?;
            }
            let mut table = table.borrow_mut();
            for (key, value) in keywords {
                table.insert(Value::str(key), value)?;
            }
            Ok(Value::None)
        }
        "copy" => {
            args.exact(name, 0)?;
            Ok(Value::dict(table.borrow().clone()))
        }
        "clear" => {
            args.exact(name, 0)?;
            table.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(no_such_method(name, "dict")),
    }
}

/// Snapshot of an iterable's distinct elements.
fn set_from(value: &Value) -> EvalResult<SetTable> {
    match value {
        Value::Set(table) => Ok(table.borrow().clone()),
        other => SetTable::from_values(iterate(other)?),
    }
}

pub(super) fn call_set(receiver: &Value, name: &str, args: CallArgs) -> EvalResult {
    let Value::Set(set) = receiver else {
        return Err(no_such_method(name, receiver.type_name()));
    };
    match name {
        "add" => {
            let item = args.single(name)?;
            set.borrow_mut().add(item)?;
            Ok(Value::None)
        }
        "remove" => {
            let item = args.single(name)?;
            match set.borrow_mut().remove(&item)? {
                Some(_) => Ok(Value::None),
                None => Err(key_error(item.repr())),
            }
        }
        "discard" => {
            let item = args.single(name)?;
            set.borrow_mut().remove(&item)?;
            Ok(Value::None)
        }
        "pop" => {
            args.exact(name, 0)?;
            set.borrow_mut()
                .pop_first()
                .map(|(item, ())| item)
                .ok_or_else(|| key_error(str_repr("pop from an empty set")))
        }
        "union" | "intersection" | "difference" | "update" => {
            args.no_keywords(name)?;
            let mut result = set.borrow().clone();
            for other in &args.positional {
                let other = set_from(other)?;
                result = match name {
                    "intersection" => {
                        let mut kept = SetTable::new();
                        for item in result.keys() {
                            if other.contains(item)? {
                                kept.add(item.clone())?;
                            }
                        }
                        kept
                    }
                    "difference" => {
                        let mut kept = SetTable::new();
                        for item in result.keys() {
                            if !other.contains(item)? {
                                kept.add(item.clone())?;
                            }
                        }
                        kept
                    }
                    _ => {
                        for item in other.keys() {
                            result.add(item.clone())?;
                        }
                        result
                    }
                };
            }
            if name == "update" {
                *set.borrow_mut() = result;
                return Ok(Value::None);
            }
            Ok(Value::set(result))
        }
        "symmetric_difference" => {
            let other = set_from(&args.single(name)?)?;
            let mine = set.borrow().clone();
            let mut result = SetTable::new();
            for item in mine.keys() {
                if !other.contains(item)? {
                    result.add(item.clone())?;
                }
            }
            for item in other.keys() {
                if !mine.contains(item)? {
                    result.add(item.clone())?;
                }
            }
            Ok(Value::set(result))
        }
        "issubset" | "issuperset" | "isdisjoint" => {
            let other = set_from(&args.single(name)?)?;
            let mine = set.borrow().clone();
            let result = match name {
                "issubset" => all_in(&mine, &other)?,
                "issuperset" => all_in(&other, &mine)?,
                _ => {
                    let mut disjoint = true;
                    for item in mine.keys() {
                        if other.contains(item)? {
                            disjoint = false;
                            break;
                        }
                    }
                    disjoint
                }
            };
            Ok(Value::Bool(result))
        }
        "copy" => {
            args.exact(name, 0)?;
            Ok(Value::set(set.borrow().clone()))
        }
        "clear" => {
            args.exact(name, 0)?;
            set.borrow_mut().clear();
            Ok(Value::None)
        }
        _ => Err(no_such_method(name, "set")),
    }
}

fn all_in(subset: &SetTable, superset: &SetTable) -> EvalResult<bool> {
    for item in subset.keys() {
        if !superset.contains(item)? {
            return Ok(false);
        }
    }
    Ok(true)
}

pub(super) fn call_range(range: RangeValue, name: &str, args: CallArgs) -> EvalResult {
    let needle = args.single(name)?;
    let hit = match needle {
        Value::Int(n) if range.contains(n) => Some(n),
        Value::Bool(b) if range.contains(i64::from(b)) => Some(i64::from(b)),
        _ => None,
    };
    match (name, hit) {
        ("count", hit) => Ok(Value::Int(i64::from(hit.is_some()))),
        ("index", Some(n)) => {
            let offset = (i128::from(n) - i128::from(range.start)) / i128::from(range.step);
            i64::try_from(offset)
                .map(Value::Int)
                .map_err(|_| integer_overflow("range.index"))
        }
        ("index", None) => Err(value_error(format!("{} is not in range", needle.repr()))),
        _ => Err(no_such_method(name, "range")),
    }
}
