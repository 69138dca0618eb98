//! Global names and the built-in functions behind them.
//!
//! The global table is the read-only underlay of the scope stack: plain
//! functions, type constructors, the `math` module and a few constants.
//! Every callable value is invoked through [`call_value`], which needs no
//! interpreter state.

mod constructors;
mod math;

use bigdecimal::RoundingMode;

pub use math::MathFn;
pub(crate) use constructors::decode;
pub(crate) use math::member as math_member;

use crate::args::{expect_int, CallArgs};
use crate::compare::less_than;
use crate::errors::{
    integer_overflow, not_callable, overflow, stop_iteration, type_error, value_error, EvalResult,
};
use crate::format::format_value;
use crate::methods;
use crate::numeric::{decimal_to_i64, f64_to_i64};
use crate::operators::{evaluate_binary, floor_mod};
use crate::value::{iterate, iterator_kind, ModuleId, TypeTag, Value};
use calc_ir::BinaryOp;

/// Built-in functions.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Builtin {
    Abs,
    All,
    Any,
    Bin,
    Chr,
    Divmod,
    Enumerate,
    Filter,
    Format,
    Hex,
    Isinstance,
    Iter,
    Len,
    Map,
    Max,
    Min,
    Next,
    Oct,
    Ord,
    Pow,
    Repr,
    Reversed,
    Round,
    Sorted,
    Sum,
    Zip,
    /// A function of the `math` module.
    Math(MathFn),
}

const FUNCTIONS: &[Builtin] = &[
    Builtin::Abs,
    Builtin::All,
    Builtin::Any,
    Builtin::Bin,
    Builtin::Chr,
    Builtin::Divmod,
    Builtin::Enumerate,
    Builtin::Filter,
    Builtin::Format,
    Builtin::Hex,
    Builtin::Isinstance,
    Builtin::Iter,
    Builtin::Len,
    Builtin::Map,
    Builtin::Max,
    Builtin::Min,
    Builtin::Next,
    Builtin::Oct,
    Builtin::Ord,
    Builtin::Pow,
    Builtin::Repr,
    Builtin::Reversed,
    Builtin::Round,
    Builtin::Sorted,
    Builtin::Sum,
    Builtin::Zip,
];

const TYPES: &[(&str, TypeTag)] = &[
    ("bool", TypeTag::Bool),
    ("int", TypeTag::Int),
    ("float", TypeTag::Float),
    ("str", TypeTag::Str),
    ("bytes", TypeTag::Bytes),
    ("list", TypeTag::List),
    ("tuple", TypeTag::Tuple),
    ("dict", TypeTag::Dict),
    ("set", TypeTag::Set),
    ("range", TypeTag::Range),
    ("slice", TypeTag::Slice),
    ("Decimal", TypeTag::Decimal),
];

impl Builtin {
    pub fn name(self) -> &'static str {
        match self {
            Self::Abs => "abs",
            Self::All => "all",
            Self::Any => "any",
            Self::Bin => "bin",
            Self::Chr => "chr",
            Self::Divmod => "divmod",
            Self::Enumerate => "enumerate",
            Self::Filter => "filter",
            Self::Format => "format",
            Self::Hex => "hex",
            Self::Isinstance => "isinstance",
            Self::Iter => "iter",
            Self::Len => "len",
            Self::Map => "map",
            Self::Max => "max",
            Self::Min => "min",
            Self::Next => "next",
            Self::Oct => "oct",
            Self::Ord => "ord",
            Self::Pow => "pow",
            Self::Repr => "repr",
            Self::Reversed => "reversed",
            Self::Round => "round",
            Self::Sorted => "sorted",
            Self::Sum => "sum",
            Self::Zip => "zip",
            Self::Math(f) => f.name(),
        }
    }
}

/// Resolve a global name.
pub fn lookup_global(name: &str) -> Option<Value> {
    if let Some(b) = FUNCTIONS.iter().find(|b| b.name() == name) {
        return Some(Value::Builtin(*b));
    }
    if let Some((_, tag)) = TYPES.iter().find(|(n, _)| *n == name) {
        return Some(Value::Type(*tag));
    }
    match name {
        "math" => Some(Value::Module(ModuleId::Math)),
        "pi" | "e" | "tau" | "inf" | "nan" => math::constant(name),
        _ => None,
    }
}

/// Invoke any callable value.
pub fn call_value(callee: &Value, args: CallArgs) -> EvalResult {
    match callee {
        Value::Builtin(b) => call_builtin(*b, args),
        Value::Type(tag) => constructors::construct(*tag, args),
        Value::Method(m) => methods::call_method(&m.receiver, m.name, args),
        Value::UnboundMethod(tag, name) => call_unbound(*tag, name, args),
        other => Err(not_callable(other.type_name())),
    }
}

/// Call a member read off a type object.
fn call_unbound(tag: TypeTag, name: &'static str, mut args: CallArgs) -> EvalResult {
    match (tag, name) {
        (TypeTag::Float, "fromhex") => constructors::float_fromhex(args),
        (TypeTag::Dict, "fromkeys") => constructors::dict_fromkeys(args),
        _ => {
            if args.positional.is_empty() {
                return Err(type_error(format!(
                    "unbound method {}.{name}() needs an argument",
                    tag.name()
                )));
            }
            let receiver = args.positional.remove(0);
            if !receiver.type_tag().is_subtype_of(tag) {
                return Err(type_error(format!(
                    "descriptor '{name}' for '{}' objects doesn't apply to a '{}' object",
                    tag.name(),
                    receiver.type_name()
                )));
            }
            methods::call_method(&receiver, name, args)
        }
    }
}

/// Call a one-argument callable.
pub(crate) fn call1(func: &Value, arg: Value) -> EvalResult {
    call_value(func, CallArgs::new(vec![arg]))
}

fn call_builtin(builtin: Builtin, mut args: CallArgs) -> EvalResult {
    let name = builtin.name();
    match builtin {
        Builtin::Abs => abs(&args.single(name)?),
        Builtin::All => {
            for item in iterate(&args.single(name)?)? {
                if !item.is_truthy() {
                    return Ok(Value::Bool(false));
                }
            }
            Ok(Value::Bool(true))
        }
        Builtin::Any => {
            for item in iterate(&args.single(name)?)? {
                if item.is_truthy() {
                    return Ok(Value::Bool(true));
                }
            }
            Ok(Value::Bool(false))
        }
        Builtin::Bin => int_to_radix(&args.single(name)?, 2, "0b"),
        Builtin::Oct => int_to_radix(&args.single(name)?, 8, "0o"),
        Builtin::Hex => int_to_radix(&args.single(name)?, 16, "0x"),
        Builtin::Chr => {
            let code = expect_int(&args.single(name)?)?;
            u32::try_from(code)
                .ok()
                .and_then(char::from_u32)
                .map(|c| Value::str(c.to_string()))
                .ok_or_else(|| value_error("chr() arg not in range(0x110000)"))
        }
        Builtin::Ord => ord(&args.single(name)?),
        Builtin::Divmod => {
            let [a, b] = exact2(args.exact(name, 2)?);
            let q = evaluate_binary(&a, &b, BinaryOp::FloorDiv)?;
            let r = evaluate_binary(&a, &b, BinaryOp::Mod)?;
            Ok(Value::tuple(vec![q, r]))
        }
        Builtin::Enumerate => {
            let start = args.take_keyword("start");
            let mut positional = args.between(name, 1, 2)?;
            let start = match start.or_else(|| positional.get(1).cloned()) {
                Some(v) => expect_int(&v)?,
                None => 0,
            };
            let iterable = positional.swap_remove(0);
            let mut items = Vec::new();
            for (offset, item) in iterate(&iterable)?.enumerate() {
                let offset = i64::try_from(offset).map_err(|_| integer_overflow("enumerate"))?;
                let index = start
                    .checked_add(offset)
                    .ok_or_else(|| integer_overflow("enumerate"))?;
                items.push(Value::tuple(vec![Value::Int(index), item]));
            }
            Ok(Value::iterator("enumerate", items))
        }
        Builtin::Filter => {
            let [func, iterable] = exact2(args.exact(name, 2)?);
            let mut items = Vec::new();
            for item in iterate(&iterable)? {
                let keep = match func {
                    Value::None => item.is_truthy(),
                    ref f => call1(f, item.clone())?.is_truthy(),
                };
                if keep {
                    items.push(item);
                }
            }
            Ok(Value::iterator("filter", items))
        }
        Builtin::Format => {
            let positional = args.between(name, 1, 2)?;
            let spec = match positional.get(1) {
                Some(Value::Str(s)) => s.to_string(),
                Some(other) => {
                    return Err(type_error(format!(
                        "format() argument 2 must be str, not {}",
                        other.type_name()
                    )))
                }
                None => String::new(),
            };
            Ok(Value::str(format_value(&positional[0], &spec)?))
        }
        Builtin::Isinstance => {
            let [obj, classinfo] = exact2(args.exact(name, 2)?);
            isinstance(&obj, &classinfo).map(Value::Bool)
        }
        Builtin::Iter => {
            let value = args.single(name)?;
            if let Value::Iterator(_) = value {
                return Ok(value);
            }
            let items = iterate(&value)?.collect();
            Ok(Value::iterator(iterator_kind(&value), items))
        }
        Builtin::Len => len(&args.single(name)?),
        Builtin::Map => {
            args.no_keywords(name)?;
            if args.len() < 2 {
                return Err(type_error("map() must have at least two arguments."));
            }
            let mut positional = args.positional;
            let func = positional.remove(0);
            let mut sources = positional
                .iter()
                .map(iterate)
                .collect::<EvalResult<Vec<_>>>()?;
            let mut items = Vec::new();
            'outer: loop {
                let mut call_args = Vec::with_capacity(sources.len());
                for source in &mut sources {
                    match source.next() {
                        Some(v) => call_args.push(v),
                        None => break 'outer,
                    }
                }
                items.push(call_value(&func, CallArgs::new(call_args))?);
            }
            Ok(Value::iterator("map", items))
        }
        Builtin::Max => min_max(args, name, true),
        Builtin::Min => min_max(args, name, false),
        Builtin::Next => {
            let positional = args.between(name, 1, 2)?;
            let Value::Iterator(state) = &positional[0] else {
                return Err(type_error(format!(
                    "'{}' object is not an iterator",
                    positional[0].type_name()
                )));
            };
            let item = state.borrow_mut().next_item();
            match (item, positional.get(1)) {
                (Some(v), _) => Ok(v),
                (None, Some(default)) => Ok(default.clone()),
                (None, None) => Err(stop_iteration()),
            }
        }
        Builtin::Pow => {
            let positional = args.between(name, 2, 3)?;
            match positional.get(2) {
                Some(Value::None) | None => {
                    evaluate_binary(&positional[0], &positional[1], BinaryOp::Pow)
                }
                Some(m) => {
                    let ints = (positional[0].as_int(), positional[1].as_int(), m.as_int());
                    let (Some(base), Some(exp), Some(m)) = ints else {
                        return Err(type_error(
                            "pow() 3rd argument not allowed unless all arguments are integers",
                        ));
                    };
                    mod_pow(base, exp, m).map(Value::Int)
                }
            }
        }
        Builtin::Repr => Ok(Value::str(args.single(name)?.repr())),
        Builtin::Reversed => reversed(&args.single(name)?),
        Builtin::Round => {
            let ndigits = args.take_keyword("ndigits");
            let positional = args.between(name, 1, 2)?;
            let ndigits = ndigits.or_else(|| positional.get(1).cloned());
            round(&positional[0], ndigits.as_ref())
        }
        Builtin::Sorted => {
            let key = args.take_keyword("key");
            let reverse = args.take_keyword("reverse");
            let iterable = args.between(name, 1, 1)?;
            let items: Vec<Value> = iterate(&iterable[0])?.collect();
            let reverse = reverse.is_some_and(|r| r.is_truthy());
            Ok(Value::list(sort_values(items, key.as_ref(), reverse)?))
        }
        Builtin::Sum => {
            let start = args.take_keyword("start");
            let positional = args.between(name, 1, 2)?;
            let mut total = start
                .or_else(|| positional.get(1).cloned())
                .unwrap_or(Value::Int(0));
            if matches!(total, Value::Str(_)) {
                return Err(type_error("sum() can't sum strings [use ''.join(seq) instead]"));
            }
            for item in iterate(&positional[0])? {
                total = evaluate_binary(&total, &item, BinaryOp::Add)?;
            }
            Ok(total)
        }
        Builtin::Zip => {
            args.no_keywords(name)?;
            let mut sources = args
                .positional
                .iter()
                .map(iterate)
                .collect::<EvalResult<Vec<_>>>()?;
            let mut items = Vec::new();
            if !sources.is_empty() {
                'outer: loop {
                    let mut row = Vec::with_capacity(sources.len());
                    for source in &mut sources {
                        match source.next() {
                            Some(v) => row.push(v),
                            None => break 'outer,
                        }
                    }
                    items.push(Value::tuple(row));
                }
            }
            Ok(Value::iterator("zip", items))
        }
        Builtin::Math(f) => f.call(args),
    }
}

fn exact2(mut args: Vec<Value>) -> [Value; 2] {
    let second = args.pop().unwrap_or(Value::None);
    let first = args.pop().unwrap_or(Value::None);
    [first, second]
}

fn abs(value: &Value) -> EvalResult {
    match value {
        Value::Int(n) => n
            .checked_abs()
            .map(Value::Int)
            .ok_or_else(|| integer_overflow("absolute value")),
        Value::Bool(b) => Ok(Value::Int(i64::from(*b))),
        Value::Float(f) => Ok(Value::Float(f.abs())),
        Value::Decimal(d) => Ok(Value::decimal(d.abs())),
        other => Err(type_error(format!(
            "bad operand type for abs(): '{}'",
            other.type_name()
        ))),
    }
}

fn int_to_radix(value: &Value, radix: u32, prefix: &str) -> EvalResult {
    let n = expect_int(value)?;
    let magnitude = n.unsigned_abs();
    let digits = match radix {
        2 => format!("{magnitude:b}"),
        8 => format!("{magnitude:o}"),
        _ => format!("{magnitude:x}"),
    };
    let sign = if n < 0 { "-" } else { "" };
    Ok(Value::str(format!("{sign}{prefix}{digits}")))
}

fn ord(value: &Value) -> EvalResult {
    match value {
        Value::Str(s) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(Value::Int(i64::from(u32::from(c)))),
                _ => Err(type_error(format!(
                    "ord() expected a character, but string of length {} found",
                    s.chars().count()
                ))),
            }
        }
        Value::Bytes(b) if b.len() == 1 => Ok(Value::Int(i64::from(b[0]))),
        Value::Bytes(b) => Err(type_error(format!(
            "ord() expected a character, but string of length {} found",
            b.len()
        ))),
        other => Err(type_error(format!(
            "ord() expected string of length 1, but {} found",
            other.type_name()
        ))),
    }
}

fn len(value: &Value) -> EvalResult {
    let n = match value {
        Value::Str(s) => s.chars().count(),
        Value::Bytes(b) => b.len(),
        Value::List(items) => items.borrow().len(),
        Value::Tuple(items) => items.len(),
        Value::Dict(table) => table.borrow().len(),
        Value::Set(table) => table.borrow().len(),
        Value::Range(r) => r.len(),
        other => {
            return Err(type_error(format!(
                "object of type '{}' has no len()",
                other.type_name()
            )))
        }
    };
    i64::try_from(n)
        .map(Value::Int)
        .map_err(|_| overflow("Python int too large to convert to C ssize_t"))
}

fn isinstance(obj: &Value, classinfo: &Value) -> EvalResult<bool> {
    match classinfo {
        Value::Type(tag) => Ok(obj.type_tag().is_subtype_of(*tag)),
        Value::Tuple(items) => {
            for item in items.iter() {
                if isinstance(obj, item)? {
                    return Ok(true);
                }
            }
            Ok(false)
        }
        _ => Err(type_error(
            "isinstance() arg 2 must be a type, a tuple of types, or a union",
        )),
    }
}

fn reversed(value: &Value) -> EvalResult {
    let (kind, mut items): (&'static str, Vec<Value>) = match value {
        Value::List(_) => ("list_reverseiterator", iterate(value)?.collect()),
        Value::Range(_) => ("range_iterator", iterate(value)?.collect()),
        Value::Dict(_) => ("dict_reversekeyiterator", iterate(value)?.collect()),
        Value::Tuple(_) | Value::Str(_) | Value::Bytes(_) => {
            ("reversed", iterate(value)?.collect())
        }
        other => {
            return Err(type_error(format!(
                "'{}' object is not reversible",
                other.type_name()
            )))
        }
    };
    items.reverse();
    Ok(Value::iterator(kind, items))
}

fn min_max(mut args: CallArgs, name: &str, want_max: bool) -> EvalResult {
    let key = args.take_keyword("key").filter(|k| !matches!(k, Value::None));
    let default = args.take_keyword("default");
    args.no_keywords(name)?;
    let candidates: Vec<Value> = match args.positional.len() {
        0 => {
            return Err(type_error(format!(
                "{name} expected at least 1 argument, got 0"
            )))
        }
        1 => iterate(&args.positional[0])?.collect(),
        _ => {
            if default.is_some() {
                return Err(type_error(format!(
                    "Cannot specify a default for {name}() with multiple positional arguments"
                )));
            }
            args.positional
        }
    };

    let mut best: Option<(Value, Value)> = None;
    for item in candidates {
        let k = match &key {
            Some(f) => call1(f, item.clone())?,
            None => item.clone(),
        };
        let replace = match &best {
            None => true,
            Some((best_key, _)) if want_max => less_than(best_key, &k)?,
            Some((best_key, _)) => less_than(&k, best_key)?,
        };
        if replace {
            best = Some((k, item));
        }
    }
    match (best, default) {
        (Some((_, item)), _) => Ok(item),
        (None, Some(default)) => Ok(default),
        (None, None) => Err(value_error(format!("{name}() arg is an empty sequence"))),
    }
}

/// Stable sort by `key`, using `<` only.
pub(crate) fn sort_values(
    items: Vec<Value>,
    key: Option<&Value>,
    reverse: bool,
) -> EvalResult<Vec<Value>> {
    let key = key.filter(|k| !matches!(k, Value::None));
    let mut keyed = Vec::with_capacity(items.len());
    for item in items {
        let k = match key {
            Some(f) => call1(f, item.clone())?,
            None => item.clone(),
        };
        keyed.push((k, item));
    }
    let sorted = merge_sort(keyed, &mut |a, b| {
        if reverse {
            less_than(b, a)
        } else {
            less_than(a, b)
        }
    })?;
    Ok(sorted.into_iter().map(|(_, item)| item).collect())
}

type Keyed = (Value, Value);

fn merge_sort(
    mut items: Vec<Keyed>,
    less: &mut dyn FnMut(&Value, &Value) -> EvalResult<bool>,
) -> EvalResult<Vec<Keyed>> {
    if items.len() <= 1 {
        return Ok(items);
    }
    let right = items.split_off(items.len() / 2);
    let left = merge_sort(items, less)?;
    let right = merge_sort(right, less)?;

    let mut merged = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    while let (Some(l), Some(r)) = (left.peek(), right.peek()) {
        let take_right = less(&r.0, &l.0)?;
        let next = if take_right { right.next() } else { left.next() };
        merged.extend(next);
    }
    merged.extend(left);
    merged.extend(right);
    Ok(merged)
}

/// `pow(base, exp, m)` for integers.
fn mod_pow(base: i64, exp: i64, m: i64) -> EvalResult<i64> {
    if m == 0 {
        return Err(value_error("pow() 3rd argument cannot be 0"));
    }
    let modulus = i128::from(m).abs();
    let mut base = i128::from(base).rem_euclid(modulus);
    let mut exp = i128::from(exp);
    if exp < 0 {
        base = mod_inverse(base, modulus)
            .ok_or_else(|| value_error("base is not invertible for the given modulus"))?;
        exp = -exp;
    }
    let mut result: i128 = 1 % modulus;
    while exp > 0 {
        if exp & 1 == 1 {
            result = result * base % modulus;
        }
        base = base * base % modulus;
        exp >>= 1;
    }
    if m < 0 && result != 0 {
        result -= modulus;
    }
    i64::try_from(result).map_err(|_| integer_overflow("modular exponentiation"))
}

fn mod_inverse(a: i128, m: i128) -> Option<i128> {
    let (mut old_r, mut r) = (a, m);
    let (mut old_s, mut s) = (1_i128, 0_i128);
    while r != 0 {
        let q = old_r / r;
        (old_r, r) = (r, old_r - q * r);
        (old_s, s) = (s, old_s - q * s);
    }
    (old_r == 1).then(|| old_s.rem_euclid(m))
}

fn round(number: &Value, ndigits: Option<&Value>) -> EvalResult {
    let ndigits = match ndigits {
        None | Some(Value::None) => None,
        Some(v) => Some(expect_int(v)?),
    };
    match (number, ndigits) {
        (Value::Int(_) | Value::Bool(_), None) => Ok(Value::Int(number.as_int().unwrap_or(0))),
        (Value::Int(_) | Value::Bool(_), Some(n)) => {
            let value = number.as_int().unwrap_or(0);
            if n >= 0 {
                return Ok(Value::Int(value));
            }
            let Some(unit) = u32::try_from(-n).ok().and_then(|e| 10_i64.checked_pow(e)) else {
                return Ok(Value::Int(0));
            };
            let floor = value - floor_mod(value, unit).unwrap_or(0);
            let rem = value - floor;
            let half = unit / 2;
            let rounded = if rem > half || (rem == half && (floor / unit) % 2 != 0) {
                floor.checked_add(unit)
            } else {
                Some(floor)
            };
            rounded
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("rounding"))
        }
        (Value::Float(f), None) => f64_to_i64(f.round_ties_even()).map(Value::Int),
        (Value::Float(f), Some(n)) => Ok(Value::Float(round_float(*f, n))),
        (Value::Decimal(d), None) => {
            let rounded = d.with_scale_round(0, RoundingMode::HalfEven);
            decimal_to_i64(&rounded)
                .map(Value::Int)
                .ok_or_else(|| integer_overflow("rounding"))
        }
        (Value::Decimal(d), Some(n)) => {
            Ok(Value::decimal(d.with_scale_round(n, RoundingMode::HalfEven)))
        }
        (other, _) => Err(type_error(format!(
            "type {} doesn't define __round__ method",
            other.type_name()
        ))),
    }
}

fn round_float(f: f64, ndigits: i64) -> f64 {
    if !f.is_finite() {
        return f;
    }
    if ndigits >= 0 {
        if ndigits > 320 {
            return f;
        }
        let precision = usize::try_from(ndigits).unwrap_or(0);
        return format!("{f:.precision$}").parse().unwrap_or(f);
    }
    let exp = i32::try_from(-ndigits).unwrap_or(i32::MAX);
    let unit = 10_f64.powi(exp);
    if unit.is_infinite() {
        return 0.0_f64.copysign(f);
    }
    (f / unit).round_ties_even() * unit
}

#[cfg(test)]
mod tests;
