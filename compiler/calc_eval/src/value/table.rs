//! Insertion-ordered hash tables backing `dict` and `set`.
//!
//! Keys are normalized into [`HashKey`] so that equal numbers of different
//! types (`1`, `1.0`, `True`, `Decimal(1)`) land on the same entry.

use std::rc::Rc;

use bigdecimal::BigDecimal;
use rustc_hash::FxHashMap;

use super::{TypeTag, Value};
use crate::builtins::Builtin;
use crate::errors::{unhashable, EvalResult};
use crate::numeric;
use crate::value::ModuleId;

/// Normalized hash key.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum HashKey {
    None,
    Ellipsis,
    /// Every integral number, whatever its runtime type.
    Int(i64),
    /// Non-finite float, by bit pattern.
    Float(u64),
    /// Any other number: non-integral or out of `i64` range, by the
    /// normalized text of its decimal value.
    Decimal(String),
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    Tuple(Vec<HashKey>),
    /// Length, then the first element and step where they matter.
    Range(usize, i64, i64),
    Type(TypeTag),
    Builtin(Builtin),
    Module(ModuleId),
    /// Iterators and methods hash by identity.
    Identity(usize),
}

impl HashKey {
    pub fn from_value(value: &Value) -> EvalResult<HashKey> {
        Ok(match value {
            Value::None => HashKey::None,
            Value::Ellipsis => HashKey::Ellipsis,
            Value::Bool(b) => HashKey::Int(i64::from(*b)),
            Value::Int(n) => HashKey::Int(*n),
            Value::Float(f) => float_key(*f),
            Value::Decimal(d) => decimal_key(d),
            Value::Str(s) => HashKey::Str(Rc::clone(s)),
            Value::Bytes(b) => HashKey::Bytes(Rc::clone(b)),
            Value::Tuple(items) => HashKey::Tuple(
                items
                    .iter()
                    .map(HashKey::from_value)
                    .collect::<EvalResult<_>>()?,
            ),
            Value::Range(r) => match r.len() {
                0 => HashKey::Range(0, 0, 0),
                1 => HashKey::Range(1, r.start, 0),
                len => HashKey::Range(len, r.start, r.step),
            },
            Value::Type(tag) => HashKey::Type(*tag),
            Value::Builtin(b) => HashKey::Builtin(*b),
            Value::Module(m) => HashKey::Module(*m),
            Value::Iterator(state) => HashKey::Identity(state.addr()),
            Value::Method(m) => HashKey::Identity(Rc::as_ptr(m).cast::<()>() as usize),
            Value::UnboundMethod(tag, name) => {
                HashKey::Tuple(vec![HashKey::Type(*tag), HashKey::Str(Rc::from(*name))])
            }
            Value::List(_) | Value::Dict(_) | Value::Set(_) | Value::Slice(_) => {
                return Err(unhashable(value.type_name()))
            }
        })
    }
}

/// Floats key the way they compare with decimals: through their shortest
/// round-trip digits.
#[expect(
    clippy::cast_possible_truncation,
    reason = "integral floats inside the i64 range convert exactly"
)]
fn float_key(f: f64) -> HashKey {
    // -2^63 is exact; 2^63 is the first value past i64::MAX.
    if f.fract() == 0.0 && f >= -9_223_372_036_854_775_808.0 && f < 9_223_372_036_854_775_808.0 {
        return HashKey::Int(f as i64);
    }
    match numeric::decimal_from_f64(f) {
        Ok(d) => decimal_key(&d),
        Err(_) => HashKey::Float(f.to_bits()),
    }
}

fn decimal_key(d: &BigDecimal) -> HashKey {
    match numeric::decimal_to_i64(d) {
        Some(n) if numeric::decimal_is_integral(d) => HashKey::Int(n),
        _ => HashKey::Decimal(numeric::decimal_to_string(&numeric::normalize(d))),
    }
}

/// An insertion-ordered table; the first inserted key object is kept when a
/// later equal key updates the entry.
#[derive(Clone, Debug)]
pub struct OrderedTable<V> {
    entries: Vec<(Value, V)>,
    index: FxHashMap<HashKey, usize>,
}

/// `dict` storage.
pub type DictTable = OrderedTable<Value>;

/// `set` storage.
pub type SetTable = OrderedTable<()>;

impl<V> Default for OrderedTable<V> {
    fn default() -> Self {
        OrderedTable {
            entries: Vec::new(),
            index: FxHashMap::default(),
        }
    }
}

impl<V> OrderedTable<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or update; returns the previous value for the key.
    pub fn insert(&mut self, key: Value, value: V) -> EvalResult<Option<V>> {
        let hash = HashKey::from_value(&key)?;
        if let Some(&i) = self.index.get(&hash) {
            return Ok(Some(std::mem::replace(&mut self.entries[i].1, value)));
        }
        self.index.insert(hash, self.entries.len());
        self.entries.push((key, value));
        Ok(None)
    }

    pub fn get(&self, key: &Value) -> EvalResult<Option<&V>> {
        let hash = HashKey::from_value(key)?;
        Ok(self.index.get(&hash).map(|&i| &self.entries[i].1))
    }

    pub fn contains(&self, key: &Value) -> EvalResult<bool> {
        let hash = HashKey::from_value(key)?;
        Ok(self.index.contains_key(&hash))
    }

    /// Remove a key, returning the stored key object and value.
    pub fn remove(&mut self, key: &Value) -> EvalResult<Option<(Value, V)>> {
        let hash = HashKey::from_value(key)?;
        let Some(i) = self.index.remove(&hash) else {
            return Ok(None);
        };
        let entry = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Ok(Some(entry))
    }

    /// Remove the most recently inserted entry.
    pub fn pop_last(&mut self) -> Option<(Value, V)> {
        let (key, value) = self.entries.pop()?;
        if let Ok(hash) = HashKey::from_value(&key) {
            self.index.remove(&hash);
        }
        Some((key, value))
    }

    /// Remove the oldest entry.
    pub fn pop_first(&mut self) -> Option<(Value, V)> {
        let key = self.entries.first()?.0.clone();
        self.remove(&key).ok().flatten()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&Value, &V)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &Value> {
        self.entries.iter().map(|(k, _)| k)
    }
}

impl OrderedTable<Value> {
    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (Value, Value)>) -> EvalResult<Self> {
        let mut table = Self::new();
        for (k, v) in pairs {
            table.insert(k, v)?;
        }
        Ok(table)
    }
}

impl OrderedTable<()> {
    pub fn add(&mut self, key: Value) -> EvalResult<()> {
        self.insert(key, ()).map(|_| ())
    }

    pub fn from_values(values: impl IntoIterator<Item = Value>) -> EvalResult<Self> {
        let mut table = Self::new();
        for v in values {
            table.add(v)?;
        }
        Ok(table)
    }
}
