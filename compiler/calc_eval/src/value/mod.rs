//! Runtime values for the calc evaluator.
//!
//! Scalars are stored inline. Mutable containers (`list`, `dict`, `set`) and
//! one-shot iterators live behind [`Shared`] so that aliases observe each
//! other's mutations, as scripts expect. Immutable sequences use `Rc`.

mod iter;
mod repr;
mod table;

pub(crate) use iter::iterator_kind;
pub use iter::{iterate, IterState};
pub use repr::{float_repr, str_repr};
pub use table::{DictTable, SetTable};

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use bigdecimal::{BigDecimal, Zero};

use crate::builtins::Builtin;

/// A single-threaded shared cell for mutable containers.
///
/// All container allocations go through `Shared::new`; identity comparison
/// (`is`) uses [`Shared::ptr_eq`].
#[repr(transparent)]
pub struct Shared<T>(Rc<RefCell<T>>);

impl<T> Shared<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        Shared(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }

    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address used for identity hashing and cycle detection.
    #[inline]
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }
}

impl<T> Clone for Shared<T> {
    #[inline]
    fn clone(&self) -> Self {
        Shared(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for Shared<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Shared").field(&self.0).finish()
    }
}

/// Runtime type tags.
///
/// Used for `type()`-style naming, `isinstance`, constructor dispatch and
/// as the key of the instance and class capability tables.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeTag {
    NoneType,
    Bool,
    Int,
    Float,
    Decimal,
    Str,
    Bytes,
    List,
    Tuple,
    Dict,
    Set,
    Range,
    Slice,
    Ellipsis,
    Iterator,
    BuiltinFunction,
    Type,
    Module,
    Method,
    MethodDescriptor,
}

impl TypeTag {
    /// The type's name as scripts see it.
    pub const fn name(self) -> &'static str {
        match self {
            Self::NoneType => "NoneType",
            Self::Bool => "bool",
            Self::Int => "int",
            Self::Float => "float",
            Self::Decimal => "decimal.Decimal",
            Self::Str => "str",
            Self::Bytes => "bytes",
            Self::List => "list",
            Self::Tuple => "tuple",
            Self::Dict => "dict",
            Self::Set => "set",
            Self::Range => "range",
            Self::Slice => "slice",
            Self::Ellipsis => "ellipsis",
            Self::Iterator => "iterator",
            Self::BuiltinFunction | Self::Method => "builtin_function_or_method",
            Self::Type => "type",
            Self::Module => "module",
            Self::MethodDescriptor => "method_descriptor",
        }
    }

    /// `isinstance` subtyping: `bool` is an `int`.
    pub fn is_subtype_of(self, other: TypeTag) -> bool {
        self == other || (self == TypeTag::Bool && other == TypeTag::Int)
    }
}

/// Modules exposed to scripts.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ModuleId {
    Math,
}

impl ModuleId {
    pub const fn name(self) -> &'static str {
        match self {
            Self::Math => "math",
        }
    }
}

/// `range(start, stop, step)`; `step` is never zero.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct RangeValue {
    pub start: i64,
    pub stop: i64,
    pub step: i64,
}

impl RangeValue {
    pub fn len(&self) -> usize {
        let (start, stop, step) = (
            i128::from(self.start),
            i128::from(self.stop),
            i128::from(self.step),
        );
        let count = if step > 0 && start < stop {
            (stop - start + step - 1) / step
        } else if step < 0 && start > stop {
            (start - stop - step - 1) / -step
        } else {
            0
        };
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Element at a non-negative position, if in range.
    pub fn get(&self, index: usize) -> Option<i64> {
        if index >= self.len() {
            return None;
        }
        let offset = i64::try_from(index).ok()?.checked_mul(self.step)?;
        self.start.checked_add(offset)
    }

    pub fn contains(&self, value: i64) -> bool {
        let in_bounds = if self.step > 0 {
            self.start <= value && value < self.stop
        } else {
            self.stop < value && value <= self.start
        };
        in_bounds && (i128::from(value) - i128::from(self.start)) % i128::from(self.step) == 0
    }
}

/// `slice(start, stop, step)` with arbitrary bound values.
#[derive(Clone, Debug)]
pub struct SliceValue {
    pub start: Value,
    pub stop: Value,
    pub step: Value,
}

/// A whitelisted method looked up on a value.
#[derive(Clone, Debug)]
pub struct BoundMethod {
    pub receiver: Value,
    pub name: &'static str,
}

/// Runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    // Scalars
    None,
    Bool(bool),
    /// Checked 64-bit integer.
    Int(i64),
    Float(f64),
    /// Arbitrary-precision decimal (`decimal.Decimal`).
    Decimal(Rc<BigDecimal>),
    Ellipsis,

    // Immutable sequences
    Str(Rc<str>),
    Bytes(Rc<[u8]>),
    Tuple(Rc<[Value]>),
    Range(RangeValue),
    Slice(Rc<SliceValue>),

    // Mutable containers
    List(Shared<Vec<Value>>),
    Dict(Shared<DictTable>),
    Set(Shared<SetTable>),
    /// One-shot iterator (`iter()`, `enumerate`, `zip`, `map`, ...).
    Iterator(Shared<IterState>),

    // Callables and namespaces
    Builtin(Builtin),
    /// A type object such as `int` or `decimal.Decimal`.
    Type(TypeTag),
    Module(ModuleId),
    /// Method bound to its receiver.
    Method(Rc<BoundMethod>),
    /// Method read off a type object (`str.upper`); the receiver is the
    /// first argument.
    UnboundMethod(TypeTag, &'static str),
}

impl Value {
    // Factory methods

    pub fn str(s: impl Into<Rc<str>>) -> Self {
        Value::Str(s.into())
    }

    pub fn bytes(data: Vec<u8>) -> Self {
        Value::Bytes(data.into())
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(Shared::new(items))
    }

    pub fn tuple(items: Vec<Value>) -> Self {
        Value::Tuple(items.into())
    }

    pub fn dict(table: DictTable) -> Self {
        Value::Dict(Shared::new(table))
    }

    pub fn set(table: SetTable) -> Self {
        Value::Set(Shared::new(table))
    }

    pub fn decimal(d: BigDecimal) -> Self {
        Value::Decimal(Rc::new(d))
    }

    pub fn iterator(kind: &'static str, items: Vec<Value>) -> Self {
        Value::Iterator(Shared::new(IterState::new(kind, items)))
    }

    pub fn method(receiver: Value, name: &'static str) -> Self {
        Value::Method(Rc::new(BoundMethod { receiver, name }))
    }

    // Inspection

    pub fn type_tag(&self) -> TypeTag {
        match self {
            Value::None => TypeTag::NoneType,
            Value::Bool(_) => TypeTag::Bool,
            Value::Int(_) => TypeTag::Int,
            Value::Float(_) => TypeTag::Float,
            Value::Decimal(_) => TypeTag::Decimal,
            Value::Ellipsis => TypeTag::Ellipsis,
            Value::Str(_) => TypeTag::Str,
            Value::Bytes(_) => TypeTag::Bytes,
            Value::Tuple(_) => TypeTag::Tuple,
            Value::Range(_) => TypeTag::Range,
            Value::Slice(_) => TypeTag::Slice,
            Value::List(_) => TypeTag::List,
            Value::Dict(_) => TypeTag::Dict,
            Value::Set(_) => TypeTag::Set,
            Value::Iterator(_) => TypeTag::Iterator,
            Value::Builtin(_) => TypeTag::BuiltinFunction,
            Value::Type(_) => TypeTag::Type,
            Value::Module(_) => TypeTag::Module,
            Value::Method(_) => TypeTag::Method,
            Value::UnboundMethod(..) => TypeTag::MethodDescriptor,
        }
    }

    /// Type name used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Iterator(state) => state.borrow().kind,
            other => other.type_tag().name(),
        }
    }

    /// Truth value testing.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::None => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::Decimal(d) => !d.is_zero(),
            Value::Str(s) => !s.is_empty(),
            Value::Bytes(b) => !b.is_empty(),
            Value::Tuple(items) => !items.is_empty(),
            Value::Range(r) => !r.is_empty(),
            Value::List(items) => !items.borrow().is_empty(),
            Value::Dict(table) => !table.borrow().is_empty(),
            Value::Set(table) => !table.borrow().is_empty(),
            Value::Ellipsis
            | Value::Slice(_)
            | Value::Iterator(_)
            | Value::Builtin(_)
            | Value::Type(_)
            | Value::Module(_)
            | Value::Method(_)
            | Value::UnboundMethod(..) => true,
        }
    }

    /// Integer view of `int` and `bool` values.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(n) => Some(*n),
            Value::Bool(b) => Some(i64::from(*b)),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Identity comparison (`is`): containers by reference, scalars by
    /// type and value.
    pub fn is_identical(&self, other: &Value) -> bool {
        match (self, other) {
            (Value::None, Value::None) | (Value::Ellipsis, Value::Ellipsis) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Decimal(a), Value::Decimal(b)) => Rc::ptr_eq(a, b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::Tuple(a), Value::Tuple(b)) => {
                Rc::ptr_eq(a, b) || (a.is_empty() && b.is_empty())
            }
            (Value::Range(a), Value::Range(b)) => a == b,
            (Value::Slice(a), Value::Slice(b)) => Rc::ptr_eq(a, b),
            (Value::List(a), Value::List(b)) => a.ptr_eq(b),
            (Value::Dict(a), Value::Dict(b)) => a.ptr_eq(b),
            (Value::Set(a), Value::Set(b)) => a.ptr_eq(b),
            (Value::Iterator(a), Value::Iterator(b)) => a.ptr_eq(b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => a == b,
            (Value::Module(a), Value::Module(b)) => a == b,
            (Value::Method(a), Value::Method(b)) => Rc::ptr_eq(a, b),
            (Value::UnboundMethod(ta, na), Value::UnboundMethod(tb, nb)) => ta == tb && na == nb,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_str())
    }
}
