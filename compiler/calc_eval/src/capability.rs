//! Attribute whitelist.
//!
//! Every attribute read goes through [`resolve_member`]. A subject is a
//! module (matched by identity), a type object, or the runtime type of an
//! instance. Members not listed for the matching subject are denied; there
//! is no fallback.

use crate::errors::{bad_access, bad_access_on, EvalResult};
use crate::value::{ModuleId, TypeTag, Value};

/// What a capability entry applies to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Subject {
    Singleton(ModuleId),
    Class(TypeTag),
    Instance(TypeTag),
}

/// The members one subject may expose.
#[derive(Debug)]
pub struct Capability {
    pub subject: Subject,
    pub members: &'static [&'static str],
}

const MATH_MEMBERS: &[&str] = &[
    "pi", "e", "tau", "inf", "nan", "sqrt", "isqrt", "exp", "log", "log2", "log10", "sin", "cos",
    "tan", "asin", "acos", "atan", "atan2", "sinh", "cosh", "tanh", "floor", "ceil", "trunc",
    "fabs", "factorial", "gcd", "lcm", "comb", "perm", "hypot", "degrees", "radians", "pow",
    "fmod", "copysign", "isfinite", "isinf", "isnan", "isclose",
];

const INT_MEMBERS: &[&str] = &[
    "real",
    "imag",
    "numerator",
    "denominator",
    "bit_length",
    "bit_count",
    "conjugate",
    "as_integer_ratio",
    "is_integer",
];

const FLOAT_MEMBERS: &[&str] = &[
    "real",
    "imag",
    "is_integer",
    "as_integer_ratio",
    "conjugate",
    "hex",
];

const DECIMAL_MEMBERS: &[&str] = &[
    "real",
    "imag",
    "sqrt",
    "exp",
    "ln",
    "log10",
    "quantize",
    "normalize",
    "to_integral_value",
    "is_signed",
    "is_zero",
    "copy_abs",
    "copy_negate",
    "adjusted",
];

const STR_MEMBERS: &[&str] = &[
    "upper", "lower", "title", "capitalize", "strip", "lstrip", "rstrip", "split", "rsplit", "join",
    "replace", "startswith", "endswith", "find", "rfind", "index", "rindex", "count", "isdigit",
    "isnumeric", "isdecimal", "isalpha", "isalnum", "isspace", "isupper", "islower", "zfill",
    "center", "ljust", "rjust", "removeprefix", "removesuffix",
];

const BYTES_MEMBERS: &[&str] = &["decode", "hex"];

const LIST_MEMBERS: &[&str] = &[
    "append", "extend", "insert", "pop", "remove", "index", "count", "sort", "reverse", "copy",
    "clear",
];

const TUPLE_MEMBERS: &[&str] = &["index", "count"];

const DICT_MEMBERS: &[&str] = &[
    "keys",
    "values",
    "items",
    "get",
    "pop",
    "popitem",
    "setdefault",
    "update",
    "copy",
    "clear",
];

const SET_MEMBERS: &[&str] = &[
    "add",
    "remove",
    "discard",
    "pop",
    "union",
    "intersection",
    "difference",
    "symmetric_difference",
    "issubset",
    "issuperset",
    "isdisjoint",
    "copy",
    "clear",
    "update",
];

const RANGE_MEMBERS: &[&str] = &["start", "stop", "step", "index", "count"];

const SLICE_MEMBERS: &[&str] = &["start", "stop", "step"];

/// The whitelist.
pub static CAPABILITIES: &[Capability] = &[
    Capability {
        subject: Subject::Singleton(ModuleId::Math),
        members: MATH_MEMBERS,
    },
    // Type objects
    Capability {
        subject: Subject::Class(TypeTag::Int),
        members: &["bit_length"],
    },
    Capability {
        subject: Subject::Class(TypeTag::Float),
        members: &["fromhex", "is_integer"],
    },
    Capability {
        subject: Subject::Class(TypeTag::Str),
        members: &["join", "upper", "lower", "strip", "split", "replace"],
    },
    Capability {
        subject: Subject::Class(TypeTag::Dict),
        members: &["fromkeys"],
    },
    Capability {
        subject: Subject::Class(TypeTag::Decimal),
        members: &["sqrt"],
    },
    // Instances
    Capability {
        subject: Subject::Instance(TypeTag::Int),
        members: INT_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Bool),
        members: INT_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Float),
        members: FLOAT_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Decimal),
        members: DECIMAL_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Str),
        members: STR_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Bytes),
        members: BYTES_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::List),
        members: LIST_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Tuple),
        members: TUPLE_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Dict),
        members: DICT_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Set),
        members: SET_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Range),
        members: RANGE_MEMBERS,
    },
    Capability {
        subject: Subject::Instance(TypeTag::Slice),
        members: SLICE_MEMBERS,
    },
];

fn find(subject: Subject) -> Option<&'static Capability> {
    CAPABILITIES.iter().find(|cap| cap.subject == subject)
}

fn member_in(cap: &'static Capability, attr: &str) -> Option<&'static str> {
    cap.members.iter().copied().find(|m| *m == attr)
}

/// Check `value.attr` against the whitelist, returning the member's static
/// name on success.
///
/// Singletons are tried first, then type objects, then the instance table
/// of the value's runtime type.
pub fn resolve_member(value: &Value, attr: &str) -> EvalResult<&'static str> {
    let cap = match value {
        Value::Module(module) => find(Subject::Singleton(*module)),
        Value::Type(tag) => find(Subject::Class(*tag)),
        other => find(Subject::Instance(other.type_tag())),
    };
    match cap {
        Some(cap) => member_in(cap, attr).ok_or_else(|| bad_access(attr)),
        None => Err(bad_access_on(attr, value.type_name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subjects_are_unique() {
        for (i, cap) in CAPABILITIES.iter().enumerate() {
            assert!(
                CAPABILITIES[i + 1..].iter().all(|other| other.subject != cap.subject),
                "duplicate entry for {:?}",
                cap.subject
            );
        }
    }

    #[test]
    fn test_module_members() {
        let math = Value::Module(ModuleId::Math);
        assert_eq!(resolve_member(&math, "sqrt").ok(), Some("sqrt"));
        let err = resolve_member(&math, "__dict__").err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("access to attribute '__dict__' is not allowed")
        );
    }

    #[test]
    fn test_class_members() {
        let float = Value::Type(TypeTag::Float);
        assert_eq!(resolve_member(&float, "fromhex").ok(), Some("fromhex"));
        assert!(resolve_member(&float, "hex").is_err());
        assert!(resolve_member(&Value::Type(TypeTag::List), "append").is_err());
    }

    #[test]
    fn test_instance_members() {
        assert_eq!(resolve_member(&Value::Int(3), "bit_length").ok(), Some("bit_length"));
        assert_eq!(resolve_member(&Value::Bool(true), "real").ok(), Some("real"));
        assert_eq!(resolve_member(&Value::str("a"), "upper").ok(), Some("upper"));
        assert!(resolve_member(&Value::str("a"), "format").is_err());
        assert!(resolve_member(&Value::list(vec![]), "__class__").is_err());
    }

    #[test]
    fn test_unlisted_type_names_the_type() {
        let err = resolve_member(&Value::None, "x").err();
        assert_eq!(
            err.map(|e| e.to_string()).as_deref(),
            Some("access to attribute 'x' of 'NoneType' object is not allowed")
        );
    }
}
