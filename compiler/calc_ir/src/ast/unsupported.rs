//! Node kinds the sandbox refuses to evaluate.
//!
//! The parser recognises each of these constructs so scripts using them fail
//! with a precise "X is not supported" error instead of a generic syntax
//! error. The enumeration is closed: adding a kind here forces every
//! exhaustive match in the evaluator to acknowledge it.

use std::fmt;

/// A categorically disallowed syntax kind.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnsupportedKind {
    // Definitions
    FunctionDef,
    AsyncFunctionDef,
    ClassDef,
    Return,
    Lambda,
    TypeAlias,
    AnnAssign,

    // Imports
    Import,
    ImportFrom,

    // Exception handling
    Try,
    TryStar,
    Raise,
    Assert,
    With,

    // Generators and coroutines
    Yield,
    YieldFrom,
    Await,
    GeneratorExp,
    AsyncWith,
    AsyncFor,
    AsyncComprehension,

    // Dynamic scoping
    Global,
    Nonlocal,

    // Other
    Match,
    NamedExpr,
}

impl UnsupportedKind {
    /// The node kind name reported to the user.
    pub const fn name(self) -> &'static str {
        match self {
            Self::FunctionDef => "FunctionDef",
            Self::AsyncFunctionDef => "AsyncFunctionDef",
            Self::ClassDef => "ClassDef",
            Self::Return => "Return",
            Self::Lambda => "Lambda",
            Self::TypeAlias => "TypeAlias",
            Self::AnnAssign => "AnnAssign",
            Self::Import => "Import",
            Self::ImportFrom => "ImportFrom",
            Self::Try => "Try",
            Self::TryStar => "TryStar",
            Self::Raise => "Raise",
            Self::Assert => "Assert",
            Self::With => "With",
            Self::Yield => "Yield",
            Self::YieldFrom => "YieldFrom",
            Self::Await => "Await",
            Self::GeneratorExp => "GeneratorExp",
            Self::AsyncWith => "AsyncWith",
            Self::AsyncFor => "AsyncFor",
            Self::AsyncComprehension => "comprehension",
            Self::Global => "Global",
            Self::Nonlocal => "Nonlocal",
            Self::Match => "Match",
            Self::NamedExpr => "NamedExpr",
        }
    }

    /// Asynchronous variants are reported with their own message template.
    pub const fn is_async(self) -> bool {
        matches!(
            self,
            Self::AsyncFunctionDef | Self::AsyncWith | Self::AsyncFor | Self::AsyncComprehension
        )
    }
}

impl fmt::Display for UnsupportedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
