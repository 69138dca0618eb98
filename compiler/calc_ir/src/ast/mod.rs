//! Syntax tree of the calculator language.
//!
//! The tree mirrors the shape of a Python-style module: a `Module` is an
//! ordered list of `Stmt`, each statement owns its child `Expr` nodes.
//! Statement and expression kinds are closed enums; disallowed constructs are
//! represented by `StmtKind::Unsupported` / `ExprKind::Unsupported`.

mod operators;
mod unsupported;

pub use operators::{BinaryOp, BoolOp, CmpOp, UnaryOp};
pub use unsupported::UnsupportedKind;

use crate::Span;

/// A parsed script.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct Module {
    pub body: Vec<Stmt>,
}

/// A statement with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn new(kind: StmtKind, span: Span) -> Self {
        Stmt { kind, span }
    }
}

/// Statement kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum StmtKind {
    /// Bare expression statement.
    Expr(Expr),
    /// `a = b = value`: every target receives the same value, left to right.
    Assign { targets: Vec<Expr>, value: Expr },
    /// `target op= value`.
    AugAssign {
        target: Expr,
        op: BinaryOp,
        value: Expr,
    },
    /// `if`/`elif`/`else`; `elif` chains are nested `If` nodes in `orelse`.
    If {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    /// `for target in iter: body else: orelse`.
    For {
        target: Expr,
        iter: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    /// `while test: body else: orelse`.
    While {
        test: Expr,
        body: Vec<Stmt>,
        orelse: Vec<Stmt>,
    },
    Break,
    Continue,
    Pass,
    /// `del a, b[0]`.
    Delete { targets: Vec<Expr> },
    /// A disallowed statement, skipped by the parser and rejected by kind.
    Unsupported(UnsupportedKind),
}

/// An expression with its source location.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }

    /// Build a boxed copy, for nodes that own children.
    pub fn boxed(self) -> Box<Expr> {
        Box::new(self)
    }

    /// Human-readable node kind, used when rejecting assignment targets.
    pub fn kind_name(&self) -> &'static str {
        match &self.kind {
            ExprKind::Literal(_) => "literal",
            ExprKind::Name(_) => "name",
            ExprKind::Attribute { .. } => "attribute",
            ExprKind::Subscript { .. } => "subscript",
            ExprKind::Slice { .. } => "slice",
            ExprKind::BinOp { .. } | ExprKind::BoolOp { .. } | ExprKind::UnaryOp { .. } => {
                "expression"
            }
            ExprKind::Compare { .. } => "comparison",
            ExprKind::Call { .. } => "function call",
            ExprKind::List(_) => "list",
            ExprKind::Tuple(_) => "tuple",
            ExprKind::Set(_) => "set display",
            ExprKind::Dict(_) => "dict literal",
            ExprKind::ListComp { .. } => "list comprehension",
            ExprKind::SetComp { .. } => "set comprehension",
            ExprKind::DictComp { .. } => "dict comprehension",
            ExprKind::IfExp { .. } => "conditional expression",
            ExprKind::JoinedStr(_) | ExprKind::FormattedValue { .. } => "f-string expression",
            ExprKind::Starred(_) => "starred",
            ExprKind::Unsupported(kind) => kind.name(),
        }
    }
}

/// Expression kinds.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Name(String),
    /// `value.attr`.
    Attribute { value: Box<Expr>, attr: String },
    /// `value[index]`; the index may be a `Slice` or a tuple holding slices.
    Subscript { value: Box<Expr>, index: Box<Expr> },
    /// `lower:upper:step`, only valid as (part of) a subscript index.
    Slice {
        lower: Option<Box<Expr>>,
        upper: Option<Box<Expr>>,
        step: Option<Box<Expr>>,
    },
    BinOp {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    /// `a and b and c`: two or more operands.
    BoolOp { op: BoolOp, values: Vec<Expr> },
    UnaryOp { op: UnaryOp, operand: Box<Expr> },
    /// `left op1 c1 op2 c2 ...`.
    Compare {
        left: Box<Expr>,
        ops: Vec<(CmpOp, Expr)>,
    },
    /// `func(args..., keywords...)`; args may contain `Starred`.
    Call {
        func: Box<Expr>,
        args: Vec<Expr>,
        keywords: Vec<Keyword>,
    },
    List(Vec<Expr>),
    Tuple(Vec<Expr>),
    Set(Vec<Expr>),
    Dict(Vec<DictItem>),
    ListComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    SetComp {
        elt: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    DictComp {
        key: Box<Expr>,
        value: Box<Expr>,
        generators: Vec<Comprehension>,
    },
    /// `body if test else orelse`.
    IfExp {
        test: Box<Expr>,
        body: Box<Expr>,
        orelse: Box<Expr>,
    },
    /// f-string: `Literal(Str)` and `FormattedValue` segments in source order.
    JoinedStr(Vec<Expr>),
    /// One `{value!conversion:format_spec}` segment of an f-string.
    FormattedValue {
        value: Box<Expr>,
        conversion: Option<Conversion>,
        format_spec: Option<Box<Expr>>,
    },
    /// `*value` inside a display or call argument list.
    Starred(Box<Expr>),
    /// A disallowed expression kind.
    Unsupported(UnsupportedKind),
}

/// Literal constants.
///
/// Numeric literals keep their source digits so exact mode can build a
/// decimal from them without a lossy round trip through `f64`.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// Integer digits with `_` removed, without radix prefix.
    Int { digits: String, radix: u32 },
    /// Float text with `_` removed (`1.5`, `.5`, `1e-3`).
    Float(String),
    /// Imaginary literal text without the `j` suffix.
    Imaginary(String),
    Str(String),
    Bytes(Vec<u8>),
    Bool(bool),
    None,
    Ellipsis,
}

/// A keyword argument: `name=value`, or `**value` when `arg` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Keyword {
    pub arg: Option<String>,
    pub value: Expr,
    pub span: Span,
}

/// A dict display entry: `key: value`, or `**value` when `key` is `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct DictItem {
    pub key: Option<Expr>,
    pub value: Expr,
}

/// One `for target in iter if cond...` clause of a comprehension.
#[derive(Clone, Debug, PartialEq)]
pub struct Comprehension {
    pub target: Expr,
    pub iter: Expr,
    pub ifs: Vec<Expr>,
    pub is_async: bool,
}

/// f-string conversion flag.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Conversion {
    /// `!s`
    Str,
    /// `!r`
    Repr,
    /// `!a`
    Ascii,
}
