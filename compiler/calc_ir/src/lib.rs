//! Calc IR - syntax tree types shared by the calc parser and evaluator.
//!
//! This crate contains:
//! - Spans for source locations
//! - The closed syntax tree (`Module`, `Stmt`, `Expr`) of the calculator
//!   language, including the `Unsupported` kinds the evaluator rejects
//! - Format specification parsing for f-string interpolation
//! - Stack growth for deeply nested trees
//!
//! # Design Philosophy
//!
//! Every construct the parser recognises ends up as a distinct variant.
//! Constructs the sandbox refuses to run are still parsed and kept as
//! `Unsupported(kind)` so they are rejected by kind, never silently skipped.

pub mod ast;
pub mod format_spec;
mod span;
mod stack;
pub mod visitor;

pub use ast::{
    BinaryOp, BoolOp, CmpOp, Comprehension, Conversion, DictItem, Expr, ExprKind, Keyword,
    Literal, Module, Stmt, StmtKind, UnaryOp, UnsupportedKind,
};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
pub use visitor::{find_unsupported, Visitor};
