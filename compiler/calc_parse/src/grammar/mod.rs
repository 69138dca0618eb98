//! Grammar modules extending `Parser`.
//!
//! - `stmt`: statements and blocks
//! - `unsupported`: skipping of disallowed statements
//! - `expr`: expressions, by precedence level
//! - `fstring`: f-string bodies

mod expr;
mod fstring;
mod stmt;
mod unsupported;
