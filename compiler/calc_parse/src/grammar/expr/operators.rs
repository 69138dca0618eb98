//! Operator Matching Helpers
//!
//! Helper methods for matching binary, unary and comparison operators
//! during parsing.

use calc_ir::{BinaryOp, CmpOp, UnaryOp};
use calc_lexer::TokenKind;

use crate::Parser;

impl Parser {
    pub(crate) fn match_shift_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Shl => Some(BinaryOp::Shl),
            TokenKind::Shr => Some(BinaryOp::Shr),
            _ => None,
        }
    }

    pub(crate) fn match_additive_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Plus => Some(BinaryOp::Add),
            TokenKind::Minus => Some(BinaryOp::Sub),
            _ => None,
        }
    }

    pub(crate) fn match_multiplicative_op(&self) -> Option<BinaryOp> {
        match self.current_kind() {
            TokenKind::Star => Some(BinaryOp::Mul),
            TokenKind::Slash => Some(BinaryOp::Div),
            TokenKind::DoubleSlash => Some(BinaryOp::FloorDiv),
            TokenKind::Percent => Some(BinaryOp::Mod),
            TokenKind::At => Some(BinaryOp::MatMul),
            _ => None,
        }
    }

    pub(crate) fn match_unary_op(&self) -> Option<UnaryOp> {
        match self.current_kind() {
            TokenKind::Minus => Some(UnaryOp::Neg),
            TokenKind::Plus => Some(UnaryOp::Pos),
            TokenKind::Tilde => Some(UnaryOp::Invert),
            _ => None,
        }
    }

    /// Consume a comparison operator, including the two-token forms
    /// `not in` and `is not`.
    pub(crate) fn eat_comparison_op(&mut self) -> Option<CmpOp> {
        let op = match self.current_kind() {
            TokenKind::EqEq => CmpOp::Eq,
            TokenKind::NotEq => CmpOp::NotEq,
            TokenKind::Lt => CmpOp::Lt,
            TokenKind::LtEq => CmpOp::LtEq,
            TokenKind::Gt => CmpOp::Gt,
            TokenKind::GtEq => CmpOp::GtEq,
            TokenKind::In => CmpOp::In,
            TokenKind::Not if *self.cursor.peek_kind(1) == TokenKind::In => {
                self.advance();
                CmpOp::NotIn
            }
            TokenKind::Is if *self.cursor.peek_kind(1) == TokenKind::Not => {
                self.advance();
                CmpOp::IsNot
            }
            TokenKind::Is => CmpOp::Is,
            _ => return None,
        };
        self.advance();
        Some(op)
    }

    /// Map an augmented assignment symbol (`+`, `//`, ...) to its operator.
    pub(crate) fn aug_assign_op(symbol: &str) -> Option<BinaryOp> {
        Some(match symbol {
            "+" => BinaryOp::Add,
            "-" => BinaryOp::Sub,
            "*" => BinaryOp::Mul,
            "@" => BinaryOp::MatMul,
            "/" => BinaryOp::Div,
            "//" => BinaryOp::FloorDiv,
            "%" => BinaryOp::Mod,
            "**" => BinaryOp::Pow,
            "&" => BinaryOp::BitAnd,
            "|" => BinaryOp::BitOr,
            "^" => BinaryOp::BitXor,
            "<<" => BinaryOp::Shl,
            ">>" => BinaryOp::Shr,
            _ => return None,
        })
    }
}
