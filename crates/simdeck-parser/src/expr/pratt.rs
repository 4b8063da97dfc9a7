//! Pratt parser core - precedence climbing for binary and unary operators.

use super::Evaluator;
use crate::error::ParseError;
use simdeck_lexer::Token;

/// Operator associativity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Assoc {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
}

impl BinaryOp {
    fn apply(self, left: f64, right: f64) -> f64 {
        match self {
            BinaryOp::Add => left + right,
            BinaryOp::Sub => left - right,
            BinaryOp::Mul => left * right,
            BinaryOp::Div => left / right,
            BinaryOp::Pow => left.powf(right),
        }
    }
}

/// Minimum precedence for the operand of a prefix operator.
///
/// Sits above `*` and at `^`, so `-a^b` is `-(a^b)` and `-a*b` is `(-a)*b`.
const PREFIX_OPERAND_PREC: u8 = 60;

/// Get binary operator metadata (precedence, associativity, and operator).
///
/// Higher precedence binds tighter.
fn binary_op_info(token: &Token) -> Option<(u8, Assoc, BinaryOp)> {
    match token {
        Token::Plus => Some((40, Assoc::Left, BinaryOp::Add)),
        Token::Minus => Some((40, Assoc::Left, BinaryOp::Sub)),
        Token::Star => Some((50, Assoc::Left, BinaryOp::Mul)),
        Token::Slash => Some((50, Assoc::Left, BinaryOp::Div)),
        Token::Caret => Some((60, Assoc::Right, BinaryOp::Pow)),
        _ => None,
    }
}

impl Evaluator<'_> {
    /// Evaluate operators binding at least as tightly as `min_prec`.
    pub(super) fn parse_pratt(&mut self, min_prec: u8) -> Result<f64, ParseError> {
        self.enter()?;
        let result = self.parse_binary(min_prec);
        self.leave();
        result
    }

    fn parse_binary(&mut self, min_prec: u8) -> Result<f64, ParseError> {
        let mut left = self.parse_prefix()?;

        while let Some(token) = self.source.peek_token()? {
            let Some((prec, assoc, op)) = binary_op_info(&token) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.source.next()?;

            let next_prec = if assoc == Assoc::Left { prec + 1 } else { prec };
            let right = self.parse_pratt(next_prec)?;
            left = op.apply(left, right);
        }

        Ok(left)
    }

    /// Prefix `-` / `+`, or an atom.
    fn parse_prefix(&mut self) -> Result<f64, ParseError> {
        match self.source.peek_token()? {
            Some(Token::Minus) => {
                self.source.next()?;
                Ok(-self.parse_pratt(PREFIX_OPERAND_PREC)?)
            }
            Some(Token::Plus) => {
                self.source.next()?;
                self.parse_pratt(PREFIX_OPERAND_PREC)
            }
            _ => self.parse_atom(),
        }
    }
}
