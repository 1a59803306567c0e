//! Calculator tool: restricted arithmetic evaluation.
//!
//! Grammar (recursive descent, no names, no calls):
//!
//! ```text
//! expr   := term (('+' | '-') term)*
//! term   := unary (('*' | '/') unary)*
//! unary  := ('+' | '-') unary | atom
//! atom   := number | '(' expr ')'
//! number := digits ['.' digits] [('e' | 'E') ['+' | '-'] digits]
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use serde_json::{json, Value};
use thiserror::Error;

use super::base::{require_string, Tool};

/// Nesting limit for parentheses and unary signs.
const MAX_DEPTH: usize = 64;

#[derive(Debug, Error, PartialEq)]
pub enum CalcError {
    #[error("empty expression")]
    Empty,
    #[error("unexpected character '{ch}' at position {pos}")]
    UnexpectedChar { ch: char, pos: usize },
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("invalid number '{0}'")]
    InvalidNumber(String),
    #[error("division by zero")]
    DivisionByZero,
    #[error("expression nested too deeply")]
    TooDeep,
    #[error("result is not a finite number")]
    NotFinite,
}

// ─────────────────────────────────────────────
// Parser
// ─────────────────────────────────────────────

struct Parser {
    chars: Vec<(usize, char)>,
    pos: usize,
    depth: usize,
}

impl Parser {
    fn new(src: &str) -> Self {
        Self {
            chars: src.char_indices().collect(),
            pos: 0,
            depth: 0,
        }
    }

    fn skip_ws(&mut self) {
        while self.chars.get(self.pos).is_some_and(|(_, c)| c.is_whitespace()) {
            self.pos += 1;
        }
    }

    fn peek(&mut self) -> Option<char> {
        self.skip_ws();
        self.chars.get(self.pos).map(|&(_, c)| c)
    }

    fn unexpected(&self) -> CalcError {
        match self.chars.get(self.pos) {
            Some(&(pos, ch)) => CalcError::UnexpectedChar { ch, pos },
            None => CalcError::UnexpectedEnd,
        }
    }

    fn expr(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc + rhs } else { acc - rhs };
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<f64, CalcError> {
        let mut acc = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            if op == '*' {
                acc *= rhs;
            } else {
                if rhs == 0.0 {
                    return Err(CalcError::DivisionByZero);
                }
                acc /= rhs;
            }
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some(sign @ ('+' | '-')) => {
                self.pos += 1;
                self.descend()?;
                let v = self.unary()?;
                self.depth -= 1;
                Ok(if sign == '-' { -v } else { v })
            }
            _ => self.atom(),
        }
    }

    fn atom(&mut self) -> Result<f64, CalcError> {
        match self.peek() {
            Some('(') => {
                self.pos += 1;
                self.descend()?;
                let v = self.expr()?;
                self.depth -= 1;
                if self.peek() != Some(')') {
                    return Err(self.unexpected());
                }
                self.pos += 1;
                Ok(v)
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            _ => Err(self.unexpected()),
        }
    }

    fn number(&mut self) -> Result<f64, CalcError> {
        let mut text = String::new();
        self.take_digits(&mut text);
        if self.chars.get(self.pos).map(|&(_, c)| c) == Some('.') {
            text.push('.');
            self.pos += 1;
            self.take_digits(&mut text);
        }
        if let Some(&(_, e @ ('e' | 'E'))) = self.chars.get(self.pos) {
            text.push(e);
            self.pos += 1;
            if let Some(&(_, s @ ('+' | '-'))) = self.chars.get(self.pos) {
                text.push(s);
                self.pos += 1;
            }
            self.take_digits(&mut text);
        }

        text.parse::<f64>()
            .map_err(|_| CalcError::InvalidNumber(text.clone()))
    }

    fn take_digits(&mut self, text: &mut String) {
        while let Some(&(_, c)) = self.chars.get(self.pos) {
            if !c.is_ascii_digit() {
                break;
            }
            text.push(c);
            self.pos += 1;
        }
    }

    fn descend(&mut self) -> Result<(), CalcError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(CalcError::TooDeep);
        }
        Ok(())
    }
}

/// Evaluate an arithmetic expression.
pub fn evaluate(expression: &str) -> Result<f64, CalcError> {
    let mut parser = Parser::new(expression);
    if parser.peek().is_none() {
        return Err(CalcError::Empty);
    }
    let value = parser.expr()?;
    if parser.peek().is_some() {
        return Err(parser.unexpected());
    }
    if !value.is_finite() {
        return Err(CalcError::NotFinite);
    }
    Ok(value)
}

/// Render a result: integral values without a fractional part.
pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

// ─────────────────────────────────────────────
// CalculatorTool
// ─────────────────────────────────────────────

/// Evaluates `+ - * / ( )` expressions over numeric literals.
pub struct CalculatorTool;

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "Evaluate a math expression. Supports numbers, + - * / and parentheses."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "Math expression, e.g. \"(2 + 3) * 4\""
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> anyhow::Result<String> {
        let expression = require_string(&params, "expression")?;
        let value = evaluate(&expression)?;
        Ok(format_number(value))
    }
}
