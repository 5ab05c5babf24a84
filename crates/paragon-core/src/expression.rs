//! Amount field evaluation
//!
//! Amount inputs accept either a plain decimal ("12,50") or a formula
//! prefixed with `=` ("=2+3*4"). Formulas must contain at least one operator
//! and balanced parentheses; their result is rounded to cents. Plain values
//! must not contain operators, so "2+3" without `=` is rejected instead of
//! silently read as something else.
//!
//! Nothing here panics: every failure, including arithmetic faults and
//! excessive nesting inside a formula, comes back as a [`ValidationError`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{Item, ItemValue};

const OPERATORS: [char; 4] = ['+', '-', '*', '/'];

/// Deepest nesting of parentheses and unary signs a formula may use
const MAX_DEPTH: usize = 256;

/// Why an amount was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Formula must contain an operator (+, -, *, /)")]
    MissingOperator,

    #[error("Unbalanced parentheses in formula")]
    UnbalancedParentheses,

    #[error("Operators are only allowed in formulas starting with '='")]
    OperatorWithoutFormula,

    #[error("Not a number: {0}")]
    NotANumber(String),

    #[error("Invalid formula: {0}")]
    Malformed(String),

    #[error("Formula result is not a finite number")]
    NonFinite,
}

/// A successfully evaluated amount
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluated {
    pub value: f64,
    /// Human-readable result, e.g. "2+3*4 = 14"
    pub message: String,
}

/// An item whose value has been replaced by its evaluated number
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidatedItem {
    pub item: Item,
    pub message: String,
}

/// Flat status/message pair for form feedback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationOutcome {
    pub status: bool,
    pub message: String,
}

impl From<&Result<ValidatedItem, ValidationError>> for ValidationOutcome {
    fn from(result: &Result<ValidatedItem, ValidationError>) -> Self {
        match result {
            Ok(validated) => Self {
                status: true,
                message: validated.message.clone(),
            },
            Err(e) => Self {
                status: false,
                message: e.to_string(),
            },
        }
    }
}

/// Round half up to two decimals, matching how the browser rounds cents
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0 + 0.5).floor() / 100.0
}

/// Evaluate a raw amount input
pub fn evaluate_amount(raw: &str) -> Result<Evaluated, ValidationError> {
    match raw.strip_prefix('=') {
        Some(formula) => evaluate_formula(formula),
        None => parse_plain(raw),
    }
}

fn evaluate_formula(formula: &str) -> Result<Evaluated, ValidationError> {
    if !formula.contains(OPERATORS) {
        return Err(ValidationError::MissingOperator);
    }

    let formula = formula.replace(',', ".");
    check_parentheses(&formula)?;

    let value = Parser::new(&formula).parse()?;
    if !value.is_finite() {
        return Err(ValidationError::NonFinite);
    }
    let value = round_cents(value);

    Ok(Evaluated {
        value,
        message: format!("{} = {}", formula.trim(), value),
    })
}

fn parse_plain(raw: &str) -> Result<Evaluated, ValidationError> {
    if raw.contains(OPERATORS) {
        return Err(ValidationError::OperatorWithoutFormula);
    }

    let normalized = raw.trim().replace(',', ".");
    match normalized.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(Evaluated {
            value,
            message: format!("{}", value),
        }),
        _ => Err(ValidationError::NotANumber(raw.to_string())),
    }
}

/// Running depth must never go negative and must end at zero
fn check_parentheses(formula: &str) -> Result<(), ValidationError> {
    let mut depth: i64 = 0;
    for c in formula.chars() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth < 0 {
                    return Err(ValidationError::UnbalancedParentheses);
                }
            }
            _ => {}
        }
    }
    if depth != 0 {
        return Err(ValidationError::UnbalancedParentheses);
    }
    Ok(())
}

/// Validate an item's amount, returning a copy holding the numeric value
pub fn validate_item(item: &Item) -> Result<ValidatedItem, ValidationError> {
    let evaluated = match &item.value {
        ItemValue::Number(n) if n.is_finite() => Evaluated {
            value: *n,
            message: format!("{}", n),
        },
        ItemValue::Number(n) => return Err(ValidationError::NotANumber(n.to_string())),
        ItemValue::Text(raw) => evaluate_amount(raw)?,
    };

    Ok(ValidatedItem {
        item: Item {
            value: ItemValue::Number(evaluated.value),
            ..item.clone()
        },
        message: evaluated.message,
    })
}

/// Recursive-descent parser for `+ - * /`, unary signs and parentheses
struct Parser<'a> {
    chars: std::iter::Peekable<std::str::CharIndices<'a>>,
    input: &'a str,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            chars: input.char_indices().peekable(),
            input,
            depth: 0,
        }
    }

    fn parse(mut self) -> Result<f64, ValidationError> {
        let value = self.expr()?;
        self.skip_whitespace();
        match self.chars.peek() {
            None => Ok(value),
            Some(&(pos, c)) => Err(ValidationError::Malformed(format!(
                "unexpected '{}' at position {}",
                c, pos
            ))),
        }
    }

    fn skip_whitespace(&mut self) {
        while self.chars.peek().is_some_and(|(_, c)| c.is_whitespace()) {
            self.chars.next();
        }
    }

    fn peek_op(&mut self) -> Option<char> {
        self.skip_whitespace();
        self.chars.peek().map(|&(_, c)| c)
    }

    fn descend(&mut self) -> Result<(), ValidationError> {
        self.depth += 1;
        if self.depth > MAX_DEPTH {
            return Err(ValidationError::Malformed(
                "formula nested too deeply".to_string(),
            ));
        }
        Ok(())
    }

    fn expr(&mut self) -> Result<f64, ValidationError> {
        let mut value = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek_op() {
            self.chars.next();
            let rhs = self.term()?;
            value = if op == '+' { value + rhs } else { value - rhs };
        }
        Ok(value)
    }

    fn term(&mut self) -> Result<f64, ValidationError> {
        let mut value = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek_op() {
            self.chars.next();
            let rhs = self.unary()?;
            value = if op == '*' { value * rhs } else { value / rhs };
        }
        Ok(value)
    }

    fn unary(&mut self) -> Result<f64, ValidationError> {
        match self.peek_op() {
            Some(sign @ ('-' | '+')) => {
                self.chars.next();
                self.descend()?;
                let value = self.unary()?;
                self.depth -= 1;
                Ok(if sign == '-' { -value } else { value })
            }
            _ => self.primary(),
        }
    }

    fn primary(&mut self) -> Result<f64, ValidationError> {
        match self.peek_op() {
            Some('(') => {
                self.chars.next();
                self.descend()?;
                let value = self.expr()?;
                self.depth -= 1;
                match self.peek_op() {
                    Some(')') => {
                        self.chars.next();
                        Ok(value)
                    }
                    _ => Err(ValidationError::Malformed("missing ')'".to_string())),
                }
            }
            Some(c) if c.is_ascii_digit() || c == '.' => self.number(),
            Some(c) => Err(ValidationError::Malformed(format!("unexpected '{}'", c))),
            None => Err(ValidationError::Malformed(
                "unexpected end of formula".to_string(),
            )),
        }
    }

    fn number(&mut self) -> Result<f64, ValidationError> {
        let start = match self.chars.peek() {
            Some(&(pos, _)) => pos,
            None => self.input.len(),
        };
        let mut end = start;
        while let Some(&(pos, c)) = self.chars.peek() {
            if !(c.is_ascii_digit() || c == '.') {
                break;
            }
            end = pos + c.len_utf8();
            self.chars.next();
        }

        let literal = &self.input[start..end];
        literal
            .parse::<f64>()
            .map_err(|_| ValidationError::Malformed(format!("bad number '{}'", literal)))
    }
}
