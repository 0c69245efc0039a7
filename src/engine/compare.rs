//! Comparison operators and the functions behind them

use std::fmt;

use regex::Regex;

use crate::error::{ReportError, Result};
use crate::value::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Equal,
    NotEqual,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
}

impl CompareOp {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol {
            "=" => Some(CompareOp::Equal),
            "!=" => Some(CompareOp::NotEqual),
            ">" => Some(CompareOp::GreaterThan),
            ">=" => Some(CompareOp::GreaterThanOrEqual),
            "<" => Some(CompareOp::LessThan),
            "<=" => Some(CompareOp::LessThanOrEqual),
            _ => None,
        }
    }

    /// True for `<`, `<=`, `>`, `>=`
    pub fn is_ordering(&self) -> bool {
        !matches!(self, CompareOp::Equal | CompareOp::NotEqual)
    }
}

impl fmt::Display for CompareOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompareOp::Equal => write!(f, "="),
            CompareOp::NotEqual => write!(f, "!="),
            CompareOp::GreaterThan => write!(f, ">"),
            CompareOp::GreaterThanOrEqual => write!(f, ">="),
            CompareOp::LessThan => write!(f, "<"),
            CompareOp::LessThanOrEqual => write!(f, "<="),
        }
    }
}

/// Case-insensitive shell-style wildcard pattern (`*` and `?`)
#[derive(Debug, Clone)]
pub struct GlobPattern {
    pattern: String,
    regex: Option<Regex>,
}

impl GlobPattern {
    pub fn new(pattern: &str) -> Self {
        let mut translated = String::from("(?is)^");
        for c in pattern.chars() {
            match c {
                '*' => translated.push_str(".*"),
                '?' => translated.push('.'),
                other => translated.push_str(&regex::escape(other.encode_utf8(&mut [0; 4]))),
            }
        }
        translated.push('$');

        Self {
            pattern: pattern.to_string(),
            regex: Regex::new(&translated).ok(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        match &self.regex {
            Some(regex) => regex.is_match(text),
            None => text.to_lowercase() == self.pattern.to_lowercase(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

pub fn compare_numbers(left: f64, right: f64, op: CompareOp) -> bool {
    match op {
        CompareOp::Equal => (left - right).abs() < f64::EPSILON,
        CompareOp::NotEqual => (left - right).abs() >= f64::EPSILON,
        CompareOp::GreaterThan => left > right,
        CompareOp::GreaterThanOrEqual => left >= right,
        CompareOp::LessThan => left < right,
        CompareOp::LessThanOrEqual => left <= right,
    }
}

fn numeric_operand(value: &Value, op: CompareOp, literal: &Value) -> Result<f64> {
    value.as_number().ok_or_else(|| {
        ReportError::IncompatibleType(format!(
            "cannot compare '{}' {} '{}' numerically",
            value, op, literal
        ))
    })
}

/// Compare a row value against a numeric literal.
pub fn compare_to_number(actual: &Value, op: CompareOp, expected: f64) -> Result<bool> {
    let literal = Value::Number(expected);
    let left = numeric_operand(actual, op, &literal)?;
    Ok(compare_numbers(left, expected, op))
}

/// Compare a row value against a string literal. `=`/`!=` are wildcard
/// matches; ordering operators are numeric only, so they never apply to a
/// string literal.
pub fn compare_to_pattern(actual: &Value, op: CompareOp, pattern: &GlobPattern) -> Result<bool> {
    match op {
        CompareOp::Equal => Ok(pattern.matches(&actual.to_string())),
        CompareOp::NotEqual => Ok(!pattern.matches(&actual.to_string())),
        _ => Err(ReportError::IncompatibleType(format!(
            "cannot compare '{}' {} string '{}' numerically",
            actual,
            op,
            pattern.as_str()
        ))),
    }
}

/// Compare a row value against a boolean, null or sentinel literal. Only
/// equality is defined for these.
pub fn compare_to_scalar(actual: &Value, op: CompareOp, expected: &Value) -> Result<bool> {
    match op {
        CompareOp::Equal => Ok(actual == expected),
        CompareOp::NotEqual => Ok(actual != expected),
        _ => Err(ReportError::IncompatibleType(format!(
            "cannot order '{}' against '{}'",
            actual, expected
        ))),
    }
}
