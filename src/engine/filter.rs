//! Compiled filter expressions
//!
//! A filter is a small tree of predicate nodes. Every node evaluates a row
//! and reports the columns it depends on, so a Report can keep those columns
//! from being pruned.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::{Arc, OnceLock};

use crate::engine::compare::{
    compare_to_number, compare_to_pattern, compare_to_scalar, CompareOp, GlobPattern,
};
use crate::engine::keys::{resolve_key, strip_verbatim};
use crate::error::{ReportError, Result};
use crate::value::{Row, Value};

/// Signature of externally supplied predicates
pub type Predicate = dyn Fn(&Row) -> Result<bool> + Send + Sync;

/// A compiled filter expression
#[derive(Debug, Clone)]
pub enum FilterExpression {
    Comparison(Comparison),
    Combination(Combination),
    Custom(CustomFilter),
}

impl FilterExpression {
    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        match self {
            FilterExpression::Comparison(c) => c.evaluate(row),
            FilterExpression::Combination(c) => c.evaluate(row),
            FilterExpression::Custom(c) => c.evaluate(row),
        }
    }

    /// Columns this expression reads
    pub fn dependent_fields(&self) -> BTreeSet<String> {
        match self {
            FilterExpression::Comparison(c) => BTreeSet::from([c.field().to_string()]),
            FilterExpression::Combination(c) => c.dependent_fields(),
            FilterExpression::Custom(c) => c.fields.clone(),
        }
    }

    pub fn all(children: Vec<FilterExpression>) -> Self {
        FilterExpression::Combination(Combination::new(BoolOp::All, children))
    }

    pub fn any(children: Vec<FilterExpression>) -> Self {
        FilterExpression::Combination(Combination::new(BoolOp::Any, children))
    }
}

impl fmt::Display for FilterExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterExpression::Comparison(c) => write!(f, "{}", c),
            FilterExpression::Combination(c) => write!(f, "{}", c),
            FilterExpression::Custom(c) => write!(f, "{}", c),
        }
    }
}

impl From<Comparison> for FilterExpression {
    fn from(c: Comparison) -> Self {
        FilterExpression::Comparison(c)
    }
}

impl From<CustomFilter> for FilterExpression {
    fn from(c: CustomFilter) -> Self {
        FilterExpression::Custom(c)
    }
}

#[derive(Debug, Clone)]
enum Literal {
    Number(f64),
    Pattern(GlobPattern),
    Scalar(Value),
}

/// `key comparator value`
///
/// The key is resolved against the row's columns on first use and the
/// result is cached for the lifetime of this instance. Reusing one compiled
/// comparison across row sources with different headings is unsupported.
#[derive(Debug, Clone)]
pub struct Comparison {
    key: String,
    op: CompareOp,
    literal: Literal,
    resolved: OnceLock<String>,
}

impl Comparison {
    pub fn new(key: impl Into<String>, op: CompareOp, value: Value) -> Self {
        let literal = match value {
            Value::Number(n) => Literal::Number(n),
            Value::String(s) => Literal::Pattern(GlobPattern::new(&s)),
            other => Literal::Scalar(other),
        };
        Self {
            key: key.into(),
            op,
            literal,
            resolved: OnceLock::new(),
        }
    }

    /// Build a comparison and resolve its key against `fields` right away.
    /// An unresolved key is kept verbatim and resolved again per row.
    pub fn with_fields<S: AsRef<str>>(
        key: impl Into<String>,
        op: CompareOp,
        value: Value,
        fields: &[S],
    ) -> Self {
        let comparison = Self::new(key, op, value);
        if let Some(name) = resolve_key(&comparison.key, fields) {
            let _ = comparison.resolved.set(name);
        }
        comparison
    }

    /// The key as written in the query
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The resolved column name, or the unquoted key if not yet resolved
    pub fn field(&self) -> &str {
        match self.resolved.get() {
            Some(name) => name.as_str(),
            None => strip_verbatim(&self.key).unwrap_or(&self.key),
        }
    }

    pub fn op(&self) -> CompareOp {
        self.op
    }

    pub fn value(&self) -> Value {
        match &self.literal {
            Literal::Number(n) => Value::Number(*n),
            Literal::Pattern(p) => Value::String(p.as_str().to_string()),
            Literal::Scalar(v) => v.clone(),
        }
    }

    fn column<'a>(&'a self, row: &Row) -> Result<&'a str> {
        if let Some(name) = self.resolved.get() {
            return Ok(name.as_str());
        }
        match resolve_key(&self.key, row.columns()) {
            Some(name) => Ok(self.resolved.get_or_init(|| name).as_str()),
            None => Err(ReportError::MissingField {
                key: self.key.clone(),
                known: row.columns().to_vec(),
            }),
        }
    }

    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        let column = self.column(row)?;
        let actual = row.get(column).ok_or_else(|| ReportError::MissingField {
            key: self.key.clone(),
            known: row.columns().to_vec(),
        })?;

        match &self.literal {
            Literal::Number(n) => compare_to_number(actual, self.op, *n),
            Literal::Pattern(p) => compare_to_pattern(actual, self.op, p),
            Literal::Scalar(v) => compare_to_scalar(actual, self.op, v),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.literal {
            Literal::Number(n) => write!(f, "{} {} {}", self.field(), self.op, n),
            Literal::Pattern(p) => write!(f, "{} {} {:?}", self.field(), self.op, p.as_str()),
            Literal::Scalar(v) => write!(f, "{} {} {}", self.field(), self.op, v),
        }
    }
}

/// Boolean operator of a combination
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoolOp {
    /// AND
    All,
    /// OR
    Any,
}

impl fmt::Display for BoolOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoolOp::All => write!(f, "AND"),
            BoolOp::Any => write!(f, "OR"),
        }
    }
}

/// Children folded under AND or OR
#[derive(Debug, Clone)]
pub struct Combination {
    op: BoolOp,
    children: Vec<FilterExpression>,
}

impl Combination {
    pub fn new(op: BoolOp, children: Vec<FilterExpression>) -> Self {
        Self { op, children }
    }

    pub fn op(&self) -> BoolOp {
        self.op
    }

    pub fn children(&self) -> &[FilterExpression] {
        &self.children
    }

    /// Short-circuits; the first error aborts the fold.
    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        match self.op {
            BoolOp::All => {
                for child in &self.children {
                    if !child.evaluate(row)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            BoolOp::Any => {
                for child in &self.children {
                    if child.evaluate(row)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
        }
    }

    pub fn dependent_fields(&self) -> BTreeSet<String> {
        self.children
            .iter()
            .flat_map(FilterExpression::dependent_fields)
            .collect()
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, child) in self.children.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", self.op)?;
            }
            write!(f, "{}", child)?;
        }
        write!(f, ")")
    }
}

/// A predicate defined outside the query language. It cannot be
/// introspected, so it declares the columns it reads.
#[derive(Clone)]
pub struct CustomFilter {
    name: String,
    predicate: Arc<Predicate>,
    fields: BTreeSet<String>,
}

impl CustomFilter {
    pub fn new<F, I, S>(name: impl Into<String>, fields: I, predicate: F) -> Self
    where
        F: Fn(&Row) -> Result<bool> + Send + Sync + 'static,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            fields: fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn evaluate(&self, row: &Row) -> Result<bool> {
        (self.predicate)(row)
    }

    pub fn dependent_fields(&self) -> &BTreeSet<String> {
        &self.fields
    }
}

impl fmt::Debug for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomFilter")
            .field("name", &self.name)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

impl fmt::Display for CustomFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name())?;
        for (i, field) in self.fields.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", field)?;
        }
        write!(f, ")")
    }
}
