//! Pest grammar parser for filter queries

use pest::iterators::Pair;
use pest::Parser;
use pest_derive::Parser;

use crate::engine::compare::CompareOp;
use crate::engine::filter::{BoolOp, Combination, Comparison, CustomFilter, FilterExpression};
use crate::error::{ReportError, Result};
use crate::value::{Row, Value};

#[derive(Parser)]
#[grammar = "../grammar/filter.pest"]
pub struct FilterParser;

fn syntax_error(query: &str, message: impl Into<String>) -> ReportError {
    ReportError::Syntax {
        query: query.to_string(),
        message: message.into(),
    }
}

/// Parse a filter query into a compiled expression.
///
/// Keys are resolved against `fields` as each comparison is built. A key
/// that matches nothing is kept as written and fails when evaluated.
pub fn parse_filter<S: AsRef<str>>(query: &str, fields: &[S]) -> Result<FilterExpression> {
    let pairs =
        FilterParser::parse(Rule::query, query).map_err(|e| syntax_error(query, e.to_string()))?;

    let expression = pairs
        .into_iter()
        .next()
        .and_then(|q| q.into_inner().next())
        .ok_or_else(|| syntax_error(query, "Empty query"))?;

    let compiled = build_expression(query, expression, fields)?;
    log::debug!("Compiled filter '{}' as {}", query, compiled);
    Ok(compiled)
}

/// Parse every query, then AND them together with the extra predicates.
/// Returns `None` when there is nothing to filter on.
pub fn parse_multiple<Q, S>(
    queries: &[Q],
    fields: &[S],
    extra_predicates: &[CustomFilter],
) -> Result<Option<FilterExpression>>
where
    Q: AsRef<str>,
    S: AsRef<str>,
{
    let mut parts = queries
        .iter()
        .map(AsRef::as_ref)
        .filter(|q| !q.trim().is_empty())
        .map(|q| parse_filter(q, fields))
        .collect::<Result<Vec<_>>>()?;
    parts.extend(extra_predicates.iter().cloned().map(FilterExpression::from));

    Ok(match parts.len() {
        0 => None,
        1 => parts.pop(),
        _ => Some(FilterExpression::all(parts)),
    })
}

/// Keep the rows matching every query. Evaluation errors propagate.
pub fn filter_rows<Q: AsRef<str>>(rows: Vec<Row>, queries: &[Q]) -> Result<Vec<Row>> {
    let fields = rows.first().map(|r| r.columns().to_vec()).unwrap_or_default();
    let filter = match parse_multiple(queries, fields.as_slice(), &[])? {
        Some(filter) => filter,
        None => return Ok(rows),
    };

    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if filter.evaluate(&row)? {
            kept.push(row);
        }
    }
    Ok(kept)
}

fn build_expression<S: AsRef<str>>(
    query: &str,
    pair: Pair<Rule>,
    fields: &[S],
) -> Result<FilterExpression> {
    let mut inner = pair.into_inner();

    let chain = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected comparison"))?;
    let left = build_and_chain(query, chain, fields)?;

    let op = match inner.next() {
        Some(op) => op,
        None => return Ok(left),
    };
    let bool_op = match op.as_rule() {
        Rule::and_op => BoolOp::All,
        Rule::or_op => BoolOp::Any,
        other => {
            return Err(syntax_error(
                query,
                format!("Unexpected rule: {:?}", other),
            ))
        }
    };

    let rest = inner
        .next()
        .ok_or_else(|| syntax_error(query, format!("Expected expression after {}", bool_op)))?;
    let right = build_expression(query, rest, fields)?;

    Ok(FilterExpression::Combination(Combination::new(
        bool_op,
        vec![left, right],
    )))
}

fn build_and_chain<S: AsRef<str>>(
    query: &str,
    pair: Pair<Rule>,
    fields: &[S],
) -> Result<FilterExpression> {
    let mut inner = pair.into_inner();

    let first = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected comparison"))?;
    let left = build_comparison(query, first, fields)?;

    if inner.next().is_none() {
        return Ok(left);
    }

    let rest = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected comparison after AND"))?;
    let right = build_and_chain(query, rest, fields)?;

    Ok(FilterExpression::all(vec![left, right]))
}

fn build_comparison<S: AsRef<str>>(
    query: &str,
    pair: Pair<Rule>,
    fields: &[S],
) -> Result<FilterExpression> {
    let mut inner = pair.into_inner();

    // Quotes stay on the key so resolution demands an exact match.
    let key = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected key in comparison"))?
        .as_str()
        .to_string();

    let symbol = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected comparator"))?;
    let op = CompareOp::from_symbol(symbol.as_str()).ok_or_else(|| {
        syntax_error(query, format!("Unknown comparator: {}", symbol.as_str()))
    })?;

    let value_pair = inner
        .next()
        .ok_or_else(|| syntax_error(query, "Expected value in comparison"))?;
    let value = parse_value(query, value_pair)?;

    Ok(Comparison::with_fields(key, op, value, fields).into())
}

fn parse_value(query: &str, pair: Pair<Rule>) -> Result<Value> {
    let inner = pair
        .into_inner()
        .next()
        .ok_or_else(|| syntax_error(query, "Expected value"))?;

    match inner.as_rule() {
        Rule::double_quoted | Rule::single_quoted => {
            let s = inner.as_str();
            Ok(Value::String(s[1..s.len() - 1].to_string()))
        }
        Rule::bare_value => {
            let s = inner.as_str();
            Ok(s.parse::<f64>()
                .map(Value::Number)
                .unwrap_or_else(|_| Value::String(s.to_string())))
        }
        other => Err(syntax_error(
            query,
            format!("Invalid value type: {:?}", other),
        )),
    }
}

// ============================================================================
// Tests
// ============================================================================
