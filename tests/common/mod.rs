#![allow(dead_code)]

use keyset_util::{CmpOp, Filter, QueryExecutor, ResultSet, SelectQuery};
use serde_json::Value;
use std::cmp::Ordering;
use std::convert::Infallible;

/// In-memory stand-in for the backing store: evaluates the filter AST,
/// applies multi-key ordering, and reports the limit-independent match
/// count the way `SQL_CALC_FOUND_ROWS` does.
pub struct MemExecutor {
    rows: Vec<Value>,
}

impl MemExecutor {
    pub fn new(rows: Vec<Value>) -> Self {
        Self { rows }
    }
}

impl QueryExecutor for MemExecutor {
    type Row = Value;
    type Error = Infallible;

    fn execute(&self, query: SelectQuery) -> Result<ResultSet<Value>, Infallible> {
        let mut matched: Vec<Value> = self
            .rows
            .iter()
            .filter(|row| query.filter.as_ref().map_or(true, |f| matches(f, row)))
            .cloned()
            .collect();
        matched.sort_by(|a, b| {
            for clause in &query.order {
                let lhs = a.get(&clause.field).unwrap_or(&Value::Null);
                let rhs = b.get(&clause.field).unwrap_or(&Value::Null);
                let ord = match clause.ascending {
                    true => cmp_values(lhs, rhs),
                    false => cmp_values(rhs, lhs),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });

        let result_count = matched.len() as u64;
        let mut results = matched;
        if let Some(offset) = query.offset {
            let offset = (offset as usize).min(results.len());
            results.drain(..offset);
        }
        if let Some(limit) = query.limit {
            results.truncate(limit as usize);
        }
        Ok(ResultSet {
            results,
            result_count,
        })
    }
}

fn matches(filter: &Filter, row: &Value) -> bool {
    match filter {
        Filter::And(filters) => filters.iter().all(|f| matches(f, row)),
        Filter::Or(filters) => filters.iter().any(|f| matches(f, row)),
        Filter::Cmp { field, op, value } => {
            let Some(actual) = row.get(field) else {
                return false;
            };
            let ord = cmp_values(actual, value);
            match op {
                CmpOp::Eq => ord == Ordering::Equal,
                CmpOp::Ne => ord != Ordering::Equal,
                CmpOp::Gt => ord == Ordering::Greater,
                CmpOp::GtEq => ord != Ordering::Less,
                CmpOp::Lt => ord == Ordering::Less,
                CmpOp::LtEq => ord != Ordering::Greater,
            }
        }
    }
}

/// MySQL-style comparison: numeric whenever both sides coerce to a
/// number (cursor tuples arrive as strings), lexicographic otherwise.
fn cmp_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(x), Some(y)) = (as_number(a), as_number(b)) {
        return x.partial_cmp(&y).unwrap_or(Ordering::Equal);
    }
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Null, Value::Null) => Ordering::Equal,
        (Value::Null, _) => Ordering::Less,
        (_, Value::Null) => Ordering::Greater,
        _ => a.to_string().cmp(&b.to_string()),
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
