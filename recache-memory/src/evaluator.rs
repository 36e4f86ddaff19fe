//! Filter expression evaluation for in-memory record matching.
//!
//! This module provides the evaluation engine for filter expressions,
//! enabling matching and comparison operations on BSON records.

use std::{cmp::Ordering, collections::HashMap};

use bson::{Bson, Document, datetime::DateTime};

use recache_core::{
    error::{RecordStoreError, RecordStoreResult},
    query::{Expr, FieldOp, QueryVisitor},
};

/// Type-erased, comparable representation of BSON values.
///
/// Wraps BSON values and provides comparison operations for filter
/// evaluation. Numeric types are normalized to f64 for easy comparison.
#[derive(Debug)]
pub(crate) enum Comparable<'a> {
    /// Null or missing value
    Null,
    /// Boolean value
    Bool(bool),
    /// Numeric value (all integers and floats normalized to f64)
    Number(f64),
    /// DateTime value
    DateTime(DateTime),
    /// String value
    String(&'a str),
    /// Array of comparable values
    Array(Vec<Comparable<'a>>),
    /// Map/Object of comparable values
    Map(HashMap<&'a str, Comparable<'a>>),
}

impl<'a> From<&'a Bson> for Comparable<'a> {
    fn from(bson: &'a Bson) -> Self {
        match bson {
            Bson::Null => Comparable::Null,
            Bson::Boolean(value) => Comparable::Bool(*value),
            Bson::Int32(value) => Comparable::Number(*value as f64),
            Bson::Int64(value) => Comparable::Number(*value as f64),
            Bson::Double(value) => Comparable::Number(*value),
            Bson::DateTime(value) => Comparable::DateTime(*value),
            Bson::String(value) => Comparable::String(value),
            Bson::Array(arr) => Comparable::Array(
                arr.iter()
                    .map(Comparable::from)
                    .collect::<Vec<_>>(),
            ),
            Bson::Document(doc) => Comparable::Map(
                doc.iter()
                    .map(|(k, v)| (k.as_str(), Comparable::from(v)))
                    .collect::<HashMap<_, _>>(),
            ),
            _ => Comparable::Null, // Other types are not comparable
        }
    }
}

impl<'a> PartialEq for Comparable<'a> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Comparable::Null, Comparable::Null) => true,
            (Comparable::Bool(a), Comparable::Bool(b)) => a == b,
            (Comparable::Number(a), Comparable::Number(b)) => a == b,
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a == b,
            (Comparable::String(a), Comparable::String(b)) => a == b,
            (Comparable::Array(a), Comparable::Array(b)) => a == b,
            (Comparable::Map(a), Comparable::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a> PartialOrd for Comparable<'a> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Comparable::Bool(a), Comparable::Bool(b)) => a.partial_cmp(b),
            (Comparable::Number(a), Comparable::Number(b)) => a.partial_cmp(b),
            (Comparable::DateTime(a), Comparable::DateTime(b)) => a.partial_cmp(b),
            (Comparable::String(a), Comparable::String(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

/// Evaluates filter expressions against a single record.
pub(crate) struct RecordEvaluator<'a> {
    record: &'a Document,
}

impl<'a> RecordEvaluator<'a> {
    pub fn new(record: &'a Document) -> Self {
        Self { record }
    }

    pub fn evaluate(&mut self, expr: &Expr) -> RecordStoreResult<bool> {
        self.visit_expr(expr)
    }

    /// Filters records to those matching the expression. Records that fail
    /// evaluation (e.g. a malformed operand) are excluded rather than
    /// erroring the whole scan.
    pub fn matching<I>(records: I, expr: &Expr) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        records
            .into_iter()
            .filter(|record| {
                RecordEvaluator::new(record)
                    .evaluate(expr)
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }
}

impl<'a> QueryVisitor for RecordEvaluator<'a> {
    type Output = bool;
    type Error = RecordStoreError;

    fn visit_and(&mut self, exprs: &[Expr]) -> RecordStoreResult<bool> {
        for expr in exprs {
            if !self.visit_expr(expr)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn visit_or(&mut self, exprs: &[Expr]) -> RecordStoreResult<bool> {
        for expr in exprs {
            if self.visit_expr(expr)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn visit_not(&mut self, expr: &Expr) -> RecordStoreResult<bool> {
        Ok(!self.visit_expr(expr)?)
    }

    fn visit_exists(&mut self, field: &str, should_exist: bool) -> RecordStoreResult<bool> {
        let present = matches!(self.record.get(field), Some(value) if !matches!(value, Bson::Null));
        Ok(present == should_exist)
    }

    fn visit_field(&mut self, field: &str, op: &FieldOp, value: &Bson) -> RecordStoreResult<bool> {
        let left = self
            .record
            .get(field)
            .map(Comparable::from)
            .unwrap_or(Comparable::Null);
        let right = Comparable::from(value);

        let matched = match op {
            FieldOp::Eq => left == right,
            FieldOp::Ne => left != right,
            FieldOp::Gt => matches!(left.partial_cmp(&right), Some(Ordering::Greater)),
            FieldOp::Gte => {
                matches!(left.partial_cmp(&right), Some(Ordering::Greater | Ordering::Equal))
            }
            FieldOp::Lt => matches!(left.partial_cmp(&right), Some(Ordering::Less)),
            FieldOp::Lte => {
                matches!(left.partial_cmp(&right), Some(Ordering::Less | Ordering::Equal))
            }
            FieldOp::AnyOf => {
                let Comparable::Array(candidates) = &right else {
                    return Err(RecordStoreError::InvalidRecord(
                        "any_of expects an array of candidate values".to_string(),
                    ));
                };

                match &left {
                    Comparable::Array(elements) => elements
                        .iter()
                        .any(|element| candidates.contains(element)),
                    other => candidates.contains(other),
                }
            }
        };

        Ok(matched)
    }

    fn visit_near(
        &mut self,
        field: &str,
        x: f64,
        y: f64,
        max_distance: Option<f64>,
    ) -> RecordStoreResult<bool> {
        let Some(Bson::Array(pair)) = self.record.get(field) else {
            return Ok(false);
        };
        let [px, py] = pair.as_slice() else {
            return Ok(false);
        };
        let (Some(px), Some(py)) = (as_f64(px), as_f64(py)) else {
            return Ok(false);
        };

        // Planar distance; good enough for a development backend.
        let distance = (px - x).hypot(py - y);

        Ok(match max_distance {
            Some(max) => distance <= max,
            None => true,
        })
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(v) => Some(*v as f64),
        Bson::Int64(v) => Some(*v as f64),
        Bson::Double(v) => Some(*v),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;
    use recache_core::query::Filter;

    fn matches(record: &Document, expr: &Expr) -> bool {
        RecordEvaluator::new(record)
            .evaluate(expr)
            .unwrap()
    }

    #[test]
    fn comparison_operators() {
        let record = doc! { "age": 30, "name": "Alice" };

        assert!(matches(&record, &Filter::eq("age", 30)));
        assert!(matches(&record, &Filter::ne("age", 31)));
        assert!(matches(&record, &Filter::gt("age", 29)));
        assert!(matches(&record, &Filter::gte("age", 30)));
        assert!(matches(&record, &Filter::lt("age", 31)));
        assert!(matches(&record, &Filter::lte("age", 30)));
        assert!(!matches(&record, &Filter::gt("age", 30)));
        assert!(matches(&record, &Filter::eq("name", "Alice")));
    }

    #[test]
    fn numeric_types_are_normalized() {
        let record = doc! { "n": 5_i64 };
        assert!(matches(&record, &Filter::eq("n", 5.0)));
        assert!(matches(&record, &Filter::eq("n", 5_i32)));
    }

    #[test]
    fn logical_operators() {
        let record = doc! { "a": 1, "b": 2 };

        assert!(matches(&record, &Filter::eq("a", 1).and(Filter::eq("b", 2))));
        assert!(!matches(&record, &Filter::eq("a", 1).and(Filter::eq("b", 3))));
        assert!(matches(&record, &Filter::eq("a", 9).or(Filter::eq("b", 2))));
        assert!(matches(&record, &Filter::eq("a", 9).not()));
        assert!(matches(&record, &Filter::all()));
    }

    #[test]
    fn existence() {
        let record = doc! { "present": 1, "nullish": Bson::Null };

        assert!(matches(&record, &Filter::exists("present")));
        assert!(matches(&record, &Filter::not_exists("absent")));
        assert!(matches(&record, &Filter::not_exists("nullish")));
    }

    #[test]
    fn any_of_over_scalars_and_arrays() {
        let record = doc! { "tag": "b", "tags": ["x", "y"] };

        assert!(matches(&record, &Filter::any_of("tag", vec!["a", "b"])));
        assert!(!matches(&record, &Filter::any_of("tag", vec!["c"])));
        assert!(matches(&record, &Filter::any_of("tags", vec!["y", "z"])));
    }

    #[test]
    fn near_matches_within_distance() {
        let record = doc! { "location": [3.0, 4.0] };

        assert!(matches(&record, &Filter::near("location", 0.0, 0.0)));
        assert!(matches(&record, &Filter::near_within("location", 0.0, 0.0, 5.0)));
        assert!(!matches(&record, &Filter::near_within("location", 0.0, 0.0, 4.9)));
        assert!(!matches(&doc! { "location": "nowhere" }, &Filter::near("location", 0.0, 0.0)));
    }
}
