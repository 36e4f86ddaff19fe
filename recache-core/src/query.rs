//! Filter expression construction for store queries.
//!
//! This module provides type-safe filter construction and a visitor pattern
//! for evaluating filters across different store backends.
//!
//! # Filter Expression API
//!
//! The [`Filter`] struct provides a collection of static methods for building
//! filter expressions:
//!
//! - Comparison: `eq`, `ne`, `gt`, `gte`, `lt`, `lte`
//! - Existence: `exists`, `not_exists`
//! - Array: `any_of`
//! - Logical: `and`, `or`
//! - Proximity: `near`, `near_within`
//!
//! ```ignore
//! use recache::query::Filter;
//!
//! let expr = Filter::eq("status", "active").and(Filter::gt("age", 18));
//! ```
//!
//! Proximity clauses deserve a note: stores with MongoDB-style query planners
//! count proximity-filtered queries through a legacy code path (see
//! [`RecordAccess::list`](crate::records::RecordAccess::list) and its
//! `has_near` flag). [`Expr::is_near`] reports whether a proximity clause
//! appears anywhere in an expression tree, for callers that want to derive
//! the flag deterministically from the filter itself.

use bson::Bson;

use crate::error::RecordStoreError;

/// Sort direction for query results.
#[derive(Debug, Clone)]
pub enum SortDirection {
    /// Ascending order (A to Z, 0 to 9, earliest to latest).
    Asc,
    /// Descending order (Z to A, 9 to 0, latest to earliest).
    Desc,
}

/// Sort specification for query results.
#[derive(Debug, Clone)]
pub struct SortSpec {
    /// The field name to sort by.
    pub field: String,
    /// The sort direction.
    pub direction: SortDirection,
}

impl SortSpec {
    /// Creates an ascending sort on the given field.
    pub fn asc(field: impl Into<String>) -> Self {
        SortSpec { field: field.into(), direction: SortDirection::Asc }
    }

    /// Creates a descending sort on the given field.
    pub fn desc(field: impl Into<String>) -> Self {
        SortSpec { field: field.into(), direction: SortDirection::Desc }
    }
}

/// Collation settings for case-/locale-aware sorted queries.
///
/// Applied by the record access layer whenever a sort is requested on a list
/// query. Backends without collation support may ignore it.
#[derive(Debug, Clone)]
pub struct Collation {
    /// ICU locale identifier.
    pub locale: String,
}

impl Default for Collation {
    fn default() -> Self {
        Collation { locale: "en".to_string() }
    }
}

/// Field comparison operators for filter expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldOp {
    /// Equal to (exact match, deep equality for arrays and nested documents).
    Eq,
    /// Not equal to.
    Ne,
    /// Greater than.
    Gt,
    /// Greater than or equal to.
    Gte,
    /// Less than.
    Lt,
    /// Less than or equal to.
    Lte,
    /// Field value (or any element of an array field) matches any of the given values.
    AnyOf,
}

/// A filter expression for matching records.
///
/// Expressions can be combined using logical operators (`And`, `Or`, `Not`)
/// to build complex filter predicates. An empty `And` matches every record;
/// [`Filter::all`] constructs one.
#[derive(Debug, Clone)]
pub enum Expr {
    /// Logical AND of multiple expressions (all must match).
    And(Vec<Expr>),
    /// Logical OR of multiple expressions (any must match).
    Or(Vec<Expr>),
    /// Logical NOT of an expression (inverts the result).
    Not(Box<Expr>),
    /// Checks whether a field exists (is present and non-null).
    Exists(String, bool),
    /// Field comparison expression.
    Field {
        /// The field name to compare.
        field: String,
        /// The comparison operator.
        op: FieldOp,
        /// The value to compare against.
        value: Bson,
    },
    /// Geospatial proximity clause: matches records whose coordinate field is
    /// within `max_distance` of the point, ordered nearest-first by stores
    /// that support it. `None` for `max_distance` matches at any distance.
    Near {
        /// The coordinate field ([x, y] pair).
        field: String,
        /// Point x coordinate.
        x: f64,
        /// Point y coordinate.
        y: f64,
        /// Maximum distance from the point, in coordinate units.
        max_distance: Option<f64>,
    },
}

impl Expr {
    /// Creates a field comparison expression.
    pub fn field(field: String, op: FieldOp, value: Bson) -> Self {
        Expr::Field { field, op, value }
    }

    /// Combines this expression with another using logical AND.
    ///
    /// If this expression is already an AND, the other expression is appended
    /// to the list. Otherwise, a new AND expression is created.
    pub fn and(self, other: Expr) -> Self {
        match self {
            Expr::And(mut list) => {
                list.push(other);
                Expr::And(list)
            }
            _ => Expr::And(vec![self, other]),
        }
    }

    /// Combines this expression with another using logical OR.
    pub fn or(self, other: Expr) -> Self {
        match self {
            Expr::Or(mut list) => {
                list.push(other);
                Expr::Or(list)
            }
            _ => Expr::Or(vec![self, other]),
        }
    }

    /// Negates this expression (logical NOT).
    pub fn not(self) -> Self {
        Expr::Not(Box::new(self))
    }

    /// Returns `true` if a proximity clause appears anywhere in this
    /// expression tree.
    ///
    /// The record access layer never calls this implicitly; the proximity
    /// counting fallback stays caller-selected. This helper exists so callers
    /// choosing to automate the decision do so deterministically.
    pub fn is_near(&self) -> bool {
        match self {
            Expr::Near { .. } => true,
            Expr::And(exprs) | Expr::Or(exprs) => exprs.iter().any(Expr::is_near),
            Expr::Not(expr) => expr.is_near(),
            Expr::Exists(..) | Expr::Field { .. } => false,
        }
    }
}

/// Helper struct for constructing filter expressions.
///
/// Provides static methods to construct common filter expressions. All
/// methods accept field names and values as `Into<String>` and `Into<Bson>`
/// for ergonomics.
pub struct Filter;

impl Filter {
    /// Creates an expression matching every record (an empty AND).
    pub fn all() -> Expr {
        Expr::And(Vec::new())
    }

    /// Creates an equality filter expression.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Eq, value.into())
    }

    /// Creates a not-equal filter expression.
    pub fn ne(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Ne, value.into())
    }

    /// Creates a greater-than filter expression.
    pub fn gt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gt, value.into())
    }

    /// Creates a greater-than-or-equal filter expression.
    pub fn gte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Gte, value.into())
    }

    /// Creates a less-than filter expression.
    pub fn lt(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lt, value.into())
    }

    /// Creates a less-than-or-equal filter expression.
    pub fn lte(field: impl Into<String>, value: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::Lte, value.into())
    }

    /// Creates an array membership filter expression.
    ///
    /// Matches records where the field (or any element of an array field)
    /// equals any of the specified values.
    pub fn any_of(field: impl Into<String>, values: impl Into<Bson>) -> Expr {
        Expr::field(field.into(), FieldOp::AnyOf, values.into())
    }

    /// Creates an existence filter expression.
    pub fn exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), true)
    }

    /// Creates a non-existence filter expression.
    pub fn not_exists(field: impl Into<String>) -> Expr {
        Expr::Exists(field.into(), false)
    }

    /// Creates a logical AND filter expression.
    pub fn and(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::And(exprs.into_iter().collect())
    }

    /// Creates a logical OR filter expression.
    pub fn or(exprs: impl IntoIterator<Item = Expr>) -> Expr {
        Expr::Or(exprs.into_iter().collect())
    }

    /// Creates a proximity filter expression with no distance bound.
    pub fn near(field: impl Into<String>, x: f64, y: f64) -> Expr {
        Expr::Near { field: field.into(), x, y, max_distance: None }
    }

    /// Creates a proximity filter expression bounded by a maximum distance.
    pub fn near_within(field: impl Into<String>, x: f64, y: f64, max_distance: f64) -> Expr {
        Expr::Near { field: field.into(), x, y, max_distance: Some(max_distance) }
    }
}

/// Visitor for walking filter expression trees.
///
/// Store backends implement this to translate or evaluate expressions; the
/// default `visit_expr` dispatches over the expression variants.
pub trait QueryVisitor {
    type Output;
    type Error: Into<RecordStoreError>;

    fn visit_and(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_or(&mut self, exprs: &[Expr]) -> Result<Self::Output, Self::Error>;
    fn visit_not(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error>;
    fn visit_exists(
        &mut self,
        field: &str,
        should_exist: bool,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_field(
        &mut self,
        field: &str,
        op: &FieldOp,
        value: &Bson,
    ) -> Result<Self::Output, Self::Error>;
    fn visit_near(
        &mut self,
        field: &str,
        x: f64,
        y: f64,
        max_distance: Option<f64>,
    ) -> Result<Self::Output, Self::Error>;

    fn visit_expr(&mut self, expr: &Expr) -> Result<Self::Output, Self::Error> {
        match expr {
            Expr::And(exprs) => self.visit_and(exprs),
            Expr::Or(exprs) => self.visit_or(exprs),
            Expr::Not(expr) => self.visit_not(expr),
            Expr::Exists(field, should_exist) => self.visit_exists(field, *should_exist),
            Expr::Field { field, op, value } => self.visit_field(field, op, value),
            Expr::Near { field, x, y, max_distance } => {
                self.visit_near(field, *x, *y, *max_distance)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn and_chains_flatten() {
        let expr = Filter::eq("a", 1)
            .and(Filter::eq("b", 2))
            .and(Filter::eq("c", 3));

        match expr {
            Expr::And(list) => assert_eq!(list.len(), 3),
            other => panic!("expected And, got {other:?}"),
        }
    }

    #[test]
    fn is_near_finds_nested_proximity_clauses() {
        assert!(!Filter::eq("status", "active").is_near());
        assert!(Filter::near("location", 1.0, 2.0).is_near());

        let nested = Filter::and([
            Filter::eq("status", "active"),
            Filter::or([
                Filter::eq("kind", "shop"),
                Filter::near_within("location", 1.0, 2.0, 500.0),
            ]),
        ]);
        assert!(nested.is_near());
    }
}
