//! Composable query tree.
//!
//! A query is an immutable tree of [`QueryNode`]s. Leaves are predicates on a
//! single field; [`BoolQuery`] combines children with AND (`must`, `filter`),
//! OR (`should`) and NOT (`must_not`) semantics. The tree is engine-neutral:
//! the repository crate serializes it into the engine's query DSL.

use serde_json::Value;

use crate::errors::QueryError;

/// A node in the query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Matches every document.
    MatchAll,
    /// Exact match of a field against a single value.
    Term {
        field: String,
        value: Value,
        boost: Option<f32>,
    },
    /// Exact match of a field against any of several values.
    Terms { field: String, values: Vec<Value> },
    /// Bounded interval on a field.
    Range { field: String, bounds: RangeBounds },
    /// Analyzed full-text match.
    Match {
        field: String,
        query: String,
        boost: Option<f32>,
    },
    /// Analyzed match of an exact phrase.
    MatchPhrase { field: String, phrase: String },
    /// Query-string search, restricted to `default_field` when one is set.
    QueryString {
        query: String,
        default_field: Option<String>,
    },
    /// Documents whose id is one of `values`.
    Ids { values: Vec<String> },
    /// Boolean combination of child nodes.
    Bool(BoolQuery),
}

impl QueryNode {
    /// Match all documents.
    pub fn match_all() -> Self {
        Self::MatchAll
    }

    /// Exact match on `field`.
    pub fn term(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Term {
            field: field.into(),
            value: value.into(),
            boost: None,
        }
    }

    /// Exact match on `field` against any of `values`.
    pub fn terms<I, V>(field: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Self::Terms {
            field: field.into(),
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Range over `field` with the given bounds.
    ///
    /// Fails with [`QueryError::InvalidRange`] when both exclusive and inclusive
    /// forms of the same side are set, or when no bound is set. An interval
    /// that is empty under its literal bounds (e.g. `gte 3, lte 2`) is valid and
    /// simply matches nothing.
    pub fn range(field: impl Into<String>, bounds: RangeBounds) -> Result<Self, QueryError> {
        let field = field.into();
        bounds.validate(&field)?;
        Ok(Self::Range { field, bounds })
    }

    /// Full-text match on `field`.
    pub fn match_query(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::Match {
            field: field.into(),
            query: query.into(),
            boost: None,
        }
    }

    /// Phrase match on `field`.
    pub fn match_phrase(field: impl Into<String>, phrase: impl Into<String>) -> Self {
        Self::MatchPhrase {
            field: field.into(),
            phrase: phrase.into(),
        }
    }

    /// Query-string search across all text fields.
    pub fn query_string(query: impl Into<String>) -> Self {
        Self::QueryString {
            query: query.into(),
            default_field: None,
        }
    }

    /// Query-string search against a single field.
    pub fn query_string_in(field: impl Into<String>, query: impl Into<String>) -> Self {
        Self::QueryString {
            query: query.into(),
            default_field: Some(field.into()),
        }
    }

    /// Match documents by id.
    pub fn ids<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        Self::Ids {
            values: values.into_iter().map(Into::into).collect(),
        }
    }

    /// Boolean query from explicit clause lists.
    pub fn bool_query(
        must: Vec<QueryNode>,
        should: Vec<QueryNode>,
        filter: Vec<QueryNode>,
        must_not: Vec<QueryNode>,
    ) -> Self {
        Self::Bool(BoolQuery {
            must,
            should,
            filter,
            must_not,
            minimum_should_match: None,
        })
    }

    /// Set a relevance boost. Only `Term` and `Match` carry a boost; other
    /// nodes are returned unchanged.
    pub fn boost(self, boost: f32) -> Self {
        match self {
            Self::Term { field, value, .. } => Self::Term {
                field,
                value,
                boost: Some(boost),
            },
            Self::Match { field, query, .. } => Self::Match {
                field,
                query,
                boost: Some(boost),
            },
            other => other,
        }
    }

    /// Check the whole tree for structural errors.
    ///
    /// Nodes built through the constructors are valid by construction except
    /// for empty field names, empty value lists, blank query strings and
    /// non-finite boosts; nodes assembled directly from the enum variants are
    /// checked in full.
    pub fn validate(&self) -> Result<(), QueryError> {
        match self {
            Self::MatchAll => Ok(()),
            Self::Term {
                field,
                value,
                boost,
            } => {
                require_field("term", field)?;
                require_finite_boost("term", field, *boost)?;
                require_scalar("term", field, value)
            }
            Self::Terms { field, values } => {
                require_field("terms", field)?;
                if values.is_empty() {
                    return Err(QueryError::syntax(format!(
                        "terms query on `{}` has no values",
                        field
                    )));
                }
                values
                    .iter()
                    .try_for_each(|value| require_scalar("terms", field, value))
            }
            Self::Range { field, bounds } => {
                require_field("range", field)?;
                bounds.validate(field)
            }
            Self::Match { field, boost, .. } => {
                require_field("match", field)?;
                require_finite_boost("match", field, *boost)
            }
            Self::MatchPhrase { field, .. } => require_field("match_phrase", field),
            Self::QueryString {
                query,
                default_field,
            } => {
                if let Some(field) = default_field {
                    require_field("query_string", field)?;
                }
                if query.trim().is_empty() {
                    return Err(QueryError::syntax("query_string query is empty"));
                }
                Ok(())
            }
            Self::Ids { values } => {
                if values.is_empty() {
                    return Err(QueryError::syntax("ids query has no values"));
                }
                if values.iter().any(|id| id.trim().is_empty()) {
                    return Err(QueryError::syntax("ids query contains an empty id"));
                }
                Ok(())
            }
            Self::Bool(query) => query.validate(),
        }
    }
}

impl From<BoolQuery> for QueryNode {
    fn from(query: BoolQuery) -> Self {
        Self::Bool(query)
    }
}

/// Boolean combination of queries.
///
/// Clause order is preserved exactly as added.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoolQuery {
    /// All must match; contributes to scoring.
    pub must: Vec<QueryNode>,
    /// At least one must match when no `must`/`filter` clause is present.
    pub should: Vec<QueryNode>,
    /// All must match; does not contribute to scoring.
    pub filter: Vec<QueryNode>,
    /// None may match.
    pub must_not: Vec<QueryNode>,
    /// Explicit minimum number of `should` clauses that must match.
    pub minimum_should_match: Option<u32>,
}

impl BoolQuery {
    /// Create an empty boolean query.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a `must` clause.
    pub fn must(mut self, query: QueryNode) -> Self {
        self.must.push(query);
        self
    }

    /// Add a `should` clause.
    pub fn should(mut self, query: QueryNode) -> Self {
        self.should.push(query);
        self
    }

    /// Add a `filter` clause.
    pub fn filter(mut self, query: QueryNode) -> Self {
        self.filter.push(query);
        self
    }

    /// Add a `must_not` clause.
    pub fn must_not(mut self, query: QueryNode) -> Self {
        self.must_not.push(query);
        self
    }

    /// Require at least `count` matching `should` clauses.
    pub fn minimum_should_match(mut self, count: u32) -> Self {
        self.minimum_should_match = Some(count);
        self
    }

    /// Whether the query has no clauses at all.
    pub fn is_empty(&self) -> bool {
        self.must.is_empty()
            && self.should.is_empty()
            && self.filter.is_empty()
            && self.must_not.is_empty()
    }

    /// Number of `should` clauses a document has to satisfy.
    ///
    /// An explicit minimum wins. Otherwise a query made only of `should`
    /// clauses needs one of them, and a query with `must` or `filter` clauses
    /// treats `should` as optional.
    pub fn effective_minimum_should_match(&self) -> u32 {
        match self.minimum_should_match {
            Some(count) => count,
            None if self.should.is_empty() => 0,
            None if self.must.is_empty() && self.filter.is_empty() => 1,
            None => 0,
        }
    }

    fn validate(&self) -> Result<(), QueryError> {
        self.must
            .iter()
            .chain(&self.should)
            .chain(&self.filter)
            .chain(&self.must_not)
            .try_for_each(QueryNode::validate)
    }
}

/// Bounds of a range query. Values are JSON scalars so numbers, strings and
/// dates expressed as strings are all accepted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RangeBounds {
    pub gt: Option<Value>,
    pub gte: Option<Value>,
    pub lt: Option<Value>,
    pub lte: Option<Value>,
}

impl RangeBounds {
    /// Whether no bound is set.
    pub fn is_unbounded(&self) -> bool {
        self.gt.is_none() && self.gte.is_none() && self.lt.is_none() && self.lte.is_none()
    }

    fn validate(&self, field: &str) -> Result<(), QueryError> {
        if self.gt.is_some() && self.gte.is_some() {
            return Err(QueryError::invalid_range(format!(
                "range on `{}` sets both gt and gte",
                field
            )));
        }
        if self.lt.is_some() && self.lte.is_some() {
            return Err(QueryError::invalid_range(format!(
                "range on `{}` sets both lt and lte",
                field
            )));
        }
        if self.is_unbounded() {
            return Err(QueryError::invalid_range(format!(
                "range on `{}` has no bounds",
                field
            )));
        }

        [&self.gt, &self.gte, &self.lt, &self.lte]
            .into_iter()
            .flatten()
            .try_for_each(|value| match value {
                Value::Number(_) | Value::String(_) => Ok(()),
                other => Err(QueryError::syntax(format!(
                    "range bound on `{}` must be a number or string, got {}",
                    field, other
                ))),
            })
    }
}

/// Fluent builder for range queries.
///
/// ```
/// use article_search_shared::RangeBuilder;
///
/// let query = RangeBuilder::new("id").gt(2).lt(4).build().unwrap();
/// ```
#[derive(Debug, Clone)]
pub struct RangeBuilder {
    field: String,
    bounds: RangeBounds,
}

impl RangeBuilder {
    /// Start a range on `field`.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            bounds: RangeBounds::default(),
        }
    }

    /// Exclusive lower bound.
    pub fn gt(mut self, value: impl Into<Value>) -> Self {
        self.bounds.gt = Some(value.into());
        self
    }

    /// Inclusive lower bound.
    pub fn gte(mut self, value: impl Into<Value>) -> Self {
        self.bounds.gte = Some(value.into());
        self
    }

    /// Exclusive upper bound.
    pub fn lt(mut self, value: impl Into<Value>) -> Self {
        self.bounds.lt = Some(value.into());
        self
    }

    /// Inclusive upper bound.
    pub fn lte(mut self, value: impl Into<Value>) -> Self {
        self.bounds.lte = Some(value.into());
        self
    }

    /// Finish the range, validating its bounds.
    pub fn build(self) -> Result<QueryNode, QueryError> {
        QueryNode::range(self.field, self.bounds)
    }
}

fn require_field(kind: &str, field: &str) -> Result<(), QueryError> {
    if field.trim().is_empty() {
        return Err(QueryError::syntax(format!(
            "{} query requires a field name",
            kind
        )));
    }
    Ok(())
}

fn require_finite_boost(kind: &str, field: &str, boost: Option<f32>) -> Result<(), QueryError> {
    match boost {
        Some(b) if !b.is_finite() => Err(QueryError::syntax(format!(
            "{} query on `{}` has a non-finite boost",
            kind, field
        ))),
        _ => Ok(()),
    }
}

fn require_scalar(kind: &str, field: &str, value: &Value) -> Result<(), QueryError> {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => Ok(()),
        other => Err(QueryError::syntax(format!(
            "{} query on `{}` needs a scalar value, got {}",
            kind, field, other
        ))),
    }
}
