//! Query tree serialization.
//!
//! Each [`QueryNode`] variant maps to exactly one DSL clause. Clause lists of
//! a `bool` query keep the order in which they were built.

use serde_json::{json, Map, Value};

use crate::errors::SearchError;
use article_search_shared::{BoolQuery, QueryNode, RangeBounds};

/// Validate a query tree and render it as a DSL `query` object.
pub fn to_dsl(node: &QueryNode) -> Result<Value, SearchError> {
    node.validate()?;
    Ok(render(node))
}

fn render(node: &QueryNode) -> Value {
    match node {
        QueryNode::MatchAll => json!({ "match_all": {} }),
        QueryNode::Term {
            field,
            value,
            boost,
        } => match boost {
            Some(boost) => json!({ "term": { field: { "value": value, "boost": boost } } }),
            None => json!({ "term": { field: value } }),
        },
        QueryNode::Terms { field, values } => json!({ "terms": { field: values } }),
        QueryNode::Range { field, bounds } => json!({ "range": { field: render_bounds(bounds) } }),
        QueryNode::Match {
            field,
            query,
            boost,
        } => match boost {
            Some(boost) => json!({ "match": { field: { "query": query, "boost": boost } } }),
            None => json!({ "match": { field: query } }),
        },
        QueryNode::MatchPhrase { field, phrase } => json!({ "match_phrase": { field: phrase } }),
        QueryNode::QueryString {
            query,
            default_field,
        } => match default_field {
            Some(field) => json!({ "query_string": { "query": query, "default_field": field } }),
            None => json!({ "query_string": { "query": query } }),
        },
        QueryNode::Ids { values } => json!({ "ids": { "values": values } }),
        QueryNode::Bool(query) => render_bool(query),
    }
}

fn render_bounds(bounds: &RangeBounds) -> Value {
    let mut out = Map::new();
    for (key, bound) in [
        ("gt", &bounds.gt),
        ("gte", &bounds.gte),
        ("lt", &bounds.lt),
        ("lte", &bounds.lte),
    ] {
        if let Some(value) = bound {
            out.insert(key.to_string(), value.clone());
        }
    }
    Value::Object(out)
}

fn render_bool(query: &BoolQuery) -> Value {
    let mut clauses = Map::new();
    for (key, nodes) in [
        ("must", &query.must),
        ("should", &query.should),
        ("filter", &query.filter),
        ("must_not", &query.must_not),
    ] {
        if !nodes.is_empty() {
            clauses.insert(
                key.to_string(),
                Value::Array(nodes.iter().map(render).collect()),
            );
        }
    }

    // An explicit minimum is always sent, zero included. A should-only query
    // states its implicit 1 so OR semantics hold in filter context as well.
    let minimum = match query.minimum_should_match {
        Some(count) => Some(count),
        None if query.should.is_empty() => None,
        None => Some(query.effective_minimum_should_match()).filter(|count| *count > 0),
    };
    if let Some(count) = minimum {
        clauses.insert("minimum_should_match".to_string(), json!(count));
    }

    json!({ "bool": clauses })
}
