//! In-memory search engine for integration tests.
//!
//! `InMemoryProvider` answers the request bodies produced by the `dsl` module
//! with responses shaped like the engine's REST API. It understands the
//! clauses this crate emits (match_all, term, terms, range, match,
//! match_phrase, query_string, ids, bool), sorting, paging, `_source` filtering, highlighting
//! and bulk framing. Text is analyzed like the standard analyzer: latin words
//! are lowercased and CJK characters become one token each.

#![allow(dead_code)]

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tokio::sync::Mutex;

use article_search_repository::{
    ClusterHealth, DeleteOutcome, IndexConfig, SearchError, SearchIndexClient,
    SearchIndexProvider, WriteOutcome,
};
use article_search_shared::Article;

pub const TEST_INDEX: &str = "article_test";

#[derive(Default)]
struct StoredIndex {
    field_types: BTreeMap<String, String>,
    documents: Vec<(String, Value)>,
}

impl StoredIndex {
    fn with_body(body: Option<&Value>) -> Self {
        let mut index = Self::default();
        if let Some(mappings) = body.and_then(|b| b.get("mappings")) {
            index.merge_mappings(mappings);
        }
        index
    }

    fn merge_mappings(&mut self, mappings: &Value) {
        let Some(properties) = mappings.get("properties").and_then(Value::as_object) else {
            return;
        };
        for (field, spec) in properties {
            if let Some(field_type) = spec.get("type").and_then(Value::as_str) {
                self.field_types.insert(field.clone(), field_type.to_string());
            }
        }
    }

    fn check_document(&self, document: &Value) -> Result<(), String> {
        let object = document
            .as_object()
            .ok_or_else(|| "document must be an object".to_string())?;
        for (field, value) in object {
            let numeric = matches!(
                self.field_types.get(field).map(String::as_str),
                Some("long") | Some("integer")
            );
            if numeric && !value.is_null() && as_number(value).is_none() {
                return Err(format!(
                    "failed to parse field [{}] of type [long] in document",
                    field
                ));
            }
        }
        Ok(())
    }

    fn upsert(&mut self, id: &str, document: Value) -> WriteOutcome {
        match self.documents.iter_mut().find(|(existing, _)| existing == id) {
            Some((_, stored)) => {
                *stored = document;
                WriteOutcome::Updated
            }
            None => {
                self.documents.push((id.to_string(), document));
                WriteOutcome::Created
            }
        }
    }

    fn remove(&mut self, id: &str) -> bool {
        let before = self.documents.len();
        self.documents.retain(|(existing, _)| existing != id);
        self.documents.len() != before
    }
}

/// Engine double holding indices in memory. Writes are searchable at once.
#[derive(Default)]
pub struct InMemoryProvider {
    indices: Mutex<BTreeMap<String, StoredIndex>>,
}

impl InMemoryProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

fn mapper_parsing_error(reason: &str) -> Value {
    json!({ "type": "mapper_parsing_exception", "reason": reason })
}

#[async_trait]
impl SearchIndexProvider for InMemoryProvider {
    async fn create_index(&self, index: &str, body: Option<&Value>) -> Result<(), SearchError> {
        let mut indices = self.indices.lock().await;
        if indices.contains_key(index) {
            return Err(SearchError::index_creation(format!(
                "resource_already_exists_exception: index [{}] already exists",
                index
            )));
        }
        indices.insert(index.to_string(), StoredIndex::with_body(body));
        Ok(())
    }

    async fn index_exists(&self, index: &str) -> Result<bool, SearchError> {
        Ok(self.indices.lock().await.contains_key(index))
    }

    async fn put_mapping(&self, index: &str, mapping: &Value) -> Result<(), SearchError> {
        let mut indices = self.indices.lock().await;
        let stored = indices
            .get_mut(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;
        stored.merge_mappings(mapping);
        Ok(())
    }

    async fn delete_index(&self, index: &str) -> Result<DeleteOutcome, SearchError> {
        match self.indices.lock().await.remove(index) {
            Some(_) => Ok(DeleteOutcome::Deleted),
            None => Ok(DeleteOutcome::NotFound),
        }
    }

    async fn refresh(&self, index: &str) -> Result<(), SearchError> {
        if !self.indices.lock().await.contains_key(index) {
            return Err(SearchError::IndexNotFound(index.to_string()));
        }
        Ok(())
    }

    async fn index_document(
        &self,
        index: &str,
        id: &str,
        document: &Value,
    ) -> Result<WriteOutcome, SearchError> {
        let mut indices = self.indices.lock().await;
        let stored = indices.entry(index.to_string()).or_default();
        if let Err(reason) = stored.check_document(document) {
            let body = json!({ "error": mapper_parsing_error(&reason), "status": 400 });
            return Err(SearchError::engine_status("Index", 400, &body.to_string()));
        }
        Ok(stored.upsert(id, document.clone()))
    }

    async fn get_document(&self, index: &str, id: &str) -> Result<Option<Value>, SearchError> {
        let indices = self.indices.lock().await;
        let stored = indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;
        Ok(stored
            .documents
            .iter()
            .find(|(existing, _)| existing == id)
            .map(|(_, document)| document.clone()))
    }

    async fn delete_document(&self, index: &str, id: &str) -> Result<DeleteOutcome, SearchError> {
        let mut indices = self.indices.lock().await;
        let stored = indices
            .get_mut(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;
        if stored.remove(id) {
            Ok(DeleteOutcome::Deleted)
        } else {
            Ok(DeleteOutcome::NotFound)
        }
    }

    async fn bulk(&self, lines: Vec<Value>) -> Result<Value, SearchError> {
        let mut indices = self.indices.lock().await;
        let mut items = Vec::new();
        let mut errors = false;
        let mut lines = lines.into_iter();

        while let Some(action) = lines.next() {
            let (kind, meta) = single_entry(&action)
                .ok_or_else(|| SearchError::parse("malformed bulk action line"))?;
            let index = meta["_index"].as_str().unwrap_or_default().to_string();
            let id = meta["_id"].as_str().unwrap_or_default().to_string();

            let item = match kind {
                "index" => {
                    let document = lines
                        .next()
                        .ok_or_else(|| SearchError::parse("index action without a document"))?;
                    let stored = indices.entry(index.clone()).or_default();
                    match stored.check_document(&document) {
                        Ok(()) => {
                            let (result, status) = match stored.upsert(&id, document) {
                                WriteOutcome::Created => ("created", 201),
                                WriteOutcome::Updated => ("updated", 200),
                            };
                            json!({
                                "_index": index,
                                "_id": id,
                                "status": status,
                                "result": result
                            })
                        }
                        Err(reason) => {
                            errors = true;
                            json!({
                                "_index": index,
                                "_id": id,
                                "status": 400,
                                "error": mapper_parsing_error(&reason)
                            })
                        }
                    }
                }
                "delete" => {
                    let removed = indices
                        .get_mut(&index)
                        .map(|stored| stored.remove(&id))
                        .unwrap_or(false);
                    let (result, status) = if removed {
                        ("deleted", 200)
                    } else {
                        ("not_found", 404)
                    };
                    json!({ "_index": index, "_id": id, "status": status, "result": result })
                }
                other => {
                    return Err(SearchError::parse(format!(
                        "unsupported bulk action {}",
                        other
                    )))
                }
            };
            items.push(json!({ kind: item }));
        }

        Ok(json!({ "took": 1, "errors": errors, "items": items }))
    }

    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError> {
        let indices = self.indices.lock().await;
        let stored = indices
            .get(index)
            .ok_or_else(|| SearchError::IndexNotFound(index.to_string()))?;

        let match_all = json!({ "match_all": {} });
        let query = body.get("query").unwrap_or(&match_all);

        let mut matched: Vec<(f64, &String, &Value)> = stored
            .documents
            .iter()
            .filter_map(|(id, document)| score(query, id, document).map(|s| (s, id, document)))
            .collect();

        match body.get("sort").and_then(Value::as_array) {
            Some(sort) => matched.sort_by(|a, b| compare_by_sort(sort, a.2, b.2)),
            None => matched.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal)),
        }

        let total = matched.len();
        let from = body.get("from").and_then(Value::as_u64).unwrap_or(0) as usize;
        let size = body.get("size").and_then(Value::as_u64).unwrap_or(10) as usize;

        let hits: Vec<Value> = matched
            .into_iter()
            .skip(from)
            .take(size)
            .map(|(score, id, document)| {
                let mut hit = json!({
                    "_index": index,
                    "_type": "_doc",
                    "_id": id,
                    "_score": score,
                    "_source": project(document, body.get("_source"))
                });
                if let Some(options) = body.get("highlight") {
                    let highlights = highlight(query, document, options);
                    if !highlights.is_empty() {
                        hit["highlight"] = Value::Object(highlights);
                    }
                }
                hit
            })
            .collect();

        Ok(json!({
            "took": 1,
            "timed_out": false,
            "hits": {
                "total": { "value": total, "relation": "eq" },
                "hits": hits
            }
        }))
    }

    async fn health_check(&self) -> Result<ClusterHealth, SearchError> {
        Ok(ClusterHealth {
            cluster_name: "elasticsearch".to_string(),
            status: "green".to_string(),
        })
    }
}

/// Client over a fresh in-memory engine with the article index created.
pub async fn article_client() -> SearchIndexClient {
    let client = SearchIndexClient::new(Box::new(InMemoryProvider::new()));
    let body = IndexConfig::default().article_index_body();
    client
        .create_index(TEST_INDEX, Some(&body))
        .await
        .expect("create test index");
    client
}

/// Client whose article index already holds `articles`.
pub async fn seeded_client(articles: &[Article]) -> SearchIndexClient {
    let client = article_client().await;
    let summary = client
        .bulk_index(TEST_INDEX, articles)
        .await
        .expect("seed articles");
    assert!(summary.all_succeeded());
    client.refresh(TEST_INDEX).await.expect("refresh");
    client
}

fn single_entry(value: &Value) -> Option<(&str, &Value)> {
    value
        .as_object()?
        .iter()
        .next()
        .map(|(key, inner)| (key.as_str(), inner))
}

fn clauses<'a>(query: &'a Value, key: &str) -> &'a [Value] {
    query
        .get(key)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// `{field: value}` or `{field: {key: value, boost: b}}`.
fn value_and_boost<'a>(spec: &'a Value, key: &str) -> (&'a Value, f64) {
    match spec.get(key) {
        Some(value) => (
            value,
            spec.get("boost").and_then(Value::as_f64).unwrap_or(1.0),
        ),
        None => (spec, 1.0),
    }
}

/// `title.keyword` reads the raw `title` value.
fn lookup<'a>(document: &'a Value, field: &str) -> Option<&'a Value> {
    let base = field.strip_suffix(".keyword").unwrap_or(field);
    document.get(base).filter(|value| !value.is_null())
}

fn as_number(value: &Value) -> Option<f64> {
    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.parse::<f64>().ok()))
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => as_number(a)?.partial_cmp(&as_number(b)?),
    }
}

fn is_cjk(c: char) -> bool {
    ('\u{4E00}'..='\u{9FFF}').contains(&c)
}

fn token_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, c) in text.char_indices() {
        if is_cjk(c) {
            if let Some(s) = start.take() {
                spans.push((s, i));
            }
            spans.push((i, i + c.len_utf8()));
        } else if c.is_alphanumeric() {
            start.get_or_insert(i);
        } else if let Some(s) = start.take() {
            spans.push((s, i));
        }
    }
    if let Some(s) = start {
        spans.push((s, text.len()));
    }
    spans
}

fn tokens(text: &str) -> Vec<String> {
    token_spans(text)
        .into_iter()
        .map(|(s, e)| text[s..e].to_lowercase())
        .collect()
}

fn term_matches(field: &str, stored: &Value, value: &Value) -> bool {
    if let (Some(x), Some(y)) = (as_number(stored), as_number(value)) {
        if !stored.is_string() || !value.is_string() {
            return x == y;
        }
    }
    match (stored.as_str(), value.as_str()) {
        (Some(s), Some(v)) if field.ends_with(".keyword") => s == v,
        (Some(s), Some(v)) => tokens(s).iter().any(|token| token == v),
        _ => stored == value,
    }
}

fn in_range(stored: &Value, bounds: &Value) -> bool {
    let Some(bounds) = bounds.as_object() else {
        return false;
    };
    bounds.iter().all(|(op, bound)| {
        let Some(ordering) = compare_values(stored, bound) else {
            return false;
        };
        match op.as_str() {
            "gt" => ordering == Ordering::Greater,
            "gte" => ordering != Ordering::Less,
            "lt" => ordering == Ordering::Less,
            "lte" => ordering != Ordering::Greater,
            _ => false,
        }
    })
}

/// Query-string terms with the `AND`/`OR`/`NOT` operators dropped. Remaining
/// terms combine with OR, the engine's default operator.
fn query_string_tokens(query: &str) -> Vec<String> {
    token_spans(query)
        .into_iter()
        .map(|(s, e)| &query[s..e])
        .filter(|word| !matches!(*word, "AND" | "OR" | "NOT"))
        .map(str::to_lowercase)
        .collect()
}

fn query_string_score(clause: &Value, document: &Value) -> Option<f64> {
    let query_tokens = query_string_tokens(clause.get("query")?.as_str()?);
    let field_tokens: Vec<String> = match clause.get("default_field").and_then(Value::as_str) {
        Some(field) => tokens(&text_of(lookup(document, field)?)),
        None => document
            .as_object()?
            .values()
            .filter_map(Value::as_str)
            .flat_map(tokens)
            .collect(),
    };
    let matched = query_tokens
        .iter()
        .filter(|token| field_tokens.contains(token))
        .count();
    (matched > 0).then_some(matched as f64)
}

/// Score of `document` stored under `id` for `query`, or `None` when it does
/// not match.
fn score(query: &Value, id: &str, document: &Value) -> Option<f64> {
    let (kind, clause) = single_entry(query)?;
    match kind {
        "match_all" => Some(1.0),
        "term" => {
            let (field, spec) = single_entry(clause)?;
            let (value, boost) = value_and_boost(spec, "value");
            let stored = lookup(document, field)?;
            term_matches(field, stored, value).then_some(boost)
        }
        "terms" => {
            let (field, values) = single_entry(clause)?;
            let stored = lookup(document, field)?;
            values
                .as_array()?
                .iter()
                .any(|value| term_matches(field, stored, value))
                .then_some(1.0)
        }
        "range" => {
            let (field, bounds) = single_entry(clause)?;
            in_range(lookup(document, field)?, bounds).then_some(1.0)
        }
        "match" => {
            let (field, spec) = single_entry(clause)?;
            let (query_text, boost) = value_and_boost(spec, "query");
            let field_tokens = tokens(&text_of(lookup(document, field)?));
            let matched = tokens(&text_of(query_text))
                .iter()
                .filter(|token| field_tokens.contains(token))
                .count();
            (matched > 0).then(|| matched as f64 * boost)
        }
        "match_phrase" => {
            let (field, phrase) = single_entry(clause)?;
            let phrase_tokens = tokens(&text_of(phrase));
            let field_tokens = tokens(&text_of(lookup(document, field)?));
            (!phrase_tokens.is_empty()
                && field_tokens
                    .windows(phrase_tokens.len())
                    .any(|window| window == phrase_tokens.as_slice()))
            .then_some(phrase_tokens.len() as f64)
        }
        "query_string" => query_string_score(clause, document),
        "ids" => clause
            .get("values")?
            .as_array()?
            .iter()
            .any(|value| value.as_str() == Some(id))
            .then_some(1.0),
        "bool" => bool_score(clause, id, document),
        _ => None,
    }
}

fn bool_score(clause: &Value, id: &str, document: &Value) -> Option<f64> {
    let mut total = 0.0;
    for query in clauses(clause, "must") {
        total += score(query, id, document)?;
    }
    for query in clauses(clause, "filter") {
        score(query, id, document)?;
    }
    if clauses(clause, "must_not")
        .iter()
        .any(|query| score(query, id, document).is_some())
    {
        return None;
    }

    let should = clauses(clause, "should");
    let scoring_only = clauses(clause, "must").is_empty() && clauses(clause, "filter").is_empty();
    let default_minimum = u64::from(scoring_only && !should.is_empty());
    let minimum = clause
        .get("minimum_should_match")
        .and_then(Value::as_u64)
        .unwrap_or(default_minimum) as usize;

    let mut matched = 0;
    for query in should {
        if let Some(s) = score(query, id, document) {
            matched += 1;
            total += s;
        }
    }
    (matched >= minimum).then_some(total)
}

fn compare_by_sort(sort: &[Value], a: &Value, b: &Value) -> Ordering {
    for key in sort {
        let Some((field, spec)) = single_entry(key) else {
            continue;
        };
        let descending = spec.get("order").and_then(Value::as_str) == Some("desc");
        let ordering = match (lookup(a, field), lookup(b, field)) {
            (Some(x), Some(y)) => {
                let ordering = compare_values(x, y).unwrap_or(Ordering::Equal);
                if descending {
                    ordering.reverse()
                } else {
                    ordering
                }
            }
            // Missing values sort last in both directions.
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn string_list(value: Option<&Value>) -> Vec<&str> {
    value
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default()
}

fn project(document: &Value, filter: Option<&Value>) -> Value {
    let (Some(filter), Some(object)) = (filter, document.as_object()) else {
        return document.clone();
    };
    let includes = string_list(filter.get("includes"));
    let excludes = string_list(filter.get("excludes"));

    Value::Object(
        object
            .iter()
            .filter(|(key, _)| includes.is_empty() || includes.contains(&key.as_str()))
            .filter(|(key, _)| !excludes.contains(&key.as_str()))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    )
}

/// Terms of `query` that target `field`, skipping `must_not` clauses.
fn collect_terms(query: &Value, field: &str, terms: &mut HashSet<String>) {
    let Some((kind, clause)) = single_entry(query) else {
        return;
    };
    let targets = |name: &str| name.strip_suffix(".keyword").unwrap_or(name) == field;
    match kind {
        "match" | "match_phrase" | "term" => {
            if let Some((_, spec)) = single_entry(clause).filter(|(name, _)| targets(name)) {
                let key = if kind == "term" { "value" } else { "query" };
                let (text, _) = value_and_boost(spec, key);
                terms.extend(tokens(&text_of(text)));
            }
        }
        "query_string" => {
            let default_field = clause.get("default_field").and_then(Value::as_str);
            if default_field.map_or(true, targets) {
                let query = clause.get("query").and_then(Value::as_str).unwrap_or_default();
                terms.extend(query_string_tokens(query));
            }
        }
        "bool" => {
            for key in ["must", "should", "filter"] {
                for nested in clauses(clause, key) {
                    collect_terms(nested, field, terms);
                }
            }
        }
        _ => {}
    }
}

fn mark(text: &str, terms: &HashSet<String>, pre: &str, post: &str) -> Option<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    let mut marked = false;
    for (s, e) in token_spans(text) {
        if terms.contains(&text[s..e].to_lowercase()) {
            out.push_str(&text[last..s]);
            out.push_str(pre);
            out.push_str(&text[s..e]);
            out.push_str(post);
            last = e;
            marked = true;
        }
    }
    out.push_str(&text[last..]);
    marked.then_some(out)
}

fn highlight(query: &Value, document: &Value, options: &Value) -> Map<String, Value> {
    let pre = options["pre_tags"][0].as_str().unwrap_or("<em>");
    let post = options["post_tags"][0].as_str().unwrap_or("</em>");

    let mut out = Map::new();
    let Some(fields) = options.get("fields").and_then(Value::as_object) else {
        return out;
    };
    for field in fields.keys() {
        let mut terms = HashSet::new();
        collect_terms(query, field, &mut terms);
        let Some(text) = lookup(document, field).and_then(Value::as_str) else {
            continue;
        };
        if let Some(fragment) = mark(text, &terms, pre, post) {
            out.insert(field.clone(), json!([fragment]));
        }
    }
    out
}
