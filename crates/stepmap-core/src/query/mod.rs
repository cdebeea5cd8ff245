//! Path queries over parsed wire documents.
//!
//! A document is the JSON shape of an XML tree: elements are object keys,
//! repeated elements are arrays, attributes are keys carrying the attribute
//! prefix (`@` by default). Tags are compared by local name, so `ns:tool`
//! and `tool` address the same element.
//!
//! Evaluation never fails past the public boundary: [`evaluate`] returns a
//! [`QueryResponse`] that is either the selected sub-tree or a structured
//! error, and [`QueryResponse::into_document`] renders both as a document.

use std::fmt;

use serde::Serialize;
use serde_json::{json, Map, Value};
use thiserror::Error;

use crate::config::{CoreConfig, LimitsConfig, QueryConfig};

pub mod parse;

pub use parse::{parse_query, AttrFilter, QueryToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum QueryErrorCode {
    #[serde(rename = "INDEX_ERROR")]
    Index,
    #[serde(rename = "NODE_NOT_FOUND")]
    NodeNotFound,
    #[serde(rename = "TYPE_ERROR")]
    Type,
    #[serde(rename = "INTERNAL_ERROR")]
    Internal,
}

impl QueryErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Index => "INDEX_ERROR",
            Self::NodeNotFound => "NODE_NOT_FOUND",
            Self::Type => "TYPE_ERROR",
            Self::Internal => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for QueryErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{code} at {path}: {message}")]
pub struct QueryError {
    pub code: QueryErrorCode,
    pub path: String,
    pub message: String,
}

impl QueryError {
    pub fn new(code: QueryErrorCode, path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn to_document(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "path": self.path,
                "message": self.message,
            }
        })
    }
}

/// Outcome of a path query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryResponse {
    Found {
        /// Local name of the last tag in the query.
        tag: Option<String>,
        value: Value,
    },
    Failed(QueryError),
}

impl QueryResponse {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Found { value, .. } => Some(value),
            Self::Failed(_) => None,
        }
    }

    pub fn error(&self) -> Option<&QueryError> {
        match self {
            Self::Failed(e) => Some(e),
            Self::Found { .. } => None,
        }
    }

    /// Render as a single-rooted document.
    ///
    /// A list result under tag `t` is wrapped as `{"t_list": {"t": [...]}}`;
    /// a single result as `{"t": value}`; failures as
    /// `{"error": {"code", "path", "message"}}`.
    pub fn into_document(self) -> Value {
        match self {
            Self::Failed(e) => e.to_document(),
            Self::Found { tag: None, value } => value,
            Self::Found {
                tag: Some(t),
                value: Value::Array(items),
            } => {
                let mut inner = Map::new();
                inner.insert(t.clone(), Value::Array(items));
                let mut outer = Map::new();
                outer.insert(format!("{t}_list"), Value::Object(inner));
                Value::Object(outer)
            }
            Self::Found { tag: Some(t), value } => {
                let mut m = Map::new();
                m.insert(t, value);
                Value::Object(m)
            }
        }
    }
}

/// Evaluate a query with default settings.
pub fn evaluate(doc: &Value, query: &str) -> QueryResponse {
    QueryEvaluator::default().evaluate(doc, query)
}

/// Evaluate a query and always return a document.
pub fn evaluate_document(doc: &Value, query: &str) -> Value {
    evaluate(doc, query).into_document()
}

#[derive(Debug, Clone)]
pub struct QueryEvaluator {
    attribute_prefix: String,
    max_segments: usize,
}

impl Default for QueryEvaluator {
    fn default() -> Self {
        Self::new(&QueryConfig::default(), &LimitsConfig::default())
    }
}

enum Context<'a> {
    One(&'a Value),
    Many(Vec<&'a Value>),
}

impl QueryEvaluator {
    pub fn new(query: &QueryConfig, limits: &LimitsConfig) -> Self {
        Self {
            attribute_prefix: query.attribute_prefix.clone(),
            max_segments: limits.max_query_segments,
        }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(&cfg.query, &cfg.limits)
    }

    pub fn evaluate(&self, doc: &Value, query: &str) -> QueryResponse {
        match self.run(doc, query) {
            Ok(resp) => resp,
            Err(e) => {
                tracing::debug!(query, code = %e.code, path = %e.path, "query failed");
                QueryResponse::Failed(e)
            }
        }
    }

    fn run<'a>(&self, doc: &'a Value, query: &str) -> Result<QueryResponse, QueryError> {
        let tokens = parse_query(query, self.max_segments)?;

        let mut ctx = Context::One(doc);
        let mut last_tag: Option<String> = None;

        for (i, tok) in tokens.iter().enumerate() {
            let path = || {
                tokens[..=i]
                    .iter()
                    .map(|t| t.raw.as_str())
                    .collect::<Vec<_>>()
                    .join("/")
            };

            ctx = match &tok.tag {
                None => {
                    let index = tok.index.ok_or_else(|| {
                        QueryError::new(
                            QueryErrorCode::Internal,
                            path(),
                            "index token without index",
                        )
                    })?;
                    let items: Vec<&Value> = match ctx {
                        Context::Many(items) => items,
                        Context::One(Value::Array(items)) => items.iter().collect(),
                        Context::One(_) => {
                            return Err(QueryError::new(QueryErrorCode::Type, path(), "not a list"))
                        }
                    };
                    let len = items.len();
                    let picked = items.into_iter().nth(index).ok_or_else(|| {
                        QueryError::new(
                            QueryErrorCode::Index,
                            path(),
                            format!("index {index} out of range for list of length {len}"),
                        )
                    })?;
                    Context::One(picked)
                }
                Some(tag) => {
                    let Context::One(Value::Object(obj)) = ctx else {
                        return Err(QueryError::new(
                            QueryErrorCode::Type,
                            path(),
                            format!("cannot select '{tag}' from a non-object"),
                        ));
                    };
                    last_tag = Some(local_name(tag).to_string());
                    let child = self.child(obj, tag).ok_or_else(|| {
                        QueryError::new(
                            QueryErrorCode::NodeNotFound,
                            path(),
                            format!("no element named '{tag}'"),
                        )
                    })?;
                    self.select(child, tok, &path)?
                }
            };
        }

        let value = match ctx {
            Context::One(v) => v.clone(),
            Context::Many(items) => Value::Array(items.into_iter().cloned().collect()),
        };
        Ok(QueryResponse::Found { tag: last_tag, value })
    }

    fn child<'a>(&self, obj: &'a Map<String, Value>, tag: &str) -> Option<&'a Value> {
        let want = local_name(tag);
        obj.iter()
            .filter(|(k, _)| !k.starts_with(self.attribute_prefix.as_str()))
            .find(|(k, _)| local_name(k) == want)
            .map(|(_, v)| v)
    }

    /// Apply a token's filter and index to the element it selected.
    fn select<'a>(
        &self,
        child: &'a Value,
        tok: &QueryToken,
        path: &dyn Fn() -> String,
    ) -> Result<Context<'a>, QueryError> {
        let not_found = || {
            QueryError::new(
                QueryErrorCode::NodeNotFound,
                path(),
                "no element matches the attribute filter",
            )
        };

        match child {
            Value::Array(items) => {
                let filtered: Vec<&Value> = match &tok.filter {
                    Some(f) => items.iter().filter(|v| self.matches(v, f)).collect(),
                    None => items.iter().collect(),
                };
                if tok.filter.is_some() && filtered.is_empty() {
                    return Err(not_found());
                }
                match tok.index {
                    Some(i) => {
                        let len = filtered.len();
                        filtered.into_iter().nth(i).map(Context::One).ok_or_else(|| {
                            QueryError::new(
                                QueryErrorCode::Index,
                                path(),
                                format!("index {i} out of range for list of length {len}"),
                            )
                        })
                    }
                    None => Ok(Context::Many(filtered)),
                }
            }
            single => {
                if let Some(f) = &tok.filter {
                    if !self.matches(single, f) {
                        return Err(not_found());
                    }
                }
                match tok.index {
                    None | Some(0) => Ok(Context::One(single)),
                    Some(i) => Err(QueryError::new(
                        QueryErrorCode::Index,
                        path(),
                        format!("index {i} out of range for single element"),
                    )),
                }
            }
        }
    }

    fn matches(&self, v: &Value, f: &AttrFilter) -> bool {
        let Some(obj) = v.as_object() else {
            return false;
        };
        let want = local_name(&f.attr);
        obj.iter()
            .filter_map(|(k, v)| k.strip_prefix(self.attribute_prefix.as_str()).map(|a| (a, v)))
            .find(|(a, _)| local_name(a) == want)
            .map(|(_, v)| match v {
                Value::String(s) => *s == f.value,
                Value::Number(n) => n.to_string() == f.value,
                Value::Bool(b) => b.to_string() == f.value,
                _ => false,
            })
            .unwrap_or(false)
    }
}

/// Strip a namespace prefix: `ns:tool` -> `tool`.
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, l)| l).unwrap_or(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Value {
        json!({
            "a": {
                "@version": "1",
                "b": [
                    {"@x": "1", "v": 10},
                    {"@x": "2", "v": 20},
                    {"@x": "1", "v": 30}
                ],
                "p:single": {"@id": 7, "name": "only"}
            }
        })
    }

    #[test]
    fn filter_then_index() {
        let r = evaluate(&doc(), "a/b[@x='1'][0]");
        assert_eq!(r.value().unwrap()["v"], 10);
        let r = evaluate(&doc(), "a/b[@x=\"1\"][1]");
        assert_eq!(r.value().unwrap()["v"], 30);
    }

    #[test]
    fn filter_without_match_is_node_not_found() {
        let r = evaluate(&doc(), "a/b[@x='9']");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::NodeNotFound);
        let d = r.into_document();
        assert_eq!(d["error"]["code"], "NODE_NOT_FOUND");
        assert_eq!(d["error"]["path"], "a/b[@x='9']");
    }

    #[test]
    fn index_out_of_bounds_reports_path() {
        let d = evaluate_document(&json!({"a": {"b": [1, 2]}}), "a/b[5]");
        assert_eq!(d["error"]["code"], "INDEX_ERROR");
        assert_eq!(d["error"]["path"], "a/b[5]");
    }

    #[test]
    fn list_results_are_wrapped() {
        let d = evaluate_document(&doc(), "a/b[@x='1']");
        let items = d["b_list"]["b"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1]["v"], 30);
    }

    #[test]
    fn pure_index_consumes_list_context() {
        let r = evaluate(&doc(), "a/b/2/v");
        assert_eq!(r.value(), Some(&json!(30)));
        let r = evaluate(&doc(), "a/b[@x='2']/0");
        assert_eq!(r.value().unwrap()["v"], 20);
    }

    #[test]
    fn pure_index_on_object_is_type_error() {
        let r = evaluate(&doc(), "a/0");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::Type);
    }

    #[test]
    fn tag_on_list_is_type_error() {
        let r = evaluate(&doc(), "a/b/v");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::Type);
    }

    #[test]
    fn namespaces_are_ignored() {
        let r = evaluate(&doc(), "a/single[@id='7']");
        assert_eq!(r.value().unwrap()["name"], "only");
        let r = evaluate(&doc(), "x:a/q:single");
        assert!(r.is_found());
        let d = r.into_document();
        assert_eq!(d["single"]["name"], "only");
    }

    #[test]
    fn single_element_filter_mismatch_and_index() {
        let r = evaluate(&doc(), "a/single[@id='8']");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::NodeNotFound);
        assert!(evaluate(&doc(), "a/single[0]").is_found());
        let r = evaluate(&doc(), "a/single[1]");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::Index);
    }

    #[test]
    fn attributes_are_not_elements() {
        let r = evaluate(&doc(), "a/version");
        assert_eq!(r.error().unwrap().code, QueryErrorCode::NodeNotFound);
    }

    #[test]
    fn malformed_query_is_internal_error() {
        let d = evaluate_document(&doc(), "a/b[");
        assert_eq!(d["error"]["code"], "INTERNAL_ERROR");
    }
}
