use crate::errors::{SparqlError, TermError};
use crate::query::{is_json_media_type, QueryForm};
use crate::term::{solution_from_json, Solution};
use log::warn;
use serde_json::Value;

#[derive(PartialEq, Debug, Clone)]
pub enum QueryResponse {
    Bindings(Bindings),
    Boolean(bool),
    /// Body of a graph query, or of a results document in a non-JSON format.
    Text(String),
}

impl QueryResponse {
    pub fn as_bindings(&self) -> Option<&Bindings> {
        if let QueryResponse::Bindings(b) = self {
            Some(b)
        } else {
            None
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        if let QueryResponse::Boolean(b) = self {
            Some(*b)
        } else {
            None
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        if let QueryResponse::Text(t) = self {
            Some(t)
        } else {
            None
        }
    }
}

/// The `results.bindings` array as the endpoint sent it.
#[derive(PartialEq, Debug, Clone, Default)]
pub struct Bindings(Vec<Value>);

impl Bindings {
    pub fn new(raw: Vec<Value>) -> Bindings {
        Bindings(raw)
    }

    pub fn raw(&self) -> &[Value] {
        &self.0
    }

    pub fn into_raw(self) -> Vec<Value> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn solutions(&self) -> Result<Vec<Solution>, TermError> {
        self.0.iter().map(solution_from_json).collect()
    }
}

#[derive(PartialEq, Debug, Clone)]
pub enum UpdateResponse {
    Json(Value),
    Text(String),
}

pub(crate) fn parse_query_body(
    form: &QueryForm,
    accept: &str,
    body: String,
    strict_json: bool,
) -> Result<Option<QueryResponse>, SparqlError> {
    if form.returns_graph() || !is_json_media_type(accept) {
        return Ok(Some(QueryResponse::Text(body)));
    }
    let mut document: Value = match serde_json::from_str(&body) {
        Ok(document) => document,
        Err(e) => return no_value(SparqlError::Decode(e), strict_json),
    };
    match form {
        QueryForm::Select => match document.pointer_mut("/results/bindings").map(Value::take) {
            Some(Value::Array(bindings)) => {
                Ok(Some(QueryResponse::Bindings(Bindings::new(bindings))))
            }
            _ => no_value(
                SparqlError::UnexpectedShape("results.bindings".to_string()),
                strict_json,
            ),
        },
        QueryForm::Ask => match document.get("boolean").and_then(Value::as_bool) {
            Some(b) => Ok(Some(QueryResponse::Boolean(b))),
            None => no_value(
                SparqlError::UnexpectedShape("boolean".to_string()),
                strict_json,
            ),
        },
        QueryForm::Construct | QueryForm::Describe => Ok(Some(QueryResponse::Text(body))),
    }
}

pub(crate) fn parse_update_body(
    accept: &str,
    body: String,
    strict_json: bool,
) -> Result<Option<UpdateResponse>, SparqlError> {
    if !is_json_media_type(accept) {
        return Ok(Some(UpdateResponse::Text(body)));
    }
    match serde_json::from_str(&body) {
        Ok(document) => Ok(Some(UpdateResponse::Json(document))),
        Err(e) => no_value(SparqlError::Decode(e), strict_json),
    }
}

fn no_value<T>(err: SparqlError, strict_json: bool) -> Result<Option<T>, SparqlError> {
    if strict_json {
        Err(err)
    } else {
        warn!("Discarding unusable response: {}", err);
        Ok(None)
    }
}
