use crate::errors::SparqlError;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const SPARQL_RESULTS_JSON: &str = "application/sparql-results+json";
pub const TURTLE: &str = "text/turtle";
pub const JSON: &str = "application/json";

pub(crate) const QUERY_KEY: &str = "query";
pub(crate) const UPDATE_KEY: &str = "update";
pub(crate) const DEFAULT_GRAPH_KEY: &str = "default-graph-uri";
pub(crate) const NAMED_GRAPH_KEY: &str = "named-graph-uri";

#[derive(PartialEq, Eq, Debug, Clone, Copy, Hash)]
pub enum QueryForm {
    Select,
    Ask,
    Construct,
    Describe,
}

impl QueryForm {
    pub fn as_str(&self) -> &str {
        match self {
            QueryForm::Select => "select",
            QueryForm::Ask => "ask",
            QueryForm::Construct => "construct",
            QueryForm::Describe => "describe",
        }
    }

    /// Graph forms return a serialized document, the others a results document.
    pub fn returns_graph(&self) -> bool {
        matches!(self, QueryForm::Construct | QueryForm::Describe)
    }

    pub fn default_media_type(&self) -> &'static str {
        if self.returns_graph() {
            TURTLE
        } else {
            SPARQL_RESULTS_JSON
        }
    }

    pub fn accept<'a>(&self, media_type: Option<&'a str>) -> &'a str {
        match media_type {
            Some(m) => m,
            None => self.default_media_type(),
        }
    }
}

impl Display for QueryForm {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for QueryForm {
    type Err = SparqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "select" => Ok(QueryForm::Select),
            "ask" => Ok(QueryForm::Ask),
            "construct" => Ok(QueryForm::Construct),
            "describe" => Ok(QueryForm::Describe),
            _ => Err(SparqlError::UnknownQueryForm(s.to_string())),
        }
    }
}

pub fn is_json_media_type(media_type: &str) -> bool {
    let essence = media_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    essence == JSON || essence.ends_with("+json")
}

pub(crate) fn request_params<'a>(
    key: &'a str,
    request: &'a str,
    default_graphs: &'a [String],
    named_graphs: &'a [String],
) -> Vec<(&'a str, &'a str)> {
    let mut params = vec![(key, request)];
    for g in default_graphs {
        params.push((DEFAULT_GRAPH_KEY, g.as_str()));
    }
    for g in named_graphs {
        params.push((NAMED_GRAPH_KEY, g.as_str()));
    }
    params
}
