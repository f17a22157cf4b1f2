//! Typed view of the terms in a SPARQL 1.1 Query Results JSON document.
//!
//! The wire format tags every bound value with a `type` of `uri`, `literal`
//! (or the legacy `typed-literal`) or `bnode`. [`RdfTerm`] mirrors that
//! without changing it: serializing an [`RdfTerm`] gives back the wire object.

use crate::errors::TermError;
use oxrdf::{BlankNode, Literal, NamedNode, Term};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// One result row: variable name (without `?`) to bound term.
/// Unbound variables are absent.
pub type Solution = BTreeMap<String, RdfTerm>;

#[derive(PartialEq, Eq, Debug, Clone, Serialize, Deserialize)]
#[serde(from = "WireTerm", into = "WireTerm")]
pub enum RdfTerm {
    Iri(String),
    Literal {
        value: String,
        datatype: Option<String>,
        language: Option<String>,
    },
    BlankNode(String),
}

impl RdfTerm {
    pub fn value(&self) -> &str {
        match self {
            RdfTerm::Iri(value) => value,
            RdfTerm::Literal { value, .. } => value,
            RdfTerm::BlankNode(value) => value,
        }
    }

    pub fn is_iri(&self) -> bool {
        matches!(self, RdfTerm::Iri(_))
    }

    pub fn to_oxrdf(&self) -> Result<Term, TermError> {
        let term: Term = match self {
            RdfTerm::Iri(iri) => NamedNode::new(iri.as_str())?.into(),
            RdfTerm::BlankNode(id) => BlankNode::new(id.as_str())?.into(),
            RdfTerm::Literal {
                value,
                datatype,
                language,
            } => {
                if let Some(language) = language {
                    Literal::new_language_tagged_literal(value.as_str(), language.as_str())?
                        .into()
                } else if let Some(datatype) = datatype {
                    Literal::new_typed_literal(value.as_str(), NamedNode::new(datatype.as_str())?)
                        .into()
                } else {
                    Literal::new_simple_literal(value.as_str()).into()
                }
            }
        };
        Ok(term)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(tag = "type")]
enum WireTerm {
    #[serde(rename = "uri")]
    Uri { value: String },
    #[serde(rename = "literal", alias = "typed-literal")]
    Literal {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        datatype: Option<String>,
        #[serde(rename = "xml:lang", default, skip_serializing_if = "Option::is_none")]
        language: Option<String>,
    },
    #[serde(rename = "bnode")]
    BNode { value: String },
}

impl From<WireTerm> for RdfTerm {
    fn from(wire: WireTerm) -> Self {
        match wire {
            WireTerm::Uri { value } => RdfTerm::Iri(value),
            WireTerm::Literal {
                value,
                datatype,
                language,
            } => RdfTerm::Literal {
                value,
                datatype,
                language,
            },
            WireTerm::BNode { value } => RdfTerm::BlankNode(value),
        }
    }
}

impl From<RdfTerm> for WireTerm {
    fn from(term: RdfTerm) -> Self {
        match term {
            RdfTerm::Iri(value) => WireTerm::Uri { value },
            RdfTerm::Literal {
                value,
                datatype,
                language,
            } => WireTerm::Literal {
                value,
                datatype,
                language,
            },
            RdfTerm::BlankNode(value) => WireTerm::BNode { value },
        }
    }
}

pub fn solution_from_json(binding: &Value) -> Result<Solution, TermError> {
    let object = binding.as_object().ok_or(TermError::NotAnObject)?;
    let mut solution = Solution::new();
    for (variable, value) in object {
        let term = RdfTerm::deserialize(value).map_err(|source| TermError::MalformedBinding {
            variable: variable.clone(),
            source,
        })?;
        solution.insert(variable.clone(), term);
    }
    Ok(solution)
}
