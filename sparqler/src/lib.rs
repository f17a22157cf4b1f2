//! Client for SPARQL 1.1 Protocol endpoints such as the Wikidata, Wikibase and
//! Wikimedia Commons query services.

pub mod client;
pub mod config;
pub mod errors;
pub mod query;
pub mod results;
pub mod retry;
pub mod session;
pub mod term;

pub use client::Sparqler;
pub use config::{ClientConfig, Method};
pub use errors::{RetryError, SparqlError, TermError};
pub use query::QueryForm;
pub use results::{Bindings, QueryResponse, UpdateResponse};
pub use term::{RdfTerm, Solution};
