use thiserror::Error;

#[derive(Debug, Error)]
pub enum SparqlError {
    #[error("A user agent is required by the Wikidata query service, see https://meta.wikimedia.org/wiki/User-Agent_policy")]
    MissingUserAgent,
    #[error("Invalid endpoint {0}")]
    InvalidEndpoint(String),
    #[error("Invalid user agent {0}")]
    InvalidUserAgent(String),
    #[error("Unknown query form {0}, expected one of select, ask, construct, describe")]
    UnknownQueryForm(String),
    #[error("Unknown HTTP method {0}, expected get or post")]
    UnknownMethod(String),
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error("Response body was not valid JSON: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("Response JSON is missing {0}")]
    UnexpectedShape(String),
}

#[derive(Debug, Error)]
pub enum TermError {
    #[error(transparent)]
    Iri(#[from] oxrdf::IriParseError),
    #[error(transparent)]
    BlankNode(#[from] oxrdf::BlankNodeIdParseError),
    #[error(transparent)]
    LanguageTag(#[from] oxrdf::LanguageTagParseError),
    #[error("Malformed binding for variable {variable}: {source}")]
    MalformedBinding {
        variable: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("Binding is not a JSON object")]
    NotAnObject,
}

#[derive(Debug, Error)]
pub enum RetryError {
    #[error("Giving up: {0}")]
    Fatal(String),
    #[error("Still asked to back off after {attempts} attempts")]
    Exhausted { attempts: u32 },
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
}
