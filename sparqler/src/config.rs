use crate::errors::SparqlError;
use reqwest::Url;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use std::time::Duration;

pub const WIKIDATA_ENDPOINT: &str = "https://query.wikidata.org/sparql";
pub const COMMONS_QUERY_ENDPOINT: &str = "https://commons-query.wikimedia.org/sparql";
pub const DEFAULT_SLEEP: Duration = Duration::from_millis(100);

// Hosts whose usage policy rejects anonymous clients.
const USER_AGENT_REQUIRED_HOSTS: [&str; 1] = ["query.wikidata.org"];

#[derive(PartialEq, Eq, Debug, Clone, Copy, Default)]
pub enum Method {
    Get,
    #[default]
    Post,
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "get",
            Method::Post => "post",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Method {
    type Err = SparqlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            _ => Err(SparqlError::UnknownMethod(s.to_string())),
        }
    }
}

/// Settings of one endpoint. Fixed for the lifetime of a [`crate::Sparqler`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub endpoint: String,
    pub method: Method,
    pub user_agent: Option<String>,
    /// Courtesy pause after every exchange with the endpoint.
    pub sleep: Duration,
    /// Report undecodable JSON responses as errors instead of as no value.
    pub strict_json: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            endpoint: WIKIDATA_ENDPOINT.to_string(),
            method: Method::default(),
            user_agent: None,
            sleep: DEFAULT_SLEEP,
            strict_json: false,
        }
    }
}

impl ClientConfig {
    pub fn new(endpoint: &str) -> ClientConfig {
        ClientConfig::default().with_endpoint(endpoint)
    }

    pub fn with_endpoint(mut self, endpoint: &str) -> ClientConfig {
        self.endpoint = endpoint.to_string();
        self
    }

    pub fn with_method(mut self, method: Method) -> ClientConfig {
        self.method = method;
        self
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> ClientConfig {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn with_sleep(mut self, sleep: Duration) -> ClientConfig {
        self.sleep = sleep;
        self
    }

    pub fn with_strict_json(mut self, strict_json: bool) -> ClientConfig {
        self.strict_json = strict_json;
        self
    }

    pub fn endpoint_url(&self) -> Result<Url, SparqlError> {
        Url::parse(&self.endpoint)
            .map_err(|e| SparqlError::InvalidEndpoint(format!("{}: {}", self.endpoint, e)))
    }

    pub fn validate(&self) -> Result<(), SparqlError> {
        let url = self.endpoint_url()?;
        let has_user_agent = self
            .user_agent
            .as_ref()
            .map(|ua| !ua.trim().is_empty())
            .unwrap_or(false);
        if !has_user_agent {
            if let Some(host) = url.host_str() {
                if USER_AGENT_REQUIRED_HOSTS.contains(&host) {
                    return Err(SparqlError::MissingUserAgent);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_targets_wikidata_with_post() {
        let config = ClientConfig::default();
        assert_eq!(config.endpoint, WIKIDATA_ENDPOINT);
        assert_eq!(config.method, Method::Post);
        assert_eq!(config.sleep, Duration::from_millis(100));
        assert!(!config.strict_json);
    }

    #[test]
    fn test_wikidata_without_user_agent_is_rejected() {
        let res = ClientConfig::default().validate();
        assert!(matches!(res, Err(SparqlError::MissingUserAgent)));
        let res = ClientConfig::default().with_user_agent("  ").validate();
        assert!(matches!(res, Err(SparqlError::MissingUserAgent)));
    }

    #[test]
    fn test_other_endpoints_do_not_need_user_agent() {
        ClientConfig::new("https://wikibase.example.org/sparql")
            .validate()
            .unwrap();
        ClientConfig::default()
            .with_user_agent("TestBot/0.1 (mailto:someone@example.org)")
            .validate()
            .unwrap();
    }

    #[test]
    fn test_bad_endpoint_is_rejected() {
        let res = ClientConfig::new("not a url").validate();
        assert!(matches!(res, Err(SparqlError::InvalidEndpoint(_))));
    }

    #[test]
    fn test_method_from_str() {
        assert_eq!(Method::from_str("GET").unwrap(), Method::Get);
        assert_eq!(Method::from_str("post").unwrap(), Method::Post);
        assert!(Method::from_str("put").is_err());
    }
}
