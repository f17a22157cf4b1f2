use crate::errors::SparqlError;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::{Client, Url};
use std::sync::Arc;

const COMMONS_OAUTH_COOKIE: &str = "wcqsOauth";
const COMMONS_QUERY_DOMAIN: &str = "commons-query.wikimedia.org";

/// A login cookie obtained out of band, e.g. by signing in to the query service in a browser.
#[derive(Debug, Clone)]
pub struct AuthCookie {
    pub name: String,
    pub value: String,
    /// `None` scopes the cookie to the exact host it is registered for.
    pub domain: Option<String>,
    pub path: String,
    pub secure: bool,
}

impl AuthCookie {
    pub fn new(name: &str, value: &str) -> AuthCookie {
        AuthCookie {
            name: name.to_string(),
            value: value.to_string(),
            domain: None,
            path: "/".to_string(),
            secure: false,
        }
    }

    pub fn commons_oauth(value: &str) -> AuthCookie {
        AuthCookie {
            name: COMMONS_OAUTH_COOKIE.to_string(),
            value: value.to_string(),
            domain: Some(COMMONS_QUERY_DOMAIN.to_string()),
            path: "/".to_string(),
            secure: true,
        }
    }

    fn header_value(&self) -> String {
        let mut s = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(domain) = &self.domain {
            s.push_str("; Domain=");
            s.push_str(domain);
        }
        if self.secure {
            s.push_str("; Secure");
        }
        s
    }
}

/// Builds the HTTP session handed to [`crate::Sparqler::new`] for endpoints behind a login.
#[derive(Default)]
pub struct SessionBuilder {
    jar: Arc<Jar>,
    user_agent: Option<String>,
}

impl SessionBuilder {
    pub fn new() -> SessionBuilder {
        SessionBuilder::default()
    }

    pub fn with_user_agent(mut self, user_agent: &str) -> SessionBuilder {
        self.user_agent = Some(user_agent.to_string());
        self
    }

    pub fn with_cookie(self, endpoint: &str, cookie: &AuthCookie) -> Result<SessionBuilder, SparqlError> {
        let url = Url::parse(endpoint)
            .map_err(|e| SparqlError::InvalidEndpoint(format!("{}: {}", endpoint, e)))?;
        self.jar.add_cookie_str(&cookie.header_value(), &url);
        // The jar drops cookies whose domain or secure flag do not match the url.
        let prefix = format!("{}=", cookie.name);
        let stored = self
            .jar
            .cookies(&url)
            .and_then(|h| h.to_str().map(|s| s.to_string()).ok())
            .map(|s| s.split("; ").any(|c| c.starts_with(&prefix)))
            .unwrap_or(false);
        if !stored {
            return Err(SparqlError::InvalidEndpoint(format!(
                "cookie {} (domain {}, secure {}) is not sent to {}",
                cookie.name,
                cookie.domain.as_deref().unwrap_or("<host>"),
                cookie.secure,
                endpoint
            )));
        }
        Ok(self)
    }

    pub fn build(self) -> Result<Client, SparqlError> {
        let mut builder = Client::builder().cookie_provider(self.jar);
        if let Some(user_agent) = self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        Ok(builder.build()?)
    }
}
