use crate::config::{ClientConfig, Method};
use crate::errors::SparqlError;
use crate::query::{request_params, QueryForm, JSON, QUERY_KEY, UPDATE_KEY};
use crate::results::{parse_query_body, parse_update_body, Bindings, QueryResponse, UpdateResponse};
use log::{debug, trace, warn};
use reqwest::header::{HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Client, Url};

/// Client for one SPARQL 1.1 Protocol endpoint.
///
/// Every call is a single request followed by the configured courtesy sleep.
/// There are no retries; wrap calls in [`crate::retry::RetryPolicy`] where needed.
#[derive(Debug)]
pub struct Sparqler {
    config: ClientConfig,
    endpoint: Url,
    client: Client,
    user_agent: Option<HeaderValue>,
}

impl Sparqler {
    /// Fails before any network activity if `config` does not pass
    /// [`ClientConfig::validate`]. Without a `session` a fresh client is built.
    pub fn new(config: ClientConfig, session: Option<Client>) -> Result<Sparqler, SparqlError> {
        config.validate()?;
        let endpoint = config.endpoint_url()?;
        let user_agent = match &config.user_agent {
            Some(ua) => Some(
                HeaderValue::from_str(ua)
                    .map_err(|e| SparqlError::InvalidUserAgent(format!("{}: {}", ua, e)))?,
            ),
            None => None,
        };
        let client = match session {
            Some(session) => session,
            None => Client::builder().build()?,
        };
        Ok(Sparqler {
            config,
            endpoint,
            client,
            user_agent,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub async fn query(
        &self,
        query: &str,
        form: QueryForm,
        media_type: Option<&str>,
        default_graphs: &[String],
        named_graphs: &[String],
    ) -> Result<Option<QueryResponse>, SparqlError> {
        let accept = form.accept(media_type);
        let params = request_params(QUERY_KEY, query, default_graphs, named_graphs);
        debug!(
            "Sending {} query to {} with {} accepting {}",
            form, self.endpoint, self.config.method, accept
        );
        let body = self.exchange(self.config.method, accept, &params).await?;
        parse_query_body(&form, accept, body, self.config.strict_json)
    }

    pub async fn select(&self, query: &str) -> Result<Option<Bindings>, SparqlError> {
        let response = self.query(query, QueryForm::Select, None, &[], &[]).await?;
        Ok(match response {
            Some(QueryResponse::Bindings(b)) => Some(b),
            _ => None,
        })
    }

    pub async fn ask(&self, query: &str) -> Result<Option<bool>, SparqlError> {
        let response = self.query(query, QueryForm::Ask, None, &[], &[]).await?;
        Ok(response.and_then(|r| r.as_boolean()))
    }

    /// Sends a SPARQL update. Updates always go out as POST regardless of the configured method.
    pub async fn update(
        &self,
        request: &str,
        media_type: Option<&str>,
        default_graphs: &[String],
        named_graphs: &[String],
    ) -> Result<Option<UpdateResponse>, SparqlError> {
        let accept = media_type.unwrap_or(JSON);
        let params = request_params(UPDATE_KEY, request, default_graphs, named_graphs);
        debug!("Sending update to {} accepting {}", self.endpoint, accept);
        let body = self.exchange(Method::Post, accept, &params).await?;
        parse_update_body(accept, body, self.config.strict_json)
    }

    pub async fn load(
        &self,
        file_location: &str,
        graph_uri: &str,
        s3_bucket: Option<&str>,
    ) -> Result<Option<UpdateResponse>, SparqlError> {
        let location = match s3_bucket {
            Some(bucket) => s3_location(bucket, file_location),
            None => file_location.to_string(),
        };
        let request = format!("LOAD <{}> INTO GRAPH <{}>", location, graph_uri);
        self.update(&request, None, &[], &[]).await
    }

    pub async fn drop_graph(&self, graph_uri: &str) -> Result<Option<UpdateResponse>, SparqlError> {
        let request = format!("DROP GRAPH <{}>", graph_uri);
        self.update(&request, None, &[], &[]).await
    }

    async fn exchange(
        &self,
        method: Method,
        accept: &str,
        params: &[(&str, &str)],
    ) -> Result<String, SparqlError> {
        let builder = match method {
            Method::Get => self.client.get(self.endpoint.clone()).query(params),
            Method::Post => self.client.post(self.endpoint.clone()).form(params),
        };
        let mut builder = builder.header(ACCEPT, accept);
        if let Some(user_agent) = &self.user_agent {
            builder = builder.header(USER_AGENT, user_agent.clone());
        }
        let response = builder.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!("Endpoint {} answered with status {}", self.endpoint, status);
        }
        let body = response.text().await?;
        trace!("Response body: {}", body);
        if !self.config.sleep.is_zero() {
            tokio::time::sleep(self.config.sleep).await;
        }
        Ok(body)
    }
}

fn s3_location(bucket: &str, file_location: &str) -> String {
    format!(
        "https://{}.s3.amazonaws.com/{}",
        bucket,
        file_location.trim_start_matches('/')
    )
}
