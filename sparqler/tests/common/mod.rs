#![allow(dead_code)]

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::routing::any;
use axum::Router;
use reqwest::Url;
use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

pub const TEST_USER_AGENT: &str = "sparqler-tests/0.1 (https://example.org/sparqler)";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: String,
}

impl RecordedRequest {
    pub fn query_pairs(&self) -> Vec<(String, String)> {
        decode_pairs(self.query.as_deref().unwrap_or(""))
    }

    pub fn body_pairs(&self) -> Vec<(String, String)> {
        decode_pairs(&self.body)
    }

    pub fn header(&self, name: &str) -> Option<String> {
        self.headers
            .get(name)
            .map(|v| v.to_str().unwrap().to_string())
    }
}

fn decode_pairs(encoded: &str) -> Vec<(String, String)> {
    let url = Url::parse(&format!("http://localhost/?{}", encoded)).unwrap();
    url.query_pairs()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: StatusCode,
    pub content_type: String,
    pub body: String,
    pub retry_after: Option<String>,
}

impl CannedResponse {
    pub fn ok(content_type: &str, body: &str) -> CannedResponse {
        CannedResponse {
            status: StatusCode::OK,
            content_type: content_type.to_string(),
            body: body.to_string(),
            retry_after: None,
        }
    }

    pub fn with_status(mut self, status: StatusCode) -> CannedResponse {
        self.status = status;
        self
    }

    pub fn with_retry_after(self, seconds: u64) -> CannedResponse {
        self.with_raw_retry_after(&seconds.to_string())
    }

    pub fn with_raw_retry_after(mut self, value: &str) -> CannedResponse {
        self.retry_after = Some(value.to_string());
        self
    }
}

struct MockState {
    requests: Mutex<Vec<RecordedRequest>>,
    responses: Mutex<VecDeque<CannedResponse>>,
}

/// A local SPARQL endpoint answering with canned responses in order.
/// The last response is repeated once the others are used up.
pub struct MockEndpoint {
    addr: SocketAddr,
    state: Arc<MockState>,
}

impl MockEndpoint {
    pub async fn start(responses: Vec<CannedResponse>) -> MockEndpoint {
        assert!(!responses.is_empty());
        let state = Arc::new(MockState {
            requests: Mutex::new(vec![]),
            responses: Mutex::new(responses.into_iter().collect()),
        });
        let app = Router::new()
            .route("/sparql", any(record))
            .with_state(state.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        MockEndpoint { addr, state }
    }

    pub async fn serving(content_type: &str, body: &str) -> MockEndpoint {
        MockEndpoint::start(vec![CannedResponse::ok(content_type, body)]).await
    }

    pub fn url(&self) -> String {
        format!("http://{}/sparql", self.addr)
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub fn single_request(&self) -> RecordedRequest {
        let requests = self.requests();
        assert_eq!(requests.len(), 1);
        requests.into_iter().next().unwrap()
    }
}

async fn record(
    State(state): State<Arc<MockState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Bytes,
) -> (StatusCode, HeaderMap, String) {
    state.requests.lock().unwrap().push(RecordedRequest {
        method,
        query: uri.query().map(|q| q.to_string()),
        headers,
        body: String::from_utf8_lossy(&body).to_string(),
    });
    let canned = {
        let mut responses = state.responses.lock().unwrap();
        if responses.len() > 1 {
            responses.pop_front().unwrap()
        } else {
            responses.front().cloned().unwrap()
        }
    };
    let mut response_headers = HeaderMap::new();
    response_headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&canned.content_type).unwrap(),
    );
    if let Some(value) = &canned.retry_after {
        response_headers.insert(header::RETRY_AFTER, HeaderValue::from_str(value).unwrap());
    }
    (canned.status, response_headers, canned.body)
}

pub fn select_fixture() -> serde_json::Value {
    serde_json::json!({
        "head": {"vars": ["item", "itemLabel", "sitelinks"]},
        "results": {"bindings": [
            {
                "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q42"},
                "itemLabel": {"xml:lang": "en", "type": "literal", "value": "Douglas Adams"},
                "sitelinks": {"datatype": "http://www.w3.org/2001/XMLSchema#integer",
                              "type": "literal", "value": "187"}
            },
            {
                "item": {"type": "uri", "value": "http://www.wikidata.org/entity/Q5593"},
                "itemLabel": {"xml:lang": "en", "type": "literal", "value": "Pablo Picasso"}
            }
        ]}
    })
}
