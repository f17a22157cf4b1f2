//! Backoff for MediaWiki API writes.
//!
//! The action API rejects edits with `{"error": {"code": "maxlag"}}` while the
//! database replicas lag behind. [`RetryPolicy::run`] repeats a request with a
//! doubling, capped delay until a [`ResponseClassifier`] accepts the response,
//! declares it fatal, or the retry budget runs out.

use crate::errors::RetryError;
use backoff::backoff::Backoff;
use backoff::future::retry_notify;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use log::{debug, warn};
use reqwest::header::RETRY_AFTER;
use reqwest::{Response, StatusCode};
use serde_json::Value;
use std::future::Future;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: 10,
            initial_delay: Duration::from_secs(5),
            max_delay: Duration::from_secs(300),
        }
    }
}

/// A response whose body has been read.
#[derive(Debug, Clone)]
pub struct Attempt {
    pub status: StatusCode,
    pub retry_after: Option<Duration>,
    pub body: String,
}

impl Attempt {
    pub async fn read(response: Response) -> Result<Attempt, reqwest::Error> {
        let status = response.status();
        let retry_after = response.headers().get(RETRY_AFTER).and_then(|v| {
            let seconds = v.to_str().ok().and_then(|s| s.trim().parse::<u64>().ok());
            if seconds.is_none() {
                debug!("Ignoring Retry-After header {:?}, only delta-seconds are used", v);
            }
            seconds.map(Duration::from_secs)
        });
        let body = response.text().await?;
        Ok(Attempt {
            status,
            retry_after,
            body,
        })
    }

    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.body).ok()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Done,
    Retry { after: Option<Duration> },
    Fatal(String),
}

pub trait ResponseClassifier {
    fn classify(&self, attempt: &Attempt) -> Verdict;
}

impl<F> ResponseClassifier for F
where
    F: Fn(&Attempt) -> Verdict,
{
    fn classify(&self, attempt: &Attempt) -> Verdict {
        self(attempt)
    }
}

/// Classifies MediaWiki action API responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct MaxlagClassifier;

impl ResponseClassifier for MaxlagClassifier {
    fn classify(&self, attempt: &Attempt) -> Verdict {
        let error = attempt
            .json()
            .and_then(|mut v| v.get_mut("error").map(Value::take));
        if let Some(Value::Object(error)) = error {
            let code = error.get("code").and_then(Value::as_str).unwrap_or("unknown");
            if code == "maxlag" {
                return Verdict::Retry {
                    after: attempt.retry_after,
                };
            }
            let info = error.get("info").and_then(Value::as_str).unwrap_or("");
            return Verdict::Fatal(format!("{}: {}", code, info));
        }
        if attempt.status == StatusCode::TOO_MANY_REQUESTS
            || attempt.status == StatusCode::SERVICE_UNAVAILABLE
        {
            return Verdict::Retry {
                after: attempt.retry_after,
            };
        }
        if !attempt.status.is_success() {
            return Verdict::Fatal(format!("status {}", attempt.status));
        }
        Verdict::Done
    }
}

impl RetryPolicy {
    /// Doubling schedule without jitter, capped at `max_delay`.
    pub fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_max_interval(self.max_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_elapsed_time(None)
            .build()
    }

    pub async fn run<C, F, Fut>(&self, classifier: &C, mut attempt: F) -> Result<Attempt, RetryError>
    where
        C: ResponseClassifier + ?Sized,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Response, reqwest::Error>>,
    {
        let hint = Arc::new(Mutex::new(None));
        let backoff = HintedBackoff {
            inner: self.backoff(),
            hint: hint.clone(),
        };
        let max_retries = self.max_retries;
        let mut attempts = 0;
        let operation = || {
            attempts += 1;
            let number = attempts;
            let response = attempt();
            let hint = hint.clone();
            async move {
                let response = response
                    .await
                    .map_err(|e| backoff::Error::permanent(RetryError::from(e)))?;
                let current = Attempt::read(response)
                    .await
                    .map_err(|e| backoff::Error::permanent(RetryError::from(e)))?;
                match classifier.classify(&current) {
                    Verdict::Done => Ok(current),
                    Verdict::Fatal(reason) => {
                        Err(backoff::Error::permanent(RetryError::Fatal(reason)))
                    }
                    Verdict::Retry { after } => {
                        let exhausted = RetryError::Exhausted { attempts: number };
                        if number > max_retries {
                            return Err(backoff::Error::permanent(exhausted));
                        }
                        if let Ok(mut hint) = hint.lock() {
                            *hint = after;
                        }
                        Err(backoff::Error::transient(exhausted))
                    }
                }
            }
        };
        retry_notify(backoff, operation, |err: RetryError, delay: Duration| {
            warn!("{}, retrying in {:?}", err, delay)
        })
        .await
    }
}

/// Exponential schedule where a server hint can only lengthen the wait.
struct HintedBackoff {
    inner: ExponentialBackoff,
    hint: Arc<Mutex<Option<Duration>>>,
}

impl Backoff for HintedBackoff {
    fn reset(&mut self) {
        self.inner.reset();
    }

    fn next_backoff(&mut self) -> Option<Duration> {
        let delay = self.inner.next_backoff()?;
        let hint = self.hint.lock().ok().and_then(|mut h| h.take());
        Some(match hint {
            Some(after) => delay.max(after),
            None => delay,
        })
    }
}
