use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use thiserror::Error;
use url::Url;

/// Header carrying the anti-forgery token on mutating requests.
pub const CSRF_HEADER: &str = "X-CSRFToken";

static CLIENT: Lazy<reqwest::Client> = Lazy::new(reqwest::Client::new);

pub(crate) fn shared_client() -> &'static reqwest::Client {
    &CLIENT
}

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("{0}")]
    ReqwestError(#[from] reqwest::Error),
    #[error("{0}")]
    UrlError(#[from] url::ParseError),
    #[error("request never completed: {0}")]
    Unsent(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

/// Transport used for submissions, abstracted so the controller can be
/// exercised in tests without a running server.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// POSTs a JSON body to `path`, carrying the CSRF token as a header.
    ///
    /// # Errors
    /// - If the request cannot be built or never completes (network error,
    ///   invalid base URL)
    async fn post_json(
        &self,
        path: &str,
        csrf_token: &str,
        body: String,
    ) -> Result<HttpResponse, HttpError>;
}

/// Production transport backed by the shared [`reqwest::Client`].
#[derive(Debug, Clone)]
pub struct ReqwestHttpClient {
    base_url: String,
}

impl ReqwestHttpClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn post_json(
        &self,
        path: &str,
        csrf_token: &str,
        body: String,
    ) -> Result<HttpResponse, HttpError> {
        // joined per request so a bad base URL fails through the normal
        // error path rather than at construction
        let url = Url::parse(&self.base_url)?.join(path)?;

        log::debug!("POST {url}");
        let response = shared_client()
            .post(url)
            .header("Content-Type", "application/json")
            .header(CSRF_HEADER, csrf_token)
            .body(body)
            .send()
            .await?;

        let status = response.status().as_u16();
        let body = response.text().await?;
        Ok(HttpResponse { status, body })
    }
}

/// A call recorded by [`MockHttpClient`].
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub path: String,
    pub csrf_token: String,
    pub body: String,
}

/// Test transport: hands out queued responses in FIFO order and records
/// every call it receives.
#[derive(Debug, Clone, Default)]
pub struct MockHttpClient {
    responses: Arc<Mutex<VecDeque<Result<HttpResponse, HttpError>>>>,
    calls: Arc<Mutex<Vec<RecordedCall>>>,
}

impl MockHttpClient {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_response(&self, response: Result<HttpResponse, HttpError>) {
        self.responses.lock().push_back(response);
    }

    /// Shorthand for a `200` response with the given body.
    pub fn push_ok(&self, body: &str) {
        self.push_response(Ok(HttpResponse {
            status: 200,
            body: body.to_owned(),
        }));
    }

    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn post_json(
        &self,
        path: &str,
        csrf_token: &str,
        body: String,
    ) -> Result<HttpResponse, HttpError> {
        self.calls.lock().push(RecordedCall {
            path: path.to_owned(),
            csrf_token: csrf_token.to_owned(),
            body,
        });

        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(HttpError::Unsent(format!("no mock response for {path}"))))
    }
}
