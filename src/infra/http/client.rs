use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Client, Method, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::debug;

use crate::application::repos::RepoError;
use crate::application::session::{SessionError, SessionStore};

pub const METRIC_HTTP_REQUESTS_TOTAL: &str = "storydesk_http_requests_total";
pub const METRIC_HTTP_REQUEST_MS: &str = "storydesk_http_request_ms";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("base URL `{0}` cannot carry a path")]
    CannotBeABase(String),
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("server rejected the session (status {status})")]
    Unauthorized { status: u16 },
    #[error("resource not found")]
    NotFound,
    #[error("server error: status {status} body {body}")]
    Status { status: u16, body: String },
    #[error("failed to parse body: {0}")]
    Decode(String),
    #[error("invalid header value: {0}")]
    Header(String),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl From<ApiError> for RepoError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::NotAuthenticated => RepoError::NotAuthenticated,
            ApiError::Unauthorized { .. } => RepoError::Unauthorized,
            ApiError::NotFound => RepoError::NotFound,
            ApiError::Status { status, body } => RepoError::Rejected {
                status,
                message: server_message(&body),
            },
            ApiError::Decode(message) => RepoError::Decode(message),
            ApiError::Session(err) => RepoError::Session(err),
            other => RepoError::transport(other),
        }
    }
}

/// Prefer the `message`/`error` field of a JSON error body.
fn server_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error"]
                .iter()
                .find_map(|key| value.get(key).and_then(|v| v.as_str()).map(str::to_string))
        })
        .unwrap_or_else(|| body.trim().to_string())
}

/// Whether a request carries the stored bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Auth {
    Session,
    Anonymous,
}

/// JSON-over-HTTP access to the admin backend.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base: Url,
    session: Arc<dyn SessionStore>,
}

impl ApiClient {
    pub fn new(
        site: &str,
        timeout: Duration,
        session: Arc<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let base = Url::parse(site)?;
        if base.cannot_be_a_base() {
            return Err(ApiError::CannotBeABase(site.to_string()));
        }
        let client = Client::builder()
            .user_agent(Self::user_agent())
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base,
            session,
        })
    }

    pub fn user_agent() -> &'static str {
        concat!("storydesk-cli/", env!("CARGO_PKG_VERSION"))
    }

    pub fn base(&self) -> &Url {
        &self.base
    }

    pub fn session(&self) -> &Arc<dyn SessionStore> {
        &self.session
    }

    /// Append percent-encoded path segments to the base URL.
    pub fn url(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ApiError::CannotBeABase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn auth_header(&self) -> Result<HeaderValue, ApiError> {
        let session = self
            .session
            .load()
            .await?
            .ok_or(ApiError::NotAuthenticated)?;
        HeaderValue::from_str(&format!("Bearer {}", session.token))
            .map_err(|e| ApiError::Header(e.to_string()))
    }

    async fn send(
        &self,
        auth: Auth,
        method: Method,
        segments: &[&str],
        query: Option<&[(&str, String)]>,
        body: Option<serde_json::Value>,
    ) -> Result<Response, ApiError> {
        let mut url = self.url(segments)?;
        if let Some(q) = query {
            url.set_query(None);
            let mut qp = url.query_pairs_mut();
            for (k, v) in q {
                qp.append_pair(k, v);
            }
        }

        let mut req = self.client.request(method.clone(), url.clone());
        if auth == Auth::Session {
            req = req.header(AUTHORIZATION, self.auth_header().await?);
        }
        if let Some(b) = body {
            req = req.json(&b);
        }

        let started = Instant::now();
        let resp = match req.send().await {
            Ok(resp) => resp,
            Err(err) => {
                counter!(METRIC_HTTP_REQUESTS_TOTAL, "outcome" => "transport_error").increment(1);
                return Err(err.into());
            }
        };
        let status = resp.status();
        let elapsed_ms = started.elapsed().as_secs_f64() * 1000.0;
        counter!(METRIC_HTTP_REQUESTS_TOTAL, "outcome" => outcome_label(status)).increment(1);
        histogram!(METRIC_HTTP_REQUEST_MS).record(elapsed_ms);
        debug!(
            %method,
            path = url.path(),
            status = status.as_u16(),
            elapsed_ms,
            "api request"
        );
        Ok(resp)
    }

    pub async fn request<T: DeserializeOwned>(
        &self,
        auth: Auth,
        method: Method,
        segments: &[&str],
        query: Option<&[(&str, String)]>,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let resp = self.send(auth, method, segments, query, body).await?;
        Self::handle(resp).await
    }

    pub async fn request_unit(
        &self,
        auth: Auth,
        method: Method,
        segments: &[&str],
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        let resp = self.send(auth, method, segments, None, body).await?;
        Self::check(resp).await.map(|_| ())
    }

    async fn handle<T: DeserializeOwned>(resp: Response) -> Result<T, ApiError> {
        let bytes = Self::check(resp).await?;
        // An empty success body decodes like `null`.
        let body: &[u8] = if bytes.iter().all(u8::is_ascii_whitespace) {
            b"null"
        } else {
            &bytes
        };
        serde_json::from_slice(body).map_err(|e| ApiError::Decode(e.to_string()))
    }

    async fn check(resp: Response) -> Result<Vec<u8>, ApiError> {
        let status = resp.status();
        let bytes = resp.bytes().await?;
        match status {
            s if s.is_success() => Ok(bytes.to_vec()),
            StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized {
                status: status.as_u16(),
            }),
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            _ => Err(ApiError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        }
    }
}

fn outcome_label(status: StatusCode) -> &'static str {
    if status.is_success() {
        "success"
    } else if status.is_client_error() {
        "client_error"
    } else {
        "server_error"
    }
}
