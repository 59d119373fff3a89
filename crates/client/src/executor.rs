//! Resilient request executor.
//!
//! One logical call = build request, send, classify, retry per policy. The
//! schedule comes from [`RetryPolicy`]; the retryability decision lives on
//! `ApiError::is_retryable`. Every wait (the network send and each backoff
//! sleep) races against the caller's cancellation token, so a cancelled
//! caller never sits out a full delay.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, LOCATION};
use reqwest::{Client as HttpClient, Method, StatusCode, Url};
use serde::Serialize;
use skylift_domain::{ApiError, ApiResult, ErrorEnvelope};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::backoff::{PollPolicy, RetryPolicy};
use crate::mask;
use crate::redirect;

/// API client with retry, credential-preserving redirects, and operation
/// polling.
#[derive(Clone)]
pub struct ApiClient {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) token: String,
    pub(crate) retry_policy: RetryPolicy,
    pub(crate) poll_policy: PollPolicy,
    pub(crate) cancel: CancellationToken,
    pub(crate) debug: bool,
}

// The credential never reaches diagnostic output unmasked, including
// through `{:?}`.
impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("token", &mask::mask_token(&self.token))
            .field("retry_policy", &self.retry_policy)
            .field("poll_policy", &self.poll_policy)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Start building a new client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::default()
    }

    /// Install a new retry policy for subsequent calls.
    ///
    /// In-flight calls keep the policy they snapshotted at call start.
    pub fn set_retry_policy(&mut self, policy: RetryPolicy) {
        self.retry_policy = policy;
    }

    /// Install a new poll policy for subsequent waits.
    pub fn set_poll_policy(&mut self, policy: PollPolicy) {
        self.poll_policy = policy;
    }

    /// Single resilient call using the client's own cancellation token.
    pub async fn execute<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> ApiResult<Vec<u8>> {
        let cancel = self.cancel.clone();
        self.execute_with_cancel(method, path, body, &cancel).await
    }

    /// Single resilient call; every suspension point observes `cancel`.
    ///
    /// On success returns the raw response payload. On exhaustion or a
    /// non-retryable failure the last observed error is returned verbatim
    /// so callers can still branch on status and code.
    pub async fn execute_with_cancel<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        cancel: &CancellationToken,
    ) -> ApiResult<Vec<u8>> {
        // Snapshot so a concurrent reconfiguration cannot shift the
        // schedule mid-call.
        let policy = self.retry_policy;

        let payload = match body {
            Some(body) => Some(serde_json::to_vec(body).map_err(|e| {
                ApiError::Malformed(format!("failed to encode request body: {e}"))
            })?),
            None => None,
        };
        if self.debug {
            if let Some(payload) = payload.as_deref() {
                debug!(
                    body = %mask::mask_sensitive(&String::from_utf8_lossy(payload)),
                    "request body"
                );
            }
        }

        let mut attempt = 0u32;
        loop {
            debug!(%method, path, attempt, "sending request");

            let result = tokio::select! {
                res = self.send_once(method.clone(), path, payload.as_deref()) => res,
                () = cancel.cancelled() => Err(ApiError::Cancelled),
            };

            let err = match result {
                Ok(bytes) => return Ok(bytes),
                Err(err) => err,
            };

            if !err.is_retryable() || attempt >= policy.max_retries {
                return Err(err);
            }

            let delay = policy.delay(attempt);
            warn!(%method, path, attempt, error = %err, ?delay, "retrying after backoff");
            tokio::select! {
                () = tokio::time::sleep(delay) => {}
                () = cancel.cancelled() => return Err(ApiError::Cancelled),
            }
            attempt += 1;
        }
    }

    /// One physical attempt: send, follow redirects manually, read the
    /// body, and map error responses.
    pub(crate) async fn send_once(
        &self,
        method: Method,
        path: &str,
        payload: Option<&[u8]>,
    ) -> ApiResult<Vec<u8>> {
        let mut url = self.request_url(path)?;
        let mut method = method;
        let mut keep_body = true;
        let mut hops = 0u32;

        let response = loop {
            let mut request = self
                .http
                .request(method.clone(), url.clone())
                .header(AUTHORIZATION, format!("Bearer {}", self.token))
                .header(CONTENT_TYPE, "application/json");
            if keep_body {
                if let Some(payload) = payload {
                    request = request.body(payload.to_vec());
                }
            }

            let response = request.send().await.map_err(|e| ApiError::Network(e.to_string()))?;
            let status = response.status();
            let location = response
                .headers()
                .get(LOCATION)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            match redirect::next_step(&url, &method, status, location.as_deref(), hops)? {
                Some(step) => {
                    debug!(from = %url, to = %step.url, %status, "following redirect");
                    url = step.url;
                    method = step.method;
                    keep_body = step.keep_body;
                    hops += 1;
                }
                None => break response,
            }
        };

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| ApiError::Malformed(format!("failed to read response body: {e}")))?;
        if self.debug {
            debug!(
                status = status.as_u16(),
                body = %mask::mask_sensitive(&String::from_utf8_lossy(&body)),
                "response"
            );
        }

        if status.as_u16() >= 400 {
            return Err(error_from_response(status, &body));
        }
        Ok(body.to_vec())
    }

    fn request_url(&self, path: &str) -> ApiResult<Url> {
        Url::parse(&format!("{}{}", self.base_url, path))
            .map_err(|e| ApiError::Config(format!("invalid request url for {path:?}: {e}")))
    }
}

/// Map an HTTP error response, preferring the structured envelope.
fn error_from_response(status: StatusCode, body: &[u8]) -> ApiError {
    if let Ok(envelope) = serde_json::from_slice::<ErrorEnvelope>(body) {
        if !envelope.error.code.is_empty() {
            return ApiError::Api {
                status: status.as_u16(),
                code: envelope.error.code,
                message: envelope.error.message,
            };
        }
    }
    ApiError::Http { status: status.as_u16(), body: String::from_utf8_lossy(body).into_owned() }
}

/// Builder for [`ApiClient`].
pub struct ApiClientBuilder {
    base_url: Option<String>,
    token: Option<String>,
    timeout: Duration,
    retry_policy: RetryPolicy,
    poll_policy: PollPolicy,
    cancel: Option<CancellationToken>,
    debug: bool,
}

impl Default for ApiClientBuilder {
    fn default() -> Self {
        Self {
            base_url: None,
            token: None,
            timeout: Duration::from_secs(30),
            retry_policy: RetryPolicy::default(),
            poll_policy: PollPolicy::default(),
            cancel: None,
            debug: false,
        }
    }
}

impl std::fmt::Debug for ApiClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClientBuilder")
            .field("base_url", &self.base_url)
            .field("token", &self.token.as_deref().map(mask::mask_token))
            .field("timeout", &self.timeout)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl ApiClientBuilder {
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Per-request timeout; also bounds the poller's final status fetch.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn poll_policy(mut self, policy: PollPolicy) -> Self {
        self.poll_policy = policy;
        self
    }

    /// Token observed by every wait inside `execute` and the poller.
    pub fn cancellation_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }

    /// Log masked request/response bodies at debug level.
    pub fn debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    pub fn build(self) -> ApiResult<ApiClient> {
        self.retry_policy.validate()?;
        self.poll_policy.validate()?;

        let base_url = self
            .base_url
            .ok_or_else(|| ApiError::Config("base_url not set".into()))?
            .trim_end_matches('/')
            .to_owned();
        Url::parse(&base_url)
            .map_err(|e| ApiError::Config(format!("invalid base_url: {e}")))?;
        let token = self.token.ok_or_else(|| ApiError::Config("token not set".into()))?;
        if token.is_empty() {
            return Err(ApiError::Config("token must not be empty".into()));
        }

        // Redirects are followed manually so the credential header
        // survives every hop; see `redirect`.
        let http = HttpClient::builder()
            .timeout(self.timeout)
            .redirect(reqwest::redirect::Policy::none())
            .no_proxy()
            .build()
            .map_err(|e| ApiError::Config(format!("failed to build http client: {e}")))?;

        Ok(ApiClient {
            http,
            base_url,
            token,
            retry_policy: self.retry_policy,
            poll_policy: self.poll_policy,
            cancel: self.cancel.unwrap_or_default(),
            debug: self.debug,
        })
    }
}
