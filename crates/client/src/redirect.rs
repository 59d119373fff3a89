//! Redirect following with credential preservation.
//!
//! Stock redirect followers strip the `Authorization` header when a hop
//! crosses origins, silently turning an authenticated call into an
//! unauthenticated one. The transport is therefore built with redirects
//! disabled and the executor walks the chain itself, re-attaching the
//! first request's credential on every hop. The pure chain arithmetic
//! lives here so it can be tested without a server.

use reqwest::{Method, StatusCode, Url};
use skylift_domain::{ApiError, ApiResult};

/// Hard cap on redirect hops within one physical attempt.
pub const MAX_REDIRECTS: u32 = 10;

/// How to issue the next hop of a redirect chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectStep {
    pub url: Url,
    pub method: Method,
    /// Whether the original body is carried to the next hop.
    pub keep_body: bool,
}

/// Whether `status` asks the client to follow a `Location` header.
pub fn is_redirect(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::MOVED_PERMANENTLY
            | StatusCode::FOUND
            | StatusCode::SEE_OTHER
            | StatusCode::TEMPORARY_REDIRECT
            | StatusCode::PERMANENT_REDIRECT
    )
}

/// Compute the next hop for `status` received at `current`.
///
/// Returns `Ok(None)` when the response is not a redirect. `hops` counts
/// redirects already followed; the chain fails once it reaches
/// [`MAX_REDIRECTS`]. 301/302/303 rewrite non-HEAD methods to GET and drop
/// the body; 307/308 preserve both. Relative `Location` values resolve
/// against the current URL.
pub fn next_step(
    current: &Url,
    method: &Method,
    status: StatusCode,
    location: Option<&str>,
    hops: u32,
) -> ApiResult<Option<RedirectStep>> {
    if !is_redirect(status) {
        return Ok(None);
    }
    if hops >= MAX_REDIRECTS {
        return Err(ApiError::TooManyRedirects(MAX_REDIRECTS));
    }
    let location = location
        .ok_or_else(|| ApiError::Malformed(format!("redirect {status} without a Location header")))?;
    let url = current
        .join(location)
        .map_err(|e| ApiError::Malformed(format!("invalid redirect target {location:?}: {e}")))?;

    let step = match status {
        StatusCode::TEMPORARY_REDIRECT | StatusCode::PERMANENT_REDIRECT => {
            RedirectStep { url, method: method.clone(), keep_body: true }
        }
        _ => {
            let next = if *method == Method::HEAD { Method::HEAD } else { Method::GET };
            RedirectStep { url, method: next, keep_body: false }
        }
    };
    Ok(Some(step))
}
