//! Request construction and response parsing shared by every API call.
//!
//! [`build_request`] turns an endpoint, method, optional JSON body and optional
//! bearer token into a ready `reqwest::Request`. [`parse_response`] checks the
//! status and decodes the JSON reply. [`cancellable`] races a round trip
//! against the caller's [`RequestContext`].

use std::future::Future;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Request, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::client::error::{RaindropError, Result};

/// Per-call cancellation and deadline.
///
/// Without a context a request is bounded only by the client's transport
/// timeout.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    cancellation: Option<CancellationToken>,
    timeout: Option<Duration>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn cancellation(&self) -> Option<&CancellationToken> {
        self.cancellation.as_ref()
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Parse a configured host into a base URL.
pub fn parse_base(host: &str) -> Result<Url> {
    Url::parse(host).map_err(|e| RaindropError::InvalidUrl {
        url: host.to_string(),
        reason: e.to_string(),
    })
}

/// Join `path` onto the path of `base`.
pub fn join_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let joined = format!(
        "{}/{}",
        base.path().trim_end_matches('/'),
        path.trim_start_matches('/')
    );
    url.set_path(&joined);
    url
}

/// Where a request goes: a base URL, a path under it and query pairs.
#[derive(Debug, Clone, Copy)]
pub struct Endpoint<'a> {
    pub base: &'a Url,
    pub path: &'a str,
    pub query: &'a [(&'a str, String)],
}

impl<'a> Endpoint<'a> {
    pub fn new(base: &'a Url, path: &'a str) -> Self {
        Self {
            base,
            path,
            query: &[],
        }
    }

    pub fn with_query(mut self, query: &'a [(&'a str, String)]) -> Self {
        self.query = query;
        self
    }

    /// The joined URL, percent-decoded once, with the query appended.
    ///
    /// Path segments that must stay encoded have to be escaped twice by the
    /// caller.
    pub fn url(&self) -> Result<Url> {
        let joined = join_path(self.base, self.path);
        let decoded =
            urlencoding::decode(joined.as_str()).map_err(|e| RaindropError::InvalidUrl {
                url: joined.to_string(),
                reason: e.to_string(),
            })?;
        let mut url = Url::parse(&decoded).map_err(|e| RaindropError::InvalidUrl {
            url: decoded.to_string(),
            reason: e.to_string(),
        })?;

        if !self.query.is_empty() {
            url.query_pairs_mut()
                .extend_pairs(self.query.iter().map(|(k, v)| (*k, v.as_str())));
        }
        Ok(url)
    }
}

/// Build a request for `endpoint`.
///
/// `Content-Type: application/json` is always set; `Authorization` only when
/// `access_token` is a non-empty string.
pub fn build_request<B>(
    http: &Client,
    method: Method,
    endpoint: Endpoint<'_>,
    body: Option<&B>,
    access_token: Option<&str>,
    ctx: Option<&RequestContext>,
) -> Result<Request>
where
    B: Serialize + ?Sized,
{
    let url = endpoint.url()?;

    let payload = match body {
        Some(body) => serde_json::to_vec(body).map_err(RaindropError::Encode)?,
        None => Vec::new(),
    };

    let mut builder = http
        .request(method, url)
        .header(CONTENT_TYPE, "application/json")
        .body(payload);

    if let Some(token) = access_token.filter(|t| !t.is_empty()) {
        builder = builder.bearer_auth(token);
    }

    if let Some(timeout) = ctx.and_then(RequestContext::timeout) {
        builder = builder.timeout(timeout);
    }

    builder.build().map_err(RaindropError::Build)
}

/// Decode `response` into `T` when its status is `expected` or 400.
///
/// The server reports some application failures (`result: false`) with HTTP
/// 400, so those bodies are decoded and handed back like successes. Any other
/// status fails without reading the body.
pub async fn parse_response<T>(response: Response, expected: StatusCode) -> Result<T>
where
    T: DeserializeOwned,
{
    check_status(response.status(), expected)?;
    let body = response.bytes().await.map_err(RaindropError::Body)?;
    decode_body(&body)
}

pub fn check_status(status: StatusCode, expected: StatusCode) -> Result<()> {
    if status == expected || status == StatusCode::BAD_REQUEST {
        return Ok(());
    }
    tracing::error!("Can't parse response: unexpected status code {}", status);
    Err(RaindropError::UnexpectedStatus {
        status: status.as_u16(),
    })
}

pub fn decode_body<T>(body: &[u8]) -> Result<T>
where
    T: DeserializeOwned,
{
    serde_json::from_slice(body).map_err(|e| {
        tracing::error!("Failed to decode response body: {}", e);
        RaindropError::Decode(e)
    })
}

/// Run `fut` unless the context's cancellation token fires first.
pub async fn cancellable<F, T>(ctx: Option<&RequestContext>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match ctx.and_then(RequestContext::cancellation) {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(RaindropError::Cancelled),
                out = fut => out,
            }
        }
        None => fut.await,
    }
}

/// Send `request` and parse the reply, honouring the context's cancellation.
pub async fn round_trip<T>(
    http: &Client,
    request: Request,
    expected: StatusCode,
    ctx: Option<&RequestContext>,
) -> Result<T>
where
    T: DeserializeOwned,
{
    cancellable(ctx, async {
        let response = http.execute(request).await?;
        tracing::debug!("{} -> {}", response.url(), response.status());
        parse_response(response, expected).await
    })
    .await
}
