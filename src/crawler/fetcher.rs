//! Rate-limited HTTP fetcher
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building the HTTP client with the fixed mobile user agent
//! - Sleeping a randomized delay before every request
//! - Referer and XHR header shaping
//! - Carrying the session cookies of the last response into the next request
//!
//! There is no retry and no backoff: a transport failure or a non-2xx status
//! is returned to the caller as is.

use crate::config::CrawlerConfig;
use crate::FetchError;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, REFERER};
use reqwest::Client;
use std::time::Duration;
use url::Url;

/// Header marking a request as issued by page script
pub const XHR_HEADER: &str = "x-requested-with";

/// Per-call request shaping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    /// Referer header value, if any
    pub referer: Option<String>,

    /// Minimum sleep before the request
    pub min_delay: Duration,

    /// Upper bound of the random extra sleep
    pub max_jitter: Duration,

    /// Whether to add the `X-Requested-With: XMLHttpRequest` marker
    pub xhr: bool,
}

impl FetchOptions {
    /// Options carrying the configured delays, no referer, no XHR marker
    pub fn from_config(config: &CrawlerConfig) -> Self {
        Self {
            referer: None,
            min_delay: config.min_delay(),
            max_jitter: config.max_jitter(),
            xhr: false,
        }
    }

    pub fn with_referer(mut self, referer: impl Into<String>) -> Self {
        self.referer = Some(referer.into());
        self
    }

    pub fn with_xhr(mut self, xhr: bool) -> Self {
        self.xhr = xhr;
        self
    }

    /// Overrides the configured delays for this call site
    pub fn with_delay(mut self, min_delay: Duration, max_jitter: Duration) -> Self {
        self.min_delay = min_delay;
        self.max_jitter = max_jitter;
        self
    }
}

/// Cookies carried from one response to the next request
///
/// The jar is replaced wholesale by every response: cookies are never merged,
/// and a response without `Set-Cookie` leaves the session empty.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<(String, String)>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current cookies with those of the latest response
    pub fn replace<I>(&mut self, cookies: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.cookies = cookies.into_iter().collect();
    }

    /// Renders the session as a `Cookie` header value
    pub fn header_value(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }

        Some(
            self.cookies
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }
}

/// Builds an HTTP client with the given user agent
///
/// Cookies are handled by [`Session`], so the client keeps no cookie store of
/// its own.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent)
        .gzip(true)
        .brotli(true)
        .build()
}

/// Draws a delay uniformly from `[min_delay, min_delay + max_jitter]`
///
/// Saturates at `Duration::MAX` instead of overflowing.
pub fn draw_delay(min_delay: Duration, max_jitter: Duration) -> Duration {
    let jitter_ms = u64::try_from(max_jitter.as_millis()).unwrap_or(u64::MAX);
    if jitter_ms == 0 {
        return min_delay;
    }
    min_delay.saturating_add(Duration::from_millis(rand::rng().random_range(0..=jitter_ms)))
}

/// Sequential, throttled HTTP GET with session continuity
///
/// `get` takes `&mut self`, so one fetcher can never have two requests in
/// flight.
pub struct Fetcher {
    client: Client,
    session: Session,
    request_count: u64,
}

impl Fetcher {
    /// Creates a fetcher with an empty session
    pub fn new(user_agent: &str) -> Result<Self, FetchError> {
        let client = build_http_client(user_agent).map_err(FetchError::Client)?;
        Ok(Self {
            client,
            session: Session::new(),
            request_count: 0,
        })
    }

    /// Sleeps, then fetches `url` and returns the response body
    ///
    /// # Errors
    ///
    /// * `FetchError::Transport` - connection or protocol failure
    /// * `FetchError::Status` - any non-2xx status
    /// * `FetchError::Body` - the body could not be read
    pub async fn get(&mut self, url: &Url, options: &FetchOptions) -> Result<String, FetchError> {
        let delay = draw_delay(options.min_delay, options.max_jitter);
        tracing::debug!("GET {} after {:?}", url, delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        let headers = self.request_headers(options)?;
        self.request_count += 1;

        let response = self
            .client
            .get(url.clone())
            .headers(headers)
            .send()
            .await
            .map_err(|source| FetchError::Transport {
                url: url.to_string(),
                source,
            })?;

        self.session.replace(
            response
                .cookies()
                .map(|c| (c.name().to_string(), c.value().to_string())),
        );
        tracing::trace!("Session now holds {} cookies", self.session.len());

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|source| FetchError::Body {
            url: url.to_string(),
            source,
        })
    }

    fn request_headers(&self, options: &FetchOptions) -> Result<HeaderMap, FetchError> {
        let mut headers = HeaderMap::new();

        if let Some(referer) = &options.referer {
            headers.insert(REFERER, HeaderValue::from_str(referer)?);
        }

        if options.xhr {
            headers.insert(XHR_HEADER, HeaderValue::from_static("XMLHttpRequest"));
        }

        if let Some(cookie) = self.session.header_value() {
            headers.insert(COOKIE, HeaderValue::from_str(&cookie)?);
        }

        Ok(headers)
    }

    /// Cookies that will be sent with the next request
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Number of requests issued so far
    pub fn request_count(&self) -> u64 {
        self.request_count
    }
}
