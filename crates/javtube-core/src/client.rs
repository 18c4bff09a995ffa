//! HTTP client with rate limiting for the javtube site and archive
//!
//! A single attempt per call: retry policy belongs to callers. Responses
//! come back with their status and `Set-Cookie` pairs so the resolver can
//! decide how to degrade.

use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderValue};
use tokio::sync::Mutex;
use tokio::time::sleep;

use crate::error::{JavtubeError, Result};
use crate::url::{DEFAULT_ARCHIVE_URL, DEFAULT_BASE_URL};

/// Browser User-Agent sent on every request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Catalog origin (default: https://javtube.com)
    pub base_url: String,
    /// Creator archive origin (default: https://coomer.su)
    pub archive_url: String,
    /// User-Agent header value
    pub user_agent: String,
    /// Maximum requests per second (default: 5.0)
    pub requests_per_second: f64,
    /// Request timeout in seconds (default: 10)
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            archive_url: DEFAULT_ARCHIVE_URL.to_string(),
            user_agent: USER_AGENT.to_string(),
            requests_per_second: 5.0,
            timeout_secs: 10,
        }
    }
}

/// Rate limiter to control request frequency
///
/// Ensures requests are spaced at least `min_interval` apart.
pub struct RateLimiter {
    min_interval: Duration,
    last_request: Arc<Mutex<Instant>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the specified requests per second
    ///
    /// Non-positive values disable spacing.
    pub fn new(requests_per_second: f64) -> Self {
        let min_interval = if requests_per_second > 0.0 {
            Duration::from_secs_f64(1.0 / requests_per_second)
        } else {
            Duration::ZERO
        };
        let start = Instant::now()
            .checked_sub(min_interval)
            .unwrap_or_else(Instant::now);
        Self {
            min_interval,
            last_request: Arc::new(Mutex::new(start)),
        }
    }

    /// Acquire permission to make a request
    ///
    /// Sleeps until `min_interval` has passed since the previous call.
    pub async fn acquire(&self) {
        let mut last = self.last_request.lock().await;
        let elapsed = last.elapsed();

        if elapsed < self.min_interval {
            sleep(self.min_interval - elapsed).await;
        }

        *last = Instant::now();
    }

    /// Get the minimum interval between requests
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }
}

/// A fetched upstream response
#[derive(Debug, Clone)]
pub struct Fetched {
    pub url: String,
    pub status: StatusCode,
    pub body: String,
    /// `Set-Cookie` values cut to their `name=value` part
    pub cookies: Vec<String>,
}

impl Fetched {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Passes a 2xx response through, turning anything else into
    /// `UpstreamStatus`
    pub fn into_success(self) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(JavtubeError::UpstreamStatus {
                status: self.status.as_u16(),
                url: self.url,
            })
        }
    }

    /// Cookie pairs joined the way a browser sends them back
    pub fn cookie_header(&self) -> String {
        self.cookies.join("; ")
    }
}

/// Collects every `Set-Cookie` header instance as a bare `name=value` pair
///
/// Attributes such as `Path` or `Expires` are discarded.
pub fn collect_cookies(headers: &HeaderMap) -> Vec<String> {
    headers
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|raw| {
            let pair = raw.split(';').next()?.trim();
            pair.contains('=').then(|| pair.to_string())
        })
        .collect()
}

/// Headers a browser sends on a top-level navigation
fn navigation_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
        ),
    );
    headers.insert(
        header::ACCEPT_LANGUAGE,
        HeaderValue::from_static("en-US,en;q=0.9,ja;q=0.8"),
    );
    headers.insert(
        header::UPGRADE_INSECURE_REQUESTS,
        HeaderValue::from_static("1"),
    );
    headers
}

/// HTTP client wrapper with rate limiting
///
/// Handles all HTTP communication with upstream sites:
/// - Rate limiting to avoid tripping upstream throttles
/// - Browser User-Agent and navigation headers
/// - Per-request timeout (a timeout surfaces as `HttpError`)
pub struct JavtubeClient {
    client: reqwest::Client,
    rate_limiter: RateLimiter,
    config: ClientConfig,
}

impl JavtubeClient {
    /// Create a new client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new client with custom configuration
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .default_headers(navigation_headers())
            .build()
            .map_err(JavtubeError::HttpError)?;

        Ok(Self {
            client,
            rate_limiter: RateLimiter::new(config.requests_per_second),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET a page
    ///
    /// Non-2xx statuses are returned as data, not errors.
    ///
    /// # Errors
    /// `HttpError` for transport failures and timeouts
    pub async fn get(&self, url: &str) -> Result<Fetched> {
        self.get_with_headers(url, HeaderMap::new()).await
    }

    /// GET a page with extra headers layered over the navigation defaults
    pub async fn get_with_headers(&self, url: &str, headers: HeaderMap) -> Result<Fetched> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .get(url)
            .headers(headers)
            .send()
            .await
            .map_err(JavtubeError::HttpError)?;

        Self::read(url, response).await
    }

    /// POST an `application/x-www-form-urlencoded` body
    ///
    /// # Errors
    /// `HttpError` for transport failures and timeouts
    pub async fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        headers: HeaderMap,
    ) -> Result<Fetched> {
        self.rate_limiter.acquire().await;

        let response = self
            .client
            .post(url)
            .headers(headers)
            .form(form)
            .send()
            .await
            .map_err(JavtubeError::HttpError)?;

        Self::read(url, response).await
    }

    async fn read(url: &str, response: reqwest::Response) -> Result<Fetched> {
        let status = response.status();
        let cookies = collect_cookies(response.headers());
        let body = response.text().await.map_err(JavtubeError::HttpError)?;

        Ok(Fetched {
            url: url.to_string(),
            status,
            body,
            cookies,
        })
    }
}
