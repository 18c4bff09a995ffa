//! Creator archive profile videos
//!
//! The archive wants a CSRF token and session cookie on profile requests.
//! Both come from its home page and are kept in the shared
//! [`AuthTokenCache`](crate::AuthTokenCache) until the archive rejects them.

use reqwest::StatusCode;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crate::client::Fetched;
use crate::error::{JavtubeError, Result};
use crate::parser::{parse_archive_csrf_token, parse_archive_media};
use crate::scraper::JavtubeScraper;
use crate::types::{ArchiveVideo, AuthToken};
use crate::url::build_archive_profile_url;

const X_CSRF_TOKEN: HeaderName = HeaderName::from_static("x-csrf-token");

/// Service used when the caller does not name one
pub const DEFAULT_ARCHIVE_SERVICE: &str = "onlyfans";

impl JavtubeScraper {
    /// Lists media entries of an archive creator profile
    ///
    /// Authentication problems and upstream failures yield an empty list.
    /// A 401/403 answer also drops the cached credentials so the next call
    /// starts from a fresh pair.
    ///
    /// # Errors
    /// `InvalidInput` if `username` is empty
    #[instrument(skip(self))]
    pub async fn archive_videos(&self, service: &str, username: &str) -> Result<Vec<ArchiveVideo>> {
        let username = username.trim();
        if username.is_empty() {
            return Err(JavtubeError::InvalidInput(
                "username cannot be empty".to_string(),
            ));
        }
        let service = match service.trim() {
            "" => DEFAULT_ARCHIVE_SERVICE,
            s => s,
        };

        let archive_url = self.config().archive_url.clone();
        let auth = self.archive_auth().await;

        let mut headers = HeaderMap::new();
        if let Some(auth) = &auth {
            if !auth.session_cookie.is_empty()
                && let Ok(value) = HeaderValue::from_str(&auth.session_cookie)
            {
                headers.insert(header::COOKIE, value);
            }
            if let Ok(value) = HeaderValue::from_str(&auth.csrf_token) {
                headers.insert(X_CSRF_TOKEN, value);
            }
        }

        let url = build_archive_profile_url(&archive_url, service, username);
        let page = match self.client.get_with_headers(&url, headers).await {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "archive profile request failed");
                return Ok(Vec::new());
            }
        };

        if page.status == StatusCode::UNAUTHORIZED || page.status == StatusCode::FORBIDDEN {
            warn!(status = %page.status, "archive rejected credentials, clearing token cache");
            self.tokens.clear().await;
            return Ok(Vec::new());
        }
        let page = match page.into_success() {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "archive profile unavailable");
                return Ok(Vec::new());
            }
        };

        let videos = parse_archive_media(&page.body, &archive_url, username);
        debug!(count = videos.len(), "archive media parsed");
        Ok(videos)
    }

    /// Cached credentials, or a fresh pair from the archive home page
    async fn archive_auth(&self) -> Option<AuthToken> {
        if let Some(token) = self.tokens.get().await {
            return Some(token);
        }

        let home = format!("{}/", self.config().archive_url.trim_end_matches('/'));
        let page = match self.client.get(&home).await.and_then(Fetched::into_success) {
            Ok(page) => page,
            Err(e) => {
                info!(error = %e, "archive home unavailable, continuing unauthenticated");
                return None;
            }
        };

        let Some(csrf_token) = parse_archive_csrf_token(&page.body) else {
            info!("no CSRF token on archive home, continuing unauthenticated");
            return None;
        };

        let token = AuthToken {
            csrf_token,
            session_cookie: page.cookie_header(),
        };
        self.tokens.store(token.clone()).await;
        Some(token)
    }
}
