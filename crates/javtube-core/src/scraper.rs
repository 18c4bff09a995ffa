//! Main scraper API for javtube
//!
//! Combines the HTTP client with the HTML parsers. Upstream failures are
//! logged and degrade to empty results; only caller mistakes are errors.

use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::client::{ClientConfig, Fetched, JavtubeClient};
use crate::error::{JavtubeError, Result};
use crate::parser::{parse_actress_cards, parse_actress_profile, parse_video_cards};
use crate::token_cache::AuthTokenCache;
use crate::types::{ActressSummary, ActressVideos, SortMode, VideoSummary};
use crate::url::{build_actress_url, build_actresses_url, build_listing_url};

/// Main scraper API for javtube
///
/// Cheap to share behind an `Arc`: every method takes `&self` and the
/// only mutable state is the injected [`AuthTokenCache`].
pub struct JavtubeScraper {
    pub(crate) client: JavtubeClient,
    pub(crate) tokens: Arc<AuthTokenCache>,
}

impl JavtubeScraper {
    /// Create a new scraper with default configuration
    ///
    /// # Errors
    /// Returns error if HTTP client initialization fails
    pub fn new() -> Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a new scraper with custom client configuration and a
    /// private token cache
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        Self::with_token_cache(config, Arc::new(AuthTokenCache::new()))
    }

    /// Create a new scraper sharing an externally owned token cache
    pub fn with_token_cache(config: ClientConfig, tokens: Arc<AuthTokenCache>) -> Result<Self> {
        let client = JavtubeClient::with_config(config)?;
        Ok(Self { client, tokens })
    }

    pub fn config(&self) -> &ClientConfig {
        self.client.config()
    }

    pub fn token_cache(&self) -> &Arc<AuthTokenCache> {
        &self.tokens
    }

    /// Fetches a page body, degrading every failure to `""`
    pub(crate) async fn fetch_html(&self, url: &str) -> String {
        match self.client.get(url).await.and_then(Fetched::into_success) {
            Ok(page) => page.body,
            Err(e) => {
                warn!(error = %e, "upstream page unavailable");
                String::new()
            }
        }
    }

    /// Fetches the raw HTML of a listing page
    ///
    /// One GET, no retry. A non-2xx answer, a transport failure or a
    /// timeout yields an empty string.
    ///
    /// # Errors
    /// `InvalidInput` if `mode` is a search with an empty query; no
    /// request is made in that case
    pub async fn fetch_listing(&self, page: u32, mode: &SortMode) -> Result<String> {
        let url = build_listing_url(&self.config().base_url, page, mode)?;
        debug!(url = %url, "fetching listing");
        Ok(self.fetch_html(&url).await)
    }

    /// Lists videos of a listing page
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> javtube_core::Result<()> {
    /// use javtube_core::{JavtubeScraper, SortMode};
    /// let scraper = JavtubeScraper::new()?;
    /// let videos = scraper.list_videos(1, &SortMode::Uncensored).await?;
    /// for video in videos {
    ///     println!("{}: {}", video.id, video.title);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    #[instrument(skip(self))]
    pub async fn list_videos(&self, page: u32, mode: &SortMode) -> Result<Vec<VideoSummary>> {
        let html = self.fetch_listing(page, mode).await?;
        let videos = parse_video_cards(&html);
        if videos.is_empty() && !html.is_empty() {
            debug!("listing page contained no recognizable cards");
        }
        Ok(videos)
    }

    /// Lists performers of the actress listing
    #[instrument(skip(self))]
    pub async fn list_actresses(&self, page: u32) -> Result<Vec<ActressSummary>> {
        let base = &self.config().base_url;
        let html = self.fetch_html(&build_actresses_url(base, page)).await;
        Ok(parse_actress_cards(&html, base))
    }

    /// Fetches a performer page: profile header plus its video grid
    ///
    /// # Errors
    /// `InvalidInput` if `actress_id` is empty
    #[instrument(skip(self))]
    pub async fn get_actress_videos(&self, actress_id: &str, page: u32) -> Result<ActressVideos> {
        let actress_id = actress_id.trim();
        if actress_id.is_empty() {
            return Err(JavtubeError::InvalidInput(
                "actress id cannot be empty".to_string(),
            ));
        }

        let url = build_actress_url(&self.config().base_url, actress_id, page);
        let html = self.fetch_html(&url).await;
        Ok(parse_actress_profile(&html))
    }
}

#[cfg(test)]
pub(crate) fn test_config(base_url: &str) -> ClientConfig {
    ClientConfig {
        base_url: base_url.to_string(),
        archive_url: base_url.to_string(),
        requests_per_second: 0.0,
        timeout_secs: 5,
        ..ClientConfig::default()
    }
}
