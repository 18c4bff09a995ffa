//! Video URL resolution
//!
//! Turns a video id into a playable media URL. The cascade is fixed:
//!
//! 1. fetch the detail page (non-2xx ends resolution)
//! 2. inline `<video>`/`<source>` URLs
//! 3. absolute download/media anchors
//! 4. CSRF token + session cookie, POSTed to the CDN endpoint
//!
//! Stages run strictly in order, so the authenticated request is only
//! made when the page itself offers nothing. At most two round trips.

use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, info, instrument, warn};

use crate::client::Fetched;
use crate::parser::{DetailOutcome, extract_cdn_media_url, inspect_detail_page};
use crate::scraper::JavtubeScraper;
use crate::types::{ResolveStrategy, ResolvedVideoUrl};
use crate::url::{build_cdn_url, build_video_url, origin_of};

/// Header the site's player sets on its XHR calls
const X_REQUESTED_WITH: HeaderName = HeaderName::from_static("x-requested-with");

impl JavtubeScraper {
    /// Resolves a video id into a playable media URL
    ///
    /// Never fails: every expected failure (missing page, no token,
    /// rejected CDN request, malformed JSON) is logged and yields `None`.
    ///
    /// # Example
    /// ```no_run
    /// # async fn example() -> javtube_core::Result<()> {
    /// use javtube_core::JavtubeScraper;
    /// let scraper = JavtubeScraper::new()?;
    /// if let Some(url) = scraper.resolve_video_url("123456").await {
    ///     println!("play {}", url);
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn resolve_video_url(&self, video_id: &str) -> Option<String> {
        self.resolve(video_id).await.media_url
    }

    /// Like [`resolve_video_url`](Self::resolve_video_url), also reporting
    /// which strategy succeeded
    #[instrument(skip(self))]
    pub async fn resolve(&self, video_id: &str) -> ResolvedVideoUrl {
        let video_id = video_id.trim();
        if video_id.is_empty() {
            warn!("refusing to resolve an empty video id");
            return ResolvedVideoUrl::unresolved(video_id);
        }

        let detail_url = build_video_url(&self.config().base_url, video_id);
        let page = match self.client.get(&detail_url).await.and_then(Fetched::into_success) {
            Ok(page) => page,
            Err(e) => {
                warn!(error = %e, "detail page unavailable");
                return ResolvedVideoUrl::unresolved(video_id);
            }
        };

        match inspect_detail_page(&page.body, &detail_url) {
            DetailOutcome::Direct { url, strategy } => {
                debug!(?strategy, url = %url, "media URL found on detail page");
                ResolvedVideoUrl::resolved(video_id, url, strategy)
            }
            DetailOutcome::NoToken => {
                info!("no inline media and no CSRF token on detail page");
                ResolvedVideoUrl::unresolved(video_id)
            }
            DetailOutcome::Negotiate { token } => {
                let cookie = page.cookie_header();
                match self
                    .negotiate_cdn(video_id, &detail_url, &token, &cookie)
                    .await
                {
                    Some(url) => {
                        debug!(url = %url, "media URL negotiated with CDN endpoint");
                        ResolvedVideoUrl::resolved(video_id, url, ResolveStrategy::CdnNegotiation)
                    }
                    None => ResolvedVideoUrl::unresolved(video_id),
                }
            }
        }
    }

    /// Last stage: authenticated POST to the CDN endpoint
    async fn negotiate_cdn(
        &self,
        video_id: &str,
        detail_url: &str,
        token: &str,
        cookie: &str,
    ) -> Option<String> {
        let base = &self.config().base_url;
        let origin = origin_of(base).unwrap_or_else(|| base.trim_end_matches('/').to_string());

        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(X_REQUESTED_WITH, HeaderValue::from_static("XMLHttpRequest"));
        for (name, value) in [
            (header::REFERER, detail_url),
            (header::ORIGIN, origin.as_str()),
            (header::COOKIE, cookie),
        ] {
            match HeaderValue::from_str(value) {
                Ok(value) => {
                    headers.insert(name, value);
                }
                Err(_) => warn!(header = %name, "dropping header with invalid characters"),
            }
        }

        let form = [("video_id", video_id), ("pid_c", ""), ("token", token)];
        let response = match self
            .client
            .post_form(&build_cdn_url(base), &form, headers)
            .await
            .and_then(Fetched::into_success)
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "CDN request failed");
                return None;
            }
        };

        match extract_cdn_media_url(&response.body) {
            Ok(Some(url)) => Some(url),
            Ok(None) => {
                info!("CDN response carried no media URL");
                None
            }
            Err(e) => {
                warn!(error = %e, "CDN endpoint returned malformed JSON");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::scraper::{JavtubeScraper, test_config};
    use crate::types::ResolveStrategy;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TOKEN_ONLY_PAGE: &str = r#"
    <html><body>
        <div class="player"></div>
        <input type="hidden" id="video-token" value="tok123">
    </body></html>
    "#;

    fn scraper_for(server: &MockServer) -> JavtubeScraper {
        JavtubeScraper::with_config(test_config(&server.uri())).unwrap()
    }

    async fn mount_detail(server: &MockServer, id: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path(format!("/video/{}/", id)))
            .respond_with(template)
            .mount(server)
            .await;
    }

    async fn mount_cdn(server: &MockServer, template: ResponseTemplate, expected: u64) {
        Mock::given(method("POST"))
            .and(path("/ajax/get_cdn"))
            .respond_with(template)
            .expect(expected)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_detail_page_404_twice_returns_none() {
        let server = MockServer::start().await;
        mount_detail(&server, "404", ResponseTemplate::new(404)).await;
        mount_cdn(&server, ResponseTemplate::new(200), 0).await;

        let scraper = scraper_for(&server);
        assert_eq!(scraper.resolve_video_url("404").await, None);
        assert_eq!(scraper.resolve_video_url("404").await, None);
    }

    #[tokio::test]
    async fn test_detail_page_timeout_returns_none() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            "13",
            ResponseTemplate::new(200)
                .set_body_string(TOKEN_ONLY_PAGE)
                .set_delay(Duration::from_secs(3)),
        )
        .await;
        mount_cdn(&server, ResponseTemplate::new(200), 0).await;

        let config = crate::ClientConfig {
            timeout_secs: 1,
            ..test_config(&server.uri())
        };
        let scraper = JavtubeScraper::with_config(config).unwrap();
        assert_eq!(scraper.resolve_video_url("13").await, None);
    }

    #[tokio::test]
    async fn test_relative_inline_source_is_absolute() {
        let server = MockServer::start().await;
        let page = r#"<video><source src="/media/v/14.mp4"></video>"#;
        mount_detail(&server, "14", ResponseTemplate::new(200).set_body_string(page)).await;

        let scraper = scraper_for(&server);
        assert_eq!(
            scraper.resolve_video_url("14").await,
            Some(format!("{}/media/v/14.mp4", server.uri()))
        );
    }

    #[tokio::test]
    async fn test_inline_source_skips_cdn_request() {
        let server = MockServer::start().await;
        let page = r#"
        <html><body>
            <video><source src="https://cdn.example.net/v/42.mp4"></video>
            <input type="hidden" id="video-token" value="tok123">
        </body></html>
        "#;
        mount_detail(&server, "42", ResponseTemplate::new(200).set_body_string(page)).await;
        mount_cdn(&server, ResponseTemplate::new(200), 0).await;

        let scraper = scraper_for(&server);
        let resolved = scraper.resolve("42").await;

        assert_eq!(
            resolved.media_url.as_deref(),
            Some("https://cdn.example.net/v/42.mp4")
        );
        assert_eq!(resolved.strategy, Some(ResolveStrategy::InlineSource));
    }

    #[tokio::test]
    async fn test_download_link_skips_cdn_request() {
        let server = MockServer::start().await;
        let page = r#"<a href="https://files.example/dl/43.mp4">Download</a><input id="video-token" value="t">"#;
        mount_detail(&server, "43", ResponseTemplate::new(200).set_body_string(page)).await;
        mount_cdn(&server, ResponseTemplate::new(200), 0).await;

        let scraper = scraper_for(&server);
        let resolved = scraper.resolve("43").await;
        assert_eq!(resolved.strategy, Some(ResolveStrategy::DownloadLink));
    }

    #[tokio::test]
    async fn test_cdn_negotiation_with_token_and_cookie() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            "7",
            ResponseTemplate::new(200)
                .insert_header("set-cookie", "PHPSESSID=abc; Path=/; HttpOnly")
                .set_body_string(TOKEN_ONLY_PAGE),
        )
        .await;

        let detail_url = format!("{}/video/7/", server.uri());
        Mock::given(method("POST"))
            .and(path("/ajax/get_cdn"))
            .and(header("referer", detail_url.as_str()))
            .and(header("origin", server.uri().as_str()))
            .and(header("cookie", "PHPSESSID=abc"))
            .and(header("accept", "*/*"))
            .and(header("content-type", "application/x-www-form-urlencoded"))
            .and(body_string_contains("video_id=7"))
            .and(body_string_contains("pid_c=&"))
            .and(body_string_contains("token=tok123"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string(r#"{"playlists":"https://x/y.mp4"}"#),
            )
            .expect(1)
            .mount(&server)
            .await;

        let scraper = scraper_for(&server);
        let resolved = scraper.resolve("7").await;

        assert_eq!(resolved.media_url.as_deref(), Some("https://x/y.mp4"));
        assert_eq!(resolved.strategy, Some(ResolveStrategy::CdnNegotiation));
    }

    #[tokio::test]
    async fn test_cdn_field_priority() {
        let server = MockServer::start().await;
        mount_detail(&server, "8", ResponseTemplate::new(200).set_body_string(TOKEN_ONLY_PAGE)).await;
        mount_cdn(
            &server,
            ResponseTemplate::new(200)
                .set_body_string(r#"{"url":"https://x/url.mp4","playlists":"https://x/pl.m3u8"}"#),
            1,
        )
        .await;

        let scraper = scraper_for(&server);
        assert_eq!(
            scraper.resolve_video_url("8").await.as_deref(),
            Some("https://x/pl.m3u8")
        );
    }

    #[tokio::test]
    async fn test_cdn_without_cookie_still_posts() {
        let server = MockServer::start().await;
        mount_detail(&server, "9", ResponseTemplate::new(200).set_body_string(TOKEN_ONLY_PAGE)).await;
        mount_cdn(
            &server,
            ResponseTemplate::new(200).set_body_string(r#"{"videoUrl":"https://x/v.mp4"}"#),
            1,
        )
        .await;

        let scraper = scraper_for(&server);
        assert_eq!(
            scraper.resolve_video_url("9").await.as_deref(),
            Some("https://x/v.mp4")
        );
    }

    #[tokio::test]
    async fn test_cdn_malformed_json_returns_none() {
        let server = MockServer::start().await;
        mount_detail(&server, "10", ResponseTemplate::new(200).set_body_string(TOKEN_ONLY_PAGE)).await;
        mount_cdn(
            &server,
            ResponseTemplate::new(200).set_body_string("<html>captcha</html>"),
            1,
        )
        .await;

        let scraper = scraper_for(&server);
        assert_eq!(scraper.resolve_video_url("10").await, None);
    }

    #[tokio::test]
    async fn test_cdn_non_success_returns_none() {
        let server = MockServer::start().await;
        mount_detail(&server, "11", ResponseTemplate::new(200).set_body_string(TOKEN_ONLY_PAGE)).await;
        mount_cdn(
            &server,
            ResponseTemplate::new(403).set_body_string(r#"{"url":"https://x/never.mp4"}"#),
            1,
        )
        .await;

        let scraper = scraper_for(&server);
        assert_eq!(scraper.resolve_video_url("11").await, None);
    }

    #[tokio::test]
    async fn test_no_token_returns_none_without_cdn_request() {
        let server = MockServer::start().await;
        mount_detail(
            &server,
            "12",
            ResponseTemplate::new(200).set_body_string("<html><body>empty</body></html>"),
        )
        .await;
        mount_cdn(&server, ResponseTemplate::new(200), 0).await;

        let scraper = scraper_for(&server);
        assert_eq!(scraper.resolve_video_url("12").await, None);
    }

    #[tokio::test]
    async fn test_empty_id_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let scraper = scraper_for(&server);
        assert_eq!(scraper.resolve_video_url("   ").await, None);
    }
}
