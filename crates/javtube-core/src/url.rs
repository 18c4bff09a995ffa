//! URL helper functions for the javtube site and the creator archive
//!
//! All builders take the base URL explicitly so the same code serves the
//! real site and a local mock server.

use std::sync::LazyLock;

use regex::Regex;
use url::Url;

use crate::error::{JavtubeError, Result};
use crate::types::SortMode;

/// Default catalog origin
pub const DEFAULT_BASE_URL: &str = "https://javtube.com";

/// Default creator archive origin
pub const DEFAULT_ARCHIVE_URL: &str = "https://coomer.su";

static VIDEO_ID_RE: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"/video/(\d+)/").ok());

/// Appends `/page-{n}` for every page after the first
fn with_page_suffix(path: String, page: u32) -> String {
    if page > 1 {
        format!("{}/page-{}", path, page)
    } else {
        path
    }
}

/// Builds the listing URL for a page and sort mode
///
/// # Arguments
/// * `base_url` - Site origin without trailing slash
/// * `page` - 1-based page number (0 is treated as 1)
/// * `mode` - Which listing to query
///
/// # Errors
/// `InvalidInput` if `mode` is a search with an empty query
///
/// # Example
/// ```
/// use javtube_core::SortMode;
/// use javtube_core::url::build_listing_url;
/// let url = build_listing_url("https://javtube.com", 2, &SortMode::Main).unwrap();
/// assert_eq!(url, "https://javtube.com/videos/page-2");
/// ```
pub fn build_listing_url(base_url: &str, page: u32, mode: &SortMode) -> Result<String> {
    let base = base_url.trim_end_matches('/');
    let url = match mode {
        SortMode::Main => with_page_suffix(format!("{}/videos", base), page),
        SortMode::Uncensored => with_page_suffix(format!("{}/category/uncensored", base), page),
        SortMode::Sort(key) => with_page_suffix(
            format!("{}/videos/sort={}", base, urlencoding::encode(key.trim())),
            page,
        ),
        SortMode::Search(query) => {
            let query = query.trim();
            if query.is_empty() {
                return Err(JavtubeError::InvalidInput(
                    "search query cannot be empty".to_string(),
                ));
            }
            let mut url = format!("{}/search/video/?s={}", base, urlencoding::encode(query));
            if page > 1 {
                url.push_str(&format!("&page={}", page));
            }
            url
        }
    };
    Ok(url)
}

/// Builds the canonical detail-page URL of a video
///
/// # Example
/// ```
/// use javtube_core::url::build_video_url;
/// assert_eq!(build_video_url("https://javtube.com", "123"), "https://javtube.com/video/123/");
/// ```
pub fn build_video_url(base_url: &str, video_id: &str) -> String {
    format!("{}/video/{}/", base_url.trim_end_matches('/'), video_id)
}

/// Builds the CDN-resolution endpoint URL
pub fn build_cdn_url(base_url: &str) -> String {
    format!("{}/ajax/get_cdn", base_url.trim_end_matches('/'))
}

/// Builds the actress listing URL for a page
pub fn build_actresses_url(base_url: &str, page: u32) -> String {
    with_page_suffix(format!("{}/actresses", base_url.trim_end_matches('/')), page)
}

/// Builds a performer page URL for a page
pub fn build_actress_url(base_url: &str, actress_id: &str, page: u32) -> String {
    with_page_suffix(
        format!(
            "{}/actress/{}",
            base_url.trim_end_matches('/'),
            urlencoding::encode(actress_id)
        ),
        page,
    )
}

/// Builds an archive creator profile URL
///
/// # Example
/// ```
/// use javtube_core::url::build_archive_profile_url;
/// let url = build_archive_profile_url("https://coomer.su", "onlyfans", "some user");
/// assert_eq!(url, "https://coomer.su/onlyfans/user/some%20user");
/// ```
pub fn build_archive_profile_url(archive_url: &str, service: &str, username: &str) -> String {
    format!(
        "{}/{}/user/{}",
        archive_url.trim_end_matches('/'),
        urlencoding::encode(service),
        urlencoding::encode(username)
    )
}

/// Extracts the numeric video id from a detail-page href
///
/// Matches the fixed `/video/{digits}/` pattern anywhere in the href.
///
/// # Example
/// ```
/// use javtube_core::url::extract_video_id;
/// assert_eq!(extract_video_id("/video/98765/some-title"), Some("98765".to_string()));
/// assert_eq!(extract_video_id("/videos/page-2"), None);
/// ```
pub fn extract_video_id(href: &str) -> Option<String> {
    VIDEO_ID_RE
        .as_ref()?
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Extracts the performer id (last non-empty path segment) from a profile href
pub fn extract_actress_id(href: &str) -> Option<String> {
    let path = href.split(['?', '#']).next().unwrap_or(href);
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty() && !segment.contains(':'))
        .map(|segment| {
            urlencoding::decode(segment)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| segment.to_string())
        })
}

/// Returns `scheme://host[:port]` of an absolute URL
pub fn origin_of(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let origin = parsed.origin();
    origin.is_tuple().then(|| origin.ascii_serialization())
}

/// Resolves a possibly relative href against a base URL
///
/// Falls back to the href unchanged when either side cannot be parsed.
pub fn absolutize(base_url: &str, href: &str) -> String {
    Url::parse(base_url)
        .and_then(|base| base.join(href))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| href.to_string())
}
