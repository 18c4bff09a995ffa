//! Detail page inspection for video URL resolution
//!
//! Walks the cheap strategies of the resolution cascade over a detail
//! page and reports either a media URL or the token needed for the CDN
//! request. The network half lives in [`crate::resolver`].

use scraper::Html;
use serde_json::Value;

use super::common::{first_attr, has_media_extension, is_absolute, selector};
use crate::error::{JavtubeError, Result};
use crate::types::ResolveStrategy;
use crate::url::absolutize;

/// Substrings marking a source URL as real media rather than a placeholder
pub const MEDIA_MARKERS: &[&str] = &[".mp4", ".m3u8", ".webm", "cdn", "/media/"];

/// Fields of the CDN response carrying the media URL, in priority order
pub const CDN_URL_FIELDS: &[&str] = &["playlists", "url", "videoUrl"];

/// What the detail page alone can tell about a video
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DetailOutcome {
    /// A media URL was found without authentication
    Direct {
        url: String,
        strategy: ResolveStrategy,
    },
    /// The CDN endpoint must be asked, using this token
    Negotiate { token: String },
    /// Nothing inline and no token to authenticate with
    NoToken,
}

/// Tries inline sources and download links, then looks for a CSRF token
///
/// # Arguments
/// * `html` - Raw HTML of the video detail page
/// * `page_url` - URL the page was fetched from, used to resolve relative
///   sources
pub fn inspect_detail_page(html: &str, page_url: &str) -> DetailOutcome {
    let document = Html::parse_document(html);

    if let Some(url) = find_inline_source(&document, page_url) {
        return DetailOutcome::Direct {
            url,
            strategy: ResolveStrategy::InlineSource,
        };
    }
    if let Some(url) = find_download_link(&document) {
        return DetailOutcome::Direct {
            url,
            strategy: ResolveStrategy::DownloadLink,
        };
    }
    match find_csrf_token(&document) {
        Some(token) => DetailOutcome::Negotiate { token },
        None => DetailOutcome::NoToken,
    }
}

fn is_media_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    MEDIA_MARKERS.iter().any(|marker| lower.contains(marker))
}

/// `<video><source src>` and `<video src>` elements, resolved against
/// the page URL
pub(crate) fn find_inline_source(document: &Html, page_url: &str) -> Option<String> {
    for css in ["video source[src]", "video[src]"] {
        let Some(sel) = selector(css) else {
            continue;
        };
        let found = document
            .select(&sel)
            .filter_map(|el| el.value().attr("src"))
            .map(str::trim)
            .find(|src| is_media_url(src));
        if let Some(src) = found {
            return Some(absolutize(page_url, src));
        }
    }
    None
}

/// Absolute anchors that look like downloads or media files
pub(crate) fn find_download_link(document: &Html) -> Option<String> {
    let sel = selector("a[href]")?;

    document
        .select(&sel)
        .filter_map(|el| el.value().attr("href"))
        .map(str::trim)
        .find(|href| {
            is_absolute(href)
                && (href.to_lowercase().contains("download") || has_media_extension(href))
        })
        .map(str::to_string)
}

/// Finds the CSRF token for the CDN request
///
/// Checks the `#video-token` element first, then any `input` whose name
/// mentions a token or which carries `data-token`.
pub(crate) fn find_csrf_token(document: &Html) -> Option<String> {
    if let Some(sel) = selector("#video-token")
        && let Some(el) = document.select(&sel).next()
        && let Some(token) = first_attr(&el, &["value", "data-token", "content"])
    {
        return Some(token);
    }

    let sel = selector("input")?;
    document.select(&sel).find_map(|input| {
        let name = input.value().attr("name").unwrap_or_default().to_lowercase();
        if name.contains("token") || name.contains("csrf") {
            first_attr(&input, &["value", "data-token"])
        } else if input.value().attr("data-token").is_some() {
            first_attr(&input, &["data-token", "value"])
        } else {
            None
        }
    })
}

/// Extracts the media URL from a CDN endpoint response body
///
/// # Returns
/// The first populated field among `playlists`, `url`, `videoUrl`;
/// `Ok(None)` if none is populated
///
/// # Errors
/// `MalformedResponse` if the body is not JSON
pub fn extract_cdn_media_url(body: &str) -> Result<Option<String>> {
    let json: Value =
        serde_json::from_str(body).map_err(|e| JavtubeError::MalformedResponse(e.to_string()))?;

    Ok(CDN_URL_FIELDS
        .iter()
        .filter_map(|field| json.get(*field))
        .find_map(populated_url))
}

/// A non-empty string, or the first non-empty string of an array
fn populated_url(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Array(items) => items.iter().find_map(populated_url),
        _ => None,
    }
}
