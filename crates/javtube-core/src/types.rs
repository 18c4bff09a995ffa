//! Core data types for the javtube scraper
//!
//! Records are built fresh per request and serialized in camelCase,
//! which is what the desktop UI consumes.

use serde::{Deserialize, Serialize};

use crate::error::{JavtubeError, Result};

/// A single entry in a listing page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoSummary {
    /// Numeric id taken from the `/video/{digits}/` detail href, never empty
    pub id: String,

    /// Site-assigned content code (e.g. "ABP-123")
    pub code: String,

    /// Display title
    pub title: String,

    /// Preview image URL, absolute or relative as found in the page
    pub thumbnail: String,

    /// Free-text duration label (e.g. "12:34")
    pub duration: String,

    /// Free-text quality badge (e.g. "HD")
    pub quality: String,
}

/// A performer card from the actress listing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActressSummary {
    /// Last path segment of the profile URL
    pub id: String,
    pub name: String,
    pub thumbnail: String,
    /// Free text, not guaranteed numeric
    pub video_count: String,
    /// Absolute profile URL
    pub url: String,
}

/// Header metadata of a performer page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActressProfile {
    pub name: String,
    pub image: String,
    /// Opaque summary such as "120 Videos"
    pub stats_text: String,
}

/// Everything extracted from one performer page
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActressVideos {
    /// `None` when the page has no header block
    pub actress: Option<ActressProfile>,
    pub videos: Vec<VideoSummary>,
}

/// Which step of the resolution cascade produced a media URL
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ResolveStrategy {
    InlineSource,
    DownloadLink,
    CdnNegotiation,
}

/// Outcome of a single resolution request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedVideoUrl {
    pub video_id: String,
    pub media_url: Option<String>,
    pub strategy: Option<ResolveStrategy>,
}

impl ResolvedVideoUrl {
    pub(crate) fn unresolved(video_id: &str) -> Self {
        Self {
            video_id: video_id.to_string(),
            media_url: None,
            strategy: None,
        }
    }

    pub(crate) fn resolved(video_id: &str, url: String, strategy: ResolveStrategy) -> Self {
        Self {
            video_id: video_id.to_string(),
            media_url: Some(url),
            strategy: Some(strategy),
        }
    }
}

/// A media entry found on an archive creator profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArchiveVideo {
    /// `{username}-{media path key}`, stable across fetches
    pub id: String,
    pub title: String,
    pub thumbnail: String,
    /// Absolute media URL
    pub url: String,
}

/// Listing mode selecting which upstream listing to query
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SortMode {
    Main,
    Uncensored,
    /// Keyword search; the query must not be empty
    Search(String),
    /// Generic `sort=<key>` listing (most-viewed, top-rated, ...)
    Sort(String),
}

impl SortMode {
    /// Maps raw request parameters onto a listing mode
    ///
    /// An empty `sort` means the main listing. `"search"` requires a
    /// non-empty query.
    ///
    /// # Errors
    /// `InvalidInput` for a search without a query
    pub fn from_params(sort: &str, query: Option<&str>) -> Result<Self> {
        match sort.trim() {
            "" | "main" => Ok(SortMode::Main),
            "uncensored" => Ok(SortMode::Uncensored),
            "search" => {
                let query = query.map(str::trim).unwrap_or_default();
                if query.is_empty() {
                    return Err(JavtubeError::InvalidInput(
                        "search query cannot be empty".to_string(),
                    ));
                }
                Ok(SortMode::Search(query.to_string()))
            }
            key => Ok(SortMode::Sort(key.to_string())),
        }
    }
}

/// Transient archive credentials
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthToken {
    pub csrf_token: String,
    pub session_cookie: String,
}
