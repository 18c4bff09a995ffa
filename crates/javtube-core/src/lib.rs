//! javtube scraper core library
//!
//! Parses javtube listing and performer pages into structured records and
//! resolves video ids into playable media URLs.
//!
//! # Overview
//!
//! - Rate-limited HTTP client with browser headers and a per-request timeout
//! - Pure HTML parsers for listing cards, performer pages and detail pages
//! - A fixed resolution cascade: inline source, download link, then an
//!   authenticated request to the site's CDN endpoint
//! - Archive creator profiles, authenticated through an injectable
//!   [`AuthTokenCache`]
//!
//! Upstream trouble never surfaces as an error: listings come back empty and
//! resolution comes back `None`, with the reason in the `tracing` logs.
//!
//! # Example
//!
//! ```no_run
//! use javtube_core::{JavtubeScraper, Result, SortMode};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let scraper = JavtubeScraper::new()?;
//!
//!     let videos = scraper.list_videos(1, &SortMode::Main).await?;
//!     if let Some(video) = videos.first() {
//!         match scraper.resolve_video_url(&video.id).await {
//!             Some(url) => println!("{} -> {}", video.title, url),
//!             None => println!("{} could not be resolved", video.title),
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! Media URLs usually carry expiring tokens; resolve them on demand rather
//! than storing them.

mod archive;
mod client;
mod error;
pub mod parser;
mod resolver;
mod scraper;
mod token_cache;
mod types;
pub mod url;

// Re-export client types
pub use client::{ClientConfig, Fetched, JavtubeClient, RateLimiter, USER_AGENT, collect_cookies};

// Re-export error types
pub use error::{JavtubeError, Result};

// Re-export parser functions
pub use parser::{
    extract_cdn_media_url, inspect_detail_page, parse_actress_cards, parse_actress_profile,
    parse_archive_media, parse_video_cards,
};

// Re-export main scraper API
pub use archive::DEFAULT_ARCHIVE_SERVICE;
pub use scraper::JavtubeScraper;
pub use token_cache::AuthTokenCache;

// Re-export data types
pub use types::{
    ActressProfile, ActressSummary, ActressVideos, ArchiveVideo, AuthToken, ResolveStrategy,
    ResolvedVideoUrl, SortMode, VideoSummary,
};

// Re-export URL helper functions for convenience
pub use url::{build_listing_url, build_video_url, extract_video_id};
