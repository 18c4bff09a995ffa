//! Listing card parser
//!
//! Extracts [`VideoSummary`] records from listing pages. The same card
//! routine is used for the video grid on performer pages.

use scraper::{ElementRef, Html};
use tracing::debug;

use super::common::{child_text, collapsed_text, image_url, selector};
use crate::types::VideoSummary;
use crate::url::extract_video_id;

/// CSS selector of a listing card container
pub const CARD_SELECTOR: &str = ".video-item";

/// Parses a listing page and returns its video cards in document order
///
/// Cards without a detail-page anchor, or whose anchor does not match
/// `/video/{digits}/`, are skipped. Never fails: a page without cards
/// yields an empty vector.
///
/// # Arguments
/// * `html` - Raw HTML string of a listing page
pub fn parse_video_cards(html: &str) -> Vec<VideoSummary> {
    let document = Html::parse_document(html);
    parse_card_list(&document)
}

/// Card extraction over an already parsed document
pub(crate) fn parse_card_list(document: &Html) -> Vec<VideoSummary> {
    let Some(card_selector) = selector(CARD_SELECTOR) else {
        return Vec::new();
    };

    let mut seen = 0usize;
    let videos: Vec<VideoSummary> = document
        .select(&card_selector)
        .inspect(|_| seen += 1)
        .filter_map(|card| parse_video_card(&card))
        .collect();

    if seen > videos.len() {
        debug!(
            cards = seen,
            parsed = videos.len(),
            "skipped cards without a detail link"
        );
    }

    videos
}

/// Parses a single card container
///
/// Returns `None` when the card has no anchor pointing at a detail page.
fn parse_video_card(card: &ElementRef) -> Option<VideoSummary> {
    let anchor_selector = selector("a[href]")?;

    let (anchor, id) = card.select(&anchor_selector).find_map(|anchor| {
        let href = anchor.value().attr("href")?;
        extract_video_id(href).map(|id| (anchor, id))
    })?;

    Some(VideoSummary {
        id,
        code: child_text(card, ".video-code"),
        title: card_title(&anchor),
        thumbnail: image_url(card),
        duration: child_text(card, ".video-duration"),
        quality: child_text(card, ".video-quality"),
    })
}

/// Title attribute first, then the link text
fn card_title(anchor: &ElementRef) -> String {
    anchor
        .value()
        .attr("title")
        .map(str::trim)
        .filter(|title| !title.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| collapsed_text(anchor))
}
