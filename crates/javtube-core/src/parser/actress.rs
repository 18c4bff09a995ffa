//! Performer listing and profile parsers

use scraper::{ElementRef, Html};
use tracing::debug;

use super::cards::parse_card_list;
use super::common::{child_text, first_attr, image_url, selector};
use crate::types::{ActressProfile, ActressSummary, ActressVideos};
use crate::url::{absolutize, extract_actress_id};

/// Parses the actress listing page
///
/// # Arguments
/// * `html` - Raw HTML of the listing page
/// * `base_url` - Site origin used to make profile URLs absolute
///
/// # Returns
/// Performer cards in document order; cards without a profile link are skipped
pub fn parse_actress_cards(html: &str, base_url: &str) -> Vec<ActressSummary> {
    let document = Html::parse_document(html);
    let Some(card_selector) = selector(".actress-item") else {
        return Vec::new();
    };

    document
        .select(&card_selector)
        .filter_map(|card| parse_actress_card(&card, base_url))
        .collect()
}

fn parse_actress_card(card: &ElementRef, base_url: &str) -> Option<ActressSummary> {
    let anchor_selector = selector(r#"a[href*="/actress/"]"#)?;
    let anchor = card.select(&anchor_selector).next()?;
    let href = anchor.value().attr("href")?;
    let id = extract_actress_id(href)?;

    let mut name = child_text(card, ".actress-name");
    if name.is_empty() {
        name = first_attr(&anchor, &["title"])
            .or_else(|| {
                selector("img")
                    .and_then(|sel| card.select(&sel).next())
                    .and_then(|img| first_attr(&img, &["alt"]))
            })
            .unwrap_or_default();
    }

    Some(ActressSummary {
        id,
        name,
        thumbnail: image_url(card),
        video_count: child_text(card, ".actress-video-count"),
        url: absolutize(base_url, href),
    })
}

/// Parses a performer page into its header and video grid
///
/// The header is best effort: without a `.actress-profile` block the
/// profile is `None` while the videos are still extracted.
pub fn parse_actress_profile(html: &str) -> ActressVideos {
    let document = Html::parse_document(html);

    let actress = parse_profile_header(&document);
    if actress.is_none() {
        debug!("performer page has no profile header");
    }

    ActressVideos {
        actress,
        videos: parse_card_list(&document),
    }
}

fn parse_profile_header(document: &Html) -> Option<ActressProfile> {
    let header_selector = selector(".actress-profile")?;
    let header = document.select(&header_selector).next()?;

    let mut name = child_text(&header, "h1");
    if name.is_empty() {
        name = child_text(&header, ".actress-name");
    }

    Some(ActressProfile {
        name,
        image: image_url(&header),
        stats_text: child_text(&header, ".actress-stats"),
    })
}
