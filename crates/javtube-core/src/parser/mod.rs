//! HTML parsers for javtube and the creator archive
//!
//! Every parser is a pure function of the page text. Missing elements
//! degrade to empty values, never to errors.

pub mod actress;
pub mod archive;
pub mod cards;
mod common;
pub mod detail;

pub use actress::{parse_actress_cards, parse_actress_profile};
pub use archive::{parse_archive_csrf_token, parse_archive_media};
pub use cards::parse_video_cards;
pub use detail::{DetailOutcome, extract_cdn_media_url, inspect_detail_page};
