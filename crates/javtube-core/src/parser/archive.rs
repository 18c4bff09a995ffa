//! Creator archive profile parser
//!
//! Profile pages embed media in several shapes depending on the post
//! layout. Each shape is tried in turn and the results merged.

use std::collections::HashSet;

use scraper::Html;
use url::Url;

use super::common::{collapsed_text, first_attr, has_media_extension, selector};
use super::detail::find_csrf_token;
use crate::types::ArchiveVideo;
use crate::url::absolutize;

/// Extracts the CSRF token of an archive page
///
/// `<meta name="csrf-token">` first, then the generic token input scan.
pub fn parse_archive_csrf_token(html: &str) -> Option<String> {
    let document = Html::parse_document(html);

    if let Some(sel) = selector(r#"meta[name="csrf-token"]"#)
        && let Some(meta) = document.select(&sel).next()
        && let Some(token) = first_attr(&meta, &["content"])
    {
        return Some(token);
    }

    find_csrf_token(&document)
}

/// Candidate media entry before id assignment
struct Candidate {
    url: String,
    title: String,
    thumbnail: String,
}

/// Parses media entries from an archive profile page
///
/// # Arguments
/// * `html` - Raw HTML of the profile page
/// * `archive_url` - Archive origin used to resolve relative links
/// * `username` - Creator name, used as the id prefix
///
/// # Returns
/// Entries in document order, deduplicated by URL. Ids are
/// `{username}-{media key}` so repeated fetches produce the same ids;
/// the same file served from two mirror hosts shares a key and is kept once.
pub fn parse_archive_media(html: &str, archive_url: &str, username: &str) -> Vec<ArchiveVideo> {
    let document = Html::parse_document(html);

    let mut candidates = video_elements(&document);
    candidates.extend(media_anchors(&document));
    candidates.extend(data_attributes(&document));

    let mut seen_urls = HashSet::new();
    let mut seen_ids = HashSet::new();
    candidates
        .into_iter()
        .filter_map(|candidate| {
            let url = absolutize(archive_url, &candidate.url);
            if !seen_urls.insert(url.clone()) {
                return None;
            }
            let key = media_key(&url)?;
            let id = format!("{}-{}", username, key);
            if !seen_ids.insert(id.clone()) {
                return None;
            }
            let title = if candidate.title.is_empty() {
                file_stem(&url).unwrap_or(key)
            } else {
                candidate.title
            };
            Some(ArchiveVideo {
                id,
                title,
                thumbnail: candidate.thumbnail,
                url,
            })
        })
        .collect()
}

fn video_elements(document: &Html) -> Vec<Candidate> {
    let mut found = Vec::new();
    let Some(video_sel) = selector("video") else {
        return found;
    };
    let Some(source_sel) = selector("source[src]") else {
        return found;
    };

    for video in document.select(&video_sel) {
        let thumbnail = first_attr(&video, &["poster"]).unwrap_or_default();
        let title = first_attr(&video, &["title", "aria-label"]).unwrap_or_default();

        let sources = video
            .select(&source_sel)
            .filter_map(|s| first_attr(&s, &["src"]))
            .chain(first_attr(&video, &["src"]));
        for src in sources {
            found.push(Candidate {
                url: src,
                title: title.clone(),
                thumbnail: thumbnail.clone(),
            });
        }
    }
    found
}

fn media_anchors(document: &Html) -> Vec<Candidate> {
    let Some(sel) = selector("a[href]") else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter_map(|anchor| {
            let href = anchor.value().attr("href")?.trim();
            if !has_media_extension(href) {
                return None;
            }
            let title = first_attr(&anchor, &["download", "title"])
                .unwrap_or_else(|| collapsed_text(&anchor));
            Some(Candidate {
                url: href.to_string(),
                title,
                thumbnail: String::new(),
            })
        })
        .collect()
}

fn data_attributes(document: &Html) -> Vec<Candidate> {
    let Some(sel) = selector("[data-video-url], [data-src]:not(img)") else {
        return Vec::new();
    };

    document
        .select(&sel)
        .filter_map(|el| {
            let url = first_attr(&el, &["data-video-url", "data-src"])?;
            if !has_media_extension(&url) {
                return None;
            }
            Some(Candidate {
                url,
                title: first_attr(&el, &["title"]).unwrap_or_default(),
                thumbnail: first_attr(&el, &["data-poster", "data-thumbnail"]).unwrap_or_default(),
            })
        })
        .collect()
}

/// Path of a media URL below `/data/` (or the whole path), extension
/// dropped and separators turned into `-`
///
/// `/data/aa/bb/clip.mp4` becomes `aa-bb-clip`.
fn media_key(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let path = parsed.path();
    let path = path.split_once("/data/").map(|(_, rest)| rest).unwrap_or(path);
    let path = match path.rsplit_once('.') {
        Some((head, ext)) if !ext.contains('/') => head,
        _ => path,
    };
    let key = path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    (!key.is_empty()).then_some(key)
}

/// Last path segment without its extension
fn file_stem(url: &str) -> Option<String> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next()?;
    let stem = name.rsplit_once('.').map(|(stem, _)| stem).unwrap_or(name);
    (!stem.is_empty()).then(|| stem.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const ARCHIVE: &str = "https://coomer.su";

    #[test]
    fn test_parse_archive_csrf_token_meta() {
        let html = r#"<html><head><meta name="csrf-token" content="meta-tok"></head></html>"#;
        assert_eq!(parse_archive_csrf_token(html), Some("meta-tok".to_string()));
    }

    #[test]
    fn test_parse_archive_csrf_token_input_fallback() {
        let html = r#"<form><input name="_csrf" value="input-tok"></form>"#;
        assert_eq!(parse_archive_csrf_token(html), Some("input-tok".to_string()));
    }

    #[test]
    fn test_parse_archive_csrf_token_missing() {
        assert_eq!(parse_archive_csrf_token("<html></html>"), None);
    }

    #[test]
    fn test_parse_archive_media_all_shapes() {
        let html = r#"
        <html><body>
            <video poster="/thumb/a.jpg" title="Clip A">
                <source src="https://n1.coomer.su/data/ab/clip-a.mp4">
            </video>
            <a href="/data/cd/clip-b.m4v">not media</a>
            <a href="/data/cd/clip-b.mp4" download="Clip B.mp4">Download</a>
            <div data-video-url="https://n2.coomer.su/data/ef/clip-c.webm" data-poster="/thumb/c.jpg"></div>
            <img data-src="/data/gh/photo.mp4">
        </body></html>
        "#;

        let videos = parse_archive_media(html, ARCHIVE, "alice");
        let ids: Vec<&str> = videos.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, vec!["alice-ab-clip-a", "alice-cd-clip-b", "alice-ef-clip-c"]);

        assert_eq!(videos[0].title, "Clip A");
        assert_eq!(videos[0].thumbnail, "/thumb/a.jpg");
        assert_eq!(videos[1].url, "https://coomer.su/data/cd/clip-b.mp4");
        assert_eq!(videos[1].title, "Clip B.mp4");
        assert_eq!(videos[2].thumbnail, "/thumb/c.jpg");
        assert_eq!(videos[2].title, "clip-c");
    }

    #[test]
    fn test_archive_keeps_same_name_files_from_different_directories() {
        let html = r#"
            <video src="https://n1.coomer.su/data/aa/1.mp4"></video>
            <video src="https://n1.coomer.su/data/bb/1.mp4"></video>
            <a href="https://n1.coomer.su/data/aa/1.mp4">again</a>
        "#;

        let first = parse_archive_media(html, ARCHIVE, "alice");
        let second = parse_archive_media(html, ARCHIVE, "alice");

        let pairs: Vec<(&str, &str)> = first
            .iter()
            .map(|v| (v.id.as_str(), v.url.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("alice-aa-1", "https://n1.coomer.su/data/aa/1.mp4"),
                ("alice-bb-1", "https://n1.coomer.su/data/bb/1.mp4"),
            ]
        );
        assert_eq!(first, second);
    }

    #[test]
    fn test_archive_mirror_hosts_share_an_id() {
        let html = r#"
            <video src="https://n1.coomer.su/data/x/same.mp4"></video>
            <a href="https://n3.coomer.su/data/x/same.mp4?f=same.mp4">same</a>
        "#;

        let videos = parse_archive_media(html, ARCHIVE, "bob");
        assert_eq!(videos.len(), 1);
        assert_eq!(videos[0].id, "bob-x-same");
    }

    #[test]
    fn test_archive_url_attribute_is_not_decoded_twice() {
        let html = r#"<a href="/data/q/v.mp4?sig=a&amp;amp;b">v</a>"#;
        let videos = parse_archive_media(html, ARCHIVE, "dan");
        assert_eq!(videos[0].url, "https://coomer.su/data/q/v.mp4?sig=a&amp;b");
    }

    #[test]
    fn test_media_key() {
        assert_eq!(
            media_key("https://n1.coomer.su/data/aa/bb/clip.mp4?f=x.mp4"),
            Some("aa-bb-clip".to_string())
        );
        assert_eq!(
            media_key("https://cdn.example/v/clip.webm"),
            Some("v-clip".to_string())
        );
        assert_eq!(media_key("https://cdn.example/"), None);
        assert_eq!(media_key("not a url"), None);
    }

    #[test]
    fn test_parse_archive_media_empty() {
        assert!(parse_archive_media("", ARCHIVE, "carol").is_empty());
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("https://x/a/b/name.mp4?x=1"), Some("name".to_string()));
        assert_eq!(file_stem("https://x/a/b/"), None);
        assert_eq!(file_stem("https://x/a/noext"), Some("noext".to_string()));
    }
}
