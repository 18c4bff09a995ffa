use scraper::{ElementRef, Selector};

/// File extensions treated as playable media
pub(crate) const MEDIA_EXTENSIONS: &[&str] = &[".mp4", ".m3u8", ".webm", ".mkv", ".mov"];

pub(crate) fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Element text with runs of whitespace collapsed to single spaces
pub(crate) fn collapsed_text(element: &ElementRef) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapsed text of the first descendant matching `css`, or `""`
pub(crate) fn child_text(element: &ElementRef, css: &str) -> String {
    selector(css)
        .and_then(|sel| element.select(&sel).next())
        .map(|el| collapsed_text(&el))
        .unwrap_or_default()
}

/// First non-empty attribute among `names`
pub(crate) fn first_attr(element: &ElementRef, names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| element.value().attr(name))
        .map(str::trim)
        .find(|value| !value.is_empty())
        .map(str::to_string)
}

/// Thumbnail of the first `img`, lazy-load attributes before `src`
pub(crate) fn image_url(element: &ElementRef) -> String {
    selector("img")
        .and_then(|sel| element.select(&sel).next())
        .and_then(|img| first_attr(&img, &["data-src", "data-original", "src"]))
        .unwrap_or_default()
}

/// True if the URL path ends in a known media extension
pub(crate) fn has_media_extension(url: &str) -> bool {
    let path = url.split(['?', '#']).next().unwrap_or(url).to_lowercase();
    MEDIA_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
}

pub(crate) fn is_absolute(url: &str) -> bool {
    url.starts_with("http://") || url.starts_with("https://")
}
