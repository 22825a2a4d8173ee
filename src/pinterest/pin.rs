use lazy_static::lazy_static;
use scraper::{Html, Selector};

use super::BASE_URL;

lazy_static! {
    // Every link that leads to a pin detail page
    static ref PIN_LINK_SELECTOR: Selector = Selector::parse(r#"a[href*="/pin/"]"#).unwrap();

    // The primary image of a pin page. Full-size images are served from an "originals" path; otherwise we settle
    // for the first image that offers a source-set.
    static ref PIN_IMAGE_SELECTOR: Selector =
        Selector::parse(r#"img[src*="originals"], img[srcset]"#).unwrap();
}

/// Collects the raw `href` of every pin link on an album page, in document order.
///
/// Duplicates are kept. The values are not normalized; see [`normalize_pin_url`].
pub fn pin_links_from_html(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);

    document
        .select(&PIN_LINK_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .map(String::from)
        .collect()
}

/// Turns a site-relative pin link into an absolute one. Absolute links are returned as they are.
pub fn normalize_pin_url(href: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else if href.starts_with('/') {
        format!("{}{}", BASE_URL, href)
    } else {
        format!("{}/{}", BASE_URL, href)
    }
}

#[derive(Debug, Eq, PartialEq)]
pub struct PinImage {
    pub src: Option<String>,
    pub srcset: Option<String>,
}

impl PinImage {
    /// Finds the primary image element of a pin page, if there is one.
    pub fn from_html(html: &str) -> Option<PinImage> {
        let document = Html::parse_document(html);
        let element = document.select(&PIN_IMAGE_SELECTOR).next()?;

        Some(PinImage {
            src: element.value().attr("src").map(String::from),
            srcset: element.value().attr("srcset").map(String::from),
        })
    }

    /// The URL to download: the direct `src` when it is set, otherwise the largest source-set candidate.
    pub fn url(&self) -> Option<String> {
        match &self.src {
            Some(src) if !src.is_empty() => Some(src.clone()),
            _ => self.srcset.as_deref().and_then(largest_srcset_candidate),
        }
    }
}

// A source-set reads like "a.jpg 1x, b.jpg 2x, c.jpg 4x", with candidates ordered by size. Splitting on
// whitespace leaves the last candidate's URL as the second-to-last token.
fn largest_srcset_candidate(srcset: &str) -> Option<String> {
    let tokens: Vec<&str> = srcset.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }

    Some(tokens[tokens.len() - 2].to_string())
}
