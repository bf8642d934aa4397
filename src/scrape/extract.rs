use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

use crate::model::slugify;

static ANCHOR_SEL: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a[href]").unwrap());
static TITLE_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+[|\-–—]\s+[^|\-–—]*$").unwrap());

/// Ordered CSS selector guesses for each field. The first non-empty match wins.
#[derive(Debug, Clone, Copy)]
pub struct SelectorSet {
    pub title: &'static [&'static str],
    pub description: &'static [&'static str],
    pub code: &'static [&'static str],
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct PageFields {
    pub title: Option<String>,
    pub description: Option<String>,
    pub code: Option<String>,
}

pub fn extract_fields(html: &str, selectors: &SelectorSet, min_code_len: usize) -> PageFields {
    let doc = Html::parse_document(html);
    PageFields {
        title: first_title(&doc, selectors.title),
        description: first_text(&doc, selectors.description),
        code: first_code(&doc, selectors.code, min_code_len),
    }
}

/// First non-empty, whitespace-collapsed text over the selector cascade.
fn first_text(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let sel = parse_selector(raw)?;
        doc.select(&sel)
            .map(|el| collapse_ws(&element_text(el)))
            .find(|t| !t.is_empty())
    })
}

/// Like `first_text`, but a match from `<title>` loses its " | Site" suffix.
/// Headings are kept whole.
fn first_title(doc: &Html, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let text = first_text(doc, &[*raw])?;
        if raw.trim() == "title" {
            Some(clean_title(&text)).filter(|t| !t.is_empty())
        } else {
            Some(text)
        }
    })
}

/// First code block reaching `min_len` chars. Inner whitespace is kept.
fn first_code(doc: &Html, selectors: &[&str], min_len: usize) -> Option<String> {
    selectors.iter().find_map(|raw| {
        let sel = parse_selector(raw)?;
        doc.select(&sel)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .find(|code| code.chars().count() >= min_len)
    })
}

fn parse_selector(raw: &str) -> Option<Selector> {
    match Selector::parse(raw) {
        Ok(sel) => Some(sel),
        Err(e) => {
            debug!("Skipping invalid selector {:?}: {}", raw, e);
            None
        }
    }
}

fn element_text(el: ElementRef) -> String {
    if el.value().name() == "meta" {
        return el.value().attr("content").unwrap_or_default().to_string();
    }
    el.text().collect()
}

fn collapse_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// "Marquee - Magic UI" -> "Marquee"
fn clean_title(title: &str) -> String {
    TITLE_SUFFIX_RE.replace(title, "").trim().to_string()
}

/// Collect slugs from anchors whose path matches `pattern` (first capture group).
/// Absolute links under `base_url` are treated like relative ones.
pub fn discover_slugs(html: &str, base_url: &str, pattern: &Regex) -> Vec<String> {
    let doc = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut slugs = Vec::new();

    for anchor in doc.select(&ANCHOR_SEL) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let path = href.strip_prefix(base_url).unwrap_or(href);
        let path = path.split(['?', '#']).next().unwrap_or_default();
        let Some(slug) = pattern.captures(path).and_then(|c| c.get(1)) else {
            continue;
        };
        let slug = slugify(slug.as_str());
        if seen.insert(slug.clone()) {
            slugs.push(slug);
        }
    }

    slugs
}

#[cfg(test)]
mod tests {
    use super::*;

    const SELECTORS: SelectorSet = SelectorSet {
        title: &["h1", "title"],
        description: &[".prose p", "meta[name=description]", "p"],
        code: &["pre code", "pre", "code"],
    };

    fn fixture(name: &str) -> String {
        std::fs::read_to_string(format!("tests/fixtures/{}.html", name)).unwrap()
    }

    #[test]
    fn marquee_page_fields() {
        let f = extract_fields(&fixture("magicui_marquee"), &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Marquee"));
        assert_eq!(
            f.description.as_deref(),
            Some("An infinite scrolling component that can be used to display text, images, or videos.")
        );
        let code = f.code.unwrap();
        assert!(code.starts_with("import { cn } from \"@/lib/utils\";"));
        assert!(code.contains("\n  pauseOnHover?: boolean;"));
    }

    #[test]
    fn short_code_is_rejected() {
        let html = "<html><body><h1>Dock</h1><pre>npm i dock</pre></body></html>";
        let f = extract_fields(html, &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Dock"));
        assert_eq!(f.code, None);
        assert_eq!(f.description, None);
    }

    #[test]
    fn cascade_falls_through_to_later_selectors() {
        let html = r#"<html><head><title>Globe | Magic UI</title>
            <meta name="description" content="  An autorotating,   interactive globe. "></head>
            <body><p>ignored</p></body></html>"#;
        let f = extract_fields(html, &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Globe"));
        assert_eq!(f.description.as_deref(), Some("An autorotating, interactive globe."));
    }

    #[test]
    fn heading_with_dash_is_not_cut() {
        let html = "<html><head><title>Card - Aceternity UI</title></head>\
                    <body><h1>Card - Hover Effect</h1></body></html>";
        let f = extract_fields(html, &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Card - Hover Effect"));

        let html = "<html><head><title>Card - Hover Effect | Aceternity UI</title></head></html>";
        let f = extract_fields(html, &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Card - Hover Effect"));
    }

    #[test]
    fn empty_matches_are_skipped() {
        let html = "<h1>   </h1><title>Meteors</title>";
        let f = extract_fields(html, &SELECTORS, 50);
        assert_eq!(f.title.as_deref(), Some("Meteors"));
    }

    #[test]
    fn discovers_component_links_once() {
        let re = Regex::new(r"^/components/([a-z0-9][a-z0-9-]*)/?$").unwrap();
        let slugs = discover_slugs(&fixture("aceternity_index"), "https://ui.aceternity.com", &re);
        assert_eq!(
            slugs,
            vec!["3d-card-effect", "background-beams", "sparkles", "floating-navbar"]
        );
    }
}
