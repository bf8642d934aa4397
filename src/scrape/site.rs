use anyhow::{Context, Result};
use regex::Regex;
use tracing::{debug, info};

use super::extract::{self, SelectorSet};
use super::templates;
use super::ComponentSource;
use crate::http::PageFetcher;
use crate::model::{title_case, ComponentRecord};
use crate::store::RawLayout;

/// Everything site-specific about one documentation site.
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub source: &'static str,
    pub base_url: &'static str,
    /// Pages listing components, relative to `base_url`.
    pub index_paths: &'static [&'static str],
    /// Path regex whose first group is the slug.
    pub link_pattern: &'static str,
    /// Page URL variants, tried in order. `{base}` and `{slug}` are substituted.
    pub url_templates: [&'static str; 3],
    pub selectors: SelectorSet,
    pub known_slugs: &'static [&'static str],
    pub probe_slugs: &'static [&'static str],
    pub layout: RawLayout,
}

impl SiteProfile {
    pub fn all() -> Vec<SiteProfile> {
        vec![magicui(), aceternity()]
    }

    pub fn by_name(name: &str) -> Option<SiteProfile> {
        Self::all().into_iter().find(|p| p.source == name)
    }

    pub fn page_urls(&self, slug: &str) -> Vec<String> {
        self.url_templates
            .iter()
            .map(|t| t.replace("{base}", self.base_url).replace("{slug}", slug))
            .collect()
    }
}

pub fn magicui() -> SiteProfile {
    SiteProfile {
        source: "magicui",
        base_url: "https://magicui.design",
        index_paths: &["/docs/components", "/docs"],
        link_pattern: r"^/docs/components/([a-z0-9][a-z0-9-]*)/?$",
        url_templates: [
            "{base}/docs/components/{slug}",
            "{base}/components/{slug}",
            "{base}/docs/{slug}",
        ],
        selectors: SelectorSet {
            title: &["h1", "title", "h2"],
            description: &[".prose p", ".description", "meta[name=description]", "p"],
            code: &["pre code", "pre", "code", ".code-block"],
        },
        known_slugs: &[
            "marquee",
            "magic-card",
            "shimmer-button",
            "animated-beam",
            "border-beam",
            "number-ticker",
            "globe",
            "dock",
            "particles",
            "meteors",
        ],
        probe_slugs: &[
            "bento-grid",
            "orbiting-circles",
            "animated-list",
            "shiny-button",
            "word-rotate",
            "blur-fade",
        ],
        layout: RawLayout::Flat,
    }
}

pub fn aceternity() -> SiteProfile {
    SiteProfile {
        source: "aceternity",
        base_url: "https://ui.aceternity.com",
        index_paths: &["/components"],
        link_pattern: r"^/components/([a-z0-9][a-z0-9-]*)/?$",
        url_templates: [
            "{base}/components/{slug}",
            "{base}/docs/{slug}",
            "{base}/components/{slug}/preview",
        ],
        selectors: SelectorSet {
            title: &["h1", "title"],
            description: &["meta[name=description]", ".description", "main p", "p"],
            code: &["pre code", "pre", "[data-rehype-pretty-code-fragment] code", "code"],
        },
        known_slugs: &[
            "3d-card-effect",
            "background-beams",
            "sparkles",
            "floating-navbar",
            "hero-parallax",
            "text-generate-effect",
            "typewriter-effect",
            "bento-grid",
        ],
        probe_slugs: &["spotlight", "lamp-effect", "wavy-background", "infinite-moving-cards"],
        layout: RawLayout::Wrapped,
    }
}

/// Scrapes one site through its profile. All network access goes through `F`.
pub struct SiteScraper<F> {
    profile: SiteProfile,
    fetcher: F,
    link_re: Regex,
    min_code_len: usize,
}

impl<F: PageFetcher> SiteScraper<F> {
    pub fn new(profile: SiteProfile, fetcher: F, min_code_len: usize) -> Result<Self> {
        let link_re = Regex::new(profile.link_pattern)
            .with_context(|| format!("Bad link pattern for {}", profile.source))?;
        Ok(SiteScraper {
            profile,
            fetcher,
            link_re,
            min_code_len,
        })
    }

    fn build_record(&self, slug: &str, url: &str, html: &str) -> ComponentRecord {
        let fields = extract::extract_fields(html, &self.profile.selectors, self.min_code_len);
        let (code, fallback) = match fields.code {
            Some(code) => (code, false),
            None => {
                info!("No usable code for {} at {}, using template", slug, url);
                (templates::fallback_code(slug), true)
            }
        };
        ComponentRecord {
            name: slug.to_string(),
            title: fields.title.unwrap_or_else(|| title_case(slug)),
            description: fields
                .description
                .unwrap_or_else(|| format!("An interactive {} component", slug)),
            code,
            url: Some(url.to_string()),
            fallback,
        }
    }
}

impl<F: PageFetcher> ComponentSource for SiteScraper<F> {
    fn name(&self) -> &str {
        self.profile.source
    }

    fn discover(&self) -> Result<Vec<String>> {
        let mut slugs = Vec::new();
        let mut reached = false;
        let mut last_err = None;

        for path in self.profile.index_paths {
            let url = format!("{}{}", self.profile.base_url, path);
            match self.fetcher.fetch(&url) {
                Ok(Some(html)) => {
                    reached = true;
                    let found = extract::discover_slugs(&html, self.profile.base_url, &self.link_re);
                    debug!("{} links on {}", found.len(), url);
                    for slug in found {
                        if !slugs.contains(&slug) {
                            slugs.push(slug);
                        }
                    }
                }
                Ok(None) => debug!("Index page {} not found", url),
                Err(e) => last_err = Some(e),
            }
        }

        match (reached, last_err) {
            (false, Some(e)) => Err(e.context(format!("{} index unreachable", self.profile.source))),
            _ => Ok(slugs),
        }
    }

    fn known_slugs(&self) -> Vec<String> {
        self.profile.known_slugs.iter().map(|s| s.to_string()).collect()
    }

    fn probe_slugs(&self) -> Vec<String> {
        self.profile.probe_slugs.iter().map(|s| s.to_string()).collect()
    }

    fn probe(&self, slug: &str) -> Result<bool> {
        let urls = self.profile.page_urls(slug);
        Ok(self.fetcher.fetch(&urls[0])?.is_some())
    }

    fn fetch(&self, slug: &str) -> Result<Option<ComponentRecord>> {
        let mut last_err = None;
        for url in self.profile.page_urls(slug) {
            match self.fetcher.fetch(&url) {
                Ok(Some(html)) => return Ok(Some(self.build_record(slug, &url, &html))),
                Ok(None) => debug!("{} not found at {}", slug, url),
                Err(e) => {
                    debug!("{} failed at {}: {:#}", slug, url, e);
                    last_err = Some(e);
                }
            }
        }
        match last_err {
            Some(e) => Err(e),
            None => Ok(None),
        }
    }
}
