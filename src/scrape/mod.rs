pub mod extract;
pub mod site;
pub mod templates;

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use crate::http::HttpFetcher;
use crate::model::{ComponentRecord, TrainingExample};
use crate::settings::Settings;
use crate::store;
use site::{SiteProfile, SiteScraper};

/// One documentation site, seen by the pipeline only through slugs and records.
pub trait ComponentSource {
    fn name(&self) -> &str;
    /// Slugs linked from the site's index pages.
    fn discover(&self) -> Result<Vec<String>>;
    /// Static fallback list used even when discovery fails.
    fn known_slugs(&self) -> Vec<String>;
    /// Candidates that are only kept if `probe` finds a page for them.
    fn probe_slugs(&self) -> Vec<String>;
    fn probe(&self, slug: &str) -> Result<bool>;
    /// `Ok(None)` when no URL variant exists for `slug`.
    fn fetch(&self, slug: &str) -> Result<Option<ComponentRecord>>;
}

/// Outcome of scraping one source.
#[derive(Debug, Default)]
pub struct ScrapeReport {
    pub source: String,
    pub attempted: usize,
    pub components: Vec<ComponentRecord>,
    pub not_found: Vec<String>,
    pub failed: Vec<String>,
    pub interrupted: bool,
}

impl ScrapeReport {
    pub fn fallbacks(&self) -> usize {
        self.components.iter().filter(|c| c.fallback).count()
    }
}

/// Discovered ∪ known ∪ probed slugs, first-seen order.
/// Once `interrupt` is set, no further discovery or probe requests are made.
pub fn collect_slugs(source: &dyn ComponentSource, interrupt: &AtomicBool) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut slugs = Vec::new();
    let mut push = |slug: String, slugs: &mut Vec<String>| {
        if seen.insert(slug.clone()) {
            slugs.push(slug);
        }
    };

    let discovered = if interrupt.load(Ordering::SeqCst) {
        Ok(Vec::new())
    } else {
        source.discover()
    };
    match discovered {
        Ok(found) => {
            info!("{}: discovered {} component links", source.name(), found.len());
            for slug in found {
                push(slug, &mut slugs);
            }
        }
        Err(e) => warn!(
            "{}: discovery failed ({:#}), continuing with the static list",
            source.name(),
            e
        ),
    }

    for slug in source.known_slugs() {
        push(slug, &mut slugs);
    }

    for slug in source.probe_slugs() {
        if interrupt.load(Ordering::SeqCst) {
            break;
        }
        if slugs.contains(&slug) {
            continue;
        }
        match source.probe(&slug) {
            Ok(true) => push(slug, &mut slugs),
            Ok(false) => {}
            Err(e) => warn!("{}: probe for {} failed: {:#}", source.name(), slug, e),
        }
    }

    slugs
}

/// Scrape every slug of `source`, skipping failures. Stops early once `interrupt` is set.
pub fn scrape_source(
    source: &dyn ComponentSource,
    limit: Option<usize>,
    interrupt: &AtomicBool,
) -> ScrapeReport {
    let mut report = ScrapeReport {
        source: source.name().to_string(),
        ..Default::default()
    };

    let mut slugs = collect_slugs(source, interrupt);
    if let Some(n) = limit {
        slugs.truncate(n);
    }
    info!("{}: scraping {} components", source.name(), slugs.len());

    let pb = ProgressBar::new(slugs.len() as u64);
    if let Ok(style) =
        ProgressStyle::default_bar().template("[{elapsed_precise}] {bar:40} {pos}/{len} {msg}")
    {
        pb.set_style(style.progress_chars("=> "));
    }

    for slug in slugs {
        if interrupt.load(Ordering::SeqCst) {
            warn!("{}: interrupted, keeping {} scraped so far", source.name(), report.components.len());
            report.interrupted = true;
            break;
        }
        pb.set_message(slug.clone());
        report.attempted += 1;

        match source.fetch(&slug) {
            Ok(Some(record)) => report.components.push(record),
            Ok(None) => {
                warn!("{}: no page found for {}", source.name(), slug);
                report.not_found.push(slug);
            }
            Err(e) => {
                warn!("{}: error scraping {}: {:#}", source.name(), slug, e);
                report.failed.push(slug);
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    info!(
        "{}: {} components ({} from templates), {} not found, {} failed",
        report.source,
        report.components.len(),
        report.fallbacks(),
        report.not_found.len(),
        report.failed.len()
    );
    report
}

/// Turn scraped components into training examples. Unserializable records are skipped.
pub fn to_examples(namespace: &str, components: &[ComponentRecord]) -> Vec<TrainingExample> {
    components
        .iter()
        .filter_map(|c| match TrainingExample::from_component(namespace, c) {
            Ok(ex) => Some(ex),
            Err(e) => {
                warn!("Skipping {}: {}", c.name, e);
                None
            }
        })
        .collect()
}

/// Scrape the given sites over HTTP and write their raw (and summary) files.
/// Sources after an interruption are not started.
pub fn scrape_sites(
    settings: &Settings,
    profiles: Vec<SiteProfile>,
    limit: Option<usize>,
    interrupt: &AtomicBool,
) -> Result<Vec<ScrapeReport>> {
    let mut reports = Vec::new();

    for profile in profiles {
        if interrupt.load(Ordering::SeqCst) {
            break;
        }
        let layout = profile.layout;
        let base_url = profile.base_url;
        let fetcher = HttpFetcher::new(&settings.scrape)?;
        let site = SiteScraper::new(profile, fetcher, settings.scrape.min_code_len)?;

        let report = scrape_source(&site, limit, interrupt);
        let examples = to_examples(&report.source, &report.components);

        let path = settings.raw_path(&report.source);
        store::write_raw(&path, &report.source, base_url, layout, &examples)?;
        println!("Saved {} {} examples to {}", examples.len(), report.source, path.display());

        if settings.write_summary {
            store::write_summary(&settings.summary_path(&report.source), &report)?;
        }
        reports.push(report);
    }

    Ok(reports)
}
