//! Blocking HTTP access for the scrapers, paced by a fixed delay.

use std::cell::Cell;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use reqwest::blocking::Client;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::DatasetError;
use crate::settings::ScrapeSettings;

/// Narrow page access used by site scrapers. `Ok(None)` means the page does not exist.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<Option<String>>;
}

pub struct HttpFetcher {
    client: Client,
    delay: Duration,
    last_request: Cell<Option<Instant>>,
}

impl HttpFetcher {
    pub fn new(settings: &ScrapeSettings) -> Result<Self> {
        let client = Client::builder()
            .user_agent(settings.user_agent.clone())
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .context("Failed to build HTTP client")?;
        Ok(HttpFetcher {
            client,
            delay: Duration::from_millis(settings.request_delay_ms),
            last_request: Cell::new(None),
        })
    }

    /// Sleep until `delay` has passed since the previous request.
    fn pace(&self) {
        if let Some(last) = self.last_request.get() {
            let wait = self.delay.saturating_sub(last.elapsed());
            if !wait.is_zero() {
                std::thread::sleep(wait);
            }
        }
        self.last_request.set(Some(Instant::now()));
    }
}

impl PageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> Result<Option<String>> {
        self.pace();
        let start = Instant::now();
        let response = self
            .client
            .get(url)
            .send()
            .with_context(|| format!("GET {} failed", url))?;
        let status = response.status();
        debug!(
            "GET {} -> {} in {}ms",
            url,
            status.as_u16(),
            start.elapsed().as_millis()
        );

        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DatasetError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        let body = response
            .text()
            .with_context(|| format!("Failed to read body of {}", url))?;
        Ok(Some(body))
    }
}

#[cfg(test)]
pub mod testing {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use anyhow::{anyhow, Result};

    use super::PageFetcher;

    /// In-memory fetcher: known URLs return their body, `fail` URLs error, the rest 404.
    #[derive(Default)]
    pub struct FakeFetcher {
        pages: HashMap<String, String>,
        failing: Vec<String>,
        pub requests: RefCell<Vec<String>>,
    }

    impl FakeFetcher {
        pub fn page(mut self, url: &str, body: &str) -> Self {
            self.pages.insert(url.to_string(), body.to_string());
            self
        }

        pub fn fail(mut self, url: &str) -> Self {
            self.failing.push(url.to_string());
            self
        }
    }

    impl PageFetcher for FakeFetcher {
        fn fetch(&self, url: &str) -> Result<Option<String>> {
            self.requests.borrow_mut().push(url.to_string());
            if self.failing.iter().any(|u| u == url) {
                return Err(anyhow!("connection reset: {}", url));
            }
            Ok(self.pages.get(url).cloned())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pace_waits_for_the_delay_after_the_first_request() {
        let fetcher = HttpFetcher::new(&ScrapeSettings {
            request_delay_ms: 50,
            ..Default::default()
        })
        .unwrap();

        let start = Instant::now();
        fetcher.pace();
        assert!(start.elapsed() < Duration::from_millis(40));

        let second = Instant::now();
        fetcher.pace();
        assert!(second.elapsed() >= Duration::from_millis(45));
    }

    #[test]
    fn pace_does_not_sleep_once_the_delay_has_passed() {
        let fetcher = HttpFetcher::new(&ScrapeSettings {
            request_delay_ms: 20,
            ..Default::default()
        })
        .unwrap();
        fetcher.pace();
        std::thread::sleep(Duration::from_millis(30));

        let start = Instant::now();
        fetcher.pace();
        assert!(start.elapsed() < Duration::from_millis(15));
    }
}
