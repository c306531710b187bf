use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, TimeDelta};
use reqwest::{Client, Url};
use scraper::Html;

use crate::cache::PageCache;
use crate::error::OutageError;
use crate::parser::{extract_publication_date, parse_outage_page};
use crate::types::{Place, ScrapedOutage};

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Empty response for {0}")]
    EmptyBody(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub url: String,
    pub cache_ttl_secs: u64,
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            url: crate::OUTAGE_TABLE_URL.to_string(),
            cache_ttl_secs: 3600,
            request_timeout_secs: 30,
        }
    }
}

impl Settings {
    /// Defaults overridden by `KHAMOOSHI_URL`, `KHAMOOSHI_CACHE_TTL` and
    /// `KHAMOOSHI_TIMEOUT` (both in seconds).
    pub fn from_env() -> Self {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    fn from_vars(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut settings = Self::default();

        if let Some(url) = var("KHAMOOSHI_URL").filter(|u| !u.trim().is_empty()) {
            settings.url = url.trim().to_string();
        }
        if let Some(ttl) = var("KHAMOOSHI_CACHE_TTL") {
            match ttl.trim().parse() {
                Ok(secs) => settings.cache_ttl_secs = secs,
                Err(e) => log::warn!("Ignoring KHAMOOSHI_CACHE_TTL={ttl:?}: {e}"),
            }
        }
        if let Some(timeout) = var("KHAMOOSHI_TIMEOUT") {
            match timeout.trim().parse() {
                Ok(secs) => settings.request_timeout_secs = secs,
                Err(e) => log::warn!("Ignoring KHAMOOSHI_TIMEOUT={timeout:?}: {e}"),
            }
        }

        settings
    }

    pub fn cache_ttl(&self) -> TimeDelta {
        i64::try_from(self.cache_ttl_secs)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .unwrap_or(TimeDelta::MAX)
    }

    /// Host part of the outage table URL, for user-facing messages.
    pub fn host(&self) -> String {
        Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
            .unwrap_or_else(|| self.url.clone())
    }
}

#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let html = self
            .client
            .get(url)
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;

        if html.trim().is_empty() {
            return Err(FetchError::EmptyBody(url.to_string()));
        }

        Ok(html)
    }
}

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Answers outage queries against the upstream table, keeping the last
/// fetched page for a short while.
pub struct OutageChecker<F = HttpFetcher, C = SystemClock> {
    settings: Settings,
    fetcher: F,
    clock: C,
    cache: Mutex<PageCache>,
}

impl OutageChecker {
    pub fn new(settings: Settings) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(&settings)?;
        Ok(Self::with_parts(settings, fetcher, SystemClock))
    }
}

impl<F: PageFetcher, C: Clock> OutageChecker<F, C> {
    pub fn with_parts(settings: Settings, fetcher: F, clock: C) -> Self {
        let cache = Mutex::new(PageCache::new(settings.cache_ttl()));
        Self {
            settings,
            fetcher,
            clock,
            cache,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Looks up `places` in the current outage table.
    pub async fn check(&self, places: &[Place]) -> Result<ScrapedOutage, OutageError> {
        if places.is_empty() {
            return Err(OutageError::MissingSearchPhrase);
        }

        let html = self.get_document().await?;
        let scraped = parse_outage_page(&html, places)?;

        log::info!(
            "Outage table for {}: {} of {} place(s) affected",
            scraped.date,
            scraped.places.len(),
            places.len()
        );

        Ok(scraped)
    }

    pub async fn publication_date(&self) -> Result<NaiveDate, OutageError> {
        let html = self.get_document().await?;
        extract_publication_date(&Html::parse_document(&html))
    }

    /// Returns the cached page when still valid, otherwise fetches and caches
    /// a fresh one.
    pub async fn get_document(&self) -> Result<String, OutageError> {
        let cached = {
            let cache = self.lock_cache();
            cache.get(self.clock.now()).map(str::to_string)
        };
        if let Some(page) = cached {
            log::debug!("Serving outage table from cache");
            return Ok(page);
        }

        log::info!("Fetching outage table from {}...", self.settings.url);
        let page = self
            .fetcher
            .fetch_page(&self.settings.url)
            .await
            .inspect_err(|e| log::error!("Failed to fetch outage table: {e:?}"))
            .map_err(|source| OutageError::Fetch {
                host: self.settings.host(),
                source,
            })?;

        self.lock_cache().set(page.clone(), self.clock.now());
        Ok(page)
    }

    fn lock_cache(&self) -> MutexGuard<'_, PageCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
