//! Feed access behind one trait. The harvest cycle only ever sees
//! `FeedFetcher`, so tests drive it with scripted pages and no network.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use thiserror::Error;
use tracing::debug;

use warroom_common::Config;

/// One fetched feed page plus the token for the page after it, if the feed
/// reports one. `next: None` means end of feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedPage {
    pub raw_text: String,
    pub next: Option<u32>,
}

#[derive(Debug, Error)]
pub enum FetchError {
    /// Network trouble, timeouts, 5xx. Retried on the next cycle.
    #[error("transient fetch failure: {0}")]
    Transient(String),

    /// The session cookie was rejected. Aborts the cycle immediately; there
    /// is no point walking further pages with a dead session.
    #[error("session rejected: {0}")]
    Auth(String),
}

#[async_trait]
pub trait FeedFetcher: Send + Sync {
    /// Fetch one news page. `page` is 1-based; page 1 is the newest.
    async fn fetch_news_page(&self, scope: &str, page: u32) -> Result<FeedPage, FetchError>;

    /// Fetch the kingdom overview page, when snapshot capture is configured.
    /// `Ok(None)` means capture is off.
    async fn fetch_kingdom_page(&self, scope: &str) -> Result<Option<String>, FetchError>;
}

/// Live fetcher: reqwest client with a per-request timeout and the
/// configured session cookie on every call.
pub struct HttpFeedFetcher {
    client: reqwest::Client,
    news_url: String,
    kingdom_page_url: Option<String>,
    cookie_header: String,
}

impl HttpFeedFetcher {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_seconds))
            .build()?;
        Ok(Self {
            client,
            news_url: config.news_url(),
            kingdom_page_url: config.kingdom_page_url(),
            cookie_header: format!("{}={}", config.session_cookie_name, config.session_id),
        })
    }

    async fn get_text(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::COOKIE, &self.cookie_header)
            .send()
            .await
            .map_err(|e| FetchError::Transient(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                Err(FetchError::Auth(format!("{} from {url}", response.status())))
            }
            status if !status.is_success() => {
                Err(FetchError::Transient(format!("{status} from {url}")))
            }
            _ => response
                .text()
                .await
                .map_err(|e| FetchError::Transient(e.to_string())),
        }
    }
}

#[async_trait]
impl FeedFetcher for HttpFeedFetcher {
    async fn fetch_news_page(&self, scope: &str, page: u32) -> Result<FeedPage, FetchError> {
        let url = format!("{}?page={page}", self.news_url);
        debug!(scope, page, "fetching news page");
        let raw_text = self.get_text(&url).await?;

        // The feed does not report its total page count; an empty page is the
        // only end-of-feed signal the live endpoint gives.
        let next = (!raw_text.trim().is_empty()).then_some(page + 1);
        Ok(FeedPage { raw_text, next })
    }

    async fn fetch_kingdom_page(&self, scope: &str) -> Result<Option<String>, FetchError> {
        let Some(url) = &self.kingdom_page_url else {
            return Ok(None);
        };
        debug!(scope, "fetching kingdom page");
        Ok(Some(self.get_text(url).await?))
    }
}
