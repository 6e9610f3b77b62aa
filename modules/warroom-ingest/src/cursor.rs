//! Resumable, bounded walk over the paginated feed, newest page first. The
//! walk is a pull loop: the caller asks for the next page, decides whether
//! its content was all seen before, and stops the walk early when so.

use crate::fetch::{FeedFetcher, FeedPage, FetchError};

/// Forward-only page cursor. Yields pages until the feed ends, the page
/// bound is hit, or the caller stops asking.
pub struct PageWalk<'a> {
    fetcher: &'a dyn FeedFetcher,
    scope: &'a str,
    next: Option<u32>,
    max_pages: u32,
    pages_fetched: u32,
}

impl<'a> PageWalk<'a> {
    pub fn new(fetcher: &'a dyn FeedFetcher, scope: &'a str, max_pages: u32) -> Self {
        Self {
            fetcher,
            scope,
            next: Some(1),
            max_pages,
            pages_fetched: 0,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Fetch the next page, or `None` when the feed ended or the page bound
    /// was reached. A fetch error ends the walk; pages already yielded stay
    /// yielded.
    pub async fn next_page(&mut self) -> Result<Option<FeedPage>, FetchError> {
        if self.pages_fetched >= self.max_pages {
            return Ok(None);
        }
        let Some(page) = self.next.take() else {
            return Ok(None);
        };

        let fetched = self.fetcher.fetch_news_page(self.scope, page).await?;
        self.pages_fetched += 1;
        self.next = fetched.next;
        Ok(Some(fetched))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;

    struct ThreePages;

    #[async_trait]
    impl FeedFetcher for ThreePages {
        async fn fetch_news_page(&self, _scope: &str, page: u32) -> Result<FeedPage, FetchError> {
            if page > 3 {
                return Err(FetchError::Transient("requested past end".to_string()));
            }
            Ok(FeedPage {
                raw_text: format!("page {page}"),
                next: (page < 3).then_some(page + 1),
            })
        }

        async fn fetch_kingdom_page(&self, _scope: &str) -> Result<Option<String>, FetchError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn test_walk_follows_tokens_to_feed_end() {
        let fetcher = ThreePages;
        let mut walk = PageWalk::new(&fetcher, "genesis", 10);

        let mut texts = Vec::new();
        while let Some(page) = walk.next_page().await.unwrap() {
            texts.push(page.raw_text);
        }
        assert_eq!(texts, vec!["page 1", "page 2", "page 3"]);
        assert_eq!(walk.pages_fetched(), 3);
    }

    #[tokio::test]
    async fn test_walk_respects_max_pages() {
        let fetcher = ThreePages;
        let mut walk = PageWalk::new(&fetcher, "genesis", 2);

        assert!(walk.next_page().await.unwrap().is_some());
        assert!(walk.next_page().await.unwrap().is_some());
        assert!(walk.next_page().await.unwrap().is_none());
        assert_eq!(walk.pages_fetched(), 2);
    }

    #[tokio::test]
    async fn test_walk_can_stop_mid_feed() {
        let fetcher = ThreePages;
        let mut walk = PageWalk::new(&fetcher, "genesis", 10);

        // The caller decides page 1 was all-known and drops the walk.
        let first = walk.next_page().await.unwrap().unwrap();
        assert_eq!(first.raw_text, "page 1");
        assert_eq!(walk.pages_fetched(), 1);
    }
}
