//! Research aggregation: concurrent fetches over the analyzer's reference URLs.
//!
//! One task is spawned per URL; the stage waits for every task, never cancels
//! a slow one, and merges results by request index. A failed fetch becomes an
//! inline marker in the corpus rather than an error.

pub mod fetcher;
pub mod sanitize;

use std::sync::Arc;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tracing::{info, instrument};

use crate::domain::{ResearchCorpus, ResearchItem};
use crate::obs;

pub use fetcher::{FetchError, HttpFetcher};
pub use sanitize::{html_to_text, truncate_chars};

/// Retrieves one reference URL. Implementations must not fail: errors are
/// reported through [`ResearchItem::failed`].
#[async_trait]
pub trait ResearchFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> ResearchItem;
}

/// Fetch every URL concurrently and return the items in request order.
///
/// An empty URL list yields an empty corpus without touching the fetcher.
#[instrument(skip(fetcher, urls), fields(url_count = urls.len()))]
pub async fn gather_research(
    fetcher: Arc<dyn ResearchFetcher>,
    urls: &[String],
) -> ResearchCorpus {
    if urls.is_empty() {
        return ResearchCorpus::default();
    }

    info!("Prefetching {} resources concurrently", urls.len());

    let tasks: Vec<(String, JoinHandle<ResearchItem>)> = urls
        .iter()
        .map(|url| {
            let fetcher = Arc::clone(&fetcher);
            let owned = url.clone();
            let task = tokio::spawn(async move { fetcher.fetch(&owned).await });
            (url.clone(), task)
        })
        .collect();

    let mut items = Vec::with_capacity(tasks.len());
    for (url, task) in tasks {
        let item = match task.await {
            Ok(item) => item,
            Err(e) => ResearchItem::failed(&url, format!("fetch task aborted: {}", e)),
        };
        obs::emit_research_fetched(&item.source_url, item.ok, item.char_count());
        items.push(item);
    }

    let corpus = ResearchCorpus::new(items);
    info!(
        succeeded = corpus.succeeded(),
        failed = corpus.failed(),
        "research gathered"
    );
    corpus
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fakes::StaticFetcher;
    use std::time::Duration;

    #[tokio::test]
    async fn empty_url_list_is_noop() {
        let fetcher: Arc<dyn ResearchFetcher> = Arc::new(StaticFetcher::new());
        let corpus = gather_research(fetcher, &[]).await;
        assert!(corpus.is_empty());
        assert_eq!(corpus.text(), "");
    }

    #[tokio::test]
    async fn order_follows_request_not_completion() {
        let fetcher: Arc<dyn ResearchFetcher> = Arc::new(
            StaticFetcher::new()
                .page("https://slow.example", "slow body", Duration::from_millis(150))
                .page("https://fast.example", "fast body", Duration::from_millis(1))
                .failing("https://bad.example", "boom", Duration::from_millis(20)),
        );
        let urls = vec![
            "https://slow.example".to_string(),
            "https://bad.example".to_string(),
            "https://fast.example".to_string(),
        ];

        let corpus = gather_research(fetcher, &urls).await;

        let order: Vec<&str> = corpus.items.iter().map(|i| i.source_url.as_str()).collect();
        assert_eq!(order, vec![
            "https://slow.example",
            "https://bad.example",
            "https://fast.example"
        ]);
        assert_eq!(corpus.succeeded(), 2);
        assert_eq!(corpus.failed(), 1);
    }

    #[tokio::test]
    async fn fetches_run_concurrently() {
        let fetcher: Arc<dyn ResearchFetcher> = Arc::new(
            StaticFetcher::new()
                .page("https://a.example", "a", Duration::from_millis(300))
                .page("https://b.example", "b", Duration::from_millis(300))
                .page("https://c.example", "c", Duration::from_millis(300)),
        );
        let urls: Vec<String> = ["https://a.example", "https://b.example", "https://c.example"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let started = std::time::Instant::now();
        let corpus = gather_research(fetcher, &urls).await;
        assert_eq!(corpus.len(), 3);
        assert!(started.elapsed() < Duration::from_millis(800));
    }
}
