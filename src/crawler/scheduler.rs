//! Crawl scheduler: drives the frontier with a bounded pool of
//! fetch-and-segment tasks.
//!
//! The scheduler task alone owns the [`Frontier`], so claiming a URL in the
//! visited set happens in one place and never races. Workers only fetch,
//! segment and report the links they found.

use std::sync::Arc;

use serde::Serialize;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};
use url::Url;

use crate::crawler::error::CrawlError;
use crate::crawler::fetcher::{HttpFetcher, Page, PageFetcher};
use crate::crawler::frontier::{Frontier, FrontierEntry};
use crate::crawler::links::extract_links;
use crate::crawler::normalize::normalize_url;
use crate::crawler::scope::authority;
use crate::crawler::{CrawledPage, CrawlerConfig};
use crate::segmenter::{SegmenterConfig, extract_content_blocks};

/// Counters for one crawl job
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CrawlStats {
    /// Pages fetched and segmented
    pub pages_crawled: usize,

    /// URLs whose fetch failed or was not HTML
    pub pages_skipped: usize,

    /// In-scope links found across all pages
    pub links_discovered: usize,
}

/// Outcome of a crawl job
#[derive(Debug, Clone)]
pub struct CrawlReport {
    /// Pages in the order they were dequeued
    pub pages: Vec<CrawledPage>,

    /// Job counters
    pub stats: CrawlStats,

    /// True when the job stopped because it was cancelled
    pub cancelled: bool,
}

/// What a worker hands back for one frontier entry
struct Visit {
    sequence: usize,
    entry: FrontierEntry,
    outcome: Result<(CrawledPage, Vec<String>), CrawlError>,
}

/// Breadth-first, single-domain crawler
pub struct Crawler<F> {
    fetcher: Arc<F>,
    config: CrawlerConfig,
    segmenter: Arc<SegmenterConfig>,
}

impl Crawler<HttpFetcher> {
    /// Create a crawler that fetches over HTTP
    pub fn new(config: CrawlerConfig) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.user_agent, config.request_timeout)?;
        Ok(Self::with_fetcher(fetcher, config))
    }
}

impl<F: PageFetcher> Crawler<F> {
    /// Create a crawler around any page fetcher
    pub fn with_fetcher(fetcher: F, config: CrawlerConfig) -> Self {
        let segmenter = Arc::new(config.segmenter.clone());
        Self {
            fetcher: Arc::new(fetcher),
            config,
            segmenter,
        }
    }

    /// The configuration this crawler runs with
    pub fn config(&self) -> &CrawlerConfig {
        &self.config
    }

    /// Crawl from `seed` until the frontier is exhausted
    pub async fn crawl(&self, seed: &str) -> Result<CrawlReport, CrawlError> {
        self.crawl_with_cancellation(seed, CancellationToken::new())
            .await
    }

    /// Crawl from `seed`, stopping early when `cancel` fires.
    ///
    /// After cancellation no new fetches are started; fetches already in
    /// flight complete and their pages are part of the report.
    #[instrument(skip(self, cancel), fields(max_depth = self.config.max_depth))]
    pub async fn crawl_with_cancellation(
        &self,
        seed: &str,
        cancel: CancellationToken,
    ) -> Result<CrawlReport, CrawlError> {
        let seed_url = Url::parse(seed)?;
        if !matches!(seed_url.scheme(), "http" | "https") || seed_url.host_str().is_none() {
            return Err(CrawlError::Other(format!("Unsupported seed URL: {}", seed)));
        }
        let base_domain = authority(&seed_url);

        info!(
            "Starting crawl for {} (max_depth: {}, concurrency: {})",
            seed, self.config.max_depth, self.config.concurrency
        );

        let mut frontier = Frontier::new(self.config.max_depth);
        frontier.push(normalize_url(seed), 0);

        let mut workers: JoinSet<Visit> = JoinSet::new();
        let mut pages: Vec<(usize, CrawledPage)> = Vec::new();
        let mut stats = CrawlStats::default();
        let mut dispatched = 0usize;
        let mut cancelled = false;

        loop {
            if !cancelled && cancel.is_cancelled() {
                info!("Crawl cancelled; waiting for {} in-flight pages", workers.len());
                cancelled = true;
            }

            while !cancelled
                && workers.len() < self.config.concurrency.max(1)
                && self.config.max_pages.is_none_or(|cap| dispatched < cap)
            {
                let Some(entry) = frontier.next_entry() else {
                    break;
                };
                info!("[{}] Crawling: {}", entry.depth, entry.url);
                self.spawn_visit(&mut workers, dispatched, entry, &base_domain);
                dispatched += 1;
            }

            if workers.is_empty() {
                break;
            }

            tokio::select! {
                biased;

                _ = cancel.cancelled(), if !cancelled => {}
                joined = workers.join_next() => {
                    let Some(joined) = joined else { continue };
                    let visit = match joined {
                        Ok(visit) => visit,
                        Err(e) => {
                            warn!("Crawl worker failed: {}", e);
                            stats.pages_skipped += 1;
                            continue;
                        }
                    };

                    match visit.outcome {
                        Ok((page, links)) => {
                            debug!(
                                "{} yielded {} blocks and {} links",
                                page.url,
                                page.blocks.len(),
                                links.len()
                            );
                            stats.pages_crawled += 1;
                            stats.links_discovered += links.len();
                            frontier.push_links(links, visit.entry.depth);
                            pages.push((visit.sequence, page));
                        }
                        Err(e) => {
                            warn!("Skipping {}: {}", visit.entry.url, e);
                            stats.pages_skipped += 1;
                        }
                    }
                }
            }
        }

        pages.sort_by_key(|(sequence, _)| *sequence);
        let pages: Vec<CrawledPage> = pages.into_iter().map(|(_, page)| page).collect();

        info!(
            "Crawl finished: {} pages, {} skipped, {} links discovered, {} URLs visited",
            stats.pages_crawled,
            stats.pages_skipped,
            stats.links_discovered,
            frontier.visited().len()
        );

        Ok(CrawlReport {
            pages,
            stats,
            cancelled,
        })
    }

    fn spawn_visit(
        &self,
        workers: &mut JoinSet<Visit>,
        sequence: usize,
        entry: FrontierEntry,
        base_domain: &str,
    ) {
        let fetcher = Arc::clone(&self.fetcher);
        let segmenter = Arc::clone(&self.segmenter);
        let base_domain = base_domain.to_string();

        workers.spawn(async move {
            let outcome = match fetcher.fetch(&entry.url, entry.depth).await {
                Ok(page) => process_page(page, &base_domain, &segmenter),
                Err(e) => Err(e),
            };
            Visit {
                sequence,
                entry,
                outcome,
            }
        });
    }
}

/// Segment a fetched page and collect its in-scope links
fn process_page(
    page: Page,
    base_domain: &str,
    segmenter: &SegmenterConfig,
) -> Result<(CrawledPage, Vec<String>), CrawlError> {
    let page_url = Url::parse(&page.url)?;
    let links = extract_links(&page.raw_html, &page_url, base_domain);
    let blocks = extract_content_blocks(&page.raw_html, segmenter);

    Ok((
        CrawledPage {
            url: page.url,
            depth: page.depth,
            blocks,
        },
        links,
    ))
}

/// Crawl a website and extract its content blocks
///
/// # Arguments
///
/// * `url` - The seed URL
/// * `config` - The crawler configuration
///
/// # Returns
///
/// The crawled pages, in the order they were dequeued
pub async fn crawl_site(url: &str, config: CrawlerConfig) -> Result<Vec<CrawledPage>, CrawlError> {
    let crawler = Crawler::new(config)?;
    Ok(crawler.crawl(url).await?.pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory site; records every fetch.
    #[derive(Default)]
    struct StaticSite {
        pages: HashMap<String, String>,
        calls: Mutex<Vec<String>>,
        delay: Option<Duration>,
    }

    impl StaticSite {
        fn page(mut self, url: &str, html: &str) -> Self {
            self.pages.insert(url.to_string(), html.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StaticSite {
        async fn fetch(&self, url: &str, depth: u32) -> Result<Page, CrawlError> {
            self.calls.lock().unwrap().push(url.to_string());
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            match self.pages.get(url) {
                Some(html) => Ok(Page {
                    url: url.to_string(),
                    depth,
                    raw_html: html.clone(),
                    content_type: "text/html".to_string(),
                }),
                None => Err(CrawlError::NotHtml {
                    url: url.to_string(),
                    content_type: "application/octet-stream".to_string(),
                }),
            }
        }
    }

    /// Wrapper that exposes the fetch log after the crawler took ownership.
    struct Shared(Arc<StaticSite>);

    impl PageFetcher for Shared {
        async fn fetch(&self, url: &str, depth: u32) -> Result<Page, CrawlError> {
            self.0.fetch(url, depth).await
        }
    }

    fn linked_page(title: &str, links: &[&str]) -> String {
        let anchors: String = links
            .iter()
            .map(|href| format!("<a href=\"{href}\">{href}</a>"))
            .collect();
        format!(
            "<html><body><h1>{title}</h1><p>About {title}.</p><nav>{anchors}</nav></body></html>"
        )
    }

    fn cyclic_site() -> StaticSite {
        StaticSite::default()
            .page(
                "http://a.com",
                &linked_page("home", &["/one", "/two/", "/one#frag", "http://b.com/x"]),
            )
            .page("http://a.com/one", &linked_page("one", &["/", "/two", "/three"]))
            .page("http://a.com/two", &linked_page("two", &["/one?utm_source=x", "/three"]))
            .page("http://a.com/three", &linked_page("three", &["/four"]))
            .page("http://a.com/four", &linked_page("four", &["/"]))
    }

    fn config(max_depth: u32, concurrency: usize) -> CrawlerConfig {
        CrawlerConfig::builder()
            .max_depth(max_depth)
            .concurrency(concurrency)
            .build()
    }

    #[tokio::test]
    async fn test_each_url_is_fetched_at_most_once() {
        for concurrency in [1, 4] {
            let site = Arc::new(cyclic_site());
            let crawler = Crawler::with_fetcher(Shared(Arc::clone(&site)), config(5, concurrency));
            let report = crawler.crawl("http://a.com/").await.unwrap();

            let mut calls = site.calls();
            let total = calls.len();
            calls.sort();
            calls.dedup();
            assert_eq!(calls.len(), total, "a URL was fetched twice");
            assert_eq!(report.pages.len(), 5);
            assert!(!calls.iter().any(|u| u.contains("b.com")));
        }
    }

    #[tokio::test]
    async fn test_results_follow_bfs_order() {
        let crawler = Crawler::with_fetcher(cyclic_site(), config(5, 1));
        let report = crawler.crawl("http://a.com").await.unwrap();

        let visited: Vec<(&str, u32)> = report
            .pages
            .iter()
            .map(|p| (p.url.as_str(), p.depth))
            .collect();
        assert_eq!(
            visited,
            vec![
                ("http://a.com", 0),
                ("http://a.com/one", 1),
                ("http://a.com/two", 1),
                ("http://a.com/three", 2),
                ("http://a.com/four", 3),
            ]
        );
        assert_eq!(report.pages[0].blocks[0].title, "home");
        assert_eq!(report.pages[0].blocks[0].content, "About home.");
    }

    #[tokio::test]
    async fn test_depth_bound_is_respected() {
        let site = Arc::new(cyclic_site());
        let crawler = Crawler::with_fetcher(Shared(Arc::clone(&site)), config(1, 3));
        let report = crawler.crawl("http://a.com").await.unwrap();

        assert!(report.pages.iter().all(|p| p.depth <= 1));
        assert_eq!(report.pages.len(), 3);
        assert!(!site.calls().contains(&"http://a.com/three".to_string()));
    }

    #[tokio::test]
    async fn test_depth_zero_fetches_only_the_seed() {
        let crawler = Crawler::with_fetcher(cyclic_site(), config(0, 2));
        let report = crawler.crawl("http://a.com").await.unwrap();
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.stats.pages_crawled, 1);
    }

    #[tokio::test]
    async fn test_failed_fetches_do_not_abort_the_crawl() {
        let site = StaticSite::default()
            .page("http://a.com", &linked_page("home", &["/missing", "/ok"]))
            .page("http://a.com/ok", &linked_page("ok", &[]));
        let crawler = Crawler::with_fetcher(site, config(2, 2));
        let report = crawler.crawl("http://a.com").await.unwrap();

        let urls: Vec<&str> = report.pages.iter().map(|p| p.url.as_str()).collect();
        assert_eq!(urls, vec!["http://a.com", "http://a.com/ok"]);
        assert_eq!(report.stats.pages_skipped, 1);
    }

    #[tokio::test]
    async fn test_max_pages_caps_fetches() {
        let site = Arc::new(cyclic_site());
        let config = CrawlerConfig::builder()
            .max_depth(5)
            .concurrency(2)
            .max_pages(Some(2))
            .build();
        let crawler = Crawler::with_fetcher(Shared(Arc::clone(&site)), config);
        let report = crawler.crawl("http://a.com").await.unwrap();

        assert_eq!(site.calls().len(), 2);
        assert_eq!(report.pages.len(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_stops_scheduling() {
        let site = StaticSite {
            delay: Some(Duration::from_millis(50)),
            ..cyclic_site()
        };
        let site = Arc::new(site);
        let crawler = Crawler::with_fetcher(Shared(Arc::clone(&site)), config(5, 1));

        let cancel = CancellationToken::new();
        cancel.cancel();
        let report = crawler
            .crawl_with_cancellation("http://a.com", cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert!(site.calls().is_empty());
        assert!(report.pages.is_empty());
    }

    /// Fires the token while the seed is being fetched.
    struct CancelOnFetch {
        site: Arc<StaticSite>,
        cancel: CancellationToken,
    }

    impl PageFetcher for CancelOnFetch {
        async fn fetch(&self, url: &str, depth: u32) -> Result<Page, CrawlError> {
            self.cancel.cancel();
            self.site.fetch(url, depth).await
        }
    }

    #[tokio::test]
    async fn test_links_of_in_flight_pages_are_not_followed_after_cancel() {
        let site = Arc::new(cyclic_site());
        let cancel = CancellationToken::new();
        let fetcher = CancelOnFetch {
            site: Arc::clone(&site),
            cancel: cancel.clone(),
        };
        let crawler = Crawler::with_fetcher(fetcher, config(5, 4));

        let report = crawler
            .crawl_with_cancellation("http://a.com", cancel)
            .await
            .unwrap();

        assert!(report.cancelled);
        assert_eq!(site.calls(), vec!["http://a.com".to_string()]);
        assert_eq!(report.pages.len(), 1);
        assert_eq!(report.pages[0].url, "http://a.com");
    }

    #[tokio::test]
    async fn test_invalid_seed_is_an_error() {
        let crawler = Crawler::with_fetcher(StaticSite::default(), config(1, 1));
        assert!(matches!(
            crawler.crawl("not a url").await,
            Err(CrawlError::UrlParse(_))
        ));
        assert!(matches!(
            crawler.crawl("ftp://a.com/file").await,
            Err(CrawlError::Other(_))
        ));
    }
}
