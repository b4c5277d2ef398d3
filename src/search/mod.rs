//! Paginated bookmark search over the public search feed.
//!
//! Pages hold [`ENTRIES_PER_PAGE`] entries and are requested strictly in
//! order. `skip` drops entries before anything is collected, `limit` ends the
//! crawl as soon as enough entries are collected, and a short page ends it as
//! the last one. Repeated `(id, link)` pairs are removed once, after the crawl,
//! keeping the first occurrence.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use url::Url;

use crate::app::{HatebError, Result};
use crate::config::SearchConfig;
use crate::domain::FeedEntry;
use crate::fetcher::{Fetcher, HttpFetcher};
use crate::normalizer::Normalizer;

pub const ENTRIES_PER_PAGE: usize = 40;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Which part of a bookmark the query is matched against.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SearchType {
    #[default]
    Text,
    Tag,
    Title,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchType::Text => "text",
            SearchType::Tag => "tag",
            SearchType::Title => "title",
        }
    }
}

impl FromStr for SearchType {
    type Err = HatebError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "text" => Ok(SearchType::Text),
            "tag" => Ok(SearchType::Tag),
            "title" => Ok(SearchType::Title),
            other => Err(HatebError::Validation(format!(
                "Unknown search type '{other}' (expected text, tag or title)"
            ))),
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Recent,
    Popular,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Recent => "recent",
            SortOrder::Popular => "popular",
        }
    }
}

impl FromStr for SortOrder {
    type Err = HatebError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "recent" => Ok(SortOrder::Recent),
            "popular" => Ok(SortOrder::Popular),
            other => Err(HatebError::Validation(format!(
                "Unknown sort order '{other}' (expected recent or popular)"
            ))),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parameters of one search.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub search_type: SearchType,
    pub query: String,
    pub sort: SortOrder,
    /// Minimum bookmark count; `None` or `Some(0)` means no filter.
    pub users: Option<u32>,
    pub date_begin: Option<NaiveDate>,
    pub date_end: Option<NaiveDate>,
    /// Entries to drop from the start of the crawl.
    pub skip: usize,
    /// Maximum entries to collect; `None` or `Some(0)` means no limit.
    pub limit: Option<usize>,
    pub max_pages: usize,
}

impl SearchQuery {
    pub fn new(search_type: SearchType, query: impl Into<String>) -> Self {
        Self {
            search_type,
            query: query.into(),
            sort: SortOrder::default(),
            users: None,
            date_begin: None,
            date_end: None,
            skip: 0,
            limit: None,
            max_pages: 1,
        }
    }

    pub fn with_sort(mut self, sort: SortOrder) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_users(mut self, users: u32) -> Self {
        self.users = Some(users);
        self
    }

    pub fn with_date_range(mut self, begin: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_begin = begin;
        self.date_end = end;
        self
    }

    pub fn with_skip(mut self, skip: usize) -> Self {
        self.skip = skip;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// Query parameters shared by every page, without the page offset.
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", self.query.clone()),
            ("mode", "rss".to_string()),
            ("sort", self.sort.as_str().to_string()),
        ];
        if let Some(users) = self.users.filter(|&u| u > 0) {
            params.push(("users", users.to_string()));
        }
        if let Some(begin) = self.date_begin {
            params.push(("date_begin", begin.format(DATE_FORMAT).to_string()));
        }
        if let Some(end) = self.date_end {
            params.push(("date_end", end.format(DATE_FORMAT).to_string()));
        }
        params
    }

    fn effective_limit(&self) -> Option<usize> {
        self.limit.filter(|&l| l > 0)
    }
}

pub struct FeedSearchClient<F = HttpFetcher> {
    base_url: String,
    fetcher: F,
    normalizer: Normalizer,
}

impl FeedSearchClient<HttpFetcher> {
    pub fn new() -> Result<Self> {
        Self::from_config(&SearchConfig::default())
    }

    pub fn from_config(config: &SearchConfig) -> Result<Self> {
        let fetcher = HttpFetcher::new(config.timeout())?;
        Ok(Self::with_fetcher(config.base_url.clone(), fetcher))
    }
}

impl<F: Fetcher + Send + Sync> FeedSearchClient<F> {
    pub fn with_fetcher(base_url: impl Into<String>, fetcher: F) -> Self {
        Self {
            base_url: base_url.into(),
            fetcher,
            normalizer: Normalizer::new(),
        }
    }

    /// URL of the 1-based `page` of `query`.
    pub fn page_url(&self, query: &SearchQuery, page: usize) -> Result<Url> {
        if page == 0 {
            return Err(HatebError::Validation("Pages are numbered from 1".into()));
        }

        let mut url = Url::parse(&format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            query.search_type
        ))?;
        let offset = (page - 1) * ENTRIES_PER_PAGE;
        url.query_pairs_mut()
            .extend_pairs(query.params())
            .append_pair("of", &offset.to_string());
        Ok(url)
    }

    /// Run `query` and return de-duplicated entries in feed order.
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<FeedEntry>> {
        if query.max_pages == 0 {
            return Err(HatebError::Validation("max_pages must be at least 1".into()));
        }

        let collected = self.collect(query).await?;
        let unique = dedup_entries(collected);
        tracing::debug!(entries = unique.len(), "Search complete");
        Ok(unique)
    }

    async fn collect(&self, query: &SearchQuery) -> Result<Vec<FeedEntry>> {
        let limit = query.effective_limit();
        let mut skip = query.skip;
        let mut collected = Vec::new();

        for page in 1..=query.max_pages {
            let url = self.page_url(query, page)?;
            let body = self.fetcher.fetch(&url).await?;
            let entries = self.normalizer.normalize(&body)?;
            let page_len = entries.len();
            tracing::debug!(page, entries = page_len, "Fetched search page");

            for entry in entries {
                if skip > 0 {
                    skip -= 1;
                    continue;
                }

                collected.push(entry);

                if let Some(limit) = limit {
                    if collected.len() >= limit {
                        collected.truncate(limit);
                        return Ok(collected);
                    }
                }
            }

            if page_len < ENTRIES_PER_PAGE {
                break;
            }
        }

        Ok(collected)
    }
}

/// Drop entries whose `(id, link)` was already seen, keeping order.
pub fn dedup_entries(entries: Vec<FeedEntry>) -> Vec<FeedEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert((entry.id.clone(), entry.link.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::fmt::Write;
    use std::sync::Mutex;

    const BASE: &str = "https://b.hatena.ne.jp/search";

    /// Serves canned pages by `of` offset and records every request.
    struct PagedFetcher {
        pages: Vec<Vec<u8>>,
        requests: Mutex<Vec<Url>>,
    }

    impl PagedFetcher {
        fn new(pages: Vec<Vec<u8>>) -> Self {
            Self {
                pages,
                requests: Mutex::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<String> {
            self.requests
                .lock()
                .unwrap()
                .iter()
                .map(|url| param(url, "of").unwrap())
                .collect()
        }
    }

    #[async_trait]
    impl Fetcher for PagedFetcher {
        async fn fetch(&self, url: &Url) -> Result<Vec<u8>> {
            self.requests.lock().unwrap().push(url.clone());
            let offset: usize = param(url, "of").unwrap().parse().unwrap();
            Ok(self
                .pages
                .get(offset / ENTRIES_PER_PAGE)
                .cloned()
                .unwrap_or_else(|| page(0..0)))
        }
    }

    fn param(url: &Url, key: &str) -> Option<String> {
        url.query_pairs()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.into_owned())
    }

    /// An RSS page with one item per number; item `n` links to `/n`.
    fn page(items: impl IntoIterator<Item = usize>) -> Vec<u8> {
        let mut xml = String::from(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:hatena="http://www.hatena.ne.jp/info/xmlns#"><channel>
<title>search</title><link>https://b.hatena.ne.jp/search</link><description>d</description>"#,
        );
        for n in items {
            write!(
                xml,
                "<item><title>Item {n}</title><link>https://example.com/{n}</link>\
                 <guid>https://example.com/{n}</guid><description>s{n}</description>\
                 <hatena:bookmarkcount>{n}</hatena:bookmarkcount></item>"
            )
            .unwrap();
        }
        xml.push_str("</channel></rss>");
        xml.into_bytes()
    }

    fn links(entries: &[FeedEntry]) -> Vec<String> {
        entries.iter().map(|e| e.link.clone()).collect()
    }

    fn expected_links(range: std::ops::Range<usize>) -> Vec<String> {
        range.map(|n| format!("https://example.com/{n}")).collect()
    }

    #[test]
    fn test_page_url_parameters() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![]));
        let query = SearchQuery::new(SearchType::Text, "Python")
            .with_users(100)
            .with_date_range(
                NaiveDate::from_ymd_opt(2024, 7, 1),
                NaiveDate::from_ymd_opt(2024, 7, 31),
            );

        let url = client.page_url(&query, 2).unwrap();
        assert_eq!(url.path(), "/search/text");
        assert_eq!(param(&url, "q").as_deref(), Some("Python"));
        assert_eq!(param(&url, "mode").as_deref(), Some("rss"));
        assert_eq!(param(&url, "sort").as_deref(), Some("recent"));
        assert_eq!(param(&url, "users").as_deref(), Some("100"));
        assert_eq!(param(&url, "date_begin").as_deref(), Some("2024-07-01"));
        assert_eq!(param(&url, "date_end").as_deref(), Some("2024-07-31"));
        assert_eq!(param(&url, "of").as_deref(), Some("40"));
    }

    #[test]
    fn test_page_zero_is_rejected() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![]));
        let query = SearchQuery::new(SearchType::Text, "q");
        assert!(matches!(
            client.page_url(&query, 0),
            Err(HatebError::Validation(_))
        ));
        assert_eq!(param(&client.page_url(&query, 1).unwrap(), "of").as_deref(), Some("0"));
    }

    #[test]
    fn test_zero_users_is_omitted() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![]));
        let query = SearchQuery::new(SearchType::Tag, "rust").with_users(0);
        let url = client.page_url(&query, 1).unwrap();
        assert_eq!(param(&url, "users"), None);
        assert_eq!(param(&url, "date_begin"), None);
        assert_eq!(url.path(), "/search/tag");
    }

    #[tokio::test]
    async fn test_two_page_scenario() {
        let fetcher = PagedFetcher::new(vec![page(0..40), page(40..80), page(80..120)]);
        let client = FeedSearchClient::with_fetcher(BASE, fetcher);
        let query = SearchQuery::new(SearchType::Text, "Python")
            .with_sort(SortOrder::Recent)
            .with_users(100)
            .with_date_range(
                NaiveDate::from_ymd_opt(2024, 7, 1),
                NaiveDate::from_ymd_opt(2024, 7, 31),
            )
            .with_max_pages(2);

        let entries = client.search(&query).await.unwrap();
        assert!(entries.len() <= 80);
        assert_eq!(links(&entries), expected_links(0..80));
        assert_eq!(client.fetcher.offsets(), vec!["0", "40"]);
    }

    #[tokio::test]
    async fn test_limit_returns_exactly_limit_and_stops_early() {
        let fetcher = PagedFetcher::new(vec![page(0..40), page(40..80)]);
        let client = FeedSearchClient::with_fetcher(BASE, fetcher);
        let query = SearchQuery::new(SearchType::Text, "q")
            .with_limit(5)
            .with_max_pages(5);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(entries.len(), 5);
        assert_eq!(client.fetcher.offsets(), vec!["0"]);
    }

    #[tokio::test]
    async fn test_skip_then_limit_window() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![page(0..40)]));
        let query = SearchQuery::new(SearchType::Text, "q")
            .with_skip(10)
            .with_limit(5);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(links(&entries), expected_links(10..15));
    }

    #[tokio::test]
    async fn test_skip_carries_across_pages() {
        let fetcher = PagedFetcher::new(vec![page(0..40), page(40..80)]);
        let client = FeedSearchClient::with_fetcher(BASE, fetcher);
        let query = SearchQuery::new(SearchType::Text, "q")
            .with_skip(45)
            .with_limit(3)
            .with_max_pages(2);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(links(&entries), expected_links(45..48));
    }

    #[tokio::test]
    async fn test_short_page_stops_crawl() {
        let fetcher = PagedFetcher::new(vec![page(0..40), page(40..50), page(50..90)]);
        let client = FeedSearchClient::with_fetcher(BASE, fetcher);
        let query = SearchQuery::new(SearchType::Text, "q").with_max_pages(5);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(entries.len(), 50);
        assert_eq!(client.fetcher.offsets(), vec!["0", "40"]);
    }

    #[tokio::test]
    async fn test_duplicates_removed_across_pages_first_wins() {
        // Second page repeats 30..40 before new items 40..45.
        let fetcher = PagedFetcher::new(vec![page(0..40), page(30..45)]);
        let client = FeedSearchClient::with_fetcher(BASE, fetcher);
        let query = SearchQuery::new(SearchType::Text, "q").with_max_pages(2);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(links(&entries), expected_links(0..45));

        let keys: HashSet<(&str, &str)> = entries.iter().map(|e| e.dedup_key()).collect();
        assert_eq!(keys.len(), entries.len());
    }

    #[tokio::test]
    async fn test_zero_limit_means_unlimited() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![page(0..12)]));
        let query = SearchQuery::new(SearchType::Text, "q").with_limit(0);

        assert_eq!(client.search(&query).await.unwrap().len(), 12);
    }

    #[tokio::test]
    async fn test_zero_max_pages_is_rejected_without_fetch() {
        let client = FeedSearchClient::with_fetcher(BASE, PagedFetcher::new(vec![page(0..40)]));
        let query = SearchQuery::new(SearchType::Text, "q").with_max_pages(0);

        let err = client.search(&query).await.unwrap_err();
        assert!(matches!(err, HatebError::Validation(_)));
        assert!(client.fetcher.offsets().is_empty());
    }

    #[test]
    fn test_dedup_key_uses_id_and_link() {
        let base = FeedEntry {
            id: "same".into(),
            title: "t".into(),
            link: "https://example.com/a".into(),
            summary: String::new(),
            updated: String::new(),
            hatena_bookmark_count: None,
            hatena_comment_list_url: None,
            hatena_image_url: None,
        };
        let other_link = FeedEntry {
            link: "https://example.com/b".into(),
            ..base.clone()
        };
        let repeat = FeedEntry {
            title: "different title".into(),
            ..base.clone()
        };

        let unique = dedup_entries(vec![base.clone(), other_link.clone(), repeat]);
        assert_eq!(unique, vec![base, other_link]);
    }

    #[test]
    fn test_search_type_and_sort_parse() {
        assert_eq!("title".parse::<SearchType>().unwrap(), SearchType::Title);
        assert_eq!("popular".parse::<SortOrder>().unwrap(), SortOrder::Popular);
        assert!("bogus".parse::<SearchType>().is_err());
        assert!("oldest".parse::<SortOrder>().is_err());
    }

    #[tokio::test]
    async fn test_search_over_http() {
        use wiremock::matchers::{method, path, query_param};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search/title"))
            .and(query_param("q", "rust"))
            .and(query_param("of", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(page(0..3)))
            .expect(1)
            .mount(&server)
            .await;

        let config = SearchConfig {
            base_url: format!("{}/search", server.uri()),
            ..SearchConfig::default()
        };
        let client = FeedSearchClient::from_config(&config).unwrap();
        let query = SearchQuery::new(SearchType::Title, "rust").with_max_pages(3);

        let entries = client.search(&query).await.unwrap();
        assert_eq!(links(&entries), expected_links(0..3));
        assert_eq!(entries[2].bookmark_count(), Some(2));
    }
}
