//! Mock source for testing purposes.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use crate::models::{ArticleRecord, ArticleRecordBuilder, Pmid, SearchQuery};
use crate::sources::LiteratureSource;

/// An in-memory source that serves predefined articles and counts calls.
///
/// `search` returns the stored articles in order, bounded by
/// `num_results`; lookups match on PMID.
#[derive(Debug, Default)]
pub struct MockSource {
    articles: Vec<ArticleRecord>,
    search_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
    queries: Mutex<Vec<SearchQuery>>,
}

impl MockSource {
    /// Create a new mock source with no articles.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the articles to serve.
    pub fn with_articles(mut self, articles: Vec<ArticleRecord>) -> Self {
        self.articles = articles;
        self
    }

    /// Number of `search` calls made so far
    pub fn search_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
    }

    /// Number of single-article lookups made so far
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    /// Total upstream calls of any kind
    pub fn total_calls(&self) -> usize {
        self.search_calls() + self.fetch_calls()
    }

    /// Queries received by `search`, oldest first
    pub fn queries(&self) -> Vec<SearchQuery> {
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl LiteratureSource for MockSource {
    fn id(&self) -> &str {
        "mock"
    }

    fn name(&self) -> &str {
        "Mock Source"
    }

    async fn search(&self, query: &SearchQuery) -> Vec<ArticleRecord> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.queries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(query.clone());

        self.articles
            .iter()
            .take(query.num_results)
            .cloned()
            .collect()
    }

    async fn get_article_metadata(&self, pmid: &Pmid) -> Option<ArticleRecord> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.articles
            .iter()
            .find(|article| &article.pmid == pmid)
            .cloned()
    }
}

/// Helper function to create a mock article for testing.
pub fn make_article(pmid: u64, title: &str) -> ArticleRecord {
    ArticleRecordBuilder::new(Pmid::from(pmid))
        .title(Some(title.to_string()))
        .authors(vec!["Doe, Jane".to_string()])
        .journal(Some("Journal of Testing".to_string()))
        .publication_date(Some("2024-Jan".to_string()))
        .build()
}
