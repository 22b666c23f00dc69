//! Literature sources behind the `pubmed_articles` tool.
//!
//! A [`LiteratureSource`] performs the upstream calls for each operation and
//! always completes: network, HTTP and payload failures are absorbed here and
//! surface to callers only as empty lists or absent records. Internally every
//! upstream call produces a [`FetchOutcome`], which keeps "nothing found" and
//! "upstream failed" apart for logging even though callers see them the same.

mod medline;
pub mod mock;
mod pubmed;

pub use medline::{parse_article, parse_search_ids};
pub use mock::MockSource;
pub use pubmed::PubMedSource;

use async_trait::async_trait;

use crate::models::{ArticleRecord, PdfResolution, Pmid, SearchQuery};

/// The gateway contract used by the request dispatcher.
///
/// Implementations fetch articles one identifier at a time, in the order the
/// search returned them.
#[async_trait]
pub trait LiteratureSource: Send + Sync + std::fmt::Debug {
    /// Unique identifier for this source
    fn id(&self) -> &str;

    /// Human-readable name of this source
    fn name(&self) -> &str;

    /// Search and fetch up to `query.num_results` articles
    async fn search(&self, query: &SearchQuery) -> Vec<ArticleRecord>;

    /// Fetch one article, or None when it cannot be retrieved or parsed
    async fn get_article_metadata(&self, pmid: &Pmid) -> Option<ArticleRecord>;

    /// Resolve a PubMed Central PDF link for an article.
    ///
    /// The link is derived from the PMC ID and never checked.
    async fn get_article_pdf(&self, pmid: &Pmid) -> PdfResolution {
        match self.get_article_metadata(pmid).await {
            Some(article) if article.has_pmcid() => PdfResolution::from_pmcid(&article.pmcid),
            _ => PdfResolution::unavailable(),
        }
    }
}

/// Result of a single upstream call
#[derive(Debug)]
pub enum FetchOutcome<T> {
    /// The call succeeded and produced a value
    Found(T),
    /// The call succeeded but there was nothing to return
    Empty,
    /// The call failed
    Failed(SourceError),
}

impl<T> FetchOutcome<T> {
    /// Collapse into an Option, logging what was lost
    pub fn into_option(self, operation: &str, subject: &str) -> Option<T> {
        match self {
            FetchOutcome::Found(value) => Some(value),
            FetchOutcome::Empty => {
                tracing::debug!(operation, subject, "PubMed returned no results");
                None
            }
            FetchOutcome::Failed(error) => {
                tracing::warn!(operation, subject, %error, "PubMed request degraded to empty result");
                None
            }
        }
    }

    /// Whether the call produced a value
    pub fn is_found(&self) -> bool {
        matches!(self, FetchOutcome::Found(_))
    }
}

impl<T> From<Result<Option<T>, SourceError>> for FetchOutcome<T> {
    fn from(result: Result<Option<T>, SourceError>) -> Self {
        match result {
            Ok(Some(value)) => FetchOutcome::Found(value),
            Ok(None) => FetchOutcome::Empty,
            Err(error) => FetchOutcome::Failed(error),
        }
    }
}

/// Errors that can occur when talking to an upstream source
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// Network or HTTP transport error
    #[error("Network error: {0}")]
    Network(String),

    /// The request exceeded its timeout
    #[error("Request timed out: {0}")]
    Timeout(String),

    /// Parsing error (XML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// API error from the source (non-success status or error payload)
    #[error("API error: {0}")]
    Api(String),

    /// Invalid source configuration
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<quick_xml::Error> for SourceError {
    fn from(err: quick_xml::Error) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<quick_xml::DeError> for SourceError {
    fn from(err: quick_xml::DeError) -> Self {
        SourceError::Parse(format!("XML: {}", err))
    }
}

impl From<url::ParseError> for SourceError {
    fn from(err: url::ParseError) -> Self {
        SourceError::Config(format!("URL: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_outcome_from_result() {
        let found = FetchOutcome::from(Ok::<_, SourceError>(Some(3u32)));
        assert!(found.is_found());
        assert_eq!(found.into_option("test", "x"), Some(3));

        let empty = FetchOutcome::from(Ok::<Option<u32>, SourceError>(None));
        assert!(!empty.is_found());
        assert_eq!(empty.into_option("test", "x"), None);

        let failed: FetchOutcome<u32> =
            FetchOutcome::from(Err(SourceError::Network("reset".into())));
        assert!(matches!(failed, FetchOutcome::Failed(SourceError::Network(_))));
        assert_eq!(failed.into_option("test", "x"), None);
    }

    #[tokio::test]
    async fn test_default_pdf_resolution_uses_pmcid() {
        use crate::models::ArticleRecordBuilder;

        let with_pmc = ArticleRecordBuilder::new(Pmid::from(1))
            .pmcid("PMC1234567")
            .build();
        let without_pmc = ArticleRecordBuilder::new(Pmid::from(2)).build();
        let source = MockSource::new().with_articles(vec![with_pmc, without_pmc]);

        let resolved = source.get_article_pdf(&Pmid::from(1)).await;
        assert_eq!(
            resolved.pdf_url.as_deref(),
            Some("https://www.ncbi.nlm.nih.gov/pmc/articles/PMC1234567/pdf/")
        );

        let missing = source.get_article_pdf(&Pmid::from(2)).await;
        assert_eq!(missing, PdfResolution::unavailable());

        let unknown = source.get_article_pdf(&Pmid::from(3)).await;
        assert_eq!(unknown, PdfResolution::unavailable());
    }
}
