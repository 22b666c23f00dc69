//! PubMed research source implementation using E-utilities API.

use async_trait::async_trait;
use url::Url;

use crate::config::PubMedConfig;
use crate::models::{ArticleRecord, Pmid, SearchQuery};
use crate::sources::medline::{parse_article, parse_search_ids};
use crate::sources::{FetchOutcome, LiteratureSource, SourceError};
use crate::utils::HttpClient;

/// Database name sent with every E-utilities call
const PUBMED_DB: &str = "pubmed";

/// PubMed research source
///
/// Uses NCBI E-utilities: one `esearch` call per search, then one `efetch`
/// call per identifier, strictly in sequence.
#[derive(Debug, Clone)]
pub struct PubMedSource {
    client: HttpClient,
    esearch_url: Url,
    efetch_url: Url,
}

impl PubMedSource {
    /// Create a new PubMed source with the default configuration
    pub fn new() -> Result<Self, SourceError> {
        Self::from_config(&PubMedConfig::default())
    }

    /// Create a PubMed source from configuration
    pub fn from_config(config: &PubMedConfig) -> Result<Self, SourceError> {
        let client = HttpClient::with_settings(&config.user_agent, config.timeout())?;
        Self::with_client(client, &config.base_url)
    }

    /// Create with a custom HTTP client and E-utilities base URL
    pub fn with_client(client: HttpClient, base_url: &str) -> Result<Self, SourceError> {
        let base = base_url.trim_end_matches('/');
        Ok(Self {
            client,
            esearch_url: Url::parse(&format!("{}/esearch.fcgi", base))?,
            efetch_url: Url::parse(&format!("{}/efetch.fcgi", base))?,
        })
    }

    /// Build E-utilities search URL
    pub fn build_search_url(&self, query: &SearchQuery) -> Url {
        let mut url = self.esearch_url.clone();
        url.query_pairs_mut()
            .append_pair("db", PUBMED_DB)
            .append_pair("term", &query.to_term())
            .append_pair("retmax", &query.num_results.to_string())
            .append_pair("retmode", "xml");
        url
    }

    /// Build E-utilities fetch URL for a single PubMed ID
    pub fn build_fetch_url(&self, pmid: &Pmid) -> Url {
        let mut url = self.efetch_url.clone();
        url.query_pairs_mut()
            .append_pair("db", PUBMED_DB)
            .append_pair("id", pmid.as_str())
            .append_pair("retmode", "xml");
        url
    }

    async fn get_text(&self, url: &Url) -> Result<String, SourceError> {
        tracing::debug!(%url, "PubMed request");

        let response = self.client.get(url.as_str()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SourceError::Api(format!(
                "PubMed API returned status: {}",
                status
            )));
        }

        Ok(response.text().await?)
    }

    /// Run `esearch` and return the ordered identifier list
    async fn esearch(&self, query: &SearchQuery) -> FetchOutcome<Vec<String>> {
        let url = self.build_search_url(query);
        let ids = match self.get_text(&url).await {
            Ok(xml) => parse_search_ids(&xml),
            Err(e) => Err(e),
        };

        ids.map(|ids| if ids.is_empty() { None } else { Some(ids) })
            .into()
    }

    /// Run `efetch` for one identifier and extract its record
    async fn efetch(&self, pmid: &Pmid) -> FetchOutcome<ArticleRecord> {
        let url = self.build_fetch_url(pmid);
        let article = match self.get_text(&url).await {
            Ok(xml) => parse_article(&xml),
            Err(e) => Err(e),
        };

        article.into()
    }
}

#[async_trait]
impl LiteratureSource for PubMedSource {
    fn id(&self) -> &str {
        "pubmed"
    }

    fn name(&self) -> &str {
        "PubMed"
    }

    async fn search(&self, query: &SearchQuery) -> Vec<ArticleRecord> {
        let term = query.to_term();
        let ids = self
            .esearch(query)
            .await
            .into_option("esearch", &term)
            .unwrap_or_default();

        let mut articles = Vec::with_capacity(ids.len().min(query.num_results));

        // One efetch per id, in search order.
        for id in ids.iter().take(query.num_results) {
            let Ok(pmid) = Pmid::parse(id) else {
                continue;
            };
            if let Some(article) = self.efetch(&pmid).await.into_option("efetch", id) {
                articles.push(article);
            }
        }

        tracing::debug!(
            term = %term,
            found = ids.len(),
            returned = articles.len(),
            "PubMed search complete"
        );

        articles
    }

    async fn get_article_metadata(&self, pmid: &Pmid) -> Option<ArticleRecord> {
        self.efetch(pmid)
            .await
            .into_option("efetch", pmid.as_str())
    }
}
