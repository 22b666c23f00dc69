//! Request dispatcher for the `pubmed_articles` tool.

use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};

use super::request::{ArticlesRequest, DispatchError};
use crate::models::{SearchQuery, DEFAULT_NUM_RESULTS};
use crate::sources::LiteratureSource;

/// Routes validated requests to a [`LiteratureSource`].
///
/// [`Dispatcher::dispatch`] always returns a JSON value. Anything that goes
/// wrong becomes `{"error": "<message>"}`.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    source: Arc<dyn LiteratureSource>,
    default_num_results: usize,
}

impl Dispatcher {
    /// Create a dispatcher over the given source
    pub fn new(source: Arc<dyn LiteratureSource>) -> Self {
        Self {
            source,
            default_num_results: DEFAULT_NUM_RESULTS,
        }
    }

    /// Result count used when a search omits `num_results`
    pub fn with_default_num_results(mut self, num_results: usize) -> Self {
        self.default_num_results = num_results;
        self
    }

    /// The source requests are routed to
    pub fn source(&self) -> &Arc<dyn LiteratureSource> {
        &self.source
    }

    /// Validate and execute one tool invocation
    pub async fn dispatch(&self, args: Value) -> Value {
        let request = match ArticlesRequest::from_args(&args, self.default_num_results) {
            Ok(request) => request,
            Err(e) => return error_envelope(e),
        };
        let method = request.method();

        tracing::info!(method, source = self.source.id(), "Dispatching request");

        // A panicking source still yields an envelope.
        let this = self.clone();
        let outcome = match tokio::spawn(async move { this.execute(request).await }).await {
            Ok(result) => result,
            Err(e) => Err(DispatchError::Internal(format!("{} did not complete: {}", method, e))),
        };

        match outcome {
            Ok(value) => value,
            Err(e) => error_envelope(e),
        }
    }

    /// Execute an already validated request
    pub async fn execute(&self, request: ArticlesRequest) -> Result<Value, DispatchError> {
        match request {
            ArticlesRequest::SearchKeywords {
                keywords,
                num_results,
            } => {
                let query = SearchQuery::keywords(keywords).num_results(num_results);
                to_json(&self.source.search(&query).await)
            }
            ArticlesRequest::SearchAdvanced(query) => to_json(&self.source.search(&query).await),
            ArticlesRequest::GetArticleMetadata { pmid } => {
                to_json(&self.source.get_article_metadata(&pmid).await)
            }
            ArticlesRequest::GetArticlePdf { pmid } => {
                to_json(&self.source.get_article_pdf(&pmid).await)
            }
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> Result<Value, DispatchError> {
    serde_json::to_value(value).map_err(|e| DispatchError::Internal(e.to_string()))
}

fn error_envelope(error: DispatchError) -> Value {
    tracing::warn!(%error, "Request rejected");
    json!({ "error": error.to_string() })
}
