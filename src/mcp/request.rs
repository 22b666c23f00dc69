//! Typed requests for the `pubmed_articles` tool.
//!
//! The tool receives a flat argument object with a `method` discriminator.
//! [`ArticlesRequest::from_args`] validates it once, up front, so handlers
//! never look at raw JSON.

use serde::Deserialize;
use serde_json::Value;

use crate::models::{Pmid, SearchQuery};

/// Method names accepted in the `method` argument
pub const METHODS: [&str; 4] = [
    "search_keywords",
    "search_advanced",
    "get_article_metadata",
    "get_article_pdf",
];

/// A validated tool invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArticlesRequest {
    /// Free-text search
    SearchKeywords { keywords: String, num_results: usize },
    /// Field-filtered search
    SearchAdvanced(SearchQuery),
    /// Metadata for one article
    GetArticleMetadata { pmid: Pmid },
    /// PDF link for one article
    GetArticlePdf { pmid: Pmid },
}

/// Errors that reject an invocation before any upstream call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    /// A required argument is missing or malformed
    #[error("Validation error: {0}")]
    Validation(String),

    /// The `method` argument names no known operation
    #[error("Unsupported method: '{0}'. Expected one of: {methods}", methods = METHODS.join(", "))]
    UnsupportedOperation(String),

    /// The result could not be encoded or the handler did not complete
    #[error("Internal error: {0}")]
    Internal(String),
}

/// The raw argument object as sent by the client
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawArguments {
    method: Option<String>,
    keywords: Option<String>,
    num_results: Option<Value>,
    pmid: Option<Value>,
    term: Option<String>,
    title: Option<String>,
    author: Option<String>,
    journal: Option<String>,
    start_date: Option<String>,
    end_date: Option<String>,
}

impl ArticlesRequest {
    /// Validate a raw argument object
    pub fn from_args(args: &Value, default_num_results: usize) -> Result<Self, DispatchError> {
        if !args.is_object() {
            return Err(DispatchError::Validation(
                "arguments must be a JSON object".to_string(),
            ));
        }

        let raw: RawArguments = serde_json::from_value(args.clone())
            .map_err(|e| DispatchError::Validation(format!("invalid arguments: {}", e)))?;

        let method = raw
            .method
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
            .ok_or_else(|| {
                DispatchError::Validation("missing required parameter 'method'".to_string())
            })?;

        match method {
            "search_keywords" => {
                let keywords = raw
                    .keywords
                    .filter(|k| !k.trim().is_empty())
                    .ok_or_else(|| required("keywords", method))?;
                Ok(Self::SearchKeywords {
                    keywords,
                    num_results: num_results(raw.num_results.as_ref(), default_num_results)?,
                })
            }
            "search_advanced" => {
                let mut query = SearchQuery::default()
                    .num_results(num_results(raw.num_results.as_ref(), default_num_results)?);
                if let Some(term) = raw.term {
                    query = query.term(term);
                }
                if let Some(title) = raw.title {
                    query = query.title(title);
                }
                if let Some(author) = raw.author {
                    query = query.author(author);
                }
                if let Some(journal) = raw.journal {
                    query = query.journal(journal);
                }
                if let Some(start) = raw.start_date {
                    query = query.start_date(start);
                }
                if let Some(end) = raw.end_date {
                    query = query.end_date(end);
                }

                if !query.has_filters() {
                    return Err(DispatchError::Validation(
                        "at least one search parameter required".to_string(),
                    ));
                }
                Ok(Self::SearchAdvanced(query))
            }
            "get_article_metadata" => Ok(Self::GetArticleMetadata {
                pmid: pmid(raw.pmid.as_ref(), method)?,
            }),
            "get_article_pdf" => Ok(Self::GetArticlePdf {
                pmid: pmid(raw.pmid.as_ref(), method)?,
            }),
            other => Err(DispatchError::UnsupportedOperation(other.to_string())),
        }
    }

    /// The method name this request was built from
    pub fn method(&self) -> &'static str {
        match self {
            Self::SearchKeywords { .. } => "search_keywords",
            Self::SearchAdvanced(_) => "search_advanced",
            Self::GetArticleMetadata { .. } => "get_article_metadata",
            Self::GetArticlePdf { .. } => "get_article_pdf",
        }
    }
}

fn required(field: &str, method: &str) -> DispatchError {
    DispatchError::Validation(format!("'{}' is required for {}", field, method))
}

fn pmid(value: Option<&Value>, method: &str) -> Result<Pmid, DispatchError> {
    let value = value.ok_or_else(|| required("pmid", method))?;
    Pmid::from_json(value).map_err(|e| DispatchError::Validation(e.to_string()))
}

fn num_results(value: Option<&Value>, default: usize) -> Result<usize, DispatchError> {
    let invalid = || {
        DispatchError::Validation("num_results must be a non-negative integer".to_string())
    };

    match value {
        None => Ok(default),
        Some(Value::Number(n)) => n
            .as_u64()
            .and_then(|n| usize::try_from(n).ok())
            .ok_or_else(invalid),
        Some(Value::String(s)) => s.trim().parse::<usize>().map_err(|_| invalid()),
        Some(_) => Err(invalid()),
    }
}
