//! Article record model representing one PubMed citation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Title used when the citation carries no `ArticleTitle`
pub const NO_TITLE: &str = "No title available";

/// Journal name used when the citation carries no journal title
pub const UNKNOWN_JOURNAL: &str = "Unknown Journal";

/// Publication date used when year, month and day are all absent
pub const UNKNOWN_DATE: &str = "Unknown Date";

const PUBMED_ARTICLE_URL: &str = "https://pubmed.ncbi.nlm.nih.gov";

/// A PubMed identifier in its canonical decimal string form.
///
/// Upstream keys are numeric but callers may send them either as JSON
/// strings or as integers; both normalize to the same value here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Pmid(String);

impl Pmid {
    /// Build a PMID from its string form. Surrounding whitespace is dropped.
    pub fn parse(raw: &str) -> Result<Self, PmidError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(PmidError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Build a PMID from an integer.
    pub fn from_number(id: u64) -> Self {
        Self(id.to_string())
    }

    /// Build a PMID from a JSON value (string or non-negative integer)
    pub fn from_json(value: &serde_json::Value) -> Result<Self, PmidError> {
        match value {
            serde_json::Value::String(s) => Self::parse(s),
            serde_json::Value::Number(n) => n
                .as_u64()
                .map(Self::from_number)
                .ok_or_else(|| PmidError::InvalidNumber(n.to_string())),
            other => Err(PmidError::InvalidType(json_type_name(other))),
        }
    }

    /// The identifier as sent upstream
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// PubMed landing page for this identifier
    pub fn article_url(&self) -> String {
        format!("{}/{}/", PUBMED_ARTICLE_URL, self.0)
    }
}

impl fmt::Display for Pmid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<u64> for Pmid {
    fn from(id: u64) -> Self {
        Self::from_number(id)
    }
}

/// Reasons a value cannot be used as a PMID
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PmidError {
    #[error("pmid must not be empty")]
    Empty,

    #[error("pmid must be a non-negative integer, got {0}")]
    InvalidNumber(String),

    #[error("pmid must be a string or an integer, got {0}")]
    InvalidType(&'static str),
}

fn json_type_name(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// A normalized PubMed article.
///
/// Every field except `pmid` is optional upstream; absent values degrade to
/// the sentinels above or to empty strings and lists. Records are built once
/// per fetch and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleRecord {
    /// PubMed identifier
    pub pmid: Pmid,

    /// Article title
    pub title: String,

    /// Authors formatted as "LastName, ForeName"
    pub authors: Vec<String>,

    /// Journal title
    pub journal: String,

    /// Publication date as "YYYY[-MM[-DD]]"
    pub publication_date: String,

    /// Abstract text, segments joined by a single space
    pub r#abstract: String,

    /// Digital Object Identifier
    pub doi: String,

    /// PubMed Central identifier
    pub pmcid: String,

    /// Author-supplied keywords
    pub keywords: Vec<String>,

    /// MeSH descriptor names
    pub mesh_terms: Vec<String>,

    /// PubMed landing page
    pub url: String,
}

impl ArticleRecord {
    /// Create a record with every optional field at its default
    pub fn new(pmid: Pmid) -> Self {
        let url = pmid.article_url();
        Self {
            pmid,
            title: NO_TITLE.to_string(),
            authors: Vec::new(),
            journal: UNKNOWN_JOURNAL.to_string(),
            publication_date: UNKNOWN_DATE.to_string(),
            r#abstract: String::new(),
            doi: String::new(),
            pmcid: String::new(),
            keywords: Vec::new(),
            mesh_terms: Vec::new(),
            url,
        }
    }

    /// Whether the article has a PubMed Central deposit
    pub fn has_pmcid(&self) -> bool {
        !self.pmcid.is_empty()
    }
}

/// Builder for constructing ArticleRecord objects.
///
/// Setters taking `Option` leave the default in place on `None`, which is
/// how extraction maps absent upstream elements to sentinels.
#[derive(Debug, Clone)]
pub struct ArticleRecordBuilder {
    record: ArticleRecord,
}

impl ArticleRecordBuilder {
    /// Create a new builder for the given identifier
    pub fn new(pmid: Pmid) -> Self {
        Self {
            record: ArticleRecord::new(pmid),
        }
    }

    /// Set title
    pub fn title(mut self, title: Option<String>) -> Self {
        if let Some(title) = title {
            self.record.title = title;
        }
        self
    }

    /// Set authors
    pub fn authors(mut self, authors: Vec<String>) -> Self {
        self.record.authors = authors;
        self
    }

    /// Set journal
    pub fn journal(mut self, journal: Option<String>) -> Self {
        if let Some(journal) = journal {
            self.record.journal = journal;
        }
        self
    }

    /// Set publication date
    pub fn publication_date(mut self, date: Option<String>) -> Self {
        if let Some(date) = date {
            self.record.publication_date = date;
        }
        self
    }

    /// Set abstract
    pub fn abstract_text(mut self, abstract_text: impl Into<String>) -> Self {
        self.record.r#abstract = abstract_text.into();
        self
    }

    /// Set DOI
    pub fn doi(mut self, doi: impl Into<String>) -> Self {
        self.record.doi = doi.into();
        self
    }

    /// Set PMC ID
    pub fn pmcid(mut self, pmcid: impl Into<String>) -> Self {
        self.record.pmcid = pmcid.into();
        self
    }

    /// Set keywords
    pub fn keywords(mut self, keywords: Vec<String>) -> Self {
        self.record.keywords = keywords;
        self
    }

    /// Set MeSH terms
    pub fn mesh_terms(mut self, mesh_terms: Vec<String>) -> Self {
        self.record.mesh_terms = mesh_terms;
        self
    }

    /// Build the record
    pub fn build(self) -> ArticleRecord {
        self.record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_pmid_from_string_and_integer_agree() {
        let from_str = Pmid::from_json(&json!("12345678")).unwrap();
        let from_int = Pmid::from_json(&json!(12345678)).unwrap();
        assert_eq!(from_str, from_int);
        assert_eq!(from_int.as_str(), "12345678");
    }

    #[test]
    fn test_pmid_trims_whitespace() {
        let pmid = Pmid::parse("  31452104 \n").unwrap();
        assert_eq!(pmid.as_str(), "31452104");
    }

    #[test]
    fn test_pmid_rejects_bad_values() {
        assert_eq!(Pmid::parse("   "), Err(PmidError::Empty));
        assert!(matches!(
            Pmid::from_json(&json!(-5)),
            Err(PmidError::InvalidNumber(_))
        ));
        assert!(matches!(
            Pmid::from_json(&json!(1.5)),
            Err(PmidError::InvalidNumber(_))
        ));
        assert_eq!(
            Pmid::from_json(&json!(true)),
            Err(PmidError::InvalidType("boolean"))
        );
    }

    #[test]
    fn test_new_record_uses_sentinels() {
        let record = ArticleRecord::new(Pmid::from(42));
        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.journal, UNKNOWN_JOURNAL);
        assert_eq!(record.publication_date, UNKNOWN_DATE);
        assert_eq!(record.url, "https://pubmed.ncbi.nlm.nih.gov/42/");
        assert!(record.authors.is_empty());
        assert!(!record.has_pmcid());
    }

    #[test]
    fn test_builder_keeps_defaults_for_none() {
        let record = ArticleRecordBuilder::new(Pmid::from(7))
            .title(None)
            .journal(Some("Nature".to_string()))
            .publication_date(None)
            .pmcid("PMC1234567")
            .build();

        assert_eq!(record.title, NO_TITLE);
        assert_eq!(record.journal, "Nature");
        assert_eq!(record.publication_date, UNKNOWN_DATE);
        assert!(record.has_pmcid());
    }

    #[test]
    fn test_record_serializes_abstract_field_name() {
        let record = ArticleRecordBuilder::new(Pmid::from(1))
            .abstract_text("Background.")
            .build();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["abstract"], "Background.");
        assert_eq!(value["pmid"], "1");
    }
}
