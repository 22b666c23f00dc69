//! Search query and PDF resolution models.

use serde::{Deserialize, Serialize};

/// Number of results returned when the caller does not ask for a count
pub const DEFAULT_NUM_RESULTS: usize = 10;

/// Lower bound substituted when only an end date is given
const OPEN_START_DATE: &str = "1800";

/// Upper bound substituted when only a start date is given
const OPEN_END_DATE: &str = "3000";

/// PubMed search parameters.
///
/// A keyword search sets only `term`; an advanced search may combine any of
/// the field filters. [`SearchQuery::to_term`] renders the upstream query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Free-text clause, passed verbatim
    pub term: Option<String>,

    /// Title filter (`[Title]`)
    pub title: Option<String>,

    /// Author filter (`[Author]`)
    pub author: Option<String>,

    /// Journal filter (`[Journal]`)
    pub journal: Option<String>,

    /// Start of the publication date range (YYYY/MM/DD, not validated)
    pub start_date: Option<String>,

    /// End of the publication date range (YYYY/MM/DD, not validated)
    pub end_date: Option<String>,

    /// Maximum number of articles to return
    pub num_results: usize,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            term: None,
            title: None,
            author: None,
            journal: None,
            start_date: None,
            end_date: None,
            num_results: DEFAULT_NUM_RESULTS,
        }
    }
}

impl SearchQuery {
    /// Create a keyword query
    pub fn keywords(keywords: impl Into<String>) -> Self {
        Self::default().term(keywords)
    }

    /// Set the free-text clause
    pub fn term(mut self, term: impl Into<String>) -> Self {
        self.term = non_empty(term.into());
        self
    }

    /// Set title filter
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = non_empty(title.into());
        self
    }

    /// Set author filter
    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = non_empty(author.into());
        self
    }

    /// Set journal filter
    pub fn journal(mut self, journal: impl Into<String>) -> Self {
        self.journal = non_empty(journal.into());
        self
    }

    /// Set start date
    pub fn start_date(mut self, date: impl Into<String>) -> Self {
        self.start_date = non_empty(date.into());
        self
    }

    /// Set end date
    pub fn end_date(mut self, date: impl Into<String>) -> Self {
        self.end_date = non_empty(date.into());
        self
    }

    /// Set maximum results
    pub fn num_results(mut self, num: usize) -> Self {
        self.num_results = num;
        self
    }

    /// Whether any search clause is present
    pub fn has_filters(&self) -> bool {
        self.term.is_some()
            || self.title.is_some()
            || self.author.is_some()
            || self.journal.is_some()
            || self.start_date.is_some()
            || self.end_date.is_some()
    }

    /// The publication date clause, if either bound is set
    pub fn date_clause(&self) -> Option<String> {
        if self.start_date.is_none() && self.end_date.is_none() {
            return None;
        }
        let start = self.start_date.as_deref().unwrap_or(OPEN_START_DATE);
        let end = self.end_date.as_deref().unwrap_or(OPEN_END_DATE);
        Some(format!("{}:{}[Date - Publication]", start, end))
    }

    /// Render the upstream query string, joining present clauses with AND
    pub fn to_term(&self) -> String {
        let mut clauses = Vec::new();

        if let Some(term) = &self.term {
            clauses.push(term.clone());
        }
        if let Some(title) = &self.title {
            clauses.push(format!("{}[Title]", title));
        }
        if let Some(author) = &self.author {
            clauses.push(format!("{}[Author]", author));
        }
        if let Some(journal) = &self.journal {
            clauses.push(format!("{}[Journal]", journal));
        }
        if let Some(dates) = self.date_clause() {
            clauses.push(dates);
        }

        clauses.join(" AND ")
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Outcome of resolving a PDF link for an article.
///
/// The link is constructed from the PMC identifier and never verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PdfResolution {
    /// Constructed PubMed Central PDF link
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub pdf_url: Option<String>,

    /// Advisory message for the caller
    pub message: String,
}

impl PdfResolution {
    /// Resolution pointing at the PMC PDF for `pmcid`
    pub fn from_pmcid(pmcid: &str) -> Self {
        Self {
            pdf_url: Some(format!(
                "https://www.ncbi.nlm.nih.gov/pmc/articles/{}/pdf/",
                pmcid
            )),
            message: "PDF may be available from PubMed Central; the link is constructed, not verified."
                .to_string(),
        }
    }

    /// Resolution for an article without a PMC deposit
    pub fn unavailable() -> Self {
        Self {
            pdf_url: None,
            message: "No direct PDF link is available for this article. Check the PubMed page for publisher access options."
                .to_string(),
        }
    }
}
