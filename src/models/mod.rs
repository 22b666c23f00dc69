//! Core data models for PubMed articles and search operations.

mod article;
mod search;

pub use article::{
    ArticleRecord, ArticleRecordBuilder, Pmid, PmidError, NO_TITLE, UNKNOWN_DATE, UNKNOWN_JOURNAL,
};
pub use search::{PdfResolution, SearchQuery, DEFAULT_NUM_RESULTS};
