//! # PubMed Articles MCP
//!
//! A Model Context Protocol (MCP) server exposing a single `pubmed_articles`
//! tool that searches PubMed and retrieves article metadata and PubMed
//! Central PDF links through NCBI E-utilities.
//!
//! ## Architecture
//!
//! - [`models`]: Article records, search queries and PDF resolutions
//! - [`sources`]: The literature gateway (`PubMedSource`) and MEDLINE XML extraction
//! - [`mcp`]: Request validation, dispatch and the pmcp server
//! - [`utils`]: HTTP client
//! - [`config`]: Configuration management

pub mod config;
pub mod mcp;
pub mod models;
pub mod sources;
pub mod utils;

// Re-export commonly used types
pub use mcp::{Dispatcher, McpServer};
pub use models::{ArticleRecord, Pmid};
pub use sources::{LiteratureSource, PubMedSource};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
