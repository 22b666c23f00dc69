//! Tool registry for MCP tools.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use super::dispatcher::Dispatcher;
use super::request::METHODS;
use crate::models::DEFAULT_NUM_RESULTS;

/// Name under which the PubMed tool is exposed
pub const PUBMED_ARTICLES_TOOL: &str = "pubmed_articles";

/// An MCP tool that can be called by the client
#[derive(Clone)]
pub struct Tool {
    /// Tool name (e.g., "pubmed_articles")
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// JSON Schema for input parameters
    pub input_schema: serde_json::Value,

    /// Handler function to execute the tool
    pub handler: Arc<dyn ToolHandler>,
}

impl std::fmt::Debug for Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("input_schema", &self.input_schema)
            .finish()
    }
}

/// Handler for executing a tool
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync + std::fmt::Debug {
    /// Execute the tool with the given arguments
    async fn execute(&self, args: Value) -> Result<Value, String>;
}

/// Handler behind the `pubmed_articles` tool.
///
/// Failures are already folded into the returned value by the dispatcher,
/// so this never yields `Err`.
#[derive(Debug, Clone)]
pub struct PubMedArticlesHandler {
    pub dispatcher: Dispatcher,
}

#[async_trait::async_trait]
impl ToolHandler for PubMedArticlesHandler {
    async fn execute(&self, args: Value) -> Result<Value, String> {
        Ok(self.dispatcher.dispatch(args).await)
    }
}

/// Registry for all MCP tools
#[derive(Debug, Clone)]
pub struct ToolRegistry {
    tools: HashMap<String, Tool>,
}

impl ToolRegistry {
    /// Create a registry exposing the `pubmed_articles` tool
    pub fn new(dispatcher: Dispatcher) -> Self {
        let mut registry = Self {
            tools: HashMap::new(),
        };

        registry.register(Tool {
            name: PUBMED_ARTICLES_TOOL.to_string(),
            description: format!(
                "Search PubMed and retrieve article metadata or PubMed Central PDF links via {}",
                dispatcher.source().name()
            ),
            input_schema: pubmed_articles_schema(),
            handler: Arc::new(PubMedArticlesHandler { dispatcher }),
        });

        registry
    }

    /// Register a tool
    pub fn register(&mut self, tool: Tool) {
        self.tools.insert(tool.name.clone(), tool);
    }

    /// Get all tools
    pub fn all(&self) -> Vec<&Tool> {
        self.tools.values().collect()
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Tool> {
        self.tools.get(name)
    }

    /// Execute a tool by name
    pub async fn execute(&self, name: &str, args: Value) -> Result<Value, String> {
        let tool = self
            .get(name)
            .ok_or_else(|| format!("Tool '{}' not found", name))?;

        tool.handler.execute(args).await
    }
}

fn pubmed_articles_schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "method": {
                "type": "string",
                "description": "Operation to perform",
                "enum": METHODS
            },
            "keywords": {
                "type": "string",
                "description": "Search terms (search_keywords)"
            },
            "num_results": {
                "type": ["integer", "string"],
                "description": "Maximum number of articles to return (search methods)",
                "default": DEFAULT_NUM_RESULTS
            },
            "term": {
                "type": "string",
                "description": "General search term (search_advanced)"
            },
            "title": {
                "type": "string",
                "description": "Words in the article title (search_advanced)"
            },
            "author": {
                "type": "string",
                "description": "Author name, e.g. 'Smith J' (search_advanced)"
            },
            "journal": {
                "type": "string",
                "description": "Journal name (search_advanced)"
            },
            "start_date": {
                "type": "string",
                "description": "Earliest publication date, YYYY/MM/DD (search_advanced)"
            },
            "end_date": {
                "type": "string",
                "description": "Latest publication date, YYYY/MM/DD (search_advanced)"
            },
            "pmid": {
                "type": ["string", "integer"],
                "description": "PubMed ID (get_article_metadata, get_article_pdf)"
            }
        },
        "required": ["method"]
    })
}
