//! MCP (Model Context Protocol) surface: the `pubmed_articles` tool.

mod dispatcher;
mod request;
pub mod server;
mod tools;

pub use dispatcher::Dispatcher;
pub use request::{ArticlesRequest, DispatchError, METHODS};
pub use server::McpServer;
pub use tools::{PubMedArticlesHandler, Tool, ToolHandler, ToolRegistry, PUBMED_ARTICLES_TOOL};
