use anyhow::Result;
use clap::{Parser, Subcommand};
use pubmed_articles_mcp::config::{find_config_file, load_config, Config};
use pubmed_articles_mcp::mcp::{Dispatcher, McpServer};
use pubmed_articles_mcp::sources::PubMedSource;
use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// PubMed Articles MCP - Search PubMed and retrieve article metadata and PDF links
#[derive(Parser, Debug)]
#[command(name = "pubmed-articles-mcp")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search PubMed and retrieve article metadata and PDF links", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Request timeout in seconds (overrides the configured value)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the MCP server (stdio unless --http is given)
    Serve {
        /// Serve streamable HTTP instead of stdio
        #[arg(long)]
        http: bool,

        /// Port for HTTP mode
        #[arg(long, short, default_value_t = 3000)]
        port: u16,

        /// Host to bind to for HTTP mode
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Search PubMed by keywords
    #[command(alias = "s")]
    Search {
        /// Search terms
        keywords: String,

        /// Maximum number of articles
        #[arg(long, short = 'n')]
        num_results: Option<usize>,
    },

    /// Search PubMed with field filters
    Advanced {
        /// General search term
        #[arg(long)]
        term: Option<String>,

        /// Words in the title
        #[arg(long)]
        title: Option<String>,

        /// Author name (e.g. "Smith J")
        #[arg(long, short)]
        author: Option<String>,

        /// Journal name
        #[arg(long, short)]
        journal: Option<String>,

        /// Earliest publication date (YYYY/MM/DD)
        #[arg(long)]
        start_date: Option<String>,

        /// Latest publication date (YYYY/MM/DD)
        #[arg(long)]
        end_date: Option<String>,

        /// Maximum number of articles
        #[arg(long, short = 'n')]
        num_results: Option<usize>,
    },

    /// Fetch metadata for one article
    #[command(alias = "m")]
    Metadata {
        /// PubMed ID
        pmid: String,
    },

    /// Resolve the PubMed Central PDF link for one article
    Pdf {
        /// PubMed ID
        pmid: String,
    },

    /// Print the effective configuration as TOML
    Config,
}

impl Commands {
    /// Tool arguments for operation subcommands
    fn tool_arguments(&self) -> Option<Value> {
        let args = match self {
            Commands::Search {
                keywords,
                num_results,
            } => json!({
                "method": "search_keywords",
                "keywords": keywords,
                "num_results": num_results,
            }),
            Commands::Advanced {
                term,
                title,
                author,
                journal,
                start_date,
                end_date,
                num_results,
            } => json!({
                "method": "search_advanced",
                "term": term,
                "title": title,
                "author": author,
                "journal": journal,
                "start_date": start_date,
                "end_date": end_date,
                "num_results": num_results,
            }),
            Commands::Metadata { pmid } => json!({
                "method": "get_article_metadata",
                "pmid": pmid,
            }),
            Commands::Pdf { pmid } => json!({
                "method": "get_article_pdf",
                "pmid": pmid,
            }),
            Commands::Serve { .. } | Commands::Config => return None,
        };

        // Unset flags are omitted rather than sent as null.
        let mut args = args;
        if let Value::Object(map) = &mut args {
            map.retain(|_, v| !v.is_null());
        }
        Some(args)
    }
}

fn log_filter(cli: &Cli, config: &Config) -> String {
    let level = if cli.quiet {
        "error"
    } else {
        match cli.verbose {
            0 => config.logging.level.as_str(),
            1 => "debug",
            _ => "trace",
        }
    };
    format!("pubmed_articles_mcp={}", level)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().or_else(find_config_file);
    let mut config = load_config(config_path.as_deref())?;
    if let Some(timeout) = cli.timeout {
        config.pubmed.timeout_secs = timeout;
    }

    // Logs go to stderr; stdout carries MCP traffic or command output.
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| log_filter(&cli, &config)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::info!("Using config file: {}", path.display());
    }

    let source = Arc::new(PubMedSource::from_config(&config.pubmed)?);

    match cli.command {
        None => {
            McpServer::new(source, &config)?.run().await?;
        }

        Some(Commands::Serve { http, port, host }) => {
            let server = McpServer::new(source, &config)?;

            if http {
                let addr = format!("{}:{}", host, port);
                let (bound_addr, handle) = server.run_http(&addr).await?;
                tracing::info!("MCP server listening on {}", bound_addr);

                handle
                    .await
                    .map_err(|e| anyhow::anyhow!("Server task failed: {}", e))?;
            } else {
                server.run().await?;
            }
        }

        Some(Commands::Config) => {
            print!("{}", config.to_toml()?);
        }

        Some(command) => {
            let Some(args) = command.tool_arguments() else {
                return Ok(());
            };

            let dispatcher = Dispatcher::new(source)
                .with_default_num_results(config.pubmed.default_num_results);
            let result = dispatcher.dispatch(args).await;

            println!("{}", serde_json::to_string_pretty(&result)?);
            if result.get("error").is_some() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
