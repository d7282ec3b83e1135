//! sitelens MCP Server
//!
//! This binary provides a Model Context Protocol (MCP) server for page analysis.
//! It exposes tools that turn web pages into a structural IR for AI assistants
//! and other MCP clients.

use clap::{Parser, ValueEnum};
use rmcp::{ServiceExt, transport::stdio};
use rmcp::transport::streamable_http_server::{StreamableHttpService, session::local::LocalSessionManager};
use sitelens::{Analyzer, AnalyzerOptions, LensServer, TierName};
use std::time::Duration;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Transport {
    /// Standard input/output transport (default)
    Stdio,
    /// HTTP streamable transport
    Http,
}

#[derive(Parser)]
#[command(name = "sitelens-mcp")]
#[command(version)]
#[command(about = "Page structure analysis MCP server", long_about = None)]
struct Cli {
    /// Transport type to use
    #[arg(long, short = 't', value_enum, default_value = "stdio")]
    transport: Transport,

    /// Port for HTTP transport (default: 3000)
    #[arg(long, short = 'p', default_value = "3000")]
    port: u16,

    /// HTTP streamable endpoint path (default: /mcp)
    #[arg(long, default_value = "/mcp")]
    http_path: String,

    /// JSON file with analyzer options (limits, timeouts, user agent)
    #[arg(long, value_name = "FILE")]
    config: Option<String>,

    /// Budget tier applied when a request names neither tier nor custom budget
    #[arg(long, value_name = "TIER")]
    tier: Option<TierName>,

    /// Page fetch timeout in milliseconds
    #[arg(long, value_name = "MS")]
    fetch_timeout_ms: Option<u64>,
}

fn load_options(cli: &Cli) -> Result<AnalyzerOptions, Box<dyn std::error::Error>> {
    let mut options = match &cli.config {
        Some(path) => AnalyzerOptions::from_json_file(path)?,
        None => AnalyzerOptions::default(),
    };
    if let Some(ms) = cli.fetch_timeout_ms {
        options = options.fetch_timeout(Duration::from_millis(ms));
    }
    Ok(options)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;

    eprintln!("sitelens MCP Server v{}", env!("CARGO_PKG_VERSION"));
    if let Some(ref path) = cli.config {
        eprintln!("Config: {}", path);
    }
    eprintln!("Fetch timeout: {}ms", options.fetch_timeout_ms);
    if let Some(tier) = cli.tier {
        eprintln!("Default tier: {}", tier);
    }

    let analyzer = Analyzer::with_http(options)
        .map_err(|e| format!("Failed to create analyzer: {}", e))?
        .with_default_tier(cli.tier);

    // Route to appropriate transport
    match cli.transport {
        Transport::Stdio => {
            eprintln!("Transport: stdio");
            eprintln!("Ready to accept MCP connections via stdio");
            let service = LensServer::new(analyzer);
            let server = service.serve(stdio()).await?;
            let quit_reason = server.waiting().await?;
            eprintln!("Server quit with reason: {:?}", quit_reason);
        }
        Transport::Http => {
            eprintln!("Transport: HTTP streamable");
            eprintln!("Port: {}", cli.port);
            eprintln!("HTTP path: {}", cli.http_path);

            let bind_addr = format!("127.0.0.1:{}", cli.port);

            let server = LensServer::new(analyzer);
            let service_factory = move || Ok::<_, std::io::Error>(server.clone());

            let http_service = StreamableHttpService::new(
                service_factory,
                LocalSessionManager::default().into(),
                Default::default(),
            );

            let router = axum::Router::new().nest_service(&cli.http_path, http_service);

            eprintln!(
                "Ready to accept MCP connections at http://{}{}",
                bind_addr, cli.http_path
            );

            let listener = tokio::net::TcpListener::bind(bind_addr).await?;
            axum::serve(listener, router).await?;
        }
    }

    Ok(())
}
