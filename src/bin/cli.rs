//! sitelens command line
//!
//! Prints the structural IR of a saved page or a live URL as JSON.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sitelens::budget::{TierName, TokenBudgetOverrides};
use sitelens::tools::estimate_tokens::estimate_for_tiers;
use sitelens::{AnalysisRequest, Analyzer, AnalyzerOptions};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sitelens")]
#[command(version)]
#[command(about = "Describe the visual structure of a web page for language models", long_about = None)]
struct Cli {
    /// JSON file with analyzer options (limits, timeouts, user agent)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Analyze a saved HTML file ("-" reads stdin)
    Analyze {
        file: String,

        /// URL the page was served from
        #[arg(long, value_name = "URL")]
        base_url: String,

        /// Skip fetching linked stylesheets
        #[arg(long)]
        offline: bool,

        #[command(flatten)]
        budget: BudgetArgs,
    },
    /// Fetch a URL and analyze it
    Fetch {
        url: String,

        #[command(flatten)]
        budget: BudgetArgs,
    },
    /// Estimate the IR size of a saved HTML file for every tier
    Estimate {
        file: String,

        #[arg(long, value_name = "URL")]
        base_url: String,

        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Args)]
struct BudgetArgs {
    /// Budget tier (free, basic, pro, enterprise)
    #[arg(long, value_name = "TIER")]
    tier: Option<TierName>,

    /// JSON file with custom budget limits, layered over the free tier
    #[arg(long, value_name = "FILE")]
    budget_file: Option<PathBuf>,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

impl BudgetArgs {
    fn custom_budget(&self) -> Result<Option<TokenBudgetOverrides>> {
        let Some(path) = &self.budget_file else {
            return Ok(None);
        };
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read budget file {}", path.display()))?;
        let overrides = serde_json::from_str(&text)
            .with_context(|| format!("Invalid budget file {}", path.display()))?;
        Ok(Some(overrides))
    }
}

fn read_html(file: &str) -> Result<String> {
    if file == "-" {
        let mut html = String::new();
        std::io::stdin()
            .read_to_string(&mut html)
            .context("Failed to read HTML from stdin")?;
        return Ok(html);
    }
    std::fs::read_to_string(file).with_context(|| format!("Failed to read {}", file))
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<()> {
    let json = if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    };
    println!("{}", json);
    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Stderr)
        .init();

    let cli = Cli::parse();
    let options = match &cli.config {
        Some(path) => AnalyzerOptions::from_json_file(path)?,
        None => AnalyzerOptions::default(),
    };

    match cli.command {
        Command::Analyze {
            file,
            base_url,
            offline,
            budget,
        } => {
            let mut request = AnalysisRequest::new(read_html(&file)?, base_url);
            request.tier = budget.tier;
            request.custom_budget = budget.custom_budget()?;

            let report = if offline {
                Analyzer::new(options).analyze_offline(&request)?
            } else {
                Analyzer::with_http(options)?.analyze(&request).await?
            };
            print_json(&report, budget.pretty)?;
        }
        Command::Fetch { url, budget } => {
            let report = Analyzer::with_http(options)?
                .analyze_url(&url, budget.tier, budget.custom_budget()?)
                .await
                .with_context(|| format!("Failed to analyze {}", url))?;
            print_json(&report, budget.pretty)?;
        }
        Command::Estimate {
            file,
            base_url,
            pretty,
        } => {
            let request = AnalysisRequest::new(read_html(&file)?, base_url);
            let report = Analyzer::with_http(options)?.analyze(&request).await?;
            print_json(&estimate_for_tiers(&report.ir)?, pretty)?;
        }
    }

    Ok(())
}
