use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use docs_lookup::{Config, DocsServer, registry_from_config};

/// Docs Lookup - MCP server that answers queries from library documentation
#[derive(Parser)]
#[command(name = "docs-lookup", version, about)]
struct Cli {
    /// Path to a TOML config file (defaults to ~/.config/docs-lookup/config.toml)
    #[arg(short, long, env = "DOCS_LOOKUP_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Pick up SERPER_API_KEY and friends from a local .env, if any
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();

    let filter = match cli.verbose {
        0 => "info,docs_lookup=info",
        1 => "info,docs_lookup=debug",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the MCP transport; logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    if let Ok(path) = dotenv {
        tracing::debug!(path = %path.display(), "loaded .env");
    }

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load(cli.config.as_deref())?;
    tracing::debug!(?config, "loaded configuration");

    let registry = registry_from_config(&config)?;

    tracing::info!(
        endpoint = %config.search.endpoint,
        num_results = config.search.num_results,
        "starting docs lookup server"
    );

    DocsServer::new(registry).serve_stdio().await
}
