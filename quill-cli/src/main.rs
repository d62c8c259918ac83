//! Quill CLI
//!
//! Runs the article server and inspects the merged listing from a terminal.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use colored::*;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use quill_api::{ApiConfig, ApiServer, AppState};
use quill_core::visibility::VisibilityPolicy;
use quill_remote::FailurePolicy;

/// Quill - article listing with publication gating
#[derive(Parser)]
#[command(name = "quill")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true, env = "QUILL_LOG_JSON")]
    json_logs: bool,

    #[command(flatten)]
    overrides: Overrides,

    #[command(subcommand)]
    command: Commands,
}

/// Flags that override values read from the environment.
#[derive(Args, Debug, Default)]
struct Overrides {
    /// Events service base URL
    #[arg(long, global = true)]
    events_url: Option<String>,

    /// Emit ETag / Last-Modified and honor preconditions
    #[arg(long, global = true)]
    production: bool,

    /// Visibility policy: gated or ungated
    #[arg(long, global = true)]
    visibility: Option<VisibilityPolicy>,

    /// Remote failure policy: isolated or strict
    #[arg(long, global = true)]
    remote_failure: Option<FailurePolicy>,
}

impl Overrides {
    fn apply(self, mut config: ApiConfig) -> ApiConfig {
        if self.events_url.is_some() {
            config.events_url = self.events_url;
        }
        if self.production {
            config.production = true;
        }
        if let Some(visibility) = self.visibility {
            config.visibility = visibility;
        }
        if let Some(policy) = self.remote_failure {
            config.remote_failure = policy;
        }
        config
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP server
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "5001", env = "PORT")]
        port: u16,
        /// Bind address
        #[arg(short, long, default_value = "0.0.0.0")]
        bind: String,
    },

    /// Print the article listing as the server would serve it now
    List {
        /// Catalog articles only, skip the events service
        #[arg(long)]
        local: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        "quill=debug,info"
    } else {
        "quill=info,warn"
    };

    let (json, plain) = if cli.json_logs {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(json)
        .with(plain)
        .init();

    let config = ApiConfig::from_env().context("Invalid configuration")?;
    let config = cli.overrides.apply(config);
    debug!(?config, "Loaded configuration");

    match cli.command {
        Commands::Serve { port, bind } => cmd_serve(config, port, &bind).await,
        Commands::List { local } => cmd_list(config, local).await,
    }
}

/// Run the HTTP server
async fn cmd_serve(config: ApiConfig, port: u16, bind: &str) -> Result<()> {
    println!("{}", "Starting Quill server...".cyan().bold());

    let server = ApiServer::new(config).context("Failed to load the article catalog")?;

    println!("   {} http://{}:{}/articles", "Listening on:".green(), bind, port);
    println!("   {} http://{}:{}/health", "Health check:".dimmed(), bind, port);
    println!("\n   Press Ctrl+C to stop.\n");

    let addr: SocketAddr = format!("{}:{}", bind, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", bind, port))?;
    server.run(addr).await.context("Server failed")?;

    Ok(())
}

/// Print the listing
async fn cmd_list(config: ApiConfig, local: bool) -> Result<()> {
    let state = AppState::new(config).context("Failed to load the article catalog")?;
    let now = Utc::now();

    let articles = if local {
        state.aggregator.list_local_articles(now)
    } else {
        state
            .aggregator
            .list_articles(now)
            .await
            .context("Failed to fetch remote articles")?
    };

    println!(
        "{} {} article(s), {} visibility",
        "Listing".cyan().bold(),
        articles.len(),
        state.config.visibility
    );

    for article in &articles {
        let date = article.published_at.format("%Y-%m-%d").to_string();
        let target = article.route.as_deref().unwrap_or(&article.slug);
        match article.source.label() {
            Some(label) => println!(
                "   {} {} {} {}",
                date.dimmed(),
                article.title.bold(),
                target,
                format!("[{}]", label).yellow()
            ),
            None => println!("   {} {} {}", date.dimmed(), article.title.bold(), target),
        }
    }

    Ok(())
}
