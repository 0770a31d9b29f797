use anyhow::Context;
use catalog_search::{
    config::Config,
    models::ContentType,
    search::{SearchQuery, SearchService, SearchSort, SuggestQuery},
    state::InMemoryStore,
};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "catalog-search")]
#[command(version, about = "Catalog search and indexing tool", long_about = None)]
struct Cli {
    /// Configuration file (defaults to CONFIG_PATH)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// JSON array of content records to load as the primary store
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    /// Print Prometheus metrics for this run to stderr when done
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check search backend connectivity
    Health,

    /// Drop and rebuild the index from the catalog
    Reindex,

    /// Ranked search
    Search {
        #[arg(value_name = "QUERY")]
        q: String,

        #[arg(short = 't', long = "type")]
        content_type: Option<ContentType>,

        #[arg(short, long)]
        genre: Option<String>,

        #[arg(short, long)]
        year: Option<i32>,

        #[arg(long)]
        country: Option<String>,

        #[arg(short, long, default_value = "1")]
        page: usize,

        #[arg(short, long, default_value = "20")]
        limit: usize,

        #[arg(short, long, default_value = "relevance")]
        sort: SearchSort,
    },

    /// Autocomplete suggestions
    Suggest {
        #[arg(value_name = "QUERY")]
        q: String,

        #[arg(short, long, default_value = "8")]
        limit: usize,
    },
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!("catalog_search={}", config.observability.log_level).into()
    });

    // Logs go to stderr so stdout stays machine-readable
    if config.observability.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    init_tracing(&config);

    tracing::info!("Starting catalog-search v{}", env!("CARGO_PKG_VERSION"));

    if config.observability.prometheus_enabled || cli.metrics {
        if let Err(e) = catalog_search::metrics::init_metrics() {
            tracing::warn!("Failed to initialize metrics: {}", e);
        }
    }

    let store = match cli.catalog {
        Some(ref path) => InMemoryStore::load_json(path)
            .with_context(|| format!("Failed to load catalog from {}", path.display()))?,
        None => InMemoryStore::new(),
    };
    tracing::info!(records = store.len(), "Primary store ready");

    let service = SearchService::new(config.search.clone(), Arc::new(store))
        .context("Failed to create search service")?;
    let manager = service.index_manager();

    match cli.command {
        Commands::Health => {
            manager.connect().await;
            print_json(&service.health())?;
        }

        Commands::Reindex => {
            manager.connect().await;
            let report = service.reindex_all().await.context("Reindex failed")?;
            print_json(&report)?;
        }

        Commands::Search {
            q,
            content_type,
            genre,
            year,
            country,
            page,
            limit,
            sort,
        } => {
            manager.connect().await;

            let query = SearchQuery {
                q,
                content_type,
                genre,
                year,
                country,
                page,
                limit,
                sort,
            };
            print_json(&service.search(&query).await)?;
        }

        Commands::Suggest { q, limit } => {
            manager.connect().await;
            print_json(&service.suggest(&SuggestQuery::new(q).with_limit(limit)).await)?;
        }
    }

    if cli.metrics {
        eprint!("{}", catalog_search::metrics::gather_metrics());
    }

    Ok(())
}
