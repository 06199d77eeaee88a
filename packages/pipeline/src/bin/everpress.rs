// Everpress CLI - run pipeline cycles and maintenance commands.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pipeline_core::domains::keywords::models::Keyword;
use pipeline_core::domains::pipeline::{Orchestrator, PipelineStats};
use pipeline_core::domains::sources::models::{Source, SourceKind};
use pipeline_core::kernel::{
    BaseTrendSource, PipelineKernel, SuggestClient, TrendsClient, WordPressClient, WriterClient,
};
use pipeline_core::Config;

#[derive(Parser)]
#[command(name = "everpress", about = "Automated evergreen content pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run one full pipeline cycle.
    Run,
    /// Run selected phases, or inspect pipeline state.
    Backfill {
        /// Discovery phases only; do not publish.
        #[arg(long)]
        discover_only: bool,
        /// Refresh phase only; do not discover or publish.
        #[arg(long)]
        refresh_only: bool,
        /// Print table counts and exit.
        #[arg(long)]
        stats: bool,
    },
    /// Load seed keywords from a file (one `keyword[,category[,priority]]`
    /// per line; `#` starts a comment).
    Seed { file: String },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,pipeline_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run(Cli::parse()).await {
        tracing::error!("everpress failed: {e:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    // Only the database is needed up front. Provider credentials are
    // loaded per command, so stats and seeding work without them.
    let _ = dotenvy::dotenv();
    let database_url =
        std::env::var("DATABASE_URL").context("DATABASE_URL must be set")?;

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    match cli.command {
        Command::Run => {
            let config = Config::from_env().context("Failed to load configuration")?;
            PipelineStats::load(&pool).await?.log("Before cycle");
            let orchestrator = build_orchestrator(&config, pool.clone()).await?;
            let report = orchestrator.run_cycle().await?;
            PipelineStats::load(&pool).await?.log("After cycle");
            tracing::info!(
                "Cycle done: discovery {}/{} ok, publishing {}/{} ok, refresh {}/{} ok",
                report.discovery.succeeded,
                report.discovery.processed,
                report.publishing.succeeded,
                report.publishing.processed,
                report.refresh.succeeded,
                report.refresh.processed,
            );
        }
        Command::Backfill {
            discover_only,
            refresh_only,
            stats,
        } => {
            if stats {
                PipelineStats::load(&pool).await?.log("Pipeline state");
                return Ok(());
            }

            let config = Config::from_env().context("Failed to load configuration")?;
            let before = PipelineStats::load(&pool).await?;
            before.log("Before backfill");

            let orchestrator = build_orchestrator(&config, pool.clone()).await?;
            if discover_only {
                orchestrator.run_discovery_only().await?;
            } else if refresh_only {
                orchestrator.run_refresh_only().await?;
            } else {
                orchestrator.run_cycle().await?;
            }

            PipelineStats::load(&pool).await?.log("After backfill");
        }
        Command::Seed { file } => {
            let added = seed_keywords(&file, &pool).await?;
            tracing::info!("Seeded {added} new keywords from {file}");
        }
    }

    Ok(())
}

async fn build_orchestrator(config: &Config, pool: PgPool) -> Result<Orchestrator> {
    let suggest = Arc::new(SuggestClient::new(&config.suggest_base_url));
    let writer = Arc::new(WriterClient::new(
        &config.openai_base_url,
        &config.openai_api_key,
    ));
    let publisher = Arc::new(WordPressClient::new(
        &config.wordpress_base_url,
        &config.wordpress_username,
        &config.wordpress_app_password,
    ));
    let trends: Option<Arc<dyn BaseTrendSource>> = config
        .trends_feed_url
        .as_deref()
        .map(|url| Arc::new(TrendsClient::new(url)) as Arc<dyn BaseTrendSource>);

    Source::builder()
        .name("suggest")
        .kind(SourceKind::Suggest)
        .build()
        .register(&pool)
        .await?;
    if trends.is_some() {
        Source::builder()
            .name("trends")
            .kind(SourceKind::Trends)
            .build()
            .register(&pool)
            .await?;
    }

    let kernel = PipelineKernel::new(pool, suggest, writer, publisher, trends);
    Ok(Orchestrator::new(kernel, config.pipeline.clone()))
}

async fn seed_keywords(path: &str, pool: &PgPool) -> Result<usize> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read seed file {path}"))?;

    let mut added = 0usize;
    for line in contents.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut parts = line.split(',').map(str::trim);
        let Some(text) = parts.next().filter(|t| !t.is_empty()) else {
            continue;
        };
        let category = parts.next().filter(|c| !c.is_empty());
        let priority: i32 = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);

        let mut keyword = Keyword::builder().keyword(text).priority(priority).build();
        keyword.category = category.map(str::to_string);

        if keyword.insert_if_new(pool).await? {
            added += 1;
        }
    }

    Ok(added)
}
