use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobagg_core::AggregationResult;
use jobagg_engine::{AggregateRequest, Aggregator, AggregatorConfig, RankWeights};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Debug, Parser)]
#[command(name = "jobagg")]
#[command(about = "Multi-source job listing aggregator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Run one aggregation and print the results.
    Search {
        /// Free-text request, e.g. "senior rust developer in berlin".
        query: String,
        #[arg(long, default_value_t = 25)]
        limit: usize,
        #[arg(long)]
        location: Option<String>,
        /// Seed for synthetic listings, for repeatable output.
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        json: bool,
        /// Answer HTTP sources from recorded fixtures instead of the network.
        #[arg(long, value_name = "DIR", num_args = 0..=1, default_missing_value = "fixtures")]
        offline: Option<PathBuf>,
        /// Re-rank by weighted sub-scores: "match,salary,company".
        #[arg(long)]
        rank_weights: Option<RankWeights>,
    },
    /// List registered sources in call order.
    Sources {
        #[arg(long)]
        json: bool,
    },
    /// Serve the JSON API.
    Serve,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Search {
            query,
            limit,
            location,
            seed,
            json,
            offline,
            rank_weights,
        } => {
            let mut config = AggregatorConfig::from_env();
            if seed.is_some() {
                config.backfill_seed = seed;
            }
            if offline.is_some() {
                config.fixtures_dir = offline;
            }
            let aggregator = Aggregator::from_config(config).context("failed to set up sources")?;

            let mut request = AggregateRequest::from_phrase(&query, location.as_deref(), limit);
            if let Some(weights) = rank_weights {
                request = request.with_weights(weights);
            }

            let cancel = CancellationToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    info!("interrupted; finishing with collected results");
                    on_interrupt.cancel();
                }
            });

            let result = aggregator.aggregate(&request, &cancel).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_summary(&result);
            }
        }
        Commands::Sources { json } => {
            let aggregator = Aggregator::from_config(AggregatorConfig::from_env())?;
            let sources = aggregator.sources();
            if json {
                println!("{}", serde_json::to_string_pretty(&sources)?);
            } else {
                for s in sources {
                    println!(
                        "{:<16} priority={:<4} kind={:?} yield={} timeout={}ms",
                        s.source_id, s.priority, s.kind, s.expected_yield, s.timeout_ms
                    );
                }
            }
        }
        Commands::Serve => {
            jobagg_web::serve_from_env().await?;
        }
    }

    Ok(())
}

fn print_summary(result: &AggregationResult) {
    println!(
        "search \"{}\" in \"{}\": {} jobs ({} real, {} synthetic) from {} sources in {}ms{}",
        result.keywords,
        if result.location.is_empty() { "anywhere" } else { result.location.as_str() },
        result.total_found,
        result.real_count,
        result.synthetic_count,
        result.successful_sources,
        result.processing_time_ms,
        if result.cancelled { " [cancelled]" } else { "" },
    );
    for report in &result.sources {
        println!(
            "  {:<16} {:?} returned={} accepted={} {}ms{}",
            report.source_id,
            report.outcome,
            report.returned,
            report.accepted,
            report.elapsed_ms,
            report.error.as_deref().map(|e| format!(" ({e})")).unwrap_or_default(),
        );
    }
    println!();
    for (i, job) in result.jobs.iter().enumerate() {
        println!(
            "{:>3}. [{:>3}] {} @ {} | {} | {} | {}",
            i + 1,
            job.match_score,
            job.title,
            job.company,
            job.location,
            job.salary,
            job.source
        );
    }
    if !result.review_candidates.is_empty() {
        println!("\npossible duplicates:");
        for c in &result.review_candidates {
            println!("  {} ~ {} ({:.2})", c.job_id_a, c.job_id_b, c.similarity);
        }
    }
}
