mod cli;

use std::path::PathBuf;

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tessera::config::TesseraConfig;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tessera", version, about = "Relationship and retrieval engine for knowledge nodes")]
struct Cli {
    /// Config file (defaults to ~/.tessera/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate time-dependent scores as of this RFC 3339 instant instead of now
    #[arg(long, global = true)]
    now: Option<DateTime<Utc>>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Select session warmup context from a node dump
    Warmup {
        #[arg(long)]
        nodes: PathBuf,
        /// Number of nodes to select
        #[arg(long)]
        target: Option<usize>,
    },
    /// Group nodes into similarity clusters
    Cluster {
        #[arg(long)]
        nodes: PathBuf,
        /// Similarity needed to join a cluster
        #[arg(long)]
        threshold: Option<f64>,
    },
    /// Rank nodes against a free-text query
    Search {
        #[arg(long)]
        nodes: PathBuf,
        query: String,
        #[arg(long)]
        limit: Option<usize>,
        /// Boost results carrying this tag (repeatable)
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Rank nodes by relationship strength to one node
    Related {
        #[arg(long)]
        nodes: PathBuf,
        id: String,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Rebuild relationship edges, optionally pruning an existing edge dump
    Relations {
        #[arg(long)]
        nodes: PathBuf,
        /// Existing edges to prune instead of rebuilding
        #[arg(long)]
        prune: Option<PathBuf>,
    },
    /// Find a connection path between two nodes
    Path {
        #[arg(long)]
        edges: PathBuf,
        from: String,
        to: String,
        #[arg(long, default_value_t = 4)]
        max_depth: usize,
    },
    /// Expand tags through co-occurrence
    Tags {
        #[arg(long)]
        nodes: PathBuf,
        #[arg(required = true)]
        tags: Vec<String>,
        #[arg(long, default_value_t = 5)]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => TesseraConfig::load_from(path)?,
        None => TesseraConfig::load()?,
    };

    // Log to stderr so stdout stays clean for JSON output.
    let filter = EnvFilter::try_new(&config.logging.log_level)
        .unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let now = cli.now.unwrap_or_else(Utc::now);
    let output = cli::Output { json: cli.json };

    match cli.command {
        Command::Warmup { nodes, target } => {
            cli::warmup::run(&config, &nodes, target, now, output)?;
        }
        Command::Cluster { nodes, threshold } => {
            cli::cluster::run(&config, &nodes, threshold, output)?;
        }
        Command::Search {
            nodes,
            query,
            limit,
            tags,
        } => {
            cli::search::run(&config, &nodes, &query, limit, tags, output)?;
        }
        Command::Related { nodes, id, limit } => {
            cli::search::related(&config, &nodes, &id, limit, now, output)?;
        }
        Command::Relations { nodes, prune } => {
            cli::relations::run(&config, &nodes, prune.as_deref(), now, output)?;
        }
        Command::Path {
            edges,
            from,
            to,
            max_depth,
        } => {
            cli::path::run(&edges, &from, &to, max_depth, output)?;
        }
        Command::Tags { nodes, tags, limit } => {
            cli::tags::run(&nodes, &tags, limit, output)?;
        }
    }

    Ok(())
}
