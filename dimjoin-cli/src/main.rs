//! dimjoin: load a dimension table and enrich JSON-lines streams against it.
//!
//! Usage:
//!   dimjoin load --config products.toml --file products.json
//!   dimjoin get --config products.toml p1
//!   dimjoin enrich --config products.toml --input orders.jsonl > enriched.jsonl
//!
//! Logs go to stderr so `enrich` output can be piped.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use dimjoin_cli::{EnrichOptions, enrich_stream, load_items, parse_key_args, row_to_json};
use dimjoin_lookup::{LookupConfig, LookupFunction};
use dimjoin_store::DynamoDbStore;
use serde_json::Value;
use std::path::{Path, PathBuf};
use tokio::io::{AsyncBufRead, BufReader};
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(name = "dimjoin")]
#[command(about = "Cached dimension-table lookups for record streams")]
#[command(version)]
struct Args {
    /// Enable verbose debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write a JSON array of objects into the table
    Load {
        /// Lookup table config (TOML)
        #[arg(short, long)]
        config: PathBuf,

        /// JSON file holding an array of items
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Look up a single key and print the row
    Get {
        #[arg(short, long)]
        config: PathBuf,

        /// Key values, in key field order
        #[arg(required = true)]
        key: Vec<String>,
    },

    /// Enrich JSON-lines records from a file or stdin
    Enrich {
        #[arg(short, long)]
        config: PathBuf,

        /// Input file (defaults to stdin)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Concurrent lookups
        #[arg(short, long, default_value = "16")]
        parallelism: usize,

        /// Drop records without a matching row
        #[arg(long)]
        inner: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    match args.command {
        Command::Load { config, file } => load(&config, &file).await,
        Command::Get { config, key } => get(&config, &key).await,
        Command::Enrich {
            config,
            input,
            parallelism,
            inner,
        } => enrich(&config, input.as_deref(), EnrichOptions { parallelism, inner }).await,
    }
}

fn init_tracing(verbose: bool) {
    if std::env::var_os("RUST_LOG").is_some() {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_writer(std::io::stderr)
            .with_target(false)
            .compact()
            .init();
        return;
    }

    let log_level = if verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

fn open_function(path: &Path) -> Result<LookupFunction> {
    let config = LookupConfig::from_toml_file(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    LookupFunction::new(config).context("Invalid lookup configuration")
}

async fn load(config_path: &Path, file: &Path) -> Result<()> {
    let function = open_function(config_path)?;
    let config = function.config().clone();
    function.close();

    let text = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let records: Vec<Value> = serde_json::from_str(&text).context("Expected a JSON array")?;

    info!("Loading {} record(s) into {}", records.len(), config.table_name);
    let store = DynamoDbStore::connect(&config.dynamodb_config()).await;
    let summary = load_items(&store, &config.table_name, &records).await;

    if summary.failed > 0 {
        anyhow::bail!("{} of {} record(s) failed to load", summary.failed, records.len());
    }
    Ok(())
}

async fn get(config_path: &Path, key: &[String]) -> Result<()> {
    let lookup = open_function(config_path)?.open_dynamodb().await;
    let values = parse_key_args(lookup.schema(), key)?;

    let result = lookup.try_lookup(&values).await;
    let output = match result {
        Ok(Some(row)) => Some(Value::Object(row_to_json(lookup.schema(), &row))),
        Ok(None) => None,
        Err(e) => {
            lookup.close();
            return Err(e).context("Lookup failed");
        }
    };
    lookup.close();

    match output {
        Some(row) => println!("{}", serde_json::to_string_pretty(&row)?),
        None => println!("No match for key {}", key.join(", ")),
    }
    Ok(())
}

async fn enrich(config_path: &Path, input: Option<&Path>, options: EnrichOptions) -> Result<()> {
    let lookup = open_function(config_path)?.open_dynamodb().await;

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("Failed to open {}", path.display()))?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(BufReader::new(tokio::io::stdin())),
    };

    let result = enrich_stream(&lookup, reader, tokio::io::stdout(), options).await;
    info!("Cache stats: {:?}", lookup.cache_stats());
    lookup.close();
    result.map(|_| ())
}
