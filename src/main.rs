//! Instrumented Cache CLI
//!
//! Stores values through the instrumented cache and prints recorded call logs.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use instrumented_cache::{
    replay, Cache, CallLog, Config, KvStore, MemoryStore, RedisStore, StoredValue,
    STORE_OPERATION,
};

#[derive(Parser, Debug)]
#[command(name = "instrumented_cache", version, about)]
struct Cli {
    /// Redis URL, overrides REDIS_HOST / REDIS_PORT / REDIS_DB
    #[arg(long, global = true)]
    redis_url: Option<String>,

    /// Run against an in-process store instead of Redis
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Flush the store, store each value and print the resulting call log
    Store {
        /// Values to store; integers and floats are stored as numbers
        #[arg(required = true)]
        values: Vec<String>,
    },
    /// Print the call log of an instrumented operation
    Replay {
        /// Operation name
        #[arg(default_value = STORE_OPERATION)]
        name: String,

        /// Print the log as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr, stdout carries the reports.
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "instrumented_cache=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    if cli.memory {
        info!("Using in-memory store");
        return run(MemoryStore::new(), cli.command).await;
    }

    let url = match cli.redis_url {
        Some(url) => url,
        None => Config::from_env().redis_url(),
    };
    let store = RedisStore::connect(&url)
        .await
        .with_context(|| format!("connecting to {url}"))?;

    run(store, cli.command).await
}

async fn run<S: KvStore>(store: S, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Store { values } => {
            let cache = Cache::new(store).await?;

            for raw in values {
                let value = parse_value(&raw);
                let key = cache.store(value.clone()).await?;
                let stored = match value {
                    StoredValue::Int(_) => cache.get_int(&key).await?.to_string(),
                    _ => cache.get_str(&key).await?,
                };
                println!("{key} = {stored}");
            }

            print!("{}", CallLog::load(cache.backend(), STORE_OPERATION).await?);
        }
        Command::Replay { name, json } => {
            if json {
                let log = CallLog::load(&store, &name).await?;
                println!("{}", serde_json::to_string_pretty(&log)?);
            } else {
                replay(&store, &name).await?;
            }
        }
    }

    Ok(())
}

/// Integer first, then float, otherwise text.
fn parse_value(raw: &str) -> StoredValue {
    if let Ok(n) = raw.parse::<i64>() {
        StoredValue::Int(n)
    } else if let Ok(x) = raw.parse::<f64>() {
        StoredValue::Float(x)
    } else {
        StoredValue::Text(raw.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value("42"), StoredValue::Int(42));
        assert_eq!(parse_value("2.5"), StoredValue::Float(2.5));
        assert_eq!(parse_value("foo"), StoredValue::Text("foo".to_string()));
    }

    #[test]
    fn test_replay_default_name() {
        let cli = Cli::try_parse_from(["instrumented_cache", "replay"]).unwrap();
        match cli.command {
            Command::Replay { name, json } => {
                assert_eq!(name, STORE_OPERATION);
                assert!(!json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
