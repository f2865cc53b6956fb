use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use coolredis::config::Config;
use coolredis::store::{MemoryConnector, RedisConnector};
use coolredis::{
    install, CacheHandler, ConfigState, ConnectionRegistry, Connector, PluginStatus, StaticHost,
};

/// coolredis - Poke at a Redis cache through the plugin's handler
#[derive(Parser, Debug)]
#[command(name = "coolredis")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Redis settings as JSON: an endpoint object or an array of cluster nodes
    #[arg(long, short, global = true, env = "COOLREDIS_CONFIG")]
    config: Option<String>,

    /// Store to talk to
    #[arg(long, global = true, value_enum, default_value_t = Backend::Redis)]
    backend: Backend,

    #[command(subcommand)]
    command: Commands,
}

/// Cache backend selection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
enum Backend {
    #[default]
    Redis,
    /// In-process store; state does not outlive the command
    Memory,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Initialize and print the plugin status
    Status,
    /// Print the value stored at a key
    Get { key: String },
    /// Store a value at a key
    Set {
        key: String,
        value: String,
        /// Expiry in seconds; 0 keeps the key forever
        #[arg(long)]
        ttl: Option<u64>,
    },
    /// Delete a key
    Del { key: String },
    /// List keys matching a glob pattern
    Keys { pattern: Option<String> },
}

#[derive(Serialize)]
struct StatusReport {
    status: PluginStatus,
    mode: &'static str,
    topology: Option<&'static str>,
    nodes: usize,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "coolredis=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let host = Arc::new(StaticHost::new(cli.config.as_deref().map(settings_value)));
    let config = Config::from_env();

    match cli.backend {
        Backend::Redis => execute(host, RedisConnector::new(), config, cli.command).await,
        Backend::Memory => {
            let connector = MemoryConnector::new(config.memory_max_entries);
            execute(host, connector, config, cli.command).await
        }
    }
}

async fn execute<C: Connector>(
    host: Arc<StaticHost>,
    connector: C,
    config: Config,
    command: Commands,
) -> Result<()> {
    let handler = install(host, connector, ConnectionRegistry::new(), config).await;

    let outcome = run(&handler, command).await;
    handler.shutdown().await;
    outcome
}

async fn run<C: Connector>(handler: &CacheHandler<C>, command: Commands) -> Result<()> {
    match command {
        Commands::Status => {
            let status = handler.probe_status().await;
            let settings = handler.settings();
            let topology = settings.topology();
            let report = StatusReport {
                status,
                mode: handler.mode(),
                topology: topology.map(|t| t.kind()),
                nodes: topology.map_or(0, |t| t.endpoints().len()),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);

            if let ConfigState::Invalid(e) = &settings {
                bail!("invalid redis settings: {e}");
            }
            if !status.is_usable() {
                bail!("cache is not usable ({status})");
            }
        }
        Commands::Get { key } => match handler.get(&key).await? {
            Some(value) => println!("{}", String::from_utf8_lossy(&value)),
            None => bail!("key not found: {key}"),
        },
        Commands::Set { key, value, ttl } => {
            handler
                .set(&key, value.as_bytes(), ttl.map(Duration::from_secs))
                .await?;
            println!("OK");
        }
        Commands::Del { key } => {
            handler.delete(&key).await?;
            println!("OK");
        }
        Commands::Keys { pattern } => {
            for key in handler.keys(pattern.as_deref()).await? {
                println!("{key}");
            }
        }
    }
    Ok(())
}

/// Takes `raw` as JSON when it parses, otherwise as a plain string.
fn settings_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
