//! Umbra CLI Binary
//!
//! Bootstraps the namespace cache against the configured storage providers
//! and answers queries about it. The filesystem mount itself is served by a
//! separate front-end; this binary exposes the same query surface directly.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use tracing::warn;
use umbra::config;
use umbra::drive::DriveRegistry;
use umbra::logging::{init_logging, LoggingConfig};
use umbra::tree::Tree;

#[derive(Parser)]
#[command(name = "umbra", about = "Query a content-addressed drive namespace")]
struct Cli {
    /// Path to the provider config file (JSON array of drive configs).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error, off
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Log format: text, json
    #[arg(long, default_value = "text")]
    log_format: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print provider and namespace summary.
    Status,
    /// List the children of a path.
    Ls {
        #[arg(default_value = "/")]
        path: String,
    },
    /// Print the node at a path.
    Stat { path: String },
    /// Print the full metadata record behind a path.
    Record { path: String },
    /// Keep the cache refreshed on a schedule until interrupted.
    Watch {
        /// Seconds between refresh passes.
        #[arg(long, default_value_t = 300)]
        interval: u64,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let logging = LoggingConfig {
        level: cli.log_level.clone(),
        format: cli.log_format.clone(),
        ..Default::default()
    };
    init_logging(&logging)?;

    let config_path = match cli.config.clone() {
        Some(path) => path,
        None => config::default_config_path()
            .context("could not determine platform config directory")?,
    };

    let registry = DriveRegistry::builtin();
    let clients = config::clients(&config_path, &registry)
        .with_context(|| format!("could not initialize clients from {:?}", config_path))?;
    if clients.len() > 1 {
        warn!(
            configured = clients.len(),
            "multiple providers configured; querying the first"
        );
    }
    let drive = clients.into_iter().next().context("no provider configured")?;
    let provider = drive.describe().provider.clone();

    let tree = Tree::new(drive).context("initializing namespace cache")?;

    match cli.command {
        Command::Status => {
            println!("provider: {}", provider);
            println!("nodes:    {}", tree.len());
        }
        Command::Ls { path } => {
            let node = tree.lookup(&path)?;
            let mut names: Vec<&String> = node.children.iter().collect();
            names.sort();
            for name in names {
                println!("{}", name);
            }
        }
        Command::Stat { path } => {
            let node = tree.lookup(&path)?;
            let kind = if node.is_synthetic() { "directory" } else { "file" };
            println!("path:     {}", node.path);
            println!("kind:     {}", kind);
            println!("size:     {}", node.size);
            println!("modified: {}", node.modified.to_rfc3339());
            if let Some(sum) = node.record_sum {
                println!("record:   {}", sum);
            }
        }
        Command::Record { path } => {
            let node = tree.lookup(&path)?;
            let record = tree.record_for(&node)?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        Command::Watch { interval } => {
            if interval == 0 {
                bail!("interval must be at least 1 second");
            }
            let _handle = tree.start_periodic_refresh(Duration::from_secs(interval));
            println!("refreshing {} every {}s; press ctrl-c to exit", provider, interval);
            loop {
                std::thread::park();
            }
        }
    }

    Ok(())
}
