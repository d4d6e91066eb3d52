//! # marquee
//!
//! Operator CLI over the show artwork cache.
//!
//! - `fill` brings one show's cached artwork up to date
//! - `status` reports which artifacts are cached
//! - `classify` reports what kind of artwork an image file looks like
//! - `path` prints where artifacts are cached

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::json;
use tracing::{info, warn};

use marquee_cli::{build_cache, logging};
use marquee_config::{Config, ConfigLoad, ConfigLoader, ConfigLoaderOptions};
use marquee_core::{ArtifactKind, CacheLayout, ShowId, ShowRef, classify};

/// CLI entry point
#[derive(Parser, Debug)]
#[command(name = "marquee")]
#[command(about = "Show artwork cache: fill, inspect and classify cached images")]
struct Cli {
    /// Configuration file (defaults to marquee.toml or $MARQUEE_CONFIG)
    #[arg(long, global = true, env = "MARQUEE_CONFIG")]
    config: Option<PathBuf>,

    /// Debug-level logging when RUST_LOG is unset
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fill missing artwork for one show from its directory and the remote provider
    Fill {
        show_id: ShowId,
        /// The show's media directory
        location: PathBuf,
    },
    /// Print each artifact kind, its cache path and whether it is cached
    Status {
        show_id: ShowId,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Print the artwork kind each image file classifies as
    Classify {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Print cache paths for a show
    Path {
        show_id: ShowId,
        /// Only this kind (poster, banner, fanart, poster_thumb, banner_thumb)
        #[arg(long)]
        kind: Option<ArtifactKind>,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(logging::default_filter(cli.verbose));

    match cli.command {
        Command::Fill { show_id, location } => {
            let config = load_config(cli.config)?;
            run_fill(&config, ShowRef::new(show_id, location)).await
        }
        Command::Status { show_id, json } => {
            let config = load_config(cli.config)?;
            run_status(&config, show_id, json).await
        }
        Command::Classify { files } => run_classify(&files).await,
        Command::Path { show_id, kind } => {
            let config = load_config(cli.config)?;
            run_path(&config.cache_layout(), show_id, kind);
            Ok(())
        }
    }
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    let loader = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: path,
        env_file: None,
    });

    let ConfigLoad { config, warnings } =
        loader.load().context("failed to load configuration")?;

    if config.source.env_file_loaded {
        info!("loaded .env file");
    }
    logging::report_warnings(&warnings);

    Ok(config)
}

async fn run_fill(config: &Config, show: ShowRef) -> anyhow::Result<()> {
    let cache = build_cache(config)?;
    cache.fill(&show).await;

    let missing: Vec<&str> = cache
        .needed(show.id)
        .await
        .iter()
        .map(ArtifactKind::as_str)
        .collect();
    if missing.is_empty() {
        println!("{}: all artwork cached", show.id);
    } else {
        println!("{}: still missing {}", show.id, missing.join(", "));
    }
    Ok(())
}

async fn run_status(
    config: &Config,
    id: ShowId,
    as_json: bool,
) -> anyhow::Result<()> {
    let cache = build_cache(config)?;

    let mut rows = Vec::with_capacity(ArtifactKind::ALL.len());
    for kind in ArtifactKind::ALL {
        rows.push((kind, cache.path(kind, id), cache.exists(kind, id).await));
    }

    if as_json {
        let artifacts: Vec<_> = rows
            .iter()
            .map(|(kind, path, cached)| {
                json!({
                    "kind": kind,
                    "path": path,
                    "cached": cached,
                })
            })
            .collect();
        let report = json!({ "show_id": id, "artifacts": artifacts });
        println!(
            "{}",
            serde_json::to_string_pretty(&report)
                .context("failed to render status")?
        );
    } else {
        for (kind, path, cached) in rows {
            let state = if cached { "cached" } else { "missing" };
            println!("{:<13}{:<8} {}", kind.as_str(), state, path.display());
        }
    }
    Ok(())
}

async fn run_classify(files: &[PathBuf]) -> anyhow::Result<()> {
    for file in files {
        let label = match tokio::fs::read(file).await {
            Ok(bytes) => classify(&bytes).map_or("unknown", ArtifactKind::as_str),
            Err(err) => {
                warn!(path = %file.display(), error = %err, "unable to read image");
                "unreadable"
            }
        };
        println!("{}\t{}", file.display(), label);
    }
    Ok(())
}

fn run_path(layout: &CacheLayout, id: ShowId, kind: Option<ArtifactKind>) {
    match kind {
        Some(kind) => println!("{}", layout.path(kind, id).display()),
        None => {
            for kind in ArtifactKind::ALL {
                println!("{}\t{}", kind.as_str(), layout.path(kind, id).display());
            }
        }
    }
}
