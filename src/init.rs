use crate::config;
use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::sync::Arc;
use sunwalker_importer::{
    catalog::Catalog,
    upload::{directory::DirectoryStore, memory::MemoryStore, store::AssetStore, Uploader},
    Format,
};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct CLIArgs {
    #[clap(short, long)]
    pub config: String,

    /// Package format: polygon or kattis
    #[clap(short, long, default_value = "polygon")]
    pub format: Format,

    /// Where to write the snapshot; stdout if omitted
    #[clap(short, long)]
    pub output: Option<String>,

    /// Keep uploads in memory instead of the configured store
    #[clap(long)]
    pub dry_run: bool,

    /// Directory of the unpacked package
    pub package: String,
}

fn init_tracing(config: &config::LogConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

pub async fn main() -> Result<()> {
    let cli_args = CLIArgs::parse();

    let config = std::fs::read_to_string(&cli_args.config)
        .with_context(|| format!("Failed to read config from {}", cli_args.config))?;

    let config: config::Config = toml::from_str(&config).context("Config is invalid")?;

    init_tracing(&config.log);

    let store: Arc<dyn AssetStore> = if cli_args.dry_run {
        info!("dry run, uploads are kept in memory");
        Arc::new(MemoryStore::new())
    } else {
        Arc::new(DirectoryStore::new(&config.store.root, &config.store.base_url))
    };

    let loader = cli_args
        .format
        .loader(Uploader::new(store), Arc::new(Catalog::builtin()));

    let snapshot = loader
        .snapshot(Path::new(&cli_args.package))
        .await
        .with_context(|| format!("Failed to import {:?} package {}", cli_args.format, cli_args.package))?;

    let json = serde_json::to_string_pretty(&snapshot).context("Failed to serialize snapshot")?;

    match cli_args.output {
        Some(ref output) => tokio::fs::write(output, json)
            .await
            .with_context(|| format!("Failed to write snapshot to {output}"))?,
        None => println!("{json}"),
    }

    Ok(())
}
