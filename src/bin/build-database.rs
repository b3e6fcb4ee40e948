use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;
use tracing::info;

use lakhua::config::DATA_DIR_NAME;
use lakhua::dataset::compile_dir;
use lakhua::StoreConfig;

#[derive(Parser, Debug)]
#[command(name = "build-database")]
#[command(about = "Compile reverse_geo_{R}.json datasets into the compact binary format")]
struct Args {
    /// Directory containing the JSON datasets; output is written alongside
    #[arg(long, default_value = DATA_DIR_NAME)]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    info!("Building database in: {}", args.data_dir.display());

    let compiled = compile_dir(&StoreConfig::new(&args.data_dir))?;
    if compiled.is_empty() {
        bail!("no reverse_geo_*.json datasets in {}", args.data_dir.display());
    }

    let total: usize = compiled.iter().map(|c| c.bytes).sum();
    info!(
        "Done! {} resolutions, {} KB",
        compiled.len(),
        total / 1_000
    );
    Ok(())
}
