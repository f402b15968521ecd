use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use cargo_ghpack::cli;
use cargo_ghpack::config::Config;
use cargo_ghpack::pipeline::Pipeline;

fn main() -> Result<()> {
    // Parse command line arguments - handle both cargo subcommand and direct invocation
    let cli = cli::parse_from(std::env::args_os()).unwrap_or_else(|e| e.exit());

    // Initialize tracing
    let default_filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    let project_dir = cli.project_dir()?;
    let config = Config::load_with_fallback(&cli.config_path(&project_dir))
        .context("Failed to load configuration")?;
    let release = cli.release_config(&project_dir, &config)?;

    let pipeline = Pipeline::new(release, config);
    match pipeline.run() {
        Ok(archive) => {
            tracing::info!("Packaging completed: {}", archive.display());
            Ok(())
        }
        Err(e) => {
            tracing::error!("Packaging failed ({:?}): {}", e.kind(), e);
            Err(e.into())
        }
    }
}
