use anyhow::{Context, Result};
use clap::Parser;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::{package_name, Config, ReleaseConfig};
use crate::git;

#[derive(Parser, Debug)]
#[clap(
    name = "cargo-ghpack",
    version,
    about = "Build and package a release archive for one target",
    long_about = None,
    bin_name = "cargo"
)]
pub enum CargoCli {
    #[clap(name = "ghpack")]
    Ghpack(GhpackCli),
}

#[derive(Parser, Debug, Clone)]
#[clap(version, about, long_about = None)]
pub struct GhpackCli {
    /// Target triple to build and package (e.g., x86_64-unknown-linux-gnu)
    #[clap(short = 'T', long, env = "TARGET")]
    pub target: String,

    /// Project name used in the archive name
    /// If not specified, uses `package.bin` from the configuration or the
    /// package name from Cargo.toml
    #[clap(short, long, env = "PROJECT_NAME")]
    pub project: Option<String>,

    /// Release tag used in the archive name
    /// If not specified, uses the tag on HEAD
    #[clap(short, long, env = "TAG")]
    pub tag: Option<String>,

    /// Configuration file path, relative to the project directory
    #[clap(long, default_value = ".config/ghpack.toml")]
    pub config: PathBuf,

    /// Project root containing Cargo.toml and the documentation files
    #[clap(long)]
    pub project_dir: Option<PathBuf>,

    /// Directory the archive is written to
    #[clap(long)]
    pub output_dir: Option<PathBuf>,

    /// Enable verbose output
    #[clap(long)]
    pub verbose: bool,
}

/// Parse `args` as `cargo ghpack ...` when the first argument is the
/// subcommand name, and as a direct `cargo-ghpack ...` invocation otherwise
pub fn parse_from<I, T>(args: I) -> Result<GhpackCli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();

    if args.get(1).is_some_and(|arg| arg == "ghpack") {
        let CargoCli::Ghpack(cli) = CargoCli::try_parse_from(args)?;
        Ok(cli)
    } else {
        GhpackCli::try_parse_from(args)
    }
}

impl GhpackCli {
    /// Project root, defaulting to the current directory
    pub fn project_dir(&self) -> Result<PathBuf> {
        match &self.project_dir {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to read current directory"),
        }
    }

    pub fn config_path(&self, project_dir: &Path) -> PathBuf {
        project_dir.join(&self.config)
    }

    /// Resolve the release identity, filling in the project name and tag
    /// from the project when they are not given
    pub fn release_config(&self, project_dir: &Path, config: &Config) -> Result<ReleaseConfig> {
        let project = match &self.project {
            Some(project) => project.clone(),
            None => config
                .package
                .bin
                .clone()
                .or_else(|| package_name(project_dir))
                .context("No project name given. Set PROJECT_NAME or --project")?,
        };

        let tag = match &self.tag {
            Some(tag) => tag.clone(),
            None => git::tag_on_head(project_dir)
                .context("Failed to read git repository")?
                .context("No tag found on HEAD. Set TAG or --tag")?,
        };

        let output_dir = match &self.output_dir {
            Some(dir) => dir.clone(),
            None => std::env::current_dir().context("Failed to read current directory")?,
        };

        let release = ReleaseConfig::new(project, tag, &self.target, project_dir, output_dir)?;
        Ok(release)
    }
}
