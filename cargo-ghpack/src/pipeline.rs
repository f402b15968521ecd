use std::path::PathBuf;

use crate::builder::{BuildRequest, TargetBuilder};
use crate::config::{Config, PackageLayout, ReleaseConfig};
use crate::error::Result;
use crate::packager::Packager;

/// Builds one target and packages it into `<project>-<tag>-<target>.tar.gz`
pub struct Pipeline {
    release: ReleaseConfig,
    config: Config,
    layout: PackageLayout,
    staging_parent: Option<PathBuf>,
}

impl Pipeline {
    pub fn new(release: ReleaseConfig, config: Config) -> Self {
        let layout = config
            .package
            .resolve(&release.project, &release.project_dir);

        Self {
            release,
            config,
            layout,
            staging_parent: None,
        }
    }

    /// Allocate the staging tree under `dir` instead of the system temp dir
    pub fn with_staging_parent(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_parent = Some(dir.into());
        self
    }

    pub fn release(&self) -> &ReleaseConfig {
        &self.release
    }

    pub fn layout(&self) -> &PackageLayout {
        &self.layout
    }

    /// Build, then package. The first failing step aborts the run.
    pub fn run(&self) -> Result<PathBuf> {
        tracing::info!("Packaging release: {}", self.release.release_name());

        let request = BuildRequest::new(&self.release.target, &self.config.build);
        let builder = TargetBuilder::new(&self.config.build, &self.release.project_dir);
        let output = builder.build(&request, &self.layout)?;
        tracing::info!("Built binary: {}", output.binary.display());

        Packager::new(&self.release, &self.layout)
            .staging_parent(self.staging_parent.clone())
            .package(&output)
    }
}
