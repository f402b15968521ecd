use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::SystemTime;

use crate::config::{BuildConfig, PackageLayout};
use crate::error::{GhPackError, Result};

/// What to compile: one target, a feature set and compiler flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub target: String,
    pub features: BTreeSet<String>,
    pub rustflags: String,
}

impl BuildRequest {
    pub fn new(target: &str, config: &BuildConfig) -> Self {
        Self {
            target: target.to_string(),
            features: config.features.iter().cloned().collect(),
            rustflags: config.rustflags.clone(),
        }
    }
}

/// Where the build left the binary and the generated completion scripts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOutput {
    pub binary: PathBuf,
    /// Completion format name -> generated file
    pub completions: BTreeMap<String, PathBuf>,
}

/// Invokes cargo for a single target
pub struct TargetBuilder {
    cargo: String,
    project_dir: PathBuf,
    target_dir: PathBuf,
}

impl TargetBuilder {
    pub fn new(config: &BuildConfig, project_dir: &Path) -> Self {
        Self {
            cargo: config.cargo.clone(),
            project_dir: project_dir.to_path_buf(),
            target_dir: project_dir.join(&config.target_dir),
        }
    }

    /// Build the release binary and locate its outputs
    pub fn build(&self, request: &BuildRequest, layout: &PackageLayout) -> Result<BuildOutput> {
        tracing::info!("Building {} for target: {}", layout.bin, request.target);

        let mut cmd = self.cargo_command(request);
        tracing::debug!("Running {:?}", cmd);

        let status = cmd.status().map_err(|e| GhPackError::BuildFailed {
            target: request.target.clone(),
            reason: format!("failed to run {}: {e}", self.cargo),
        })?;

        if !status.success() {
            return Err(GhPackError::BuildFailed {
                target: request.target.clone(),
                reason: status.to_string(),
            });
        }

        self.locate_outputs(&request.target, layout)
    }

    /// The toolchain command for `request`.
    ///
    /// `RUSTFLAGS` is set on the child process only.
    pub fn cargo_command(&self, request: &BuildRequest) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.current_dir(&self.project_dir)
            .arg("build")
            .arg("--target")
            .arg(&request.target)
            .arg("--release");

        if !request.features.is_empty() {
            let features: Vec<&str> = request.features.iter().map(String::as_str).collect();
            cmd.arg("--features").arg(features.join(" "));
        }

        if !request.rustflags.is_empty() {
            cmd.env("RUSTFLAGS", &request.rustflags);
        }

        cmd
    }

    /// Get the directory holding release artifacts for `target`
    pub fn release_dir(&self, target: &str) -> PathBuf {
        self.target_dir.join(target).join("release")
    }

    /// Get the path of the built binary
    pub fn binary_path(&self, target: &str, bin: &str) -> PathBuf {
        self.release_dir(target).join(binary_file_name(target, bin))
    }

    fn locate_outputs(&self, target: &str, layout: &PackageLayout) -> Result<BuildOutput> {
        let binary = self.binary_path(target, &layout.bin);
        if !binary.is_file() {
            return Err(GhPackError::MissingFile { path: binary });
        }

        let mut completions = BTreeMap::new();
        if !layout.completions.is_empty() {
            let out_dir = self.find_out_dir(target, layout)?;
            tracing::debug!("Build script output: {}", out_dir.display());

            for (format, file_name) in &layout.completions {
                completions.insert(format.clone(), out_dir.join(file_name));
            }
        }

        Ok(BuildOutput {
            binary,
            completions,
        })
    }

    /// Find the newest `build/<crate>-*/out` directory holding every
    /// generated completion file
    fn find_out_dir(&self, target: &str, layout: &PackageLayout) -> Result<PathBuf> {
        let build_dir = self.release_dir(target).join("build");
        let prefix = format!("{}-", layout.crate_name);
        let mut newest: Option<(SystemTime, PathBuf)> = None;

        if build_dir.is_dir() {
            for entry in fs::read_dir(&build_dir)? {
                let entry = entry?;
                let name = entry.file_name();
                if !name.to_string_lossy().starts_with(&prefix) {
                    continue;
                }

                let out_dir = entry.path().join("out");
                let complete = layout
                    .completions
                    .values()
                    .all(|file_name| out_dir.join(file_name).is_file());
                if !complete {
                    continue;
                }

                let modified = fs::metadata(&out_dir)?.modified()?;
                if newest.as_ref().map_or(true, |(time, _)| modified > *time) {
                    newest = Some((modified, out_dir));
                }
            }
        }

        newest
            .map(|(_, out_dir)| out_dir)
            .ok_or_else(|| GhPackError::MissingFile {
                path: build_dir.join(format!("{prefix}*")).join("out"),
            })
    }
}

/// Binary file name for `target`, with `.exe` on Windows targets
pub fn binary_file_name(target: &str, bin: &str) -> String {
    if target.contains("windows") {
        format!("{bin}.exe")
    } else {
        bin.to_string()
    }
}
