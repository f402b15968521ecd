use anyhow::Result;
use cargo_manifest::Manifest;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::error::{GhPackError, Result as GhResult};

/// Project settings read from `.config/ghpack.toml`
#[derive(Debug, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub package: PackageConfig,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct BuildConfig {
    #[serde(default = "default_cargo")]
    pub cargo: String,

    #[serde(default = "default_features")]
    pub features: Vec<String>,

    #[serde(default = "default_rustflags")]
    pub rustflags: String,

    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            cargo: default_cargo(),
            features: default_features(),
            rustflags: default_rustflags(),
            target_dir: default_target_dir(),
        }
    }
}

/// Files shipped next to the binary. Unset entries are derived from the
/// binary name when the layout is resolved.
#[derive(Debug, Deserialize, Serialize)]
pub struct PackageConfig {
    pub bin: Option<String>,

    pub crate_name: Option<String>,

    pub man_page: Option<PathBuf>,

    #[serde(default = "default_readme")]
    pub readme: PathBuf,

    #[serde(default = "default_licenses")]
    pub licenses: Vec<PathBuf>,

    pub static_completions: Option<Vec<PathBuf>>,

    pub completions: Option<BTreeMap<String, String>>,

    #[serde(default = "default_strip")]
    pub strip: String,
}

impl Default for PackageConfig {
    fn default() -> Self {
        Self {
            bin: None,
            crate_name: None,
            man_page: None,
            readme: default_readme(),
            licenses: default_licenses(),
            static_completions: None,
            completions: None,
            strip: default_strip(),
        }
    }
}

/// Fully resolved package layout, with every path relative to the project
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageLayout {
    pub bin: String,
    pub crate_name: String,
    pub man_page: PathBuf,
    pub readme: PathBuf,
    pub licenses: Vec<PathBuf>,
    pub static_completions: Vec<PathBuf>,
    /// Completion format name -> file name produced by the build script
    pub completions: BTreeMap<String, String>,
    pub strip: String,
}

fn default_cargo() -> String {
    "cargo".to_string()
}

fn default_features() -> Vec<String> {
    vec!["simd-accel".to_string()]
}

fn default_rustflags() -> String {
    "-C target-feature=+ssse3".to_string()
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("target")
}

fn default_readme() -> PathBuf {
    PathBuf::from("README.md")
}

fn default_licenses() -> Vec<PathBuf> {
    vec![
        PathBuf::from("COPYING"),
        PathBuf::from("UNLICENSE"),
        PathBuf::from("LICENSE-MIT"),
    ]
}

fn default_strip() -> String {
    "strip".to_string()
}

fn default_completions(bin: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        ("bash".to_string(), format!("{bin}.bash-completion")),
        ("fish".to_string(), format!("{bin}.fish")),
        ("powershell".to_string(), format!("_{bin}.ps1")),
    ])
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load the project file, falling back to the user-wide file
    pub fn load_with_fallback(path: &Path) -> Result<Self> {
        if path.exists() {
            return Self::load(path);
        }

        let user_path = Self::default_path();
        if user_path.exists() {
            tracing::debug!("Using user configuration: {}", user_path.display());
        }
        Self::load(&user_path)
    }

    /// Get the default configuration file path
    pub fn default_path() -> PathBuf {
        directories::BaseDirs::new()
            .map(|dirs| dirs.config_dir().join("ghpack.toml"))
            .unwrap_or_else(|| PathBuf::from("~/.config/ghpack.toml"))
    }
}

impl PackageConfig {
    /// Fill in every unset entry for the given project
    pub fn resolve(&self, project: &str, project_dir: &Path) -> PackageLayout {
        let bin = self.bin.clone().unwrap_or_else(|| project.to_string());

        let crate_name = self
            .crate_name
            .clone()
            .or_else(|| package_name(project_dir))
            .unwrap_or_else(|| bin.clone());

        PackageLayout {
            man_page: self
                .man_page
                .clone()
                .unwrap_or_else(|| PathBuf::from("doc").join(format!("{bin}.1"))),
            readme: self.readme.clone(),
            licenses: self.licenses.clone(),
            static_completions: self
                .static_completions
                .clone()
                .unwrap_or_else(|| vec![PathBuf::from("complete").join(format!("_{bin}"))]),
            completions: self
                .completions
                .clone()
                .unwrap_or_else(|| default_completions(&bin)),
            strip: self.strip.clone(),
            crate_name,
            bin,
        }
    }
}

/// Read the package name from `Cargo.toml` in `project_dir`
pub fn package_name(project_dir: &Path) -> Option<String> {
    let manifest = Manifest::from_path(project_dir.join("Cargo.toml")).ok()?;
    manifest.package.map(|package| package.name)
}

/// The identity of one release artifact
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReleaseConfig {
    pub project: String,
    pub tag: String,
    pub target: String,
    pub project_dir: PathBuf,
    pub output_dir: PathBuf,
}

impl ReleaseConfig {
    pub fn new(
        project: impl Into<String>,
        tag: impl Into<String>,
        target: impl Into<String>,
        project_dir: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
    ) -> GhResult<Self> {
        let config = Self {
            project: project.into(),
            tag: tag.into(),
            target: target.into(),
            project_dir: project_dir.into(),
            output_dir: output_dir.into(),
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> GhResult<()> {
        for (field, value) in [
            ("project", &self.project),
            ("tag", &self.tag),
            ("target", &self.target),
        ] {
            if value.trim().is_empty() {
                return Err(GhPackError::Config(format!("{field} must not be empty")));
            }
            if value.contains('/') || value.contains('\\') {
                return Err(GhPackError::Config(format!(
                    "{field} must not contain a path separator: {value}"
                )));
            }
        }
        Ok(())
    }

    /// `<project>-<tag>-<target>`, shared by the staging root and the archive
    pub fn release_name(&self) -> String {
        format!("{}-{}-{}", self.project, self.tag, self.target)
    }

    pub fn archive_file_name(&self) -> String {
        format!("{}.tar.gz", self.release_name())
    }

    pub fn archive_path(&self) -> PathBuf {
        self.output_dir.join(self.archive_file_name())
    }
}
