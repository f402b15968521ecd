use flate2::write::GzEncoder;
use flate2::Compression;
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::builder::BuildOutput;
use crate::config::{PackageLayout, ReleaseConfig};
use crate::error::{GhPackError, Result};
use crate::staging::StagingTree;

/// Assembles the staging tree for one release and compresses it
pub struct Packager<'a> {
    release: &'a ReleaseConfig,
    layout: &'a PackageLayout,
    staging_parent: Option<PathBuf>,
}

impl<'a> Packager<'a> {
    pub fn new(release: &'a ReleaseConfig, layout: &'a PackageLayout) -> Self {
        Self {
            release,
            layout,
            staging_parent: None,
        }
    }

    /// Allocate staging trees under `dir` instead of the system temp dir
    pub fn staging_parent(mut self, dir: Option<PathBuf>) -> Self {
        self.staging_parent = dir;
        self
    }

    /// Stage `output` plus the auxiliary files and write
    /// `<output_dir>/<name>.tar.gz`.
    ///
    /// The staging tree is removed whether or not packaging succeeds.
    pub fn package(&self, output: &BuildOutput) -> Result<PathBuf> {
        let name = self.release.release_name();
        let staging = StagingTree::create(self.staging_parent.as_deref(), &name)?;
        tracing::info!("Staging {} in {}", name, staging.path().display());

        let result = self.stage(&staging, output).and_then(|()| {
            create_archive(staging.path(), staging.name(), &self.release.archive_path())
        });

        let cleanup = staging.close();
        let archive_path = result?;
        cleanup?;

        tracing::info!("Created archive: {}", archive_path.display());
        Ok(archive_path)
    }

    fn stage(&self, staging: &StagingTree, output: &BuildOutput) -> Result<()> {
        let mut staged = StagedFiles::default();
        let binary = staged.copy_into(&output.binary, staging.root())?;
        strip_binary(&self.layout.strip, &binary)?;

        let project_dir = &self.release.project_dir;
        let docs = [&self.layout.man_page, &self.layout.readme]
            .into_iter()
            .chain(&self.layout.licenses);
        for file in docs {
            staged.copy_into(&project_dir.join(file), staging.root())?;
        }

        let complete_dir = staging.complete_dir();
        for generated in output.completions.values() {
            staged.copy_into(generated, &complete_dir)?;
        }
        for file in &self.layout.static_completions {
            staged.copy_into(&project_dir.join(file), &complete_dir)?;
        }

        Ok(())
    }
}

/// Every file copied into a staging tree, keyed by destination
#[derive(Default)]
struct StagedFiles {
    sources: BTreeMap<PathBuf, PathBuf>,
}

impl StagedFiles {
    /// Copy `source` into `dest_dir`, keeping its file name.
    ///
    /// Two sources may not share a destination.
    fn copy_into(&mut self, source: &Path, dest_dir: &Path) -> Result<PathBuf> {
        let file_name = match source.file_name() {
            Some(name) if source.is_file() => name,
            _ => {
                return Err(GhPackError::MissingFile {
                    path: source.to_path_buf(),
                })
            }
        };

        let dest = dest_dir.join(file_name);
        if let Some(previous) = self.sources.get(&dest) {
            return Err(GhPackError::Config(format!(
                "{} and {} are both staged as {}",
                previous.display(),
                source.display(),
                dest.display()
            )));
        }

        fs::copy(source, &dest)?;
        tracing::debug!("Copied {} -> {}", source.display(), dest.display());
        self.sources.insert(dest.clone(), source.to_path_buf());
        Ok(dest)
    }
}

/// Remove debug symbols from `binary` in place.
///
/// An empty program name disables stripping.
pub fn strip_binary(program: &str, binary: &Path) -> Result<()> {
    if program.is_empty() {
        tracing::debug!("Stripping disabled, keeping {}", binary.display());
        return Ok(());
    }

    tracing::debug!("Running {} {}", program, binary.display());
    let status = Command::new(program)
        .arg(binary)
        .status()
        .map_err(|e| GhPackError::StripFailed {
            path: binary.to_path_buf(),
            reason: format!("failed to run {program}: {e}"),
        })?;

    if !status.success() {
        return Err(GhPackError::StripFailed {
            path: binary.to_path_buf(),
            reason: status.to_string(),
        });
    }

    Ok(())
}

/// Create a tar.gz archive of `source_dir/name` at `archive_path`.
///
/// Entries are written in sorted order with normalized metadata. The archive
/// is first written to a temporary file beside `archive_path` and renamed
/// into place once complete.
pub fn create_archive(source_dir: &Path, name: &str, archive_path: &Path) -> Result<PathBuf> {
    let tree = source_dir.join(name);
    if !tree.is_dir() {
        return Err(GhPackError::MissingFile { path: tree });
    }

    let archive_failed = |e: io::Error| GhPackError::ArchiveFailed {
        path: archive_path.to_path_buf(),
        reason: e.to_string(),
    };

    let output_dir = match archive_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let partial = tempfile::Builder::new()
        .prefix(".ghpack.")
        .suffix(".tar.gz.part")
        .tempfile_in(output_dir)
        .map_err(archive_failed)?;

    write_tar_gz(partial.as_file(), &tree, Path::new(name)).map_err(archive_failed)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(partial.path(), fs::Permissions::from_mode(0o644))
            .map_err(archive_failed)?;
    }

    partial
        .persist(archive_path)
        .map_err(|e| archive_failed(e.error))?;

    Ok(archive_path.to_path_buf())
}

fn write_tar_gz(file: &File, tree: &Path, archive_root: &Path) -> io::Result<()> {
    let gz_encoder = GzEncoder::new(file, Compression::default());
    let mut tar_builder = tar::Builder::new(gz_encoder);
    tar_builder.mode(tar::HeaderMode::Deterministic);

    append_tree(&mut tar_builder, tree, archive_root)?;

    let gz_encoder = tar_builder.into_inner()?;
    let mut file = gz_encoder.finish()?;
    file.flush()
}

fn append_tree<W: Write>(
    tar_builder: &mut tar::Builder<W>,
    dir: &Path,
    archive_dir: &Path,
) -> io::Result<()> {
    tar_builder.append_dir(archive_dir, dir)?;

    let mut entries = fs::read_dir(dir)?.collect::<io::Result<Vec<_>>>()?;
    entries.sort_by_key(|entry| entry.file_name());

    for entry in entries {
        let path = entry.path();
        let name = archive_dir.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            append_tree(tar_builder, &path, &name)?;
        } else {
            tar_builder.append_path_with_name(&path, &name)?;
        }
    }

    Ok(())
}
