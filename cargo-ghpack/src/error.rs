use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum GhPackError {
    #[error("Build failed for target {target}: {reason}")]
    BuildFailed { target: String, reason: String },

    #[error("Missing file: {}", .path.display())]
    MissingFile { path: PathBuf },

    #[error("Failed to strip {}: {reason}", .path.display())]
    StripFailed { path: PathBuf, reason: String },

    #[error("Failed to write archive {}: {reason}", .path.display())]
    ArchiveFailed { path: PathBuf, reason: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Git error: {0}")]
    Git(#[from] git2::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`GhPackError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Build,
    MissingFile,
    Strip,
    Archive,
    Config,
    Git,
    Io,
}

impl GhPackError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GhPackError::BuildFailed { .. } => ErrorKind::Build,
            GhPackError::MissingFile { .. } => ErrorKind::MissingFile,
            GhPackError::StripFailed { .. } => ErrorKind::Strip,
            GhPackError::ArchiveFailed { .. } => ErrorKind::Archive,
            GhPackError::Config(_) => ErrorKind::Config,
            GhPackError::Git(_) => ErrorKind::Git,
            GhPackError::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T> = std::result::Result<T, GhPackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_matches_variant() {
        let err = GhPackError::BuildFailed {
            target: "x86_64-unknown-linux-gnu".to_string(),
            reason: "exit status: 101".to_string(),
        };
        assert_eq!(err.kind(), ErrorKind::Build);

        let err = GhPackError::MissingFile {
            path: PathBuf::from("README.md"),
        };
        assert_eq!(err.kind(), ErrorKind::MissingFile);
        assert_eq!(err.to_string(), "Missing file: README.md");
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let err: GhPackError = io.into();
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}
