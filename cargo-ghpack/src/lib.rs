//! # cargo-ghpack
//!
//! A cargo subcommand that builds one release target and packages it.
//!
//! ## Overview
//!
//! `cargo-ghpack` is run by CI once per target. It compiles the project in
//! release mode with a fixed feature set and `RUSTFLAGS`, then assembles a
//! `<project>-<tag>-<target>.tar.gz` archive holding the stripped binary,
//! the man page, README, license files and shell completion scripts.
//!
//! ## Usage
//!
//! ```bash
//! # Inputs come from the environment in CI
//! TARGET=x86_64-unknown-linux-gnu PROJECT_NAME=rg TAG=v1.2.3 cargo ghpack
//!
//! # Or from flags
//! cargo ghpack --target x86_64-unknown-linux-gnu --project rg --tag v1.2.3
//! ```
//!
//! ## Archive layout
//!
//! ```text
//! rg-v1.2.3-x86_64-unknown-linux-gnu/
//! ├── rg
//! ├── rg.1
//! ├── README.md
//! ├── COPYING, UNLICENSE, LICENSE-MIT
//! └── complete/
//!     ├── rg.bash-completion
//!     ├── rg.fish
//!     ├── _rg.ps1
//!     └── _rg
//! ```
//!
//! ## Configuration
//!
//! Build flags and the file manifest can be overridden in
//! `.config/ghpack.toml` in the project directory or `~/.config/ghpack.toml`
//! for user-wide settings.

/// Cargo invocation for a single target and output discovery
pub mod builder;

/// Command-line interface definitions and argument parsing
pub mod cli;

/// Configuration file handling and the validated release identity
pub mod config;

/// Error types and error handling utilities
pub mod error;

/// Tag detection from the git repository
pub mod git;

/// Staging, stripping and archive creation
pub mod packager;

/// Build-then-package orchestration
pub mod pipeline;

/// Scoped temporary staging directory
pub mod staging;
