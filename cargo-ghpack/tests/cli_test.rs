use cargo_ghpack::cli::{parse_from, CargoCli, GhpackCli};
use cargo_ghpack::config::{Config, PackageConfig};
use clap::error::ErrorKind;
use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn parse(args: &[&str]) -> GhpackCli {
    GhpackCli::try_parse_from(args).unwrap()
}

#[test]
fn test_parse_all_flags() {
    let cli = parse(&[
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-musl",
        "--project",
        "rg",
        "--tag",
        "v1.2.3",
        "--project-dir",
        "/src/ripgrep",
        "--output-dir",
        "/tmp/out",
        "--verbose",
    ]);

    assert_eq!(cli.target, "x86_64-unknown-linux-musl");
    assert_eq!(cli.project, Some("rg".to_string()));
    assert_eq!(cli.tag, Some("v1.2.3".to_string()));
    assert_eq!(cli.project_dir, Some(PathBuf::from("/src/ripgrep")));
    assert_eq!(cli.output_dir, Some(PathBuf::from("/tmp/out")));
    assert!(cli.verbose);
}

#[test]
fn test_parse_cargo_subcommand() {
    let cli = CargoCli::try_parse_from([
        "cargo",
        "ghpack",
        "--target",
        "aarch64-apple-darwin",
        "--tag",
        "v2.0.0",
    ])
    .unwrap();

    let CargoCli::Ghpack(cli) = cli;
    assert_eq!(cli.target, "aarch64-apple-darwin");
    assert_eq!(cli.tag, Some("v2.0.0".to_string()));
}

#[test]
fn test_subcommand_help_and_version() {
    let err = parse_from(["cargo-ghpack", "ghpack", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);

    let err = parse_from(["cargo-ghpack", "ghpack", "--version"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayVersion);

    let err = CargoCli::try_parse_from(["cargo", "ghpack", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
}

#[test]
fn test_direct_help() {
    let err = parse_from(["cargo-ghpack", "--help"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DisplayHelp);
}

#[test]
fn test_subcommand_missing_target_reported() {
    // Only meaningful when CI has not exported TARGET into the test process
    if std::env::var_os("TARGET").is_some() {
        return;
    }

    let err = parse_from(["cargo-ghpack", "ghpack", "--tag", "v1", "--project", "rg"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert!(err.to_string().contains("--target"));

    let err = parse_from(["cargo-ghpack", "--tag", "v1"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn test_parse_from_both_invocations() {
    let via_cargo = parse_from([
        "cargo-ghpack",
        "ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--tag",
        "v1.2.3",
    ])
    .unwrap();
    let direct = parse_from([
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--tag",
        "v1.2.3",
    ])
    .unwrap();

    assert_eq!(via_cargo.target, direct.target);
    assert_eq!(via_cargo.tag, Some("v1.2.3".to_string()));
    assert_eq!(direct.tag, Some("v1.2.3".to_string()));
}

#[test]
fn test_config_path_default() {
    let cli = parse(&["cargo-ghpack", "--target", "x86_64-unknown-linux-gnu"]);
    assert_eq!(
        cli.config_path(Path::new("/src/ripgrep")),
        PathBuf::from("/src/ripgrep/.config/ghpack.toml")
    );
}

#[test]
fn test_release_config_from_flags() {
    let project_dir = tempdir().unwrap();
    let output_dir = tempdir().unwrap();
    let output = output_dir.path().display().to_string();

    let cli = parse(&[
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--project",
        "rg",
        "--tag",
        "v1.2.3",
        "--output-dir",
        &output,
    ]);

    let release = cli
        .release_config(project_dir.path(), &Config::default())
        .unwrap();
    assert_eq!(
        release.archive_path(),
        output_dir
            .path()
            .join("rg-v1.2.3-x86_64-unknown-linux-gnu.tar.gz")
    );
    assert_eq!(release.project_dir, project_dir.path());
}

#[test]
fn test_project_name_from_config_bin() {
    let project_dir = tempdir().unwrap();
    let cli = parse(&[
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--tag",
        "v1.2.3",
    ]);
    let cli = GhpackCli {
        project: None,
        ..cli
    };
    let config = Config {
        package: PackageConfig {
            bin: Some("rg".to_string()),
            ..PackageConfig::default()
        },
        ..Config::default()
    };

    let release = cli.release_config(project_dir.path(), &config).unwrap();
    assert_eq!(release.project, "rg");
}

#[test]
fn test_project_name_from_cargo_toml() {
    let project_dir = tempdir().unwrap();
    fs::write(
        project_dir.path().join("Cargo.toml"),
        r#"[package]
name = "ripgrep"
version = "1.2.3"
"#,
    )
    .unwrap();

    let cli = parse(&[
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--tag",
        "v1.2.3",
    ]);
    let cli = GhpackCli {
        project: None,
        ..cli
    };

    let release = cli
        .release_config(project_dir.path(), &Config::default())
        .unwrap();
    assert_eq!(release.release_name(), "ripgrep-v1.2.3-x86_64-unknown-linux-gnu");
}

#[test]
fn test_empty_tag_rejected() {
    let project_dir = tempdir().unwrap();
    let cli = parse(&[
        "cargo-ghpack",
        "--target",
        "x86_64-unknown-linux-gnu",
        "--project",
        "rg",
        "--tag",
        "",
    ]);

    let err = cli
        .release_config(project_dir.path(), &Config::default())
        .unwrap_err();
    assert!(err.to_string().contains("tag must not be empty"));
}
