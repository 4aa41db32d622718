//! # wem-cli: WiFi Environment Data Tool
//!
//! Provides the `wem` command-line interface.
//!
//! ## Subcommands
//!
//! - `wem validate`: check every data file against its schema.
//! - `wem resolve`: show the station settings a device would apply.
//! - `wem access-point`: show the soft-AP fallback settings.
//! - `wem buildfs`: run the `buildfs` step locally with its hooks.
//!
//! ```bash
//! wem validate
//! wem validate --keep-going --pair mqtt=schemas/mqtt_schema.json,data/mqtt.json
//! wem resolve --ssid HomeNet --mac 5C:CF:7F:01:AB:9E
//! wem buildfs --set PROJECT_DATA_DIR=data
//! ```
//!
//! ## Exit codes
//!
//! `0` success, `1` validation failure or unknown network, `2` operational
//! error (bad arguments, unreadable config, output failure).

pub mod buildfs;
pub mod resolve;
pub mod validate;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use wem_schema::config::{find_project_root, project_root_from_env};
use wem_schema::ValidationConfig;

/// Build the validation plan from the global options.
///
/// The root is chosen in this order: `--root`, the config file's `root`,
/// `WEM_PROJECT_DIR`, the nearest ancestor of `cwd` holding `schemas/` and
/// `data/`, and finally `cwd` itself.
pub fn load_plan(
    config_file: Option<&Path>,
    root_override: Option<&Path>,
    cwd: &Path,
) -> Result<ValidationConfig> {
    let mut plan = match config_file {
        Some(path) => ValidationConfig::from_yaml_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => {
            let root = project_root_from_env()
                .or_else(|| find_project_root(cwd))
                .unwrap_or_else(|| {
                    tracing::warn!("could not locate project root; using current directory");
                    cwd.to_path_buf()
                });
            ValidationConfig::for_root(root)
        }
    };

    if let Some(root) = root_override {
        plan.root = root.to_path_buf();
    }

    tracing::debug!(root = %plan.root.display(), pairs = plan.pairs.len(), "validation plan ready");
    Ok(plan)
}

/// Flush `out` after a handler ran. A failed flush is an error even when
/// the handler succeeded.
pub fn finish_output(result: Result<u8>, out: &mut dyn Write) -> Result<u8> {
    let code = result?;
    out.flush().context("failed to flush output")?;
    Ok(code)
}

/// Split a `KEY=VALUE` argument.
pub fn parse_key_value(arg: &str) -> Result<(String, String)> {
    let (key, value) = arg
        .split_once('=')
        .with_context(|| format!("expected KEY=VALUE, got {arg:?}"))?;
    let key = key.trim();
    anyhow::ensure!(!key.is_empty(), "empty key in {arg:?}");
    Ok((key.to_string(), value.to_string()))
}

/// Recursively list the files under `dir`, sorted. Missing directories
/// yield an empty list. Symlinks to directories are not followed.
pub fn list_files(dir: &Path) -> Vec<PathBuf> {
    let mut files = Vec::new();
    walk_files(dir, &mut files);
    files.sort();
    files
}

fn walk_files(dir: &Path, acc: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "skipping unreadable directory");
            return;
        }
    };
    for entry in entries {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %dir.display(), error = %e, "failed to read directory entry");
                continue;
            }
        };
        let path = entry.path();
        let file_type = match entry.file_type() {
            Ok(t) => t,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to stat entry");
                continue;
            }
        };
        if file_type.is_dir() {
            walk_files(&path, acc);
        } else if file_type.is_symlink() && path.is_dir() {
            tracing::debug!(path = %path.display(), "not following directory symlink");
        } else {
            acc.push(path);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_plan_prefers_explicit_root() {
        let dir = tempfile::tempdir().unwrap();
        let plan = load_plan(None, Some(Path::new("/srv/fw")), dir.path()).unwrap();
        assert_eq!(plan.root, PathBuf::from("/srv/fw"));
        assert_eq!(plan.pairs.len(), 2);
    }

    #[test]
    fn load_plan_finds_project_above_cwd() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("schemas")).unwrap();
        std::fs::create_dir_all(dir.path().join("data")).unwrap();
        let nested = dir.path().join("src");
        std::fs::create_dir_all(&nested).unwrap();

        if project_root_from_env().is_none() {
            let plan = load_plan(None, None, &nested).unwrap();
            assert_eq!(plan.root, dir.path().to_path_buf());
        }
    }

    #[test]
    fn load_plan_reads_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("wem.yaml");
        std::fs::write(
            &cfg,
            "root: fw\npairs:\n  - {label: AP, schema: s.json, data: d.json}\n",
        )
        .unwrap();
        let plan = load_plan(Some(&cfg), None, dir.path()).unwrap();
        assert_eq!(plan.root, dir.path().join("fw"));
        assert_eq!(plan.pairs.len(), 1);
    }

    #[test]
    fn load_plan_root_flag_beats_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = dir.path().join("wem.yaml");
        std::fs::write(&cfg, "root: fw\n").unwrap();
        let plan = load_plan(Some(&cfg), Some(Path::new("/elsewhere")), dir.path()).unwrap();
        assert_eq!(plan.root, PathBuf::from("/elsewhere"));
    }

    #[test]
    fn load_plan_missing_config_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_plan(Some(&dir.path().join("absent.yaml")), None, dir.path()).unwrap_err();
        assert!(format!("{err:#}").contains("absent.yaml"));
    }

    #[test]
    fn parse_key_value_splits_on_first_equals() {
        assert_eq!(
            parse_key_value("PROJECT_DATA_DIR=a=b").unwrap(),
            ("PROJECT_DATA_DIR".to_string(), "a=b".to_string())
        );
        assert_eq!(
            parse_key_value("EMPTY=").unwrap(),
            ("EMPTY".to_string(), String::new())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn list_files_is_recursive_and_sorted() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("environments.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("AP.json"), b"{}").unwrap();
        std::fs::write(dir.path().join("www").join("index.html"), b"<html>").unwrap();

        let files = list_files(dir.path());
        assert_eq!(files.len(), 3);
        assert!(files.windows(2).all(|w| w[0] < w[1]));
        assert!(files.iter().any(|p| p.ends_with("www/index.html")));
    }

    #[cfg(unix)]
    #[test]
    fn list_files_skips_directory_symlinks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("www")).unwrap();
        std::fs::write(dir.path().join("www").join("index.html"), b"<html>").unwrap();
        std::os::unix::fs::symlink(dir.path(), dir.path().join("www").join("loop")).unwrap();
        std::os::unix::fs::symlink(
            dir.path().join("www").join("index.html"),
            dir.path().join("home.html"),
        )
        .unwrap();

        let files = list_files(dir.path());
        assert_eq!(files.len(), 2);
        assert!(files.iter().any(|p| p.ends_with("home.html")));
        assert!(!files.iter().any(|p| p.ends_with("loop")));
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn finish_output_reports_flush_failure() {
        let err = finish_output(Ok(0), &mut BrokenPipe).unwrap_err();
        assert!(format!("{err:#}").contains("failed to flush output"));
    }

    #[test]
    fn finish_output_passes_code_through() {
        assert_eq!(finish_output(Ok(1), &mut Vec::new()).unwrap(), 1);
        assert!(finish_output(Err(anyhow::anyhow!("boom")), &mut Vec::new()).is_err());
    }

    #[test]
    fn list_files_missing_dir_is_empty() {
        assert!(list_files(Path::new("/tmp/wem-no-such-dir-xyz")).is_empty());
    }
}
