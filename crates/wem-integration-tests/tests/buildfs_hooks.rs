//! Integration tests: buildfs hook registration and the `wem buildfs` and
//! `wem resolve` handlers run against the shipped project tree.

use std::io::Write;
use std::path::PathBuf;

use wem_cli::buildfs::{run_buildfs, BuildfsArgs};
use wem_cli::resolve::{run_access_point, run_resolve, ResolveArgs};
use wem_hooks::{
    register_buildfs_hooks, BuildEnvironment, LocalBuildEnvironment, Phase, BUILDFS_STEP,
    PROJECT_DATA_DIR,
};
use wem_schema::ValidationConfig;

fn repo_root() -> PathBuf {
    let mut dir = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    dir.pop();
    dir.pop();
    dir
}

#[test]
fn hooks_fire_once_around_the_step() {
    let mut env = LocalBuildEnvironment::new().with_var(PROJECT_DATA_DIR, "/fw/data");
    register_buildfs_hooks(&mut env);
    assert_eq!(env.get(PROJECT_DATA_DIR).as_deref(), Some("/fw/data"));
    assert_eq!(env.action_count(BUILDFS_STEP, Phase::Pre), 1);
    assert_eq!(env.action_count(BUILDFS_STEP, Phase::Post), 1);

    let mut out = Vec::new();
    env.run_step(BUILDFS_STEP, &[], &[], &mut out, |out| {
        writeln!(out, "packing")?;
        Ok(())
    })
    .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "before_buildfs /fw/data\npacking\nafter_buildfs /fw/data\n"
    );
}

#[test]
fn unset_data_dir_does_not_fail_the_step() {
    let mut env = LocalBuildEnvironment::new();
    register_buildfs_hooks(&mut env);
    let mut out = Vec::new();
    env.run_step(BUILDFS_STEP, &[], &[], &mut out, |_| Ok(()))
        .unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "before_buildfs <unset>\nafter_buildfs <unset>\n"
    );
}

#[test]
fn buildfs_lists_shipped_data_files() {
    let mut out = Vec::new();
    let code = run_buildfs(
        &BuildfsArgs::default(),
        &repo_root(),
        Some("data".to_string()),
        &mut out,
    )
    .unwrap();
    assert_eq!(code, 0);

    let output = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = output.lines().collect();
    assert_eq!(lines.first(), Some(&"before_buildfs data"));
    assert_eq!(lines.last(), Some(&"after_buildfs data"));
    assert!(lines.contains(&"  AP.json"));
    assert!(lines.contains(&"  environments.json"));
}

#[test]
fn resolve_shipped_workshop_network() {
    let args = ResolveArgs {
        ssid: "Workshop".to_string(),
        mac: "de:ad:be:ef:00:01".to_string(),
    };
    let mut out = Vec::new();
    let code = run_resolve(&args, &ValidationConfig::for_root(repo_root()), &mut out).unwrap();
    assert_eq!(code, 0);

    let station: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(station["ssid"], "Workshop");
    assert_eq!(station["local_ip"], "10.10.0.50");
    assert_eq!(station["subnet"], "255.255.0.0");
}

#[test]
fn access_point_shipped_settings() {
    let mut out = Vec::new();
    let code = run_access_point(&ValidationConfig::for_root(repo_root()), &mut out).unwrap();
    assert_eq!(code, 0);

    let ap: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(ap["ssid"], "wem-setup");
    assert_eq!(ap["channel"], 6);
}
