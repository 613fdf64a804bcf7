use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// `cm-e2e` isolated from any config in the working or home directory
fn cm_e2e(home: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("cm-e2e").unwrap();
    cmd.current_dir(home.path())
        .env("HOME", home.path())
        .env_remove("CM_E2E_PROJECT")
        .env_remove("CM_E2E_PROVIDER")
        .env_remove("KUBE_CONTEXT")
        .env_remove("CLOUDSDK_AUTH_ACCESS_TOKEN");
    cmd
}

#[test]
fn test_manifests_exposer_set() {
    let home = TempDir::new().unwrap();
    cm_e2e(&home)
        .args(["manifests", "--set", "exposer"])
        .assert()
        .success()
        .stdout(predicate::str::contains("name: metrics-exposer-1"))
        .stdout(predicate::str::contains("name: metrics-exposer-2"))
        .stdout(predicate::str::contains("--metric_value=448"))
        .stdout(predicate::str::contains("kind: Deployment").not());
}

#[test]
fn test_manifests_honour_config_file() {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join(".cm-e2e.toml"),
        "[cluster]\nnamespace = \"metrics-e2e\"\n\n[adapter]\nimage = \"example.com/adapter:test\"\n",
    )
    .unwrap();

    cm_e2e(&home)
        .args(["manifests", "--set", "adapter"])
        .assert()
        .success()
        .stdout(predicate::str::contains("namespace: metrics-e2e"))
        .stdout(predicate::str::contains("example.com/adapter:test"));
}

#[test]
fn test_run_skips_unsupported_provider() {
    let home = TempDir::new().unwrap();
    cm_e2e(&home)
        .args(["run", "--provider", "aws"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Skipping"));
}

#[test]
fn test_run_requires_project() {
    let home = TempDir::new().unwrap();
    cm_e2e(&home)
        .args(["run", "--provider", "gke"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("monitoring.project_id"));
}

#[test]
fn test_bad_config_is_reported() {
    let home = TempDir::new().unwrap();
    let path = home.path().join("broken.toml");
    std::fs::write(&path, "[test\nsettle_secs = ").unwrap();

    cm_e2e(&home)
        .args(["--config", path.to_str().unwrap(), "manifests"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("broken.toml"));
}

#[test]
fn test_exposer_help_lists_container_flags() {
    Command::cargo_bin("metrics-exposer")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("--pod_id"))
        .stdout(predicate::str::contains("--metric_name"))
        .stdout(predicate::str::contains("--metric_value"));
}

#[test]
fn test_exposer_rejects_zero_interval() {
    Command::cargo_bin("metrics-exposer")
        .unwrap()
        .args(["--pod_id=uid", "--interval-secs", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--interval-secs"));
}
