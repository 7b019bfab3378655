use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

const BIN: &str = env!("CARGO_BIN_EXE_schema-snapshot");

/// Minimal config with one schema, written next to its output directories.
fn write_config(dir: &Path) -> PathBuf {
    let yaml = r#"version: "1.0"
snapshots_dir: generated
single_dir: generated/types
schemas:
  - name: Orders
    snapshot_alias: OrderSnapshot
    units:
      - { key: id, kind: number }
      - key: customer
        kind: recursive
        values:
          - { key: name, kind: string }
          - { key: email, required: false, kind: [string, "null"] }
"#;
    let path = dir.join("snapshots.yml");
    fs::write(&path, yaml).expect("failed to write config");
    path
}

fn run(config: &Path, args: &[&str]) -> Output {
    run_with_stdin(config, args, None)
}

fn run_with_stdin(config: &Path, args: &[&str], stdin: Option<&str>) -> Output {
    let mut child = Command::new(BIN)
        .args(args)
        .arg("--config")
        .arg(config)
        .stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to run schema-snapshot");

    if let Some(text) = stdin {
        let mut pipe = child.stdin.take().expect("stdin is piped");
        pipe.write_all(text.as_bytes()).expect("failed to write stdin");
    }
    child.wait_with_output().expect("failed to wait for schema-snapshot")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

fn listed_hashes(config: &Path) -> Vec<String> {
    let out = run(config, &["list", "--schema", "Orders"]);
    assert!(out.status.success(), "list failed: {}", stderr(&out));
    stdout(&out)
        .lines()
        .filter(|line| line.contains("  "))
        .filter_map(|line| line.split_whitespace().next().map(String::from))
        .collect()
}

// ---------------------------------------------------------------------------
// Snapshot lifecycle
// ---------------------------------------------------------------------------

#[test]
fn create_snapshot_then_duplicate_is_a_noop() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["create-snapshot", "--schema", "Orders", "--title", "v1"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Created a snapshot for schema \"Orders\""));

    let artifact = dir.path().join("generated/OrderSnapshot_snapshot.ts");
    let text = fs::read_to_string(&artifact).unwrap();
    assert!(text.starts_with("export type OrderSnapshot = {"));
    assert!(text.contains("title: \"v1\";"));

    let out = run(&config, &["create-snapshot", "--schema", "Orders", "--title", "v2"]);
    assert!(out.status.success());
    assert!(stdout(&out).contains("already exists"));
    assert_eq!(fs::read_to_string(&artifact).unwrap(), text);
}

#[test]
fn delete_snapshot_by_hash() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["create-snapshot", "--schema", "Orders", "--title", "v1"]);
    assert!(out.status.success());

    let hashes = listed_hashes(&config);
    assert_eq!(hashes.len(), 1);
    assert_eq!(hashes[0].len(), 64);

    let out = run(&config, &["delete-snapshot", "--schema", "Orders", "--hash", &hashes[0]]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Deleted snapshot"));

    let artifact = dir.path().join("generated/OrderSnapshot_snapshot.ts");
    assert_eq!(fs::read_to_string(artifact).unwrap(), "");
    assert!(stdout(&run(&config, &["list", "--schema", "Orders"])).contains("No snapshots"));
}

#[test]
fn delete_unknown_hash_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["delete-snapshot", "--schema", "Orders", "--hash", "abc123"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error: Snapshot with hash abc123 was not found"));
    assert!(!dir.path().join("generated/OrderSnapshot_snapshot.ts").exists());
}

// ---------------------------------------------------------------------------
// Prompts
// ---------------------------------------------------------------------------

#[test]
fn missing_title_is_prompted() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run_with_stdin(
        &config,
        &["create-snapshot", "--schema", "Orders"],
        Some("\nfrom prompt\n"),
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Insert the title of a snapshot"));
    assert!(stdout(&out).contains("title: \"from prompt\""));
}

#[test]
fn closed_stdin_fails_prompt() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["create-snapshot", "--schema", "Orders"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("error: no answer given"));
}

#[test]
fn hash_prompt_rejects_unknown_hashes() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    run(&config, &["create-snapshot", "--schema", "Orders", "--title", "v1"]);
    let hash = listed_hashes(&config).remove(0);

    let answers = format!("nope\n{hash}\n");
    let out = run_with_stdin(
        &config,
        &["delete-snapshot", "--schema", "Orders"],
        Some(&answers),
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stderr(&out).contains("Snapshot with hash nope was not found"));
    assert!(listed_hashes(&config).is_empty());
}

// ---------------------------------------------------------------------------
// Single type, init and inspect
// ---------------------------------------------------------------------------

#[test]
fn init_writes_single_type_and_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["init", "--schema", "Orders", "--title", "first"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));

    let single = fs::read_to_string(dir.path().join("generated/types/Orders.ts")).unwrap();
    assert_eq!(
        single,
        "export interface Orders {
    id: number;
    customer: {
        name: string;
        email?: string | null;
    };
}
"
    );
    assert_eq!(listed_hashes(&config).len(), 1);
}

#[test]
fn inspect_replaces_snapshots_from_samples() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    run(&config, &["create-snapshot", "--schema", "Orders", "--title", "v1"]);

    let data = dir.path().join("samples.json");
    fs::write(
        &data,
        r#"[
            {"id": 1, "placed": "2024-01-15T10:30:00Z"},
            {"id": 2, "placed": "2024-02-01T08:00:00Z"},
            {"id": "A-3", "tags": ["x"]}
        ]"#,
    )
    .unwrap();

    let out = run(
        &config,
        &["inspect", "--schema", "Orders", "--data", data.to_str().unwrap()],
    );
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Created 2 snapshot(s)"));

    let list = stdout(&run(&config, &["list", "--schema", "Orders"]));
    assert_eq!(list.matches("Inspected").count(), 2);
    assert!(!list.contains("v1"));
}

#[test]
fn inspect_rejects_non_object_samples() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let data = dir.path().join("samples.json");
    fs::write(&data, "[1, 2]").unwrap();

    let out = run(
        &config,
        &["inspect", "--schema", "Orders", "--data", data.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("inspect source failed"));
}

#[test]
fn inspect_reports_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let data = dir.path().join("samples.json");
    fs::write(&data, "[{\"id\": 1,").unwrap();

    let out = run(
        &config,
        &["inspect", "--schema", "Orders", "--data", data.to_str().unwrap()],
    );
    assert!(!out.status.success());
    assert!(stderr(&out).contains("inspect source failed: JSON error"));
    assert!(!dir.path().join("generated/OrderSnapshot_snapshot.ts").exists());
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn unknown_schema_lists_available() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());

    let out = run(&config, &["create-single", "--schema", "Nope"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("unknown schema Nope; available: Orders"));
}

#[test]
fn validate_reports_unit_problems() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_config(dir.path());
    let out = run(&config, &["validate"]);
    assert!(out.status.success(), "stderr: {}", stderr(&out));
    assert!(stdout(&out).contains("Validated 1 schema(s)."));

    let broken = dir.path().join("broken.yml");
    fs::write(
        &broken,
        r#"version: "1.0"
snapshots_dir: out
single_dir: out
schemas:
  - name: Dupes
    units:
      - { key: a, kind: string }
      - { key: a, kind: number }
"#,
    )
    .unwrap();
    let out = run(&broken, &["validate"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("1 problem(s) found"));
}

#[test]
fn missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let out = run(&dir.path().join("absent.yml"), &["list", "--schema", "Orders"]);
    assert!(!out.status.success());
    assert!(stderr(&out).contains("Failed to load config"));
}
