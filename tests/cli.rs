use std::io::Write;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::NamedTempFile;

const NODES: &str = r#"[
  {"name": "x1000c0s0b0n0", "state": "Ready", "memory": 256, "role": "Compute", "notes": ""},
  {"name": "x1000c0s1b0n0", "state": "Off", "memory": 128, "role": "Compute", "notes": ""},
  {"name": "x3000c0s1b0n0", "state": "Ready", "memory": 512, "role": "Management", "notes": ""}
]"#;

fn sat_report() -> Command {
    let mut cmd = Command::cargo_bin("sat-report").unwrap();
    for var in [
        "SAT_REPORT_FORMAT",
        "SAT_REPORT_NO_HEADINGS",
        "SAT_REPORT_NO_BORDERS",
        "SAT_REPORT_SHOW_EMPTY",
        "SAT_REPORT_SHOW_MISSING",
    ] {
        cmd.env_remove(var);
    }
    cmd
}

fn input_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn render_json(args: &[&str]) -> serde_json::Value {
    let file = input_file(NODES, ".json");
    let output = sat_report()
        .arg("render")
        .arg(file.path())
        .args(["--format", "json"])
        .args(args)
        .output()
        .unwrap();
    assert!(output.status.success());
    serde_json::from_slice(&output.stdout).unwrap()
}

fn names(document: &serde_json::Value) -> Vec<String> {
    document
        .as_array()
        .unwrap()
        .iter()
        .map(|row| row["name"].as_str().unwrap().to_string())
        .collect()
}

#[test]
fn test_render_table() {
    let file = input_file(NODES, ".json");
    sat_report()
        .arg("render")
        .arg(file.path())
        .args(["--title", "Nodes"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("#".repeat(80)))
        .stdout(predicate::str::contains("| name          | state | memory | role       |"))
        .stdout(predicate::str::contains("notes").not());
}

#[test]
fn test_render_filter_and_sort() {
    let document = render_json(&[
        "--filter",
        "state=ready",
        "--sort-by",
        "mem",
        "--reverse",
    ]);
    assert_eq!(names(&document), ["x3000c0s1b0n0", "x1000c0s0b0n0"]);
}

#[test]
fn test_sort_by_column_index() {
    let document = render_json(&["--sort-by", "2"]);
    assert_eq!(
        names(&document),
        ["x1000c0s1b0n0", "x1000c0s0b0n0", "x3000c0s1b0n0"]
    );

    let document = render_json(&["--sort-by", "2", "--reverse"]);
    assert_eq!(
        names(&document),
        ["x3000c0s1b0n0", "x1000c0s0b0n0", "x1000c0s1b0n0"]
    );
}

#[test]
fn test_repeated_filters_combine_with_and() {
    let document = render_json(&["--filter", "role=Compute", "--filter", "memory>200"]);
    assert_eq!(names(&document), ["x1000c0s0b0n0"]);
}

#[test]
fn test_or_filter() {
    let document = render_json(&["--filter", "state=Off or role=Man*"]);
    assert_eq!(names(&document), ["x1000c0s1b0n0", "x3000c0s1b0n0"]);
}

#[test]
fn test_unknown_filter_field_renders_nothing() {
    let document = render_json(&["--filter", "gpu=a100"]);
    assert_eq!(document, serde_json::json!([]));
}

#[test]
fn test_fields_and_show_empty() {
    let document = render_json(&["--fields", "name,notes"]);
    assert_eq!(document[0], serde_json::json!({"name": "x1000c0s0b0n0", "notes": "EMPTY"}));

    let document = render_json(&["--show-empty"]);
    assert_eq!(document[0]["notes"], "EMPTY");

    let document = render_json(&[]);
    assert!(document[0].get("notes").is_none());
}

#[test]
fn test_yaml_input_from_stdin() {
    sat_report()
        .args(["render", "-", "--format", "yaml"])
        .write_stdin("- name: a\n  color: red\n- name: b\n  color: blue\n")
        .assert()
        .success()
        .stdout("- name: a\n  color: red\n- name: b\n  color: blue\n");
}

#[test]
fn test_missing_keys_filled() {
    sat_report()
        .args(["render", "-", "--format", "json", "--show-missing"])
        .write_stdin(r#"[{"name": "a"}, {"name": "b", "slot": 3}]"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""slot": "MISSING""#));
}

#[test]
fn test_positional_rows_with_headings() {
    sat_report()
        .args(["render", "-", "--headings", "name,slot", "--no-borders"])
        .write_stdin("[[\"a\", 1], [\"b\", 2]]")
        .assert()
        .success()
        .stdout("name  slot\na     1\nb     2\n");
}

#[test]
fn test_titled_sections() {
    let file = input_file(
        "alpha:\n  - node: a1\n    state: up\nbeta:\n  - node: b1\n    state: down\n",
        ".yaml",
    );
    let output = sat_report()
        .arg("render")
        .arg(file.path())
        .args(["--format", "json", "--filter", "state=up"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let document: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(
        document,
        serde_json::json!({"alpha": [{"node": "a1", "state": "up"}], "beta": []})
    );
}

#[test]
fn test_format_from_environment() {
    let file = input_file(NODES, ".json");
    sat_report()
        .env("SAT_REPORT_FORMAT", "yaml")
        .env("SAT_REPORT_NO_HEADINGS", "1")
        .arg("render")
        .arg(file.path())
        .args(["--title", "Nodes", "--fields", "name"])
        .assert()
        .success()
        .stdout("- name: x1000c0s0b0n0\n- name: x1000c0s1b0n0\n- name: x3000c0s1b0n0\n");
}

#[test]
fn test_malformed_input_fails() {
    sat_report()
        .args(["render", "-"])
        .write_stdin("[{\"name\": ")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_missing_file_fails() {
    sat_report()
        .args(["render", "/nonexistent/nodes.json"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read"));
}

#[test]
fn test_explain() {
    sat_report()
        .args([
            "explain",
            "fruit=apple and baskets=2 or flower=rose",
            "--fields",
            "fruit,baskets,flower",
        ])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            r#"Filter: ((fruit = "apple" AND baskets = 2) OR flower = "rose")"#,
        ))
        .stdout(predicate::str::contains("Fields: baskets, flower, fruit"));
}

#[test]
fn test_explain_syntax_error() {
    sat_report()
        .args(["explain", "name="])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Syntax error"));
}

#[test]
fn test_resolve() {
    sat_report()
        .args(["resolve", "mem_cap", "name", "memory_capacity"])
        .assert()
        .success()
        .stdout("memory_capacity\n");

    sat_report()
        .args(["resolve", "zzz", "name"])
        .assert()
        .failure();
}
