mod support;

use predicates::str::contains;
use serde_json::{json, Value};

use support::TestEnv;

#[test]
fn export_then_import_into_empty_store() {
    let source = TestEnv::new();
    let id = source.add_task("Buy milk");
    source.add_task("Walk dog");
    source.json(&["note", &id, "oat", "milk"]);

    let exported = source.json(&["export", "--out", "backup.json"]);
    assert_eq!(exported["data"]["counts"]["tasks"], 2);
    let backup = source.path().join("backup.json");
    assert!(backup.is_file());

    let document: Value =
        serde_json::from_str(&std::fs::read_to_string(&backup).unwrap()).unwrap();
    assert_eq!(document["version"], "2");
    assert!(document["exportedAt"].is_string());

    let target = TestEnv::new();
    let imported = target.json(&["import", backup.to_str().unwrap()]);
    assert_eq!(imported["data"]["imported"], 2);
    assert_eq!(imported["data"]["skippedExisting"], 0);

    let listed = target.json(&["list"]);
    assert_eq!(listed["data"]["counts"]["total"], 2);
    let shown = target.json(&["show", &id]);
    assert_eq!(shown["data"]["task"]["notes"][0]["text"], "oat milk");
}

#[test]
fn import_keeps_existing_records() {
    let env = TestEnv::new();
    let id = env.add_task("Original title");
    env.json(&["export", "-o", "backup.json"]);
    env.json(&["edit", &id, "--title", "Edited title"]);

    let imported = env.json(&["import", "backup.json"]);
    assert_eq!(imported["data"]["imported"], 0);
    assert_eq!(imported["data"]["skippedExisting"], 1);

    let shown = env.json(&["show", &id]);
    assert_eq!(shown["data"]["task"]["title"], "Edited title");
}

#[test]
fn import_accepts_legacy_array_and_reports_rejections() {
    let env = TestEnv::new();
    let file = env.write_file(
        "legacy.json",
        &json!([
            { "id": 1700000000000u64, "title": "Old style", "completed": true,
              "createdAt": 1700000000000u64 },
            { "id": "abc", "title": "Pending one", "status": "pending" },
            { "title": "No id" }
        ])
        .to_string(),
    );

    let imported = env.json(&["import", file.to_str().unwrap()]);
    assert_eq!(imported["data"]["imported"], 2);
    let rejected = imported["data"]["rejected"].as_array().unwrap();
    assert_eq!(rejected.len(), 1);
    assert_eq!(rejected[0]["collection"], "tasks");
    assert_eq!(rejected[0]["index"], 2);
    assert_eq!(rejected[0]["reason"], "missing id");

    let listed = env.json(&["list", "--filter", "done"]);
    assert_eq!(listed["data"]["tasks"][0]["title"], "Old style");
    let todo = env.json(&["list", "--filter", "todo"]);
    assert_eq!(todo["data"]["tasks"][0]["title"], "Pending one");
}

#[test]
fn import_rejects_malformed_files() {
    let env = TestEnv::new();
    let bad = env.write_file("bad.json", "{ not json");
    env.cmd()
        .args(["import", bad.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(contains("Import parse error"));

    let empty = env.write_file("empty.json", "[]");
    env.cmd()
        .args(["import", empty.to_str().unwrap()])
        .assert()
        .code(2)
        .stderr(contains("no tasks found"));

    env.cmd()
        .args(["import", "missing.json"])
        .assert()
        .code(2)
        .stderr(contains("import file not found"));
}

#[test]
fn export_to_stdout_and_import_from_stdin() {
    let source = TestEnv::new();
    source.add_task("Piped task");
    let output = source
        .cmd()
        .args(["export", "--out", "-"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let document: Value = serde_json::from_slice(&output).expect("export json");
    assert_eq!(document["counts"]["tasks"], 1);

    let target = TestEnv::new();
    target
        .cmd()
        .args(["import", "-", "--json"])
        .write_stdin(output)
        .assert()
        .success()
        .stdout(contains("\"imported\": 1"));
}

#[test]
fn export_defaults_to_dated_file_name() {
    let env = TestEnv::new();
    env.add_task("Backed up");
    let exported = env.json(&["export"]);
    let path = exported["data"]["path"].as_str().unwrap();
    assert!(path.starts_with("todomaster-backup-"));
    assert!(path.ends_with(".json"));
    assert!(env.path().join(path).is_file());
}
