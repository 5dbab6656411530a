// CLI tests: spawn the compiled binary against temp fixtures and
// assert on exit status, stdout and stderr.
use assert_cmd::prelude::*;
use assert_fs::prelude::*;
use predicates::prelude::*;
use serde_json::Value;
use std::process::Command;

// Helper: a small mixed-language tree with one broken file.
fn make_fixture() -> assert_fs::TempDir {
    let tmp = assert_fs::TempDir::new().expect("tempdir");
    tmp.child("src/app.js")
        .write_str(
            "function greet(name) {\n\
             \x20 return `hi ${name}`;\n\
             }\n\
             \n\
             function main() {\n\
             \x20 greet(\"a\");\n\
             }\n",
        )
        .expect("write app.js");
    tmp.child("scripts/run.py")
        .write_str("def main():\n    greet(\"b\")\n")
        .expect("write run.py");
    tmp.child("src/broken.ts")
        .write_str("function ( {\n  greet(\"c\");\n")
        .expect("write broken.ts");
    tmp
}

fn fnctx() -> Command {
    let mut cmd = Command::cargo_bin("fnctx").expect("bin");
    // Keep the environment from leaking config into tests
    cmd.env_remove("FNCTX_LOG");
    cmd
}

#[test]
fn analyze_json_reports_references_from_valid_files() {
    let tmp = make_fixture();

    let assert = fnctx()
        .args(["analyze", "greet", "--format", "json", "--quiet", "--path"])
        .arg(tmp.path())
        .assert()
        .success();

    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("utf8");
    let v: Value = serde_json::from_str(&stdout).expect("json");
    assert_eq!(v["functionName"], "greet");
    assert_eq!(v["count"], 2);

    let refs = v["references"].as_array().expect("references array");
    assert_eq!(refs.len(), 2);
    assert_eq!(refs[0]["enclosingScope"], "main");
    assert_eq!(refs[0]["location"]["line"], 2);
    assert!(refs[0]["location"]["filePath"]
        .as_str()
        .unwrap()
        .ends_with("run.py"));
    assert_eq!(refs[1]["location"]["line"], 6);
    assert_eq!(refs[1]["depth"], "logic");
}

#[test]
fn broken_file_is_warned_about_but_not_fatal() {
    let tmp = make_fixture();

    fnctx()
        .args(["analyze", "greet", "--format", "plain", "--quiet", "--no-color", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("src/app.js:6:2"))
        .stderr(predicate::str::contains("broken.ts"));
}

#[test]
fn markdown_snippet_output() {
    let tmp = make_fixture();

    fnctx()
        .args(["analyze", "greet", "--depth", "snippet", "--quiet", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("# `greet`"))
        .stdout(predicate::str::contains("```python\n    greet(\"b\")\n```"))
        .stdout(predicate::str::contains("```javascript\n  greet(\"a\");\n```"));
}

#[test]
fn batch_names_produce_summary_counters() {
    let tmp = make_fixture();

    let assert = fnctx()
        .args(["analyze", "greet", "missing", "--format", "json", "--quiet", "--path"])
        .arg(tmp.path())
        .assert()
        .success();

    let v: Value = serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(v["totalMatches"], 2);
    assert_eq!(v["filesMatched"], 2);
    assert_eq!(v["results"]["missing"]["count"], 0);
}

#[test]
fn output_file_and_summary() {
    let tmp = make_fixture();
    let out = tmp.child("out.md");

    fnctx()
        .args(["analyze", "greet", "--no-color", "--output"])
        .arg(out.path())
        .arg("--path")
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("2 references to `greet`"));

    out.assert(predicate::str::contains("In `main` (logic)"));
}

#[test]
fn config_file_sets_defaults_and_flags_override() {
    let tmp = make_fixture();
    tmp.child("fnctx.toml")
        .write_str("[analysis]\ndepth = \"module\"\n\n[output]\nformat = \"json\"\n")
        .unwrap();

    let assert = fnctx()
        .args(["analyze", "greet", "--quiet", "--path"])
        .arg(tmp.path())
        .assert()
        .success();
    let v: Value = serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(v["references"][0]["depth"], "module");

    fnctx()
        .args(["analyze", "greet", "--quiet", "--format", "plain", "--path"])
        .arg(tmp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("scripts/run.py:2:4\ndef main():"));
}

#[test]
fn exclude_flag_removes_files() {
    let tmp = make_fixture();

    let assert = fnctx()
        .args(["analyze", "greet", "--format", "json", "--quiet", "--exclude", "scripts/**", "--path"])
        .arg(tmp.path())
        .assert()
        .success();
    let v: Value = serde_json::from_slice(&assert.get_output().stdout).expect("json");
    assert_eq!(v["count"], 1);
}

#[test]
fn missing_root_fails() {
    let tmp = assert_fs::TempDir::new().unwrap();

    fnctx()
        .args(["analyze", "greet", "--path"])
        .arg(tmp.path().join("nope"))
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn invalid_config_value_fails() {
    let tmp = make_fixture();
    tmp.child("fnctx.toml")
        .write_str("[analysis]\nmax_lines = 0\n")
        .unwrap();

    fnctx()
        .args(["analyze", "greet", "--quiet", "--path"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_lines"));
}

#[test]
fn init_writes_config_once() {
    let tmp = assert_fs::TempDir::new().unwrap();

    fnctx()
        .args(["init", "--quiet"])
        .arg(tmp.path())
        .assert()
        .success();
    tmp.child("fnctx.toml")
        .assert(predicate::str::contains("[analysis]").and(predicate::str::contains("max_lines = 100")));

    fnctx()
        .args(["init", "--quiet"])
        .arg(tmp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn completions_to_stdout() {
    fnctx()
        .args(["completions", "bash", "--stdout"])
        .assert()
        .success()
        .stdout(predicate::str::contains("fnctx"));
}
