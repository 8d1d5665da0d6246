use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::fs;
use std::path::Path;
use tempfile::{tempdir, TempDir};

fn write(root: &Path, rel: &str, body: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, body).unwrap();
}

#[allow(deprecated)]
fn agentlint() -> Command {
    let mut cmd = Command::cargo_bin("agentlint").expect("binary");
    cmd.arg("--quiet");
    cmd
}

fn healthy_tree() -> TempDir {
    let temp = tempdir().unwrap();
    let root = temp.path();
    write(
        root,
        "commands/deploy.md",
        "---\nallowed-tools: Task\n---\nRun Task(deployer) then Task(general-purpose)\n",
    );
    write(root, "agents/deployer.md", "**Skill**: release-notes\n");
    write(root, "skills/release-notes/SKILL.md", "Write the notes.\n");
    temp
}

#[test]
fn clean_tree_passes() {
    let temp = healthy_tree();
    agentlint()
        .arg("check")
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("ok: 3 components, 3 passed, 0 failed"));
}

#[test]
fn missing_agent_fails_with_json_report() {
    let temp = healthy_tree();
    write(temp.path(), "agents/router.md", "Delegate with Task(ghost-writer)\n");

    let output = agentlint()
        .args(["check", "--format", "json"])
        .arg(temp.path())
        .output()
        .expect("run");
    assert_eq!(output.status.code(), Some(1));

    let report: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert_eq!(report["summary"]["failed"], 1);
    let router = report["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == "router")
        .expect("router result");
    assert_eq!(router["success"], false);
    assert_eq!(router["diagnostics"][0]["rule"], "missing-agent");
    assert_eq!(
        router["diagnostics"][0]["suggested_path"],
        "agents/ghost-writer.md"
    );
}

#[test]
fn fail_on_threshold_comes_from_config() {
    let temp = healthy_tree();
    write(temp.path(), "skills/unused/SKILL.md", "nobody loads me\n");

    agentlint().arg("check").arg(temp.path()).assert().success();

    write(temp.path(), "agentlint.toml", "fail_on = \"info\"\n");
    agentlint()
        .arg("check")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("info[orphan-skill]"));
}

#[test]
fn builtin_agents_extend_from_config() {
    let temp = healthy_tree();
    write(temp.path(), "agents/router.md", "Task(team-bot)\n");
    agentlint().arg("check").arg(temp.path()).assert().code(1);

    write(temp.path(), "agentlint.toml", "builtin_agents = [\"team-bot\"]\n");
    agentlint().arg("check").arg(temp.path()).assert().success();
}

#[test]
fn invalid_config_is_reported() {
    let temp = healthy_tree();
    write(temp.path(), "agentlint.toml", "fail_on = \"fatal\"\n");
    agentlint()
        .arg("check")
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown severity 'fatal'"));
}

#[test]
fn cycles_are_listed() {
    let temp = tempdir().unwrap();
    write(temp.path(), "agents/a.md", "Task(b)\n");
    write(temp.path(), "agents/b.md", "Task(a)\n");

    agentlint()
        .arg("cycles")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("agent:a -> agent:b -> agent:a"));

    agentlint()
        .arg("check")
        .arg(temp.path())
        .assert()
        .code(1)
        .stdout(predicate::str::contains("delegation-cycle"));
}

#[test]
fn trace_prints_tree() {
    let temp = healthy_tree();
    agentlint()
        .args(["trace", "command:deploy"])
        .arg(temp.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("command:deploy (commands/deploy.md"))
        .stdout(predicate::str::contains("└── agent:deployer"))
        .stdout(predicate::str::contains("    └── skill:release-notes"));
}

#[test]
fn trace_unknown_root_is_an_error() {
    let temp = healthy_tree();
    agentlint()
        .args(["trace", "agent:nobody"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("agent:nobody not found"));

    agentlint()
        .args(["trace", "nonsense"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected kind:name"));
}

#[test]
fn schema_describes_report() {
    let output = agentlint().arg("schema").output().expect("run");
    assert!(output.status.success());
    let schema: Value = serde_json::from_slice(&output.stdout).expect("valid json");
    assert!(schema["properties"]["results"].is_object());
    assert!(schema["properties"]["summary"].is_object());
}
