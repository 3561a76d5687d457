//! Tests for `sc init` and `sc completions`.

use predicates::prelude::*;

use crate::support::*;

#[test]
fn test_init_writes_profile_and_ignores_it() {
    let t = Test::new();

    let output = t.init_cmd(&["--ed25519", "--project", "demo"]);
    assert_success(&output);
    assert_stdout_contains(&output, "initialized profile");
    assert_stdout_contains(&output, "ssh-ed25519 ");

    let profile = t.read(".sc/cfg.default.yaml");
    assert!(profile.contains("projectName: demo"));
    assert!(profile.contains("privateKey:"));
    assert!(t.public_key().starts_with("ssh-ed25519 "));

    let ignore = t.read(".gitignore");
    assert!(ignore.lines().any(|l| l == ".sc/cfg.*.yaml"));
}

#[test]
fn test_init_rsa_profile() {
    let t = Test::new();
    assert_success(&t.init_cmd(&["--bits", "2048"]));
    assert!(t.public_key().starts_with("ssh-rsa "));
}

#[test]
fn test_init_named_profile() {
    let t = Test::new();
    assert_success(&t.run(&["--profile", "ci", "init", "--ed25519"]));
    assert!(t.exists(".sc/cfg.ci.yaml"));
    assert!(!t.exists(".sc/cfg.default.yaml"));
}

#[test]
fn test_init_twice_requires_force() {
    let t = Test::init();
    let first = t.public_key();

    let output = t.init_cmd(&["--ed25519"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "profile 'default' already exists");

    assert_success(&t.init_cmd(&["--ed25519", "--force"]));
    assert_ne!(t.public_key(), first);
}

#[test]
fn test_init_rejects_small_rsa() {
    let t = Test::new();
    let output = t.init_cmd(&["--bits", "1024"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "too small");
}

#[test]
fn test_completions_bash() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("_sc()"))
        .stdout(predicate::str::contains("secrets"));
}

#[test]
fn test_completions_cover_subcommands() {
    let t = Test::new();
    t.cmd()
        .args(["completions", "zsh"])
        .assert()
        .success()
        .stdout(predicate::str::contains("#compdef sc"))
        .stdout(predicate::str::contains("disallow"))
        .stdout(predicate::str::contains("resolve"));
}

#[test]
fn test_init_outside_repository_fails() {
    let t = Test::new();
    std::fs::remove_dir_all(t.path(".git")).unwrap();
    t.cmd()
        .args(["init", "--ed25519"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a git repository"));
}
