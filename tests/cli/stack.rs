//! Tests for `sc stack` commands.

use crate::support::*;

fn with_stacks() -> Test {
    let t = Test::init();
    t.write(
        ".sc/stacks/base/server.yaml",
        "provisioner:\n  type: pulumi\n  config:\n    organization: ${secret:org}\n",
    );
    t.write(".sc/stacks/base/secrets.yaml", "values:\n  org: acme\n");
    t.write(
        ".sc/stacks/web/server.yaml",
        "provisioner:\n  inherit: base\n",
    );
    t.write(".sc/stacks/web/secrets.yaml", "inherit: base\n");
    t
}

#[test]
fn test_stack_list() {
    let t = with_stacks();
    let output = t.stack(&["list", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["stacks"], serde_json::json!(["base", "web"]));
}

#[test]
fn test_stack_list_empty() {
    let t = Test::new();
    let output = t.stack(&["list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "no stacks found");
}

#[test]
fn test_stack_resolve_json() {
    let t = with_stacks();
    let output = t.stack(&["resolve", "web", "--json"]);
    assert_success(&output);

    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["name"], "web");
    assert_eq!(json["server"]["provisioner"]["type"], "pulumi");
    assert_eq!(
        json["server"]["provisioner"]["config"]["organization"],
        "acme"
    );
}

#[test]
fn test_stack_resolve_reads_encrypted_secrets() {
    let t = with_stacks();
    assert_success(&t.secrets(&["add", ".sc/stacks/base/secrets.yaml"]));
    std::fs::remove_file(t.path(".sc/stacks/base/secrets.yaml")).unwrap();

    let output = t.stack(&["resolve", "web"]);
    assert_success(&output);
    assert_stdout_contains(&output, "organization: acme");
}

#[test]
fn test_stack_resolve_unknown() {
    let t = with_stacks();
    let output = t.stack(&["resolve", "missing"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "stack 'missing' not found");
}
