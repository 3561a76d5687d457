//! Error reporting and hints.

use crate::support::*;

#[test]
fn test_missing_profile_hints_init() {
    let t = Test::new();
    let output = t.secrets(&["list"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "profile 'default' not found");
    assert_stderr_contains(&output, "run: sc init");
}

#[test]
fn test_unregistered_reveal() {
    let t = Test::init();
    let output = t.secrets(&["reveal", "nope.txt"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "file nope.txt is not registered as secret");
}

#[test]
fn test_stranger_gets_allow_hint() {
    let t = Test::init();
    t.write("a.txt", "x");
    assert_success(&t.secrets(&["add", "a.txt"]));

    assert_success(&t.run(&["--profile", "other", "init", "--ed25519"]));
    let output = t.run(&["--profile", "other", "secrets", "decrypt", "--yes"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "is not found in secrets");
    assert_stderr_contains(&output, "sc secrets allow");
}

#[test]
fn test_invalid_public_key() {
    let t = Test::init();
    let output = t.secrets(&["allow", "ssh-rsa !!!"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "failed to parse public key");
}

#[test]
fn test_unknown_placeholder_kind() {
    let t = Test::init();
    t.write(
        ".sc/stacks/app/server.yaml",
        "provisioner:\n  type: pulumi\n  config:\n    x: ${vault:token}\n",
    );
    let output = t.stack(&["resolve", "app"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "unknown placeholder kind 'vault'");
}
