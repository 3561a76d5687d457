//! Tests for `sc secrets` commands.

use crate::support::*;

#[test]
fn test_add_list_and_reveal() {
    let t = Test::init();
    t.write("config/.env", "TOKEN=abc\n");

    let output = t.secrets(&["add", "config/.env"]);
    assert_success(&output);
    assert_stdout_contains(&output, "added config/.env");
    assert!(t.exists(".sc/secrets.yaml"));
    assert!(t.read(".gitignore").lines().any(|l| l == "config/.env"));

    let output = t.secrets(&["list"]);
    assert_success(&output);
    assert_stdout_contains(&output, "config/.env");

    let output = t.secrets(&["reveal", "config/.env"]);
    assert_success(&output);
    assert_eq!(stdout(&output), "TOKEN=abc\n");
}

#[test]
fn test_list_json() {
    let t = Test::init();
    t.write("a.txt", "a");
    assert_success(&t.secrets(&["add", "a.txt"]));

    let output = t.secrets(&["list", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 1);
    assert_eq!(json["files"][0], "a.txt");
}

#[test]
fn test_decrypt_restores_deleted_file() {
    let t = Test::init();
    t.write("a.txt", "hello");
    assert_success(&t.secrets(&["add", "a.txt"]));

    std::fs::remove_file(t.path("a.txt")).unwrap();
    let output = t.secrets(&["decrypt", "--yes"]);
    assert_success(&output);
    assert_eq!(t.read("a.txt"), "hello");
}

#[test]
fn test_encrypt_with_yes_accepts_changes() {
    let t = Test::init();
    t.write("a.txt", "v1");
    assert_success(&t.secrets(&["add", "a.txt"]));

    t.write("a.txt", "v2");
    assert_success(&t.secrets(&["encrypt", "--yes"]));

    t.write("a.txt", "local");
    assert_success(&t.secrets(&["decrypt", "--yes"]));
    assert_eq!(t.read("a.txt"), "v2");
}

#[test]
fn test_delete_unregisters() {
    let t = Test::init();
    t.write("a.txt", "a");
    t.write("b.txt", "b");
    assert_success(&t.secrets(&["add", "a.txt", "b.txt"]));

    let output = t.secrets(&["delete", "a.txt"]);
    assert_success(&output);
    assert!(t.exists("a.txt"));

    let ignore = t.read(".gitignore");
    assert!(!ignore.lines().any(|l| l == "a.txt"));
    assert!(ignore.lines().any(|l| l == "b.txt"));

    let output = t.secrets(&["reveal", "a.txt"]);
    assert_failure(&output);
    assert_stderr_contains(&output, "not registered");
}

#[test]
fn test_allow_and_disallow_keys() {
    let t = Test::init();
    t.write("a.txt", "shared");
    assert_success(&t.secrets(&["add", "a.txt"]));
    let teammate = ed25519_keys();

    let output = t.secrets(&["allow", &format!("{} bob@laptop", teammate.public)]);
    assert_success(&output);
    assert_stdout_contains(&output, "allowed ssh-ed25519");

    let output = t.secrets(&["keys", "--json"]);
    assert_success(&output);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["count"], 2);

    let bob = cryptor(t.dir.path(), &teammate);
    assert_eq!(
        bob.get_and_decrypt_file_content("a.txt").unwrap().as_slice(),
        b"shared"
    );

    assert_success(&t.secrets(&["disallow", &teammate.public]));
    let output = t.secrets(&["keys"]);
    assert_success(&output);
    assert_stdout_contains(&output, "1 trusted keys");
    assert_stdout_contains(&output, "(you)");
}

#[test]
fn test_disallow_own_key_fails() {
    let t = Test::init();
    let output = t.secrets(&["disallow", &t.public_key()]);
    assert_failure(&output);
    assert_stderr_contains(&output, "refusing to remove the current public key");
}

#[test]
fn test_add_from_subdirectory() {
    let t = Test::init();
    t.write("nested/dir/secret.txt", "deep");

    let output = t
        .cmd()
        .current_dir(t.path("nested/dir"))
        .args(["secrets", "add", "secret.txt"])
        .output()
        .unwrap();
    assert_success(&output);

    let output = t.secrets(&["list", "--json"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["files"][0], "nested/dir/secret.txt");
}
