//! CLI integration tests

use std::process::Command;

fn hive(args: &[&str]) -> std::process::Output {
    Command::new("cargo")
        .args(["run", "-q", "-p", "hive-cli", "--"])
        .args(args)
        .env_remove("HIVE_API_URL")
        .env_remove("HIVE_ADMIN_PASSWORD")
        .output()
        .expect("Failed to execute command")
}

/// Test that the CLI shows help
#[test]
fn test_cli_help() {
    let output = hive(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI help should succeed");
    assert!(stdout.contains("H.I.V.E"), "Should show app name");
    assert!(stdout.contains("honeypot"), "Should show honeypot command");
    assert!(stdout.contains("port"), "Should show port command");
    assert!(stdout.contains("services"), "Should show services command");
    assert!(stdout.contains("validate"), "Should show validate command");
    assert!(stdout.contains("types"), "Should show types command");
}

/// Test that the CLI shows version
#[test]
fn test_cli_version() {
    let output = hive(&["--version"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "CLI version should succeed");
    assert!(stdout.contains("hive"), "Should show binary name");
}

/// Test honeypot create help
#[test]
fn test_honeypot_create_help() {
    let output = hive(&["honeypot", "create", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Create help should succeed");
    assert!(stdout.contains("--type"), "Should show type option");
    assert!(stdout.contains("--port"), "Should show port option");
    assert!(stdout.contains("--credential"), "Should show credential option");
    assert!(stdout.contains("--dry-run"), "Should show dry-run option");
    assert!(stdout.contains("--swap"), "Should show swap option");
}

/// Test services action help
#[test]
fn test_services_start_help() {
    let output = hive(&["services", "start", "--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success(), "Services start help should succeed");
    assert!(
        stdout.contains("--admin-password"),
        "Should show admin password option"
    );
    assert!(stdout.contains("HIVE_ADMIN_PASSWORD"), "Should show env var");
}

/// Test format and api-url options
#[test]
fn test_global_options() {
    let output = hive(&["--help"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(stdout.contains("--format"), "Should show format option");
    assert!(stdout.contains("table"), "Should show table format");
    assert!(stdout.contains("json"), "Should show json format");
    assert!(stdout.contains("--api-url"), "Should show api-url option");
    assert!(stdout.contains("HIVE_API_URL"), "Should show env var");
}

/// Dry-run validates locally without an API
#[test]
fn test_create_dry_run() {
    let output = hive(&[
        "honeypot",
        "create",
        "--type",
        "ssh",
        "--port",
        "2222",
        "--banner",
        "SSH-2.0-OpenSSH_8.9p1 Ubuntu",
        "-c",
        "admin:admin123",
        "-c",
        "root:toor1234",
        "-c",
        "guest:guest",
        "--dry-run",
    ]);

    assert!(output.status.success(), "Valid dry run should succeed");
}

/// Invalid submissions fail before any request is sent
#[test]
fn test_create_dry_run_rejects_invalid() {
    let output = hive(&[
        "honeypot",
        "create",
        "--type",
        "ftp",
        "--port",
        "30001",
        "--banner",
        "220 ready; rm",
        "-c",
        "admin:admin123",
        "--dry-run",
    ]);

    assert!(!output.status.success(), "Invalid dry run should fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("validation"), "Should report validation failure");
}

#[test]
fn test_validate_banner() {
    let ok = hive(&["validate", "banner", "--banner", "Welcome to the FTP service"]);
    assert!(ok.status.success());

    let bad = hive(&["validate", "banner", "--banner", "echo $HOME", "--sanitize"]);
    assert!(!bad.status.success());
    let stdout = String::from_utf8_lossy(&bad.stdout);
    assert!(stdout.contains("echo HOME"), "Should print sanitized banner");
}

#[test]
fn test_validate_resources_json() {
    let output = hive(&[
        "--format",
        "json",
        "validate",
        "resources",
        "--cpu-period",
        "abc",
        "--cpu-quota",
        "50000",
    ]);

    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("CPU period must be a number"));
}

#[test]
fn test_types() {
    let output = hive(&["types"]);
    let stdout = String::from_utf8_lossy(&output.stdout);

    assert!(output.status.success());
    assert!(stdout.contains("ssh"));
    assert!(stdout.contains("30000-30009"));
}

/// Test invalid command error handling
#[test]
fn test_invalid_command() {
    let output = hive(&["invalid-command"]);

    assert!(!output.status.success(), "Invalid command should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error") || stderr.contains("invalid"),
        "Should show error message"
    );
}

/// Test missing required argument error handling
#[test]
fn test_missing_admin_password() {
    let output = hive(&["services", "stop"]);

    assert!(!output.status.success(), "Missing password should fail");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("required") || stderr.contains("error"),
        "Should show error about missing argument"
    );
}
