//! Integration tests for the tfclean CLI
//!
//! These tests run the built binary against files in a temporary directory.

use std::fs;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;

const GENERATED: &str = r#"# __generated__ by Terraform from "i-0abc"
resource "aws_instance" "web" {
  ami                     = "ami-0123"
  cpu_core_count          = 0
  ipv6_address_count      = 0
  ipv6_addresses          = []
  key_name                = null
  tags                    = {}
  launch_template {
    id   = "lt-0abc"
    name = "web"
  }
}

resource "aws_lb_target_group" "web" {
  port = 80
  target_failover {
  }
  target_health_state {
  }
}
"#;

const CLEANED: &str = r#"# __generated__ by Terraform from "i-0abc"
resource "aws_instance" "web" {
  ami                     = "ami-0123"
  launch_template {
    name = "web"
  }
}

resource "aws_lb_target_group" "web" {
  port = 80
}
"#;

/// Get the path to the tfclean binary
fn tfclean_binary() -> std::path::PathBuf {
    let mut path = std::env::current_exe().unwrap();
    path.pop(); // Remove test executable name
    path.pop(); // Remove deps directory

    // In debug mode, binary is at target/debug/tfclean
    path.push("tfclean");

    if cfg!(windows) {
        path.set_extension("exe");
    }

    path
}

/// Run tfclean in `dir` and return output
fn run_tfclean(dir: &Path, args: &[&str]) -> std::process::Output {
    Command::new(tfclean_binary())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("TFCLEAN_CONFIG")
        .output()
        .expect("Failed to execute tfclean")
}

#[test]
fn test_tfclean_version() {
    let dir = TempDir::new().unwrap();
    let output = run_tfclean(dir.path(), &["--version"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("tfclean"));
}

#[test]
fn test_tfclean_help() {
    let dir = TempDir::new().unwrap();
    let output = run_tfclean(dir.path(), &["--help"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"));
    assert!(stdout.contains("clean"));
    assert!(stdout.contains("rules"));
}

#[test]
fn test_clean_rewrites_file_in_place() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("dev_eu-west-1_ec2_.tf");
    fs::write(&file, GENERATED).unwrap();

    let output = run_tfclean(dir.path(), &["clean", "dev_eu-west-1_ec2_.tf"]);

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(fs::read_to_string(&file).unwrap(), CLEANED);

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Cleaned 1 file"));
}

#[test]
fn test_clean_dry_run_leaves_file() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("generated.tf");
    fs::write(&file, GENERATED).unwrap();

    let output = run_tfclean(dir.path(), &["clean", "--dry-run", "generated.tf"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), CLEANED);
    assert_eq!(fs::read_to_string(&file).unwrap(), GENERATED);
}

#[test]
fn test_clean_to_output_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("generated.tf");
    fs::write(&input, GENERATED).unwrap();

    let output = run_tfclean(
        dir.path(),
        &["clean", "generated.tf", "--output", "cleaned/main.tf"],
    );

    assert!(output.status.success());
    assert_eq!(fs::read_to_string(&input).unwrap(), GENERATED);
    assert_eq!(
        fs::read_to_string(dir.path().join("cleaned/main.tf")).unwrap(),
        CLEANED
    );
}

#[test]
fn test_clean_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_tfclean(dir.path(), &["clean", "missing.tf"]);

    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("File not found"));
    assert!(!stderr.contains("panicked"));
}

#[test]
fn test_strict_blocks_from_config_file() {
    let dir = TempDir::new().unwrap();
    let input = "resource \"aws_ebs_volume\" \"v\" {\n  throughput = 0\n}\n\nlocals {\n  retries = 0\n}\n";
    fs::write(dir.path().join("main.tf"), input).unwrap();
    fs::write(
        dir.path().join(".tfclean.yaml"),
        "block_closing: top-level-brace\n",
    )
    .unwrap();

    let output = run_tfclean(dir.path(), &["clean", "main.tf"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("main.tf")).unwrap(),
        "resource \"aws_ebs_volume\" \"v\" {\n}\n\nlocals {\n  retries = 0\n}\n"
    );
}

#[test]
fn test_legacy_blocks_never_close() {
    let dir = TempDir::new().unwrap();
    let input = "resource \"aws_ebs_volume\" \"v\" {\n  throughput = 0\n}\n\nlocals {\n  retries = 0\n}\n";
    fs::write(dir.path().join("main.tf"), input).unwrap();

    let output = run_tfclean(dir.path(), &["clean", "main.tf"]);

    assert!(output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("main.tf")).unwrap(),
        "resource \"aws_ebs_volume\" \"v\" {\n}\n\nlocals {\n}\n"
    );
}

#[test]
fn test_invalid_config_fails() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("main.tf"), GENERATED).unwrap();
    fs::write(dir.path().join(".tfclean.yaml"), "block_closing: depth\n").unwrap();

    let output = run_tfclean(dir.path(), &["clean", "main.tf"]);

    assert!(!output.status.success());
    assert_eq!(
        fs::read_to_string(dir.path().join("main.tf")).unwrap(),
        GENERATED
    );
}

#[test]
fn test_rules_json() {
    let dir = TempDir::new().unwrap();
    let output = run_tfclean(dir.path(), &["rules", "--json"]);

    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"scope\": \"global\""));
    assert!(stdout.contains("aws_route53_record"));
}

#[test]
fn test_rules_unknown_type_fails() {
    let dir = TempDir::new().unwrap();
    let output = run_tfclean(dir.path(), &["rules", "--resource-type", "aws_s3_bucket"]);

    assert!(!output.status.success());
}
