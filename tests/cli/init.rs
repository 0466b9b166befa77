use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::Value;

use crate::CliTest;

/// Checks the generated config parses and carries every required field.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert!(parsed.pointer("/source/api_url").is_some());
    assert!(parsed.pointer("/target/api_url").is_some());
    assert!(parsed.pointer("/target/keys").is_some());
    assert!(content.ends_with('\n'));

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created ca-migrate.json

    ----- stderr -----
    ");

    let content = test.read_file("ca-migrate.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_custom_path() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().args(["init", "migration.json"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ Created migration.json

    ----- stderr -----
    ");

    assert!(test.root().join("migration.json").exists());
    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::with_file("ca-migrate.json", "{}")?;

    assert_cmd_snapshot!(test.command().arg("init"), @r"
    success: false
    exit_code: 3
    ----- stdout -----

    ----- stderr -----
    Error: ca-migrate.json already exists
    ");

    assert_eq!(test.read_file("ca-migrate.json")?, "{}");
    Ok(())
}
