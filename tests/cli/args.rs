use anyhow::Result;
use insta_cmd::assert_cmd_snapshot;

use crate::CliTest;

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = test.command().output()?;

    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage:"), "stdout: {}", stdout);
    assert!(stdout.contains("run"));
    assert!(stdout.contains("init"));
    Ok(())
}

#[test]
fn test_missing_source_user() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.command().args(["run", "-p", "a", "-P", "b"]), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    ✘ error: Source username is required
    ");

    Ok(())
}

#[test]
fn test_missing_target_password() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(
        test.command().args(["run", "-u", "src", "-p", "a", "-U", "tgt"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    ✘ error: Target password is required
    "
    );

    Ok(())
}

#[test]
fn test_password_from_environment() -> Result<()> {
    let test = CliTest::new()?;

    // Gets past the credential checks and stops at the missing config file.
    assert_cmd_snapshot!(
        test.command()
            .env("CA_MIGRATE_SOURCE_PASSWORD", "a")
            .env("CA_MIGRATE_TARGET_PASSWORD", "b")
            .args(["run", "-u", "src", "-U", "tgt"]),
        @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    ✘ error: No configuration file specified
    "
    );

    Ok(())
}

#[test]
fn test_enable_proxy_requires_url() -> Result<()> {
    let test = CliTest::with_file("config.json", "{}")?;

    assert_cmd_snapshot!(test.run_command("config.json").arg("--enable-proxy"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    ✘ error: --enable-proxy also requires --proxy-url
    ");

    Ok(())
}

#[test]
fn test_config_file_not_found() -> Result<()> {
    let test = CliTest::new()?;

    assert_cmd_snapshot!(test.run_command("missing.json"), @r"
    success: false
    exit_code: 1
    ----- stdout -----

    ----- stderr -----
    ✘ error: Configuration file not found (missing.json)
    ");

    Ok(())
}
