use anyhow::{Context, Result};
use insta_cmd::assert_cmd_snapshot;
use serde_json::{Value, json};

use crate::common::{FakePlatform, activation_key, criterion, host_asset, page};
use crate::{CliTest, snapshot_filters};

const KEY_SEARCH: &str = "/qps/rest/2.0/search/ca/agentactkey";
const ASSET_SEARCH: &str = "/qps/rest/2.0/search/am/hostasset";

/// Source account with key `A` (id `1`) holding one agent per platform and
/// key `B` (id `2`) holding a single Linux agent.
fn source_platform() -> FakePlatform {
    FakePlatform::start(|path, body| match path {
        KEY_SEARCH => (
            200,
            page(
                vec![
                    activation_key("A", "1", &["VM", "PC"]),
                    activation_key("B", "2", &["VM"]),
                ],
                None,
            ),
        ),
        ASSET_SEARCH => match criterion(body, "agentInfo.activationKey") {
            Some("1") => (
                200,
                page(
                    vec![
                        host_asset(101, "Windows Server 2019"),
                        host_asset(102, "Ubuntu LINUX"),
                        host_asset(103, "macOS 14"),
                    ],
                    None,
                ),
            ),
            Some("2") => (200, page(vec![host_asset(201, "CentOS LINUX")], None)),
            _ => (200, page(vec![], None)),
        },
        _ => (404, json!({})),
    })
}

fn target_platform(modules_x: &'static [&'static str]) -> FakePlatform {
    FakePlatform::start(move |path, _| match path {
        KEY_SEARCH => (
            200,
            page(
                vec![
                    activation_key("X", "10", modules_x),
                    activation_key("Y", "20", &["VM"]),
                ],
                None,
            ),
        ),
        _ => (404, json!({})),
    })
}

fn write_config(test: &CliTest, config: Value) -> Result<()> {
    test.write_file("config.json", &serde_json::to_string_pretty(&config)?)
}

fn asset_ids(test: &CliTest, path: &str) -> Result<Vec<u64>> {
    let content = test.read_file(path)?;
    let list: Vec<Value> = serde_json::from_str(&content).context("List should be valid JSON")?;
    Ok(list
        .iter()
        .filter_map(|asset| asset.pointer("/HostAsset/id").and_then(Value::as_u64))
        .collect())
}

#[test]
fn test_run_writes_platform_lists_per_target() -> Result<()> {
    let source = source_platform();
    let target = target_platform(&["VM", "PC"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url(), "keys": { "A": "1", "B": "2" } },
            "target": { "api_url": target.url(), "keys": { "X": "10", "Y": "20" } },
            "activation_key_map": { "A": "X", "B": "Y" }
        }),
    )?;

    assert_cmd_snapshot!(test.run_command("config.json").args(["--output-dir", "out"]), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 10  1 Windows, 1 Linux, 1 incompatible (1 source key)
    ✓ 20  0 Windows, 1 Linux, 0 incompatible (1 source key)
    Wrote 6 lists (4 assets) to out

    ----- stderr -----
    ");

    assert_eq!(asset_ids(&test, "out/10_WINDOWS.json")?, vec![101]);
    assert_eq!(asset_ids(&test, "out/10_LINUX.json")?, vec![102]);
    assert_eq!(asset_ids(&test, "out/10_INCOMPATIBLE.json")?, vec![103]);
    assert_eq!(asset_ids(&test, "out/20_WINDOWS.json")?, Vec::<u64>::new());
    assert_eq!(asset_ids(&test, "out/20_LINUX.json")?, vec![201]);
    assert_eq!(asset_ids(&test, "out/20_INCOMPATIBLE.json")?, Vec::<u64>::new());

    // Declared ids are used as-is, so only asset searches reach the accounts.
    let received = source.received();
    assert_eq!(received.len(), 2);
    assert!(received.iter().all(|request| request.path == ASSET_SEARCH));
    assert!(
        received
            .iter()
            .all(|request| request.authorization.as_deref()
                == Some("Basic c3JjX3VzZXI6c3JjX3Bhc3M="))
    );
    assert!(target.received().is_empty());
    Ok(())
}

#[test]
fn test_run_single_target_with_live_source_keys() -> Result<()> {
    let source = source_platform();
    let target = target_platform(&["VM", "PC"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url() },
            "target": { "api_url": target.url(), "keys": { "X": "10" } }
        }),
    )?;

    assert_cmd_snapshot!(test.run_command("config.json"), @r"
    success: true
    exit_code: 0
    ----- stdout -----
    ✓ 10  1 Windows, 2 Linux, 1 incompatible (2 source keys)
    Wrote 3 lists (4 assets) to .

    ----- stderr -----
    ");

    assert_eq!(asset_ids(&test, "10_LINUX.json")?, vec![102, 201]);
    assert_eq!(asset_ids(&test, "10_WINDOWS.json")?, vec![101]);
    assert_eq!(source.received()[0].path, KEY_SEARCH);
    Ok(())
}

#[test]
fn test_run_validated_incompatible_keys() -> Result<()> {
    let source = source_platform();
    let target = target_platform(&["VM"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url(), "keys": { "A": "1" } },
            "target": { "api_url": target.url(), "keys": { "X": "10" } }
        }),
    )?;

    assert_cmd_snapshot!(
        test.run_command("config.json").arg("--validate-activation-keys"),
        @r#"
    success: false
    exit_code: 5
    ----- stdout -----

    ----- stderr -----
    ✘ error: target key "X" does not match source key "A" (`modules` differs)
    "#
    );

    // Nothing is fetched or written once validation fails.
    assert!(
        source
            .received()
            .iter()
            .all(|request| request.path == KEY_SEARCH)
    );
    assert!(!test.root().join("10_WINDOWS.json").exists());
    Ok(())
}

#[test]
fn test_run_validated_compatible_keys() -> Result<()> {
    let source = source_platform();
    let target = target_platform(&["PC", "VM"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url(), "keys": { "A": "1" } },
            "target": { "api_url": target.url(), "keys": ["X"] }
        }),
    )?;

    let output = test
        .run_command("config.json")
        .arg("--validate-activation-keys")
        .output()?;

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(asset_ids(&test, "10_WINDOWS.json")?, vec![101]);
    Ok(())
}

#[test]
fn test_run_unknown_source_key_in_map() -> Result<()> {
    let source = source_platform();
    let target = target_platform(&["VM", "PC"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url(), "keys": { "A": "1" } },
            "target": { "api_url": target.url(), "keys": { "X": "10", "Y": "20" } },
            "activation_key_map": { "Z": "X" }
        }),
    )?;

    assert_cmd_snapshot!(test.run_command("config.json"), @r#"
    success: false
    exit_code: 4
    ----- stdout -----

    ----- stderr -----
    ✘ error: source key "Z" does not exist in source key data
    "#);

    assert!(source.received().is_empty());
    Ok(())
}

#[test]
fn test_run_http_error_aborts() -> Result<()> {
    let source = FakePlatform::start(|_, _| (401, json!({})));
    let target = target_platform(&["VM"]);
    let test = CliTest::new()?;
    write_config(
        &test,
        json!({
            "source": { "api_url": source.url() },
            "target": { "api_url": target.url(), "keys": { "X": "10" } }
        }),
    )?;

    insta::with_settings!({ filters => snapshot_filters() }, {
        assert_cmd_snapshot!(test.run_command("config.json"), @r"
        success: false
        exit_code: 3
        ----- stdout -----

        ----- stderr -----
        ✘ error: http://[PLATFORM]/qps/rest/2.0/search/ca/agentactkey returned HTTP 401
        ");
    });

    assert!(!test.root().join("10_WINDOWS.json").exists());
    Ok(())
}
