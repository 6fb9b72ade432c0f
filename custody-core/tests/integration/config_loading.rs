use custody_core::infrastructure::config::load_config_from_file;
use custody_core::foundation::ErrorCode;
use std::io::Write;
use tempfile::TempDir;

fn write_config(dir: &TempDir, body: &str) -> std::path::PathBuf {
    let path = dir.path().join("custody.toml");
    let mut file = std::fs::File::create(&path).expect("create config");
    file.write_all(body.as_bytes()).expect("write config");
    path
}

#[test]
fn full_coordinator_config_validates() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[service]
bind_addr = "0.0.0.0:9000"

[auth]
api_secret = "s3cret"
require_signature = "yes"

[custody]
shard_passphrase = "pass"
node_urls = ["http://n1:8001/", "http://n2:8002", "https://n3:8003"]
generate_quorum = 2

[chain]
rpc_url = "http://localhost:8545"
"#,
    );

    let config = load_config_from_file(&path, dir.path()).expect("load");
    assert_eq!(config.service.bind_addr, "0.0.0.0:9000");
    assert!(config.auth.require_signature);
    assert_eq!(config.auth.request_expiry_seconds, 300);
    assert_eq!(config.custody.node_urls[0], "http://n1:8001");
    assert_eq!(config.chain.rpc_url.as_deref(), Some("http://localhost:8545"));
    assert_eq!(config.chain.gas_limit, 21_000);
    config.validate().expect("valid");
}

#[test]
fn validation_reports_every_problem() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[custody]
node_urls = ["http://n1:8001", "ftp://n2:8002"]
generate_quorum = 5
"#,
    );

    let config = load_config_from_file(&path, dir.path()).expect("load");
    let errors = config.validate().expect_err("invalid");
    assert!(errors.len() >= 4, "errors: {errors:?}");
    assert!(errors.iter().any(|err| err.contains("api_secret")));
    assert!(errors.iter().any(|err| err.contains("shard_passphrase")));
}

#[test]
fn node_role_validation_is_separate() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(
        &dir,
        r#"
[custody]
shard_passphrase = "pass"

[node]
node_id = 2
port = 8002
shard = "seed"
peer_urls = ["http://n1:8001", "http://n3:8003"]
"#,
    );

    let config = load_config_from_file(&path, dir.path()).expect("load");
    config.validate_node().expect("node config is complete");
    assert!(config.validate().is_err(), "coordinator settings are still missing");
}

#[test]
fn malformed_toml_is_a_config_error() {
    let dir = TempDir::new().expect("temp dir");
    let path = write_config(&dir, "[auth\napi_secret = ");
    let err = load_config_from_file(&path, dir.path()).expect_err("malformed");
    assert_eq!(err.code(), ErrorCode::ConfigError);
}
