use std::fs;

use tailfunnel::FunnelError;
use tailfunnel::config::{Config, ExposeSpec};
use tailfunnel::error::ConfigError;
use tempfile::TempDir;

#[test]
fn missing_file_yields_defaults() {
    let dir = TempDir::new().unwrap();
    let config = Config::load(Some(dir.path().join("absent.toml").as_path())).unwrap();
    assert!(config.expose.is_none());
    assert_eq!(config.command_timeout_secs, 10);
}

#[test]
fn camel_case_interval_and_array_expose_are_accepted() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        r#"
pollIntervalSeconds = 15
command_timeout_secs = 4

[[expose]]
port = 3000
path = "/app"

[[expose]]
port = 4000
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.as_path())).unwrap();
    assert_eq!(config.command_timeout_secs, 4);
    let target = config
        .expose
        .as_ref()
        .and_then(ExposeSpec::target)
        .unwrap();
    assert_eq!(target.port, 3000);
    assert_eq!(target.path, "/app");
}

#[test]
fn invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(&path, "expose = { port = 0 }\n").unwrap();
    assert!(matches!(
        Config::load(Some(path.as_path())),
        Err(FunnelError::Config(ConfigError::Validation(_)))
    ));

    fs::write(&path, "enabled = \"sometimes\"\n").unwrap();
    assert!(Config::load(Some(path.as_path())).is_err());
}
