use jscope_config::{discover_config_path, load_for_workspace, ConfigError, JscopeConfig};
use tempfile::tempdir;

use super::config_path::ConfigPathEnv;

#[test]
fn discovers_jscope_toml_in_workspace_root() {
    let _env = ConfigPathEnv::cleared();

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("jscope.toml");
    std::fs::write(&config_path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let discovered = discover_config_path(dir.path())
        .expect("jscope.toml should be discovered when present in workspace root");
    assert_eq!(discovered, config_path.canonicalize().unwrap_or(config_path));
}

#[test]
fn falls_back_to_dot_jscope_config() {
    let _env = ConfigPathEnv::cleared();

    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".jscope")).unwrap();
    let config_path = dir.path().join(".jscope").join("config.toml");
    std::fs::write(&config_path, "[scopes]\narray_predecessors = [\",\"]\n").unwrap();

    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, Some(config_path.canonicalize().unwrap_or(config_path)));
    assert_eq!(config.scopes.array_predecessors, vec![',']);
}

#[test]
fn workspace_root_file_wins_over_dot_jscope() {
    let _env = ConfigPathEnv::cleared();

    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join(".jscope")).unwrap();
    std::fs::write(dir.path().join(".jscope").join("config.toml"), "").unwrap();
    let root_file = dir.path().join("jscope.toml");
    std::fs::write(&root_file, "").unwrap();

    assert_eq!(
        discover_config_path(dir.path()),
        Some(root_file.canonicalize().unwrap_or(root_file))
    );
}

#[test]
fn env_override_wins_over_workspace_file() {
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("jscope.toml"), "[logging]\nlevel = \"info\"\n").unwrap();
    let override_path = dir.path().join("override.toml");
    std::fs::write(&override_path, "[logging]\nlevel = \"trace\"\n").unwrap();

    let _env = ConfigPathEnv::pointing_at(&override_path);
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, Some(override_path.canonicalize().unwrap_or(override_path)));
    assert_eq!(config.logging.level, "trace");
}

#[test]
fn relative_env_override_resolves_against_workspace_root() {
    let dir = tempdir().unwrap();
    std::fs::create_dir(dir.path().join("conf")).unwrap();
    let config_path = dir.path().join("conf").join("scopes.toml");
    std::fs::write(&config_path, "").unwrap();

    let _env = ConfigPathEnv::pointing_at("conf/scopes.toml");
    assert_eq!(
        discover_config_path(dir.path()),
        Some(config_path.canonicalize().unwrap_or(config_path))
    );
}

#[test]
fn missing_env_override_is_an_io_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing.toml");
    let _env = ConfigPathEnv::pointing_at(&missing);

    let err = load_for_workspace(dir.path()).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }), "unexpected error: {err}");
}

#[test]
fn no_config_yields_defaults() {
    let _env = ConfigPathEnv::cleared();

    let dir = tempdir().unwrap();
    let (config, path) = load_for_workspace(dir.path()).unwrap();
    assert_eq!(path, None);
    assert_eq!(config, JscopeConfig::default());
}
