//! Integration tests for layered configuration loading

use field_audit::config::ConfigLoader;
use field_audit::pipeline::FailurePolicy;
use std::fs;
use std::sync::Mutex;
use tempfile::TempDir;

// Serializes tests that touch process environment variables.
static ENV_MUTEX: Mutex<()> = Mutex::new(());

/// Run `f` with `XDG_CONFIG_HOME` pointed at an empty directory and `vars` set.
fn with_env<F: FnOnce()>(vars: &[(&str, &str)], f: F) {
    let _guard = ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner());
    let xdg = TempDir::new().unwrap();

    let mut saved: Vec<(String, Option<String>)> = Vec::new();
    let mut set = |key: &str, value: &str| {
        saved.push((key.to_string(), std::env::var(key).ok()));
        std::env::set_var(key, value);
    };
    set("XDG_CONFIG_HOME", xdg.path().to_str().unwrap());
    for (key, value) in vars {
        set(key, value);
    }

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(f));

    for (key, value) in saved.into_iter().rev() {
        match value {
            Some(v) => std::env::set_var(&key, v),
            None => std::env::remove_var(&key),
        }
    }
    if let Err(panic) = result {
        std::panic::resume_unwind(panic);
    }
}

#[test]
fn test_defaults_without_files() {
    with_env(&[], || {
        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.audit.org, None);
        assert_eq!(config.audit.export_path, "deleted_fields.json");
        assert_eq!(config.audit.sf_binary, "sf");
        assert_eq!(config.audit.failure_policy, FailurePolicy::FailFast);
        assert_eq!(config.audit.max_concurrent_queries, None);
        assert_eq!(config.logging.output, "stderr");
    });
}

#[test]
fn test_workspace_file_is_applied() {
    with_env(&[], || {
        let workspace = TempDir::new().unwrap();
        let config_dir = workspace.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(
            config_dir.join("config.toml"),
            r#"
[audit]
org = "staging"
failure_policy = "continue"
max_concurrent_queries = 6

[logging]
level = "debug"
format = "json"
"#,
        )
        .unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.audit.org.as_deref(), Some("staging"));
        assert_eq!(config.audit.failure_policy, FailurePolicy::Continue);
        assert_eq!(config.audit.max_concurrent_queries, Some(6));
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
    });
}

#[test]
fn test_environment_overrides_workspace_file() {
    with_env(&[("FIELD_AUDIT__AUDIT__ORG", "prod")], || {
        let workspace = TempDir::new().unwrap();
        let config_dir = workspace.path().join("config");
        fs::create_dir_all(&config_dir).unwrap();
        fs::write(config_dir.join("config.toml"), "[audit]\norg = \"staging\"\n").unwrap();

        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.audit.org.as_deref(), Some("prod"));
    });
}

#[test]
fn test_global_file_is_read_from_xdg_config_home() {
    with_env(&[], || {
        let xdg = std::env::var("XDG_CONFIG_HOME").unwrap();
        let global = std::path::Path::new(&xdg).join("field-audit").join("config.toml");
        fs::create_dir_all(global.parent().unwrap()).unwrap();
        fs::write(&global, "[audit]\nsf_binary = \"/opt/sf/bin/sf\"\n").unwrap();

        let workspace = TempDir::new().unwrap();
        let config = ConfigLoader::load(workspace.path()).unwrap();
        assert_eq!(config.audit.sf_binary, "/opt/sf/bin/sf");
    });
}
