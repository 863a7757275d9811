//! Configuration layers, lowest precedence first: built-in defaults, the per-user file,
//! workspace files, then `FIELD_AUDIT__*` environment variables.

use super::DEFAULT_EXPORT_PATH;
use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, Environment, File};
use std::path::{Path, PathBuf};
use tracing::debug;

type Builder = ConfigBuilder<DefaultState>;

/// Environment prefix: `FIELD_AUDIT__AUDIT__ORG=prod` sets `audit.org`.
const ENV_PREFIX: &str = "FIELD_AUDIT";

/// Selects the workspace overlay `config/{name}.toml`.
const PROFILE_VAR: &str = "FIELD_AUDIT_ENV";

const DEFAULT_PROFILE: &str = "development";

pub fn defaults() -> Result<Builder, ConfigError> {
    Config::builder()
        .set_default("audit.export_path", DEFAULT_EXPORT_PATH)?
        .set_default("audit.sf_binary", "sf")?
        .set_default("audit.failure_policy", "fail_fast")
}

/// `$XDG_CONFIG_HOME/field-audit/config.toml`, falling back to `~/.config`.
fn user_config_path() -> Option<PathBuf> {
    let config_home = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|home| PathBuf::from(home).join(".config")))?;
    Some(config_home.join("field-audit").join("config.toml"))
}

pub fn with_user_file(builder: Builder) -> Builder {
    match user_config_path() {
        Some(path) if path.is_file() => builder.add_source(File::from(path)),
        Some(path) => {
            debug!(config_path = %path.display(), "No user configuration file");
            builder
        }
        None => builder,
    }
}

/// `config/config.toml` under the workspace, then the profile overlay next to it.
pub fn with_workspace_files(builder: Builder, workspace_root: &Path) -> Builder {
    let profile = std::env::var(PROFILE_VAR).unwrap_or_else(|_| DEFAULT_PROFILE.to_string());
    let dir = workspace_root.join("config");

    [dir.join("config.toml"), dir.join(format!("{}.toml", profile))]
        .into_iter()
        .filter(|path| path.is_file())
        .fold(builder, |builder, path| {
            debug!(config_path = %path.display(), "Loading workspace configuration");
            builder.add_source(File::from(path))
        })
}

pub fn with_environment(builder: Builder) -> Builder {
    builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    )
}
