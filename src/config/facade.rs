//! Config loader facade: the one entry point for building an [`AuditConfig`].

use super::sources;
use super::AuditConfig;
use crate::error::AuditError;
use config::File;
use std::path::Path;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, user file, workspace `config/config.toml`,
    /// workspace `config/{FIELD_AUDIT_ENV}.toml`, `FIELD_AUDIT__*` environment variables.
    pub fn load(workspace_root: &Path) -> Result<AuditConfig, AuditError> {
        let builder = sources::with_user_file(sources::defaults()?);
        let builder = sources::with_workspace_files(builder, workspace_root);
        Self::finish(sources::with_environment(builder).build()?)
    }

    /// Load configuration from one explicit file, skipping file discovery.
    pub fn load_from_file(path: &Path) -> Result<AuditConfig, AuditError> {
        if !path.exists() {
            return Err(AuditError::ConfigError(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }
        let builder = sources::defaults()?.add_source(File::from(path));
        Self::finish(sources::with_environment(builder).build()?)
    }

    fn finish(settings: config::Config) -> Result<AuditConfig, AuditError> {
        let config: AuditConfig = settings.try_deserialize()?;
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            AuditError::ConfigError(format!(
                "Configuration validation failed:\n{}",
                messages.join("\n")
            ))
        })?;
        Ok(config)
    }
}
