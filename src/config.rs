//! Configuration System
//!
//! Layered configuration for an audit run: defaults, a global file, workspace files, and
//! environment variables, merged with the `config` crate. CLI flags are applied on top by
//! the caller.

use crate::logging::LoggingConfig;
use crate::pipeline::FailurePolicy;
use serde::{Deserialize, Serialize};

mod facade;
mod sources;

pub use facade::ConfigLoader;

pub const DEFAULT_EXPORT_PATH: &str = "deleted_fields.json";

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Audit run settings
    #[serde(default)]
    pub audit: AuditSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for one audit run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditSettings {
    /// Salesforce organization alias or username
    #[serde(default)]
    pub org: Option<String>,

    /// Report file; an empty string disables export
    #[serde(default = "default_export_path")]
    pub export_path: String,

    /// Query tool executable
    #[serde(default = "default_sf_binary")]
    pub sf_binary: String,

    /// Reaction to a failing query
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Upper bound on queries in flight; unbounded when absent
    #[serde(default)]
    pub max_concurrent_queries: Option<usize>,
}

fn default_export_path() -> String {
    DEFAULT_EXPORT_PATH.to_string()
}

fn default_sf_binary() -> String {
    "sf".to_string()
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            org: None,
            export_path: default_export_path(),
            sf_binary: default_sf_binary(),
            failure_policy: FailurePolicy::default(),
            max_concurrent_queries: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone)]
pub enum ValidationError {
    Audit(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Audit(msg) => write!(f, "Audit: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl AuditSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.sf_binary.trim().is_empty() {
            return Err("sf_binary cannot be empty".to_string());
        }
        if self.max_concurrent_queries == Some(0) {
            return Err("max_concurrent_queries must be at least 1".to_string());
        }
        if matches!(self.org.as_deref(), Some(org) if org.trim().is_empty()) {
            return Err("org cannot be blank".to_string());
        }
        Ok(())
    }

    /// Report path, or `None` when export is disabled.
    pub fn export_target(&self) -> Option<&str> {
        if self.export_path.is_empty() {
            None
        } else {
            Some(self.export_path.as_str())
        }
    }
}

impl AuditConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if let Err(e) = self.audit.validate() {
            errors.push(ValidationError::Audit(e));
        }

        if self.logging.format != "json" && self.logging.format != "text" {
            errors.push(ValidationError::Logging(format!(
                "Invalid log format: {}",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
