//! CLI route: run context built from flags and configuration. Dispatches to the audit
//! service and renders its report.

use crate::audit::{run_audit, AuditRequest};
use crate::cli::output::format_run_summary;
use crate::cli::parse::Cli;
use crate::config::{AuditConfig, ConfigLoader};
use crate::error::AuditError;
use crate::pipeline::FailurePolicy;
use crate::query::SfCliRunner;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

/// Runtime context for one CLI invocation: merged configuration plus output options.
pub struct RunContext {
    config: AuditConfig,
    format: String,
}

impl RunContext {
    /// Load configuration (explicit file or workspace discovery) and apply CLI overrides.
    pub fn new(cli: &Cli) -> Result<Self, AuditError> {
        let mut config = if let Some(ref cfg_path) = cli.config {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&cli.workspace)?
        };
        apply_overrides(&mut config, cli);
        config.validate().map_err(|errors| {
            let messages: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
            AuditError::ConfigError(messages.join("\n"))
        })?;

        Ok(Self {
            config,
            format: cli.format.clone(),
        })
    }

    /// Build the audit request; fails when no organization was given anywhere.
    pub fn request(&self) -> Result<AuditRequest, AuditError> {
        let org = self.config.audit.org.clone().ok_or(AuditError::MissingOrg)?;
        Ok(AuditRequest {
            org,
            export_path: self.config.audit.export_target().map(PathBuf::from),
            failure_policy: self.config.audit.failure_policy,
            max_concurrent_queries: self.config.audit.max_concurrent_queries,
        })
    }

    /// Run the audit on a fresh multi-threaded runtime.
    ///
    /// Returns the summary to print, or `None` when export is disabled.
    pub fn execute(&self) -> Result<Option<String>, AuditError> {
        let request = self.request()?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AuditError::Runtime(format!("Failed to create runtime: {}", e)))?;

        let runner = SfCliRunner::new(self.config.audit.sf_binary.clone());
        let report = runtime.block_on(async {
            runner.preflight().await?;
            run_audit(Arc::new(runner.clone()), &request).await
        })?;

        info!(records = report.records, "Audit completed");
        if report.export.is_none() {
            return Ok(None);
        }
        format_run_summary(&report, &self.format).map(Some)
    }
}

/// CLI flags take precedence over every configuration source.
fn apply_overrides(config: &mut AuditConfig, cli: &Cli) {
    if let Some(ref org) = cli.org {
        config.audit.org = Some(org.clone());
    }
    if let Some(ref export) = cli.export {
        config.audit.export_path = export.clone();
    }
    if let Some(ref sf_bin) = cli.sf_bin {
        config.audit.sf_binary = sf_bin.clone();
    }
    if cli.max_concurrency.is_some() {
        config.audit.max_concurrent_queries = cli.max_concurrency;
    }
    if cli.continue_on_error {
        config.audit.failure_policy = FailurePolicy::Continue;
    }
    if config.audit.org.as_deref() == Some("") {
        config.audit.org = None;
    }
}
