//! Query runner seam: the only place the external query tool is invoked.

use crate::error::QueryError;
use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

/// Runs the query tool with the given arguments.
///
/// A successful run yields the tool's payload (stdout); a failing one carries stdout and
/// stderr together in [`QueryError::CommandFailed`].
#[async_trait]
pub trait QueryRunner: Send + Sync {
    async fn run(&self, args: &[String]) -> Result<String, QueryError>;
}

/// Runner backed by the Salesforce `sf` command-line tool.
#[derive(Debug, Clone)]
pub struct SfCliRunner {
    program: String,
}

impl Default for SfCliRunner {
    fn default() -> Self {
        Self::new("sf")
    }
}

impl SfCliRunner {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Check the tool is installed and usable; returns its version lines.
    pub async fn preflight(&self) -> Result<Vec<String>, QueryError> {
        debug!(program = %self.program, "Checking query tool installation");
        let output = self
            .run(&["version".to_string()])
            .await
            .map_err(|e| QueryError::Unavailable(format!("{} is not installed: {}", self.program, e)))?;

        let versions: Vec<String> = output
            .lines()
            .filter(|line| !line.trim().is_empty() && !line.contains("Warning:"))
            .map(str::to_string)
            .collect();
        for line in &versions {
            debug!(version = %line, "Query tool version");
        }
        Ok(versions)
    }
}

#[async_trait]
impl QueryRunner for SfCliRunner {
    async fn run(&self, args: &[String]) -> Result<String, QueryError> {
        let output = Command::new(&self.program)
            .args(args)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| QueryError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout).into_owned();
        let stderr = String::from_utf8_lossy(&output.stderr);

        if !output.status.success() {
            return Err(QueryError::CommandFailed {
                args: std::iter::once(self.program.clone())
                    .chain(args.iter().cloned())
                    .collect(),
                output: format!("{}{}", stdout, stderr),
            });
        }
        if !stderr.trim().is_empty() {
            debug!(program = %self.program, stderr = %stderr.trim_end(), "Query tool diagnostics");
        }
        Ok(stdout)
    }
}
