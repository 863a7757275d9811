//! Query Executor
//!
//! Renders embedded query templates, runs them through a [`QueryRunner`] against one
//! organization, and returns either the extracted CSV block or a parsed record count.
//! An optional semaphore caps how many queries run at once across the whole pipeline.

mod extract;
mod runner;
mod template;

pub use extract::{extract_csv, parse_total_size};
pub use runner::{QueryRunner, SfCliRunner};
pub use template::{QueryTemplate, PLACEHOLDER};

use crate::error::QueryError;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::debug;

pub struct QueryExecutor {
    runner: Arc<dyn QueryRunner>,
    org: String,
    limiter: Option<Arc<Semaphore>>,
}

impl QueryExecutor {
    pub fn new(runner: Arc<dyn QueryRunner>, org: impl Into<String>) -> Self {
        Self {
            runner,
            org: org.into(),
            limiter: None,
        }
    }

    /// Cap concurrent queries at `max_concurrent`; `None` leaves them unbounded.
    pub fn with_concurrency_limit(mut self, max_concurrent: Option<usize>) -> Self {
        self.limiter = max_concurrent.map(|n| Arc::new(Semaphore::new(n.max(1))));
        self
    }

    /// Run a templated query in CSV mode; `tooling` selects the extended metadata API.
    pub async fn execute(
        &self,
        template: QueryTemplate,
        param: Option<&str>,
        tooling: bool,
    ) -> Result<String, QueryError> {
        let query = template.render(param);
        let mut args = vec![
            "data".to_string(),
            "query".to_string(),
            "-o".to_string(),
            self.org.clone(),
            "-r".to_string(),
            "csv".to_string(),
            "-q".to_string(),
            query,
        ];
        if tooling {
            args.push("-t".to_string());
        }
        debug!(
            template = template.name(),
            tooling = tooling,
            args = ?args,
            "Executing query"
        );

        let output = self.run_limited(&args).await?;
        Ok(extract_csv(&output))
    }

    /// Count the records remaining in `qualified_name`.
    pub async fn execute_count(&self, qualified_name: &str) -> Result<u64, QueryError> {
        let args = vec![
            "data".to_string(),
            "query".to_string(),
            "-q".to_string(),
            format!("SELECT Count() FROM {}", qualified_name),
            "-o".to_string(),
            self.org.clone(),
            "-r".to_string(),
            "json".to_string(),
        ];
        debug!(args = ?args, "Querying count");

        let output = self.run_limited(&args).await?;
        parse_total_size(&output)
    }

    async fn run_limited(&self, args: &[String]) -> Result<String, QueryError> {
        let _permit = match &self.limiter {
            Some(limiter) => Some(limiter.acquire().await.map_err(|_| {
                QueryError::Unavailable("query limiter closed".to_string())
            })?),
            None => None,
        };
        self.runner.run(args).await
    }
}
