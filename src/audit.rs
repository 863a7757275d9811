//! Audit run: query deleted fields, resolve them through the pipeline, export the report.
//! Callers (the CLI) build an [`AuditRequest`] and hand over a query runner.

use crate::error::AuditError;
use crate::pipeline::{BranchFailure, FailurePolicy, ResolutionPipeline};
use crate::query::{QueryExecutor, QueryRunner, QueryTemplate};
use crate::report::{ExportOutcome, ReportStore};
use crate::table::Table;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inputs of one audit run.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub org: String,
    /// Report file; `None` skips export.
    pub export_path: Option<PathBuf>,
    pub failure_policy: FailurePolicy,
    pub max_concurrent_queries: Option<usize>,
}

impl AuditRequest {
    pub fn new(org: impl Into<String>) -> Self {
        Self {
            org: org.into(),
            export_path: None,
            failure_policy: FailurePolicy::default(),
            max_concurrent_queries: None,
        }
    }
}

/// What one audit run did.
#[derive(Debug, Serialize)]
pub struct AuditReport {
    pub org: String,
    pub eligible_rows: usize,
    pub skipped_rows: usize,
    pub records: usize,
    pub failures: Vec<BranchFailure>,
    pub export: Option<ExportOutcome>,
}

/// Run one audit against `request.org` using `runner` for every external query.
pub async fn run_audit(
    runner: Arc<dyn QueryRunner>,
    request: &AuditRequest,
) -> Result<AuditReport, AuditError> {
    info!(org = %request.org, "Using Salesforce organization");
    let executor = Arc::new(
        QueryExecutor::new(runner, request.org.clone())
            .with_concurrency_limit(request.max_concurrent_queries),
    );

    debug!("Querying deleted fields data");
    let deleted_fields_csv = executor
        .execute(QueryTemplate::DeletedFields, None, true)
        .await?;
    debug!(data = %deleted_fields_csv, "Deleted fields data");

    debug!("Processing deleted fields data");
    let pipeline = ResolutionPipeline::new(Arc::clone(&executor), request.failure_policy);
    let outcome = pipeline.run(Table::decode(&deleted_fields_csv)).await?;

    if !outcome.failures.is_empty() {
        warn!(
            failures = outcome.failures.len(),
            "Some branches failed; exporting partial results"
        );
    }

    let records = outcome.records.len();
    let export = match &request.export_path {
        Some(path) => {
            debug!(path = %path.display(), "Exporting results");
            Some(ReportStore::new(path).export(outcome.records)?)
        }
        None => {
            debug!("Export disabled");
            None
        }
    };

    Ok(AuditReport {
        org: request.org.clone(),
        eligible_rows: outcome.eligible_rows,
        skipped_rows: outcome.skipped_rows,
        records,
        failures: outcome.failures,
        export,
    })
}
