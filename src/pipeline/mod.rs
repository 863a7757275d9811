//! Resolution Pipeline
//!
//! Turns the deleted-fields table into count records through three nested stages of
//! concurrent tasks:
//!
//! 1. one task per eligible deleted field resolves its developer names,
//! 2. one task per developer name resolves its qualified API names,
//! 3. one task per qualified API name runs a count query and appends a record.
//!
//! Every parent joins all of its children before returning, so the root join means every
//! record this run will produce has been produced. Failures follow [`FailurePolicy`].

mod accumulator;
mod stages;

pub use accumulator::ResultAccumulator;

use crate::error::QueryError;
use crate::query::QueryExecutor;
use crate::record::{DeleteCountRecord, DeletedFieldRow};
use crate::table::Table;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Column title of the primary field; a row carrying it is a header.
pub(crate) const DEVELOPER_NAME_HEADER: &str = "DeveloperName";
pub(crate) const QUALIFIED_API_NAME_HEADER: &str = "QualifiedApiName";

/// What to do when a query anywhere in the tree fails.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// First failure cancels outstanding work and fails the run.
    #[default]
    FailFast,
    /// Failures are logged and recorded per branch; siblings keep going.
    Continue,
}

/// Stage a failure happened in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ResolveStage {
    DeletedFields,
    DeveloperNames,
    QualifiedNames,
    RecordCount,
}

impl std::fmt::Display for ResolveStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ResolveStage::DeletedFields => "deleted_fields",
            ResolveStage::DeveloperNames => "developer_names",
            ResolveStage::QualifiedNames => "qualified_names",
            ResolveStage::RecordCount => "record_count",
        };
        f.write_str(name)
    }
}

/// A branch that failed under [`FailurePolicy::Continue`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BranchFailure {
    pub stage: ResolveStage,
    /// Identifier the failing query was parameterized with.
    pub subject: String,
    pub message: String,
}

/// Result of one pipeline run.
#[derive(Debug, Default)]
pub struct PipelineOutcome {
    pub records: Vec<DeleteCountRecord>,
    pub failures: Vec<BranchFailure>,
    pub eligible_rows: usize,
    pub skipped_rows: usize,
}

pub struct ResolutionPipeline {
    executor: Arc<QueryExecutor>,
    policy: FailurePolicy,
}

impl ResolutionPipeline {
    pub fn new(executor: Arc<QueryExecutor>, policy: FailurePolicy) -> Self {
        Self { executor, policy }
    }

    /// Resolve every eligible row of `deleted_fields` into count records.
    pub async fn run(&self, deleted_fields: Table) -> Result<PipelineOutcome, QueryError> {
        let ctx = Arc::new(PipelineContext::new(Arc::clone(&self.executor), self.policy));
        let mut eligible_rows = 0usize;
        let mut skipped_rows = 0usize;
        let mut tasks = JoinSet::new();

        for row in deleted_fields {
            let developer_name = match row.field(0) {
                Ok(name) => name,
                Err(e) => {
                    ctx.fail(ResolveStage::DeletedFields, "<row>", e);
                    continue;
                }
            };
            if developer_name == DEVELOPER_NAME_HEADER {
                debug!("Skipping header row");
                skipped_rows += 1;
                continue;
            }
            let table_enum_or_id = match row.field(1) {
                Ok(id) => id,
                Err(e) => {
                    ctx.fail(ResolveStage::DeletedFields, developer_name, e);
                    continue;
                }
            };

            let field = DeletedFieldRow::new(developer_name, table_enum_or_id);
            if !field.is_deleted() {
                debug!(
                    developer_name = %field.developer_name_raw,
                    table_enum_or_id = %field.table_enum_or_id,
                    "Skipping non-deleted field"
                );
                skipped_rows += 1;
                continue;
            }

            eligible_rows += 1;
            tasks.spawn(stages::resolve_deleted_field(Arc::clone(&ctx), field));
        }

        join_children(&mut tasks).await;

        if let Some(err) = ctx.first_error.lock().take() {
            return Err(err);
        }

        let records = ctx.accumulator.take();
        let failures = std::mem::take(&mut *ctx.failures.lock());
        info!(
            eligible_rows = eligible_rows,
            records = records.len(),
            failures = failures.len(),
            "Resolution pipeline finished"
        );
        Ok(PipelineOutcome {
            records,
            failures,
            eligible_rows,
            skipped_rows,
        })
    }
}

/// State shared by every task of one run.
pub(crate) struct PipelineContext {
    pub(crate) executor: Arc<QueryExecutor>,
    pub(crate) accumulator: ResultAccumulator,
    policy: FailurePolicy,
    cancel: CancellationToken,
    first_error: Mutex<Option<QueryError>>,
    failures: Mutex<Vec<BranchFailure>>,
}

impl PipelineContext {
    fn new(executor: Arc<QueryExecutor>, policy: FailurePolicy) -> Self {
        Self {
            executor,
            accumulator: ResultAccumulator::new(),
            policy,
            cancel: CancellationToken::new(),
            first_error: Mutex::new(None),
            failures: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Await `query` unless the run is cancelled first; `None` means cancelled.
    pub(crate) async fn guarded<T, F>(&self, query: F) -> Option<Result<T, QueryError>>
    where
        F: Future<Output = Result<T, QueryError>>,
    {
        if self.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => None,
            result = query => Some(result),
        }
    }

    pub(crate) fn fail(&self, stage: ResolveStage, subject: &str, err: QueryError) {
        match self.policy {
            FailurePolicy::FailFast => {
                let mut first = self.first_error.lock();
                if first.is_none() {
                    warn!(stage = %stage, subject = subject, error = %err, "Query failed; cancelling run");
                    *first = Some(err);
                    self.cancel.cancel();
                }
            }
            FailurePolicy::Continue => {
                warn!(stage = %stage, subject = subject, error = %err, "Query failed; skipping branch");
                self.failures.lock().push(BranchFailure {
                    stage,
                    subject: subject.to_string(),
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Wait for every child; a panicking child re-raises its panic in the parent.
pub(crate) async fn join_children(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(err) = joined {
            if err.is_panic() {
                std::panic::resume_unwind(err.into_panic());
            }
        }
    }
}
