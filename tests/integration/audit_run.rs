//! End-to-end audit runs against a scripted query tool

use field_audit::audit::{run_audit, AuditRequest};
use field_audit::error::{AuditError, QueryError};
use field_audit::pipeline::FailurePolicy;
use field_audit::report::ReportStore;
use std::sync::Arc;
use tempfile::TempDir;

use crate::integration::test_utils::{foobar_runner, ScriptedRunner};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_audit_exports_records_and_totals() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let mut request = AuditRequest::new("prod");
    request.export_path = Some(path.clone());

    let report = run_audit(Arc::new(foobar_runner()), &request).await.unwrap();
    assert_eq!(report.org, "prod");
    assert_eq!(report.records, 2);

    let export = report.export.unwrap();
    assert_eq!(export.new_results, 2);
    assert_eq!(export.current_counts.len(), 1);
    assert_eq!(export.current_counts[0].count, 8);

    let stored = ReportStore::new(&path).load().unwrap();
    assert_eq!(stored.results.len(), 2);
    assert_eq!(stored.last_run_count, export.current_counts);
}

#[tokio::test]
async fn test_deleted_fields_query_targets_org_with_tooling_api() {
    let runner = Arc::new(foobar_runner());
    run_audit(runner.clone(), &AuditRequest::new("prod"))
        .await
        .unwrap();

    let first = &runner.calls()[0];
    assert_eq!(&first[..4], &["data", "query", "-o", "prod"]);
    assert!(first.iter().any(|a| a.contains("FROM CustomField")));
    assert_eq!(first.last().map(String::as_str), Some("-t"));
}

#[tokio::test]
async fn test_audit_without_export_path_skips_export() {
    let report = run_audit(Arc::new(foobar_runner()), &AuditRequest::new("prod"))
        .await
        .unwrap();

    assert!(report.export.is_none());
    assert_eq!(report.records, 2);
}

#[tokio::test]
async fn test_failed_deleted_fields_query_aborts_before_export() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let runner = ScriptedRunner::new().fail("FROM CustomField", "No authorization information found");
    let mut request = AuditRequest::new("prod");
    request.export_path = Some(path.clone());
    request.failure_policy = FailurePolicy::Continue;

    let result = run_audit(Arc::new(runner), &request).await;
    assert!(matches!(
        result,
        Err(AuditError::Query(QueryError::CommandFailed { .. }))
    ));
    assert!(!path.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_fail_fast_run_leaves_report_untouched() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let runner = ScriptedRunner::new()
        .reply(
            "FROM CustomField",
            "DeveloperName,TableEnumOrId\nFooBar_del,Account\n",
        )
        .fail("WHERE DeveloperName = 'FooBar_del'", "INVALID_FIELD");
    let mut request = AuditRequest::new("prod");
    request.export_path = Some(path.clone());

    assert!(run_audit(Arc::new(runner), &request).await.is_err());
    assert!(!path.exists());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_continue_run_exports_partial_results() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let runner = ScriptedRunner::new()
        .reply(
            "FROM CustomField",
            "DeveloperName,TableEnumOrId\nGood_del,Account\nBad_del,Contact\n",
        )
        .reply(
            "WHERE DeveloperName = 'Good_del'",
            "NamespacePrefix,DeveloperName,QualifiedApiName\n,Good_del,Good__c\n",
        )
        .fail("WHERE DeveloperName = 'Bad_del'", "INVALID_FIELD")
        .count("Good__c", 11);
    let mut request = AuditRequest::new("prod");
    request.export_path = Some(path.clone());
    request.failure_policy = FailurePolicy::Continue;

    let report = run_audit(Arc::new(runner), &request).await.unwrap();
    assert_eq!(report.records, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].subject, "Bad_del");
    assert_eq!(report.export.unwrap().current_counts[0].count, 11);
}

#[tokio::test]
async fn test_repeated_runs_accumulate() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("deleted_fields.json");
    let mut request = AuditRequest::new("prod");
    request.export_path = Some(path.clone());

    run_audit(Arc::new(foobar_runner()), &request).await.unwrap();
    let second = run_audit(Arc::new(foobar_runner()), &request).await.unwrap();

    let export = second.export.unwrap();
    assert_eq!(export.total_results, 4);
    assert_eq!(export.new_results, 2);
    // Same date and same names: each name contributes once.
    assert_eq!(export.current_counts.last().map(|c| c.count), Some(8));
}
