//! Integration tests for the deleted-field audit

mod audit_run;
mod config_loading;
mod report_merge;
