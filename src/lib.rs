//! Field Audit: Deleted-Field Record Counting
//!
//! Finds custom fields that were deleted in a Salesforce organization, resolves each one
//! to the qualified API names of its object, counts the records still stored there, and
//! merges the counts into a cumulative JSON report.

pub mod audit;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod query;
pub mod record;
pub mod report;
pub mod table;
