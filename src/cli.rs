//! CLI domain: parse, route, and output only.
//! No audit orchestration here; the route hands a request to the audit service.

mod output;
mod parse;
mod route;

pub use output::{format_run_summary, map_error};
pub use parse::Cli;
pub use route::RunContext;
