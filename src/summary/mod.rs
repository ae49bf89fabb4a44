//! The financial summary: lifetime totals plus this month's spending against its budget.

mod aggregation;
mod endpoint;

pub use aggregation::{Summary, compute_summary};
pub use endpoint::get_summary_endpoint;
