//! Income and expense summaries over a period of time.

mod aggregation;
mod endpoint;
mod period;

pub use aggregation::{Summary, summarize};
pub use endpoint::get_summary_endpoint;
