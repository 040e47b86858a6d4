//! Dashboard module
//!
//! Provides an overview page of the current month: totals, category
//! breakdowns, a calendar and the latest transactions.

mod cards;
mod handlers;
mod tables;

pub use handlers::get_dashboard_page;
