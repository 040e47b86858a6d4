//! Transaction management for the finance tracker.
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and its validation rules
//! - The store for saving, querying, and managing transactions
//! - The JSON API handlers and the calendar view of transactions

mod core;
mod create_endpoint;
mod delete_endpoint;
mod edit_endpoint;
mod filter;
mod get_endpoint;
mod list_endpoint;
mod store;
mod table;
mod transactions_page;
mod validation;

pub use core::{Transaction, TransactionType, create_transaction_table};
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::{delete_transaction_by_query_endpoint, delete_transaction_endpoint};
pub use edit_endpoint::edit_transaction_endpoint;
pub use filter::TransactionFilter;
pub use get_endpoint::get_transaction_endpoint;
pub use list_endpoint::list_transactions_endpoint;
pub use store::{SQLiteTransactionStore, TransactionStore};
pub use table::transactions_table;
pub use transactions_page::get_transactions_page;
pub use validation::{Bound, DateRange, parse_date_bound, validate_date_range};
