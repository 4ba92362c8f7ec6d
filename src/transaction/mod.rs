//! Transactions record money earned (income) or spent (expense).
//!
//! This module contains everything related to transactions:
//! - The `Transaction` model and the database functions for storing,
//!   querying and deleting transactions
//! - Validation of submitted transactions
//! - The dashboard dialogs for creating transactions and the transactions page

mod core;
mod create_dialog;
mod create_endpoint;
mod delete_endpoint;
mod schema;
mod transactions_page;

pub use core::{
    Transaction, TransactionId, create_transaction, create_transaction_table, delete_transaction,
    get_transactions_in_range,
};
pub use create_dialog::create_transaction_dialog;
pub use create_endpoint::create_transaction_endpoint;
pub use delete_endpoint::delete_transaction_endpoint;
pub use schema::NewTransaction;
pub use transactions_page::{get_transactions_page, get_transactions_table};
