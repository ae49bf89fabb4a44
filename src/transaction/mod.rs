//! Income and expense transactions, and the queries for finding them again.

mod core;
mod endpoints;
mod query;

pub use core::{
    Transaction, TransactionBuilder, TransactionData, TransactionId, create_transaction,
    create_transaction_table, delete_transaction, get_transaction, update_transaction,
};
pub use endpoints::{
    create_transaction_endpoint, delete_transaction_endpoint, get_transaction_endpoint,
    list_transactions_endpoint, update_transaction_endpoint,
};
pub use query::{TransactionQuery, query_transactions};
