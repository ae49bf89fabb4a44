//! Defines the core data models and database queries for transactions.

use rusqlite::{Connection, Row};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    auth::UserID,
    category::{Category, CategoryId, get_category, map_category_columns},
    money::Amount,
};

// ============================================================================
// MODELS
// ============================================================================

/// Database identifier for a transaction.
pub type TransactionId = i64;

/// An expense or income, i.e. an event where money was either spent or earned.
///
/// This is the shape sent to clients, with the category embedded in full.
/// To create a new `Transaction`, use [Transaction::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The user who recorded the transaction.
    pub user_id: UserID,
    /// The category the transaction belongs to, if any.
    pub category: Option<Category>,
    /// The amount of money spent or earned in this transaction.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// A free text note about what the transaction was for.
    pub note: Option<String>,
    /// Whether money was earned (`true`) or spent (`false`).
    pub is_income: bool,
    /// When the transaction was recorded. Never changes after creation.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl Transaction {
    /// Create a new transaction.
    ///
    /// Shortcut for [TransactionBuilder] for discoverability.
    pub fn build(amount: Amount, date: Date) -> TransactionBuilder {
        TransactionBuilder {
            amount,
            date,
            category_id: None,
            note: None,
            is_income: false,
        }
    }
}

/// The writable fields of a transaction, used for both creating and
/// replacing transactions.
///
/// # Examples
///
/// ```ignore
/// use time::macros::date;
///
/// let builder = Transaction::build(Amount::from_cents(4599), date!(2025-01-15))
///     .category_id(Some(groceries.id))
///     .note(Some("Weekly shop"));
/// ```
#[derive(Debug, PartialEq, Clone)]
pub struct TransactionBuilder {
    /// The amount of money spent or earned.
    pub amount: Amount,
    /// When the transaction happened.
    pub date: Date,
    /// Must refer to one of the owner's categories.
    pub category_id: Option<CategoryId>,
    /// Empty notes are stored as no note.
    pub note: Option<String>,
    /// Whether money was earned (`true`) or spent (`false`).
    pub is_income: bool,
}

impl TransactionBuilder {
    /// Set the category ID for the transaction.
    pub fn category_id(mut self, category_id: Option<CategoryId>) -> Self {
        self.category_id = category_id;
        self
    }

    /// Set the note for the transaction.
    pub fn note(mut self, note: Option<&str>) -> Self {
        self.note = note.filter(|note| !note.is_empty()).map(str::to_owned);
        self
    }

    /// Mark the transaction as income or an expense.
    pub fn is_income(mut self, is_income: bool) -> Self {
        self.is_income = is_income;
        self
    }
}

/// The client's request body for creating or replacing a transaction.
///
/// Unlike [Transaction], the category is referred to by ID. Any owner or
/// creation time sent by the client is ignored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionData {
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    pub amount: Decimal,
    pub date: Date,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub is_income: bool,
}

impl TryFrom<TransactionData> for TransactionBuilder {
    type Error = Error;

    fn try_from(data: TransactionData) -> Result<Self, Self::Error> {
        Ok(Transaction::build(Amount::new(data.amount)?, data.date)
            .category_id(data.category_id)
            .note(data.note.as_deref())
            .is_income(data.is_income))
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(super) const SELECT_TRANSACTIONS: &str = "SELECT t.id, t.user_id, t.amount, t.date, t.note, \
    t.is_income, t.created_at, c.id, c.name, c.type, c.user_id \
    FROM \"transaction\" t LEFT JOIN category c ON c.id = t.category_id";

/// Create a new transaction owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_transaction(
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    ensure_category_owned(builder.category_id, user_id, connection)?;

    connection
        .execute(
            "INSERT INTO \"transaction\" (user_id, category_id, amount, date, note, is_income, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            (
                user_id.as_i64(),
                builder.category_id,
                builder.amount.cents(),
                builder.date,
                &builder.note,
                builder.is_income,
                OffsetDateTime::now_utc(),
            ),
        )
        .map_err(|error| map_foreign_key_error(error, builder.category_id))?;

    get_transaction(connection.last_insert_rowid(), user_id, connection)
}

/// Retrieve one of the user's transactions by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(&format!(
            "{SELECT_TRANSACTIONS} WHERE t.id = :id AND t.user_id = :user_id"
        ))?
        .query_one(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_transaction_row,
        )?;

    Ok(transaction)
}

/// Replace the writable fields of one of the user's transactions.
///
/// The owner and creation time are left unchanged.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`,
/// - [Error::InvalidCategory] if the category ID does not refer to one of the user's categories,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_transaction(
    id: TransactionId,
    builder: TransactionBuilder,
    user_id: UserID,
    connection: &Connection,
) -> Result<Transaction, Error> {
    get_transaction(id, user_id, connection)?;
    ensure_category_owned(builder.category_id, user_id, connection)?;

    let rows_affected = connection
        .execute(
            "UPDATE \"transaction\"
             SET category_id = ?1, amount = ?2, date = ?3, note = ?4, is_income = ?5
             WHERE id = ?6 AND user_id = ?7",
            (
                builder.category_id,
                builder.amount.cents(),
                builder.date,
                &builder.note,
                builder.is_income,
                id,
                user_id.as_i64(),
            ),
        )
        .map_err(|error| map_foreign_key_error(error, builder.category_id))?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    get_transaction(id, user_id, connection)
}

/// Delete one of the user's transactions.
///
/// # Errors
/// Returns [Error::NotFound] if `id` does not refer to a transaction owned by `user_id`.
pub fn delete_transaction(
    id: TransactionId,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM \"transaction\" WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Reject category IDs that do not belong to `user_id`.
///
/// Linking a transaction to another user's category would leak data between
/// users, so this is an error rather than being silently ignored.
fn ensure_category_owned(
    category_id: Option<CategoryId>,
    user_id: UserID,
    connection: &Connection,
) -> Result<(), Error> {
    let Some(category_id) = category_id else {
        return Ok(());
    };

    match get_category(category_id, user_id, connection) {
        Ok(_) => Ok(()),
        Err(Error::NotFound) => Err(Error::InvalidCategory(category_id)),
        Err(error) => Err(error),
    }
}

fn map_foreign_key_error(error: rusqlite::Error, category_id: Option<CategoryId>) -> Error {
    match (error, category_id) {
        (
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY,
                },
                _,
            ),
            Some(category_id),
        ) => Error::InvalidCategory(category_id),
        (error, _) => error.into(),
    }
}

/// Create the transaction table.
///
/// # Errors
/// Returns an error if there is an SQL error.
pub fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS \"transaction\" (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id INTEGER NOT NULL,
                category_id INTEGER,
                amount INTEGER NOT NULL,
                date TEXT NOT NULL,
                note TEXT,
                is_income INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE,
                FOREIGN KEY(category_id) REFERENCES category(id) ON UPDATE CASCADE ON DELETE SET NULL
                )",
        (),
    )?;

    // Listing and the summary both filter by owner and date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_user_date ON \"transaction\"(user_id, date);",
        (),
    )?;

    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_transaction_category ON \"transaction\"(category_id);",
        (),
    )?;

    Ok(())
}

/// Map a row selected with [SELECT_TRANSACTIONS] to a Transaction.
pub(super) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let category = match row.get::<usize, Option<CategoryId>>(7)? {
        Some(_) => Some(map_category_columns(row, 7)?),
        None => None,
    };

    Ok(Transaction {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        amount: Amount::from_cents(row.get(2)?),
        date: row.get(3)?,
        note: row.get(4)?,
        is_income: row.get(5)?,
        created_at: row.get(6)?,
        category,
    })
}

// ============================================================================
// TESTS
// ============================================================================
