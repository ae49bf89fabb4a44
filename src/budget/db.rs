//! Database operations for budgets.

use rusqlite::{Connection, OptionalExtension, Row};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::{Budget, BudgetId, BudgetMonth},
    money::Amount,
};

const BUDGET_COLUMNS: &str = "id, user_id, month, amount";

/// Create a budget for the month containing `month`, owned by `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateBudget] if the user already has a budget for that month,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_budget(
    month: Date,
    amount: Amount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget_month = BudgetMonth::from_date(month);

    connection
        .prepare(&format!(
            "INSERT INTO budget (user_id, month, month_key, amount) VALUES (?1, ?2, ?3, ?4)
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                user_id.as_i64(),
                month,
                budget_month.to_string(),
                amount.cents(),
            ),
            map_budget_row,
        )
        .map_err(|error| map_unique_month_error(error, budget_month))
}

/// Retrieve one of the user's budgets by ID.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn get_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<Budget, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE id = :id AND user_id = :user_id"
        ))?
        .query_row(
            &[(":id", &id), (":user_id", &user_id.as_i64())],
            map_budget_row,
        )
        .map_err(|error| error.into())
}

/// Retrieve all of the user's budgets, latest month first.
pub fn get_budgets(user_id: UserID, connection: &Connection) -> Result<Vec<Budget>, Error> {
    connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE user_id = :user_id
             ORDER BY month_key DESC, id DESC"
        ))?
        .query_map(&[(":user_id", &user_id.as_i64())], map_budget_row)?
        .map(|maybe_budget| maybe_budget.map_err(|error| error.into()))
        .collect()
}

/// Find the user's budget for `month`, whatever day it was stored with.
pub fn get_budget_for_month(
    month: BudgetMonth,
    user_id: UserID,
    connection: &Connection,
) -> Result<Option<Budget>, Error> {
    let budget = connection
        .prepare(&format!(
            "SELECT {BUDGET_COLUMNS} FROM budget WHERE user_id = ?1 AND month_key = ?2"
        ))?
        .query_row((user_id.as_i64(), month.to_string()), map_budget_row)
        .optional()?;

    Ok(budget)
}

/// Replace the month and amount of one of the user's budgets.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the budget does not exist or belongs to another user,
/// - [Error::DuplicateBudget] if the user already has another budget for the new month,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_budget(
    id: BudgetId,
    month: Date,
    amount: Amount,
    user_id: UserID,
    connection: &Connection,
) -> Result<Budget, Error> {
    let budget_month = BudgetMonth::from_date(month);

    connection
        .prepare(&format!(
            "UPDATE budget SET month = ?1, month_key = ?2, amount = ?3
             WHERE id = ?4 AND user_id = ?5
             RETURNING {BUDGET_COLUMNS}"
        ))?
        .query_row(
            (
                month,
                budget_month.to_string(),
                amount.cents(),
                id,
                user_id.as_i64(),
            ),
            map_budget_row,
        )
        .map_err(|error| map_unique_month_error(error, budget_month))
}

/// Delete one of the user's budgets.
///
/// # Errors
/// Returns [Error::NotFound] if the budget does not exist or belongs to another user.
pub fn delete_budget(id: BudgetId, user_id: UserID, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute(
        "DELETE FROM budget WHERE id = ?1 AND user_id = ?2",
        (id, user_id.as_i64()),
    )?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Initialize the budget table.
///
/// The unique constraint on `(user_id, month_key)` is what stops two budgets
/// for the same month, including when two requests race each other.
pub fn create_budget_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute_batch(
        "CREATE TABLE IF NOT EXISTS budget (
            id INTEGER PRIMARY KEY,
            user_id INTEGER NOT NULL,
            month TEXT NOT NULL,
            month_key TEXT NOT NULL,
            amount INTEGER NOT NULL,
            UNIQUE(user_id, month_key),
            FOREIGN KEY(user_id) REFERENCES user(id) ON DELETE CASCADE
        );",
    )?;

    Ok(())
}

fn map_unique_month_error(error: rusqlite::Error, month: BudgetMonth) -> Error {
    match error {
        // Code 2067 occurs when a UNIQUE constraint failed.
        rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
            if sql_error.extended_code == 2067 && desc.contains("budget.month_key") =>
        {
            Error::DuplicateBudget(month)
        }
        error => error.into(),
    }
}

fn map_budget_row(row: &Row) -> Result<Budget, rusqlite::Error> {
    Ok(Budget {
        id: row.get(0)?,
        user_id: UserID::new(row.get(1)?),
        month: row.get(2)?,
        amount: Amount::from_cents(row.get(3)?),
    })
}
