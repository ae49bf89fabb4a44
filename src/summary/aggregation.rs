//! Totals over a user's transactions and the budget for the current month.

use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    budget::{BudgetMonth, get_budget_for_month},
    money::Amount,
};

/// An overview of a user's finances as of a given day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    /// The sum of all income ever recorded.
    pub total_income: Amount,
    /// The sum of all expenses ever recorded.
    pub total_expenses: Amount,
    /// Income minus expenses. May be negative.
    pub balance: Amount,
    /// The sum of expenses dated on or after the first day of the current
    /// month, including any dated in the future.
    pub monthly_expenses: Amount,
    /// The budget for the current month, or zero if the user has not set one.
    pub monthly_budget: Amount,
}

/// Compute the summary for `user_id` as of `today`.
///
/// Sums are done over integer cents in SQLite, so there is no rounding error.
///
/// # Errors
/// Returns an [Error::SqlError] if there is an SQL error, e.g. the totals
/// overflow.
pub fn compute_summary(
    user_id: UserID,
    today: Date,
    connection: &Connection,
) -> Result<Summary, Error> {
    let month = BudgetMonth::from_date(today);

    let (total_income, total_expenses, monthly_expenses): (i64, i64, i64) = connection
        .prepare(
            "SELECT
                COALESCE(SUM(CASE WHEN is_income THEN amount END), 0),
                COALESCE(SUM(CASE WHEN NOT is_income THEN amount END), 0),
                COALESCE(SUM(CASE WHEN NOT is_income AND date >= :month_start THEN amount END), 0)
            FROM \"transaction\"
            WHERE user_id = :user_id",
        )?
        .query_row(
            rusqlite::named_params! {
                ":month_start": month.first_day(),
                ":user_id": user_id.as_i64(),
            },
            |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?;

    let monthly_budget = get_budget_for_month(month, user_id, connection)?
        .map(|budget| budget.amount)
        .unwrap_or(Amount::ZERO);

    Ok(Summary {
        total_income: Amount::from_cents(total_income),
        total_expenses: Amount::from_cents(total_expenses),
        balance: Amount::from_cents(total_income - total_expenses),
        monthly_expenses: Amount::from_cents(monthly_expenses),
        monthly_budget,
    })
}
