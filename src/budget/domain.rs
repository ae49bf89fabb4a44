//! The types for monthly budgets.

use std::fmt::Display;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, Month};

use crate::{Error, auth::UserID, money::Amount};

/// Database identifier for a budget.
pub type BudgetId = i64;

/// The calendar month a budget applies to.
///
/// Budgets are stored with whatever day the client sent, so two dates in the
/// same month must compare equal once normalized to this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BudgetMonth {
    year: i32,
    month: Month,
}

impl BudgetMonth {
    /// Create a month from its year and month.
    pub fn new(year: i32, month: Month) -> Self {
        Self { year, month }
    }

    /// The month containing `date`.
    pub fn from_date(date: Date) -> Self {
        Self::new(date.year(), date.month())
    }

    /// The first day of the month.
    pub fn first_day(&self) -> Date {
        // The year always comes from a valid `Date`.
        Date::from_calendar_date(self.year, self.month, 1).unwrap_or(Date::MIN)
    }
}

/// Formats the month as `YYYY-MM`, which is also the key used in the database.
impl Display for BudgetMonth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month as u8)
    }
}

/// How much a user plans to spend in a month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub id: BudgetId,
    pub user_id: UserID,
    /// The date sent by the client. Only the year and month are meaningful.
    pub month: Date,
    pub amount: Amount,
}

impl Budget {
    /// The normalized month this budget applies to.
    pub fn budget_month(&self) -> BudgetMonth {
        BudgetMonth::from_date(self.month)
    }
}

/// The client's request body for creating or replacing a budget.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BudgetData {
    pub month: Date,
    pub amount: Decimal,
}

impl BudgetData {
    /// Check the amount is a valid amount of money.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if the amount has too many decimal places or digits.
    pub fn validate(self) -> Result<(Date, Amount), Error> {
        Ok((self.month, Amount::new(self.amount)?))
    }
}

#[cfg(test)]
mod budget_month_tests {
    use time::{Month, macros::date};

    use super::BudgetMonth;

    #[test]
    fn dates_in_same_month_are_equal() {
        assert_eq!(
            BudgetMonth::from_date(date!(2025 - 03 - 01)),
            BudgetMonth::from_date(date!(2025 - 03 - 31))
        );
        assert_ne!(
            BudgetMonth::from_date(date!(2025 - 03 - 01)),
            BudgetMonth::from_date(date!(2024 - 03 - 01))
        );
    }

    #[test]
    fn displays_as_year_and_month() {
        assert_eq!(BudgetMonth::new(2025, Month::March).to_string(), "2025-03");
        assert_eq!(BudgetMonth::new(2025, Month::December).to_string(), "2025-12");
    }

    #[test]
    fn first_day() {
        assert_eq!(
            BudgetMonth::from_date(date!(2024 - 02 - 29)).first_day(),
            date!(2024 - 02 - 01)
        );
    }
}
