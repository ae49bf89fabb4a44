//! Filtering, searching and ordering of a user's transactions.

use rusqlite::{Connection, ToSql, params_from_iter};
use rust_decimal::Decimal;
use serde::Deserialize;
use time::Date;

use crate::{
    Error,
    auth::UserID,
    category::CategoryId,
    money::Amount,
    transaction::{
        Transaction, TransactionId,
        core::{SELECT_TRANSACTIONS, map_transaction_row},
    },
};

/// The sort order for a list of transactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum TransactionOrdering {
    /// Oldest first.
    #[serde(rename = "date")]
    DateAscending,
    /// Newest first, with the most recently recorded first on the same date.
    #[default]
    #[serde(rename = "-date")]
    DateDescending,
    /// Smallest amount first.
    #[serde(rename = "amount")]
    AmountAscending,
    /// Largest amount first.
    #[serde(rename = "-amount")]
    AmountDescending,
}

impl TransactionOrdering {
    fn order_by_clause(self) -> &'static str {
        match self {
            TransactionOrdering::DateAscending => "t.date ASC, t.created_at ASC, t.id ASC",
            TransactionOrdering::DateDescending => "t.date DESC, t.created_at DESC, t.id DESC",
            TransactionOrdering::AmountAscending => "t.amount ASC, t.id ASC",
            TransactionOrdering::AmountDescending => "t.amount DESC, t.id DESC",
        }
    }
}

/// Optional filters for listing transactions, taken from the query string.
///
/// All filters that are set must match.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TransactionQuery {
    pub category_id: Option<CategoryId>,
    pub date: Option<Date>,
    pub amount: Option<Decimal>,
    pub is_income: Option<bool>,
    /// Either a transaction ID or part of a note, see [SearchKey].
    pub search: Option<String>,
    #[serde(default)]
    pub ordering: TransactionOrdering,
}

/// What a search string from the client is matched against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchKey {
    /// The whole key was an integer, so only the transaction with that ID matches.
    ///
    /// Notes are not searched, even if they contain the number.
    Id(TransactionId),
    /// Matches transactions whose note contains the key, ignoring case.
    ///
    /// Stored in lowercase.
    Note(String),
}

impl SearchKey {
    /// Interpret a raw search string.
    ///
    /// Returns `None` if the key is empty after trimming whitespace, meaning
    /// no search filter should be applied.
    pub fn parse(raw: &str) -> Option<Self> {
        let key = raw.trim();

        if key.is_empty() {
            return None;
        }

        match key.parse::<TransactionId>() {
            Ok(id) => Some(SearchKey::Id(id)),
            Err(_) => Some(SearchKey::Note(key.to_lowercase())),
        }
    }

    fn matches_note(needle: &str, transaction: &Transaction) -> bool {
        transaction
            .note
            .as_deref()
            .is_some_and(|note| note.to_lowercase().contains(needle))
    }
}

/// Get the user's transactions that match `query`, in the order it asks for.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount filter is not a valid amount,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn query_transactions(
    query: &TransactionQuery,
    user_id: UserID,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    let mut conditions = vec!["t.user_id = ?"];
    let mut params: Vec<Box<dyn ToSql>> = vec![Box::new(user_id.as_i64())];

    if let Some(category_id) = query.category_id {
        conditions.push("t.category_id = ?");
        params.push(Box::new(category_id));
    }

    if let Some(date) = query.date {
        conditions.push("t.date = ?");
        params.push(Box::new(date));
    }

    if let Some(amount) = query.amount {
        conditions.push("t.amount = ?");
        params.push(Box::new(Amount::new(amount)?.cents()));
    }

    if let Some(is_income) = query.is_income {
        conditions.push("t.is_income = ?");
        params.push(Box::new(is_income));
    }

    let search_key = query.search.as_deref().and_then(SearchKey::parse);

    if let Some(SearchKey::Id(id)) = search_key {
        conditions.push("t.id = ?");
        params.push(Box::new(id));
    }

    let sql = format!(
        "{SELECT_TRANSACTIONS} WHERE {} ORDER BY {}",
        conditions.join(" AND "),
        query.ordering.order_by_clause()
    );

    let transactions = connection
        .prepare(&sql)?
        .query_map(params_from_iter(params.iter()), map_transaction_row)?
        .collect::<Result<Vec<_>, _>>()?;

    // SQLite's LIKE only folds ASCII, so note searches are filtered here.
    let transactions = match search_key {
        Some(SearchKey::Note(needle)) => transactions
            .into_iter()
            .filter(|transaction| SearchKey::matches_note(&needle, transaction))
            .collect(),
        _ => transactions,
    };

    Ok(transactions)
}

#[cfg(test)]
mod search_key_tests {
    use super::SearchKey;

    #[test]
    fn integer_key_is_id() {
        assert_eq!(SearchKey::parse("42"), Some(SearchKey::Id(42)));
        assert_eq!(SearchKey::parse("  42 "), Some(SearchKey::Id(42)));
    }

    #[test]
    fn partial_integer_key_is_note() {
        assert_eq!(
            SearchKey::parse("42 apples"),
            Some(SearchKey::Note("42 apples".to_owned()))
        );
        assert_eq!(
            SearchKey::parse("4.2"),
            Some(SearchKey::Note("4.2".to_owned()))
        );
    }

    #[test]
    fn note_key_is_lowercase() {
        assert_eq!(
            SearchKey::parse("Grocery"),
            Some(SearchKey::Note("grocery".to_owned()))
        );
    }

    #[test]
    fn empty_key_is_no_search() {
        assert_eq!(SearchKey::parse(""), None);
        assert_eq!(SearchKey::parse("   "), None);
    }
}
