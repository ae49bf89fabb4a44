//! JSON endpoints for transactions.

use std::sync::{Arc, Mutex};

use axum::{
    Extension, Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::UserID,
    db::lock_connection,
    extract::{JsonBody, PathParams, QueryParams},
    transaction::{
        Transaction, TransactionBuilder, TransactionData, TransactionId, TransactionQuery,
        create_transaction, delete_transaction, get_transaction, query_transactions,
        update_transaction,
    },
};

/// The state needed by the transaction endpoints.
#[derive(Debug, Clone)]
pub struct TransactionState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for TransactionState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's transactions, optionally filtered, searched and ordered
/// via the query string.
pub async fn list_transactions_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    QueryParams(query): QueryParams<TransactionQuery>,
) -> Result<Json<Vec<Transaction>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    query_transactions(&query, user_id, &connection).map(Json)
}

/// Record a new transaction for the user.
pub async fn create_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Result<(StatusCode, Json<Transaction>), Error> {
    let builder = TransactionBuilder::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    let transaction = create_transaction(builder, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(transaction)))
}

pub async fn get_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    PathParams(transaction_id): PathParams<TransactionId>,
) -> Result<Json<Transaction>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_transaction(transaction_id, user_id, &connection).map(Json)
}

/// Replace all writable fields of one of the user's transactions.
pub async fn update_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    PathParams(transaction_id): PathParams<TransactionId>,
    JsonBody(data): JsonBody<TransactionData>,
) -> Result<Json<Transaction>, Error> {
    let builder = TransactionBuilder::try_from(data)?;
    let connection = lock_connection(&state.db_connection)?;

    update_transaction(transaction_id, builder, user_id, &connection).map(Json)
}

pub async fn delete_transaction_endpoint(
    State(state): State<TransactionState>,
    Extension(user_id): Extension<UserID>,
    PathParams(transaction_id): PathParams<TransactionId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_transaction(transaction_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod transaction_endpoint_tests {
    use axum::http::StatusCode;
    use axum_extra::extract::cookie::Cookie;
    use axum_test::TestResponse;
    use serde_json::{Value, json};

    use crate::{
        category::Category,
        endpoints::{self, format_endpoint},
        test_utils::TestApp,
        transaction::Transaction,
    };

    async fn create_category(app: &TestApp, cookie: &Cookie<'static>, name: &str) -> Category {
        let response = app
            .server
            .post(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .json(&json!({ "name": name, "type": "expense" }))
            .await;

        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn create_transaction_succeeds() {
        let app = TestApp::new();
        let (alice, cookie) = app.sign_up("alice").await;
        let category = create_category(&app, &cookie, "Food").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .json(&json!({
                "category_id": category.id,
                "amount": "12.30",
                "date": "2025-10-05",
                "note": "Lunch",
            }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let body: Value = response.json();
        assert_eq!(body["amount"], "12.30");
        assert_eq!(body["date"], "2025-10-05");
        assert_eq!(body["is_income"], false);
        assert_eq!(body["user_id"], json!(alice));
        assert_eq!(body["category"]["name"], "Food");
        assert!(body["created_at"].is_string());
    }

    #[tokio::test]
    async fn create_transaction_accepts_numeric_amount() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .json(&json!({ "amount": 2500, "date": "2025-10-01", "is_income": true }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let transaction: Transaction = response.json();
        assert_eq!(transaction.amount.cents(), 250000);
        assert!(transaction.is_income);
    }

    #[tokio::test]
    async fn create_transaction_rejects_other_users_category() {
        let app = TestApp::new();
        let (_, alice_cookie) = app.sign_up("alice").await;
        let (_, bob_cookie) = app.sign_up("bob").await;
        let bobs_category = create_category(&app, &bob_cookie, "Bob's food").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(alice_cookie)
            .json(&json!({
                "category_id": bobs_category.id,
                "amount": "1.00",
                "date": "2025-10-01",
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({
            "error": format!("the category ID {} does not refer to a valid category", bobs_category.id)
        }));
    }

    #[tokio::test]
    async fn create_transaction_rejects_three_decimal_places() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .json(&json!({ "amount": "1.005", "date": "2025-10-01" }))
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[track_caller]
    fn assert_error_response(response: &TestResponse, prefix: &str) {
        response.assert_status(StatusCode::BAD_REQUEST);
        let body: Value = response.json();
        let message = body["error"]
            .as_str()
            .expect("response should have an error message");
        assert!(message.starts_with(prefix), "got {message:?}");
    }

    #[tokio::test]
    async fn create_transaction_rejects_non_numeric_amount() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .json(&json!({ "amount": "abc", "date": "2025-10-01" }))
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn create_transaction_rejects_invalid_date() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .json(&json!({ "amount": "1.00", "date": "2025-13-01" }))
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn create_transaction_rejects_malformed_json() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie)
            .text("{\"amount\": ")
            .content_type("application/json")
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn list_transactions_rejects_non_numeric_amount_filter() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("amount", "abc")
            .add_cookie(cookie)
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn get_transaction_rejects_non_numeric_id() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .get("/api/finance/transactions/abc")
            .add_cookie(cookie)
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn transactions_require_log_in() {
        let app = TestApp::new();

        app.server
            .get(endpoints::TRANSACTIONS)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn list_transactions_with_search_and_ordering() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;
        for (amount, note) in [("3.00", "Grocery run"), ("1.00", "rent"), ("2.00", "grocery top up")] {
            app.server
                .post(endpoints::TRANSACTIONS)
                .add_cookie(cookie.clone())
                .json(&json!({ "amount": amount, "date": "2025-10-01", "note": note }))
                .await
                .assert_status(StatusCode::CREATED);
        }

        let response = app
            .server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("search", "GROCERY")
            .add_query_param("ordering", "amount")
            .add_cookie(cookie)
            .await;

        response.assert_status_ok();
        let transactions: Vec<Transaction> = response.json();
        let notes: Vec<_> = transactions
            .iter()
            .map(|transaction| transaction.note.as_deref().unwrap())
            .collect();
        assert_eq!(notes, vec!["grocery top up", "Grocery run"]);
    }

    #[tokio::test]
    async fn list_transactions_rejects_unknown_ordering() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        let response = app
            .server
            .get(endpoints::TRANSACTIONS)
            .add_query_param("ordering", "note")
            .add_cookie(cookie)
            .await;

        assert_error_response(&response, "invalid request: ");
    }

    #[tokio::test]
    async fn transaction_lifecycle() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;
        let created: Transaction = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie.clone())
            .json(&json!({ "amount": "9.99", "date": "2025-10-01", "note": "Book" }))
            .await
            .json();
        let url = format_endpoint(endpoints::TRANSACTION, created.id);

        let got: Transaction = app.server.get(&url).add_cookie(cookie.clone()).await.json();
        assert_eq!(got, created);

        let response = app
            .server
            .put(&url)
            .add_cookie(cookie.clone())
            .json(&json!({ "amount": "19.99", "date": "2025-10-02" }))
            .await;
        response.assert_status_ok();
        let updated: Transaction = response.json();
        assert_eq!(updated.amount.cents(), 1999);
        assert_eq!(updated.note, None);
        assert_eq!(updated.created_at, created.created_at);

        app.server
            .delete(&url)
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);
        app.server
            .get(&url)
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn other_users_transaction_is_not_found() {
        let app = TestApp::new();
        let (_, alice_cookie) = app.sign_up("alice").await;
        let (_, bob_cookie) = app.sign_up("bob").await;
        let created: Transaction = app
            .server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(alice_cookie.clone())
            .json(&json!({ "amount": "9.99", "date": "2025-10-01" }))
            .await
            .json();
        let url = format_endpoint(endpoints::TRANSACTION, created.id);

        app.server
            .get(&url)
            .add_cookie(bob_cookie.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .put(&url)
            .add_cookie(bob_cookie.clone())
            .json(&json!({ "amount": "0.01", "date": "2025-10-01" }))
            .await
            .assert_status(StatusCode::NOT_FOUND);
        app.server
            .delete(&url)
            .add_cookie(bob_cookie.clone())
            .await
            .assert_status(StatusCode::NOT_FOUND);

        let listed: Vec<Transaction> = app
            .server
            .get(endpoints::TRANSACTIONS)
            .add_cookie(bob_cookie)
            .await
            .json();
        assert!(listed.is_empty());
    }
}
