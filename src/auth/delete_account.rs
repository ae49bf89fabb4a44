//! Lets a logged-in user delete their own account.

use std::sync::{Arc, Mutex};

use axum::{
    Extension,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;

use crate::{
    AppState, Error,
    auth::{UserID, delete_user, invalidate_auth_cookie},
    db::lock_connection,
};

/// The state needed for deleting a user.
#[derive(Debug, Clone)]
pub struct DeleteAccountState {
    pub cookie_key: Key,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for DeleteAccountState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<DeleteAccountState> for Key {
    fn from_ref(state: &DeleteAccountState) -> Self {
        state.cookie_key.clone()
    }
}

/// Delete the current user together with all of their categories,
/// transactions and budgets, then log them out.
pub async fn delete_current_user(
    State(state): State<DeleteAccountState>,
    Extension(user_id): Extension<UserID>,
    jar: PrivateCookieJar,
) -> Result<(StatusCode, PrivateCookieJar), Error> {
    delete_user(user_id, &*lock_connection(&state.db_connection)?)?;
    tracing::info!("Deleted user {user_id}");

    Ok((StatusCode::NO_CONTENT, invalidate_auth_cookie(jar)))
}

#[cfg(test)]
mod delete_account_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        auth::get_user_by_id,
        endpoints::{self, format_endpoint},
        test_utils::TestApp,
    };

    #[tokio::test]
    async fn delete_account_cascades_to_owned_records() {
        let app = TestApp::new();
        let (alice, cookie) = app.sign_up("alice").await;
        let (_, bob_cookie) = app.sign_up("bob").await;

        let category: serde_json::Value = app
            .server
            .post(endpoints::CATEGORIES)
            .add_cookie(cookie.clone())
            .json(&json!({ "name": "Food", "type": "expense" }))
            .await
            .json();
        app.server
            .post(endpoints::TRANSACTIONS)
            .add_cookie(cookie.clone())
            .json(&json!({
                "category_id": category["id"],
                "amount": "12.50",
                "date": "2025-03-04"
            }))
            .await
            .assert_status(StatusCode::CREATED);
        app.server
            .post(endpoints::BUDGETS)
            .add_cookie(cookie.clone())
            .json(&json!({ "month": "2025-03-01", "amount": "500" }))
            .await
            .assert_status(StatusCode::CREATED);
        app.server
            .post(endpoints::CATEGORIES)
            .add_cookie(bob_cookie.clone())
            .json(&json!({ "name": "Rent", "type": "expense" }))
            .await
            .assert_status(StatusCode::CREATED);

        app.server
            .delete(endpoints::CURRENT_USER)
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        let connection = app.state.db_connection.lock().unwrap();
        assert!(get_user_by_id(alice, &connection).is_err());
        for table in ["category", "\"transaction\"", "budget"] {
            let count: i64 = connection
                .query_row(
                    &format!("SELECT COUNT(*) FROM {table} WHERE user_id = ?1"),
                    [alice.as_i64()],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 0, "{table} rows were not deleted");
        }
        let remaining_categories: i64 = connection
            .query_row("SELECT COUNT(*) FROM category", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining_categories, 1, "other users' rows must remain");
    }

    #[tokio::test]
    async fn deleted_user_cookie_is_rejected() {
        let app = TestApp::new();
        let (_, cookie) = app.sign_up("alice").await;

        app.server
            .delete(endpoints::CURRENT_USER)
            .add_cookie(cookie.clone())
            .await
            .assert_status(StatusCode::NO_CONTENT);

        app.server
            .get(&format_endpoint(endpoints::CATEGORY, 1))
            .add_cookie(cookie)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
