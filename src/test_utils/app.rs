use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;

use crate::{
    AppState, build_router,
    auth::{COOKIE_TOKEN, PasswordHash, User, UserID, Username, ValidatedPassword, create_user},
    endpoints,
};

pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

/// A test server running the full router on top of an in-memory database.
pub(crate) struct TestApp {
    pub server: TestServer,
    pub state: AppState,
}

impl TestApp {
    pub fn new() -> Self {
        let connection =
            Connection::open_in_memory().expect("Could not open in-memory SQLite database");
        let state = AppState::new(connection, "42", "Etc/UTC").expect("Could not create app state");
        let server =
            TestServer::try_new(build_router(state.clone())).expect("Could not create test server.");

        Self { server, state }
    }

    /// Insert a user whose password is [TEST_PASSWORD].
    ///
    /// A low bcrypt cost keeps the tests fast.
    #[track_caller]
    pub fn create_user(&self, username: &str) -> User {
        let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
            .expect("Could not hash password");

        create_user(
            Username::new_unchecked(username),
            password_hash,
            &self.state.db_connection.lock().unwrap(),
        )
        .expect("Could not create test user")
    }

    /// Log in via the API and return the auth cookie.
    pub async fn log_in(&self, username: &str) -> Cookie<'static> {
        let response = self
            .server
            .post(endpoints::LOG_IN)
            .json(&json!({ "username": username, "password": TEST_PASSWORD }))
            .await;

        response.assert_status_ok();
        response.cookie(COOKIE_TOKEN)
    }

    /// Create a user and log them in.
    pub async fn sign_up(&self, username: &str) -> (UserID, Cookie<'static>) {
        let user = self.create_user(username);
        let cookie = self.log_in(username).await;

        (user.id, cookie)
    }
}
