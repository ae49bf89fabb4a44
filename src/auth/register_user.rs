//! Handles requests to register a new user.

use std::sync::{Arc, Mutex};

use axum::{
    Json,
    extract::{FromRef, State},
    http::StatusCode,
};
use axum_extra::extract::{PrivateCookieJar, cookie::Key};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use time::Duration;

use crate::{
    AppState, Error,
    auth::{PasswordHash, UserProfile, Username, ValidatedPassword, create_user, set_auth_cookie},
    db::lock_connection,
    extract::JsonBody,
};

/// The state needed for registering a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The key to be used for signing and encrypting private cookies.
    pub cookie_key: Key,
    /// The duration for which cookies used for authentication are valid.
    pub cookie_duration: Duration,
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            cookie_key: state.cookie_key.clone(),
            cookie_duration: state.cookie_duration,
            db_connection: state.db_connection.clone(),
        }
    }
}

impl FromRef<RegistrationState> for Key {
    fn from_ref(state: &RegistrationState) -> Self {
        state.cookie_key.clone()
    }
}

/// The details needed to register a user.
#[derive(Clone, Serialize, Deserialize)]
pub struct RegisterForm {
    pub username: String,
    pub password: String,
}

/// Create a new user and log them in.
///
/// # Errors
///
/// Returns a validation error if the username is empty, too long or taken,
/// or if the password is too weak.
pub async fn register_user(
    State(state): State<RegistrationState>,
    jar: PrivateCookieJar,
    JsonBody(user_data): JsonBody<RegisterForm>,
) -> Result<(StatusCode, PrivateCookieJar, Json<UserProfile>), Error> {
    let username = Username::new(&user_data.username)?;
    let validated_password = ValidatedPassword::new(&user_data.password, &[username.as_ref()])?;
    let password_hash = PasswordHash::new(validated_password, PasswordHash::DEFAULT_COST)
        .inspect_err(|error| tracing::error!("an error occurred while hashing a password: {error}"))?;

    let user = create_user(
        username,
        password_hash,
        &*lock_connection(&state.db_connection)?,
    )?;
    tracing::info!("Registered user {}", user.id);

    let jar = set_auth_cookie(jar, user.id, state.cookie_duration)?;

    Ok((StatusCode::CREATED, jar, Json(user.into())))
}

#[cfg(test)]
mod register_user_tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::{
        auth::{COOKIE_TOKEN, UserProfile, get_user_by_username},
        endpoints,
        test_utils::{TEST_PASSWORD, TestApp},
    };

    #[tokio::test]
    async fn register_user_succeeds() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "username": " alice ", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::CREATED);
        let profile: UserProfile = response.json();
        assert_eq!(profile.username.as_ref(), "alice");

        let user = get_user_by_username("alice", &app.state.db_connection.lock().unwrap())
            .expect("Could not get registered user");
        assert_eq!(user.id, profile.id);
        assert!(user.password_hash.verify(TEST_PASSWORD).unwrap());
    }

    #[tokio::test]
    async fn register_user_logs_in_new_user() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
            .await;
        let cookie = response.cookie(COOKIE_TOKEN);

        app.server
            .get(endpoints::CATEGORIES)
            .add_cookie(cookie)
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn register_user_fails_on_weak_password() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "username": "alice", "password": "password" }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn register_user_fails_on_empty_username() {
        let app = TestApp::new();

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "username": "  ", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "username cannot be empty" }));
    }

    #[tokio::test]
    async fn register_user_fails_on_duplicate_username() {
        let app = TestApp::new();
        app.create_user("alice");

        let response = app
            .server
            .post(endpoints::USERS)
            .json(&json!({ "username": "alice", "password": TEST_PASSWORD }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "the username is already taken" }));
    }
}
