//! JSON endpoints for listing, creating, editing and deleting categories.

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
    category::{
        Category, CategoryData, CategoryId, create_category, delete_category, get_categories,
        get_category, update_category,
    },
    db::lock_connection,
    extract::{JsonBody, PathParams},
};

/// The state needed by the category endpoints.
#[derive(Debug, Clone)]
pub struct CategoryState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for CategoryState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's categories.
pub async fn list_categories_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Category>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_categories(user_id, &connection).map(Json)
}

/// Create a category owned by the user.
pub async fn create_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<CategoryData>,
) -> Result<(StatusCode, Json<Category>), Error> {
    let (name, category_type) = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let category = create_category(name, category_type, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(category)))
}

/// Get one of the user's categories.
pub async fn get_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    PathParams(category_id): PathParams<CategoryId>,
) -> Result<Json<Category>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_category(category_id, user_id, &connection).map(Json)
}

/// Replace the name and type of one of the user's categories.
pub async fn update_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    PathParams(category_id): PathParams<CategoryId>,
    JsonBody(data): JsonBody<CategoryData>,
) -> Result<Json<Category>, Error> {
    let (name, category_type) = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    update_category(category_id, name, category_type, user_id, &connection).map(Json)
}

/// Delete one of the user's categories, leaving its transactions uncategorized.
pub async fn delete_category_endpoint(
    State(state): State<CategoryState>,
    Extension(user_id): Extension<UserID>,
    PathParams(category_id): PathParams<CategoryId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_category(category_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
