//! JSON endpoints for monthly budgets.

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
    budget::{
        Budget, BudgetData, BudgetId, create_budget, delete_budget, get_budget, get_budgets,
        update_budget,
    },
    db::lock_connection,
    extract::{JsonBody, PathParams},
};

/// The state needed by the budget endpoints.
#[derive(Debug, Clone)]
pub struct BudgetState {
    pub db_connection: Arc<Mutex<Connection>>,
}

impl FromRef<AppState> for BudgetState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// List the user's budgets, latest month first.
pub async fn list_budgets_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
) -> Result<Json<Vec<Budget>>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budgets(user_id, &connection).map(Json)
}

/// Set the user's budget for a month.
///
/// Fails with a 400 if the user already has a budget for that month.
pub async fn create_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    JsonBody(data): JsonBody<BudgetData>,
) -> Result<(StatusCode, Json<Budget>), Error> {
    let (month, amount) = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    let budget = create_budget(month, amount, user_id, &connection)?;

    Ok((StatusCode::CREATED, Json(budget)))
}

pub async fn get_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    PathParams(budget_id): PathParams<BudgetId>,
) -> Result<Json<Budget>, Error> {
    let connection = lock_connection(&state.db_connection)?;

    get_budget(budget_id, user_id, &connection).map(Json)
}

pub async fn update_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    PathParams(budget_id): PathParams<BudgetId>,
    JsonBody(data): JsonBody<BudgetData>,
) -> Result<Json<Budget>, Error> {
    let (month, amount) = data.validate()?;
    let connection = lock_connection(&state.db_connection)?;

    update_budget(budget_id, month, amount, user_id, &connection).map(Json)
}

pub async fn delete_budget_endpoint(
    State(state): State<BudgetState>,
    Extension(user_id): Extension<UserID>,
    PathParams(budget_id): PathParams<BudgetId>,
) -> Result<StatusCode, Error> {
    let connection = lock_connection(&state.db_connection)?;

    delete_budget(budget_id, user_id, &connection)?;

    Ok(StatusCode::NO_CONTENT)
}
