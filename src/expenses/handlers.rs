use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    error::AppResult,
    expenses::{
        dto::{CreateExpenseRequest, DeletedResponse},
        repo_types::{Expense, ExpensePatch},
        services,
    },
    state::AppState,
};

pub fn expense_routes() -> Router<AppState> {
    Router::new()
        .route("/expenses", get(list_expenses).post(create_expense))
        .route("/expenses/:id", put(update_expense).delete(delete_expense))
}

#[instrument(skip(state))]
pub async fn list_expenses(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Expense>>> {
    let expenses = services::list(state.expenses.as_ref(), user_id).await?;
    Ok(Json(expenses))
}

#[instrument(skip(state, payload))]
pub async fn create_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateExpenseRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Expense>)> {
    let Json(payload) = payload?;
    let expense = services::create(state.expenses.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

#[instrument(skip(state, id, payload))]
pub async fn update_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ExpensePatch>, JsonRejection>,
) -> AppResult<Json<Expense>> {
    let Path(id) = id?;
    let Json(patch) = payload?;
    let expense = services::update(state.expenses.as_ref(), id, user_id, patch).await?;
    Ok(Json(expense))
}

#[instrument(skip(state, id))]
pub async fn delete_expense(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<DeletedResponse>> {
    let Path(id) = id?;
    services::delete(state.expenses.as_ref(), id, user_id).await?;
    Ok(Json(DeletedResponse {
        msg: "Expense removed",
    }))
}
