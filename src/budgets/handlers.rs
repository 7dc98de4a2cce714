use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::AuthUser,
    budgets::{
        dto::{BudgetSummary, CreateBudgetRequest},
        repo_types::Budget,
        services,
    },
    error::AppResult,
    state::AppState,
};

pub fn budget_routes() -> Router<AppState> {
    Router::new()
        .route("/budget", get(list_budgets).post(create_budget))
        .route("/budget/summary", get(budget_summary))
        .route("/budget/user/:user_id", get(list_user_budgets))
        .route("/budget/:id", get(get_budget).delete(delete_budget))
}

#[instrument(skip(state, payload))]
pub async fn create_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    payload: Result<Json<CreateBudgetRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Budget>)> {
    let Json(payload) = payload?;
    let budget = services::create(state.budgets.as_ref(), user_id, payload).await?;
    Ok((StatusCode::CREATED, Json(budget)))
}

#[instrument(skip(state))]
pub async fn list_budgets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<Vec<Budget>>> {
    Ok(Json(services::list(state.budgets.as_ref(), user_id).await?))
}

#[instrument(skip(state, owner))]
pub async fn list_user_budgets(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    owner: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Vec<Budget>>> {
    let Path(owner) = owner?;
    let budgets = services::list_for_user(state.budgets.as_ref(), user_id, owner).await?;
    Ok(Json(budgets))
}

#[instrument(skip(state, id))]
pub async fn get_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Budget>> {
    let Path(id) = id?;
    Ok(Json(services::get(state.budgets.as_ref(), user_id, id).await?))
}

#[instrument(skip(state, id))]
pub async fn delete_budget(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> AppResult<Json<Budget>> {
    let Path(id) = id?;
    Ok(Json(services::delete(state.budgets.as_ref(), user_id, id).await?))
}

#[instrument(skip(state))]
pub async fn budget_summary(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> AppResult<Json<BudgetSummary>> {
    let summary =
        services::summary(state.budgets.as_ref(), state.expenses.as_ref(), user_id).await?;
    Ok(Json(summary))
}
