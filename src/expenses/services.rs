use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::expenses::dto::CreateExpenseRequest;
use crate::expenses::repo::ExpenseRepository;
use crate::expenses::repo_types::{Expense, ExpensePatch};

pub async fn list(repo: &dyn ExpenseRepository, user_id: Uuid) -> AppResult<Vec<Expense>> {
    repo.list_by_user(user_id).await
}

pub async fn create(
    repo: &dyn ExpenseRepository,
    user_id: Uuid,
    req: CreateExpenseRequest,
) -> AppResult<Expense> {
    let new_expense = req.into_new_expense(user_id)?;
    let expense = repo.create(new_expense).await?;
    info!(expense_id = %expense.id, %user_id, "expense created");
    Ok(expense)
}

/// Resolve an expense and make sure `user_id` owns it.
async fn owned(repo: &dyn ExpenseRepository, id: Uuid, user_id: Uuid) -> AppResult<Expense> {
    let expense = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    if expense.user_id != user_id {
        warn!(expense_id = %id, %user_id, owner = %expense.user_id, "expense ownership mismatch");
        return Err(AppError::auth("Not authorized"));
    }
    Ok(expense)
}

pub async fn update(
    repo: &dyn ExpenseRepository,
    id: Uuid,
    user_id: Uuid,
    patch: ExpensePatch,
) -> AppResult<Expense> {
    owned(repo, id, user_id).await?;
    let patch = patch.validated()?;
    let expense = repo
        .update(id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Expense not found"))?;
    info!(expense_id = %id, %user_id, "expense updated");
    Ok(expense)
}

pub async fn delete(repo: &dyn ExpenseRepository, id: Uuid, user_id: Uuid) -> AppResult<()> {
    owned(repo, id, user_id).await?;
    if !repo.delete(id).await? {
        return Err(AppError::not_found("Expense not found"));
    }
    info!(expense_id = %id, %user_id, "expense removed");
    Ok(())
}
