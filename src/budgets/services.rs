use std::collections::HashMap;

use tracing::{info, warn};
use uuid::Uuid;

use crate::budgets::{
    dto::{BudgetStatus, BudgetSummary, CreateBudgetRequest},
    repo::BudgetRepository,
    repo_types::{Budget, NewBudget},
};
use crate::error::{AppError, AppResult};
use crate::expenses::repo::ExpenseRepository;

pub async fn create(
    repo: &dyn BudgetRepository,
    caller: Uuid,
    req: CreateBudgetRequest,
) -> AppResult<Budget> {
    if let Some(user) = req.user {
        if user != caller {
            warn!(%caller, %user, "budget create for another user");
            return Err(AppError::auth("Not authorized"));
        }
    }

    let limit = req
        .limit
        .ok_or_else(|| AppError::validation("limit is required"))?;
    if !limit.is_finite() || limit <= 0.0 {
        return Err(AppError::validation("limit must be a positive number"));
    }
    let category = req.category.unwrap_or_default();

    let existing = repo.list_by_user(caller).await?;
    if existing.iter().any(|b| b.category == category) {
        return Err(AppError::conflict(
            "A budget for this category already exists",
        ));
    }

    let budget = repo
        .create(NewBudget {
            user_id: caller,
            category,
            limit,
        })
        .await?;
    info!(budget_id = %budget.id, user_id = %caller, category = budget.category.as_str(), "budget created");
    Ok(budget)
}

pub async fn list(repo: &dyn BudgetRepository, caller: Uuid) -> AppResult<Vec<Budget>> {
    repo.list_by_user(caller).await
}

pub async fn list_for_user(
    repo: &dyn BudgetRepository,
    caller: Uuid,
    user_id: Uuid,
) -> AppResult<Vec<Budget>> {
    if user_id != caller {
        warn!(%caller, %user_id, "budget list for another user");
        return Err(AppError::auth("Not authorized"));
    }
    repo.list_by_user(user_id).await
}

pub async fn get(repo: &dyn BudgetRepository, caller: Uuid, id: Uuid) -> AppResult<Budget> {
    let budget = repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    if budget.user_id != caller {
        warn!(budget_id = %id, %caller, owner = %budget.user_id, "budget ownership mismatch");
        return Err(AppError::auth("Not authorized"));
    }
    Ok(budget)
}

pub async fn delete(repo: &dyn BudgetRepository, caller: Uuid, id: Uuid) -> AppResult<Budget> {
    get(repo, caller, id).await?;
    let budget = repo
        .delete(id)
        .await?
        .ok_or_else(|| AppError::not_found("Budget not found"))?;
    info!(budget_id = %id, user_id = %caller, "budget deleted");
    Ok(budget)
}

pub async fn summary(
    budgets: &dyn BudgetRepository,
    expenses: &dyn ExpenseRepository,
    caller: Uuid,
) -> AppResult<BudgetSummary> {
    let budgets = budgets.list_by_user(caller).await?;
    let expenses = expenses.list_by_user(caller).await?;

    let mut spent_by_label: HashMap<&'static str, f64> = HashMap::new();
    for e in &expenses {
        *spent_by_label.entry(e.category.as_str()).or_default() += e.amount;
    }

    Ok(summarize(budgets, &spent_by_label))
}

fn summarize(budgets: Vec<Budget>, spent_by_label: &HashMap<&'static str, f64>) -> BudgetSummary {
    let statuses: Vec<BudgetStatus> = budgets
        .into_iter()
        .map(|budget| {
            let spent = spent_by_label
                .get(budget.category.as_str())
                .copied()
                .unwrap_or(0.0);
            let percent_used = if budget.limit > 0.0 {
                spent / budget.limit * 100.0
            } else {
                0.0
            };
            BudgetStatus {
                remaining: budget.limit - spent,
                over_budget: spent > budget.limit,
                spent,
                percent_used,
                budget,
            }
        })
        .collect();

    let total_limit: f64 = statuses.iter().map(|s| s.budget.limit).sum();
    let total_spent: f64 = statuses.iter().map(|s| s.spent).sum();
    BudgetSummary {
        budgets: statuses,
        total_limit,
        total_spent,
        total_remaining: total_limit - total_spent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::budgets::repo_types::BudgetCategory;
    use crate::expenses::repo_types::{ExpenseCategory, NewExpense, PaymentMethod};
    use crate::memory::MemoryStore;

    fn req(category: BudgetCategory, limit: f64) -> CreateBudgetRequest {
        CreateBudgetRequest {
            user: None,
            category: Some(category),
            limit: Some(limit),
        }
    }

    async fn spend(store: &MemoryStore, user_id: Uuid, category: ExpenseCategory, amount: f64) {
        ExpenseRepository::create(
            store,
            NewExpense {
                user_id,
                amount,
                merchant: "Shop".into(),
                location: None,
                category,
                payment_method: PaymentMethod::Cash,
                description: None,
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn create_defaults_category_and_requires_limit() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();

        let err = create(&store, bob, CreateBudgetRequest::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));

        let budget = create(
            &store,
            bob,
            CreateBudgetRequest {
                limit: Some(100.0),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(budget.category, BudgetCategory::Other);
        assert_eq!(budget.user_id, bob);
    }

    #[tokio::test]
    async fn create_rejects_non_positive_limit() {
        let store = MemoryStore::new();
        for limit in [0.0, -10.0, f64::NAN] {
            let err = create(&store, Uuid::new_v4(), req(BudgetCategory::Travel, limit))
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)));
        }
    }

    #[tokio::test]
    async fn create_for_someone_else_is_refused() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();
        let mut r = req(BudgetCategory::Travel, 500.0);
        r.user = Some(Uuid::new_v4());
        let err = create(&store, bob, r).await.unwrap_err();
        assert!(matches!(err, AppError::Auth(_)));

        let mut r = req(BudgetCategory::Travel, 500.0);
        r.user = Some(bob);
        assert!(create(&store, bob, r).await.is_ok());
    }

    #[tokio::test]
    async fn one_budget_per_category() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();
        create(&store, bob, req(BudgetCategory::Travel, 500.0))
            .await
            .unwrap();
        let err = create(&store, bob, req(BudgetCategory::Travel, 900.0))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));

        // Another user may hold the same category.
        create(&store, Uuid::new_v4(), req(BudgetCategory::Travel, 50.0))
            .await
            .unwrap();
        assert_eq!(list(&store, bob).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn reads_and_deletes_are_owner_only() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();
        let eve = Uuid::new_v4();
        let budget = create(&store, bob, req(BudgetCategory::Shopping, 200.0))
            .await
            .unwrap();

        assert!(matches!(
            get(&store, eve, budget.id).await.unwrap_err(),
            AppError::Auth(_)
        ));
        assert!(matches!(
            delete(&store, eve, budget.id).await.unwrap_err(),
            AppError::Auth(_)
        ));
        assert!(matches!(
            list_for_user(&store, eve, bob).await.unwrap_err(),
            AppError::Auth(_)
        ));
        assert!(list(&store, eve).await.unwrap().is_empty());

        let deleted = delete(&store, bob, budget.id).await.unwrap();
        assert_eq!(deleted, budget);
        assert!(matches!(
            get(&store, bob, budget.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            delete(&store, bob, budget.id).await.unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn summary_sums_matching_expenses() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();
        create(&store, bob, req(BudgetCategory::Travel, 500.0))
            .await
            .unwrap();
        create(&store, bob, req(BudgetCategory::FoodAndDining, 40.0))
            .await
            .unwrap();
        create(&store, bob, req(BudgetCategory::HealthAndFitness, 60.0))
            .await
            .unwrap();

        spend(&store, bob, ExpenseCategory::FoodAndDining, 30.0).await;
        spend(&store, bob, ExpenseCategory::FoodAndDining, 20.0).await;
        spend(&store, bob, ExpenseCategory::Travel, 125.0).await;
        spend(&store, bob, ExpenseCategory::Healthcare, 99.0).await;
        spend(&store, Uuid::new_v4(), ExpenseCategory::Travel, 1000.0).await;

        let s = summary(&store, &store, bob).await.unwrap();
        let by_cat = |c: BudgetCategory| {
            s.budgets
                .iter()
                .find(|b| b.budget.category == c)
                .unwrap()
                .clone()
        };

        let travel = by_cat(BudgetCategory::Travel);
        assert_eq!(travel.spent, 125.0);
        assert_eq!(travel.remaining, 375.0);
        assert_eq!(travel.percent_used, 25.0);
        assert!(!travel.over_budget);

        let food = by_cat(BudgetCategory::FoodAndDining);
        assert_eq!(food.spent, 50.0);
        assert_eq!(food.remaining, -10.0);
        assert!(food.over_budget);

        // "Healthcare" expenses do not match the "Health & Fitness" budget.
        assert_eq!(by_cat(BudgetCategory::HealthAndFitness).spent, 0.0);

        assert_eq!(s.total_limit, 600.0);
        assert_eq!(s.total_spent, 175.0);
        assert_eq!(s.total_remaining, 425.0);
    }

    #[tokio::test]
    async fn summary_without_expenses_is_zero() {
        let store = MemoryStore::new();
        let bob = Uuid::new_v4();
        create(&store, bob, req(BudgetCategory::Travel, 500.0))
            .await
            .unwrap();
        let s = summary(&store, &store, bob).await.unwrap();
        assert_eq!(s.budgets.len(), 1);
        assert_eq!(s.budgets[0].spent, 0.0);
        assert_eq!(s.budgets[0].percent_used, 0.0);
    }
}
