//! In-memory repositories. Used by the test-suite and for running the API
//! without Postgres; every operation takes a single lock, matching the
//! per-row atomicity of the SQL store.

use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::auth::{
    repo::UserRepository,
    repo_types::{NewUser, User},
};
use crate::budgets::{
    repo::BudgetRepository,
    repo_types::{Budget, NewBudget},
};
use crate::error::{AppError, AppResult};
use crate::expenses::{
    repo::ExpenseRepository,
    repo_types::{Expense, ExpensePatch, NewExpense},
};

#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<Uuid, User>>,
    expenses: RwLock<HashMap<Uuid, Expense>>,
    budgets: RwLock<Vec<Budget>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn user_count(&self) -> usize {
        self.users.read().await.len()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict("Email already in use"));
        }
        let user = User {
            id: Uuid::new_v4(),
            username: new_user.username,
            email: new_user.email,
            password_hash: new_user.password_hash,
            created_at: OffsetDateTime::now_utc(),
        };
        users.insert(user.id, user.clone());
        Ok(user)
    }
}

#[async_trait]
impl ExpenseRepository for MemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Expense>> {
        let expenses = self.expenses.read().await;
        let mut out: Vec<Expense> = expenses
            .values()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect();
        out.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(out)
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>> {
        Ok(self.expenses.read().await.get(&id).cloned())
    }

    async fn create(&self, e: NewExpense) -> AppResult<Expense> {
        let now = OffsetDateTime::now_utc();
        let expense = Expense {
            id: Uuid::new_v4(),
            user_id: e.user_id,
            amount: e.amount,
            merchant: e.merchant,
            location: e.location,
            category: e.category,
            payment_method: e.payment_method,
            description: e.description,
            date: now,
            is_fraud: false,
            created_at: now,
            updated_at: now,
        };
        self.expenses
            .write()
            .await
            .insert(expense.id, expense.clone());
        Ok(expense)
    }

    async fn update(&self, id: Uuid, patch: &ExpensePatch) -> AppResult<Option<Expense>> {
        let mut expenses = self.expenses.write().await;
        let Some(expense) = expenses.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply(expense);
        expense.updated_at = OffsetDateTime::now_utc();
        Ok(Some(expense.clone()))
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        Ok(self.expenses.write().await.remove(&id).is_some())
    }
}

#[async_trait]
impl BudgetRepository for MemoryStore {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Budget>> {
        let budgets = self.budgets.read().await;
        Ok(budgets
            .iter()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>> {
        let budgets = self.budgets.read().await;
        Ok(budgets.iter().find(|b| b.id == id).cloned())
    }

    async fn create(&self, b: NewBudget) -> AppResult<Budget> {
        let mut budgets = self.budgets.write().await;
        if budgets
            .iter()
            .any(|x| x.user_id == b.user_id && x.category == b.category)
        {
            return Err(AppError::conflict(
                "A budget for this category already exists",
            ));
        }
        let now = OffsetDateTime::now_utc();
        let budget = Budget {
            id: Uuid::new_v4(),
            user_id: b.user_id,
            category: b.category,
            limit: b.limit,
            date: now,
            created_at: now,
            updated_at: now,
        };
        budgets.push(budget.clone());
        Ok(budget)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Budget>> {
        let mut budgets = self.budgets.write().await;
        let Some(pos) = budgets.iter().position(|b| b.id == id) else {
            return Ok(None);
        };
        Ok(Some(budgets.remove(pos)))
    }
}
