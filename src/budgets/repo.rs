use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::budgets::repo_types::{Budget, BudgetRow, NewBudget};
use crate::db::map_write_error;
use crate::error::AppResult;

#[async_trait]
pub trait BudgetRepository: Send + Sync {
    /// Budgets of one user in creation order.
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Budget>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>>;
    /// Insert a budget. A second budget for the same (user, category) yields
    /// `AppError::Conflict`. Postgres refuses owners that no longer exist
    /// (auth error); `MemoryStore` does not check.
    async fn create(&self, new_budget: NewBudget) -> AppResult<Budget>;
    /// Remove a budget and hand back what was removed.
    async fn delete(&self, id: Uuid) -> AppResult<Option<Budget>>;
}

#[derive(Clone)]
pub struct PgBudgetRepository {
    db: PgPool,
}

impl PgBudgetRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl BudgetRepository for PgBudgetRepository {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Budget>> {
        let rows = sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT id, user_id, category, "limit", date, created_at, updated_at
            FROM budgets
            WHERE user_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Budget::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Budget>> {
        let row = sqlx::query_as::<_, BudgetRow>(
            r#"
            SELECT id, user_id, category, "limit", date, created_at, updated_at
            FROM budgets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Budget::try_from).transpose()
    }

    async fn create(&self, b: NewBudget) -> AppResult<Budget> {
        let row = sqlx::query_as::<_, BudgetRow>(
            r#"
            INSERT INTO budgets (id, user_id, category, "limit", date)
            VALUES ($1, $2, $3, $4, now())
            RETURNING id, user_id, category, "limit", date, created_at, updated_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(b.user_id)
        .bind(b.category.as_str())
        .bind(b.limit)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_write_error(e, "A budget for this category already exists"))?;
        Budget::try_from(row)
    }

    async fn delete(&self, id: Uuid) -> AppResult<Option<Budget>> {
        let row = sqlx::query_as::<_, BudgetRow>(
            r#"
            DELETE FROM budgets
            WHERE id = $1
            RETURNING id, user_id, category, "limit", date, created_at, updated_at
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Budget::try_from).transpose()
    }
}
