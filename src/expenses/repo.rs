use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::map_write_error;
use crate::error::AppResult;
use crate::expenses::repo_types::{Expense, ExpensePatch, ExpenseRow, NewExpense};

#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    /// All expenses of a user, newest `date` first.
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Expense>>;
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>>;
    /// Insert an expense; `date` is set to the current time. Postgres refuses
    /// owners that no longer exist (auth error); `MemoryStore` does not check.
    async fn create(&self, new_expense: NewExpense) -> AppResult<Expense>;
    /// Apply a patch; `None` when the row no longer exists.
    async fn update(&self, id: Uuid, patch: &ExpensePatch) -> AppResult<Option<Expense>>;
    /// Remove a row; `false` when nothing was deleted.
    async fn delete(&self, id: Uuid) -> AppResult<bool>;
}

const COLUMNS: &str = "id, user_id, amount, merchant, location, category, payment_method, \
                       description, date, is_fraud, created_at, updated_at";

#[derive(Clone)]
pub struct PgExpenseRepository {
    db: PgPool,
}

impl PgExpenseRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ExpenseRepository for PgExpenseRepository {
    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Expense>> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            SELECT {COLUMNS}
            FROM expenses
            WHERE user_id = $1
            ORDER BY date DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;
        rows.into_iter().map(Expense::try_from).collect()
    }

    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            "SELECT {COLUMNS} FROM expenses WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        row.map(Expense::try_from).transpose()
    }

    async fn create(&self, e: NewExpense) -> AppResult<Expense> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            INSERT INTO expenses
                (id, user_id, amount, merchant, location, category, payment_method, description, date)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, now())
            RETURNING {COLUMNS}
            "#
        ))
        .bind(Uuid::new_v4())
        .bind(e.user_id)
        .bind(e.amount)
        .bind(&e.merchant)
        .bind(&e.location)
        .bind(e.category.as_str())
        .bind(e.payment_method.as_str())
        .bind(&e.description)
        .fetch_one(&self.db)
        .await
        .map_err(|err| map_write_error(err, "Expense already exists"))?;
        Expense::try_from(row)
    }

    async fn update(&self, id: Uuid, patch: &ExpensePatch) -> AppResult<Option<Expense>> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!(
            r#"
            UPDATE expenses SET
                amount         = COALESCE($2, amount),
                merchant       = COALESCE($3, merchant),
                location       = COALESCE($4, location),
                category       = COALESCE($5, category),
                payment_method = COALESCE($6, payment_method),
                description    = COALESCE($7, description),
                is_fraud       = COALESCE($8, is_fraud),
                updated_at     = now()
            WHERE id = $1
            RETURNING {COLUMNS}
            "#
        ))
        .bind(id)
        .bind(patch.amount)
        .bind(&patch.merchant)
        .bind(&patch.location)
        .bind(patch.category.map(|c| c.as_str()))
        .bind(patch.payment_method.map(|m| m.as_str()))
        .bind(&patch.description)
        .bind(patch.is_fraud)
        .fetch_optional(&self.db)
        .await?;
        row.map(Expense::try_from).transpose()
    }

    async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let res = sqlx::query("DELETE FROM expenses WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
