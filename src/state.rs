use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{PgUserRepository, UserRepository};
use crate::budgets::{BudgetRepository, PgBudgetRepository};
use crate::config::AppConfig;
use crate::expenses::{ExpenseRepository, PgExpenseRepository};
use crate::memory::MemoryStore;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub users: Arc<dyn UserRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
    pub budgets: Arc<dyn BudgetRepository>,
}

impl AppState {
    /// Postgres-backed state.
    pub fn from_pool(db: PgPool, config: Arc<AppConfig>) -> Self {
        Self {
            config,
            users: Arc::new(PgUserRepository::new(db.clone())),
            expenses: Arc::new(PgExpenseRepository::new(db.clone())),
            budgets: Arc::new(PgBudgetRepository::new(db)),
        }
    }

    /// State over a fresh in-memory store.
    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            config,
            users: store.clone(),
            expenses: store.clone(),
            budgets: store,
        }
    }
}
