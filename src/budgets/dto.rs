use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::budgets::repo_types::{Budget, BudgetCategory};

/// Body of `POST /budget`. The owner comes from the token; `user` is only
/// accepted when it names the caller.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateBudgetRequest {
    pub user: Option<Uuid>,
    pub category: Option<BudgetCategory>,
    pub limit: Option<f64>,
}

/// A budget together with what has been spent against it.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetStatus {
    #[serde(flatten)]
    pub budget: Budget,
    pub spent: f64,
    pub remaining: f64,
    pub percent_used: f64,
    pub over_budget: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetSummary {
    pub budgets: Vec<BudgetStatus>,
    pub total_limit: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
}
