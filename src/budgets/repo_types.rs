use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::AppError;

/// Budget categories. These differ from expense categories; the two sets are
/// matched by label when computing spend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum BudgetCategory {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    Transportation,
    Entertainment,
    Shopping,
    #[serde(rename = "Health & Fitness")]
    HealthAndFitness,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    Travel,
    Education,
    #[default]
    Other,
}

impl BudgetCategory {
    pub const ALL: [BudgetCategory; 9] = [
        BudgetCategory::FoodAndDining,
        BudgetCategory::Transportation,
        BudgetCategory::Entertainment,
        BudgetCategory::Shopping,
        BudgetCategory::HealthAndFitness,
        BudgetCategory::BillsAndUtilities,
        BudgetCategory::Travel,
        BudgetCategory::Education,
        BudgetCategory::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BudgetCategory::FoodAndDining => "Food & Dining",
            BudgetCategory::Transportation => "Transportation",
            BudgetCategory::Entertainment => "Entertainment",
            BudgetCategory::Shopping => "Shopping",
            BudgetCategory::HealthAndFitness => "Health & Fitness",
            BudgetCategory::BillsAndUtilities => "Bills & Utilities",
            BudgetCategory::Travel => "Travel",
            BudgetCategory::Education => "Education",
            BudgetCategory::Other => "Other",
        }
    }
}

impl FromStr for BudgetCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown budget category {s:?}"))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Budget {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub category: BudgetCategory,
    pub limit: f64,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, FromRow)]
pub struct BudgetRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub limit: f64,
    pub date: OffsetDateTime,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<BudgetRow> for Budget {
    type Error = AppError;

    fn try_from(r: BudgetRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            category: r.category.parse()?,
            limit: r.limit,
            date: r.date,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

#[derive(Debug, Clone)]
pub struct NewBudget {
    pub user_id: Uuid,
    pub category: BudgetCategory,
    pub limit: f64,
}
