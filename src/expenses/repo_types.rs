use std::str::FromStr;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ExpenseCategory {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    Transportation,
    Shopping,
    Entertainment,
    Utilities,
    Healthcare,
    Education,
    Travel,
    #[default]
    Other,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 9] = [
        ExpenseCategory::FoodAndDining,
        ExpenseCategory::Transportation,
        ExpenseCategory::Shopping,
        ExpenseCategory::Entertainment,
        ExpenseCategory::Utilities,
        ExpenseCategory::Healthcare,
        ExpenseCategory::Education,
        ExpenseCategory::Travel,
        ExpenseCategory::Other,
    ];

    /// Label used on the wire and in the `category` column.
    pub fn as_str(self) -> &'static str {
        match self {
            ExpenseCategory::FoodAndDining => "Food & Dining",
            ExpenseCategory::Transportation => "Transportation",
            ExpenseCategory::Shopping => "Shopping",
            ExpenseCategory::Entertainment => "Entertainment",
            ExpenseCategory::Utilities => "Utilities",
            ExpenseCategory::Healthcare => "Healthcare",
            ExpenseCategory::Education => "Education",
            ExpenseCategory::Travel => "Travel",
            ExpenseCategory::Other => "Other",
        }
    }
}

impl FromStr for ExpenseCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown expense category {s:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum PaymentMethod {
    Cash,
    #[default]
    #[serde(rename = "Credit Card")]
    CreditCard,
    #[serde(rename = "Debit Card")]
    DebitCard,
    #[serde(rename = "Bank Transfer")]
    BankTransfer,
    #[serde(rename = "Digital Wallet")]
    DigitalWallet,
    Other,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 6] = [
        PaymentMethod::Cash,
        PaymentMethod::CreditCard,
        PaymentMethod::DebitCard,
        PaymentMethod::BankTransfer,
        PaymentMethod::DigitalWallet,
        PaymentMethod::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMethod::Cash => "Cash",
            PaymentMethod::CreditCard => "Credit Card",
            PaymentMethod::DebitCard => "Debit Card",
            PaymentMethod::BankTransfer => "Bank Transfer",
            PaymentMethod::DigitalWallet => "Digital Wallet",
            PaymentMethod::Other => "Other",
        }
    }
}

impl FromStr for PaymentMethod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| anyhow::anyhow!("unknown payment method {s:?}"))
    }
}

/// An expense as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: Uuid,
    #[serde(rename = "user")]
    pub user_id: Uuid,
    pub amount: f64,
    pub merchant: String,
    pub location: Option<String>,
    pub category: ExpenseCategory,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub date: OffsetDateTime,
    pub is_fraud: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

/// Raw `expenses` row; enum columns are stored as their labels.
#[derive(Debug, FromRow)]
pub struct ExpenseRow {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount: f64,
    pub merchant: String,
    pub location: Option<String>,
    pub category: String,
    pub payment_method: String,
    pub description: Option<String>,
    pub date: OffsetDateTime,
    pub is_fraud: bool,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = AppError;

    fn try_from(r: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            user_id: r.user_id,
            amount: r.amount,
            merchant: r.merchant,
            location: r.location,
            category: r.category.parse()?,
            payment_method: r.payment_method.parse()?,
            description: r.description,
            date: r.date,
            is_fraud: r.is_fraud,
            created_at: r.created_at,
            updated_at: r.updated_at,
        })
    }
}

/// Validated input for inserting an expense. The store stamps `date`.
#[derive(Debug, Clone)]
pub struct NewExpense {
    pub user_id: Uuid,
    pub amount: f64,
    pub merchant: String,
    pub location: Option<String>,
    pub category: ExpenseCategory,
    pub payment_method: PaymentMethod,
    pub description: Option<String>,
}

/// Partial update of an expense. Absent fields keep their stored value;
/// unknown keys are rejected.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ExpensePatch {
    pub amount: Option<f64>,
    pub merchant: Option<String>,
    pub location: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
    pub is_fraud: Option<bool>,
}

impl ExpensePatch {
    /// Checks present fields with the same rules as creation and trims text.
    pub fn validated(self) -> AppResult<Self> {
        if let Some(amount) = self.amount {
            validate_amount(amount)?;
        }
        Ok(Self {
            merchant: self.merchant.map(|v| required_text("merchant", v)).transpose()?,
            location: self.location.map(|v| required_text("location", v)).transpose()?,
            description: self
                .description
                .map(|v| required_text("description", v))
                .transpose()?,
            ..self
        })
    }

    pub fn apply(&self, expense: &mut Expense) {
        if let Some(amount) = self.amount {
            expense.amount = amount;
        }
        if let Some(merchant) = &self.merchant {
            expense.merchant = merchant.clone();
        }
        if let Some(location) = &self.location {
            expense.location = Some(location.clone());
        }
        if let Some(category) = self.category {
            expense.category = category;
        }
        if let Some(method) = self.payment_method {
            expense.payment_method = method;
        }
        if let Some(description) = &self.description {
            expense.description = Some(description.clone());
        }
        if let Some(is_fraud) = self.is_fraud {
            expense.is_fraud = is_fraud;
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> AppResult<f64> {
    if amount.is_finite() && amount > 0.0 {
        Ok(amount)
    } else {
        Err(AppError::validation("amount must be a positive number"))
    }
}

pub(crate) fn required_text(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{field} is required")));
    }
    Ok(trimmed.to_string())
}
