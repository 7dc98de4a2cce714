use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::expenses::repo_types::{
    required_text, validate_amount, ExpenseCategory, NewExpense, PaymentMethod,
};

/// Body of `POST /expenses`. Every field is required; anything else the
/// client sends (`date`, `user`, `isFraud`) is ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateExpenseRequest {
    pub amount: Option<f64>,
    pub merchant: Option<String>,
    pub location: Option<String>,
    pub category: Option<ExpenseCategory>,
    pub payment_method: Option<PaymentMethod>,
    pub description: Option<String>,
}

impl CreateExpenseRequest {
    pub fn into_new_expense(self, user_id: Uuid) -> AppResult<NewExpense> {
        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        let merchant = self.merchant.ok_or_else(|| missing("merchant"))?;
        let location = self.location.ok_or_else(|| missing("location"))?;
        let category = self.category.ok_or_else(|| missing("category"))?;
        let payment_method = self
            .payment_method
            .ok_or_else(|| missing("paymentMethod"))?;
        let description = self.description.ok_or_else(|| missing("description"))?;

        Ok(NewExpense {
            user_id,
            amount: validate_amount(amount)?,
            merchant: required_text("merchant", merchant)?,
            location: Some(required_text("location", location)?),
            category,
            payment_method,
            description: Some(required_text("description", description)?),
        })
    }
}

fn missing(field: &str) -> AppError {
    AppError::validation(format!("{field} is required"))
}

#[derive(Debug, Serialize)]
pub struct DeletedResponse {
    pub msg: &'static str,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full() -> CreateExpenseRequest {
        serde_json::from_str(
            r#"{"amount":42.50,"merchant":"Cafe","location":"NYC","category":"Food & Dining",
                "paymentMethod":"Cash","description":"lunch","date":"1999-01-01T00:00:00Z"}"#,
        )
        .unwrap()
    }

    #[test]
    fn builds_new_expense() {
        let user = Uuid::new_v4();
        let e = full().into_new_expense(user).unwrap();
        assert_eq!(e.user_id, user);
        assert_eq!(e.amount, 42.5);
        assert_eq!(e.category, ExpenseCategory::FoodAndDining);
        assert_eq!(e.payment_method, PaymentMethod::Cash);
        assert_eq!(e.location.as_deref(), Some("NYC"));
    }

    #[test]
    fn each_field_is_required() {
        let cases: [(&str, fn(&mut CreateExpenseRequest)); 6] = [
            ("amount", |r| r.amount = None),
            ("merchant", |r| r.merchant = None),
            ("location", |r| r.location = None),
            ("category", |r| r.category = None),
            ("paymentMethod", |r| r.payment_method = None),
            ("description", |r| r.description = None),
        ];
        for (field, strip) in cases {
            let mut req = full();
            strip(&mut req);
            let err = req.into_new_expense(Uuid::new_v4()).unwrap_err();
            assert_eq!(err.to_string(), format!("{field} is required"));
        }
    }

    #[test]
    fn blank_text_counts_as_missing() {
        let mut req = full();
        req.merchant = Some("   ".into());
        let err = req.into_new_expense(Uuid::new_v4()).unwrap_err();
        assert_eq!(err.to_string(), "merchant is required");
    }

    #[test]
    fn rejects_unknown_category_label() {
        let res = serde_json::from_str::<CreateExpenseRequest>(r#"{"category":"Groceries"}"#);
        assert!(res.is_err());
    }
}
