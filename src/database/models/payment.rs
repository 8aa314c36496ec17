use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub user_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_method_type: String,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PaymentFields {
    pub amount: Decimal,
    pub currency: String,
    pub status: String,
    pub payment_method_type: String,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
}

impl Payment {
    pub fn fields(&self) -> PaymentFields {
        PaymentFields {
            amount: self.amount,
            currency: self.currency.clone(),
            status: self.status.clone(),
            payment_method_type: self.payment_method_type.clone(),
            description: self.description.clone(),
            transaction_id: self.transaction_id.clone(),
        }
    }
}

impl Owned for Payment {
    const LABEL: &'static str = "Payment";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}
