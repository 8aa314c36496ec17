use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::{Client, Owned};

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Receipt {
    pub id: i64,
    pub user_id: i64,
    pub client_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub received_date: DateTime<Utc>,
    pub status: String,
    pub description: Option<String>,
    pub payment_method: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptFields {
    pub client_id: i64,
    pub amount: Decimal,
    pub currency: String,
    pub received_date: DateTime<Utc>,
    pub status: String,
    pub description: Option<String>,
    pub payment_method: Option<String>,
}

/// Receipt as returned by the API, with the paying client embedded
#[derive(Debug, Clone, Serialize)]
pub struct ReceiptWithClient {
    #[serde(flatten)]
    pub receipt: Receipt,
    pub client: Option<Client>,
}

impl Receipt {
    pub fn fields(&self) -> ReceiptFields {
        ReceiptFields {
            client_id: self.client_id,
            amount: self.amount,
            currency: self.currency.clone(),
            received_date: self.received_date,
            status: self.status.clone(),
            description: self.description.clone(),
            payment_method: self.payment_method.clone(),
        }
    }
}

impl Owned for Receipt {
    const LABEL: &'static str = "Receipt";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}

impl Owned for ReceiptWithClient {
    const LABEL: &'static str = "Receipt";

    fn owner_id(&self) -> i64 {
        self.receipt.user_id
    }
}
