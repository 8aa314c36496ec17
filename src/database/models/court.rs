use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

use super::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Court {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub price_per_hour: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CourtFields {
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub phone: String,
    pub price_per_hour: Decimal,
    pub description: Option<String>,
    pub is_active: bool,
}

impl Court {
    pub fn fields(&self) -> CourtFields {
        CourtFields {
            name: self.name.clone(),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            zip_code: self.zip_code.clone(),
            phone: self.phone.clone(),
            price_per_hour: self.price_per_hour,
            description: self.description.clone(),
            is_active: self.is_active,
        }
    }
}

impl Owned for Court {
    const LABEL: &'static str = "Court";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}
