use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;

use super::Owned;

#[derive(Debug, Clone, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    pub id: i64,
    pub user_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable columns of a client
#[derive(Debug, Clone, PartialEq)]
pub struct ClientFields {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
}

impl Client {
    pub fn fields(&self) -> ClientFields {
        ClientFields {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            address: self.address.clone(),
            is_active: self.is_active,
        }
    }
}

impl Owned for Client {
    const LABEL: &'static str = "Client";

    fn owner_id(&self) -> i64 {
        self.user_id
    }
}
