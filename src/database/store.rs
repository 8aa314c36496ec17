use async_trait::async_trait;
use thiserror::Error;

use super::models::{
    Client, ClientFields, Court, CourtFields, NewUser, Payment, PaymentFields, ReceiptFields, ReceiptWithClient,
    User,
};

/// Errors from the storage layer
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error(transparent)]
    Sqlx(sqlx::Error),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound("Record not found".to_string()),
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                StoreError::Unavailable(err.to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                StoreError::Conflict("A record with the same unique value already exists".to_string())
            }
            sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
                StoreError::Conflict("The record is referenced by, or references, another record".to_string())
            }
            other => StoreError::Sqlx(other),
        }
    }
}

#[async_trait]
pub trait UserStore: Send + Sync {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError>;
    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;
    /// Fails with `Conflict` when the email is taken
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    /// Clients of `user_id`, newest first
    async fn list_clients(&self, user_id: i64) -> Result<Vec<Client>, StoreError>;
    async fn find_client(&self, id: i64) -> Result<Option<Client>, StoreError>;
    async fn create_client(&self, user_id: i64, fields: ClientFields) -> Result<Client, StoreError>;
    async fn update_client(&self, id: i64, fields: ClientFields) -> Result<Client, StoreError>;
    /// Fails with `Conflict` while receipts still reference the client
    async fn delete_client(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait PaymentStore: Send + Sync {
    /// Payments of `user_id`, newest first
    async fn list_payments(&self, user_id: i64) -> Result<Vec<Payment>, StoreError>;
    async fn find_payment(&self, id: i64) -> Result<Option<Payment>, StoreError>;
    async fn create_payment(&self, user_id: i64, fields: PaymentFields) -> Result<Payment, StoreError>;
    async fn update_payment(&self, id: i64, fields: PaymentFields) -> Result<Payment, StoreError>;
    async fn delete_payment(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait ReceiptStore: Send + Sync {
    /// Receipts of `user_id`, most recently received first
    async fn list_receipts(&self, user_id: i64) -> Result<Vec<ReceiptWithClient>, StoreError>;
    async fn find_receipt(&self, id: i64) -> Result<Option<ReceiptWithClient>, StoreError>;
    async fn create_receipt(&self, user_id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError>;
    async fn update_receipt(&self, id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError>;
    async fn delete_receipt(&self, id: i64) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CourtStore: Send + Sync {
    /// Courts of `user_id`, newest first
    async fn list_courts(&self, user_id: i64) -> Result<Vec<Court>, StoreError>;
    async fn find_court(&self, id: i64) -> Result<Option<Court>, StoreError>;
    async fn create_court(&self, user_id: i64, fields: CourtFields) -> Result<Court, StoreError>;
    async fn update_court(&self, id: i64, fields: CourtFields) -> Result<Court, StoreError>;
    async fn delete_court(&self, id: i64) -> Result<(), StoreError>;
}

/// Everything the API needs from persistence
#[async_trait]
pub trait Store: UserStore + ClientStore + PaymentStore + ReceiptStore + CourtStore {
    async fn health_check(&self) -> Result<(), StoreError>;
}
