use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::PgPool;

use super::models::{
    Client, ClientFields, Court, CourtFields, NewUser, Payment, PaymentFields, Receipt, ReceiptFields,
    ReceiptWithClient, User,
};
use super::store::{ClientStore, CourtStore, PaymentStore, ReceiptStore, Store, StoreError, UserStore};

/// PostgreSQL-backed store
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the clients referenced by `receipts` in one query and pair them up
    async fn attach_clients(&self, receipts: Vec<Receipt>) -> Result<Vec<ReceiptWithClient>, StoreError> {
        let mut ids: Vec<i64> = receipts.iter().map(|r| r.client_id).collect();
        ids.sort_unstable();
        ids.dedup();

        let clients: HashMap<i64, Client> = if ids.is_empty() {
            HashMap::new()
        } else {
            sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&self.pool)
                .await?
                .into_iter()
                .map(|c| (c.id, c))
                .collect()
        };

        Ok(receipts
            .into_iter()
            .map(|receipt| {
                let client = clients.get(&receipt.client_id).cloned();
                ReceiptWithClient { receipt, client }
            })
            .collect())
    }

    async fn with_client(&self, receipt: Receipt) -> Result<ReceiptWithClient, StoreError> {
        let mut attached = self.attach_clients(vec![receipt]).await?;
        attached
            .pop()
            .ok_or_else(|| StoreError::NotFound("Receipt not found".to_string()))
    }
}

fn deleted_or_missing(rows_affected: u64, label: &str) -> Result<(), StoreError> {
    if rows_affected == 0 {
        return Err(StoreError::NotFound(format!("{} not found", label)));
    }
    Ok(())
}

#[async_trait]
impl UserStore for PgStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let created = sqlx::query_as::<_, User>(
            "INSERT INTO users (name, email, password) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(user.name)
        .bind(user.email)
        .bind(user.password)
        .fetch_one(&self.pool)
        .await?;
        Ok(created)
    }
}

#[async_trait]
impl ClientStore for PgStore {
    async fn list_clients(&self, user_id: i64) -> Result<Vec<Client>, StoreError> {
        let clients = sqlx::query_as::<_, Client>(
            "SELECT * FROM clients WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(clients)
    }

    async fn find_client(&self, id: i64) -> Result<Option<Client>, StoreError> {
        let client = sqlx::query_as::<_, Client>("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(client)
    }

    async fn create_client(&self, user_id: i64, fields: ClientFields) -> Result<Client, StoreError> {
        let client = sqlx::query_as::<_, Client>(
            r#"
            INSERT INTO clients (user_id, name, email, phone, address, is_active)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.email)
        .bind(fields.phone)
        .bind(fields.address)
        .bind(fields.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(client)
    }

    async fn update_client(&self, id: i64, fields: ClientFields) -> Result<Client, StoreError> {
        sqlx::query_as::<_, Client>(
            r#"
            UPDATE clients
            SET name = $2, email = $3, phone = $4, address = $5, is_active = $6, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.email)
        .bind(fields.phone)
        .bind(fields.address)
        .bind(fields.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Client not found".to_string()))
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        deleted_or_missing(result.rows_affected(), "Client")
    }
}

#[async_trait]
impl PaymentStore for PgStore {
    async fn list_payments(&self, user_id: i64) -> Result<Vec<Payment>, StoreError> {
        let payments = sqlx::query_as::<_, Payment>(
            "SELECT * FROM payments WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(payments)
    }

    async fn find_payment(&self, id: i64) -> Result<Option<Payment>, StoreError> {
        let payment = sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(payment)
    }

    async fn create_payment(&self, user_id: i64, fields: PaymentFields) -> Result<Payment, StoreError> {
        let payment = sqlx::query_as::<_, Payment>(
            r#"
            INSERT INTO payments (user_id, amount, currency, status, payment_method_type, description, transaction_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(fields.amount)
        .bind(fields.currency)
        .bind(fields.status)
        .bind(fields.payment_method_type)
        .bind(fields.description)
        .bind(fields.transaction_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(payment)
    }

    async fn update_payment(&self, id: i64, fields: PaymentFields) -> Result<Payment, StoreError> {
        sqlx::query_as::<_, Payment>(
            r#"
            UPDATE payments
            SET amount = $2, currency = $3, status = $4, payment_method_type = $5,
                description = $6, transaction_id = $7, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.amount)
        .bind(fields.currency)
        .bind(fields.status)
        .bind(fields.payment_method_type)
        .bind(fields.description)
        .bind(fields.transaction_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))
    }

    async fn delete_payment(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM payments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        deleted_or_missing(result.rows_affected(), "Payment")
    }
}

#[async_trait]
impl ReceiptStore for PgStore {
    async fn list_receipts(&self, user_id: i64) -> Result<Vec<ReceiptWithClient>, StoreError> {
        let receipts = sqlx::query_as::<_, Receipt>(
            "SELECT * FROM receipts WHERE user_id = $1 ORDER BY received_date DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.attach_clients(receipts).await
    }

    async fn find_receipt(&self, id: i64) -> Result<Option<ReceiptWithClient>, StoreError> {
        let receipt = sqlx::query_as::<_, Receipt>("SELECT * FROM receipts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match receipt {
            Some(receipt) => Ok(Some(self.with_client(receipt).await?)),
            None => Ok(None),
        }
    }

    async fn create_receipt(&self, user_id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            INSERT INTO receipts
                (user_id, client_id, amount, currency, received_date, status, description, payment_method)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(fields.client_id)
        .bind(fields.amount)
        .bind(fields.currency)
        .bind(fields.received_date)
        .bind(fields.status)
        .bind(fields.description)
        .bind(fields.payment_method)
        .fetch_one(&self.pool)
        .await?;
        self.with_client(receipt).await
    }

    async fn update_receipt(&self, id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError> {
        let receipt = sqlx::query_as::<_, Receipt>(
            r#"
            UPDATE receipts
            SET client_id = $2, amount = $3, currency = $4, received_date = $5, status = $6,
                description = $7, payment_method = $8, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.client_id)
        .bind(fields.amount)
        .bind(fields.currency)
        .bind(fields.received_date)
        .bind(fields.status)
        .bind(fields.description)
        .bind(fields.payment_method)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Receipt not found".to_string()))?;
        self.with_client(receipt).await
    }

    async fn delete_receipt(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM receipts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        deleted_or_missing(result.rows_affected(), "Receipt")
    }
}

#[async_trait]
impl CourtStore for PgStore {
    async fn list_courts(&self, user_id: i64) -> Result<Vec<Court>, StoreError> {
        let courts = sqlx::query_as::<_, Court>(
            "SELECT * FROM courts WHERE user_id = $1 ORDER BY created_at DESC, id DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(courts)
    }

    async fn find_court(&self, id: i64) -> Result<Option<Court>, StoreError> {
        let court = sqlx::query_as::<_, Court>("SELECT * FROM courts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(court)
    }

    async fn create_court(&self, user_id: i64, fields: CourtFields) -> Result<Court, StoreError> {
        let court = sqlx::query_as::<_, Court>(
            r#"
            INSERT INTO courts
                (user_id, name, address, city, state, zip_code, phone, price_per_hour, description, is_active)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(fields.name)
        .bind(fields.address)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip_code)
        .bind(fields.phone)
        .bind(fields.price_per_hour)
        .bind(fields.description)
        .bind(fields.is_active)
        .fetch_one(&self.pool)
        .await?;
        Ok(court)
    }

    async fn update_court(&self, id: i64, fields: CourtFields) -> Result<Court, StoreError> {
        sqlx::query_as::<_, Court>(
            r#"
            UPDATE courts
            SET name = $2, address = $3, city = $4, state = $5, zip_code = $6, phone = $7,
                price_per_hour = $8, description = $9, is_active = $10, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(fields.name)
        .bind(fields.address)
        .bind(fields.city)
        .bind(fields.state)
        .bind(fields.zip_code)
        .bind(fields.phone)
        .bind(fields.price_per_hour)
        .bind(fields.description)
        .bind(fields.is_active)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| StoreError::NotFound("Court not found".to_string()))
    }

    async fn delete_court(&self, id: i64) -> Result<(), StoreError> {
        let result = sqlx::query("DELETE FROM courts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        deleted_or_missing(result.rows_affected(), "Court")
    }
}

#[async_trait]
impl Store for PgStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
