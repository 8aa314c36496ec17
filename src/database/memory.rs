use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use super::models::{
    Client, ClientFields, Court, CourtFields, NewUser, Payment, PaymentFields, Receipt, ReceiptFields,
    ReceiptWithClient, User,
};
use super::store::{ClientStore, CourtStore, PaymentStore, ReceiptStore, Store, StoreError, UserStore};

#[derive(Default)]
struct Tables {
    last_id: i64,
    users: BTreeMap<i64, User>,
    clients: BTreeMap<i64, Client>,
    payments: BTreeMap<i64, Payment>,
    receipts: BTreeMap<i64, Receipt>,
    courts: BTreeMap<i64, Court>,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    fn with_client(&self, receipt: &Receipt) -> ReceiptWithClient {
        ReceiptWithClient {
            receipt: receipt.clone(),
            client: self.clients.get(&receipt.client_id).cloned(),
        }
    }

    fn require_user(&self, user_id: i64) -> Result<(), StoreError> {
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::Conflict(format!("User {} does not exist", user_id)));
        }
        Ok(())
    }

    fn require_client(&self, client_id: i64) -> Result<(), StoreError> {
        if !self.clients.contains_key(&client_id) {
            return Err(StoreError::Conflict(format!("Client {} does not exist", client_id)));
        }
        Ok(())
    }
}

/// Rows owned by `user_id`, newest first (ties broken by id)
fn newest_first<T: Clone>(
    rows: &BTreeMap<i64, T>,
    owner: impl Fn(&T) -> i64,
    created: impl Fn(&T) -> chrono::DateTime<Utc>,
    user_id: i64,
) -> Vec<T> {
    let mut owned: Vec<(i64, &T)> = rows
        .iter()
        .filter(|(_, row)| owner(*row) == user_id)
        .map(|(id, row)| (*id, row))
        .collect();
    owned.sort_by(|(a_id, a), (b_id, b)| created(*b).cmp(&created(*a)).then(b_id.cmp(a_id)));
    owned.into_iter().map(|(_, row)| row.clone()).collect()
}

/// Process-local store with the same contract as the PostgreSQL one,
/// including the unique email and foreign key rules.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_user(&self, id: i64) -> Result<Option<User>, StoreError> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict("A record with the same unique value already exists".to_string()));
        }

        let now = Utc::now();
        let created = User {
            id: tables.next_id(),
            name: user.name,
            email: user.email,
            password: user.password,
            created_at: now,
            updated_at: now,
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }
}

#[async_trait]
impl ClientStore for MemoryStore {
    async fn list_clients(&self, user_id: i64) -> Result<Vec<Client>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.clients, |c| c.user_id, |c| c.created_at, user_id))
    }

    async fn find_client(&self, id: i64) -> Result<Option<Client>, StoreError> {
        Ok(self.tables.read().await.clients.get(&id).cloned())
    }

    async fn create_client(&self, user_id: i64, fields: ClientFields) -> Result<Client, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;

        let now = Utc::now();
        let client = Client {
            id: tables.next_id(),
            user_id,
            name: fields.name,
            email: fields.email,
            phone: fields.phone,
            address: fields.address,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.clients.insert(client.id, client.clone());
        Ok(client)
    }

    async fn update_client(&self, id: i64, fields: ClientFields) -> Result<Client, StoreError> {
        let mut tables = self.tables.write().await;
        let client = tables
            .clients
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Client not found".to_string()))?;

        client.name = fields.name;
        client.email = fields.email;
        client.phone = fields.phone;
        client.address = fields.address;
        client.is_active = fields.is_active;
        client.updated_at = Utc::now();
        Ok(client.clone())
    }

    async fn delete_client(&self, id: i64) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        if tables.receipts.values().any(|r| r.client_id == id) {
            return Err(StoreError::Conflict(
                "The record is referenced by, or references, another record".to_string(),
            ));
        }
        tables
            .clients
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Client not found".to_string()))
    }
}

#[async_trait]
impl PaymentStore for MemoryStore {
    async fn list_payments(&self, user_id: i64) -> Result<Vec<Payment>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.payments, |p| p.user_id, |p| p.created_at, user_id))
    }

    async fn find_payment(&self, id: i64) -> Result<Option<Payment>, StoreError> {
        Ok(self.tables.read().await.payments.get(&id).cloned())
    }

    async fn create_payment(&self, user_id: i64, fields: PaymentFields) -> Result<Payment, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;

        let now = Utc::now();
        let payment = Payment {
            id: tables.next_id(),
            user_id,
            amount: fields.amount,
            currency: fields.currency,
            status: fields.status,
            payment_method_type: fields.payment_method_type,
            description: fields.description,
            transaction_id: fields.transaction_id,
            created_at: now,
            updated_at: now,
        };
        tables.payments.insert(payment.id, payment.clone());
        Ok(payment)
    }

    async fn update_payment(&self, id: i64, fields: PaymentFields) -> Result<Payment, StoreError> {
        let mut tables = self.tables.write().await;
        let payment = tables
            .payments
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))?;

        payment.amount = fields.amount;
        payment.currency = fields.currency;
        payment.status = fields.status;
        payment.payment_method_type = fields.payment_method_type;
        payment.description = fields.description;
        payment.transaction_id = fields.transaction_id;
        payment.updated_at = Utc::now();
        Ok(payment.clone())
    }

    async fn delete_payment(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .payments
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Payment not found".to_string()))
    }
}

#[async_trait]
impl ReceiptStore for MemoryStore {
    async fn list_receipts(&self, user_id: i64) -> Result<Vec<ReceiptWithClient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.receipts, |r| r.user_id, |r| r.received_date, user_id)
            .iter()
            .map(|r| tables.with_client(r))
            .collect())
    }

    async fn find_receipt(&self, id: i64) -> Result<Option<ReceiptWithClient>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.receipts.get(&id).map(|r| tables.with_client(r)))
    }

    async fn create_receipt(&self, user_id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;
        tables.require_client(fields.client_id)?;

        let now = Utc::now();
        let receipt = Receipt {
            id: tables.next_id(),
            user_id,
            client_id: fields.client_id,
            amount: fields.amount,
            currency: fields.currency,
            received_date: fields.received_date,
            status: fields.status,
            description: fields.description,
            payment_method: fields.payment_method,
            created_at: now,
            updated_at: now,
        };
        tables.receipts.insert(receipt.id, receipt.clone());
        Ok(tables.with_client(&receipt))
    }

    async fn update_receipt(&self, id: i64, fields: ReceiptFields) -> Result<ReceiptWithClient, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_client(fields.client_id)?;

        let receipt = tables
            .receipts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Receipt not found".to_string()))?;

        receipt.client_id = fields.client_id;
        receipt.amount = fields.amount;
        receipt.currency = fields.currency;
        receipt.received_date = fields.received_date;
        receipt.status = fields.status;
        receipt.description = fields.description;
        receipt.payment_method = fields.payment_method;
        receipt.updated_at = Utc::now();

        let updated = receipt.clone();
        Ok(tables.with_client(&updated))
    }

    async fn delete_receipt(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .receipts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Receipt not found".to_string()))
    }
}

#[async_trait]
impl CourtStore for MemoryStore {
    async fn list_courts(&self, user_id: i64) -> Result<Vec<Court>, StoreError> {
        let tables = self.tables.read().await;
        Ok(newest_first(&tables.courts, |c| c.user_id, |c| c.created_at, user_id))
    }

    async fn find_court(&self, id: i64) -> Result<Option<Court>, StoreError> {
        Ok(self.tables.read().await.courts.get(&id).cloned())
    }

    async fn create_court(&self, user_id: i64, fields: CourtFields) -> Result<Court, StoreError> {
        let mut tables = self.tables.write().await;
        tables.require_user(user_id)?;

        let now = Utc::now();
        let court = Court {
            id: tables.next_id(),
            user_id,
            name: fields.name,
            address: fields.address,
            city: fields.city,
            state: fields.state,
            zip_code: fields.zip_code,
            phone: fields.phone,
            price_per_hour: fields.price_per_hour,
            description: fields.description,
            is_active: fields.is_active,
            created_at: now,
            updated_at: now,
        };
        tables.courts.insert(court.id, court.clone());
        Ok(court)
    }

    async fn update_court(&self, id: i64, fields: CourtFields) -> Result<Court, StoreError> {
        let mut tables = self.tables.write().await;
        let court = tables
            .courts
            .get_mut(&id)
            .ok_or_else(|| StoreError::NotFound("Court not found".to_string()))?;

        court.name = fields.name;
        court.address = fields.address;
        court.city = fields.city;
        court.state = fields.state;
        court.zip_code = fields.zip_code;
        court.phone = fields.phone;
        court.price_per_hour = fields.price_per_hour;
        court.description = fields.description;
        court.is_active = fields.is_active;
        court.updated_at = Utc::now();
        Ok(court.clone())
    }

    async fn delete_court(&self, id: i64) -> Result<(), StoreError> {
        self.tables
            .write()
            .await
            .courts
            .remove(&id)
            .map(|_| ())
            .ok_or_else(|| StoreError::NotFound("Court not found".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: None,
            email: email.to_string(),
            password: None,
        }
    }

    fn client_fields(name: &str) -> ClientFields {
        ClientFields {
            name: name.to_string(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();

        let err = store.create_user(new_user("a@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn lists_only_rows_of_the_owner_newest_first() {
        let store = MemoryStore::new();
        let ana = store.create_user(new_user("ana@example.com")).await.unwrap();
        let bia = store.create_user(new_user("bia@example.com")).await.unwrap();

        let first = store.create_client(ana.id, client_fields("first")).await.unwrap();
        store.create_client(bia.id, client_fields("other")).await.unwrap();
        let second = store.create_client(ana.id, client_fields("second")).await.unwrap();

        let listed: Vec<i64> = store.list_clients(ana.id).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(listed, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn referenced_client_cannot_be_deleted() {
        let store = MemoryStore::new();
        let ana = store.create_user(new_user("ana@example.com")).await.unwrap();
        let client = store.create_client(ana.id, client_fields("Carlos")).await.unwrap();

        let receipt = store
            .create_receipt(
                ana.id,
                ReceiptFields {
                    client_id: client.id,
                    amount: Decimal::new(12000, 2),
                    currency: "BRL".to_string(),
                    received_date: Utc::now(),
                    status: "pending".to_string(),
                    description: None,
                    payment_method: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(receipt.client.as_ref().map(|c| c.id), Some(client.id));

        let err = store.delete_client(client.id).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        store.delete_receipt(receipt.receipt.id).await.unwrap();
        store.delete_client(client.id).await.unwrap();
        assert!(store.find_client(client.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn updating_missing_row_is_not_found() {
        let store = MemoryStore::new();
        let err = store.update_client(99, client_fields("ghost")).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }
}
