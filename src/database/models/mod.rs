pub mod client;
pub mod court;
pub mod payment;
pub mod receipt;
pub mod user;

pub use client::{Client, ClientFields};
pub use court::{Court, CourtFields};
pub use payment::{Payment, PaymentFields};
pub use receipt::{Receipt, ReceiptFields, ReceiptWithClient};
pub use user::{NewUser, User};

/// A row that belongs to exactly one user
pub trait Owned {
    /// Human name of the resource, used in error messages
    const LABEL: &'static str;

    fn owner_id(&self) -> i64;
}
