// handlers/protected/payments.rs - /api/payments and /api/payments/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{Payment, PaymentFields};
use crate::database::PaymentStore;
use crate::error::ApiError;
use crate::middleware::{authorize, parse_id, ApiResponse, ApiResult, CurrentUser, Message};
use crate::state::AppState;

use super::utils::{merge_optional, text, FieldCheck, AMOUNT_DIGITS};

pub const DEFAULT_STATUS: &str = "pending";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentPayload {
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub status: Option<String>,
    pub payment_method_type: Option<String>,
    pub description: Option<String>,
    pub transaction_id: Option<String>,
}

impl PaymentPayload {
    pub fn into_fields(self, current: Option<PaymentFields>) -> Result<PaymentFields, ApiError> {
        let mut check = FieldCheck::new();

        let amount = check.positive_amount(
            "amount",
            self.amount.or(current.as_ref().map(|c| c.amount)),
            AMOUNT_DIGITS,
            "Amount must be greater than zero",
        );
        let currency = check.required_text(
            "currency",
            self.currency.or(current.as_ref().map(|c| c.currency.clone())),
            "Currency is required",
        );
        let payment_method_type = check.required_text(
            "paymentMethodType",
            self.payment_method_type
                .or(current.as_ref().map(|c| c.payment_method_type.clone())),
            "Payment method is required",
        );
        let status = text(self.status)
            .or(current.as_ref().map(|c| c.status.clone()))
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        check.finish("Invalid payment data")?;

        let (description, transaction_id) = match current {
            Some(c) => (c.description, c.transaction_id),
            None => (None, None),
        };

        Ok(PaymentFields {
            amount,
            currency,
            status,
            payment_method_type,
            description: merge_optional(self.description, description),
            transaction_id: merge_optional(self.transaction_id, transaction_id),
        })
    }
}

/// GET /api/payments
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Payment>> {
    let payments = state.store.list_payments(user.id()).await?;
    Ok(ApiResponse::success(payments))
}

/// POST /api/payments
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<PaymentPayload>, JsonRejection>,
) -> ApiResult<Payment> {
    let Json(payload) = payload?;
    let fields = payload.into_fields(None)?;

    let payment = state.store.create_payment(user.id(), fields).await?;
    tracing::info!(
        "User {} recorded payment {} ({} {})",
        user.id(),
        payment.id,
        payment.amount,
        payment.currency
    );

    Ok(ApiResponse::created(payment))
}

/// GET /api/payments/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Payment> {
    let payment = owned_payment(&state, &user, &id).await?;
    Ok(ApiResponse::success(payment))
}

/// PUT /api/payments/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<PaymentPayload>, JsonRejection>,
) -> ApiResult<Payment> {
    // ownership first: nothing is written for a non-owner
    let existing = owned_payment(&state, &user, &id).await?;

    let Json(payload) = payload?;
    let fields = payload.into_fields(Some(existing.fields()))?;

    let payment = state.store.update_payment(existing.id, fields).await?;
    Ok(ApiResponse::success(payment))
}

/// DELETE /api/payments/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let existing = owned_payment(&state, &user, &id).await?;
    state.store.delete_payment(existing.id).await?;

    Ok(ApiResponse::success(Message::new("Payment removed")))
}

async fn owned_payment(state: &AppState, user: &CurrentUser, raw_id: &str) -> Result<Payment, ApiError> {
    let id = parse_id::<Payment>(raw_id)?;
    authorize(state.store.find_payment(id).await?, user)
}
