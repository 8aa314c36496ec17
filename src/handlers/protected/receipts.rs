// handlers/protected/receipts.rs - /api/receipts and /api/receipts/:id
//
// Receipts reference one of the caller's clients and are returned with that
// client embedded.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{Owned, ReceiptFields, ReceiptWithClient};
use crate::database::{ClientStore, ReceiptStore};
use crate::error::ApiError;
use crate::middleware::{authorize, parse_id, ApiResponse, ApiResult, CurrentUser, Message};
use crate::state::AppState;

use super::payments::DEFAULT_STATUS;
use super::utils::{merge_optional, parse_date_time, text, FieldCheck, AMOUNT_DIGITS};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptPayload {
    /// Id of the paying client
    pub client: Option<i64>,
    pub amount: Option<Decimal>,
    pub currency: Option<String>,
    pub received_date: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub payment_method: Option<String>,
}

impl ReceiptPayload {
    pub fn into_fields(self, current: Option<ReceiptFields>) -> Result<ReceiptFields, ApiError> {
        let mut check = FieldCheck::new();

        let client_id = match self.client.or(current.as_ref().map(|c| c.client_id)) {
            Some(id) => id,
            None => {
                check.fail("client", "Please select a client");
                0
            }
        };
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

        let received_date = match text(self.received_date) {
            Some(raw) => parse_date_time(&raw),
            None => current.as_ref().map(|c| c.received_date),
        };
        if received_date.is_none() {
            check.fail("receivedDate", "Received date must be a valid date");
        }

        let status = text(self.status)
            .or(current.as_ref().map(|c| c.status.clone()))
            .unwrap_or_else(|| DEFAULT_STATUS.to_string());

        check.finish("Invalid receipt data")?;

        let (description, payment_method) = match current {
            Some(c) => (c.description, c.payment_method),
            None => (None, None),
        };

        Ok(ReceiptFields {
            client_id,
            amount,
            currency,
            received_date: received_date.unwrap_or_default(),
            status,
            description: merge_optional(self.description, description),
            payment_method: merge_optional(self.payment_method, payment_method),
        })
    }
}

/// GET /api/receipts - most recently received first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<ReceiptWithClient>> {
    let receipts = state.store.list_receipts(user.id()).await?;
    Ok(ApiResponse::success(receipts))
}

/// POST /api/receipts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ReceiptPayload>, JsonRejection>,
) -> ApiResult<ReceiptWithClient> {
    let Json(payload) = payload?;
    let fields = payload.into_fields(None)?;
    ensure_own_client(&state, &user, fields.client_id).await?;

    let receipt = state.store.create_receipt(user.id(), fields).await?;
    tracing::info!(
        "User {} recorded receipt {} for client {}",
        user.id(),
        receipt.receipt.id,
        receipt.receipt.client_id
    );

    Ok(ApiResponse::created(receipt))
}

/// GET /api/receipts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<ReceiptWithClient> {
    let receipt = owned_receipt(&state, &user, &id).await?;
    Ok(ApiResponse::success(receipt))
}

/// PUT /api/receipts/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<ReceiptPayload>, JsonRejection>,
) -> ApiResult<ReceiptWithClient> {
    let existing = owned_receipt(&state, &user, &id).await?;

    let Json(payload) = payload?;
    let fields = payload.into_fields(Some(existing.receipt.fields()))?;
    if fields.client_id != existing.receipt.client_id {
        ensure_own_client(&state, &user, fields.client_id).await?;
    }

    let receipt = state.store.update_receipt(existing.receipt.id, fields).await?;
    Ok(ApiResponse::success(receipt))
}

/// DELETE /api/receipts/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let existing = owned_receipt(&state, &user, &id).await?;
    state.store.delete_receipt(existing.receipt.id).await?;

    Ok(ApiResponse::success(Message::new("Receipt removed")))
}

async fn owned_receipt(
    state: &AppState,
    user: &CurrentUser,
    raw_id: &str,
) -> Result<ReceiptWithClient, ApiError> {
    let id = parse_id::<ReceiptWithClient>(raw_id)?;
    authorize(state.store.find_receipt(id).await?, user)
}

/// A receipt may only point at one of the caller's own clients. Missing and
/// foreign clients get the same answer.
async fn ensure_own_client(state: &AppState, user: &CurrentUser, client_id: i64) -> Result<(), ApiError> {
    match state.store.find_client(client_id).await? {
        Some(client) if client.owner_id() == user.id() => Ok(()),
        _ => Err(ApiError::field_error("client", "Client not found")),
    }
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};

    use crate::testing::TestContext;

    async fn client(ctx: &TestContext, token: &str, name: &str) -> i64 {
        let (_, body) = ctx
            .send(Method::POST, "/api/clients", Some(token), Some(json!({ "name": name })))
            .await;
        body["data"]["id"].as_i64().unwrap()
    }

    fn receipt_body(client_id: i64, received: &str) -> Value {
        json!({
            "client": client_id,
            "amount": "200.00",
            "currency": "BRL",
            "receivedDate": received,
            "paymentMethod": "pix"
        })
    }

    #[tokio::test]
    async fn create_embeds_client_and_defaults_status() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;
        let client_id = client(&ctx, &token, "Carlos").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/receipts", Some(&token), Some(receipt_body(client_id, "2025-03-01")))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["status"], "pending");
        assert_eq!(body["data"]["clientId"], client_id);
        assert_eq!(body["data"]["client"]["name"], "Carlos");
        assert_eq!(body["data"]["receivedDate"], "2025-03-01T00:00:00Z");
    }

    #[tokio::test]
    async fn list_orders_by_received_date() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;
        let client_id = client(&ctx, &token, "Carlos").await;

        for day in ["2025-01-10", "2025-03-10", "2025-02-10"] {
            ctx.send(Method::POST, "/api/receipts", Some(&token), Some(receipt_body(client_id, day)))
                .await;
        }

        let (_, body) = ctx.send(Method::GET, "/api/receipts", Some(&token), None).await;
        let days: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| &r["receivedDate"].as_str().unwrap()[..10])
            .collect();
        assert_eq!(days, vec!["2025-03-10", "2025-02-10", "2025-01-10"]);
    }

    #[tokio::test]
    async fn receipt_for_someone_elses_client_is_rejected() {
        let ctx = TestContext::new();
        let (_, ana) = ctx.user("ana@quadra.com").await;
        let (_, bia) = ctx.user("bia@quadra.com").await;
        let bias_client = client(&ctx, &bia, "Bia's client").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/receipts", Some(&ana), Some(receipt_body(bias_client, "2025-03-01")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["field_errors"]["client"], "Client not found");

        let (status, _) = ctx
            .send(Method::POST, "/api/receipts", Some(&ana), Some(receipt_body(4242, "2025-03-01")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn invalid_date_is_a_field_error() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;
        let client_id = client(&ctx, &token, "Carlos").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/receipts", Some(&token), Some(receipt_body(client_id, "01/03/2025")))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"]["receivedDate"].is_string());
    }

    #[tokio::test]
    async fn foreign_receipt_is_forbidden_and_missing_one_is_not_found() {
        let ctx = TestContext::new();
        let (_, ana) = ctx.user("ana@quadra.com").await;
        let (_, bia) = ctx.user("bia@quadra.com").await;
        let client_id = client(&ctx, &ana, "Carlos").await;

        let (_, body) = ctx
            .send(Method::POST, "/api/receipts", Some(&ana), Some(receipt_body(client_id, "2025-03-01")))
            .await;
        let uri = format!("/api/receipts/{}", body["data"]["id"]);

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let payload = (method == Method::PUT).then(|| json!({ "status": "paid" }));
            let (status, _) = ctx.send(method, &uri, Some(&bia), payload).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }

        let (status, _) = ctx.send(Method::DELETE, "/api/receipts/987654", Some(&ana), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
