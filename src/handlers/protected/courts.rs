// handlers/protected/courts.rs - /api/courts and /api/courts/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::database::models::{Court, CourtFields};
use crate::database::CourtStore;
use crate::error::ApiError;
use crate::middleware::{authorize, parse_id, ApiResponse, ApiResult, CurrentUser, Message};
use crate::state::AppState;

use super::utils::{matches_mask, merge_optional, FieldCheck, PRICE_DIGITS};

pub const ZIP_CODE_MASK: &str = "#####-###";
pub const PHONE_MASK: &str = "(##) #####-####";

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourtPayload {
    pub name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub phone: Option<String>,
    pub price_per_hour: Option<Decimal>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

impl CourtPayload {
    /// Every failing field is reported, not just the first
    pub fn into_fields(self, current: Option<CourtFields>) -> Result<CourtFields, ApiError> {
        let mut check = FieldCheck::new();
        let current = current.as_ref();

        let name = check.required_text(
            "name",
            self.name.or(current.map(|c| c.name.clone())),
            "Name is required",
        );
        let address = check.required_text(
            "address",
            self.address.or(current.map(|c| c.address.clone())),
            "Address is required",
        );
        let city = check.required_text(
            "city",
            self.city.or(current.map(|c| c.city.clone())),
            "City is required",
        );
        let state = check.required_text(
            "state",
            self.state.or(current.map(|c| c.state.clone())),
            "State is required",
        );

        let zip_code = check.required_text(
            "zipCode",
            self.zip_code.or(current.map(|c| c.zip_code.clone())),
            "Zip code is required",
        );
        if !zip_code.is_empty() && !matches_mask(&zip_code, ZIP_CODE_MASK) {
            check.fail("zipCode", "Zip code must look like 00000-000");
        }

        let phone = check.required_text(
            "phone",
            self.phone.or(current.map(|c| c.phone.clone())),
            "Phone is required",
        );
        if !phone.is_empty() && !matches_mask(&phone, PHONE_MASK) {
            check.fail("phone", "Phone must look like (00) 00000-0000");
        }

        let price_per_hour = check.positive_amount(
            "pricePerHour",
            self.price_per_hour.or(current.map(|c| c.price_per_hour)),
            PRICE_DIGITS,
            "Price per hour must be greater than zero",
        );

        check.finish("Invalid court data")?;

        Ok(CourtFields {
            name,
            address,
            city,
            state,
            zip_code,
            phone,
            price_per_hour,
            description: merge_optional(self.description, current.and_then(|c| c.description.clone())),
            is_active: self
                .is_active
                .or(current.map(|c| c.is_active))
                .unwrap_or(true),
        })
    }
}

/// GET /api/courts
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Court>> {
    let courts = state.store.list_courts(user.id()).await?;
    Ok(ApiResponse::success(courts))
}

/// POST /api/courts
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<CourtPayload>, JsonRejection>,
) -> ApiResult<Court> {
    let Json(payload) = payload?;
    let fields = payload.into_fields(None)?;

    let court = state.store.create_court(user.id(), fields).await?;
    tracing::info!("User {} added court {} ({})", user.id(), court.id, court.name);

    Ok(ApiResponse::created(court))
}

/// GET /api/courts/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Court> {
    let court = owned_court(&state, &user, &id).await?;
    Ok(ApiResponse::success(court))
}

/// PUT /api/courts/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<CourtPayload>, JsonRejection>,
) -> ApiResult<Court> {
    let existing = owned_court(&state, &user, &id).await?;

    let Json(payload) = payload?;
    let fields = payload.into_fields(Some(existing.fields()))?;

    let court = state.store.update_court(existing.id, fields).await?;
    Ok(ApiResponse::success(court))
}

/// DELETE /api/courts/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let existing = owned_court(&state, &user, &id).await?;
    state.store.delete_court(existing.id).await?;

    Ok(ApiResponse::success(Message::new("Court removed")))
}

async fn owned_court(state: &AppState, user: &CurrentUser, raw_id: &str) -> Result<Court, ApiError> {
    let id = parse_id::<Court>(raw_id)?;
    authorize(state.store.find_court(id).await?, user)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::testing::TestContext;

    fn valid_court() -> serde_json::Value {
        json!({
            "name": "Quadra Central",
            "address": "Rua das Flores, 100",
            "city": "São Paulo",
            "state": "SP",
            "zipCode": "01310-100",
            "phone": "(11) 98765-4321",
            "pricePerHour": 120
        })
    }

    #[test]
    fn all_failures_are_collected() {
        let payload = CourtPayload {
            name: Some("Quadra".into()),
            zip_code: Some("01310100".into()),
            phone: Some("11 98765-4321".into()),
            price_per_hour: Some(Decimal::ZERO),
            ..Default::default()
        };
        let body = payload.into_fields(None).unwrap_err().to_json();
        let errors = body["field_errors"].as_object().unwrap();

        let mut fields: Vec<&str> = errors.keys().map(String::as_str).collect();
        fields.sort();
        assert_eq!(
            fields,
            vec!["address", "city", "phone", "pricePerHour", "state", "zipCode"]
        );
        assert_eq!(body["message"], "Invalid court data");
    }

    #[tokio::test]
    async fn create_and_partial_update() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/courts", Some(&token), Some(valid_court()))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["isActive"], true);
        assert_eq!(body["data"]["pricePerHour"], "120.00");
        let uri = format!("/api/courts/{}", body["data"]["id"]);

        let (status, body) = ctx
            .send(Method::PUT, &uri, Some(&token), Some(json!({ "pricePerHour": "150.00", "isActive": false })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Quadra Central");
        assert_eq!(body["data"]["pricePerHour"], "150.00");
        assert_eq!(body["data"]["isActive"], false);

        let (status, body) = ctx
            .send(Method::PUT, &uri, Some(&token), Some(json!({ "phone": "123" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["field_errors"]["phone"].is_string());
    }

    #[tokio::test]
    async fn foreign_court_is_forbidden() {
        let ctx = TestContext::new();
        let (_, ana) = ctx.user("ana@quadra.com").await;
        let (_, bia) = ctx.user("bia@quadra.com").await;

        let (_, body) = ctx.send(Method::POST, "/api/courts", Some(&ana), Some(valid_court())).await;
        let uri = format!("/api/courts/{}", body["data"]["id"]);

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let payload = (method == Method::PUT).then(valid_court);
            let (status, _) = ctx.send(method, &uri, Some(&bia), payload).await;
            assert_eq!(status, StatusCode::FORBIDDEN);
        }

        let (_, body) = ctx.send(Method::GET, "/api/courts", Some(&bia), None).await;
        assert!(body["data"].as_array().unwrap().is_empty());
    }
}
