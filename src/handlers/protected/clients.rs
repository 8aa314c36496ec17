// handlers/protected/clients.rs - /api/clients and /api/clients/:id

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Extension, Json,
};
use serde::Deserialize;

use crate::database::models::{Client, ClientFields};
use crate::database::{ClientStore, StoreError};
use crate::error::ApiError;
use crate::middleware::{authorize, parse_id, ApiResponse, ApiResult, CurrentUser, Message};
use crate::state::AppState;

use super::utils::{merge_optional, FieldCheck};

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: Option<bool>,
}

impl ClientPayload {
    /// Overlay the payload on `current` (or on nothing, for a create) and validate
    pub fn into_fields(self, current: Option<ClientFields>) -> Result<ClientFields, ApiError> {
        let current = current.unwrap_or_else(|| ClientFields {
            name: String::new(),
            email: None,
            phone: None,
            address: None,
            is_active: true,
        });

        let mut check = FieldCheck::new();
        let name = check.required_text(
            "name",
            self.name.or(Some(current.name)),
            "Please add the client name",
        );
        check.finish("Invalid client data")?;

        Ok(ClientFields {
            name,
            email: merge_optional(self.email, current.email),
            phone: merge_optional(self.phone, current.phone),
            address: merge_optional(self.address, current.address),
            is_active: self.is_active.unwrap_or(current.is_active),
        })
    }
}

/// GET /api/clients - the caller's clients, newest first
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> ApiResult<Vec<Client>> {
    let clients = state.store.list_clients(user.id()).await?;
    Ok(ApiResponse::success(clients))
}

/// POST /api/clients
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> ApiResult<Client> {
    let Json(payload) = payload?;
    let fields = payload.into_fields(None)?;

    let client = state.store.create_client(user.id(), fields).await?;
    tracing::info!("User {} created client {}", user.id(), client.id);

    Ok(ApiResponse::created(client))
}

/// GET /api/clients/:id
pub async fn get(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Client> {
    let client = owned_client(&state, &user, &id).await?;
    Ok(ApiResponse::success(client))
}

/// PUT /api/clients/:id
pub async fn put(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
    payload: Result<Json<ClientPayload>, JsonRejection>,
) -> ApiResult<Client> {
    let existing = owned_client(&state, &user, &id).await?;

    let Json(payload) = payload?;
    let fields = payload.into_fields(Some(existing.fields()))?;

    let client = state.store.update_client(existing.id, fields).await?;
    Ok(ApiResponse::success(client))
}

/// DELETE /api/clients/:id
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Message> {
    let existing = owned_client(&state, &user, &id).await?;

    state.store.delete_client(existing.id).await.map_err(|e| match e {
        StoreError::Conflict(_) => {
            ApiError::conflict("Client still has receipts; remove them first")
        }
        other => other.into(),
    })?;
    tracing::info!("User {} removed client {}", user.id(), existing.id);

    Ok(ApiResponse::success(Message::new("Client removed")))
}

async fn owned_client(state: &AppState, user: &CurrentUser, raw_id: &str) -> Result<Client, ApiError> {
    let id = parse_id::<Client>(raw_id)?;
    authorize(state.store.find_client(id).await?, user)
}

#[cfg(test)]
mod tests {
    use axum::http::{Method, StatusCode};
    use serde_json::json;

    use crate::database::ClientStore;
    use crate::testing::TestContext;

    #[tokio::test]
    async fn create_list_update_delete() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/clients", Some(&token), Some(json!({
                "name": "Carlos Silva",
                "email": "carlos@example.com",
                "phone": "(11) 99999-0000"
            })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["name"], "Carlos Silva");
        assert_eq!(body["data"]["isActive"], true);
        let id = body["data"]["id"].as_i64().unwrap();

        let (status, body) = ctx
            .send(Method::PUT, &format!("/api/clients/{}", id), Some(&token), Some(json!({ "isActive": false })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Carlos Silva");
        assert_eq!(body["data"]["email"], "carlos@example.com");
        assert_eq!(body["data"]["isActive"], false);

        let (status, body) = ctx.send(Method::GET, "/api/clients", Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"].as_array().unwrap().len(), 1);

        let (status, body) = ctx
            .send(Method::DELETE, &format!("/api/clients/{}", id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["message"], "Client removed");

        let (status, _) = ctx
            .send(Method::GET, &format!("/api/clients/{}", id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn nameless_client_is_rejected_and_not_stored() {
        let ctx = TestContext::new();
        let (user, token) = ctx.user("ana@quadra.com").await;

        let (status, body) = ctx
            .send(Method::POST, "/api/clients", Some(&token), Some(json!({ "email": "x@example.com" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please add the client name");
        assert_eq!(body["field_errors"]["name"], "Please add the client name");

        assert!(ctx.store.list_clients(user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn foreign_client_is_forbidden_on_every_verb() {
        let ctx = TestContext::new();
        let (_, owner_token) = ctx.user("owner@quadra.com").await;
        let (_, other_token) = ctx.user("other@quadra.com").await;

        let (_, body) = ctx
            .send(Method::POST, "/api/clients", Some(&owner_token), Some(json!({ "name": "Carlos" })))
            .await;
        let uri = format!("/api/clients/{}", body["data"]["id"]);

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let payload = (method == Method::PUT).then(|| json!({ "name": "" }));
            let (status, body) = ctx.send(method.clone(), &uri, Some(&other_token), payload).await;
            assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
            assert_eq!(body["message"], "Not authorized");
        }

        let (status, body) = ctx.send(Method::GET, &uri, Some(&owner_token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["name"], "Carlos");
    }

    #[tokio::test]
    async fn unknown_and_malformed_ids_are_not_found() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;

        for uri in ["/api/clients/999", "/api/clients/not-a-number"] {
            let (status, body) = ctx.send(Method::GET, uri, Some(&token), None).await;
            assert_eq!(status, StatusCode::NOT_FOUND);
            assert_eq!(body["message"], "Client not found");
        }
    }

    #[tokio::test]
    async fn listing_only_shows_own_clients() {
        let ctx = TestContext::new();
        let (_, ana) = ctx.user("ana@quadra.com").await;
        let (_, bia) = ctx.user("bia@quadra.com").await;

        ctx.send(Method::POST, "/api/clients", Some(&ana), Some(json!({ "name": "A1" }))).await;
        ctx.send(Method::POST, "/api/clients", Some(&ana), Some(json!({ "name": "A2" }))).await;
        ctx.send(Method::POST, "/api/clients", Some(&bia), Some(json!({ "name": "B1" }))).await;

        let (_, body) = ctx.send(Method::GET, "/api/clients", Some(&ana), None).await;
        let names: Vec<&str> = body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["A2", "A1"]);
    }

    #[tokio::test]
    async fn client_with_receipts_cannot_be_deleted() {
        let ctx = TestContext::new();
        let (_, token) = ctx.user("ana@quadra.com").await;

        let (_, body) = ctx
            .send(Method::POST, "/api/clients", Some(&token), Some(json!({ "name": "Carlos" })))
            .await;
        let client_id = body["data"]["id"].as_i64().unwrap();

        let (status, _) = ctx
            .send(Method::POST, "/api/receipts", Some(&token), Some(json!({
                "client": client_id,
                "amount": 120,
                "currency": "BRL",
                "receivedDate": "2025-03-01"
            })))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _) = ctx
            .send(Method::DELETE, &format!("/api/clients/{}", client_id), Some(&token), None)
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
