// handlers/public/auth.rs - POST /api/auth/register and POST /api/auth/login

use axum::{
    extract::{rejection::JsonRejection, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::auth::{issue_session, session_cookie};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub id: i64,
    pub name: Option<String>,
    pub email: String,
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub token: String,
    /// Seconds until the token expires
    pub expires_in: i64,
    pub user: User,
}

/// POST /api/auth/register - create an account and return a session token
///
/// ```json
/// { "name": "Ana", "email": "ana@example.com", "password": "secret" }
/// ```
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<ApiResponse<RegisterResponse>, ApiError> {
    let Json(request) = payload?;

    let user = state
        .accounts()
        .register(request.name, request.email, request.password)
        .await?;
    let session = issue_session(&user, &state.config.security)?;

    Ok(ApiResponse::created(RegisterResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        token: session.token,
    }))
}

/// POST /api/auth/login - exchange credentials for a session
///
/// The token is returned in the body and also set as the session cookie.
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;

    let user = state
        .accounts()
        .authenticate(request.email, request.password)
        .await?;
    let session = issue_session(&user, &state.config.security)?;
    let cookie = session_cookie(&session, state.config.security.secure_cookie);

    tracing::info!("User {} logged in", user.id);

    Ok((
        [(header::SET_COOKIE, cookie)],
        ApiResponse::success(LoginResponse {
            token: session.token,
            expires_in: session.expires_in,
            user,
        }),
    ))
}

#[cfg(test)]
mod tests {
    use axum::http::{header, Method, StatusCode};
    use serde_json::json;

    use crate::testing::TestContext;

    #[tokio::test]
    async fn register_returns_token_for_new_user() {
        let ctx = TestContext::new();

        let (status, body) = ctx
            .send(Method::POST, "/api/auth/register", None, Some(json!({
                "name": "Ana",
                "email": "ana@quadra.com",
                "password": "secret123"
            })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["data"]["email"], "ana@quadra.com");
        assert_eq!(body["data"]["name"], "Ana");
        assert!(body["data"]["token"].as_str().unwrap().len() > 20);
        assert!(body["data"].get("password").is_none());
    }

    #[tokio::test]
    async fn register_validation() {
        let ctx = TestContext::new();

        let (status, body) = ctx
            .send(Method::POST, "/api/auth/register", None, Some(json!({ "email": "ana@quadra.com" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Please provide email and password");

        let (status, _) = ctx
            .send(Method::POST, "/api/auth/register", None, Some(json!({ "email": "nope", "password": "x" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        ctx.user("taken@quadra.com").await;
        let (status, body) = ctx
            .send(Method::POST, "/api/auth/register", None, Some(json!({
                "email": "taken@quadra.com",
                "password": "secret123"
            })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "User already exists");
    }

    #[tokio::test]
    async fn login_sets_cookie_and_rejects_bad_passwords() {
        let ctx = TestContext::new();
        ctx.send(Method::POST, "/api/auth/register", None, Some(json!({
            "email": "ana@quadra.com",
            "password": "secret123"
        })))
        .await;

        let response = ctx
            .raw(Method::POST, "/api/auth/login", None, Some(json!({
                "email": "ana@quadra.com",
                "password": "secret123"
            })))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        let cookie = response.headers()[header::SET_COOKIE].to_str().unwrap().to_string();
        assert!(cookie.starts_with("quadra_session="));
        assert!(cookie.contains("HttpOnly"));

        let (status, body) = ctx
            .send(Method::POST, "/api/auth/login", None, Some(json!({
                "email": "ana@quadra.com",
                "password": "wrong"
            })))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid credentials");

        let (status, _) = ctx
            .send(Method::POST, "/api/auth/login", None, Some(json!({ "email": "ana@quadra.com" })))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let ctx = TestContext::new();
        let response = ctx.raw_body(Method::POST, "/api/auth/login", "{not json").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
