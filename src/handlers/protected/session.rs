// handlers/protected/session.rs - /api/auth/session

use axum::{extract::State, http::header, response::IntoResponse, Extension};

use crate::auth::{clear_session_cookie, issue_session, session_cookie, SessionToken};
use crate::database::models::User;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser, Message};
use crate::state::AppState;

/// GET /api/auth/session - the authenticated user
pub async fn get(Extension(user): Extension<CurrentUser>) -> ApiResult<User> {
    Ok(ApiResponse::success(user.0))
}

/// PUT /api/auth/session/refresh - a fresh token with a new expiry
pub async fn refresh(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let session: SessionToken = issue_session(&user.0, &state.config.security)?;
    let cookie = session_cookie(&session, state.config.security.secure_cookie);

    tracing::debug!("Refreshed session for user {}", user.id());

    Ok(([(header::SET_COOKIE, cookie)], ApiResponse::success(session)))
}

/// DELETE /api/auth/session - log out by clearing the session cookie
///
/// Tokens are stateless, so a bearer token stays valid until it expires.
pub async fn delete(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> impl IntoResponse {
    tracing::info!("User {} logged out", user.id());

    (
        [(header::SET_COOKIE, clear_session_cookie(state.config.security.secure_cookie))],
        ApiResponse::success(Message::new("Logged out")),
    )
}
