use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::{token_from_cookies, validate_jwt, JwtError};
use crate::error::ApiError;
use crate::state::AppState;

/// Identity claimed by a valid session token, before the user row is loaded
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub email: String,
}

/// Session middleware: validates the bearer token (or session cookie) and
/// injects [`AuthUser`] into the request. Any failure is a 401.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_token(&headers).map_err(ApiError::unauthorized)?;

    let claims = validate_jwt(&token, &state.config.security).map_err(|e| match e {
        JwtError::Expired => ApiError::unauthorized("Unauthorized - session expired"),
        JwtError::InvalidSecret => {
            tracing::error!("Session secret is not configured; rejecting all sessions");
            ApiError::unauthorized("Unauthorized - invalid session")
        }
        other => {
            tracing::debug!("Rejected session token: {}", other);
            ApiError::unauthorized("Unauthorized - invalid session")
        }
    })?;

    let user_id = claims
        .user_id()
        .map_err(|_| ApiError::unauthorized("Unauthorized - invalid session"))?;

    request.extensions_mut().insert(AuthUser {
        user_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// Bearer token from the Authorization header, falling back to the session cookie
fn extract_token(headers: &HeaderMap) -> Result<String, String> {
    if let Some(auth_header) = headers.get(header::AUTHORIZATION) {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| "Invalid Authorization header format".to_string())?;

        return match auth_str.strip_prefix("Bearer ") {
            Some(token) if !token.trim().is_empty() => Ok(token.trim().to_string()),
            Some(_) => Err("Empty session token".to_string()),
            None => Err("Authorization header must use Bearer token format".to_string()),
        };
    }

    token_from_cookies(headers).ok_or_else(|| "Unauthorized - missing session".to_string())
}
