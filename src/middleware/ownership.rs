use crate::database::models::Owned;
use crate::error::ApiError;

use super::validate_user::CurrentUser;

/// Parse a path id. Anything that is not an integer cannot name a row, so it
/// is reported the same way as a missing one.
pub fn parse_id<T: Owned>(raw: &str) -> Result<i64, ApiError> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::not_found(format!("{} not found", T::LABEL)))
}

/// Ownership guard: 404 when the row is absent, 403 when it belongs to
/// someone else, otherwise the row itself.
pub fn authorize<T: Owned>(found: Option<T>, user: &CurrentUser) -> Result<T, ApiError> {
    let resource = found.ok_or_else(|| ApiError::not_found(format!("{} not found", T::LABEL)))?;

    if resource.owner_id() != user.id() {
        tracing::warn!(
            "User {} denied access to {} owned by user {}",
            user.id(),
            T::LABEL,
            resource.owner_id()
        );
        return Err(ApiError::forbidden("Not authorized"));
    }

    Ok(resource)
}
