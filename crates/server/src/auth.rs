//! Acting-user extraction

use crate::error::ApiError;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use cloudboard::domain::UserId;

pub const USER_HEADER: &str = "X-User-Id";

/// The user on whose behalf a request runs, read from `X-User-Id`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActingUser(pub UserId);

#[async_trait]
impl<S: Send + Sync> FromRequestParts<S> for ActingUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(USER_HEADER)
            .ok_or_else(|| ApiError::unauthenticated(format!("Missing {} header", USER_HEADER)))?;

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<UserId>().ok())
            .filter(|id| *id > 0)
            .map(ActingUser)
            .ok_or_else(|| ApiError::unauthenticated(format!("Invalid {} header", USER_HEADER)))
    }
}
