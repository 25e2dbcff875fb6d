// Authentication extractor for protected routes

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use tracing::debug;

use crate::auth::{access::AccessController, error::AuthFailure};
use crate::error::ApiError;

/// Authenticated user extractor for protected routes
///
/// Handlers that take this value only run for requests carrying a trusted
/// bearer token; the user id is passed explicitly into every downstream call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: i32,
}

/// Extract the token from an `Authorization: Bearer <token>` value
///
/// The scheme is matched case-insensitively.
pub fn parse_bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthenticatedUser
where
    AccessController: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Extract Authorization header
        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .ok_or(AuthFailure::Missing)?
            .to_str()
            .map_err(|_| AuthFailure::Malformed)?;

        let token = parse_bearer_token(auth_header).ok_or(AuthFailure::Malformed)?;

        let user = AccessController::from_ref(state).authenticate(token)?;
        debug!("Authenticated request: user_id={}, path={}", user.user_id, parts.uri.path());
        Ok(user)
    }
}
