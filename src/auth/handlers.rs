// HTTP handlers for authentication endpoints

use axum::{extract::State, Json};
use std::sync::Arc;

use crate::auth::{
    middleware::AuthenticatedUser,
    models::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    service::AuthService,
};
use crate::error::ApiError;
use crate::validation::ValidatedJson;

/// Register a new user
/// POST /api/users
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = UserResponse),
        (status = 400, description = "Invalid input or email taken", body = HashMap<String, String>,
            example = json!({"email": "Email must be a valid email address", "password": "Password must be at least 8 characters"})),
        (status = 500, description = "Internal server error")
    ),
    tag = "users"
)]
pub async fn register_handler(
    State(service): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<RegisterRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let (email, password) = request
        .into_parts()
        .ok_or_else(|| ApiError::MalformedBody("missing email or password".to_string()))?;

    let user = service.register(&email, &password).await?;
    Ok(Json(user))
}

/// Exchange credentials for a bearer token
/// POST /api/auth/tokens
#[utoipa::path(
    post,
    path = "/api/auth/tokens",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 401, description = "Unknown email or wrong password", body = HashMap<String, String>,
            example = json!({"password": "Incorrect password"})),
        (status = 500, description = "Internal server error")
    ),
    tag = "auth"
)]
pub async fn login_handler(
    State(service): State<Arc<AuthService>>,
    ValidatedJson(request): ValidatedJson<LoginRequest>,
) -> Result<Json<TokenResponse>, ApiError> {
    let token = service.login(&request.email, &request.password).await?;
    Ok(Json(token))
}

/// Get current user information (protected endpoint)
/// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
pub async fn me_handler(
    State(service): State<Arc<AuthService>>,
    user: AuthenticatedUser,
) -> Result<Json<UserResponse>, ApiError> {
    let me = service.current_user(&user).await?;
    Ok(Json(me))
}
