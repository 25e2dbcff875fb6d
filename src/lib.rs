// Item API
// User registration, EdDSA bearer-token login and owner-scoped item storage

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod items;
pub mod store;
pub mod validation;

#[cfg(test)]
mod test_support;
#[cfg(test)]
mod tests;

use axum::{
    extract::FromRef,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use auth::{
    models::{LoginRequest, RegisterRequest, TokenResponse, UserResponse},
    AccessController, AuthService, PasswordService, TokenService,
};
use items::{
    models::{Item, ItemList, ItemRequest},
    ItemService,
};
use store::CredentialStore;

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Registers the bearer token scheme referenced by protected routes
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .build(),
            ),
        );
    }
}

/// OpenAPI documentation structure
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    paths(
        index,
        health,
        auth::handlers::login_handler,
        auth::handlers::register_handler,
        auth::handlers::me_handler,
        items::handlers::create_item_handler,
        items::handlers::list_items_handler,
        items::handlers::get_item_handler,
        items::handlers::update_item_handler,
    ),
    components(
        schemas(UserResponse, RegisterRequest, LoginRequest, TokenResponse, Item, ItemRequest, ItemList)
    ),
    tags(
        (name = "health", description = "Liveness endpoints"),
        (name = "auth", description = "Token issuance"),
        (name = "users", description = "Registration and the current user"),
        (name = "items", description = "Items owned by the authenticated user")
    ),
    info(
        title = "Item API",
        version = "0.1.0",
        description = "Per-user item storage behind EdDSA bearer tokens"
    )
)]
pub struct ApiDoc;

/// Application state shared across handlers
///
/// Built once at startup from injected services; handlers pull the piece
/// they need through `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub item_service: Arc<ItemService>,
    pub access: Arc<AccessController>,
    pub request_timeout: Duration,
}

impl AppState {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        passwords: Arc<PasswordService>,
        tokens: Arc<TokenService>,
    ) -> Self {
        let access = Arc::new(AccessController::new(Arc::clone(&tokens)));
        let auth_service = Arc::new(AuthService::new(Arc::clone(&store), passwords, tokens));
        let item_service = Arc::new(ItemService::new(store, Arc::clone(&access)));

        Self {
            auth_service,
            item_service,
            access,
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}

impl FromRef<AppState> for Arc<AuthService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.auth_service)
    }
}

impl FromRef<AppState> for Arc<ItemService> {
    fn from_ref(state: &AppState) -> Self {
        Arc::clone(&state.item_service)
    }
}

impl FromRef<AppState> for AccessController {
    fn from_ref(state: &AppState) -> Self {
        state.access.as_ref().clone()
    }
}

/// Index route
#[utoipa::path(
    get,
    path = "/api",
    responses((status = 200, description = "Service is up")),
    tag = "health"
)]
async fn index() -> StatusCode {
    StatusCode::OK
}

/// Health check
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, description = "Service is healthy")),
    tag = "health"
)]
async fn health() -> StatusCode {
    StatusCode::OK
}

/// Creates and configures the application router
/// Maps all API endpoints to their handlers and adds trace, timeout and CORS middleware
pub fn create_router(state: AppState) -> Router {
    // Configure CORS to allow all origins, methods, and headers
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let middleware = ServiceBuilder::new()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(state.request_timeout))
        .layer(cors);

    Router::new()
        // Swagger UI
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/api", get(index))
        .route("/api/health", get(health))
        .route("/api/auth/tokens", post(auth::login_handler))
        .route("/api/users", post(auth::register_handler))
        .route("/api/users/me", get(auth::me_handler))
        .route(
            "/api/items",
            post(items::create_item_handler).get(items::list_items_handler),
        )
        .route(
            "/api/items/:id",
            get(items::get_item_handler).patch(items::update_item_handler),
        )
        .layer(middleware)
        .with_state(state)
}
