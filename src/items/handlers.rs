// HTTP handlers for item endpoints

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::auth::middleware::AuthenticatedUser;
use crate::error::ApiError;
use crate::items::{
    models::{Item, ItemList, ItemRequest},
    service::ItemService,
};
use crate::validation::ValidatedJson;

fn parts_of(request: ItemRequest) -> Result<(String, i32), ApiError> {
    request
        .into_parts()
        .ok_or_else(|| ApiError::MalformedBody("missing name or price".to_string()))
}

/// Create an item owned by the caller
/// POST /api/items
#[utoipa::path(
    post,
    path = "/api/items",
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item created", body = Item),
        (status = 400, description = "Invalid input data", body = HashMap<String, String>,
            example = json!({"name": "Name is required", "price": "Price must be an integer greater than or equal to 0"})),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn create_item_handler(
    State(service): State<Arc<ItemService>>,
    user: AuthenticatedUser,
    ValidatedJson(request): ValidatedJson<ItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let (name, price) = parts_of(request)?;
    let item = service.create(&user, &name, price).await?;
    Ok(Json(item))
}

/// List the caller's items
/// GET /api/items
#[utoipa::path(
    get,
    path = "/api/items",
    responses(
        (status = 200, description = "Items owned by the caller", body = ItemList),
        (status = 401, description = "Missing, invalid or expired token")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn list_items_handler(
    State(service): State<Arc<ItemService>>,
    user: AuthenticatedUser,
) -> Result<Json<ItemList>, ApiError> {
    let data = service.list(&user).await?;
    Ok(Json(ItemList { data }))
}

/// Get one of the caller's items
/// GET /api/items/{id}
#[utoipa::path(
    get,
    path = "/api/items/{id}",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Item missing or owned by another user")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn get_item_handler(
    State(service): State<Arc<ItemService>>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
) -> Result<Json<Item>, ApiError> {
    let item = service.get(&user, id).await?;
    Ok(Json(item))
}

/// Replace name and price of one of the caller's items
/// PATCH /api/items/{id}
#[utoipa::path(
    patch,
    path = "/api/items/{id}",
    params(
        ("id" = i32, Path, description = "Item ID")
    ),
    request_body = ItemRequest,
    responses(
        (status = 200, description = "Item updated", body = Item),
        (status = 400, description = "Invalid input data", body = HashMap<String, String>),
        (status = 401, description = "Missing, invalid or expired token"),
        (status = 404, description = "Item missing or owned by another user")
    ),
    security(("bearer_auth" = [])),
    tag = "items"
)]
pub async fn update_item_handler(
    State(service): State<Arc<ItemService>>,
    user: AuthenticatedUser,
    Path(id): Path<i32>,
    ValidatedJson(request): ValidatedJson<ItemRequest>,
) -> Result<Json<Item>, ApiError> {
    let (name, price) = parts_of(request)?;
    let item = service.update(&user, id, &name, price).await?;
    Ok(Json(item))
}
