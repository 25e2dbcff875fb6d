// Item service - owner-scoped item operations

use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{
    access::{Access, AccessController},
    middleware::AuthenticatedUser,
};
use crate::error::ApiError;
use crate::items::models::Item;
use crate::store::CredentialStore;

pub struct ItemService {
    store: Arc<dyn CredentialStore>,
    access: Arc<AccessController>,
}

impl ItemService {
    pub fn new(store: Arc<dyn CredentialStore>, access: Arc<AccessController>) -> Self {
        Self { store, access }
    }

    /// Create an item owned by the caller
    pub async fn create(&self, user: &AuthenticatedUser, name: &str, price: i32) -> Result<Item, ApiError> {
        let item = self.store.create_item(user.user_id, name, price).await?;
        info!("Item created: item_id={}, owner_id={}", item.id, item.owner_id);
        Ok(item)
    }

    /// Fetch one item; a foreign item is reported exactly like a missing one
    pub async fn get(&self, user: &AuthenticatedUser, id: i32) -> Result<Item, ApiError> {
        let item = self.store.find_item(id).await?.ok_or_else(|| {
            debug!("Item not found: item_id={}", id);
            ApiError::NotFound
        })?;

        match self.access.authorize_item_access(user, &item) {
            Access::Allowed => Ok(item),
            Access::Denied => Err(ApiError::NotFound),
        }
    }

    pub async fn list(&self, user: &AuthenticatedUser) -> Result<Vec<Item>, ApiError> {
        let items = self.store.list_items(user.user_id).await?;
        debug!("Listed {} items for user_id={}", items.len(), user.user_id);
        Ok(items)
    }

    /// Replace name and price of an item the caller owns
    pub async fn update(
        &self,
        user: &AuthenticatedUser,
        id: i32,
        name: &str,
        price: i32,
    ) -> Result<Item, ApiError> {
        let item = self
            .store
            .update_item(id, user.user_id, name, price)
            .await?
            .ok_or_else(|| {
                debug!("Item not updatable: item_id={}, user_id={}", id, user.user_id);
                ApiError::NotFound
            })?;

        info!("Item updated: item_id={}", item.id);
        Ok(item)
    }
}
