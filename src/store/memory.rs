// In-process credential store
// Backs tests and `DATABASE_URL=memory://` runs. Contents are lost on exit.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::auth::models::User;
use crate::items::models::Item;
use crate::store::{CredentialStore, StoreError};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    items: Vec<Item>,
    next_user_id: i32,
    next_item_id: i32,
}

/// Credential store held in memory behind one lock
///
/// The email uniqueness check and the insert share a write guard, which
/// gives the same one-winner guarantee as the database constraint.
#[derive(Default)]
pub struct MemoryCredentialStore {
    tables: RwLock<Tables>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut tables = self.tables.write().await;
        if tables.users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }

        tables.next_user_id += 1;
        let now = Utc::now();
        let user = User {
            id: tables.next_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: now,
            updated_at: now,
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.id == id).cloned())
    }

    async fn create_item(&self, owner_id: i32, name: &str, price: i32) -> Result<Item, StoreError> {
        let mut tables = self.tables.write().await;
        // Same outcome as the foreign key on `items.user_id`
        if !tables.users.iter().any(|u| u.id == owner_id) {
            return Err(StoreError::UnknownOwner);
        }

        tables.next_item_id += 1;
        let now = Utc::now();
        let item = Item {
            id: tables.next_item_id,
            owner_id,
            name: name.to_string(),
            price,
            created_at: now,
            updated_at: now,
        };
        tables.items.push(item.clone());
        Ok(item)
    }

    async fn find_item(&self, id: i32) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.items.iter().find(|i| i.id == id).cloned())
    }

    async fn list_items(&self, owner_id: i32) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .items
            .iter()
            .filter(|i| i.owner_id == owner_id)
            .cloned()
            .collect())
    }

    async fn update_item(
        &self,
        id: i32,
        owner_id: i32,
        name: &str,
        price: i32,
    ) -> Result<Option<Item>, StoreError> {
        let mut tables = self.tables.write().await;
        let Some(item) = tables
            .items
            .iter_mut()
            .find(|i| i.id == id && i.owner_id == owner_id)
        else {
            return Ok(None);
        };

        item.name = name.to_string();
        item.price = price;
        item.updated_at = Utc::now();
        Ok(Some(item.clone()))
    }
}
