// Credential store
// The data-access contract consumed by the auth and item services, with a
// Postgres implementation and an in-process one.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use thiserror::Error;

use crate::auth::models::User;
use crate::items::models::Item;

pub use memory::MemoryCredentialStore;
pub use postgres::PgCredentialStore;

/// Storage errors
///
/// `DuplicateEmail` and `UnknownOwner` are the failures callers branch on;
/// everything else is opaque and becomes a 500.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("a user with this email already exists")]
    DuplicateEmail,
    #[error("item owner does not exist")]
    UnknownOwner,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Persistence for users and their items
///
/// Lookups that find nothing return `Ok(None)`. Item reads and writes that
/// take an owner only match rows of that owner, so a foreign row is
/// indistinguishable from a missing one.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert a user; fails with `DuplicateEmail` on a uniqueness violation
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError>;

    /// Insert an item; fails with `UnknownOwner` if no such user exists
    async fn create_item(&self, owner_id: i32, name: &str, price: i32) -> Result<Item, StoreError>;

    async fn find_item(&self, id: i32) -> Result<Option<Item>, StoreError>;

    /// All items of one owner, in insertion order
    async fn list_items(&self, owner_id: i32) -> Result<Vec<Item>, StoreError>;

    /// Replace name and price of an item if `owner_id` owns it
    async fn update_item(
        &self,
        id: i32,
        owner_id: i32,
        name: &str,
        price: i32,
    ) -> Result<Option<Item>, StoreError>;
}
