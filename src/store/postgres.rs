// Postgres-backed credential store

use async_trait::async_trait;
use sqlx::PgPool;

use crate::auth::models::User;
use crate::items::models::Item;
use crate::store::{CredentialStore, StoreError};

/// Credential store over a sqlx Postgres pool
#[derive(Clone)]
pub struct PgCredentialStore {
    pool: PgPool,
}

impl PgCredentialStore {
    /// Create a new PgCredentialStore
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn create_user(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, password)
            VALUES ($1, $2)
            RETURNING id, email, password, created_at, updated_at
            "#,
        )
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            // Check for unique constraint violation
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_unique_violation() {
                    return StoreError::DuplicateEmail;
                }
            }
            StoreError::Database(e)
        })
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_user_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create_item(&self, owner_id: i32, name: &str, price: i32) -> Result<Item, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            r#"
            INSERT INTO items (user_id, name, price)
            VALUES ($1, $2, $3)
            RETURNING id, user_id, name, price, created_at, updated_at
            "#,
        )
        .bind(owner_id)
        .bind(name)
        .bind(price)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.is_foreign_key_violation() {
                    return StoreError::UnknownOwner;
                }
            }
            StoreError::Database(e)
        })?;

        Ok(item)
    }

    async fn find_item(&self, id: i32) -> Result<Option<Item>, StoreError> {
        let item = sqlx::query_as::<_, Item>(
            "SELECT id, user_id, name, price, created_at, updated_at FROM items WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }

    async fn list_items(&self, owner_id: i32) -> Result<Vec<Item>, StoreError> {
        let items = sqlx::query_as::<_, Item>(
            r#"
            SELECT id, user_id, name, price, created_at, updated_at
            FROM items
            WHERE user_id = $1
            ORDER BY id
            "#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(items)
    }

    async fn update_item(
        &self,
        id: i32,
        owner_id: i32,
        name: &str,
        price: i32,
    ) -> Result<Option<Item>, StoreError> {
        // Ownership is part of the predicate, so a foreign row updates nothing
        let item = sqlx::query_as::<_, Item>(
            r#"
            UPDATE items
            SET name = $1, price = $2, updated_at = now()
            WHERE id = $3 AND user_id = $4
            RETURNING id, user_id, name, price, created_at, updated_at
            "#,
        )
        .bind(name)
        .bind(price)
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(item)
    }
}
