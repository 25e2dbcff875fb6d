// Authentication data models and DTOs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

use crate::validation::FieldNames;

/// User database model
///
/// `password_hash` maps to the `password` column and never leaves the server.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i32,
    pub email: String,
    #[sqlx(rename = "password")]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// User response model (excludes password_hash)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i32,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            email: user.email,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

const CREDENTIAL_FIELDS: &[(&str, &str)] = &[("email", "Email"), ("password", "Password")];

/// Registration request DTO
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterRequest {
    #[serde(default, deserialize_with = "normalized_optional_email")]
    #[validate(required, email)]
    #[schema(example = "alice@example.com")]
    pub email: Option<String>,
    #[validate(required, length(min = 8))]
    #[schema(example = "password123", min_length = 8)]
    pub password: Option<String>,
}

impl FieldNames for RegisterRequest {
    const FIELD_NAMES: &'static [(&'static str, &'static str)] = CREDENTIAL_FIELDS;
}

impl RegisterRequest {
    /// Email and password of a validated request
    pub fn into_parts(self) -> Option<(String, String)> {
        Some((self.email?, self.password?))
    }
}

/// Login request DTO
///
/// Carries no shape rules beyond JSON types; a bad email or password is a
/// 401, not a 400.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginRequest {
    #[serde(deserialize_with = "normalized_email")]
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

impl FieldNames for LoginRequest {
    const FIELD_NAMES: &'static [(&'static str, &'static str)] = CREDENTIAL_FIELDS;
}

/// Login response DTO
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TokenResponse {
    pub token: String,
}

/// Trim and lower-case an email so lookups and uniqueness ignore case
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

// Emails are normalized while deserializing, so the `email` rule sees the
// same value that gets stored.
fn normalized_email<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    String::deserialize(deserializer).map(|email| normalize_email(&email))
}

fn normalized_optional_email<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    Option::<String>::deserialize(deserializer).map(|email| email.as_deref().map(normalize_email))
}
