// Authentication service - business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::auth::{
    error::{AuthFailure, HashingError},
    middleware::AuthenticatedUser,
    models::{normalize_email, TokenResponse, UserResponse},
    password::PasswordService,
    token::TokenService,
};
use crate::error::ApiError;
use crate::store::CredentialStore;

/// Authentication service coordinating registration, login and identity lookup
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    password_service: Arc<PasswordService>,
    token_service: Arc<TokenService>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        password_service: Arc<PasswordService>,
        token_service: Arc<TokenService>,
    ) -> Self {
        Self {
            store,
            password_service,
            token_service,
        }
    }

    /// Register a new user
    ///
    /// Input shape has already been validated. A taken email surfaces as a
    /// 400 on the `email` field via `StoreError::DuplicateEmail`.
    pub async fn register(&self, email: &str, password: &str) -> Result<UserResponse, ApiError> {
        let email = normalize_email(email);

        let passwords = Arc::clone(&self.password_service);
        let password = password.to_string();
        let password_hash = run_blocking(move || passwords.hash_password(&password)).await?;

        let user = self.store.create_user(&email, &password_hash).await?;
        info!("User registered: user_id={}", user.id);
        Ok(user.into())
    }

    /// Exchange credentials for a signed token
    pub async fn login(&self, email: &str, password: &str) -> Result<TokenResponse, ApiError> {
        let email = normalize_email(email);

        let user = self
            .store
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| ApiError::InvalidCredentials(ApiError::field("email", "Incorrect email address")))?;

        let passwords = Arc::clone(&self.password_service);
        let password = password.to_string();
        let stored_hash = user.password_hash.clone();
        let matches = run_blocking(move || passwords.verify_password(&password, &stored_hash)).await?;

        if !matches {
            return Err(ApiError::InvalidCredentials(ApiError::field(
                "password",
                "Incorrect password",
            )));
        }

        let token = self.token_service.issue(user.id, Utc::now())?;
        info!("Token issued: user_id={}", user.id);
        Ok(TokenResponse { token })
    }

    /// Load the user behind an authenticated request
    ///
    /// A valid token whose subject no longer exists is treated as untrusted.
    pub async fn current_user(&self, auth: &AuthenticatedUser) -> Result<UserResponse, ApiError> {
        match self.store.find_user_by_id(auth.user_id).await? {
            Some(user) => Ok(user.into()),
            None => {
                debug!("Token subject not found: user_id={}", auth.user_id);
                Err(AuthFailure::UnknownSubject.into())
            }
        }
    }
}

/// Run CPU-heavy hashing off the async workers
async fn run_blocking<T, F>(f: F) -> Result<T, HashingError>
where
    F: FnOnce() -> Result<T, HashingError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| HashingError::Worker(e.to_string()))?
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryCredentialStore;
    use crate::test_support::{test_password_service, test_token_service};

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(MemoryCredentialStore::new()),
            Arc::new(test_password_service()),
            Arc::new(test_token_service()),
        )
    }

    #[tokio::test]
    async fn test_register_stores_hash_not_password() {
        let store = Arc::new(MemoryCredentialStore::new());
        let service = AuthService::new(
            store.clone(),
            Arc::new(test_password_service()),
            Arc::new(test_token_service()),
        );

        let user = service.register("alice@example.com", "password123").await.unwrap();
        assert_eq!(user.email, "alice@example.com");

        let stored = store.find_user_by_email("alice@example.com").await.unwrap().unwrap();
        assert_ne!(stored.password_hash, "password123");
        let passwords = test_password_service();
        assert!(passwords.verify_password("password123", &stored.password_hash).unwrap());
        assert!(!passwords.verify_password("password124", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_register_normalizes_email() {
        let service = service();
        let user = service.register("  Alice@Example.COM ", "password123").await.unwrap();
        assert_eq!(user.email, "alice@example.com");

        let duplicate = service.register("alice@example.com", "password123").await;
        match duplicate {
            Err(ApiError::Validation(errors)) => assert!(errors.contains_key("email")),
            other => panic!("expected duplicate email error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let service = service();
        let user = service.register("alice@example.com", "password123").await.unwrap();

        let response = service.login("ALICE@example.com", "password123").await.unwrap();
        assert_eq!(response.token.split('.').count(), 3);
        assert_eq!(test_token_service().verify(&response.token, Utc::now()), Ok(user.id));
    }

    #[tokio::test]
    async fn test_login_unknown_email() {
        let service = service();
        match service.login("nobody@example.com", "password123").await {
            Err(ApiError::InvalidCredentials(errors)) => {
                assert_eq!(errors, ApiError::field("email", "Incorrect email address"));
            }
            other => panic!("expected invalid credentials, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_login_wrong_password() {
        let service = service();
        service.register("alice@example.com", "password123").await.unwrap();
        match service.login("alice@example.com", "wrong-password").await {
            Err(ApiError::InvalidCredentials(errors)) => {
                assert_eq!(errors, ApiError::field("password", "Incorrect password"));
            }
            other => panic!("expected invalid credentials, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_current_user() {
        let service = service();
        let user = service.register("alice@example.com", "password123").await.unwrap();

        let me = service
            .current_user(&AuthenticatedUser { user_id: user.id })
            .await
            .unwrap();
        assert_eq!(me, user);

        let missing = service.current_user(&AuthenticatedUser { user_id: 999 }).await;
        assert!(matches!(missing, Err(ApiError::Unauthorized(_))));
    }
}
