// Authentication module
// Argon2id password hashing, EdDSA bearer tokens, registration and login

pub mod access;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod token;

// Re-export commonly used types
pub use access::{Access, AccessController};
pub use error::{AuthFailure, HashingError, TokenError};
pub use handlers::{login_handler, me_handler, register_handler};
pub use middleware::AuthenticatedUser;
pub use models::{LoginRequest, RegisterRequest, TokenResponse, User, UserResponse};
pub use password::PasswordService;
pub use service::AuthService;
pub use token::TokenService;
