// Authentication error types

use thiserror::Error;

/// Reasons a bearer token is not trusted
///
/// Every variant maps to HTTP 401; the variant only reaches the logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthFailure {
    #[error("missing authentication token")]
    Missing,
    #[error("malformed token")]
    Malformed,
    #[error("token signature does not verify")]
    BadSignature,
    #[error("token has expired")]
    Expired,
    #[error("token subject does not exist")]
    UnknownSubject,
}

/// Failures of the token signer itself (key loading, encoding)
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("invalid signing key: {0}")]
    InvalidKey(#[source] jsonwebtoken::errors::Error),
    #[error("token encoding failed: {0}")]
    Encoding(#[source] jsonwebtoken::errors::Error),
    #[error("token lifetime of {0} seconds is out of range")]
    InvalidTtl(u64),
    #[error("token expiry overflows the timestamp range")]
    ExpiryOverflow,
}

/// Password hashing failures
///
/// A wrong password is not an error; these only cover entropy, parameter
/// and stored-hash format problems.
#[derive(Debug, Error)]
pub enum HashingError {
    #[error("entropy source unavailable: {0}")]
    Entropy(String),
    #[error("invalid argon2 parameters: {0}")]
    Params(String),
    #[error("hashing failed: {0}")]
    Hash(String),
    #[error("stored password hash is malformed: {0}")]
    MalformedHash(String),
    #[error("hashing worker failed: {0}")]
    Worker(String),
}
