// Password hashing and verification with Argon2id

use crate::auth::error::HashingError;
use crate::config::HashingConfig;
use argon2::password_hash::{self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::{Algorithm, Argon2, Params, Version};
use rand::{rngs::OsRng, RngCore};

/// Password service for hashing and verification
///
/// Holds validated cost parameters; every hash embeds its own parameters and
/// salt in PHC string form, so verification keeps working after the
/// configured costs change.
#[derive(Clone)]
pub struct PasswordService {
    params: Params,
    salt_len: usize,
    pepper: Option<Vec<u8>>,
}

impl PasswordService {
    /// Build a PasswordService from configuration, rejecting unusable costs
    pub fn new(config: &HashingConfig) -> Result<Self, HashingError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            Some(config.output_len),
        )
        .map_err(|e| HashingError::Params(e.to_string()))?;

        let service = Self {
            params,
            salt_len: config.salt_len,
            pepper: config.pepper.clone(),
        };
        // Surface a bad pepper at startup rather than on first login
        service.argon2()?;
        Ok(service)
    }

    fn argon2(&self) -> Result<Argon2<'_>, HashingError> {
        match &self.pepper {
            Some(secret) => Argon2::new_with_secret(
                secret,
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )
            .map_err(|e| HashingError::Params(e.to_string())),
            None => Ok(Argon2::new(
                Algorithm::Argon2id,
                Version::V0x13,
                self.params.clone(),
            )),
        }
    }

    /// Hash a password with a fresh random salt
    pub fn hash_password(&self, password: &str) -> Result<String, HashingError> {
        let mut salt_bytes = vec![0u8; self.salt_len];
        OsRng
            .try_fill_bytes(&mut salt_bytes)
            .map_err(|e| HashingError::Entropy(e.to_string()))?;
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| HashingError::Hash(e.to_string()))?;

        let hash = self
            .argon2()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| HashingError::Hash(e.to_string()))?;

        Ok(hash.to_string())
    }

    /// Verify a password against a stored hash
    ///
    /// Returns `Ok(false)` on mismatch; errors only when the stored hash
    /// cannot be parsed or recomputed.
    pub fn verify_password(&self, password: &str, stored_hash: &str) -> Result<bool, HashingError> {
        let parsed = PasswordHash::new(stored_hash).map_err(|e| HashingError::MalformedHash(e.to_string()))?;

        match self.argon2()?.verify_password(password.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(password_hash::Error::Password) => Ok(false),
            Err(e) => Err(HashingError::MalformedHash(e.to_string())),
        }
    }
}
