// EdDSA-signed bearer token issuance and verification

use crate::auth::error::{AuthFailure, TokenError};
use crate::config::TokenConfig;
use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT claims structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // user_id, string-encoded per RFC 7519
    pub iss: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

/// Token service for JWT operations
///
/// Signs with an Ed25519 private key and verifies with the matching public
/// key. Holds no mutable state, so one instance is shared by every request.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl_secs: i64,
}

impl TokenService {
    /// Create a TokenService from PEM key material
    ///
    /// The private key is PKCS#8, the public key SPKI, both Ed25519.
    pub fn new(config: &TokenConfig) -> Result<Self, TokenError> {
        let encoding_key = EncodingKey::from_ed_pem(&config.private_key_pem).map_err(TokenError::InvalidKey)?;
        let decoding_key = DecodingKey::from_ed_pem(&config.public_key_pem).map_err(TokenError::InvalidKey)?;

        // Expiry is checked against the caller's clock in `verify`
        let mut validation = Validation::new(Algorithm::EdDSA);
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_issuer(&[config.issuer.as_str()]);
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);

        let ttl_secs = config.ttl.as_secs();
        let ttl_secs = i64::try_from(ttl_secs).map_err(|_| TokenError::InvalidTtl(ttl_secs))?;

        Ok(Self {
            encoding_key,
            decoding_key,
            validation,
            issuer: config.issuer.clone(),
            ttl_secs,
        })
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Issue a signed token for `user_id`, valid from `now` for the configured TTL
    pub fn issue(&self, user_id: i32, now: DateTime<Utc>) -> Result<String, TokenError> {
        let iat = now.timestamp();
        let claims = Claims {
            sub: user_id.to_string(),
            iss: self.issuer.clone(),
            iat,
            exp: iat.checked_add(self.ttl_secs).ok_or(TokenError::ExpiryOverflow)?,
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key).map_err(TokenError::Encoding)
    }

    /// Decode and check a token, returning its claims
    ///
    /// Signature is checked before any claim, so a tampered token reports
    /// `BadSignature` even if it is also expired.
    pub fn decode_claims(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, AuthFailure> {
        let claims = decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => AuthFailure::BadSignature,
                ErrorKind::ExpiredSignature => AuthFailure::Expired,
                _ => AuthFailure::Malformed,
            })?;

        if now.timestamp() > claims.exp {
            return Err(AuthFailure::Expired);
        }

        Ok(claims)
    }

    /// Verify a token and return the authenticated user id
    pub fn verify(&self, token: &str, now: DateTime<Utc>) -> Result<i32, AuthFailure> {
        let claims = self.decode_claims(token, now)?;
        claims.sub.parse().map_err(|_| AuthFailure::Malformed)
    }
}
