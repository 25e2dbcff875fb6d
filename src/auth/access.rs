// Access control: token authentication and item ownership checks

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::debug;

use crate::auth::{error::AuthFailure, middleware::AuthenticatedUser, token::TokenService};
use crate::items::models::Item;

/// Outcome of an ownership check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Allowed,
    Denied,
}

/// The single gate protected operations pass through
#[derive(Clone)]
pub struct AccessController {
    tokens: Arc<TokenService>,
}

impl AccessController {
    pub fn new(tokens: Arc<TokenService>) -> Self {
        Self { tokens }
    }

    /// Verify a bearer token and produce the authenticated request context
    pub fn authenticate(&self, token: &str) -> Result<AuthenticatedUser, AuthFailure> {
        self.authenticate_at(token, Utc::now())
    }

    pub fn authenticate_at(&self, token: &str, now: DateTime<Utc>) -> Result<AuthenticatedUser, AuthFailure> {
        let user_id = self.tokens.verify(token, now)?;
        Ok(AuthenticatedUser { user_id })
    }

    /// Allowed iff the caller owns the item
    ///
    /// Callers must answer `Denied` exactly like a missing item.
    pub fn authorize_item_access(&self, user: &AuthenticatedUser, item: &Item) -> Access {
        if item.owner_id == user.user_id {
            Access::Allowed
        } else {
            debug!(
                "Ownership check failed: user_id={}, item_id={}",
                user.user_id, item.id
            );
            Access::Denied
        }
    }
}
