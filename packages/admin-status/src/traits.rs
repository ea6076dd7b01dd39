// Trait definitions for dependency injection
//
// Infrastructure only. Deciding what counts as "admin" lives in the resolver.

use async_trait::async_trait;

use crate::error::LookupError;
use crate::identity::Identity;

// =============================================================================
// Profile Store Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseProfileStore: Send + Sync {
    /// Fetch the `role` attribute of the single profile keyed by `identity_id`
    async fn fetch_role(&self, identity_id: &str) -> Result<String, LookupError>;
}

// =============================================================================
// Auth Provider Trait (Infrastructure)
// =============================================================================

#[async_trait]
pub trait BaseAuthProvider: Send + Sync {
    /// Resolve the identity behind a session access token.
    /// Returns `Ok(None)` when the token is rejected.
    async fn identity_for_token(&self, access_token: &str) -> anyhow::Result<Option<Identity>>;
}
