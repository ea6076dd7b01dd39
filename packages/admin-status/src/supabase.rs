//! Supabase-backed implementations of the infrastructure traits.

use anyhow::Context;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use supabase_client::{EqFilter, SupabaseClient, SupabaseError};

use crate::error::LookupError;
use crate::identity::Identity;
use crate::traits::{BaseAuthProvider, BaseProfileStore};

pub const PROFILES_TABLE: &str = "profiles";
const ID_COLUMN: &str = "id";
const ROLE_COLUMN: &str = "role";

/// Raw `select=role` row. `role` stays untyped so a bad value is reported as
/// malformed rather than a transport failure.
#[derive(Debug, Deserialize)]
struct ProfileRow {
    #[serde(default)]
    role: Value,
}

impl ProfileRow {
    fn into_role(self) -> Result<String, LookupError> {
        match self.role {
            Value::String(role) => Ok(role),
            Value::Null => Err(LookupError::Malformed("role is missing".into())),
            other => Err(LookupError::Malformed(format!(
                "role is not a string: {}",
                other
            ))),
        }
    }
}

/// Profile store reading the `profiles` table through PostgREST.
#[derive(Clone)]
pub struct SupabaseProfileStore {
    client: SupabaseClient,
}

impl SupabaseProfileStore {
    pub fn new(client: SupabaseClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl BaseProfileStore for SupabaseProfileStore {
    async fn fetch_role(&self, identity_id: &str) -> Result<String, LookupError> {
        let row: ProfileRow = self
            .client
            .select_single(
                PROFILES_TABLE,
                ROLE_COLUMN,
                EqFilter::new(ID_COLUMN, identity_id),
            )
            .await?;

        row.into_role()
    }
}

#[async_trait]
impl BaseAuthProvider for SupabaseClient {
    async fn identity_for_token(&self, access_token: &str) -> anyhow::Result<Option<Identity>> {
        match self.get_user(access_token).await {
            Ok(user) => Ok(Some(user.into())),
            Err(SupabaseError::Unauthorized) => {
                tracing::info!("Access token rejected by Supabase Auth");
                Ok(None)
            }
            Err(e) => Err(e).context("Failed to fetch user from Supabase Auth"),
        }
    }
}
