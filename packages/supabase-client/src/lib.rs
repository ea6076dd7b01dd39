//! Pure Supabase REST API client.
//!
//! A minimal client for the two Supabase services this workspace talks to:
//! PostgREST row selection (`/rest/v1`) and the Auth user endpoint (`/auth/v1`).
//!
//! # Example
//!
//! ```rust,ignore
//! use supabase_client::{EqFilter, SupabaseClient};
//!
//! let client = SupabaseClient::from_env()?;
//!
//! let row: serde_json::Value = client
//!     .select_single("profiles", "role", EqFilter::new("id", user_id))
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{Result, SupabaseError};
pub use types::{EqFilter, SupabaseUser};

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use types::ErrorBody;

/// Supabase client bound to one project.
///
/// Requests carry the anon key as `apikey`. The bearer token is the user's
/// access token when one is set (so row-level security applies), otherwise
/// the anon key.
#[derive(Clone)]
pub struct SupabaseClient {
    http_client: reqwest::Client,
    base_url: String,
    anon_key: String,
    access_token: Option<String>,
}

impl SupabaseClient {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            http_client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            access_token: None,
        }
    }

    /// Create from `SUPABASE_URL` and `SUPABASE_ANON_KEY`.
    pub fn from_env() -> Result<Self> {
        let url = std::env::var("SUPABASE_URL")
            .map_err(|_| SupabaseError::Config("SUPABASE_URL not set".into()))?;
        let key = std::env::var("SUPABASE_ANON_KEY")
            .map_err(|_| SupabaseError::Config("SUPABASE_ANON_KEY not set".into()))?;
        Ok(Self::new(url, key))
    }

    /// Act on behalf of a signed-in user.
    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = Some(token.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn authorized(&self, builder: RequestBuilder, bearer: &str) -> RequestBuilder {
        builder
            .header("apikey", &self.anon_key)
            .bearer_auth(bearer)
    }

    fn bearer(&self) -> &str {
        self.access_token.as_deref().unwrap_or(&self.anon_key)
    }

    /// Select rows from `table`, keeping only `select` columns and rows matching every filter.
    pub async fn select_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filters: &[EqFilter],
    ) -> Result<Vec<T>> {
        self.select(table, select, filters, None).await
    }

    /// Select exactly one row. Zero rows is [`SupabaseError::NoRows`], more than
    /// one is [`SupabaseError::MultipleRows`].
    pub async fn select_single<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filter: EqFilter,
    ) -> Result<T> {
        // Two rows are enough to tell "one" from "many".
        let mut rows: Vec<T> = self
            .select(table, select, std::slice::from_ref(&filter), Some(2))
            .await?;

        match rows.len() {
            0 => Err(SupabaseError::NoRows),
            1 => Ok(rows.remove(0)),
            n => Err(SupabaseError::MultipleRows(n)),
        }
    }

    async fn select<T: DeserializeOwned>(
        &self,
        table: &str,
        select: &str,
        filters: &[EqFilter],
        limit: Option<usize>,
    ) -> Result<Vec<T>> {
        let url = format!("{}/rest/v1/{}", self.base_url, table);

        let mut query: Vec<(String, String)> = vec![("select".to_string(), select.to_string())];
        query.extend(filters.iter().map(EqFilter::to_query_pair));
        if let Some(limit) = limit {
            query.push(("limit".to_string(), limit.to_string()));
        }

        tracing::debug!(table, select, filters = filters.len(), "PostgREST select");

        let resp = self
            .authorized(self.http_client.get(&url), self.bearer())
            .query(&query)
            .send()
            .await?;

        let body = Self::success_body(resp).await?;
        serde_json::from_str(&body)
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse rows from {}: {}", table, e)))
    }

    /// Look up the user that owns `access_token`.
    pub async fn get_user(&self, access_token: &str) -> Result<SupabaseUser> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let resp = self
            .authorized(self.http_client.get(&url), access_token)
            .send()
            .await?;

        // Older GoTrue answers a bad JWT with 401, current versions with 403 (`bad_jwt`).
        if matches!(resp.status(), StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            return Err(SupabaseError::Unauthorized);
        }

        let body = Self::success_body(resp).await?;
        serde_json::from_str(&body)
            .map_err(|e| SupabaseError::Parse(format!("Failed to parse user: {}", e)))
    }

    async fn success_body(resp: Response) -> Result<String> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp.text().await?);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(ErrorBody::into_message)
            .unwrap_or(body);
        Err(SupabaseError::Api {
            status: status.as_u16(),
            message,
        })
    }
}
