//! One-shot admin check, as run by the `admin-check` binary.

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use supabase_client::SupabaseClient;

use crate::config::Config;
use crate::identity::Identity;
use crate::resolver::AdminStatusResolver;
use crate::supabase::SupabaseProfileStore;
use crate::traits::BaseAuthProvider;

/// Who to check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subject {
    /// Profile id, queried with the anon key
    UserId(String),
    /// Session access token, resolved through Supabase Auth and reused for the
    /// profile query so row-level security applies
    AccessToken(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Report {
    pub identity_id: String,
    pub is_admin: bool,
}

impl Report {
    /// `<id>: admin` / `<id>: not admin`, or a JSON object.
    pub fn render(&self, json: bool) -> Result<String> {
        if json {
            return Ok(serde_json::to_string(self)?);
        }
        let verdict = if self.is_admin { "admin" } else { "not admin" };
        Ok(format!("{}: {}", self.identity_id, verdict))
    }
}

/// Resolve the identity to check. A rejected token is an error.
pub async fn identity_for_subject(
    auth: &dyn BaseAuthProvider,
    subject: &Subject,
) -> Result<Identity> {
    match subject {
        Subject::UserId(id) => Ok(Identity::new(id.as_str())),
        Subject::AccessToken(token) => auth
            .identity_for_token(token)
            .await
            .context("Failed to resolve session")?
            .context("access token was rejected by Supabase Auth"),
    }
}

/// Run one resolution cycle for `identity` and report the result.
pub async fn check(resolver: &AdminStatusResolver, identity: Identity) -> Report {
    tracing::info!(identity_id = %identity.id, "Checking admin status");

    resolver.set_identity(Some(identity.clone()));
    let status = resolver.settled().await;

    Report {
        identity_id: identity.id,
        is_admin: status.is_admin(),
    }
}

/// Check `subject` against the Supabase project in `config`.
pub async fn run_check(config: &Config, subject: &Subject) -> Result<Report> {
    let client = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key);
    let identity = identity_for_subject(&client, subject).await?;

    let profiles = match subject {
        Subject::UserId(_) => client,
        Subject::AccessToken(token) => client.with_access_token(token.as_str()),
    };
    let resolver = AdminStatusResolver::new(
        Arc::new(SupabaseProfileStore::new(profiles)),
        config.lookup_timeout,
    );

    Ok(check(&resolver, identity).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockAuthProvider, MockProfileStore};
    use std::time::Duration;

    #[test]
    fn test_render_plain() {
        let admin = Report {
            identity_id: "u1".into(),
            is_admin: true,
        };
        let member = Report {
            identity_id: "u2".into(),
            is_admin: false,
        };

        assert_eq!(admin.render(false).unwrap(), "u1: admin");
        assert_eq!(member.render(false).unwrap(), "u2: not admin");
    }

    #[test]
    fn test_render_json() {
        let report = Report {
            identity_id: "u1".into(),
            is_admin: true,
        };

        let value: serde_json::Value = serde_json::from_str(&report.render(true).unwrap()).unwrap();
        assert_eq!(value, serde_json::json!({ "identity_id": "u1", "is_admin": true }));
    }

    #[tokio::test]
    async fn test_user_id_needs_no_auth_call() {
        let auth = MockAuthProvider::new().unreachable();

        let identity = identity_for_subject(&auth, &Subject::UserId("u1".into()))
            .await
            .unwrap();

        assert_eq!(identity, Identity::new("u1"));
    }

    #[tokio::test]
    async fn test_accepted_token_yields_identity() {
        let auth = MockAuthProvider::new().with_session("tok", Identity::new("u1"));

        let identity = identity_for_subject(&auth, &Subject::AccessToken("tok".into()))
            .await
            .unwrap();

        assert_eq!(identity.id, "u1");
    }

    #[tokio::test]
    async fn test_rejected_token_is_error() {
        let auth = MockAuthProvider::new();

        let err = identity_for_subject(&auth, &Subject::AccessToken("expired".into()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("rejected"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_error() {
        let auth = MockAuthProvider::new().unreachable();

        let err = identity_for_subject(&auth, &Subject::AccessToken("tok".into()))
            .await
            .unwrap_err();

        assert!(err.to_string().contains("Failed to resolve session"));
    }

    #[tokio::test]
    async fn test_check_reports_resolved_status() {
        let store = Arc::new(
            MockProfileStore::new()
                .with_role("u1", "admin")
                .with_role("u2", "member"),
        );
        let resolver = AdminStatusResolver::new(store, Duration::from_secs(5));

        let admin = check(&resolver, Identity::new("u1")).await;
        let member = check(&resolver, Identity::new("u2")).await;

        assert!(admin.is_admin);
        assert_eq!(member.identity_id, "u2");
        assert!(!member.is_admin);
    }
}
