use anyhow::Result;

use crate::identity::{Identity, IdentityPublisher};
use crate::traits::BaseAuthProvider;

/// Publish the identity behind `access_token`, or sign out when there is no
/// token or the provider rejects it.
///
/// Provider failures are returned without touching the feed, so a transient
/// outage does not sign the user out.
pub async fn follow_session(
    auth: &dyn BaseAuthProvider,
    publisher: &IdentityPublisher,
    access_token: Option<&str>,
) -> Result<Option<Identity>> {
    let identity = match access_token {
        Some(token) => auth.identity_for_token(token).await?,
        None => None,
    };

    match &identity {
        Some(identity) => {
            tracing::debug!(identity_id = %identity.id, "Session identity resolved");
            publisher.sign_in(identity.clone());
        }
        None => publisher.sign_out(),
    }

    Ok(identity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::identity_feed;
    use crate::testing::MockAuthProvider;

    #[tokio::test]
    async fn test_valid_token_signs_in() {
        let auth = MockAuthProvider::new().with_session("tok", Identity::new("u1"));
        let (publisher, rx) = identity_feed(None);

        let identity = follow_session(&auth, &publisher, Some("tok")).await.unwrap();

        assert_eq!(identity, Some(Identity::new("u1")));
        assert_eq!(*rx.borrow(), Some(Identity::new("u1")));
    }

    #[tokio::test]
    async fn test_rejected_token_signs_out() {
        let auth = MockAuthProvider::new();
        let (publisher, rx) = identity_feed(Some(Identity::new("u1")));

        let identity = follow_session(&auth, &publisher, Some("expired")).await.unwrap();

        assert_eq!(identity, None);
        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test]
    async fn test_no_token_signs_out() {
        let auth = MockAuthProvider::new();
        let (publisher, rx) = identity_feed(Some(Identity::new("u1")));

        follow_session(&auth, &publisher, None).await.unwrap();

        assert_eq!(*rx.borrow(), None);
    }

    #[tokio::test]
    async fn test_provider_failure_keeps_identity() {
        let auth = MockAuthProvider::new().unreachable();
        let (publisher, rx) = identity_feed(Some(Identity::new("u1")));

        assert!(follow_session(&auth, &publisher, Some("tok")).await.is_err());
        assert_eq!(*rx.borrow(), Some(Identity::new("u1")));
    }
}
