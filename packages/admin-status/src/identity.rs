//! Authenticated identity and the feed that carries it.
//!
//! The auth layer owns sign-in and sign-out; everything downstream only
//! observes the current value through a `watch` channel.

use tokio::sync::watch;

/// Authenticated user handle. Only `id` is needed to look up a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
    pub email: Option<String>,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

impl From<supabase_client::SupabaseUser> for Identity {
    fn from(user: supabase_client::SupabaseUser) -> Self {
        Self {
            id: user.id,
            email: user.email,
        }
    }
}

/// Create an identity feed starting at `initial`.
pub fn identity_feed(
    initial: Option<Identity>,
) -> (IdentityPublisher, watch::Receiver<Option<Identity>>) {
    let (tx, rx) = watch::channel(initial);
    (IdentityPublisher { tx }, rx)
}

/// Write side of an identity feed, held by whatever owns the session.
#[derive(Debug, Clone)]
pub struct IdentityPublisher {
    tx: watch::Sender<Option<Identity>>,
}

impl IdentityPublisher {
    pub fn sign_in(&self, identity: Identity) {
        self.publish(Some(identity));
    }

    pub fn sign_out(&self) {
        self.publish(None);
    }

    /// Observers are only woken when the value actually changes.
    pub fn publish(&self, identity: Option<Identity>) {
        self.tx.send_if_modified(|current| {
            if *current == identity {
                return false;
            }
            *current = identity;
            true
        });
    }

    pub fn current(&self) -> Option<Identity> {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Identity>> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_sign_in_notifies_observers() {
        let (publisher, mut rx) = identity_feed(None);

        publisher.sign_in(Identity::new("u1"));

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().as_ref().map(|i| i.id.as_str()), Some("u1"));
    }

    #[tokio::test]
    async fn test_republishing_same_identity_is_silent() {
        let (publisher, mut rx) = identity_feed(Some(Identity::new("u1")));
        rx.borrow_and_update();

        publisher.sign_in(Identity::new("u1"));

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn test_sign_out_clears_identity() {
        let (publisher, _rx) = identity_feed(Some(Identity::new("u1")));

        publisher.sign_out();

        assert_eq!(publisher.current(), None);
    }

    #[test]
    fn test_identity_from_supabase_user() {
        let user: supabase_client::SupabaseUser = serde_json::from_value(serde_json::json!({
            "id": "u9",
            "email": "u9@example.org",
            "role": "authenticated"
        }))
        .unwrap();

        let identity = Identity::from(user);

        assert_eq!(identity, Identity::new("u9").with_email("u9@example.org"));
    }
}
