//! Admin status resolution.
//!
//! The resolver follows a single current identity. Every identity change
//! starts a new cycle with a fresh generation number; a lookup may only
//! publish its result while its generation is still current, so a slow
//! response for a previous identity can never overwrite a newer state.
//!
//! # Usage
//!
//! ```rust,ignore
//! let resolver = AdminStatusResolver::from_config(&config);
//! resolver.watch_identity(identity_rx);
//!
//! if resolver.is_admin() { /* show admin tools */ }
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use supabase_client::SupabaseClient;
use tokio::sync::watch;
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::LookupError;
use crate::identity::Identity;
use crate::supabase::SupabaseProfileStore;
use crate::traits::BaseProfileStore;

/// Profile role that grants admin access.
pub const ADMIN_ROLE: &str = "admin";

/// Observable state of the resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminStatus {
    /// No identity
    Idle,
    /// Lookup in flight for the current identity
    Resolving,
    ResolvedNonAdmin,
    ResolvedAdmin,
}

impl AdminStatus {
    pub fn is_admin(&self) -> bool {
        matches!(self, AdminStatus::ResolvedAdmin)
    }

    /// Whether no lookup is pending.
    pub fn is_settled(&self) -> bool {
        !matches!(self, AdminStatus::Resolving)
    }
}

struct Cycle {
    generation: u64,
    identity: Option<Identity>,
    in_flight: Option<AbortHandle>,
}

struct Inner {
    store: Arc<dyn BaseProfileStore>,
    lookup_timeout: Duration,
    cycle: Mutex<Cycle>,
    status: watch::Sender<AdminStatus>,
}

impl Inner {
    fn cycle(&self) -> MutexGuard<'_, Cycle> {
        self.cycle.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Publish a lookup result unless a newer cycle has started.
    fn complete(&self, generation: u64, identity_id: &str, status: AdminStatus) -> bool {
        let cycle = self.cycle();
        if cycle.generation != generation {
            debug!(
                identity_id,
                generation,
                current_generation = cycle.generation,
                "Discarding admin lookup for superseded identity"
            );
            return false;
        }

        self.status.send_replace(status);
        true
    }
}

/// Resolves whether the current identity holds the admin role.
///
/// Cheap to clone; clones share state. Methods that start a lookup must be
/// called from within a Tokio runtime.
#[derive(Clone)]
pub struct AdminStatusResolver {
    inner: Arc<Inner>,
}

impl AdminStatusResolver {
    pub fn new(store: Arc<dyn BaseProfileStore>, lookup_timeout: Duration) -> Self {
        let (status, _) = watch::channel(AdminStatus::Idle);
        Self {
            inner: Arc::new(Inner {
                store,
                lookup_timeout,
                cycle: Mutex::new(Cycle {
                    generation: 0,
                    identity: None,
                    in_flight: None,
                }),
                status,
            }),
        }
    }

    /// Resolver backed by the Supabase `profiles` table.
    pub fn from_config(config: &Config) -> Self {
        let client = SupabaseClient::new(&config.supabase_url, &config.supabase_anon_key);
        Self::new(
            Arc::new(SupabaseProfileStore::new(client)),
            config.lookup_timeout,
        )
    }

    pub fn is_admin(&self) -> bool {
        self.inner.status.borrow().is_admin()
    }

    pub fn status(&self) -> AdminStatus {
        *self.inner.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<AdminStatus> {
        self.inner.status.subscribe()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.cycle().identity.clone()
    }

    /// Wait until the current cycle has no pending lookup.
    pub async fn settled(&self) -> AdminStatus {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so the channel cannot close while waiting.
        let settled = rx.wait_for(AdminStatus::is_settled).await.map(|status| *status);
        settled.unwrap_or_else(|_| self.status())
    }

    /// Switch to `identity`. Setting the identity already held is a no-op.
    ///
    /// Returns the handle of the lookup task when one was started.
    pub fn set_identity(&self, identity: Option<Identity>) -> Option<JoinHandle<()>> {
        let mut cycle = self.inner.cycle();
        if cycle.identity == identity {
            return None;
        }
        self.begin(&mut cycle, identity)
    }

    /// Start a new cycle for the current identity, if there is one.
    pub fn refresh(&self) -> Option<JoinHandle<()>> {
        let mut cycle = self.inner.cycle();
        let identity = cycle.identity.clone()?;
        self.begin(&mut cycle, Some(identity))
    }

    /// Follow an identity feed until its sender is dropped.
    pub fn watch_identity(&self, mut identities: watch::Receiver<Option<Identity>>) -> JoinHandle<()> {
        let resolver = self.clone();
        tokio::spawn(async move {
            let initial = identities.borrow_and_update().clone();
            resolver.set_identity(initial);

            while identities.changed().await.is_ok() {
                let identity = identities.borrow_and_update().clone();
                resolver.set_identity(identity);
            }

            debug!("Identity feed closed, admin resolver stopped following it");
        })
    }

    fn begin(&self, cycle: &mut Cycle, identity: Option<Identity>) -> Option<JoinHandle<()>> {
        // Aborting only saves the request; the generation check still guards
        // results that race the abort.
        if let Some(previous) = cycle.in_flight.take() {
            previous.abort();
        }

        cycle.generation += 1;
        cycle.identity = identity.clone();

        let Some(identity) = identity else {
            self.inner.status.send_replace(AdminStatus::Idle);
            return None;
        };

        self.inner.status.send_replace(AdminStatus::Resolving);
        debug!(identity_id = %identity.id, generation = cycle.generation, "Resolving admin status");

        let inner = Arc::clone(&self.inner);
        let generation = cycle.generation;
        let handle = tokio::spawn(async move {
            let status = lookup(&inner, &identity).await;
            inner.complete(generation, &identity.id, status);
        });
        cycle.in_flight = Some(handle.abort_handle());
        Some(handle)
    }
}

async fn lookup(inner: &Inner, identity: &Identity) -> AdminStatus {
    let result = tokio::time::timeout(inner.lookup_timeout, inner.store.fetch_role(&identity.id))
        .await
        .unwrap_or_else(|_| {
            Err(LookupError::LookupFailed(format!(
                "timed out after {:?}",
                inner.lookup_timeout
            )))
        });

    match result {
        Ok(role) if role == ADMIN_ROLE => {
            info!(identity_id = %identity.id, "Identity has admin role");
            AdminStatus::ResolvedAdmin
        }
        Ok(role) => {
            debug!(identity_id = %identity.id, role = %role, "Identity is not an admin");
            AdminStatus::ResolvedNonAdmin
        }
        Err(e) => {
            warn!(identity_id = %identity.id, error = %e, "Admin role lookup failed, treating as non-admin");
            AdminStatus::ResolvedNonAdmin
        }
    }
}
