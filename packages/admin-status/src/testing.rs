// Test doubles for the infrastructure traits
//
// Inject these into AdminStatusResolver / follow_session in tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::error::LookupError;
use crate::identity::Identity;
use crate::traits::{BaseAuthProvider, BaseProfileStore};

// =============================================================================
// Mock Profile Store
// =============================================================================

#[derive(Debug, Clone)]
enum MockResponse {
    Role(String),
    Error(LookupError),
    Hang,
}

/// Profile store answering from an in-memory table.
///
/// Unknown ids answer `NotFound`. A gated id holds its response until the
/// gate is notified, which lets tests interleave lookups deterministically.
pub struct MockProfileStore {
    responses: Mutex<HashMap<String, MockResponse>>,
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    fetch_calls: Mutex<Vec<String>>,
}

impl MockProfileStore {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
            fetch_calls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_role(self, identity_id: &str, role: &str) -> Self {
        self.set_role(identity_id, role);
        self
    }

    pub fn with_error(self, identity_id: &str, error: LookupError) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(identity_id.to_string(), MockResponse::Error(error));
        self
    }

    /// Never answer for this id (exercises the lookup timeout)
    pub fn with_hang(self, identity_id: &str) -> Self {
        self.responses
            .lock()
            .unwrap()
            .insert(identity_id.to_string(), MockResponse::Hang);
        self
    }

    /// Change the stored role after construction
    pub fn set_role(&self, identity_id: &str, role: &str) {
        self.responses
            .lock()
            .unwrap()
            .insert(identity_id.to_string(), MockResponse::Role(role.to_string()));
    }

    /// Hold lookups for this id until the returned gate is notified
    pub fn gate(&self, identity_id: &str) -> Arc<Notify> {
        self.gates
            .lock()
            .unwrap()
            .entry(identity_id.to_string())
            .or_insert_with(|| Arc::new(Notify::new()))
            .clone()
    }

    /// Get all ids that were looked up, in call order
    pub fn fetch_calls(&self) -> Vec<String> {
        self.fetch_calls.lock().unwrap().clone()
    }
}

impl Default for MockProfileStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseProfileStore for MockProfileStore {
    async fn fetch_role(&self, identity_id: &str) -> Result<String, LookupError> {
        self.fetch_calls
            .lock()
            .unwrap()
            .push(identity_id.to_string());

        let gate = self.gates.lock().unwrap().get(identity_id).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        let response = self.responses.lock().unwrap().get(identity_id).cloned();
        match response {
            Some(MockResponse::Role(role)) => Ok(role),
            Some(MockResponse::Error(error)) => Err(error),
            Some(MockResponse::Hang) => std::future::pending().await,
            None => Err(LookupError::NotFound),
        }
    }
}

// =============================================================================
// Mock Auth Provider
// =============================================================================

/// Auth provider mapping known access tokens to identities.
pub struct MockAuthProvider {
    sessions: HashMap<String, Identity>,
    fail: bool,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
            fail: false,
        }
    }

    pub fn with_session(mut self, access_token: &str, identity: Identity) -> Self {
        self.sessions.insert(access_token.to_string(), identity);
        self
    }

    /// Make every call fail as if Supabase Auth were unreachable
    pub fn unreachable(mut self) -> Self {
        self.fail = true;
        self
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseAuthProvider for MockAuthProvider {
    async fn identity_for_token(&self, access_token: &str) -> anyhow::Result<Option<Identity>> {
        if self.fail {
            anyhow::bail!("auth provider unreachable");
        }
        Ok(self.sessions.get(access_token).cloned())
    }
}
