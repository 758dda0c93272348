//! Reducer environments.
//!
//! One environment type parameterized over the provider traits serves all
//! three feature reducers. Environments are cheap to clone; effects clone
//! the providers they need into their futures.

use std::sync::{Arc, RwLock};

use ticketline_core::environment::Clock;

use crate::providers::{Api, CredentialStore};
use crate::state::Credential;

/// Shared slot holding the bearer credential of the active session.
///
/// The session gate is the sole writer; the HTTP provider reads it to
/// attach the bearer header. Absence means anonymous.
#[derive(Clone, Default)]
pub struct CredentialSlot {
    inner: Arc<RwLock<Option<Credential>>>,
}

impl CredentialSlot {
    /// Create an empty (anonymous) slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Read the current credential.
    #[must_use]
    pub fn get(&self) -> Option<Credential> {
        // Lock poisoning requires a writer panic; treat as anonymous.
        self.inner.read().map(|guard| guard.clone()).unwrap_or_default()
    }

    /// Replace the credential. `None` clears it.
    pub fn set(&self, credential: Option<Credential>) {
        if let Ok(mut guard) = self.inner.write() {
            *guard = credential;
        }
    }
}

impl std::fmt::Debug for CredentialSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.get().is_some() { "set" } else { "empty" };
        f.debug_struct("CredentialSlot").field("credential", &state).finish()
    }
}

/// Environment for the client reducers.
#[derive(Debug, Clone)]
pub struct ClientEnvironment<A, C, K>
where
    A: Api,
    C: CredentialStore,
    K: Clock,
{
    /// Platform REST API.
    pub api: A,

    /// Durable session persistence.
    pub credentials: C,

    /// Time source.
    pub clock: K,

    /// Bearer credential of the active session.
    pub slot: CredentialSlot,
}

impl<A, C, K> ClientEnvironment<A, C, K>
where
    A: Api,
    C: CredentialStore,
    K: Clock,
{
    /// Assemble an environment from its providers with an empty slot.
    pub fn new(api: A, credentials: C, clock: K) -> Self {
        Self {
            api,
            credentials,
            clock,
            slot: CredentialSlot::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_starts_anonymous() {
        let slot = CredentialSlot::new();
        assert!(slot.get().is_none());
    }

    #[test]
    fn test_slot_set_and_clear() {
        let slot = CredentialSlot::new();
        slot.set(Some(Credential::new("token".to_string())));
        assert_eq!(slot.get(), Some(Credential::new("token".to_string())));

        let reader = slot.clone();
        slot.set(None);
        assert!(reader.get().is_none());
    }
}
