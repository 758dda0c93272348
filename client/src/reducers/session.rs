//! Session/authorization gate.
//!
//! Owns the one authoritative `Option<Identity>` slot for the process.
//! Every identity change flows through this reducer; observers subscribe to
//! the store's state watch channel and never mutate.
//!
//! The `epoch` counter is the stale-response guard: it is bumped whenever
//! the identity slot changes or an identity-changing operation starts, and
//! every asynchronous completion carries the epoch it was issued under.
//! A completion whose epoch no longer matches is discarded, so a forced
//! logout can never be overwritten by the success of a login that was in
//! flight when it happened.

use std::marker::PhantomData;

use ticketline_core::effect::{Effect, Effects};
use ticketline_core::environment::Clock;
use ticketline_core::reducer::Reducer;
use ticketline_core::smallvec;

use crate::actions::SessionAction;
use crate::environment::ClientEnvironment;
use crate::error::ClientError;
use crate::providers::{Api, CredentialStore};
use crate::state::{Identity, Role, StoredSession};
use crate::validation::{validate_login, validate_registration};

/// What the gate is currently doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    /// No identity-changing operation in flight.
    #[default]
    Idle,

    /// A login request is in flight.
    Authenticating,

    /// A registration request is in flight.
    Registering,

    /// A persisted session is being rehydrated.
    Restoring,
}

/// State of the session gate.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    identity: Option<Identity>,
    phase: SessionPhase,
    epoch: u64,
    last_error: Option<ClientError>,
}

impl SessionState {
    /// True when an identity is installed.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// The active identity, if any.
    #[must_use]
    pub const fn current_identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    /// Role check against a required set. An empty set admits any
    /// authenticated identity; anonymous callers always fail.
    #[must_use]
    pub fn has_role(&self, required: &[Role]) -> bool {
        match &self.identity {
            Some(identity) => required.is_empty() || required.contains(&identity.role),
            None => false,
        }
    }

    /// Current operation phase.
    #[must_use]
    pub const fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Stale-response guard value.
    #[must_use]
    pub const fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The most recent failure, cleared when a new operation starts.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Clear the identity slot, bumping the epoch.
    fn clear_identity(&mut self) {
        self.identity = None;
        self.epoch += 1;
        self.phase = SessionPhase::Idle;
    }

    #[cfg(test)]
    pub(crate) fn install_identity_for_tests(&mut self, identity: Identity) {
        self.identity = Some(identity);
    }
}

/// Reducer for the session gate.
pub struct SessionReducer<A, C, K> {
    _marker: PhantomData<fn() -> (A, C, K)>,
}

impl<A, C, K> SessionReducer<A, C, K> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A, C, K> Default for SessionReducer<A, C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C, K> Reducer for SessionReducer<A, C, K>
where
    A: Api,
    C: CredentialStore,
    K: Clock,
{
    type State = SessionState;
    type Action = SessionAction;
    type Environment = ClientEnvironment<A, C, K>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            SessionAction::Login { username, password } => {
                if let Err(error) = validate_login(&username, &password) {
                    state.phase = SessionPhase::Idle;
                    state.last_error = Some(error);
                    return smallvec![];
                }

                state.epoch += 1;
                state.phase = SessionPhase::Authenticating;
                state.last_error = None;

                let epoch = state.epoch;
                let api = env.api.clone();
                tracing::debug!(%username, epoch, "Login started");

                smallvec![Effect::future(async move {
                    match api.login(&username, &password).await {
                        Ok(identity) => Some(SessionAction::LoginSucceeded { epoch, identity }),
                        Err(error) => Some(SessionAction::LoginFailed { epoch, error }),
                    }
                })]
            },

            SessionAction::LoginSucceeded { epoch, identity } => {
                if epoch != state.epoch {
                    tracing::debug!(epoch, current = state.epoch, "Discarding stale login result");
                    return smallvec![];
                }

                // The slot is updated under the store lock so credential
                // readers never race the identity slot.
                env.slot.set(Some(identity.credential.clone()));

                state.identity = Some(identity.clone());
                state.phase = SessionPhase::Idle;
                state.last_error = None;
                tracing::info!(user = %identity.username, "Login succeeded");

                let credentials = env.credentials.clone();
                let saved_at = env.clock.now();

                smallvec![Effect::future(async move {
                    let record = StoredSession { identity, saved_at };
                    if let Err(error) = credentials.save(&record).await {
                        // Persistence failure degrades rehydration only.
                        tracing::warn!(%error, "Failed to persist session");
                    }
                    None
                })]
            },

            SessionAction::LoginFailed { epoch, error } => {
                if epoch != state.epoch {
                    tracing::debug!(epoch, current = state.epoch, "Discarding stale login failure");
                    return smallvec![];
                }

                state.phase = SessionPhase::Idle;
                state.last_error = Some(error);
                smallvec![]
            },

            SessionAction::Register { form } => {
                if let Err(error) = validate_registration(&form) {
                    state.phase = SessionPhase::Idle;
                    state.last_error = Some(error);
                    return smallvec![];
                }

                state.epoch += 1;
                state.phase = SessionPhase::Registering;
                state.last_error = None;

                let epoch = state.epoch;
                let api = env.api.clone();
                tracing::debug!(username = %form.username, epoch, "Registration started");

                smallvec![Effect::future(async move {
                    match api.register(&form).await {
                        Ok(()) => Some(SessionAction::RegisterSucceeded { epoch }),
                        Err(error) => Some(SessionAction::RegisterFailed { epoch, error }),
                    }
                })]
            },

            SessionAction::RegisterSucceeded { epoch } => {
                if epoch != state.epoch {
                    return smallvec![];
                }

                // The account exists but no credential was issued; the
                // caller logs in next.
                state.phase = SessionPhase::Idle;
                state.last_error = None;
                tracing::info!("Registration succeeded");
                smallvec![]
            },

            SessionAction::RegisterFailed { epoch, error } => {
                if epoch != state.epoch {
                    return smallvec![];
                }

                state.phase = SessionPhase::Idle;
                state.last_error = Some(error);
                smallvec![]
            },

            SessionAction::Logout => {
                state.clear_identity();
                state.last_error = None;
                env.slot.set(None);
                tracing::info!("Logged out");

                // Local clear is already done; storage and server-side
                // invalidation are best-effort and must not block it.
                let credentials = env.credentials.clone();
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    if let Err(error) = credentials.clear().await {
                        tracing::warn!(%error, "Failed to clear persisted session");
                    }
                    if let Err(error) = api.logout().await {
                        tracing::debug!(%error, "Server-side logout failed");
                    }
                    None
                })]
            },

            SessionAction::SessionExpired => {
                if state.identity.is_none() {
                    // Already anonymous; concurrent 401s clear exactly once.
                    return smallvec![];
                }

                state.clear_identity();
                state.last_error = Some(ClientError::SessionExpired);
                env.slot.set(None);
                tracing::info!("Session expired, forced logout");

                let credentials = env.credentials.clone();

                smallvec![Effect::future(async move {
                    if let Err(error) = credentials.clear().await {
                        tracing::warn!(%error, "Failed to clear persisted session");
                    }
                    None
                })]
            },

            SessionAction::Restore => {
                state.epoch += 1;
                state.phase = SessionPhase::Restoring;
                state.last_error = None;

                let epoch = state.epoch;
                let api = env.api.clone();
                let credentials = env.credentials.clone();

                smallvec![Effect::future(async move {
                    let stored = match credentials.load().await {
                        Ok(Some(stored)) => stored,
                        Ok(None) => return Some(SessionAction::RestoreFailed { epoch }),
                        Err(error) => {
                            tracing::warn!(%error, "Failed to load persisted session");
                            let _ = credentials.clear().await;
                            return Some(SessionAction::RestoreFailed { epoch });
                        },
                    };

                    match api.validate_credential(&stored.identity.credential).await {
                        Ok(()) => Some(SessionAction::RestoreSucceeded {
                            epoch,
                            identity: stored.identity,
                        }),
                        Err(error) if error.is_auth_error() => {
                            tracing::info!("Persisted credential rejected, discarding");
                            let _ = credentials.clear().await;
                            Some(SessionAction::RestoreFailed { epoch })
                        },
                        Err(error) => {
                            // Could not reach the platform; keep the record
                            // for the next start and land anonymous.
                            tracing::warn!(%error, "Could not validate persisted session");
                            Some(SessionAction::RestoreFailed { epoch })
                        },
                    }
                })]
            },

            SessionAction::RestoreSucceeded { epoch, identity } => {
                if epoch != state.epoch {
                    tracing::debug!(epoch, current = state.epoch, "Discarding stale restore");
                    return smallvec![];
                }

                env.slot.set(Some(identity.credential.clone()));
                state.identity = Some(identity);
                state.phase = SessionPhase::Idle;
                smallvec![]
            },

            SessionAction::RestoreFailed { epoch } => {
                if epoch != state.epoch {
                    return smallvec![];
                }

                state.phase = SessionPhase::Idle;
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{Credential, UserId};

    fn identity(role: Role) -> Identity {
        Identity {
            user_id: UserId::new(),
            username: "ada".to_string(),
            role,
            credential: Credential::new("token-1".to_string()),
            email: Some("ada@example.com".to_string()),
            first_name: None,
            last_name: None,
        }
    }

    #[test]
    fn test_has_role_matrix() {
        let mut state = SessionState::default();
        assert!(!state.has_role(&[]));
        assert!(!state.has_role(&[Role::Admin]));

        state.install_identity_for_tests(identity(Role::User));
        assert!(state.has_role(&[]));
        assert!(state.has_role(&[Role::User]));
        assert!(!state.has_role(&[Role::Admin]));
        assert!(state.has_role(&[Role::User, Role::Admin]));
    }

    #[test]
    fn test_anonymous_default() {
        let state = SessionState::default();
        assert!(!state.is_authenticated());
        assert!(state.current_identity().is_none());
        assert_eq!(state.phase(), SessionPhase::Idle);
        assert_eq!(state.epoch(), 0);
    }
}
