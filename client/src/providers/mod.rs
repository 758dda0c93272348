//! External dependency traits.
//!
//! Reducers never perform I/O; every network call and every touch of
//! durable storage goes through these traits so the state machines can be
//! tested against scripted implementations.

pub mod file;
pub mod http;

use std::future::Future;

use crate::error::ClientError;
use crate::state::{
    Credential, DashboardStats, EventFilter, EventId, EventSummary, Identity, NewEvent, Profile,
    Registration, StoredSession, Ticket,
};

/// Platform REST API.
///
/// Authenticated calls attach the bearer credential internally (from the
/// shared [`crate::environment::CredentialSlot`]); a 401 on any of them
/// surfaces as [`ClientError::SessionExpired`], which the integration layer
/// turns into a forced logout.
pub trait Api: Clone + Send + Sync + 'static {
    /// Exchange a username/password pair for an authenticated identity.
    ///
    /// # Errors
    ///
    /// `InvalidCredentials` on rejection, `Network`/`Server` on transport
    /// or backend failure.
    fn login(
        &self,
        username: &str,
        password: &str,
    ) -> impl Future<Output = Result<Identity, ClientError>> + Send;

    /// Create a new account with the user role. Returns no credential;
    /// the caller logs in afterwards.
    ///
    /// # Errors
    ///
    /// `Rejected` when the username or email is already taken,
    /// `Network`/`Server` on transport or backend failure.
    fn register(
        &self,
        form: &Registration,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Best-effort server-side session invalidation.
    ///
    /// # Errors
    ///
    /// Transport failures only; callers ignore them.
    fn logout(&self) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// List events, optionally filtered by category or search text.
    ///
    /// # Errors
    ///
    /// `Network`/`Server` on failure.
    fn list_events(
        &self,
        filter: &EventFilter,
    ) -> impl Future<Output = Result<Vec<EventSummary>, ClientError>> + Send;

    /// Fetch a single event by id.
    ///
    /// # Errors
    ///
    /// `NotFound` for unknown or deleted ids.
    fn fetch_event(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<EventSummary, ClientError>> + Send;

    /// Book `quantity` tickets for an event. Authenticated.
    ///
    /// # Errors
    ///
    /// `Rejected` when the server refuses the booking (insufficient
    /// availability included), `SessionExpired` on 401.
    fn book_tickets(
        &self,
        event_id: EventId,
        quantity: u32,
    ) -> impl Future<Output = Result<Ticket, ClientError>> + Send;

    /// List the caller's tickets. Authenticated.
    ///
    /// # Errors
    ///
    /// `SessionExpired` on 401, `Network`/`Server` otherwise.
    fn my_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>, ClientError>> + Send;

    /// Fetch the caller's profile. Authenticated.
    ///
    /// # Errors
    ///
    /// `SessionExpired` on 401.
    fn profile(&self) -> impl Future<Output = Result<Profile, ClientError>> + Send;

    /// Check that a credential is still accepted by the platform. Used to
    /// validate a rehydrated session before installing it; takes the
    /// credential explicitly because no session exists yet.
    ///
    /// # Errors
    ///
    /// `SessionExpired` when the credential is rejected, `Network`/`Server`
    /// when the check could not be performed.
    fn validate_credential(
        &self,
        credential: &Credential,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Save profile edits. Authenticated.
    ///
    /// # Errors
    ///
    /// `SessionExpired` on 401, `Rejected` on server-side validation.
    fn update_profile(
        &self,
        profile: &Profile,
    ) -> impl Future<Output = Result<Profile, ClientError>> + Send;

    /// Create an event. Any authenticated user.
    ///
    /// # Errors
    ///
    /// `SessionExpired` on 401, `Rejected` on server-side validation.
    fn create_event(
        &self,
        form: &NewEvent,
    ) -> impl Future<Output = Result<EventSummary, ClientError>> + Send;

    /// Delete an event. Admin.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-admin credentials, `NotFound` for unknown ids.
    fn delete_event(&self, id: EventId) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Fetch the admin dashboard counters. Admin.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-admin credentials.
    fn dashboard_stats(&self) -> impl Future<Output = Result<DashboardStats, ClientError>> + Send;

    /// Fetch the most recent bookings across all users. Admin.
    ///
    /// # Errors
    ///
    /// `Forbidden` for non-admin credentials.
    fn recent_tickets(&self) -> impl Future<Output = Result<Vec<Ticket>, ClientError>> + Send;
}

/// Durable client-local session persistence.
///
/// One serialized record under a single well-known key, overwritten
/// wholesale on every save.
pub trait CredentialStore: Clone + Send + Sync + 'static {
    /// Load the persisted session record, if any.
    ///
    /// # Errors
    ///
    /// `Storage` when the record exists but cannot be read or parsed.
    fn load(&self) -> impl Future<Output = Result<Option<StoredSession>, ClientError>> + Send;

    /// Persist a session record, replacing any previous one.
    ///
    /// # Errors
    ///
    /// `Storage` on write failure.
    fn save(
        &self,
        session: &StoredSession,
    ) -> impl Future<Output = Result<(), ClientError>> + Send;

    /// Remove the persisted record. Succeeds when none exists.
    ///
    /// # Errors
    ///
    /// `Storage` on removal failure.
    fn clear(&self) -> impl Future<Output = Result<(), ClientError>> + Send;
}
