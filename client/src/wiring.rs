//! Cross-store wiring.
//!
//! Each feature runs in its own store; the one coupling between them is
//! the forced-logout contract: any authenticated completion that surfaced
//! `SessionExpired` in the booking or catalog store must reach the session
//! store exactly once as a `SessionAction::SessionExpired`. The session
//! reducer is idempotent on it, so concurrent 401s are safe.

use ticketline_core::environment::Clock;
use ticketline_runtime::Store;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::actions::{BookingAction, CatalogAction, SessionAction};
use crate::environment::ClientEnvironment;
use crate::providers::{Api, CredentialStore};
use crate::reducers::{
    BookingReducer, BookingState, CatalogReducer, CatalogState, SessionReducer, SessionState,
};

/// Store running the session gate.
pub type SessionStore<A, C, K> =
    Store<SessionState, SessionAction, ClientEnvironment<A, C, K>, SessionReducer<A, C, K>>;

/// Store running the booking workflow.
pub type BookingStore<A, C, K> =
    Store<BookingState, BookingAction, ClientEnvironment<A, C, K>, BookingReducer<A, C, K>>;

/// Store running the catalog/admin flows.
pub type CatalogStore<A, C, K> =
    Store<CatalogState, CatalogAction, ClientEnvironment<A, C, K>, CatalogReducer<A, C, K>>;

/// Forward session-expired booking completions into the session store.
///
/// The returned task runs until the booking store's broadcast channel
/// closes.
pub fn forward_booking_expiry<A, C, K>(
    booking: &BookingStore<A, C, K>,
    session: SessionStore<A, C, K>,
) -> JoinHandle<()>
where
    A: Api,
    C: CredentialStore,
    K: Clock + 'static,
{
    let mut actions = booking.subscribe_actions();
    tokio::spawn(async move {
        loop {
            match actions.recv().await {
                Ok(BookingAction::SubmitFailed { error, .. }) if error.is_auth_error() => {
                    let _ = session.send(SessionAction::SessionExpired).await;
                },
                Ok(_) => {},
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Booking observer lagged");
                },
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    })
}

/// Forward session-expired catalog completions into the session store.
///
/// The returned task runs until the catalog store's broadcast channel
/// closes.
pub fn forward_catalog_expiry<A, C, K>(
    catalog: &CatalogStore<A, C, K>,
    session: SessionStore<A, C, K>,
) -> JoinHandle<()>
where
    A: Api,
    C: CredentialStore,
    K: Clock + 'static,
{
    let mut actions = catalog.subscribe_actions();
    tokio::spawn(async move {
        loop {
            let expired = match actions.recv().await {
                Ok(
                    CatalogAction::LoadFailed { error, .. }
                    | CatalogAction::CreateFailed { error }
                    | CatalogAction::DeleteFailed { error, .. },
                ) => error.is_auth_error(),
                Ok(_) => false,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Catalog observer lagged");
                    false
                },
                Err(broadcast::error::RecvError::Closed) => break,
            };

            if expired {
                let _ = session.send(SessionAction::SessionExpired).await;
            }
        }
    })
}
