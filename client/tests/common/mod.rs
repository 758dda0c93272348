//! Shared fixtures for the integration tests.

#![allow(dead_code)] // Not every test file uses every fixture

use chrono::{Duration, Utc};
use ticketline_client::environment::ClientEnvironment;
use ticketline_client::mocks::{FixedClock, MemoryCredentialStore, MockApi};
use ticketline_client::reducers::{BookingReducer, CatalogReducer, SessionReducer};
use ticketline_client::state::{
    Credential, EventCategory, EventId, EventStatus, EventSummary, Identity, Money, Role, UserId,
};
use ticketline_client::wiring::{BookingStore, CatalogStore, SessionStore};
use ticketline_client::{BookingState, CatalogState, SessionState};
use ticketline_runtime::Store;

pub type TestEnv = ClientEnvironment<MockApi, MemoryCredentialStore, FixedClock>;

pub fn test_env() -> (MockApi, MemoryCredentialStore, TestEnv) {
    let api = MockApi::new();
    let credentials = MemoryCredentialStore::new();
    let env = ClientEnvironment::new(api.clone(), credentials.clone(), FixedClock::default());
    (api, credentials, env)
}

pub fn user_identity() -> Identity {
    Identity {
        user_id: UserId::new(),
        username: "ada".to_string(),
        role: Role::User,
        credential: Credential::new("user-token".to_string()),
        email: Some("ada@example.com".to_string()),
        first_name: Some("Ada".to_string()),
        last_name: Some("Lovelace".to_string()),
    }
}

pub fn admin_identity() -> Identity {
    Identity {
        user_id: UserId::new(),
        username: "grace".to_string(),
        role: Role::Admin,
        credential: Credential::new("admin-token".to_string()),
        email: None,
        first_name: None,
        last_name: None,
    }
}

pub fn event_with_availability(price_cents: u64, capacity: u32, available: u32) -> EventSummary {
    EventSummary {
        id: EventId::new(),
        title: "RustConf".to_string(),
        description: "Annual Rust conference".to_string(),
        category: EventCategory::Conference,
        venue: "Portland".to_string(),
        starts_at: Utc::now() + Duration::days(30),
        price: Money::from_cents(price_cents),
        capacity,
        tickets_available: available,
        status: EventStatus::Active,
        image_url: None,
    }
}

pub const WAIT: std::time::Duration = std::time::Duration::from_secs(2);

/// Install a test subscriber once; `RUST_LOG` controls verbosity.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Poll `check` for about a second, yielding to the runtime between polls.
pub async fn eventually<F: Fn() -> bool>(check: F) -> bool {
    for _ in 0..100 {
        if check() {
            return true;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    check()
}

/// Wait until a state snapshot satisfies `pred` and return it.
///
/// Actions are broadcast before their reduce completes, so assertions on
/// store state go through the watch channel instead of racing it.
pub async fn await_state<S, F>(rx: &mut tokio::sync::watch::Receiver<S>, pred: F) -> S
where
    S: Clone,
    F: FnMut(&S) -> bool,
{
    let snapshot = tokio::time::timeout(WAIT, rx.wait_for(pred))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed");
    snapshot.clone()
}

pub fn session_store(env: TestEnv) -> SessionStore<MockApi, MemoryCredentialStore, FixedClock> {
    Store::new(SessionState::default(), SessionReducer::new(), env)
}

pub fn booking_store(env: TestEnv) -> BookingStore<MockApi, MemoryCredentialStore, FixedClock> {
    Store::new(BookingState::default(), BookingReducer::new(), env)
}

pub fn catalog_store(env: TestEnv) -> CatalogStore<MockApi, MemoryCredentialStore, FixedClock> {
    Store::new(CatalogState::default(), CatalogReducer::new(), env)
}
