//! Scriptable provider implementations for tests and demos.
//!
//! `MockApi` holds an in-memory platform: registered accounts, events and
//! tickets. Tests script failures with `fail_once`/`fail_all` and inspect
//! the recorded call log, e.g. to prove a double submit produced exactly
//! one booking request.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use ticketline_core::environment::Clock;

use crate::error::ClientError;
use crate::providers::{Api, CredentialStore};
use crate::state::{
    Credential, DashboardStats, EventFilter, EventId, EventStatus, EventSummary, Identity,
    NewEvent, Profile, Registration, Role, StoredSession, Ticket, TicketId, TicketStatus, UserId,
};

#[derive(Debug)]
struct Account {
    username: String,
    password: String,
    identity: Identity,
}

#[derive(Debug, Default)]
struct MockApiInner {
    accounts: Vec<Account>,
    events: Vec<EventSummary>,
    tickets: Vec<Ticket>,
    profile: Profile,
    stats: DashboardStats,
    fail_all: Option<ClientError>,
    fail_once: Option<ClientError>,
    calls: Vec<&'static str>,
}

/// In-memory [`Api`] implementation.
#[derive(Debug, Clone, Default)]
pub struct MockApi {
    inner: Arc<Mutex<MockApiInner>>,
}

impl MockApi {
    /// Create an empty mock platform.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, MockApiInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register an account that `login` accepts.
    pub fn register_account(&self, username: &str, password: &str, identity: Identity) {
        self.lock().accounts.push(Account {
            username: username.to_string(),
            password: password.to_string(),
            identity,
        });
    }

    /// Seed an event.
    pub fn add_event(&self, event: EventSummary) {
        self.lock().events.push(event);
    }

    /// Seed the profile returned by `profile()`.
    pub fn set_profile(&self, profile: Profile) {
        self.lock().profile = profile;
    }

    /// Seed the dashboard counters.
    pub fn set_stats(&self, stats: DashboardStats) {
        self.lock().stats = stats;
    }

    /// Fail every subsequent call with `error`.
    pub fn fail_all(&self, error: ClientError) {
        self.lock().fail_all = Some(error);
    }

    /// Fail only the next call with `error`.
    pub fn fail_once(&self, error: ClientError) {
        self.lock().fail_once = Some(error);
    }

    /// Stop injecting failures.
    pub fn heal(&self) {
        let mut inner = self.lock();
        inner.fail_all = None;
        inner.fail_once = None;
    }

    /// All recorded calls, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<&'static str> {
        self.lock().calls.clone()
    }

    /// How many times a method was called.
    #[must_use]
    pub fn call_count(&self, name: &str) -> usize {
        self.lock().calls.iter().filter(|c| **c == name).count()
    }

    /// Current availability of a seeded event.
    #[must_use]
    pub fn availability(&self, id: EventId) -> Option<u32> {
        self.lock()
            .events
            .iter()
            .find(|e| e.id == id)
            .map(|e| e.tickets_available)
    }

    /// Record a call and apply scripted failures.
    fn enter(&self, name: &'static str) -> Result<MutexGuard<'_, MockApiInner>, ClientError> {
        let mut inner = self.lock();
        inner.calls.push(name);

        if let Some(error) = inner.fail_once.take() {
            return Err(error);
        }
        if let Some(error) = &inner.fail_all {
            return Err(error.clone());
        }
        Ok(inner)
    }
}

impl Api for MockApi {
    async fn login(&self, username: &str, password: &str) -> Result<Identity, ClientError> {
        let inner = self.enter("login")?;
        inner
            .accounts
            .iter()
            .find(|a| a.username == username && a.password == password)
            .map(|a| a.identity.clone())
            .ok_or(ClientError::InvalidCredentials)
    }

    async fn register(&self, form: &Registration) -> Result<(), ClientError> {
        let mut inner = self.enter("register")?;

        if inner.accounts.iter().any(|a| a.username == form.username) {
            return Err(ClientError::Rejected {
                message: "Username is already taken".to_string(),
            });
        }
        if inner
            .accounts
            .iter()
            .any(|a| a.identity.email.as_deref() == Some(form.email.as_str()))
        {
            return Err(ClientError::Rejected {
                message: "Email is already registered".to_string(),
            });
        }

        let identity = Identity {
            user_id: UserId::new(),
            username: form.username.clone(),
            role: Role::User,
            credential: Credential::new(format!("{}-token", form.username)),
            email: Some(form.email.clone()),
            first_name: form.first_name.clone(),
            last_name: form.last_name.clone(),
        };
        inner.accounts.push(Account {
            username: form.username.clone(),
            password: form.password.clone(),
            identity,
        });
        Ok(())
    }

    async fn logout(&self) -> Result<(), ClientError> {
        drop(self.enter("logout")?);
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, ClientError> {
        let inner = self.enter("list_events")?;
        let events = inner
            .events
            .iter()
            .filter(|event| {
                filter.category.is_none_or(|c| event.category == c)
                    && filter.search.as_ref().is_none_or(|needle| {
                        let needle = needle.to_lowercase();
                        event.title.to_lowercase().contains(&needle)
                            || event.description.to_lowercase().contains(&needle)
                    })
            })
            .cloned()
            .collect();
        Ok(events)
    }

    async fn fetch_event(&self, id: EventId) -> Result<EventSummary, ClientError> {
        let inner = self.enter("fetch_event")?;
        inner
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ClientError::NotFound)
    }

    async fn book_tickets(&self, event_id: EventId, quantity: u32) -> Result<Ticket, ClientError> {
        let mut inner = self.enter("book_tickets")?;

        let user_id = inner
            .accounts
            .first()
            .map_or_else(UserId::new, |a| a.identity.user_id);

        let Some(event) = inner.events.iter_mut().find(|e| e.id == event_id) else {
            return Err(ClientError::NotFound);
        };

        if event.tickets_available < quantity {
            return Err(ClientError::Rejected {
                message: "Not enough tickets available".to_string(),
            });
        }

        event.tickets_available -= quantity;
        let total_amount =
            event
                .price
                .checked_multiply(quantity)
                .ok_or_else(|| ClientError::Rejected {
                    message: "Total overflow".to_string(),
                })?;

        let ticket = Ticket {
            id: TicketId::new(),
            user_id,
            event_id,
            quantity,
            total_amount,
            status: TicketStatus::Confirmed,
            booked_at: Utc::now(),
        };
        inner.tickets.push(ticket.clone());
        Ok(ticket)
    }

    async fn my_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let inner = self.enter("my_tickets")?;
        Ok(inner.tickets.clone())
    }

    async fn profile(&self) -> Result<Profile, ClientError> {
        let inner = self.enter("profile")?;
        Ok(inner.profile.clone())
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<(), ClientError> {
        let inner = self.enter("validate_credential")?;
        if inner
            .accounts
            .iter()
            .any(|a| a.identity.credential == *credential)
        {
            Ok(())
        } else {
            Err(ClientError::SessionExpired)
        }
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, ClientError> {
        let mut inner = self.enter("update_profile")?;
        inner.profile = profile.clone();
        Ok(profile.clone())
    }

    async fn create_event(&self, form: &NewEvent) -> Result<EventSummary, ClientError> {
        let mut inner = self.enter("create_event")?;
        let event = EventSummary {
            id: EventId::new(),
            title: form.title.clone(),
            description: form.description.clone(),
            category: form.category,
            venue: form.venue.clone(),
            starts_at: form.starts_at,
            price: form.price,
            capacity: form.capacity,
            tickets_available: form.capacity,
            status: EventStatus::Active,
            image_url: form.image_url.clone(),
        };
        inner.events.push(event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ClientError> {
        let mut inner = self.enter("delete_event")?;
        let before = inner.events.len();
        inner.events.retain(|e| e.id != id);
        if inner.events.len() == before {
            return Err(ClientError::NotFound);
        }
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        let inner = self.enter("dashboard_stats")?;
        Ok(inner.stats)
    }

    async fn recent_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let inner = self.enter("recent_tickets")?;
        Ok(inner.tickets.clone())
    }
}

/// In-memory [`CredentialStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryCredentialStore {
    record: Arc<Mutex<Option<StoredSession>>>,
    fail: Arc<Mutex<Option<ClientError>>>,
}

impl MemoryCredentialStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the persisted record (for restore tests).
    pub fn seed(&self, session: StoredSession) {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Fail every subsequent operation with `error`.
    pub fn fail_with(&self, error: ClientError) {
        *self.fail.lock().unwrap_or_else(PoisonError::into_inner) = Some(error);
    }

    /// Inspect the persisted record.
    #[must_use]
    pub fn snapshot(&self) -> Option<StoredSession> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn check_failure(&self) -> Result<(), ClientError> {
        match &*self.fail.lock().unwrap_or_else(PoisonError::into_inner) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    async fn load(&self) -> Result<Option<StoredSession>, ClientError> {
        self.check_failure()?;
        Ok(self.snapshot())
    }

    async fn save(&self, session: &StoredSession) -> Result<(), ClientError> {
        self.check_failure()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(session.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), ClientError> {
        self.check_failure()?;
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

/// Deterministic [`Clock`] for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    /// A clock frozen at `now`.
    #[must_use]
    pub const fn at(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Default for FixedClock {
    fn default() -> Self {
        // Deterministic reference instant.
        Self {
            now: DateTime::UNIX_EPOCH,
        }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}
