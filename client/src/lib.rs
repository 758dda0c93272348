//! # Ticketline Client
//!
//! Client core for the Ticketline event-registration platform: the
//! session/authorization gate, the booking workflow, the route guard and
//! the catalog/admin flows, expressed as pure reducers over provider
//! traits.
//!
//! ## Architecture
//!
//! - **Session gate** ([`reducers::session`]): owns the one authoritative
//!   `Option<Identity>` slot; login, logout, rehydration and 401-forced
//!   logout all flow through it, protected by an epoch stale-response
//!   guard.
//! - **Route guard** ([`guard`]): pure navigation policy over session
//!   state and per-route requirements.
//! - **Booking workflow** ([`reducers::booking`]): dialog-scoped
//!   `Selecting → Submitting → Confirmed | Failed` machine with a
//!   generation guard against stale completions.
//! - **Catalog/admin** ([`reducers::catalog`]): event list, tickets,
//!   profile, dashboard, optimistic event deletion.
//! - **Providers** ([`providers`]): `Api` (REST) and `CredentialStore`
//!   (durable session record) traits; `reqwest` and file-backed
//!   implementations; scriptable mocks in [`mocks`].
//!
//! Rendering is out of scope: UI layers subscribe to store state watches
//! and dispatch actions; nothing here draws anything.

pub mod actions;
pub mod config;
pub mod environment;
pub mod error;
pub mod guard;
pub mod mocks;
pub mod providers;
pub mod reducers;
pub mod state;
pub mod validation;
pub mod wiring;

pub use actions::{BookingAction, CatalogAction, LoadKind, SessionAction};
pub use config::ClientConfig;
pub use environment::{ClientEnvironment, CredentialSlot};
pub use error::ClientError;
pub use guard::{GuardDecision, RouteRequirement, evaluate};
pub use reducers::{
    BookingReducer, BookingSession, BookingStage, BookingState, CatalogReducer, CatalogState,
    SessionPhase, SessionReducer, SessionState,
};
pub use wiring::{BookingStore, CatalogStore, SessionStore};
