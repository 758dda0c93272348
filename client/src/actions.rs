//! Actions processed by the client reducers.
//!
//! Each feature store has one action enum mixing user commands with effect
//! completion events. Completion events for identity- or booking-changing
//! operations carry the epoch or generation they were issued under; the
//! reducers discard completions whose marker no longer matches.

use crate::error::ClientError;
use crate::state::{
    DashboardStats, EventFilter, EventId, EventSummary, Identity, NewEvent, Profile, Registration,
    Ticket,
};

// ═══════════════════════════════════════════════════════════════════════
// Session gate
// ═══════════════════════════════════════════════════════════════════════

/// Actions for the session/authorization gate.
#[derive(Debug, Clone)]
pub enum SessionAction {
    /// Submit a username/password pair. Allowed from any phase; a re-login
    /// while authenticated replaces the identity atomically on success.
    Login {
        /// Login name.
        username: String,
        /// Plain-text password, consumed by the login effect.
        password: String,
    },

    /// Login effect completed successfully.
    LoginSucceeded {
        /// Epoch the login was issued under.
        epoch: u64,
        /// The authenticated identity.
        identity: Identity,
    },

    /// Login effect failed.
    LoginFailed {
        /// Epoch the login was issued under.
        epoch: u64,
        /// What went wrong.
        error: ClientError,
    },

    /// Submit a new-account form. The created account always has the user
    /// role; the caller stays anonymous and logs in afterwards.
    Register {
        /// The registration form.
        form: Registration,
    },

    /// Registration effect completed; the account exists.
    RegisterSucceeded {
        /// Epoch the registration was issued under.
        epoch: u64,
    },

    /// Registration effect failed, e.g. the username is already taken.
    RegisterFailed {
        /// Epoch the registration was issued under.
        epoch: u64,
        /// What went wrong.
        error: ClientError,
    },

    /// Explicit logout. Clears the identity synchronously; server-side
    /// invalidation is fire-and-forget.
    Logout,

    /// An authenticated call observed a 401. Forced logout; idempotent.
    SessionExpired,

    /// Rehydrate a persisted session at process start.
    Restore,

    /// Restore effect found and validated a persisted identity.
    RestoreSucceeded {
        /// Epoch the restore was issued under.
        epoch: u64,
        /// The rehydrated identity.
        identity: Identity,
    },

    /// Restore effect found nothing usable; the client starts anonymous.
    RestoreFailed {
        /// Epoch the restore was issued under.
        epoch: u64,
    },
}

// ═══════════════════════════════════════════════════════════════════════
// Booking workflow
// ═══════════════════════════════════════════════════════════════════════

/// Actions for the booking workflow dialog.
#[derive(Debug, Clone)]
pub enum BookingAction {
    /// Open the booking dialog for an event. No-op when the event is not
    /// bookable or the caller is anonymous.
    Open {
        /// The event to book.
        event: EventSummary,
    },

    /// Change the selected quantity. Clamped into `[1, tickets_available]`.
    SetQuantity(u32),

    /// Submit the booking. Rejected while a submit is already in flight.
    Submit,

    /// Booking request succeeded.
    SubmitSucceeded {
        /// Generation the submit was issued under.
        generation: u64,
        /// The booked ticket.
        ticket: Ticket,
    },

    /// Booking request failed.
    SubmitFailed {
        /// Generation the submit was issued under.
        generation: u64,
        /// What went wrong.
        error: ClientError,
    },

    /// Fresh availability snapshot fetched after a confirmed booking.
    AvailabilityRefreshed {
        /// Generation the refresh was issued under.
        generation: u64,
        /// Updated event snapshot.
        event: EventSummary,
    },

    /// Return from a failed submit to quantity selection.
    Retry,

    /// Dismiss the dialog. In-flight requests are not cancelled; their
    /// completions are discarded by the generation guard.
    Close,
}

// ═══════════════════════════════════════════════════════════════════════
// Catalog and admin
// ═══════════════════════════════════════════════════════════════════════

/// Actions for the catalog, profile and admin flows.
#[derive(Debug, Clone)]
pub enum CatalogAction {
    /// Load the public event list.
    LoadEvents {
        /// Optional category/text filter.
        filter: EventFilter,
    },

    /// Event list arrived.
    EventsLoaded {
        /// The fetched events.
        events: Vec<EventSummary>,
    },

    /// Load the caller's tickets.
    LoadMyTickets,

    /// Ticket list arrived.
    MyTicketsLoaded {
        /// The caller's tickets.
        tickets: Vec<Ticket>,
    },

    /// Load the caller's profile.
    LoadProfile,

    /// Profile arrived.
    ProfileLoaded {
        /// The fetched profile.
        profile: Profile,
    },

    /// Save profile edits.
    UpdateProfile {
        /// The edited profile.
        profile: Profile,
    },

    /// Profile save confirmed; carries the server's canonical copy.
    ProfileUpdated {
        /// The saved profile.
        profile: Profile,
    },

    /// Create a new event. Validated client-side before any network call.
    CreateEvent {
        /// The create-event form.
        form: NewEvent,
    },

    /// Event creation confirmed.
    EventCreated {
        /// The created event as the server returned it.
        event: EventSummary,
    },

    /// Event creation failed, including client-side validation rejection.
    CreateFailed {
        /// What went wrong.
        error: ClientError,
    },

    /// Load the admin dashboard.
    LoadDashboard,

    /// Dashboard data arrived.
    DashboardLoaded {
        /// Aggregated counters.
        stats: DashboardStats,
        /// Most recent bookings.
        recent_tickets: Vec<Ticket>,
    },

    /// Delete an event (admin). Applied optimistically to the local list.
    DeleteEvent {
        /// The event to delete.
        event_id: EventId,
    },

    /// Server confirmed the deletion.
    DeleteSucceeded {
        /// The deleted event.
        event_id: EventId,
    },

    /// Server rejected the deletion; the optimistic removal is reverted.
    DeleteFailed {
        /// The event whose removal is reverted.
        event_id: EventId,
        /// What went wrong.
        error: ClientError,
    },

    /// A read operation failed.
    LoadFailed {
        /// Which load the failure belongs to.
        kind: LoadKind,
        /// What went wrong.
        error: ClientError,
    },
}

/// Which catalog load a [`CatalogAction::LoadFailed`] belongs to, so only
/// that operation's in-flight flag is cleared.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadKind {
    /// The public event list.
    Events,
    /// The caller's tickets.
    Tickets,
    /// The caller's profile (load or save).
    Profile,
    /// The admin dashboard.
    Dashboard,
}
