//! Catalog, profile and admin flows.
//!
//! Read-mostly state around the event list, the caller's tickets and
//! profile, and the admin dashboard. The one mutation with client-visible
//! latency, event deletion, is applied optimistically: the event leaves
//! the local list immediately and the removal is reverted if the server
//! refuses.

use std::marker::PhantomData;

use ticketline_core::effect::{Effect, Effects};
use ticketline_core::environment::Clock;
use ticketline_core::reducer::Reducer;
use ticketline_core::smallvec;

use crate::actions::{CatalogAction, LoadKind};
use crate::environment::ClientEnvironment;
use crate::error::ClientError;
use crate::providers::{Api, CredentialStore};
use crate::state::{
    DashboardStats, EventFilter, EventId, EventSummary, Profile, Ticket,
};
use crate::validation::validate_new_event;

/// Which read/write operations are currently in flight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadingFlags {
    /// Event list fetch in flight.
    pub events: bool,
    /// My-tickets fetch in flight.
    pub tickets: bool,
    /// Profile fetch or save in flight.
    pub profile: bool,
    /// Dashboard fetch in flight.
    pub dashboard: bool,
    /// Event creation in flight.
    pub creating: bool,
}

/// An optimistic removal awaiting server confirmation.
#[derive(Debug, Clone)]
struct PendingDelete {
    event: EventSummary,
    index: usize,
}

/// Admin dashboard data.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Aggregated counters.
    pub stats: DashboardStats,
    /// Most recent bookings across all users.
    pub recent_tickets: Vec<Ticket>,
}

/// State of the catalog, profile and admin flows.
#[derive(Debug, Clone, Default)]
pub struct CatalogState {
    events: Vec<EventSummary>,
    filter: EventFilter,
    tickets: Vec<Ticket>,
    profile: Option<Profile>,
    dashboard: Option<DashboardView>,
    loading: LoadingFlags,
    pending_deletes: Vec<PendingDelete>,
    last_error: Option<ClientError>,
}

impl CatalogState {
    /// The loaded event list (optimistic removals already applied).
    #[must_use]
    pub fn events(&self) -> &[EventSummary] {
        &self.events
    }

    /// The filter the current list was loaded with.
    #[must_use]
    pub const fn filter(&self) -> &EventFilter {
        &self.filter
    }

    /// The caller's tickets.
    #[must_use]
    pub fn tickets(&self) -> &[Ticket] {
        &self.tickets
    }

    /// The caller's profile, once loaded.
    #[must_use]
    pub const fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// The admin dashboard, once loaded.
    #[must_use]
    pub const fn dashboard(&self) -> Option<&DashboardView> {
        self.dashboard.as_ref()
    }

    /// In-flight operation flags.
    #[must_use]
    pub const fn loading(&self) -> LoadingFlags {
        self.loading
    }

    /// The most recent failure.
    #[must_use]
    pub const fn last_error(&self) -> Option<&ClientError> {
        self.last_error.as_ref()
    }

    /// Look up a loaded event by id.
    #[must_use]
    pub fn event(&self, id: EventId) -> Option<&EventSummary> {
        self.events.iter().find(|event| event.id == id)
    }
}

/// Reducer for the catalog, profile and admin flows.
pub struct CatalogReducer<A, C, K> {
    _marker: PhantomData<fn() -> (A, C, K)>,
}

impl<A, C, K> CatalogReducer<A, C, K> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A, C, K> Default for CatalogReducer<A, C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C, K> Reducer for CatalogReducer<A, C, K>
where
    A: Api,
    C: CredentialStore,
    K: Clock,
{
    type State = CatalogState;
    type Action = CatalogAction;
    type Environment = ClientEnvironment<A, C, K>;

    #[allow(clippy::too_many_lines)]
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            CatalogAction::LoadEvents { filter } => {
                state.loading.events = true;
                state.filter = filter.clone();
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    match api.list_events(&filter).await {
                        Ok(events) => Some(CatalogAction::EventsLoaded { events }),
                        Err(error) => Some(CatalogAction::LoadFailed {
                            kind: LoadKind::Events,
                            error,
                        }),
                    }
                })]
            },

            CatalogAction::EventsLoaded { events } => {
                state.loading.events = false;
                state.events = events;
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::LoadMyTickets => {
                state.loading.tickets = true;
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    match api.my_tickets().await {
                        Ok(tickets) => Some(CatalogAction::MyTicketsLoaded { tickets }),
                        Err(error) => Some(CatalogAction::LoadFailed {
                            kind: LoadKind::Tickets,
                            error,
                        }),
                    }
                })]
            },

            CatalogAction::MyTicketsLoaded { tickets } => {
                state.loading.tickets = false;
                state.tickets = tickets;
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::LoadProfile => {
                state.loading.profile = true;
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    match api.profile().await {
                        Ok(profile) => Some(CatalogAction::ProfileLoaded { profile }),
                        Err(error) => Some(CatalogAction::LoadFailed {
                            kind: LoadKind::Profile,
                            error,
                        }),
                    }
                })]
            },

            CatalogAction::ProfileLoaded { profile } => {
                state.loading.profile = false;
                state.profile = Some(profile);
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::UpdateProfile { profile } => {
                state.loading.profile = true;
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    match api.update_profile(&profile).await {
                        Ok(profile) => Some(CatalogAction::ProfileUpdated { profile }),
                        Err(error) => Some(CatalogAction::LoadFailed {
                            kind: LoadKind::Profile,
                            error,
                        }),
                    }
                })]
            },

            CatalogAction::ProfileUpdated { profile } => {
                state.loading.profile = false;
                state.profile = Some(profile);
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::CreateEvent { form } => {
                // Validation failures never reach the network.
                if let Err(error) = validate_new_event(&form, env.clock.now()) {
                    state.last_error = Some(error);
                    return smallvec![];
                }

                state.loading.creating = true;
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    match api.create_event(&form).await {
                        Ok(event) => Some(CatalogAction::EventCreated { event }),
                        Err(error) => Some(CatalogAction::CreateFailed { error }),
                    }
                })]
            },

            CatalogAction::EventCreated { event } => {
                state.loading.creating = false;
                state.events.push(event);
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::CreateFailed { error } => {
                state.loading.creating = false;
                state.last_error = Some(error);
                smallvec![]
            },

            CatalogAction::LoadDashboard => {
                state.loading.dashboard = true;
                let api = env.api.clone();

                smallvec![Effect::future(async move {
                    let stats = match api.dashboard_stats().await {
                        Ok(stats) => stats,
                        Err(error) => {
                            return Some(CatalogAction::LoadFailed {
                                kind: LoadKind::Dashboard,
                                error,
                            });
                        },
                    };
                    match api.recent_tickets().await {
                        Ok(recent_tickets) => Some(CatalogAction::DashboardLoaded {
                            stats,
                            recent_tickets,
                        }),
                        Err(error) => Some(CatalogAction::LoadFailed {
                            kind: LoadKind::Dashboard,
                            error,
                        }),
                    }
                })]
            },

            CatalogAction::DashboardLoaded {
                stats,
                recent_tickets,
            } => {
                state.loading.dashboard = false;
                state.dashboard = Some(DashboardView {
                    stats,
                    recent_tickets,
                });
                state.last_error = None;
                smallvec![]
            },

            CatalogAction::DeleteEvent { event_id } => {
                let Some(index) = state.events.iter().position(|e| e.id == event_id) else {
                    return smallvec![];
                };

                // Optimistic removal; reverted on DeleteFailed.
                let event = state.events.remove(index);
                state.pending_deletes.push(PendingDelete { event, index });

                let api = env.api.clone();
                tracing::debug!(%event_id, "Deleting event");

                smallvec![Effect::future(async move {
                    match api.delete_event(event_id).await {
                        Ok(()) => Some(CatalogAction::DeleteSucceeded { event_id }),
                        Err(error) => Some(CatalogAction::DeleteFailed { event_id, error }),
                    }
                })]
            },

            CatalogAction::DeleteSucceeded { event_id } => {
                state
                    .pending_deletes
                    .retain(|pending| pending.event.id != event_id);
                smallvec![]
            },

            CatalogAction::DeleteFailed { event_id, error } => {
                if let Some(position) = state
                    .pending_deletes
                    .iter()
                    .position(|pending| pending.event.id == event_id)
                {
                    let pending = state.pending_deletes.remove(position);
                    let index = pending.index.min(state.events.len());
                    state.events.insert(index, pending.event);
                }

                tracing::info!(%event_id, %error, "Event deletion reverted");
                state.last_error = Some(error);
                smallvec![]
            },

            CatalogAction::LoadFailed { kind, error } => {
                // Unrelated in-flight loads keep their flags.
                match kind {
                    LoadKind::Events => state.loading.events = false,
                    LoadKind::Tickets => state.loading.tickets = false,
                    LoadKind::Profile => state.loading.profile = false,
                    LoadKind::Dashboard => state.loading.dashboard = false,
                }
                state.last_error = Some(error);
                smallvec![]
            },
        }
    }
}
