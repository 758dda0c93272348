//! Booking workflow.
//!
//! One dialog-scoped state machine: `Selecting → Submitting → Confirmed`
//! or `Failed`, with `Retry` back to `Selecting`. The `generation` counter
//! is bumped on every open and close; completion actions carry the
//! generation of the session they belong to, so a response arriving after
//! the dialog was closed or reopened is discarded.
//!
//! The client never trusts its own availability snapshot: the server is
//! the authority and an availability rejection at submit time is a normal
//! `Failed` transition, not a defect.

use std::marker::PhantomData;

use ticketline_core::effect::{Effect, Effects};
use ticketline_core::environment::Clock;
use ticketline_core::reducer::Reducer;
use ticketline_core::smallvec;

use crate::actions::BookingAction;
use crate::environment::ClientEnvironment;
use crate::error::ClientError;
use crate::providers::{Api, CredentialStore};
use crate::state::{EventSummary, Money, Ticket};

/// Stage of the booking dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStage {
    /// Choosing a quantity.
    Selecting,

    /// Booking request in flight. Exactly one at a time.
    Submitting,

    /// Ticket issued.
    Confirmed,

    /// Submit failed; retryable.
    Failed,
}

/// An open booking dialog.
#[derive(Debug, Clone)]
pub struct BookingSession {
    /// The event being booked. Refreshed after confirmation.
    pub event: EventSummary,

    /// Selected quantity, always in `[1, tickets_available]` at selection
    /// time.
    pub quantity: u32,

    /// Current stage.
    pub stage: BookingStage,

    /// The issued ticket once `Confirmed`.
    pub ticket: Option<Ticket>,

    /// The failure once `Failed`.
    pub error: Option<ClientError>,

    /// Generation this session was opened under.
    pub generation: u64,
}

impl BookingSession {
    /// Derived total: `price × quantity`. Never stored.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.event.price.checked_multiply(self.quantity)
    }
}

/// State of the booking workflow. At most one session at a time.
#[derive(Debug, Clone, Default)]
pub struct BookingState {
    session: Option<BookingSession>,
    generation: u64,
}

impl BookingState {
    /// The open dialog, if any.
    #[must_use]
    pub const fn session(&self) -> Option<&BookingSession> {
        self.session.as_ref()
    }

    /// True when a dialog is open.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// Stage of the open dialog.
    #[must_use]
    pub fn stage(&self) -> Option<BookingStage> {
        self.session.as_ref().map(|s| s.stage)
    }

    /// Selected quantity of the open dialog.
    #[must_use]
    pub fn quantity(&self) -> Option<u32> {
        self.session.as_ref().map(|s| s.quantity)
    }

    /// Derived total of the open dialog.
    #[must_use]
    pub fn total(&self) -> Option<Money> {
        self.session.as_ref().and_then(BookingSession::total)
    }

    fn current_session_mut(&mut self, generation: u64) -> Option<&mut BookingSession> {
        self.session
            .as_mut()
            .filter(|session| session.generation == generation)
    }
}

/// Clamp a requested quantity into the valid selection range.
fn clamp_quantity(requested: u32, available: u32) -> u32 {
    requested.max(1).min(available.max(1))
}

/// Reducer for the booking workflow.
pub struct BookingReducer<A, C, K> {
    _marker: PhantomData<fn() -> (A, C, K)>,
}

impl<A, C, K> BookingReducer<A, C, K> {
    /// Create the reducer.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            _marker: PhantomData,
        }
    }
}

impl<A, C, K> Default for BookingReducer<A, C, K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A, C, K> Reducer for BookingReducer<A, C, K>
where
    A: Api,
    C: CredentialStore,
    K: Clock,
{
    type State = BookingState;
    type Action = BookingAction;
    type Environment = ClientEnvironment<A, C, K>;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> Effects<Self::Action> {
        match action {
            BookingAction::Open { event } => {
                if env.slot.get().is_none() {
                    // Anonymous caller; the route guard owns the redirect.
                    tracing::debug!(event = %event.id, "Ignoring anonymous booking open");
                    return smallvec![];
                }

                if !event.is_bookable() {
                    tracing::debug!(event = %event.id, "Event not bookable, dialog not opened");
                    return smallvec![];
                }

                state.generation += 1;
                state.session = Some(BookingSession {
                    event,
                    quantity: 1,
                    stage: BookingStage::Selecting,
                    ticket: None,
                    error: None,
                    generation: state.generation,
                });
                smallvec![]
            },

            BookingAction::SetQuantity(requested) => {
                if let Some(session) = &mut state.session {
                    if session.stage == BookingStage::Selecting {
                        session.quantity =
                            clamp_quantity(requested, session.event.tickets_available);
                    }
                }
                smallvec![]
            },

            BookingAction::Submit => {
                let Some(session) = &mut state.session else {
                    return smallvec![];
                };

                match session.stage {
                    BookingStage::Selecting => {},
                    BookingStage::Submitting => {
                        tracing::debug!("Submit ignored, booking already in flight");
                        return smallvec![];
                    },
                    BookingStage::Confirmed | BookingStage::Failed => return smallvec![],
                }

                session.stage = BookingStage::Submitting;

                let generation = session.generation;
                let event_id = session.event.id;
                let quantity = session.quantity;
                let api = env.api.clone();
                tracing::debug!(%event_id, quantity, "Submitting booking");

                smallvec![Effect::future(async move {
                    match api.book_tickets(event_id, quantity).await {
                        Ok(ticket) => Some(BookingAction::SubmitSucceeded { generation, ticket }),
                        Err(error) => Some(BookingAction::SubmitFailed { generation, error }),
                    }
                })]
            },

            BookingAction::SubmitSucceeded { generation, ticket } => {
                let Some(session) = state.current_session_mut(generation) else {
                    tracing::debug!(generation, "Discarding stale booking confirmation");
                    return smallvec![];
                };

                session.stage = BookingStage::Confirmed;
                session.ticket = Some(ticket);
                session.error = None;

                let event_id = session.event.id;
                let api = env.api.clone();

                // Refresh the availability snapshot so a sell-out shows
                // immediately. Failure is non-fatal; the next catalog load
                // corrects the count.
                smallvec![Effect::future(async move {
                    match api.fetch_event(event_id).await {
                        Ok(event) => Some(BookingAction::AvailabilityRefreshed { generation, event }),
                        Err(error) => {
                            tracing::debug!(%error, "Availability refresh failed");
                            None
                        },
                    }
                })]
            },

            BookingAction::SubmitFailed { generation, error } => {
                let Some(session) = state.current_session_mut(generation) else {
                    tracing::debug!(generation, "Discarding stale booking failure");
                    return smallvec![];
                };

                tracing::info!(%error, "Booking failed");
                session.stage = BookingStage::Failed;
                session.error = Some(error);
                smallvec![]
            },

            BookingAction::AvailabilityRefreshed { generation, event } => {
                if let Some(session) = state.current_session_mut(generation) {
                    session.event = event;
                }
                smallvec![]
            },

            BookingAction::Retry => {
                if let Some(session) = &mut state.session {
                    if session.stage == BookingStage::Failed {
                        session.stage = BookingStage::Selecting;
                        session.error = None;
                        session.quantity =
                            clamp_quantity(session.quantity, session.event.tickets_available);
                    }
                }
                smallvec![]
            },

            BookingAction::Close => {
                if state.session.take().is_some() {
                    state.generation += 1;
                }
                smallvec![]
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_quantity_bounds() {
        assert_eq!(clamp_quantity(0, 5), 1);
        assert_eq!(clamp_quantity(99, 5), 5);
        assert_eq!(clamp_quantity(3, 5), 3);
        assert_eq!(clamp_quantity(1, 1), 1);
        // Availability drained between open and selection.
        assert_eq!(clamp_quantity(4, 0), 1);
    }
}
