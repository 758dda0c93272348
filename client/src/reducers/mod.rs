//! Feature reducers.
//!
//! Three independent state machines share one environment type: the
//! session gate (authoritative identity slot), the booking workflow
//! (dialog-scoped submit state machine), and the catalog/admin flows.

pub mod booking;
pub mod catalog;
pub mod session;

pub use booking::{BookingReducer, BookingSession, BookingStage, BookingState};
pub use catalog::{CatalogReducer, CatalogState, DashboardView, LoadingFlags};
pub use session::{SessionPhase, SessionReducer, SessionState};
