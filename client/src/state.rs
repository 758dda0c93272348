//! Shared domain state types.
//!
//! This module defines the core value objects and entities of the
//! event-registration client. All types are `Clone` to support the
//! functional architecture pattern; reducers own feature state built from
//! these types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ═══════════════════════════════════════════════════════════════════════
// ID Types
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for a user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    /// Generate a new random `UserId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EventId(pub uuid::Uuid);

impl EventId {
    /// Generate a new random `EventId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for EventId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for EventId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TicketId(pub uuid::Uuid);

impl TicketId {
    /// Generate a new random `TicketId`.
    #[must_use]
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4())
    }
}

impl Default for TicketId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Roles and Identity
// ═══════════════════════════════════════════════════════════════════════

/// Authorization level of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Regular user: browse, book, manage own profile and tickets.
    User,
    /// Administrator: everything a user can do plus event management
    /// and the sales dashboard.
    Admin,
}

impl Role {
    /// Get the role name as the API's wire string.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
        }
    }

    /// Parse a role from the API's wire string.
    ///
    /// # Errors
    ///
    /// Returns an error message if the role string is not recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "ADMIN" => Ok(Self::Admin),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque bearer credential proving a successful login.
///
/// Attached to every authenticated API call. The token value never appears
/// in logs; `Debug` redacts it.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Credential(String);

impl Credential {
    /// Wrap a raw token string.
    #[must_use]
    pub const fn new(token: String) -> Self {
        Self(token)
    }

    /// The raw token for header attachment.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Credential(****)")
    }
}

/// The authenticated principal for the current client session.
///
/// At most one `Identity` is active per client process; absence means
/// anonymous. Exclusively owned by the session store - every other
/// component holds a read-only subscription.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    /// Unique user identifier.
    pub user_id: UserId,

    /// Display name / login name.
    pub username: String,

    /// Authorization level.
    pub role: Role,

    /// Bearer credential for authenticated calls.
    pub credential: Credential,

    /// Email address (if the API returned one).
    pub email: Option<String>,

    /// First name (if the API returned one).
    pub first_name: Option<String>,

    /// Last name (if the API returned one).
    pub last_name: Option<String>,
}

/// New-account form submitted through the registration flow.
///
/// Accounts created this way always get the user role. `Debug` redacts
/// the password.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Registration {
    /// Desired login name (must be unused).
    pub username: String,

    /// Email address (must be unused).
    pub email: String,

    /// Plain-text password, consumed by the register effect.
    pub password: String,

    /// First name.
    pub first_name: Option<String>,

    /// Last name.
    pub last_name: Option<String>,
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"****")
            .field("first_name", &self.first_name)
            .field("last_name", &self.last_name)
            .finish()
    }
}

/// Serialized identity snapshot persisted in durable client-local storage.
///
/// One record under a single well-known key, overwritten wholesale on every
/// login/logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSession {
    /// The identity snapshot, credential included.
    pub identity: Identity,

    /// When the snapshot was written.
    pub saved_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Money Value Object (cents-based to avoid floating point errors)
// ═══════════════════════════════════════════════════════════════════════

/// Represents money in cents to avoid floating-point arithmetic errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Money(u64);

impl Money {
    /// Creates a `Money` value from cents.
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from whole dollars.
    ///
    /// # Panics
    ///
    /// Panics if the conversion would overflow (dollars * 100 > `u64::MAX`).
    /// Use `checked_from_dollars` for non-panicking conversion.
    #[must_use]
    #[allow(clippy::panic)]
    pub const fn from_dollars(dollars: u64) -> Self {
        match dollars.checked_mul(100) {
            Some(cents) => Self(cents),
            None => panic!("Money::from_dollars overflow"),
        }
    }

    /// Creates a `Money` value from whole dollars with overflow checking.
    #[must_use]
    pub const fn checked_from_dollars(dollars: u64) -> Option<Self> {
        match dollars.checked_mul(100) {
            Some(cents) => Some(Self(cents)),
            None => None,
        }
    }

    /// Returns the amount in cents.
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount in whole dollars (rounded down).
    #[must_use]
    pub const fn dollars(&self) -> u64 {
        self.0 / 100
    }

    /// Checks if the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two money amounts with overflow checking.
    #[must_use]
    pub const fn checked_add(self, other: Self) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }

    /// Multiplies money by a quantity with overflow checking.
    ///
    /// This is the total computation for a booking: `price × quantity`,
    /// exact at any quantity that fits.
    #[must_use]
    pub const fn checked_multiply(self, quantity: u32) -> Option<Self> {
        match self.0.checked_mul(quantity as u64) {
            Some(result) => Some(Self(result)),
            None => None,
        }
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.dollars(), self.0 % 100)
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Events
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventStatus {
    /// Created but not yet published; not bookable.
    Draft,
    /// Published and bookable while tickets remain.
    Active,
    /// Cancelled by an administrator; not bookable.
    Cancelled,
}

impl EventStatus {
    /// Wire string for the status.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "DRAFT",
            Self::Active => "ACTIVE",
            Self::Cancelled => "CANCELLED",
        }
    }

    /// Parse a status from the API's wire string.
    ///
    /// # Errors
    ///
    /// Returns an error message if the status string is not recognized.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_uppercase().as_str() {
            "DRAFT" => Ok(Self::Draft),
            "ACTIVE" => Ok(Self::Active),
            "CANCELLED" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown event status: {s}")),
        }
    }
}

/// Category an event is listed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventCategory {
    /// Conferences and talks.
    Conference,
    /// Hands-on workshops.
    Workshop,
    /// Concerts and live music.
    Concert,
    /// Sports events.
    Sports,
    /// Networking and meetups.
    Networking,
    /// Anything else.
    Other,
}

impl EventCategory {
    /// Wire string for the category.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Conference => "CONFERENCE",
            Self::Workshop => "WORKSHOP",
            Self::Concert => "CONCERT",
            Self::Sports => "SPORTS",
            Self::Networking => "NETWORKING",
            Self::Other => "OTHER",
        }
    }

    /// Parse a category from the API's wire string; unknown values land in
    /// `Other` because the category set is server-extensible.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_uppercase().as_str() {
            "CONFERENCE" => Self::Conference,
            "WORKSHOP" => Self::Workshop,
            "CONCERT" => Self::Concert,
            "SPORTS" => Self::Sports,
            "NETWORKING" => Self::Networking,
            _ => Self::Other,
        }
    }
}

/// A bookable activity as presented by the API.
///
/// `tickets_available` is server-computed and can change between page load
/// and submission; client checks against it are optimistic only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventSummary {
    /// Event identifier.
    pub id: EventId,

    /// Event title.
    pub title: String,

    /// Longer description.
    pub description: String,

    /// Listing category.
    pub category: EventCategory,

    /// Venue / location.
    pub venue: String,

    /// Scheduled start.
    pub starts_at: DateTime<Utc>,

    /// Price per ticket.
    pub price: Money,

    /// Total capacity.
    pub capacity: u32,

    /// Remaining tickets (server-computed, `<= capacity`).
    pub tickets_available: u32,

    /// Lifecycle status.
    pub status: EventStatus,

    /// Optional image reference.
    pub image_url: Option<String>,
}

impl EventSummary {
    /// True when a booking dialog may be opened for this event.
    #[must_use]
    pub const fn is_bookable(&self) -> bool {
        matches!(self.status, EventStatus::Active) && self.tickets_available > 0
    }

    /// True when the event is active but has no remaining tickets.
    #[must_use]
    pub const fn is_sold_out(&self) -> bool {
        matches!(self.status, EventStatus::Active) && self.tickets_available == 0
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Tickets
// ═══════════════════════════════════════════════════════════════════════

/// Lifecycle status of a ticket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TicketStatus {
    /// Booked, awaiting confirmation.
    Pending,
    /// Confirmed by the platform.
    Confirmed,
    /// Cancelled.
    Cancelled,
}

/// Proof of a booking. Immutable from the client's perspective.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ticket {
    /// Ticket identifier.
    pub id: TicketId,

    /// Owning user.
    pub user_id: UserId,

    /// Referenced event.
    pub event_id: EventId,

    /// Number of seats booked (positive).
    pub quantity: u32,

    /// Total charged: `event.price × quantity`.
    pub total_amount: Money,

    /// Lifecycle status.
    pub status: TicketStatus,

    /// When the booking was made.
    pub booked_at: DateTime<Utc>,
}

// ═══════════════════════════════════════════════════════════════════════
// Profile and admin views
// ═══════════════════════════════════════════════════════════════════════

/// Editable user profile.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    /// Login name (read-only on the server).
    pub username: String,

    /// Email address.
    pub email: Option<String>,

    /// First name.
    pub first_name: Option<String>,

    /// Last name.
    pub last_name: Option<String>,

    /// Phone number.
    pub phone: Option<String>,

    /// Postal address.
    pub address: Option<String>,

    /// Free-form bio.
    pub bio: Option<String>,
}

/// Sales and usage counters for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    /// Registered users.
    pub total_users: u64,

    /// Users with the admin role.
    pub total_admins: u64,

    /// Users registered in the last month.
    pub new_users_this_month: u64,

    /// Events currently listed.
    pub total_events: u64,

    /// Active events with no remaining tickets.
    pub sold_out_events: u64,

    /// Events scheduled in the future.
    pub upcoming_events: u64,

    /// Tickets sold all-time.
    pub total_tickets: u64,

    /// Tickets sold in the last month.
    pub tickets_this_month: u64,
}

/// Create-event form payload.
///
/// Validated entirely client-side before any network call; see
/// [`crate::validation::validate_new_event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewEvent {
    /// Event title (required).
    pub title: String,

    /// Longer description.
    pub description: String,

    /// Listing category.
    pub category: EventCategory,

    /// Venue / location (required).
    pub venue: String,

    /// Scheduled start (must be in the future at creation).
    pub starts_at: DateTime<Utc>,

    /// Price per ticket (non-negative by construction).
    pub price: Money,

    /// Total capacity (must be positive).
    pub capacity: u32,

    /// Optional image reference.
    pub image_url: Option<String>,
}

/// Filter for the public event list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Restrict to one category.
    pub category: Option<EventCategory>,

    /// Free-text search over title and description.
    pub search: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_id_generation_is_unique() {
        assert_ne!(UserId::new(), UserId::new());
        assert_ne!(EventId::new(), EventId::new());
        assert_ne!(TicketId::new(), TicketId::new());
    }

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::parse("USER"), Ok(Role::User));
        assert_eq!(Role::parse("admin"), Ok(Role::Admin));
        assert!(Role::parse("superuser").is_err());
        assert_eq!(Role::Admin.as_str(), "ADMIN");
    }

    #[test]
    fn test_credential_debug_is_redacted() {
        let credential = Credential::new("very-secret-token".to_string());
        let debug = format!("{credential:?}");
        assert!(!debug.contains("very-secret-token"));
    }

    #[test]
    fn test_money_display() {
        assert_eq!(Money::from_cents(2500).to_string(), "$25.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
        assert_eq!(Money::from_cents(199).to_string(), "$1.99");
    }

    #[test]
    fn test_money_multiply_is_exact_over_quantity_range() {
        // $25.00 * 3 = $75.00, and exact for every quantity 1..=100
        let price = Money::from_cents(2500);
        assert_eq!(price.checked_multiply(3), Some(Money::from_cents(7500)));

        for quantity in 1..=100u32 {
            let total = price.checked_multiply(quantity);
            assert_eq!(total, Some(Money::from_cents(2500 * u64::from(quantity))));
        }
    }

    #[test]
    fn test_event_bookability() {
        let mut event = EventSummary {
            id: EventId::new(),
            title: "RustConf".to_string(),
            description: String::new(),
            category: EventCategory::Conference,
            venue: "Portland".to_string(),
            starts_at: Utc::now(),
            price: Money::from_cents(2500),
            capacity: 100,
            tickets_available: 2,
            status: EventStatus::Active,
            image_url: None,
        };
        assert!(event.is_bookable());
        assert!(!event.is_sold_out());

        event.tickets_available = 0;
        assert!(!event.is_bookable());
        assert!(event.is_sold_out());

        event.status = EventStatus::Cancelled;
        assert!(!event.is_sold_out());
    }

    #[test]
    fn test_category_parse_defaults_to_other() {
        assert_eq!(EventCategory::parse("concert"), EventCategory::Concert);
        assert_eq!(EventCategory::parse("LAN-PARTY"), EventCategory::Other);
    }
}
