//! REST API provider backed by `reqwest`.
//!
//! This is the single place that attaches the bearer credential and maps
//! HTTP statuses onto [`ClientError`]. In particular, any 401 from an
//! authenticated route surfaces as [`ClientError::SessionExpired`], which
//! the integration layer turns into a forced logout.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;
use crate::environment::CredentialSlot;
use crate::error::ClientError;
use crate::providers::Api;
use crate::state::{
    Credential, DashboardStats, EventCategory, EventFilter, EventId, EventStatus, EventSummary,
    Identity, Money, NewEvent, Profile, Registration, Role, Ticket, TicketId, TicketStatus, UserId,
};

/// `reqwest`-backed implementation of [`Api`].
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
    slot: CredentialSlot,
}

impl HttpApi {
    /// Build an API client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `Network` when the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig, slot: CredentialSlot) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self {
            client,
            base_url: config.api_url.clone(),
            slot,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach the bearer credential of the active session, if any.
    fn authed(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.slot.get() {
            Some(credential) => builder.bearer_auth(credential.token()),
            None => builder,
        }
    }
}

/// Map a non-success response onto the error taxonomy.
async fn error_for_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    Err(match status.as_u16() {
        401 => ClientError::SessionExpired,
        403 => ClientError::Forbidden,
        404 => ClientError::NotFound,
        code if (400..500).contains(&code) => {
            let message = response
                .json::<ErrorBody>()
                .await
                .map_or_else(|_| status.to_string(), |body| body.message);
            ClientError::Rejected { message }
        },
        code => ClientError::Server { status: code },
    })
}

fn malformed(err: &reqwest::Error) -> ClientError {
    ClientError::Network {
        message: format!("Malformed response: {err}"),
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Wire types
// ═══════════════════════════════════════════════════════════════════════

#[derive(Deserialize)]
struct ErrorBody {
    // Some routes say "message", auth routes say "error".
    #[serde(alias = "error")]
    message: String,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest<'a> {
    username: &'a str,
    email: &'a str,
    password: &'a str,
    first_name: Option<&'a str>,
    last_name: Option<&'a str>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginResponse {
    token: String,
    user_id: uuid::Uuid,
    username: String,
    role: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
}

impl LoginResponse {
    fn into_identity(self) -> Result<Identity, ClientError> {
        let role = Role::parse(&self.role).map_err(|message| ClientError::Network { message })?;
        Ok(Identity {
            user_id: UserId(self.user_id),
            username: self.username,
            role,
            credential: Credential::new(self.token),
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
        })
    }
}

// Prices travel as decimal dollars on the wire; everything internal is
// integer cents.
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn dollars_to_money(dollars: f64) -> Money {
    Money::from_cents((dollars * 100.0).round().max(0.0) as u64)
}

#[allow(clippy::cast_precision_loss)]
fn money_to_dollars(money: Money) -> f64 {
    money.cents() as f64 / 100.0
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EventDto {
    id: uuid::Uuid,
    title: String,
    description: String,
    category: String,
    venue: String,
    starts_at: DateTime<Utc>,
    price: f64,
    capacity: u32,
    tickets_available: u32,
    status: String,
    image_url: Option<String>,
}

impl EventDto {
    fn into_event(self) -> Result<EventSummary, ClientError> {
        let status =
            EventStatus::parse(&self.status).map_err(|message| ClientError::Network { message })?;
        Ok(EventSummary {
            id: EventId(self.id),
            title: self.title,
            description: self.description,
            category: EventCategory::parse(&self.category),
            venue: self.venue,
            starts_at: self.starts_at,
            price: dollars_to_money(self.price),
            capacity: self.capacity,
            tickets_available: self.tickets_available,
            status,
            image_url: self.image_url,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NewEventRequest<'a> {
    title: &'a str,
    description: &'a str,
    category: &'a str,
    venue: &'a str,
    starts_at: DateTime<Utc>,
    price: f64,
    capacity: u32,
    image_url: Option<&'a str>,
}

impl<'a> NewEventRequest<'a> {
    fn from_form(form: &'a NewEvent) -> Self {
        Self {
            title: &form.title,
            description: &form.description,
            category: form.category.as_str(),
            venue: &form.venue,
            starts_at: form.starts_at,
            price: money_to_dollars(form.price),
            capacity: form.capacity,
            image_url: form.image_url.as_deref(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TicketDto {
    id: uuid::Uuid,
    user_id: uuid::Uuid,
    event_id: uuid::Uuid,
    quantity: u32,
    total_amount: f64,
    status: String,
    booked_at: DateTime<Utc>,
}

impl TicketDto {
    fn into_ticket(self) -> Result<Ticket, ClientError> {
        let status = match self.status.to_uppercase().as_str() {
            "PENDING" => TicketStatus::Pending,
            "CONFIRMED" => TicketStatus::Confirmed,
            "CANCELLED" => TicketStatus::Cancelled,
            other => {
                return Err(ClientError::Network {
                    message: format!("Unknown ticket status: {other}"),
                });
            },
        };
        Ok(Ticket {
            id: TicketId(self.id),
            user_id: UserId(self.user_id),
            event_id: EventId(self.event_id),
            quantity: self.quantity,
            total_amount: dollars_to_money(self.total_amount),
            status,
            booked_at: self.booked_at,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct BookRequest {
    event_id: uuid::Uuid,
    quantity: u32,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProfileDto {
    username: String,
    email: Option<String>,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    address: Option<String>,
    bio: Option<String>,
}

impl From<ProfileDto> for Profile {
    fn from(dto: ProfileDto) -> Self {
        Self {
            username: dto.username,
            email: dto.email,
            first_name: dto.first_name,
            last_name: dto.last_name,
            phone: dto.phone,
            address: dto.address,
            bio: dto.bio,
        }
    }
}

impl From<&Profile> for ProfileDto {
    fn from(profile: &Profile) -> Self {
        Self {
            username: profile.username.clone(),
            email: profile.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone: profile.phone.clone(),
            address: profile.address.clone(),
            bio: profile.bio.clone(),
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsDto {
    total_users: u64,
    total_admins: u64,
    new_users_this_month: u64,
    total_events: u64,
    sold_out_events: u64,
    upcoming_events: u64,
    total_tickets: u64,
    tickets_this_month: u64,
}

impl From<StatsDto> for DashboardStats {
    fn from(dto: StatsDto) -> Self {
        Self {
            total_users: dto.total_users,
            total_admins: dto.total_admins,
            new_users_this_month: dto.new_users_this_month,
            total_events: dto.total_events,
            sold_out_events: dto.sold_out_events,
            upcoming_events: dto.upcoming_events,
            total_tickets: dto.total_tickets,
            tickets_this_month: dto.tickets_this_month,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Api implementation
// ═══════════════════════════════════════════════════════════════════════

impl Api for HttpApi {
    async fn login(&self, username: &str, password: &str) -> Result<Identity, ClientError> {
        let response = self
            .client
            .post(self.url("/api/auth/login"))
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        // On the login route a 400/401 means bad credentials, not an
        // expired session.
        if matches!(response.status().as_u16(), 400 | 401) {
            return Err(ClientError::InvalidCredentials);
        }

        let response = error_for_status(response).await?;
        let body: LoginResponse = response.json().await.map_err(|e| malformed(&e))?;
        body.into_identity()
    }

    async fn register(&self, form: &Registration) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.url("/api/auth/register"))
            .json(&RegisterRequest {
                username: &form.username,
                email: &form.email,
                password: &form.password,
                first_name: form.first_name.as_deref(),
                last_name: form.last_name.as_deref(),
            })
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn logout(&self) -> Result<(), ClientError> {
        let response = self
            .authed(self.client.post(self.url("/api/auth/logout")))
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn list_events(&self, filter: &EventFilter) -> Result<Vec<EventSummary>, ClientError> {
        let mut request = self.client.get(self.url("/api/events"));
        if let Some(category) = filter.category {
            request = request.query(&[("category", category.as_str())]);
        }
        if let Some(search) = &filter.search {
            request = request.query(&[("search", search.as_str())]);
        }

        let response = error_for_status(request.send().await?).await?;
        let dtos: Vec<EventDto> = response.json().await.map_err(|e| malformed(&e))?;
        dtos.into_iter().map(EventDto::into_event).collect()
    }

    async fn fetch_event(&self, id: EventId) -> Result<EventSummary, ClientError> {
        let response = self
            .client
            .get(self.url(&format!("/api/events/{id}")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: EventDto = response.json().await.map_err(|e| malformed(&e))?;
        dto.into_event()
    }

    async fn book_tickets(&self, event_id: EventId, quantity: u32) -> Result<Ticket, ClientError> {
        let response = self
            .authed(self.client.post(self.url("/api/tickets")))
            .json(&BookRequest {
                event_id: event_id.0,
                quantity,
            })
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: TicketDto = response.json().await.map_err(|e| malformed(&e))?;
        dto.into_ticket()
    }

    async fn my_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let response = self
            .authed(self.client.get(self.url("/api/tickets/my")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dtos: Vec<TicketDto> = response.json().await.map_err(|e| malformed(&e))?;
        dtos.into_iter().map(TicketDto::into_ticket).collect()
    }

    async fn profile(&self) -> Result<Profile, ClientError> {
        let response = self
            .authed(self.client.get(self.url("/api/users/profile")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: ProfileDto = response.json().await.map_err(|e| malformed(&e))?;
        Ok(dto.into())
    }

    async fn validate_credential(&self, credential: &Credential) -> Result<(), ClientError> {
        let response = self
            .client
            .get(self.url("/api/users/profile"))
            .bearer_auth(credential.token())
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> Result<Profile, ClientError> {
        let response = self
            .authed(self.client.put(self.url("/api/users/profile")))
            .json(&ProfileDto::from(profile))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: ProfileDto = response.json().await.map_err(|e| malformed(&e))?;
        Ok(dto.into())
    }

    async fn create_event(&self, form: &NewEvent) -> Result<EventSummary, ClientError> {
        let response = self
            .authed(self.client.post(self.url("/api/events")))
            .json(&NewEventRequest::from_form(form))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: EventDto = response.json().await.map_err(|e| malformed(&e))?;
        dto.into_event()
    }

    async fn delete_event(&self, id: EventId) -> Result<(), ClientError> {
        let response = self
            .authed(self.client.delete(self.url(&format!("/api/events/{id}"))))
            .send()
            .await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn dashboard_stats(&self) -> Result<DashboardStats, ClientError> {
        let response = self
            .authed(self.client.get(self.url("/api/admin/stats")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dto: StatsDto = response.json().await.map_err(|e| malformed(&e))?;
        Ok(dto.into())
    }

    async fn recent_tickets(&self) -> Result<Vec<Ticket>, ClientError> {
        let response = self
            .authed(self.client.get(self.url("/api/admin/tickets/recent")))
            .send()
            .await?;
        let response = error_for_status(response).await?;
        let dtos: Vec<TicketDto> = response.json().await.map_err(|e| malformed(&e))?;
        dtos.into_iter().map(TicketDto::into_ticket).collect()
    }
}
