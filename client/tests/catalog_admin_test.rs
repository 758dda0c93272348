//! Integration tests for the catalog, profile and admin flows.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)] // Test code

mod common;

use std::time::Duration;

use chrono::Utc;
use common::{await_state, catalog_store, event_with_availability, session_store, test_env};
use ticketline_client::providers::Api;
use ticketline_client::state::{
    DashboardStats, EventCategory, EventFilter, Money, NewEvent, Profile,
};
use ticketline_client::wiring::forward_catalog_expiry;
use ticketline_client::{CatalogAction, ClientError, SessionState};

const WAIT: Duration = Duration::from_secs(2);

#[tokio::test]
async fn event_list_loads_with_category_filter() {
    let (api, _, env) = test_env();
    api.add_event(event_with_availability(2500, 100, 50));
    let mut workshop = event_with_availability(1000, 20, 20);
    workshop.title = "Ownership workshop".to_string();
    workshop.category = EventCategory::Workshop;
    api.add_event(workshop);

    let store = catalog_store(env);
    let result = store
        .send_and_wait_for(
            CatalogAction::LoadEvents {
                filter: EventFilter {
                    category: Some(EventCategory::Workshop),
                    search: None,
                },
            },
            |a| matches!(a, CatalogAction::EventsLoaded { .. }),
            WAIT,
        )
        .await;
    assert!(result.is_ok());

    let mut states = store.subscribe_state();
    let state = await_state(&mut states, |s| !s.loading().events).await;
    let titles = state.events().iter().map(|e| e.title.clone()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Ownership workshop".to_string()]);
}

#[tokio::test]
async fn optimistic_delete_removes_immediately_and_confirms() {
    let (api, _, env) = test_env();
    let doomed = event_with_availability(2500, 100, 50);
    let doomed_id = doomed.id;
    api.add_event(doomed);
    api.add_event(event_with_availability(1000, 20, 20));

    let store = catalog_store(env);
    store
        .send_and_wait_for(
            CatalogAction::LoadEvents {
                filter: EventFilter::default(),
            },
            |a| matches!(a, CatalogAction::EventsLoaded { .. }),
            WAIT,
        )
        .await
        .expect("load");

    let handle = store
        .send(CatalogAction::DeleteEvent { event_id: doomed_id })
        .await
        .expect("delete");

    // Removed from the local list before the server answers.
    assert!(store.state(|s| s.event(doomed_id).is_none()).await);
    assert_eq!(store.state(|s| s.events().len()).await, 1);

    let mut handle = handle;
    handle.wait_with_timeout(WAIT).await.expect("effects");

    // Confirmed server-side: gone from the platform too.
    let fetched = api.fetch_event(doomed_id).await;
    assert!(matches!(fetched, Err(ClientError::NotFound)));
    assert_eq!(store.state(|s| s.events().len()).await, 1);
}

#[tokio::test]
async fn rejected_delete_reverts_the_removal_in_place() {
    let (api, _, env) = test_env();
    let first = event_with_availability(2500, 100, 50);
    let second = event_with_availability(1000, 20, 20);
    let second_id = second.id;
    api.add_event(first);
    api.add_event(second);
    api.add_event(event_with_availability(500, 10, 10));

    let store = catalog_store(env);
    store
        .send_and_wait_for(
            CatalogAction::LoadEvents {
                filter: EventFilter::default(),
            },
            |a| matches!(a, CatalogAction::EventsLoaded { .. }),
            WAIT,
        )
        .await
        .expect("load");

    api.fail_once(ClientError::Forbidden);

    let result = store
        .send_and_wait_for(
            CatalogAction::DeleteEvent { event_id: second_id },
            |a| matches!(a, CatalogAction::DeleteFailed { .. }),
            WAIT,
        )
        .await;
    assert!(result.is_ok());

    let mut states = store.subscribe_state();
    let state = await_state(&mut states, |s| s.last_error().is_some()).await;
    let ids = state.events().iter().map(|e| e.id).collect::<Vec<_>>();
    assert_eq!(ids.len(), 3);
    assert_eq!(ids[1], second_id, "revert must restore the original position");
    assert_eq!(state.last_error(), Some(&ClientError::Forbidden));
}

#[tokio::test]
async fn invalid_event_form_never_reaches_the_network() {
    let (api, _, env) = test_env();
    let store = catalog_store(env);

    let form = NewEvent {
        title: "   ".to_string(),
        description: String::new(),
        category: EventCategory::Other,
        venue: "Somewhere".to_string(),
        starts_at: Utc::now() + chrono::Duration::days(1),
        price: Money::from_cents(1000),
        capacity: 10,
        image_url: None,
    };

    let _ = store.send(CatalogAction::CreateEvent { form }).await.expect("send");

    let error = store.state(|s| s.last_error().cloned()).await;
    assert!(matches!(error, Some(ClientError::Validation { field, .. }) if field == "title"));
    assert_eq!(api.call_count("create_event"), 0);
}

#[tokio::test]
async fn created_event_joins_the_list() {
    let (api, _, env) = test_env();
    let store = catalog_store(env);

    let form = NewEvent {
        title: "Rust meetup".to_string(),
        description: "Monthly meetup".to_string(),
        category: EventCategory::Networking,
        venue: "Library".to_string(),
        starts_at: Utc::now() + chrono::Duration::days(14),
        price: Money::from_cents(0),
        capacity: 40,
        image_url: None,
    };

    let result = store
        .send_and_wait_for(
            CatalogAction::CreateEvent { form },
            |a| matches!(a, CatalogAction::EventCreated { .. }),
            WAIT,
        )
        .await;
    assert!(result.is_ok());

    assert_eq!(api.call_count("create_event"), 1);
    let mut states = store.subscribe_state();
    let state = await_state(&mut states, |s| !s.events().is_empty()).await;
    let titles = state.events().iter().map(|e| e.title.clone()).collect::<Vec<_>>();
    assert_eq!(titles, vec!["Rust meetup".to_string()]);
}

#[tokio::test]
async fn dashboard_loads_stats_and_recent_tickets() {
    let (api, _, env) = test_env();
    api.set_stats(DashboardStats {
        total_users: 120,
        total_admins: 3,
        new_users_this_month: 14,
        total_events: 9,
        sold_out_events: 2,
        upcoming_events: 6,
        total_tickets: 451,
        tickets_this_month: 77,
    });
    let event = event_with_availability(2500, 100, 100);
    api.add_event(event.clone());
    let _ = api.book_tickets(event.id, 2).await.expect("seed a booking");

    let store = catalog_store(env);
    let result = store
        .send_and_wait_for(
            CatalogAction::LoadDashboard,
            |a| matches!(a, CatalogAction::DashboardLoaded { .. }),
            WAIT,
        )
        .await;
    assert!(result.is_ok());

    let mut states = store.subscribe_state();
    let state = await_state(&mut states, |s| s.dashboard().is_some()).await;
    let dashboard = state.dashboard().cloned().expect("dashboard");
    assert_eq!(dashboard.stats.total_users, 120);
    assert_eq!(dashboard.stats.sold_out_events, 2);
    assert_eq!(dashboard.recent_tickets.len(), 1);
}

#[tokio::test]
async fn profile_round_trip_updates_state() {
    let (api, _, env) = test_env();
    api.set_profile(Profile {
        username: "ada".to_string(),
        email: Some("ada@example.com".to_string()),
        ..Profile::default()
    });

    let store = catalog_store(env);
    store
        .send_and_wait_for(
            CatalogAction::LoadProfile,
            |a| matches!(a, CatalogAction::ProfileLoaded { .. }),
            WAIT,
        )
        .await
        .expect("load profile");

    let mut states = store.subscribe_state();
    let state = await_state(&mut states, |s| s.profile().is_some()).await;
    let mut profile = state.profile().cloned().expect("profile");
    profile.bio = Some("Wrote the first program".to_string());

    store
        .send_and_wait_for(
            CatalogAction::UpdateProfile { profile },
            |a| matches!(a, CatalogAction::ProfileUpdated { .. }),
            WAIT,
        )
        .await
        .expect("update profile");

    let state = await_state(&mut states, |s| {
        s.profile().is_some_and(|p| p.bio.is_some())
    })
    .await;
    let bio = state.profile().and_then(|p| p.bio.clone());
    assert_eq!(bio, Some("Wrote the first program".to_string()));
}

#[tokio::test]
async fn expired_catalog_call_forces_logout_in_session_store() {
    let (api, _, env) = test_env();
    api.register_account("ada", "hunter2", common::user_identity());

    let session = session_store(env.clone());
    let catalog = catalog_store(env.clone());
    let _forwarder = forward_catalog_expiry(&catalog, session.clone());

    session
        .send_and_wait_for(
            ticketline_client::SessionAction::Login {
                username: "ada".to_string(),
                password: "hunter2".to_string(),
            },
            |a| matches!(a, ticketline_client::SessionAction::LoginSucceeded { .. }),
            WAIT,
        )
        .await
        .expect("login");
    let mut session_states = session.subscribe_state();
    let _ = await_state(&mut session_states, SessionState::is_authenticated).await;

    // The platform starts rejecting the credential.
    api.fail_all(ClientError::SessionExpired);
    let _ = catalog.send(CatalogAction::LoadMyTickets).await.expect("load tickets");

    let mut states = session.subscribe_state();
    let logged_out = tokio::time::timeout(WAIT, states.wait_for(|s| !s.is_authenticated())).await;
    assert!(logged_out.is_ok(), "forced logout must reach the session store");
    assert!(env.slot.get().is_none());

    let mut catalog_states = catalog.subscribe_state();
    let failed = await_state(&mut catalog_states, |s| s.last_error().is_some()).await;
    assert_eq!(failed.last_error(), Some(&ClientError::SessionExpired));
}
