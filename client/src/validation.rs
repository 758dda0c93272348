//! Client-side form validation.
//!
//! Validation runs before any network call; a rejected form never produces
//! an API request.

use chrono::{DateTime, Utc};

use crate::error::ClientError;
use crate::state::{NewEvent, Registration};

fn validation_error(field: &str, message: &str) -> ClientError {
    ClientError::Validation {
        field: field.to_string(),
        message: message.to_string(),
    }
}

/// Validate a create-event form.
///
/// Checks, in order: non-blank title, non-blank venue, start date in the
/// future relative to `now`, positive capacity. The price cannot be
/// negative by construction of `Money`.
///
/// # Errors
///
/// Returns `ClientError::Validation` naming the first offending field.
pub fn validate_new_event(form: &NewEvent, now: DateTime<Utc>) -> Result<(), ClientError> {
    if form.title.trim().is_empty() {
        return Err(validation_error("title", "Title is required"));
    }

    if form.venue.trim().is_empty() {
        return Err(validation_error("venue", "Venue is required"));
    }

    if form.starts_at <= now {
        return Err(validation_error("starts_at", "Event date must be in the future"));
    }

    if form.capacity == 0 {
        return Err(validation_error("capacity", "Capacity must be positive"));
    }

    Ok(())
}

/// Validate a login form before calling the API.
///
/// # Errors
///
/// Returns `ClientError::Validation` when either field is blank.
pub fn validate_login(username: &str, password: &str) -> Result<(), ClientError> {
    if username.trim().is_empty() {
        return Err(validation_error("username", "Username is required"));
    }

    if password.is_empty() {
        return Err(validation_error("password", "Password is required"));
    }

    Ok(())
}

/// Validate a registration form before calling the API.
///
/// Uniqueness of username and email is the server's call; only shape is
/// checked here.
///
/// # Errors
///
/// Returns `ClientError::Validation` naming the first offending field.
pub fn validate_registration(form: &Registration) -> Result<(), ClientError> {
    if form.username.trim().is_empty() {
        return Err(validation_error("username", "Username is required"));
    }

    if form.email.trim().is_empty() || !form.email.contains('@') {
        return Err(validation_error("email", "A valid email is required"));
    }

    if form.password.is_empty() {
        return Err(validation_error("password", "Password is required"));
    }

    Ok(())
}
