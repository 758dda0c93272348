//! # Ticketline Testing
//!
//! Testing utilities and helpers for the Ticketline client architecture.
//!
//! The main entry point is [`ReducerTest`], a fluent Given-When-Then harness
//! for exercising reducers as pure functions, plus effect assertions in
//! [`reducer_test::assertions`].

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};
