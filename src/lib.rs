//! Incident reports, triage and content blocks for the Kalium Network.
//!
//! A [`state::Store`] owns the incident, content block and settings collections
//! and writes every change through to a key-value medium. A
//! [`query::QueryEngine`] derives the filtered, sorted incident list that staff
//! work from.

pub mod config;
pub mod error;
pub mod forms;
pub mod models;
pub mod query;
pub mod state;

pub use error::{AppError, Result};
