//! Incident list queries.
//!
//! - [`IncidentQuery`] holds the free text, status and priority filters and the sort mode
//! - [`apply_query`] derives a filtered, sorted copy of a collection
//! - [`QueryEngine`] keeps the query state for a list and memoises its view
//! - [`IncidentStats`] counts incidents per status and priority

mod engine;
mod filter;
mod stats;

pub use engine::{apply_query, QueryEngine};
pub use filter::{IncidentQuery, PriorityFilter, SortMode, StatusFilter};
pub use stats::IncidentStats;
