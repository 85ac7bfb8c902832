//! Derived incident view: text search, filters and ordering

use std::cmp::Reverse;

use crate::models::settings::priority_rank;
use crate::models::Incident;
use crate::query::{IncidentQuery, SortMode};
use crate::state::Store;

/// Compute the filtered, sorted view of `incidents`.
///
/// Pure function of its inputs; the source slice is never reordered. Both sort
/// modes are stable, so ties keep their stored relative order.
pub fn apply_query(
    incidents: &[Incident],
    query: &IncidentQuery,
    priorities: &[String],
) -> Vec<Incident> {
    let needle = query.text.to_lowercase();

    let mut view: Vec<Incident> = incidents
        .iter()
        .filter(|incident| needle.is_empty() || matches_text(incident, &needle))
        .filter(|incident| query.status.matches(incident.status))
        .filter(|incident| query.priority.matches(&incident.priority))
        .cloned()
        .collect();

    match query.sort {
        SortMode::ByDate => view.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        // Unknown labels rank as None, below every listed priority
        SortMode::ByPriority => {
            view.sort_by_key(|incident| Reverse(priority_rank(priorities, &incident.priority)))
        }
    }

    view
}

/// `needle` must already be lowercased
fn matches_text(incident: &Incident, needle: &str) -> bool {
    let reporter = incident.reporter.as_ref();

    [
        Some(incident.title.as_str()),
        Some(incident.description.as_str()),
        Some(incident.category.as_str()),
        Some(incident.server.as_str()),
        Some(incident.priority.as_str()),
        Some(incident.status.as_ref()),
        reporter.and_then(|r| r.email.as_deref()),
        reporter.and_then(|r| r.discord.as_deref()),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(needle))
}

struct CachedView {
    revision: u64,
    query: IncidentQuery,
    incidents: Vec<Incident>,
}

/// Holds the list's query state and memoises the last view.
///
/// The cache is keyed on the store revision and the query, so an engine must
/// only be used with one store.
#[derive(Default)]
pub struct QueryEngine {
    query: IncidentQuery,
    cache: Option<CachedView>,
    recomputations: u64,
}

impl QueryEngine {
    pub fn new(query: IncidentQuery) -> Self {
        Self {
            query,
            cache: None,
            recomputations: 0,
        }
    }

    pub fn query(&self) -> &IncidentQuery {
        &self.query
    }

    pub fn query_mut(&mut self) -> &mut IncidentQuery {
        &mut self.query
    }

    pub fn set_query(&mut self, query: IncidentQuery) {
        self.query = query;
    }

    /// Current view of the store's incidents, recomputed only when the store
    /// or the query changed since the last call
    pub fn view(&mut self, store: &Store) -> &[Incident] {
        let fresh = store.with_incidents(|snapshot| match &self.cache {
            Some(cached) if cached.revision == snapshot.revision && cached.query == self.query => {
                None
            }
            _ => Some(CachedView {
                revision: snapshot.revision,
                query: self.query.clone(),
                incidents: apply_query(
                    snapshot.incidents,
                    &self.query,
                    &snapshot.settings.priorities,
                ),
            }),
        });

        if let Some(view) = fresh {
            self.recomputations += 1;
            tracing::trace!(
                revision = view.revision,
                results = view.incidents.len(),
                "Incident view recomputed"
            );
            self.cache = Some(view);
        }

        match &self.cache {
            Some(cached) => &cached.incidents,
            None => &[],
        }
    }

    /// Drop the memoised view
    pub fn invalidate(&mut self) {
        self.cache = None;
    }

    /// How many times the view has been computed
    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}
