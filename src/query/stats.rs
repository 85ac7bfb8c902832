use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use strum::IntoEnumIterator;

use crate::models::{Incident, IncidentStatus};

/// Dashboard counters over a set of incidents
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentStats {
    pub total: usize,
    /// Open or in progress
    pub active: usize,
    /// Every status is present, zero when unused
    pub by_status: BTreeMap<String, usize>,
    /// Keyed by the labels incidents actually carry
    pub by_priority: BTreeMap<String, usize>,
}

impl IncidentStats {
    pub fn collect(incidents: &[Incident]) -> Self {
        let mut stats = Self {
            by_status: IncidentStatus::iter()
                .map(|status| (status.to_string(), 0))
                .collect(),
            ..Default::default()
        };

        for incident in incidents {
            stats.total += 1;
            if incident.is_active() {
                stats.active += 1;
            }
            *stats
                .by_status
                .entry(incident.status.to_string())
                .or_default() += 1;
            *stats
                .by_priority
                .entry(incident.priority.clone())
                .or_default() += 1;
        }

        stats
    }
}
